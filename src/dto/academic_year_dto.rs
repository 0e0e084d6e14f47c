use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::academic_year::AcademicYear;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAcademicYearPayload {
    #[validate(length(min = 4, max = 20))]
    pub year_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicYearResponse {
    pub id: uuid::Uuid,
    pub year_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<AcademicYear> for AcademicYearResponse {
    fn from(value: AcademicYear) -> Self {
        Self {
            id: value.id,
            year_name: value.year_name,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}
