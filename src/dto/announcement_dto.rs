use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::announcement::{AnnouncementStatus, JobAnnouncement};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnnouncementPayload {
    pub academic_year_id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub closing_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateAnnouncementPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub closing_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementResponse {
    pub id: Uuid,
    pub academic_year_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: AnnouncementStatus,
    pub publication_date: Option<DateTime<Utc>>,
    pub closing_date: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<JobAnnouncement> for AnnouncementResponse {
    fn from(value: JobAnnouncement) -> Self {
        Self {
            id: value.id,
            academic_year_id: value.academic_year_id,
            title: value.title,
            description: value.description,
            status: value.status,
            publication_date: value.publication_date,
            closing_date: value.closing_date,
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
