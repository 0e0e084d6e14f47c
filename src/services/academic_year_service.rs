use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::academic_year_dto::CreateAcademicYearPayload;
use crate::error::{Error, Result};
use crate::models::academic_year::AcademicYear;

const YEAR_COLUMNS: &str = "id, year_name, start_date, end_date, created_at, updated_at";

#[derive(Clone)]
pub struct AcademicYearService {
    pool: PgPool,
}

impl AcademicYearService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateAcademicYearPayload) -> Result<AcademicYear> {
        if payload.end_date <= payload.start_date {
            return Err(Error::BadRequest(
                "Academic year must end after it starts".to_string(),
            ));
        }

        let insert = sqlx::query_as::<_, AcademicYear>(&format!(
            "INSERT INTO academic_years (year_name, start_date, end_date) \
             VALUES ($1, $2, $3) RETURNING {YEAR_COLUMNS}"
        ))
        .bind(&payload.year_name)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .fetch_one(&self.pool)
        .await;

        match insert {
            Ok(year) => Ok(year),
            Err(err)
                if err
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false) =>
            {
                Err(Error::BadRequest(
                    "An academic year with this name already exists".to_string(),
                ))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<AcademicYear> {
        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            "SELECT {YEAR_COLUMNS} FROM academic_years WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Academic year not found".to_string()))?;
        Ok(year)
    }

    pub async fn list(&self) -> Result<Vec<AcademicYear>> {
        let years = sqlx::query_as::<_, AcademicYear>(&format!(
            "SELECT {YEAR_COLUMNS} FROM academic_years ORDER BY start_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(years)
    }
}
