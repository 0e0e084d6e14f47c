use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::announcement_dto::{CreateAnnouncementPayload, UpdateAnnouncementPayload};
use crate::error::{Error, Result};
use crate::models::announcement::{AnnouncementStatus, JobAnnouncement};
use crate::models::user::Principal;

const ANNOUNCEMENT_COLUMNS: &str = "id, academic_year_id, title, description, status, \
     publication_date, closing_date, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct AnnouncementService {
    pool: PgPool,
}

impl AnnouncementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        actor: &Principal,
        payload: CreateAnnouncementPayload,
    ) -> Result<JobAnnouncement> {
        let year_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM academic_years WHERE id = $1)")
                .bind(payload.academic_year_id)
                .fetch_one(&self.pool)
                .await?;
        if !year_exists {
            return Err(Error::NotFound("Academic year not found".to_string()));
        }

        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM job_announcements \
             WHERE title = $1 AND academic_year_id = $2)",
        )
        .bind(&payload.title)
        .bind(payload.academic_year_id)
        .fetch_one(&self.pool)
        .await?;
        if duplicate {
            return Err(Error::BadRequest(
                "An announcement with this title already exists for this academic year"
                    .to_string(),
            ));
        }

        let announcement = sqlx::query_as::<_, JobAnnouncement>(&format!(
            "INSERT INTO job_announcements \
                 (academic_year_id, title, description, closing_date, created_by, status) \
             VALUES ($1, $2, $3, $4, $5, 'DRAFT') \
             RETURNING {ANNOUNCEMENT_COLUMNS}"
        ))
        .bind(payload.academic_year_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.closing_date)
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(announcement)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateAnnouncementPayload,
    ) -> Result<JobAnnouncement> {
        self.get_by_id(id).await?;

        let announcement = sqlx::query_as::<_, JobAnnouncement>(&format!(
            "UPDATE job_announcements \
             SET title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 closing_date = COALESCE($4, closing_date), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ANNOUNCEMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.closing_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(announcement)
    }

    /// DRAFT -> PUBLISHED; stamps the publication date, which opens the
    /// application window.
    pub async fn publish(&self, id: Uuid) -> Result<JobAnnouncement> {
        let announcement = self.get_by_id(id).await?;
        if !announcement.can_be_published(Utc::now()) {
            return Err(Error::BadRequest(
                "Announcement cannot be published".to_string(),
            ));
        }

        let published = sqlx::query_as::<_, JobAnnouncement>(&format!(
            "UPDATE job_announcements \
             SET status = 'PUBLISHED', publication_date = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ANNOUNCEMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(announcement_id = %id, "announcement published");
        Ok(published)
    }

    /// PUBLISHED -> CLOSED, the only transition out of PUBLISHED.
    pub async fn close(&self, id: Uuid) -> Result<JobAnnouncement> {
        let announcement = self.get_by_id(id).await?;
        if announcement.status != AnnouncementStatus::Published {
            return Err(Error::BadRequest(
                "Only published announcements can be closed".to_string(),
            ));
        }

        let closed = sqlx::query_as::<_, JobAnnouncement>(&format!(
            "UPDATE job_announcements SET status = 'CLOSED', updated_at = NOW() \
             WHERE id = $1 RETURNING {ANNOUNCEMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(announcement_id = %id, "announcement closed");
        Ok(closed)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM job_announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Announcement not found".to_string()));
        }
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<JobAnnouncement> {
        let announcement = sqlx::query_as::<_, JobAnnouncement>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM job_announcements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Announcement not found".to_string()))?;
        Ok(announcement)
    }

    pub async fn list(&self) -> Result<Vec<JobAnnouncement>> {
        let announcements = sqlx::query_as::<_, JobAnnouncement>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM job_announcements \
             ORDER BY COALESCE(publication_date, created_at) DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(announcements)
    }
}
