use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::application_dto::DocumentPayload;
use crate::error::{Error, Result};
use crate::models::announcement::JobAnnouncement;
use crate::models::application::{self, Application, ApplicationStatus, ApplicationType};
use crate::models::document::{self, Document, DocumentStatus};
use crate::models::history::ApplicationHistory;
use crate::models::notification::{render_status_message, NotificationType};
use crate::models::user::{Principal, User};
use crate::services::file_store::FileStore;
use crate::services::notification_service::NotificationService;

const APPLICATION_COLUMNS: &str = "id, candidate_id, announcement_id, academic_year_id, \
     application_type, status, rejection_reason, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, application_id, document_type, file_name, file_path, \
     file_size, mime_type, upload_date, status, created_at, updated_at";

/// What an INVALID validation outcome means on a given attach path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvalidDocumentPolicy {
    /// Abort the whole operation (creation path).
    Reject,
    /// Persist the document with its INVALID status visible (update path).
    Persist,
}

/// The application lifecycle engine: creation with atomic document
/// ingestion, status transitions with history, document attach/detach,
/// cancellation and completeness queries. Every multi-step mutation runs
/// in one transaction; blob writes sit outside it and are cleaned up
/// best-effort.
#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    files: FileStore,
}

impl ApplicationService {
    pub fn new(pool: PgPool, files: FileStore) -> Self {
        Self { pool, files }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        candidate_id: Option<Uuid>,
        announcement_id: Uuid,
        academic_year_id: Uuid,
        application_type: ApplicationType,
        documents: &[DocumentPayload],
    ) -> Result<(Application, Vec<Document>)> {
        let candidate_id = candidate_id.unwrap_or(principal.id);
        if candidate_id != principal.id && !principal.is_admin() {
            return Err(Error::Forbidden(
                "Only administrators may submit an application for another candidate".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let candidate = fetch_user(&mut tx, candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
        let announcement = fetch_announcement(&mut tx, announcement_id)
            .await?
            .ok_or_else(|| Error::NotFound("Announcement not found".to_string()))?;
        let academic_year_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM academic_years WHERE id = $1)")
                .bind(academic_year_id)
                .fetch_one(&mut *tx)
                .await?;
        if !academic_year_exists {
            return Err(Error::NotFound("Academic year not found".to_string()));
        }

        if !announcement.is_open(Utc::now()) {
            return Err(Error::WindowClosed);
        }

        if has_applied(&mut *tx, candidate_id, announcement_id).await? {
            return Err(Error::AlreadyApplied);
        }

        let insert = sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO applications \
                 (candidate_id, announcement_id, academic_year_id, application_type, status) \
             VALUES ($1, $2, $3, $4, 'PENDING') \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(candidate_id)
        .bind(announcement_id)
        .bind(academic_year_id)
        .bind(application_type)
        .fetch_one(&mut *tx)
        .await;

        let application = match insert {
            Ok(application) => application,
            // the unique constraint is the race backstop for the
            // check-then-insert above
            Err(err) if is_unique_violation(&err) => return Err(Error::AlreadyApplied),
            Err(err) => return Err(err.into()),
        };

        let mut stored_keys: Vec<String> = Vec::new();
        let mut attached = Vec::with_capacity(documents.len());
        for payload in documents {
            match self
                .attach_document(&mut tx, &application, payload, InvalidDocumentPolicy::Reject)
                .await
            {
                Ok((doc, key)) => {
                    stored_keys.push(key);
                    attached.push(doc);
                }
                Err(err) => {
                    self.discard_blobs(&stored_keys).await;
                    return Err(err);
                }
            }
        }

        let message = render_status_message(
            &candidate.full_name(),
            &announcement.title,
            ApplicationStatus::Pending,
            None,
        );
        NotificationService::record(
            &mut tx,
            candidate.id,
            application.id,
            NotificationType::ApplicationCreated,
            &message,
        )
        .await?;

        if let Err(err) = tx.commit().await {
            self.discard_blobs(&stored_keys).await;
            return Err(err.into());
        }

        tracing::info!(
            application_id = %application.id,
            candidate_id = %candidate_id,
            announcement_id = %announcement_id,
            documents = attached.len(),
            "application created"
        );
        Ok((application, attached))
    }

    /// Same-status transitions are a no-op: no history row, current state
    /// returned. Transitions out of a terminal status are locked.
    pub async fn transition(
        &self,
        id: Uuid,
        new_status: ApplicationStatus,
        actor: &Principal,
        comments: Option<&str>,
    ) -> Result<Application> {
        let mut tx = self.pool.begin().await?;

        let application = fetch_application_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;

        if application.status == new_status {
            tx.commit().await?;
            return Ok(application);
        }
        if application.status.is_terminal() {
            return Err(Error::ApplicationLocked);
        }
        if !application.status.can_transition_to(new_status) {
            return Err(Error::BadRequest(format!(
                "Invalid status transition {} -> {}",
                application.status, new_status
            )));
        }

        let is_rejection = new_status == ApplicationStatus::Rejected;
        let updated = sqlx::query_as::<_, Application>(&format!(
            "UPDATE applications \
             SET status = $2, \
                 rejection_reason = CASE WHEN $3 THEN $4 ELSE rejection_reason END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(new_status)
        .bind(is_rejection)
        .bind(comments)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO application_history \
                 (application_id, status_from, status_to, changed_by, comments) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(application.status)
        .bind(new_status)
        .bind(actor.id)
        .bind(comments)
        .execute(&mut *tx)
        .await?;

        let candidate = fetch_user(&mut tx, application.candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
        let announcement = fetch_announcement(&mut tx, application.announcement_id)
            .await?
            .ok_or_else(|| Error::NotFound("Announcement not found".to_string()))?;
        let message = render_status_message(
            &candidate.full_name(),
            &announcement.title,
            new_status,
            comments,
        );
        NotificationService::record(
            &mut tx,
            candidate.id,
            id,
            NotificationType::StatusChange,
            &message,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            application_id = %id,
            from = %application.status,
            to = %new_status,
            actor = %actor.id,
            "application status changed"
        );
        Ok(updated)
    }

    /// Full update: replaces the application type and, when documents are
    /// supplied, the whole document set. Old and new documents never mix.
    pub async fn update(
        &self,
        id: Uuid,
        principal: &Principal,
        application_type: ApplicationType,
        documents: &[DocumentPayload],
    ) -> Result<(Application, Vec<Document>)> {
        let mut tx = self.pool.begin().await?;

        let application = fetch_application_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        if application.candidate_id != principal.id && !principal.is_admin() {
            return Err(Error::Forbidden(
                "Applications can only be modified by their owner".to_string(),
            ));
        }

        let announcement = fetch_announcement(&mut tx, application.announcement_id)
            .await?
            .ok_or_else(|| Error::NotFound("Announcement not found".to_string()))?;
        if !announcement.is_open(Utc::now()) {
            return Err(Error::WindowClosed);
        }
        if !application.can_be_updated() {
            return Err(Error::ApplicationLocked);
        }

        let application = sqlx::query_as::<_, Application>(&format!(
            "UPDATE applications SET application_type = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(application_type)
        .fetch_one(&mut *tx)
        .await?;

        if documents.is_empty() {
            let current = fetch_documents(&mut *tx, id).await?;
            tx.commit().await?;
            return Ok((application, current));
        }

        let old_documents = fetch_documents(&mut *tx, id).await?;
        sqlx::query("DELETE FROM documents WHERE application_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let mut stored_keys: Vec<String> = Vec::new();
        let mut attached = Vec::with_capacity(documents.len());
        for payload in documents {
            match self
                .attach_document(&mut tx, &application, payload, InvalidDocumentPolicy::Persist)
                .await
            {
                Ok((doc, key)) => {
                    stored_keys.push(key);
                    attached.push(doc);
                }
                Err(err) => {
                    self.discard_blobs(&stored_keys).await;
                    return Err(err);
                }
            }
        }

        if let Err(err) = tx.commit().await {
            self.discard_blobs(&stored_keys).await;
            return Err(err.into());
        }

        // the replaced blobs only go once the new set is durable
        let old_keys: Vec<String> = old_documents.into_iter().map(|d| d.file_path).collect();
        self.discard_blobs(&old_keys).await;

        Ok((application, attached))
    }

    /// Cancellation removes the application, its documents, history and
    /// notifications in one transaction; blobs are deleted best-effort
    /// afterwards.
    pub async fn cancel(&self, id: Uuid, principal: &Principal) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let application = fetch_application_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        if application.candidate_id != principal.id && !principal.is_admin() {
            return Err(Error::Forbidden(
                "Applications can only be cancelled by their owner".to_string(),
            ));
        }

        let documents = fetch_documents(&mut *tx, id).await?;
        sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let keys: Vec<String> = documents.into_iter().map(|d| d.file_path).collect();
        self.discard_blobs(&keys).await;

        tracing::info!(application_id = %id, actor = %principal.id, "application cancelled");
        Ok(())
    }

    /// Detach one document: mutability gate, ownership check, row delete,
    /// then best-effort blob delete.
    pub async fn remove_document(
        &self,
        application_id: Uuid,
        document_id: Uuid,
        principal: &Principal,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let application = fetch_application_for_update(&mut tx, application_id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        if application.candidate_id != principal.id && !principal.is_admin() {
            return Err(Error::Forbidden(
                "Documents can only be removed by the application owner".to_string(),
            ));
        }
        if !application.can_be_updated() {
            return Err(Error::ApplicationLocked);
        }

        let doc = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(document_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Document not found".to_string()))?;

        if doc.application_id != application_id {
            return Err(Error::DocumentMismatch);
        }

        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.discard_blobs(std::slice::from_ref(&doc.file_path)).await;
        Ok(())
    }

    pub async fn get_with_documents(&self, id: Uuid) -> Result<(Application, Vec<Document>)> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;

        let documents = fetch_documents(&self.pool, id).await?;
        Ok((application, documents))
    }

    pub async fn list_by_announcement(
        &self,
        announcement_id: Uuid,
    ) -> Result<Vec<(Application, Vec<Document>)>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM job_announcements WHERE id = $1)",
        )
        .bind(announcement_id)
        .fetch_one(&self.pool)
        .await?;
        if !exists {
            return Err(Error::NotFound("Announcement not found".to_string()));
        }

        let applications = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE announcement_id = $1 ORDER BY created_at DESC"
        ))
        .bind(announcement_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_documents(applications).await
    }

    pub async fn list_by_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<(Application, Vec<Document>)>> {
        let applications = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE candidate_id = $1 ORDER BY created_at DESC"
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_documents(applications).await
    }

    pub async fn list_history(&self, application_id: Uuid) -> Result<Vec<ApplicationHistory>> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM applications WHERE id = $1)")
                .bind(application_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(Error::NotFound("Application not found".to_string()));
        }

        let history = sqlx::query_as::<_, ApplicationHistory>(
            "SELECT id, application_id, status_from, status_to, changed_by, change_date, comments \
             FROM application_history WHERE application_id = $1 ORDER BY change_date ASC",
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }

    pub async fn is_complete(&self, id: Uuid) -> Result<bool> {
        let (_, documents) = self.get_with_documents(id).await?;
        Ok(application::is_complete(&documents))
    }

    async fn with_documents(
        &self,
        applications: Vec<Application>,
    ) -> Result<Vec<(Application, Vec<Document>)>> {
        let ids: Vec<Uuid> = applications.iter().map(|a| a.id).collect();
        let mut all_documents = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE application_id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications
            .into_iter()
            .map(|application| {
                let (mine, rest): (Vec<_>, Vec<_>) = all_documents
                    .drain(..)
                    .partition(|doc| doc.application_id == application.id);
                all_documents = rest;
                (application, mine)
            })
            .collect())
    }

    /// Validate, store the blob, insert the row. The caller owns the
    /// returned storage key for cleanup if the surrounding transaction
    /// fails later.
    async fn attach_document(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        application: &Application,
        payload: &DocumentPayload,
        policy: InvalidDocumentPolicy,
    ) -> Result<(Document, String)> {
        let data = payload.decode_content()?;
        let mime_type = document::detect_mime(&data, &payload.original_filename);
        let status = document::validate(payload.document_type, &mime_type, data.len());

        if status == DocumentStatus::Invalid && policy == InvalidDocumentPolicy::Reject {
            return Err(Error::DocumentRejected(document::rejection_reason(
                payload.document_type,
                &mime_type,
                data.len(),
            )));
        }

        let document_id = Uuid::new_v4();
        let key = document::storage_key(
            application.announcement_id,
            application.candidate_id,
            document_id,
            &payload.original_filename,
        );

        self.files.put(&key, &data).await?;

        let inserted = sqlx::query_as::<_, Document>(&format!(
            "INSERT INTO documents \
                 (id, application_id, document_type, file_name, file_path, \
                  file_size, mime_type, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(document_id)
        .bind(application.id)
        .bind(payload.document_type)
        .bind(&payload.original_filename)
        .bind(&key)
        .bind(data.len() as i32)
        .bind(&mime_type)
        .bind(status)
        .fetch_one(&mut **tx)
        .await;

        match inserted {
            Ok(doc) => Ok((doc, key)),
            Err(err) => {
                self.discard_blobs(std::slice::from_ref(&key)).await;
                Err(err.into())
            }
        }
    }

    async fn discard_blobs(&self, keys: &[String]) {
        for key in keys {
            if let Err(err) = self.files.delete(key).await {
                tracing::warn!(key, error = ?err, "failed to remove blob");
            }
        }
    }
}

async fn fetch_user(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password, first_name, last_name, profile_picture, role, \
                created_at, updated_at \
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(user)
}

async fn fetch_announcement(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<JobAnnouncement>> {
    let announcement = sqlx::query_as::<_, JobAnnouncement>(
        "SELECT id, academic_year_id, title, description, status, publication_date, \
                closing_date, created_by, created_at, updated_at \
         FROM job_announcements WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(announcement)
}

async fn fetch_application_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Application>> {
    let application = sqlx::query_as::<_, Application>(&format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(application)
}

async fn fetch_documents<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    application_id: Uuid,
) -> Result<Vec<Document>> {
    let documents = sqlx::query_as::<_, Document>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents \
         WHERE application_id = $1 ORDER BY upload_date ASC"
    ))
    .bind(application_id)
    .fetch_all(executor)
    .await?;
    Ok(documents)
}

async fn has_applied<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    candidate_id: Uuid,
    announcement_id: Uuid,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM applications \
         WHERE candidate_id = $1 AND announcement_id = $2)",
    )
    .bind(candidate_id)
    .bind(announcement_id)
    .fetch_one(executor)
    .await?;
    Ok(exists)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
