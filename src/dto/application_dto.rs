use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus, ApplicationType};
use crate::models::document::{Document, DocumentStatus, DocumentType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub base64_content: String,
    pub original_filename: String,
    pub document_type: DocumentType,
}

impl DocumentPayload {
    /// Accepts both raw base64 and `data:` URIs with a media-type prefix.
    pub fn decode_content(&self) -> Result<Vec<u8>> {
        let raw = self
            .base64_content
            .split_once(',')
            .map(|(_, data)| data)
            .unwrap_or(&self.base64_content);
        base64::engine::general_purpose::STANDARD
            .decode(raw.trim())
            .map_err(|_| Error::BadRequest("Invalid base64 document content".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplicationPayload {
    /// Defaults to the authenticated candidate; only admins may submit on
    /// behalf of someone else.
    pub candidate_id: Option<Uuid>,
    pub announcement_id: Uuid,
    pub academic_year_id: Uuid,
    pub application_type: ApplicationType,
    #[serde(default)]
    pub documents: Vec<DocumentPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateApplicationPayload {
    pub application_type: ApplicationType,
    #[serde(default)]
    pub documents: Vec<DocumentPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdatePayload {
    pub status: ApplicationStatus,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i32,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub upload_date: Option<DateTime<Utc>>,
}

impl From<Document> for DocumentResponse {
    fn from(value: Document) -> Self {
        Self {
            id: value.id,
            document_type: value.document_type,
            // the storage key is served under the documents route, never as
            // a raw filesystem path
            file_path: format!("/api/documents/{}", value.file_path),
            file_name: value.file_name,
            file_size: value.file_size,
            mime_type: value.mime_type,
            status: value.status,
            upload_date: value.upload_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub announcement_id: Uuid,
    pub academic_year_id: Uuid,
    pub application_type: ApplicationType,
    pub status: ApplicationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        Self {
            id: value.id,
            candidate_id: value.candidate_id,
            announcement_id: value.announcement_id,
            academic_year_id: value.academic_year_id,
            application_type: value.application_type,
            status: value.status,
            rejection_reason: value.rejection_reason,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDetailResponse {
    #[serde(flatten)]
    pub application: ApplicationResponse,
    pub documents: Vec<DocumentResponse>,
}

impl ApplicationDetailResponse {
    pub fn new(application: Application, documents: Vec<Document>) -> Self {
        Self {
            application: application.into(),
            documents: documents.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessResponse {
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_data_uri_prefix() {
        let payload = DocumentPayload {
            base64_content: "data:application/pdf;base64,JVBERg==".to_string(),
            original_filename: "cv.pdf".to_string(),
            document_type: DocumentType::Cv,
        };
        assert_eq!(payload.decode_content().unwrap(), b"%PDF");
    }

    #[test]
    fn decode_accepts_bare_base64() {
        let payload = DocumentPayload {
            base64_content: "JVBERg==".to_string(),
            original_filename: "cv.pdf".to_string(),
            document_type: DocumentType::Cv,
        };
        assert_eq!(payload.decode_content().unwrap(), b"%PDF");
    }

    #[test]
    fn decode_rejects_garbage() {
        let payload = DocumentPayload {
            base64_content: "@@not-base64@@".to_string(),
            original_filename: "cv.pdf".to_string(),
            document_type: DocumentType::Cv,
        };
        assert!(payload.decode_content().is_err());
    }
}
