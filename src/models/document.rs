use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

const WORD_MIMES: [&str; 2] = [
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Cv,
    MotivationLetter,
    Diploma,
    Other,
}

impl DocumentType {
    pub fn allows_mime(self, mime_type: &str) -> bool {
        match self {
            DocumentType::Cv | DocumentType::MotivationLetter => {
                mime_type == "application/pdf" || WORD_MIMES.contains(&mime_type)
            }
            DocumentType::Diploma => {
                matches!(mime_type, "application/pdf" | "image/jpeg" | "image/png")
            }
            DocumentType::Other => {
                mime_type == "application/pdf"
                    || mime_type.starts_with("image/")
                    || WORD_MIMES.contains(&mime_type)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub application_id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i32,
    pub mime_type: String,
    pub upload_date: Option<DateTime<Utc>>,
    pub status: DocumentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Pure size/MIME validation. Never fails: the caller decides what an
/// INVALID outcome means on its path.
pub fn validate(document_type: DocumentType, mime_type: &str, byte_size: usize) -> DocumentStatus {
    if byte_size > MAX_FILE_SIZE {
        return DocumentStatus::Invalid;
    }
    if !document_type.allows_mime(mime_type) {
        return DocumentStatus::Invalid;
    }
    DocumentStatus::Valid
}

pub fn rejection_reason(document_type: DocumentType, mime_type: &str, byte_size: usize) -> String {
    if byte_size > MAX_FILE_SIZE {
        "File exceeds the maximum size of 10MB".to_string()
    } else {
        format!(
            "Content type {} is not accepted for {:?} documents",
            mime_type, document_type
        )
    }
}

/// Content sniffing by magic bytes, with an extension fallback for the
/// container formats that zip/OLE2 signatures cannot distinguish.
pub fn detect_mime(data: &[u8], file_name: &str) -> String {
    let ext = file_extension(file_name);
    if data.starts_with(b"%PDF") {
        return "application/pdf".to_string();
    }
    if data.starts_with(&[0xFF, 0xD8]) {
        return "image/jpeg".to_string();
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return "image/png".to_string();
    }
    // legacy .doc is an OLE2 compound file
    if data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return "application/msword".to_string();
    }
    // .docx is a zip container; trust the extension to pick the flavour
    if data.starts_with(b"PK\x03\x04") && ext == "docx" {
        return WORD_MIMES[1].to_string();
    }
    match ext.as_str() {
        "pdf" => "application/pdf".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "png" => "image/png".to_string(),
        "doc" => "application/msword".to_string(),
        "docx" => WORD_MIMES[1].to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

pub fn file_extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

/// Storage key: collision-free and traceable back to the announcement,
/// candidate and document it belongs to.
pub fn storage_key(
    announcement_id: Uuid,
    candidate_id: Uuid,
    document_id: Uuid,
    file_name: &str,
) -> String {
    format!(
        "{}_{}_{}.{}",
        announcement_id,
        candidate_id,
        document_id,
        file_extension(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_cv_within_limit_is_valid() {
        assert_eq!(
            validate(DocumentType::Cv, "application/pdf", 2 * 1024 * 1024),
            DocumentStatus::Valid
        );
    }

    #[test]
    fn size_limit_is_inclusive() {
        // exactly 10 MiB passes, one byte more fails regardless of MIME
        assert_eq!(
            validate(DocumentType::Cv, "application/pdf", MAX_FILE_SIZE),
            DocumentStatus::Valid
        );
        assert_eq!(
            validate(DocumentType::Cv, "application/pdf", MAX_FILE_SIZE + 1),
            DocumentStatus::Invalid
        );
        assert_eq!(
            validate(DocumentType::Diploma, "image/png", MAX_FILE_SIZE + 1),
            DocumentStatus::Invalid
        );
    }

    #[test]
    fn mime_rules_per_document_type() {
        assert!(DocumentType::Cv.allows_mime("application/msword"));
        assert!(DocumentType::MotivationLetter.allows_mime(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ));
        assert!(!DocumentType::Cv.allows_mime("image/png"));

        assert!(DocumentType::Diploma.allows_mime("image/jpeg"));
        assert!(DocumentType::Diploma.allows_mime("image/png"));
        assert!(!DocumentType::Diploma.allows_mime("application/msword"));
        assert!(!DocumentType::Diploma.allows_mime("image/gif"));

        assert!(DocumentType::Other.allows_mime("image/gif"));
        assert!(DocumentType::Other.allows_mime("application/pdf"));
        assert!(!DocumentType::Other.allows_mime("application/zip"));
        assert!(!DocumentType::Other.allows_mime("application/octet-stream"));
    }

    #[test]
    fn magic_bytes_win_over_extension() {
        assert_eq!(detect_mime(b"%PDF-1.7 rest", "cv.docx"), "application/pdf");
        assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0], "photo.png"), "image/jpeg");
        assert_eq!(
            detect_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A], "diploma.jpg"),
            "image/png"
        );
        assert_eq!(
            detect_mime(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1], "letter.doc"),
            "application/msword"
        );
    }

    #[test]
    fn docx_zip_container_needs_matching_extension() {
        assert_eq!(
            detect_mime(b"PK\x03\x04rest", "cv.docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        // a zip that is not claiming to be docx stays unknown
        assert_eq!(
            detect_mime(b"PK\x03\x04rest", "archive.zip"),
            "application/octet-stream"
        );
    }

    #[test]
    fn extension_fallback_for_unsniffable_content() {
        assert_eq!(detect_mime(b"plain bytes", "cv.pdf"), "application/pdf");
        assert_eq!(detect_mime(b"plain bytes", "notes.txt"), "application/octet-stream");
    }

    #[test]
    fn storage_key_embeds_owners_and_lowercases_extension() {
        let announcement = Uuid::new_v4();
        let candidate = Uuid::new_v4();
        let document = Uuid::new_v4();
        let key = storage_key(announcement, candidate, document, "My CV.PDF");
        assert_eq!(
            key,
            format!("{}_{}_{}.pdf", announcement, candidate, document)
        );
    }

    #[test]
    fn extension_defaults_to_bin() {
        assert_eq!(file_extension("no-extension"), "bin");
        assert_eq!(file_extension("archive.TAR"), "tar");
    }
}
