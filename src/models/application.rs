use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::document::{Document, DocumentStatus, DocumentType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationType {
    FullTime,
    PartTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Accepted,
    Rejected,
    Cancelled,
}

impl ApplicationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Cancelled
        )
    }

    /// The transition table. Same-status moves are handled upstream as
    /// no-ops and never reach this check.
    pub fn can_transition_to(self, target: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        match self {
            Pending => matches!(target, UnderReview | Accepted | Rejected | Cancelled),
            UnderReview => matches!(target, Accepted | Rejected | Cancelled),
            Accepted | Rejected | Cancelled => false,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::UnderReview => "UNDER_REVIEW",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
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

impl Application {
    pub fn can_be_updated(&self) -> bool {
        matches!(
            self.status,
            ApplicationStatus::Pending | ApplicationStatus::UnderReview
        )
    }
}

/// Completeness: at least one CV and one motivation letter, every attached
/// document VALID.
pub fn is_complete(documents: &[Document]) -> bool {
    let has_cv = documents
        .iter()
        .any(|doc| doc.document_type == DocumentType::Cv);
    let has_letter = documents
        .iter()
        .any(|doc| doc.document_type == DocumentType::MotivationLetter);
    let all_valid = documents
        .iter()
        .all(|doc| doc.status == DocumentStatus::Valid);
    has_cv && has_letter && all_valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(document_type: DocumentType, status: DocumentStatus) -> Document {
        Document {
            id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            document_type,
            file_name: "file.pdf".to_string(),
            file_path: "key.pdf".to_string(),
            file_size: 1024,
            mime_type: "application/pdf".to_string(),
            upload_date: Some(Utc::now()),
            status,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn pending_can_reach_every_non_terminal_and_terminal_state() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition_to(UnderReview));
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
    }

    #[test]
    fn under_review_cannot_go_back_to_pending() {
        use ApplicationStatus::*;
        assert!(!UnderReview.can_transition_to(Pending));
        assert!(UnderReview.can_transition_to(Accepted));
        assert!(UnderReview.can_transition_to(Rejected));
        assert!(UnderReview.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_allow_no_exit() {
        use ApplicationStatus::*;
        for from in [Accepted, Rejected, Cancelled] {
            for to in [Pending, UnderReview, Accepted, Rejected, Cancelled] {
                if from != to {
                    assert!(!from.can_transition_to(to), "{from} -> {to} must be locked");
                }
            }
            assert!(from.is_terminal());
        }
    }

    #[test]
    fn complete_needs_cv_and_motivation_letter() {
        let docs = vec![
            doc(DocumentType::Cv, DocumentStatus::Valid),
            doc(DocumentType::MotivationLetter, DocumentStatus::Valid),
        ];
        assert!(is_complete(&docs));

        let cv_only = vec![doc(DocumentType::Cv, DocumentStatus::Valid)];
        assert!(!is_complete(&cv_only));

        let letter_only = vec![doc(DocumentType::MotivationLetter, DocumentStatus::Valid)];
        assert!(!is_complete(&letter_only));

        assert!(!is_complete(&[]));
    }

    #[test]
    fn any_invalid_document_breaks_completeness() {
        // an INVALID extra document flips completeness regardless of order
        let mut docs = vec![
            doc(DocumentType::Cv, DocumentStatus::Valid),
            doc(DocumentType::MotivationLetter, DocumentStatus::Valid),
            doc(DocumentType::Other, DocumentStatus::Invalid),
        ];
        assert!(!is_complete(&docs));

        docs.rotate_right(1);
        assert!(!is_complete(&docs));

        // a VALID extra document does not
        let docs = vec![
            doc(DocumentType::Other, DocumentStatus::Valid),
            doc(DocumentType::Cv, DocumentStatus::Valid),
            doc(DocumentType::MotivationLetter, DocumentStatus::Valid),
        ];
        assert!(is_complete(&docs));
    }

    #[test]
    fn only_pending_and_under_review_are_editable() {
        let mut app = Application {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            announcement_id: Uuid::new_v4(),
            academic_year_id: Uuid::new_v4(),
            application_type: ApplicationType::FullTime,
            status: ApplicationStatus::Pending,
            rejection_reason: None,
            created_at: None,
            updated_at: None,
        };
        assert!(app.can_be_updated());
        app.status = ApplicationStatus::UnderReview;
        assert!(app.can_be_updated());
        for status in [
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Cancelled,
        ] {
            app.status = status;
            assert!(!app.can_be_updated());
        }
    }
}
