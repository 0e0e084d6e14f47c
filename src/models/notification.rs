use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::application::ApplicationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    ApplicationCreated,
    StatusChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub notification_type: NotificationType,
    pub message: String,
    pub status: NotificationStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Message body for a status-change email, rendered once at recording time.
pub fn render_status_message(
    candidate_name: &str,
    announcement_title: &str,
    new_status: ApplicationStatus,
    reason: Option<&str>,
) -> String {
    match new_status {
        ApplicationStatus::Pending => format!(
            "Hello {candidate_name},\n\nWe confirm that your application for \
             the position \"{announcement_title}\" has been received. Your file \
             is now awaiting review.\n\nThe recruitment team"
        ),
        ApplicationStatus::UnderReview => format!(
            "Hello {candidate_name},\n\nYour application for the position \
             \"{announcement_title}\" is now under review. We will keep you \
             informed of the outcome.\n\nThe recruitment team"
        ),
        ApplicationStatus::Accepted => format!(
            "Hello {candidate_name},\n\nCongratulations! Your application for \
             the position \"{announcement_title}\" has been accepted. We will \
             contact you shortly to discuss the next steps.\n\nThe recruitment team"
        ),
        ApplicationStatus::Rejected => {
            let motive = reason
                .filter(|r| !r.trim().is_empty())
                .map(|r| format!("Reason: {r}"))
                .unwrap_or_else(|| {
                    "We received many applications and had to make difficult choices.".to_string()
                });
            format!(
                "Hello {candidate_name},\n\nThank you for your interest in the \
                 position \"{announcement_title}\". After careful review, we are \
                 unable to move forward with your application.\n\n{motive}\n\n\
                 The recruitment team"
            )
        }
        ApplicationStatus::Cancelled => format!(
            "Hello {candidate_name},\n\nYour application for the position \
             \"{announcement_title}\" has been withdrawn.\n\nThe recruitment team"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_carries_the_reason() {
        let msg = render_status_message(
            "Awa Diop",
            "Lecturer",
            ApplicationStatus::Rejected,
            Some("incomplete profile"),
        );
        assert!(msg.contains("Reason: incomplete profile"));
    }

    #[test]
    fn rejection_without_reason_uses_generic_motive() {
        let msg = render_status_message("Awa Diop", "Lecturer", ApplicationStatus::Rejected, None);
        assert!(msg.contains("difficult choices"));
        let msg = render_status_message(
            "Awa Diop",
            "Lecturer",
            ApplicationStatus::Rejected,
            Some("   "),
        );
        assert!(!msg.contains("Reason:"));
    }

    #[test]
    fn every_status_renders_the_announcement_title() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::UnderReview,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Cancelled,
        ] {
            let msg = render_status_message("A", "Research Assistant", status, None);
            assert!(msg.contains("Research Assistant"), "{status} message lacks title");
        }
    }
}
