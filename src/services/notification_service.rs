use reqwest::Client;
use serde_json::json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::notification::NotificationType;

/// Records notifications inside lifecycle transactions and drains them to
/// the mail gateway from a background worker. Delivery failures never
/// propagate into the transaction that recorded the notification.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    client: Client,
    target_url: String,
}

impl NotificationService {
    pub fn new(pool: PgPool, target_url: String) -> Self {
        Self {
            pool,
            client: Client::new(),
            target_url,
        }
    }

    pub async fn record(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        application_id: Uuid,
        notification_type: NotificationType,
        message: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO notifications (user_id, application_id, notification_type, message)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(user_id)
        .bind(application_id)
        .bind(notification_type)
        .bind(message)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// One worker step: claim the oldest pending notification, post it to
    /// the mail gateway, mark the outcome. Returns false when the queue is
    /// empty so the worker can back off.
    pub async fn run_once(&self) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let row_opt = sqlx::query(
            r#"SELECT n.id, n.message, n.notification_type, u.email
               FROM notifications n
               JOIN users u ON u.id = n.user_id
               WHERE n.status = 'PENDING'
               ORDER BY n.created_at ASC
               FOR UPDATE OF n SKIP LOCKED
               LIMIT 1"#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row_opt else {
            tx.commit().await?;
            return Ok(false);
        };

        let id: Uuid = row.try_get("id")?;
        let message: String = row.try_get("message")?;
        let notification_type: NotificationType = row.try_get("notification_type")?;
        let email: String = row.try_get("email")?;

        let delivered = self
            .deliver(&email, subject_for(notification_type), &message)
            .await;

        if delivered {
            sqlx::query(
                r#"UPDATE notifications SET status = 'SENT', sent_at = NOW() WHERE id = $1"#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(r#"UPDATE notifications SET status = 'FAILED' WHERE id = $1"#)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) -> bool {
        let result = self
            .client
            .post(&self.target_url)
            .json(&json!({ "to": to, "subject": subject, "body": body }))
            .send()
            .await;
        match result {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), to, "mail gateway refused notification");
                false
            }
            Err(err) => {
                tracing::warn!(error = ?err, to, "mail gateway unreachable");
                false
            }
        }
    }

    /// Immediate, non-queued delivery for mails that are not tied to an
    /// application (password reset codes).
    pub async fn send_direct(&self, to: &str, subject: &str, body: &str) {
        if !self.deliver(to, subject, body).await {
            tracing::warn!(to, subject, "direct mail delivery failed");
        }
    }
}

fn subject_for(notification_type: NotificationType) -> &'static str {
    match notification_type {
        NotificationType::ApplicationCreated => "Your application has been received",
        NotificationType::StatusChange => "Update on your application",
    }
}
