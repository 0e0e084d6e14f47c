use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::application::ApplicationStatus;

/// Immutable audit record of one accepted status transition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationHistory {
    pub id: Uuid,
    pub application_id: Uuid,
    pub status_from: ApplicationStatus,
    pub status_to: ApplicationStatus,
    pub changed_by: Uuid,
    pub change_date: DateTime<Utc>,
    pub comments: Option<String>,
}

impl ApplicationHistory {
    pub fn is_rejection(&self) -> bool {
        self.status_to == ApplicationStatus::Rejected
    }

    pub fn is_acceptance(&self) -> bool {
        self.status_to == ApplicationStatus::Accepted
    }
}
