use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetOtp {
    pub id: Uuid,
    pub email: String,
    pub otp_code: String,
    pub expiry_date: DateTime<Utc>,
    pub is_used: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl PasswordResetOtp {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_exclusive_of_the_deadline() {
        let now = Utc::now();
        let otp = PasswordResetOtp {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            otp_code: "123456".to_string(),
            expiry_date: now,
            is_used: false,
            created_at: Some(now - Duration::hours(1)),
        };
        assert!(!otp.is_expired(now));
        assert!(otp.is_expired(now + Duration::seconds(1)));
    }
}
