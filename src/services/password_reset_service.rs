use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::models::password_reset::PasswordResetOtp;
use crate::services::notification_service::NotificationService;
use crate::services::user_service::UserService;

const OTP_LENGTH: usize = 6;
const OTP_EXPIRY_HOURS: i64 = 24;

#[derive(Clone)]
pub struct PasswordResetService {
    pool: PgPool,
    users: UserService,
    mailer: NotificationService,
}

impl PasswordResetService {
    pub fn new(pool: PgPool, users: UserService, mailer: NotificationService) -> Self {
        Self {
            pool,
            users,
            mailer,
        }
    }

    /// Generates a fresh code and invalidates any still-active one for the
    /// same address.
    pub async fn request(&self, email: &str) -> Result<()> {
        let user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        let code = generate_otp();

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE password_reset_otps SET is_used = TRUE WHERE email = $1 AND is_used = FALSE")
            .bind(email)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO password_reset_otps (email, otp_code, expiry_date) VALUES ($1, $2, $3)",
        )
        .bind(email)
        .bind(&code)
        .bind(Utc::now() + Duration::hours(OTP_EXPIRY_HOURS))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let body = format!(
            "Hello {},\n\nYou requested a password reset. Your reset code is: {}\n\n\
             The code is valid for 24 hours. If you did not request this, you can \
             ignore this email.\n\nThe recruitment team",
            user.first_name, code
        );
        self.mailer
            .send_direct(email, "Password reset code", &body)
            .await;

        Ok(())
    }

    pub async fn confirm(&self, email: &str, otp_code: &str, new_password: &str) -> Result<()> {
        let user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        let mut tx = self.pool.begin().await?;
        let otp = sqlx::query_as::<_, PasswordResetOtp>(
            "SELECT id, email, otp_code, expiry_date, is_used, created_at \
             FROM password_reset_otps \
             WHERE email = $1 AND is_used = FALSE \
             ORDER BY created_at DESC LIMIT 1 \
             FOR UPDATE",
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::BadRequest("Invalid reset code".to_string()))?;

        if !codes_match(&otp.otp_code, otp_code) {
            return Err(Error::BadRequest("Invalid reset code".to_string()));
        }
        if otp.is_expired(Utc::now()) {
            return Err(Error::BadRequest("This code has expired".to_string()));
        }

        sqlx::query("UPDATE password_reset_otps SET is_used = TRUE WHERE id = $1")
            .bind(otp.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.users.update_password(user.id, new_password).await?;

        tracing::info!(email, "password reset completed");
        Ok(())
    }
}

fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

fn codes_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let code = generate_otp();
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn code_comparison_requires_exact_match() {
        assert!(codes_match("123456", "123456"));
        assert!(!codes_match("123456", "123457"));
        assert!(!codes_match("123456", "12345"));
    }
}
