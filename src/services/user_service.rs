use base64::Engine;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::user_dto::RegisterUserPayload;
use crate::error::{Error, Result};
use crate::models::notification::Notification;
use crate::models::user::{Principal, User, UserRole};
use crate::utils::crypto;

const USER_COLUMNS: &str =
    "id, email, password, first_name, last_name, profile_picture, role, created_at, updated_at";

const MAX_PROFILE_PICTURE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registration is open, but only an authenticated admin may create
    /// another admin account.
    pub async fn register(
        &self,
        payload: RegisterUserPayload,
        creator: Option<&Principal>,
    ) -> Result<User> {
        let role = payload.role.unwrap_or(UserRole::Candidate);
        if role == UserRole::Admin && !creator.map(Principal::is_admin).unwrap_or(false) {
            return Err(Error::Forbidden(
                "Only administrators can create admin accounts".to_string(),
            ));
        }

        if let Some(picture) = payload.profile_picture.as_deref() {
            validate_profile_picture(picture)?;
        }

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&payload.email)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            return Err(Error::BadRequest(
                "An account with this email already exists".to_string(),
            ));
        }

        let hashed = crypto::hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password, first_name, last_name, profile_picture, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(&payload.email)
        .bind(&hashed)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.profile_picture)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn update_password(&self, id: Uuid, new_password: &str) -> Result<()> {
        let hashed = crypto::hash_password(new_password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
        sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(&hashed)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, application_id, notification_type, message, status, \
                    sent_at, created_at \
             FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    /// Bootstrap account so a fresh deployment has an administrator.
    pub async fn seed_default_admin(&self) -> Result<()> {
        let config = crate::config::get_config();
        let (Some(email), Some(password)) = (
            config.default_admin_email.as_deref(),
            config.default_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.get_by_email(email).await?.is_some() {
            return Ok(());
        }

        let hashed = crypto::hash_password(password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
        sqlx::query(
            "INSERT INTO users (email, password, first_name, last_name, role) \
             VALUES ($1, $2, 'Default', 'Admin', 'ADMIN') \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(email)
        .bind(&hashed)
        .execute(&self.pool)
        .await?;

        tracing::info!(email, "default admin account created");
        Ok(())
    }
}

fn validate_profile_picture(base64_image: &str) -> Result<()> {
    let raw = base64_image
        .split_once(',')
        .map(|(_, data)| data)
        .unwrap_or(base64_image);
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(raw.trim())
        .map_err(|_| Error::BadRequest("Invalid profile picture data".to_string()))?;
    if decoded.len() > MAX_PROFILE_PICTURE_SIZE {
        return Err(Error::BadRequest(
            "Profile picture must not exceed 5MB".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_picture_size_gate() {
        let small = base64::engine::general_purpose::STANDARD.encode(vec![0u8; 1024]);
        assert!(validate_profile_picture(&small).is_ok());

        let oversize =
            base64::engine::general_purpose::STANDARD.encode(vec![0u8; MAX_PROFILE_PICTURE_SIZE + 1]);
        assert!(validate_profile_picture(&oversize).is_err());
    }

    #[test]
    fn profile_picture_accepts_data_uri() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"tiny");
        let uri = format!("data:image/png;base64,{encoded}");
        assert!(validate_profile_picture(&uri).is_ok());
    }

    #[test]
    fn profile_picture_rejects_garbage() {
        assert!(validate_profile_picture("!!!definitely not base64!!!").is_err());
    }
}
