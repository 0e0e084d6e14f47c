use sqlx::PgPool;

use crate::dto::auth_dto::LoginResponse;
use crate::error::{Error, Result};
use crate::middleware::auth::issue_token;
use crate::models::user::User;
use crate::utils::crypto;

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, first_name, last_name, profile_picture, role, \
                    created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?;

        let verified = crypto::verify_password(password, &user.password)
            .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?;
        if !verified {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        }

        let token = issue_token(&user)?;
        Ok(LoginResponse {
            token,
            email: user.email,
            role: user.role,
        })
    }
}
