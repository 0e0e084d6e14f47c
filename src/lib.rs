pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    academic_year_service::AcademicYearService, announcement_service::AnnouncementService,
    application_service::ApplicationService, auth_service::AuthService, file_store::FileStore,
    notification_service::NotificationService, password_reset_service::PasswordResetService,
    user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub application_service: ApplicationService,
    pub announcement_service: AnnouncementService,
    pub academic_year_service: AcademicYearService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub password_reset_service: PasswordResetService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let file_store = FileStore::from_config();
        let notification_service =
            NotificationService::new(pool.clone(), config.mail_webhook_url.clone());
        let application_service = ApplicationService::new(pool.clone(), file_store);
        let announcement_service = AnnouncementService::new(pool.clone());
        let academic_year_service = AcademicYearService::new(pool.clone());
        let user_service = UserService::new(pool.clone());
        let auth_service = AuthService::new(pool.clone());
        let password_reset_service = PasswordResetService::new(
            pool.clone(),
            user_service.clone(),
            notification_service.clone(),
        );

        Self {
            pool,
            application_service,
            announcement_service,
            academic_year_service,
            user_service,
            auth_service,
            password_reset_service,
            notification_service,
        }
    }
}
