pub mod academic_year_service;
pub mod announcement_service;
pub mod application_service;
pub mod auth_service;
pub mod file_store;
pub mod notification_service;
pub mod password_reset_service;
pub mod user_service;
