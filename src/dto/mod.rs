pub mod academic_year_dto;
pub mod announcement_dto;
pub mod application_dto;
pub mod auth_dto;
pub mod password_reset_dto;
pub mod user_dto;
