pub mod academic_year_routes;
pub mod announcement_routes;
pub mod application_routes;
pub mod auth_routes;
pub mod health;
pub mod password_reset_routes;
pub mod user_routes;
