pub mod academic_year;
pub mod announcement;
pub mod application;
pub mod document;
pub mod history;
pub mod notification;
pub mod password_reset;
pub mod user;
