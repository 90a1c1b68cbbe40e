pub mod attendance;
pub mod auth;
pub mod credential;
pub mod dashboard;
pub mod department;
pub mod employee;
pub mod leave;
