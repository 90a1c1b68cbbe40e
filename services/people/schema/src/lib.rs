//! sea-orm entities for the people service.

pub mod account_roles;
pub mod attendances;
pub mod departments;
pub mod employees;
pub mod leaves;
pub mod users;
