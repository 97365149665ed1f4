pub mod admin;
pub mod leave_request;
pub mod user;
