pub mod auth;
pub mod interfaces;
