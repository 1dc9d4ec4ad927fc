//! HTTP request handlers.

pub mod health;
pub mod profiles;
