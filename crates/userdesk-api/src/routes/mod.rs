//! # API Route Modules
//!
//! - `users` — Self-service user operations (change email).

pub mod users;
