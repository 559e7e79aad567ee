//! Core business logic for komuna.

pub mod services;

pub use services::*;
