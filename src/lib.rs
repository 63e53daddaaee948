//! Fitness Agent: client core for the fitness coaching backend.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod models;
pub mod onboarding;
pub mod retry;
