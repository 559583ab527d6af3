pub mod config;
pub mod error;
pub mod gamification;
pub mod search;
pub mod telemetry;
