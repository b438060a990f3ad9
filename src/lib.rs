// Telemetry store boundary and sensor readings
pub mod telemetry;

// Auto-irrigation controller
pub mod controller;

// Low-water notifications
pub mod notify;

// Authentication boundary
pub mod auth;

// Configuration
pub mod config;
