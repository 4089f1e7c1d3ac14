//! Shared errors and configuration for Invoicer.
//!
//! This crate provides the pieces every other crate agrees on:
//! - Application-wide error type with HTTP status mapping
//! - Layered configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, PdfConfig, RatesConfig, ServerConfig};
pub use error::{AppError, AppResult};
