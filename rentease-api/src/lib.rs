//! # RentEase API Server Library
//!
//! HTTP and WebSocket surface of RentEase.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body extractor with API error rejections
//! - `middleware`: Security headers and the dashboard role gate
//! - `routes`: Route handlers
//! - `uploads`: Profile picture validation and storage

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod uploads;
