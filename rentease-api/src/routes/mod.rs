/// API route handlers
///
/// - `health`: liveness and storage check
/// - `auth`: registration, login, logout, password reset
/// - `dashboard`: role-gated dashboard pages
/// - `landlord`: landlord account, tenant list, landlord directory
/// - `tenant`: tenant account
/// - `settings`: multipart settings form shared by both roles
/// - `payments`: simulated rent payment
/// - `realtime`: dashboard WebSocket

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod landlord;
pub mod payments;
pub mod realtime;
pub mod settings;
pub mod tenant;
