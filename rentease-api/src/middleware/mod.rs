/// Middleware for the API server
///
/// - `security`: response security headers
/// - `role_gate`: redirects dashboard requests from the wrong role to `/login`
///
/// Session resolution itself lives in `rentease_shared::auth::middleware`.

pub mod role_gate;
pub mod security;
