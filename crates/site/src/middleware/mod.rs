//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Admin gate (session check on the reserved `/admin` prefix)

pub mod gate;
pub mod request_id;

pub use gate::{ADMIN_PREFIX, LOGIN_PATH, UNAUTHORIZED_PATH, admin_gate, is_admin_path};
pub use request_id::request_id_middleware;
