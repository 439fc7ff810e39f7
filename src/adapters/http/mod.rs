//! HTTP Adapter
//!
//! axum router exposing the proxy at `/` and `/api/solboy` with permissive CORS.

mod server;

pub use server::{build_router, run_server};
