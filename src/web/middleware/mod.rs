//! HTTP middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Request logger: request id, status, latency
//! 2. Session loader: cookie → `SessionContext`, written back afterwards
//! 3. Guard (per route group): login, admin or doctor

pub mod guard;
pub mod session;
pub mod trace;
