//! Server-rendered web front end.
//!
//! Routes are grouped behind login, admin and doctor guards; every
//! request passes through the request logger and the session loader.
//! Handlers render HTML or redirect with a flash message.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
pub mod views;

pub use router::app_router;
pub use server::{serve, start, WebServer};
pub use types::WebContext;
