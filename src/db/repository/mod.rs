//! Repository layer: entity-scoped relational operations on a borrowed connection.

mod patient;
mod user;

pub use patient::*;
pub use user::*;
