pub mod allergy;
pub mod assessment;
pub mod enums;
pub mod patient;
pub mod user;

pub use allergy::*;
pub use assessment::*;
pub use patient::*;
pub use user::*;
