//! HTTP handlers for the identity service.

pub mod auth;
pub mod invitation;
pub mod role;
pub mod user;

pub use auth::*;
pub use invitation::*;
pub use role::*;
pub use user::*;
