//! Services layer for the identity core.
//!
//! Session issuance/verification, permission resolution, the authorization
//! gate, role registry, and the invitation lifecycle.

mod auth;
pub mod error;
mod gate;
mod invitation;
mod resolver;
mod role;
mod session;

pub use auth::{AuthService, LoginRequest, LoginResponse};
pub use error::ServiceError;
pub use gate::{bearer_token, AuthContext, AuthGate};
pub use invitation::InvitationService;
pub use resolver::{PermissionResolver, UserPermissions};
pub use role::RoleService;
pub use session::{SessionClaims, SessionService};
