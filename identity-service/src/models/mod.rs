//! Domain models for the identity service.

pub mod invitation;
pub mod permission;
pub mod role;
pub mod user;

pub use invitation::{
    AcceptInvitationRequest, AcceptInvitationResponse, CreateInvitationRequest,
    CreateInvitationResponse, Invitation, InvitationDetailsResponse,
};
pub use permission::Permission;
pub use role::{AssignRoleRequest, CreateRoleRequest, Role, RoleResponse, UpdateRoleRequest};
pub use user::{SanitizedUser, User};
