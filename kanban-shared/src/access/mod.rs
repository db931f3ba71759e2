//! Board access control
//!
//! - [`role`]: the four board roles and their ranking
//! - [`resolver`]: walks a resource up to its board and loads the user's role
//! - [`gate`]: pure allow/deny decisions for an operation and a role

pub mod gate;
pub mod resolver;
pub mod role;

pub use gate::{authorize, Operation};
pub use resolver::{Resolution, RoleResolver, VerboseResolution};
pub use role::Role;
