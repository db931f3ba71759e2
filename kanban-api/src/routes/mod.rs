/// API route handlers, one module per resource
///
/// Every board-scoped handler follows the same shape: resolve the caller's
/// role on the resource, check the operation against it, then write through
/// the model or the ordering store.

pub mod assignees;
pub mod attachments;
pub mod boards;
pub mod cards;
pub mod checklist;
pub mod columns;
pub mod comments;
pub mod health;
pub mod members;
pub mod users;
