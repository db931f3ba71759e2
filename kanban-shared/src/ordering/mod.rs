//! Dense ordering of columns within boards and cards within columns
//!
//! [`plan`] is the pure core: it splices id vectors and renumbers them.
//! [`store`] wraps it in locked transactions against PostgreSQL and also
//! owns creation and deletion, the other two operations that change an
//! `order_index`.

pub mod plan;
pub mod store;

pub use plan::{plan_move, Anchors, MovePlan, MoveRequest};
pub use store::{move_card, move_column, CardMove};
