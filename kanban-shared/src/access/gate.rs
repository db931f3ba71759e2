/// Permission decisions for board operations
///
/// [`authorize`] is a pure function of the operation and the actor's role. It
/// never touches storage; callers obtain the actor's role (and the target
/// member's role, for membership changes) through the
/// [`RoleResolver`](super::resolver::RoleResolver) first.
///
/// # Rules
///
/// | Operation        | Allowed when                                              |
/// |------------------|-----------------------------------------------------------|
/// | `Read`           | any role                                                  |
/// | `MutateContent`  | role above `viewer`                                       |
/// | `RenameBoard`    | `admin` or `editor_chief`                                 |
/// | `DeleteBoard`    | `admin`                                                   |
/// | `AddMember`      | `admin` or `editor_chief`                                 |
/// | `ChangeRole`     | `admin`, or strict dominance over both old and new role   |
/// | `RemoveMember`   | removing yourself, `admin`, or strict dominance           |
///
/// # Example
///
/// ```
/// use kanban_shared::access::gate::{authorize, Operation};
/// use kanban_shared::access::role::Role;
///
/// let promote_to_admin = Operation::ChangeRole {
///     target_current: Role::Viewer,
///     new_role: Role::Admin,
/// };
/// assert!(authorize(&promote_to_admin, Role::EditorChief).is_err());
///
/// let promote_to_editor = Operation::ChangeRole {
///     target_current: Role::Viewer,
///     new_role: Role::Editor,
/// };
/// assert!(authorize(&promote_to_editor, Role::EditorChief).is_ok());
/// ```

use super::role::Role;
use crate::error::CoreError;

/// Operation classes distinguished by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Any read of board, column, card or leaf content
    Read,

    /// Create, update, delete or move cards, columns, comments, checklist
    /// fields, attachments, assignments, covers and backgrounds
    MutateContent,

    /// Rename the board or change its settings (invite link included)
    RenameBoard,

    /// Delete the whole board
    DeleteBoard,

    /// Add a new member (who always starts as `viewer`)
    AddMember,

    /// Change an existing member's role
    ChangeRole { target_current: Role, new_role: Role },

    /// Remove a member from the board
    RemoveMember { is_self: bool, target_role: Role },
}

impl Operation {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::MutateContent => "mutate_content",
            Operation::RenameBoard => "rename_board",
            Operation::DeleteBoard => "delete_board",
            Operation::AddMember => "add_member",
            Operation::ChangeRole { .. } => "change_role",
            Operation::RemoveMember { .. } => "remove_member",
        }
    }
}

/// Decides whether `actor` may perform `operation`
///
/// # Errors
///
/// Returns [`CoreError::NotPermitted`] on denial; no other error is possible.
pub fn authorize(operation: &Operation, actor: Role) -> Result<(), CoreError> {
    if is_allowed(operation, actor) {
        Ok(())
    } else {
        Err(CoreError::NotPermitted(format!(
            "role '{}' may not perform {}",
            actor,
            operation.name()
        )))
    }
}

fn is_allowed(operation: &Operation, actor: Role) -> bool {
    match *operation {
        Operation::Read => true,
        Operation::MutateContent => actor.dominates(Role::Viewer),
        Operation::RenameBoard | Operation::AddMember => manages_members(actor),
        Operation::DeleteBoard => actor == Role::Admin,
        Operation::ChangeRole {
            target_current,
            new_role,
        } => {
            actor == Role::Admin
                || (manages_members(actor)
                    && actor.dominates(new_role)
                    && actor.dominates(target_current))
        }
        Operation::RemoveMember {
            is_self,
            target_role,
        } => {
            is_self
                || actor == Role::Admin
                || (manages_members(actor) && actor.dominates(target_role))
        }
    }
}

fn manages_members(actor: Role) -> bool {
    matches!(actor, Role::Admin | Role::EditorChief)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutations() -> Vec<Operation> {
        let mut ops = vec![
            Operation::MutateContent,
            Operation::RenameBoard,
            Operation::DeleteBoard,
            Operation::AddMember,
        ];
        for target in Role::ALL {
            for new_role in Role::ALL {
                ops.push(Operation::ChangeRole {
                    target_current: target,
                    new_role,
                });
            }
            ops.push(Operation::RemoveMember {
                is_self: false,
                target_role: target,
            });
        }
        ops
    }

    #[test]
    fn test_everyone_can_read() {
        for role in Role::ALL {
            assert!(authorize(&Operation::Read, role).is_ok());
        }
    }

    #[test]
    fn test_viewer_denied_every_mutation() {
        for op in mutations() {
            let result = authorize(&op, Role::Viewer);
            assert!(
                matches!(result, Err(CoreError::NotPermitted(_))),
                "viewer should be denied {:?}",
                op
            );
        }
    }

    #[test]
    fn test_content_mutation_requires_editor() {
        assert!(authorize(&Operation::MutateContent, Role::Editor).is_ok());
        assert!(authorize(&Operation::MutateContent, Role::EditorChief).is_ok());
        assert!(authorize(&Operation::MutateContent, Role::Admin).is_ok());
    }

    #[test]
    fn test_board_level_operations() {
        assert!(authorize(&Operation::RenameBoard, Role::Editor).is_err());
        assert!(authorize(&Operation::RenameBoard, Role::EditorChief).is_ok());
        assert!(authorize(&Operation::RenameBoard, Role::Admin).is_ok());

        assert!(authorize(&Operation::DeleteBoard, Role::EditorChief).is_err());
        assert!(authorize(&Operation::DeleteBoard, Role::Admin).is_ok());

        assert!(authorize(&Operation::AddMember, Role::Editor).is_err());
        assert!(authorize(&Operation::AddMember, Role::EditorChief).is_ok());
    }

    #[test]
    fn test_editor_chief_promotions() {
        let to_admin = Operation::ChangeRole {
            target_current: Role::Viewer,
            new_role: Role::Admin,
        };
        assert!(authorize(&to_admin, Role::EditorChief).is_err());

        let to_editor = Operation::ChangeRole {
            target_current: Role::Viewer,
            new_role: Role::Editor,
        };
        assert!(authorize(&to_editor, Role::EditorChief).is_ok());

        // Granting your own rank is not allowed either
        let to_chief = Operation::ChangeRole {
            target_current: Role::Viewer,
            new_role: Role::EditorChief,
        };
        assert!(authorize(&to_chief, Role::EditorChief).is_err());

        // Nor demoting a peer
        let demote_peer = Operation::ChangeRole {
            target_current: Role::EditorChief,
            new_role: Role::Viewer,
        };
        assert!(authorize(&demote_peer, Role::EditorChief).is_err());
    }

    #[test]
    fn test_non_admin_never_grants_rank_at_or_above_own() {
        for actor in [Role::Viewer, Role::Editor, Role::EditorChief] {
            for target in Role::ALL {
                for new_role in Role::ALL {
                    let op = Operation::ChangeRole {
                        target_current: target,
                        new_role,
                    };
                    if new_role.rank() >= actor.rank() {
                        assert!(authorize(&op, actor).is_err(), "{:?} by {:?}", op, actor);
                    }
                }
            }
        }
    }

    #[test]
    fn test_admin_may_change_any_role() {
        for target in Role::ALL {
            for new_role in Role::ALL {
                let op = Operation::ChangeRole {
                    target_current: target,
                    new_role,
                };
                assert!(authorize(&op, Role::Admin).is_ok());
            }
        }
    }

    #[test]
    fn test_member_removal() {
        for role in Role::ALL {
            let leave = Operation::RemoveMember {
                is_self: true,
                target_role: role,
            };
            assert!(authorize(&leave, role).is_ok());
        }

        let kick_editor = Operation::RemoveMember {
            is_self: false,
            target_role: Role::Editor,
        };
        assert!(authorize(&kick_editor, Role::EditorChief).is_ok());
        assert!(authorize(&kick_editor, Role::Editor).is_err());

        let kick_chief = Operation::RemoveMember {
            is_self: false,
            target_role: Role::EditorChief,
        };
        assert!(authorize(&kick_chief, Role::EditorChief).is_err());
        assert!(authorize(&kick_chief, Role::Admin).is_ok());
    }
}
