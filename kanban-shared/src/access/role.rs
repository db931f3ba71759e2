/// Board membership roles
///
/// The four roles form a total order:
///
/// ```text
/// viewer (0) < editor (1) < editor_chief (2) < admin (3)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE board_role AS ENUM ('viewer', 'editor', 'editor_chief', 'admin');
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Role of a user on one board
///
/// Variants are declared in rank order, so the derived `Ord` agrees with
/// [`Role::rank`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "board_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read-only access
    Viewer,

    /// Can create, edit, move and delete board content
    Editor,

    /// Editor who can also rename the board and manage lower-ranked members
    EditorChief,

    /// Full control, including board deletion
    Admin,
}

impl Role {
    /// All roles in ascending rank
    pub const ALL: [Role; 4] = [Role::Viewer, Role::Editor, Role::EditorChief, Role::Admin];

    /// Numeric rank used for dominance comparisons
    pub const fn rank(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Editor => 1,
            Role::EditorChief => 2,
            Role::Admin => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::EditorChief => "editor_chief",
            Role::Admin => "admin",
        }
    }

    /// Whether this role strictly outranks `other`
    pub fn dominates(self, other: Role) -> bool {
        self.rank() > other.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "editor_chief" => Ok(Role::EditorChief),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("unknown role '{}'", other))),
        }
    }
}
