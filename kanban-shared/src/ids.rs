/// Typed identifiers for every board resource
///
/// Each resource kind gets its own newtype over the `BIGSERIAL` primary key so a
/// card id can never be handed to something expecting a column id. The textual
/// form carries a kind prefix (`board_123`, `card_45`, ...) and is what appears
/// in URL path segments and JSON bodies.
///
/// # Example
///
/// ```
/// use kanban_shared::ids::{BoardId, CardId, ResourceRef};
///
/// let board: BoardId = "board_123".parse().unwrap();
/// assert_eq!(board.get(), 123);
/// assert_eq!(board.to_string(), "board_123");
///
/// // Wrong prefix is rejected
/// assert!("card_123".parse::<BoardId>().is_err());
///
/// let resource: ResourceRef = "card_45".parse().unwrap();
/// assert_eq!(resource, ResourceRef::Card(CardId::new(45)));
/// ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
        #[sqlx(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Textual prefix of this identifier kind
            pub const PREFIX: &'static str = $prefix;

            /// Wraps a raw database id
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw database id
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_prefixed(s, Self::PREFIX).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_id!(
    /// Board identifier (`board_N`)
    BoardId,
    "board"
);
define_id!(
    /// Column identifier (`column_N`)
    ColumnId,
    "column"
);
define_id!(
    /// Card identifier (`card_N`)
    CardId,
    "card"
);
define_id!(
    /// Comment identifier (`comment_N`)
    CommentId,
    "comment"
);
define_id!(
    /// Checklist field identifier (`checklist_N`)
    ChecklistFieldId,
    "checklist"
);
define_id!(
    /// Attachment identifier (`attachment_N`)
    AttachmentId,
    "attachment"
);
define_id!(
    /// User identifier (`user_N`)
    UserId,
    "user"
);

fn parse_prefixed(s: &str, prefix: &str) -> Result<i64, CoreError> {
    let raw = s
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .ok_or_else(|| CoreError::Validation(format!("expected '{}_<id>', got '{}'", prefix, s)))?;

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::Validation(format!("invalid {} id: '{}'", prefix, s))),
    }
}

/// Reference to any resource that lives on a board
///
/// Every variant resolves to exactly one owning board. The access layer walks
/// from the referenced row up to that board in a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    Board(BoardId),
    Column(ColumnId),
    Card(CardId),
    Comment(CommentId),
    ChecklistField(ChecklistFieldId),
    Attachment(AttachmentId),
}

impl ResourceRef {
    /// Kind name used in logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceRef::Board(_) => BoardId::PREFIX,
            ResourceRef::Column(_) => ColumnId::PREFIX,
            ResourceRef::Card(_) => CardId::PREFIX,
            ResourceRef::Comment(_) => CommentId::PREFIX,
            ResourceRef::ChecklistField(_) => ChecklistFieldId::PREFIX,
            ResourceRef::Attachment(_) => AttachmentId::PREFIX,
        }
    }

    /// Raw id of the referenced row
    pub fn raw_id(&self) -> i64 {
        match self {
            ResourceRef::Board(id) => id.get(),
            ResourceRef::Column(id) => id.get(),
            ResourceRef::Card(id) => id.get(),
            ResourceRef::Comment(id) => id.get(),
            ResourceRef::ChecklistField(id) => id.get(),
            ResourceRef::Attachment(id) => id.get(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind(), self.raw_id())
    }
}

impl FromStr for ResourceRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, _) = s
            .rsplit_once('_')
            .ok_or_else(|| CoreError::Validation(format!("malformed resource id: '{}'", s)))?;

        match prefix {
            BoardId::PREFIX => s.parse().map(ResourceRef::Board),
            ColumnId::PREFIX => s.parse().map(ResourceRef::Column),
            CardId::PREFIX => s.parse().map(ResourceRef::Card),
            CommentId::PREFIX => s.parse().map(ResourceRef::Comment),
            ChecklistFieldId::PREFIX => s.parse().map(ResourceRef::ChecklistField),
            AttachmentId::PREFIX => s.parse().map(ResourceRef::Attachment),
            other => Err(CoreError::Validation(format!("unknown resource kind: '{}'", other))),
        }
    }
}

impl From<BoardId> for ResourceRef {
    fn from(id: BoardId) -> Self {
        ResourceRef::Board(id)
    }
}

impl From<ColumnId> for ResourceRef {
    fn from(id: ColumnId) -> Self {
        ResourceRef::Column(id)
    }
}

impl From<CardId> for ResourceRef {
    fn from(id: CardId) -> Self {
        ResourceRef::Card(id)
    }
}

impl From<CommentId> for ResourceRef {
    fn from(id: CommentId) -> Self {
        ResourceRef::Comment(id)
    }
}

impl From<ChecklistFieldId> for ResourceRef {
    fn from(id: ChecklistFieldId) -> Self {
        ResourceRef::ChecklistField(id)
    }
}

impl From<AttachmentId> for ResourceRef {
    fn from(id: AttachmentId) -> Self {
        ResourceRef::Attachment(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: CardId = "card_45".parse().unwrap();
        assert_eq!(id.get(), 45);
        assert_eq!(id.to_string(), "card_45");
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        assert!("column_7".parse::<CardId>().is_err());
        assert!("board7".parse::<BoardId>().is_err());
        assert!("7".parse::<BoardId>().is_err());
    }

    #[test]
    fn test_rejects_non_positive_and_garbage() {
        assert!("board_0".parse::<BoardId>().is_err());
        assert!("board_-3".parse::<BoardId>().is_err());
        assert!("board_abc".parse::<BoardId>().is_err());
        assert!("board_".parse::<BoardId>().is_err());
    }

    #[test]
    fn test_resource_ref_dispatch() {
        assert_eq!(
            "checklist_2".parse::<ResourceRef>().unwrap(),
            ResourceRef::ChecklistField(ChecklistFieldId::new(2))
        );
        assert_eq!(
            "attachment_9".parse::<ResourceRef>().unwrap(),
            ResourceRef::Attachment(AttachmentId::new(9))
        );
        assert!("user_9".parse::<ResourceRef>().is_err());
        assert!("nothing".parse::<ResourceRef>().is_err());
    }

    #[test]
    fn test_serde_uses_prefixed_form() {
        let json = serde_json::to_string(&ColumnId::new(7)).unwrap();
        assert_eq!(json, "\"column_7\"");

        let back: ColumnId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ColumnId::new(7));

        assert!(serde_json::from_str::<ColumnId>("\"card_7\"").is_err());
    }
}
