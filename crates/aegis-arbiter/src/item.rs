//! Opaque item values exchanged with the host and its collaborators.
//!
//! The arbitration layer never interprets an item's `kind` or `tag`; what
//! an item *does* — and whether it is restricted — is the usage-service
//! collaborator's concern (see [`crate::service::UsageService`]).

use serde::{Deserialize, Serialize};

/// Lightweight item kind identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKind(pub u16);

impl ItemKind {
    /// Plain stone block (for tests/demos).
    pub const STONE: Self = Self(1);
    /// Torch (for tests/demos).
    pub const TORCH: Self = Self(2);
}

/// A stack of items as it appears in an event payload: a kind, a count,
/// and an optional opaque tag carrying collaborator-defined metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item kind identifier.
    pub kind: ItemKind,
    /// Number of items in the stack.
    pub count: u32,
    /// Opaque metadata tag; `None` for plain items.
    pub tag: Option<String>,
}

impl ItemStack {
    /// A single untagged item of the given kind.
    pub fn of(kind: ItemKind) -> Self {
        Self {
            kind,
            count: 1,
            tag: None,
        }
    }

    /// A single item of the given kind carrying an opaque tag.
    pub fn tagged(kind: ItemKind, tag: impl Into<String>) -> Self {
        Self {
            kind,
            count: 1,
            tag: Some(tag.into()),
        }
    }
}
