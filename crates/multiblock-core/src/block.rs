//! Block model: kinds, visual variants, and cell handles.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::BlockPos;

/// Shared definition of a block type.
///
/// Kinds are registered once by content modules and shared via `Arc`;
/// handles returned by the world borrow the same definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockKind {
    /// Unique kind name, e.g. `"furnace:wall"`
    pub name: String,
    /// Capability tags filters can test against
    pub capabilities: BTreeSet<String>,
    /// Whether this kind carries a hidden visual variant that structure
    /// formation may switch to
    pub has_hidden_variant: bool,
}

impl BlockKind {
    /// Create a new kind with no capabilities and no hidden variant.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: BTreeSet::new(),
            has_hidden_variant: false,
        }
    }

    /// Add a capability tag.
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Mark this kind as carrying a hidden visual variant.
    pub fn with_hidden_variant(mut self) -> Self {
        self.has_hidden_variant = true;
        self
    }
}

/// Visual variant of a cell participating (or not) in a structure.
///
/// `Hidden` is the inert variant formation switches member blocks to;
/// destruction restores `Visible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Normal rendered variant
    Visible,
    /// Inert variant used while the block is part of a formed structure
    Hidden,
}

/// Live view of a grid cell's occupant.
///
/// A handle is always obtainable for any coordinate: cells outside the
/// loaded range, or loaded but vacant, yield the *empty* handle. Filters
/// must treat the empty handle as non-matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHandle {
    pos: BlockPos,
    kind: Option<Arc<BlockKind>>,
}

impl BlockHandle {
    /// Handle for an occupied cell.
    pub fn occupied(pos: BlockPos, kind: Arc<BlockKind>) -> Self {
        Self {
            pos,
            kind: Some(kind),
        }
    }

    /// The empty handle for a vacant or unloaded cell.
    pub fn empty(pos: BlockPos) -> Self {
        Self { pos, kind: None }
    }

    /// Cell coordinate this handle refers to.
    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    /// Kind of the occupant, if any.
    pub fn kind(&self) -> Option<&Arc<BlockKind>> {
        self.kind.as_ref()
    }

    /// Whether the cell is vacant or outside the loaded range.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
    }

    /// Kind name of the occupant, if any.
    pub fn kind_name(&self) -> Option<&str> {
        self.kind.as_deref().map(|kind| kind.name.as_str())
    }

    /// Whether the occupant carries a capability tag. Always false for the
    /// empty handle.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind.capabilities.contains(capability))
    }
}

/// Pattern types a placed block declares itself a candidate for.
///
/// The list is insertion-ordered and the order is meaningful: the manager
/// tries each type's recipe in declared order, and the first type that both
/// detects and survives conflict resolution wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTag {
    /// Declared pattern-type names, in priority order
    pub types: Vec<String>,
}

impl CandidateTag {
    /// Tag declaring a single pattern type.
    pub fn single(structure_type: impl Into<String>) -> Self {
        Self {
            types: vec![structure_type.into()],
        }
    }

    /// Tag declaring several pattern types, tried in the given order.
    pub fn ordered<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}
