//! Structure data model: detection results, live instances, and the
//! markers persisted onto participating cells.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BlockPos, Region};

/// Identifier of an ephemeral aggregate created for a formed structure.
///
/// Aggregates are never persisted; a fresh id is assigned whenever a
/// structure forms or is reconstructed after its region reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureId(Uuid);

impl StructureId {
    /// Create a new random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StructureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StructureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recipe-specific metadata carried by a detection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructurePayload {
    /// No extra metadata
    Empty,
    /// Detected height of each configured layer, bottom to top
    LayerHeights(Vec<u32>),
}

/// Candidate result of a successful detection, not yet materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDefinition {
    /// Pattern-type name the producing recipe was registered under
    pub structure_type: String,
    /// The seed cell; carries the anchor marker once formed
    pub anchor: BlockPos,
    /// Every participating cell except the anchor
    pub members: BTreeSet<BlockPos>,
    /// Recipe-specific metadata
    pub payload: StructurePayload,
}

impl StructureDefinition {
    /// Definition with an empty payload.
    pub fn new(
        structure_type: impl Into<String>,
        anchor: BlockPos,
        members: BTreeSet<BlockPos>,
    ) -> Self {
        Self {
            structure_type: structure_type.into(),
            anchor,
            members,
            payload: StructurePayload::Empty,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: StructurePayload) -> Self {
        self.payload = payload;
        self
    }

    /// Bounding region of anchor and members.
    pub fn region(&self) -> Region {
        Region::enclosing(self.anchor, self.members.iter().copied())
    }

    /// Iterate over every participating cell, anchor included.
    pub fn footprint(&self) -> impl Iterator<Item = BlockPos> + '_ {
        std::iter::once(self.anchor).chain(self.members.iter().copied())
    }
}

/// A materialized, currently tracked structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureInstance {
    /// Pattern-type name
    pub structure_type: String,
    /// Anchor cell
    pub anchor: BlockPos,
    /// Non-anchor participating cells
    pub members: Vec<BlockPos>,
    /// Bounding region; never overlaps another live instance's region
    pub region: Region,
    /// The ephemeral aggregate
    pub aggregate: StructureId,
}

/// Persisted data attached to a structure's anchor cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorMarker {
    /// Pattern-type name
    pub structure_type: String,
    /// Non-anchor participating cells
    pub members: Vec<BlockPos>,
    /// Bounding region of the whole structure
    pub region: Region,
    /// Live aggregate reference; ephemeral, so never serialized
    #[serde(skip)]
    pub aggregate: Option<StructureId>,
}

impl AnchorMarker {
    /// Marker with no aggregate assigned yet.
    pub fn new(structure_type: impl Into<String>, members: Vec<BlockPos>, region: Region) -> Self {
        Self {
            structure_type: structure_type.into(),
            members,
            region,
            aggregate: None,
        }
    }
}

/// Persisted data attached to each non-anchor member cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberMarker {
    /// Coordinate of the anchor cell holding the full member list
    pub anchor: BlockPos,
}

impl MemberMarker {
    /// Marker back-referencing the given anchor.
    pub fn new(anchor: BlockPos) -> Self {
        Self { anchor }
    }
}
