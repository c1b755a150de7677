//! Chunk addressing and per-cell storage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use multiblock_core::{AnchorMarker, BlockPos, CandidateTag, MemberMarker, Region, Visibility};

/// Cells per chunk edge.
pub const CHUNK_EDGE: i32 = 16;

/// Position of a chunk in chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    /// Chunk X index
    pub x: i32,
    /// Chunk Y index
    pub y: i32,
    /// Chunk Z index
    pub z: i32,
}

impl ChunkPos {
    /// Create a new chunk position.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The chunk containing a cell.
    pub fn containing(pos: BlockPos) -> Self {
        Self {
            x: pos.x.div_euclid(CHUNK_EDGE),
            y: pos.y.div_euclid(CHUNK_EDGE),
            z: pos.z.div_euclid(CHUNK_EDGE),
        }
    }

    /// Cell region covered by this chunk.
    pub fn region(&self) -> Region {
        let min = BlockPos::new(
            self.x * CHUNK_EDGE,
            self.y * CHUNK_EDGE,
            self.z * CHUNK_EDGE,
        );
        let max = BlockPos::new(
            min.x + CHUNK_EDGE - 1,
            min.y + CHUNK_EDGE - 1,
            min.z + CHUNK_EDGE - 1,
        );
        Region::span(min, max)
    }
}

/// All chunks overlapping a cell region.
pub fn chunks_covering(region: &Region) -> Vec<ChunkPos> {
    let min = ChunkPos::containing(region.min());
    let max = ChunkPos::containing(region.max());
    let mut chunks = Vec::new();
    for y in min.y..=max.y {
        for z in min.z..=max.z {
            for x in min.x..=max.x {
                chunks.push(ChunkPos::new(x, y, z));
            }
        }
    }
    chunks
}

/// Persisted state of one occupied cell.
///
/// The kind is stored by name; the world rebinds it against the kind
/// registry when a paged-out chunk is restored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockState {
    /// Kind name of the occupant
    pub kind: String,
    /// Current visual variant
    pub visibility: Visibility,
    /// Anchor marker, when this cell anchors a structure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorMarker>,
    /// Member marker, when this cell belongs to a structure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberMarker>,
    /// Candidate tag, when this cell may trigger detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<CandidateTag>,
}

impl BlockState {
    /// Visible, unmarked state for a kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            visibility: Visibility::Visible,
            anchor: None,
            member: None,
            candidate: None,
        }
    }

    /// Whether the cell carries a structure marker.
    pub fn is_marked(&self) -> bool {
        self.anchor.is_some() || self.member.is_some()
    }
}

/// One resident chunk's occupied cells.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    /// Occupied cells, keyed by absolute position
    pub cells: HashMap<BlockPos, BlockState>,
}

/// Serialized form of a paged-out chunk.
///
/// `HashMap` keys are structs, so the page flattens cells into a list that
/// serde_json can represent.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChunkPage {
    /// Occupied cells as (position, state) pairs
    pub cells: Vec<(BlockPos, BlockState)>,
}

impl From<&Chunk> for ChunkPage {
    fn from(chunk: &Chunk) -> Self {
        Self {
            cells: chunk
                .cells
                .iter()
                .map(|(pos, state)| (*pos, state.clone()))
                .collect(),
        }
    }
}

impl From<ChunkPage> for Chunk {
    fn from(page: ChunkPage) -> Self {
        Self {
            cells: page.cells.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_containing_handles_negative_coordinates() {
        assert_eq!(
            ChunkPos::containing(BlockPos::new(0, 0, 0)),
            ChunkPos::new(0, 0, 0)
        );
        assert_eq!(
            ChunkPos::containing(BlockPos::new(15, 15, 15)),
            ChunkPos::new(0, 0, 0)
        );
        assert_eq!(
            ChunkPos::containing(BlockPos::new(16, 0, 0)),
            ChunkPos::new(1, 0, 0)
        );
        assert_eq!(
            ChunkPos::containing(BlockPos::new(-1, -16, -17)),
            ChunkPos::new(-1, -1, -2)
        );
    }

    #[test]
    fn test_chunk_region_round_trips() {
        let chunk = ChunkPos::new(-1, 0, 2);
        let region = chunk.region();
        assert_eq!(region.min(), BlockPos::new(-16, 0, 32));
        assert_eq!(region.max(), BlockPos::new(-1, 15, 47));
        for pos in [region.min(), region.max()] {
            assert_eq!(ChunkPos::containing(pos), chunk);
        }
    }

    #[test]
    fn test_chunks_covering_straddling_region() {
        let region = Region::span(BlockPos::new(14, 0, 0), BlockPos::new(17, 0, 0));
        let chunks = chunks_covering(&region);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.contains(&ChunkPos::new(0, 0, 0)));
        assert!(chunks.contains(&ChunkPos::new(1, 0, 0)));
    }

    #[test]
    fn test_chunk_page_round_trip() {
        let mut chunk = Chunk::default();
        let mut state = BlockState::new("vault:wall");
        state.member = Some(MemberMarker::new(BlockPos::new(1, 1, 1)));
        chunk.cells.insert(BlockPos::new(3, 4, 5), state);

        let page = ChunkPage::from(&chunk);
        let json = serde_json::to_string(&page).unwrap();
        let restored: Chunk = serde_json::from_str::<ChunkPage>(&json).unwrap().into();

        let cell = restored.cells.get(&BlockPos::new(3, 4, 5)).unwrap();
        assert_eq!(cell.kind, "vault:wall");
        assert_eq!(cell.member, Some(MemberMarker::new(BlockPos::new(1, 1, 1))));
        assert!(cell.is_marked());
    }
}
