//! Chunked in-memory voxel store.
//!
//! `GridWorld` is the reference implementation of the collaborator traits:
//! cells live in 16-cell chunks that can be explicitly unloaded (serialized
//! to an in-memory page, markers included) and loaded back. It is the world
//! the detection and lifecycle crates are exercised against; a production
//! storage engine would implement the same traits.
//!
//! The store does not drive lifecycle hooks itself: hosts call the
//! structure manager's unload hook *before* [`GridWorld::unload_chunk`] and
//! feed the marked positions returned by [`GridWorld::load_chunk`] into the
//! manager's pending set.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{error, warn};

use multiblock_core::{
    AnchorMarker, BlockHandle, BlockKind, BlockPos, CandidateTag, MarkerStore, MemberMarker,
    Region, StructureId, Visibility, WorldProvider,
};

use crate::chunk::{chunks_covering, BlockState, Chunk, ChunkPage, ChunkPos};

#[derive(Default)]
struct Inner {
    kinds: HashMap<String, Arc<BlockKind>>,
    loaded: HashMap<ChunkPos, Chunk>,
    pages: HashMap<ChunkPos, String>,
}

/// Chunked in-memory voxel world.
#[derive(Default)]
pub struct GridWorld {
    inner: RwLock<Inner>,
}

impl GridWorld {
    /// Create an empty world with no chunks resident.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block kind, returning the shared definition.
    ///
    /// Re-registering a name replaces the previous definition.
    pub fn register_kind(&self, kind: BlockKind) -> Arc<BlockKind> {
        let kind = Arc::new(kind);
        let mut inner = self.inner.write().unwrap();
        inner.kinds.insert(kind.name.clone(), Arc::clone(&kind));
        kind
    }

    /// Place a block of a registered kind, making its chunk resident if it
    /// was never created.
    ///
    /// Returns false without mutating when the kind is unknown or the
    /// chunk is currently paged out.
    pub fn place(&self, pos: BlockPos, kind: &str) -> bool {
        let mut inner = self.inner.write().unwrap();
        if !inner.kinds.contains_key(kind) {
            warn!(kind, %pos, "cannot place block of unregistered kind");
            return false;
        }
        let chunk_pos = ChunkPos::containing(pos);
        if inner.pages.contains_key(&chunk_pos) {
            warn!(%pos, "cannot place block into a paged-out chunk");
            return false;
        }
        inner
            .loaded
            .entry(chunk_pos)
            .or_default()
            .cells
            .insert(pos, BlockState::new(kind));
        true
    }

    /// Place the same kind into every cell of a region.
    pub fn fill(&self, region: &Region, kind: &str) {
        for pos in region.blocks() {
            self.place(pos, kind);
        }
    }

    /// Remove the block at `pos`, returning its final state.
    pub fn remove(&self, pos: BlockPos) -> Option<BlockState> {
        let mut inner = self.inner.write().unwrap();
        let chunk = inner.loaded.get_mut(&ChunkPos::containing(pos))?;
        chunk.cells.remove(&pos)
    }

    /// Tag the block at `pos` as a pattern candidate.
    ///
    /// Returns false when the cell is vacant or not resident.
    pub fn set_candidate(&self, pos: BlockPos, tag: CandidateTag) -> bool {
        self.with_cell(pos, |state| state.candidate = Some(tag))
    }

    /// Whether a chunk is currently resident.
    pub fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool {
        self.inner.read().unwrap().loaded.contains_key(&chunk)
    }

    /// Make a chunk resident, restoring its page if one exists.
    ///
    /// Returns the positions of restored cells that carry structure
    /// markers, for the host to hand to the structure manager's pending
    /// set. Returns an empty list when the chunk was already resident.
    pub fn load_chunk(&self, chunk: ChunkPos) -> Vec<BlockPos> {
        let mut inner = self.inner.write().unwrap();
        if inner.loaded.contains_key(&chunk) {
            return Vec::new();
        }
        let restored = match inner.pages.remove(&chunk) {
            Some(json) => match serde_json::from_str::<ChunkPage>(&json) {
                Ok(page) => Chunk::from(page),
                Err(err) => {
                    error!(?chunk, error = %err, "corrupt chunk page, loading chunk empty");
                    Chunk::default()
                }
            },
            None => Chunk::default(),
        };
        let marked: Vec<BlockPos> = restored
            .cells
            .iter()
            .filter(|(_, state)| state.is_marked())
            .map(|(pos, _)| *pos)
            .collect();
        inner.loaded.insert(chunk, restored);
        marked
    }

    /// Page a resident chunk out, serializing every cell with its markers.
    ///
    /// Returns false when the chunk is not resident.
    pub fn unload_chunk(&self, chunk: ChunkPos) -> bool {
        let mut inner = self.inner.write().unwrap();
        let Some(resident) = inner.loaded.remove(&chunk) else {
            return false;
        };
        let page = ChunkPage::from(&resident);
        match serde_json::to_string(&page) {
            Ok(json) => {
                inner.pages.insert(chunk, json);
                true
            }
            Err(err) => {
                error!(?chunk, error = %err, "failed to serialize chunk page, keeping chunk resident");
                inner.loaded.insert(chunk, resident);
                false
            }
        }
    }

    fn with_cell<F>(&self, pos: BlockPos, mutate: F) -> bool
    where
        F: FnOnce(&mut BlockState),
    {
        let mut inner = self.inner.write().unwrap();
        let Some(chunk) = inner.loaded.get_mut(&ChunkPos::containing(pos)) else {
            return false;
        };
        match chunk.cells.get_mut(&pos) {
            Some(state) => {
                mutate(state);
                true
            }
            None => false,
        }
    }

    fn read_cell<T, F>(&self, pos: BlockPos, read: F) -> Option<T>
    where
        F: FnOnce(&BlockState) -> T,
    {
        let inner = self.inner.read().unwrap();
        let chunk = inner.loaded.get(&ChunkPos::containing(pos))?;
        chunk.cells.get(&pos).map(read)
    }
}

impl WorldProvider for GridWorld {
    fn handle_at(&self, pos: BlockPos) -> BlockHandle {
        let inner = self.inner.read().unwrap();
        let kind = inner
            .loaded
            .get(&ChunkPos::containing(pos))
            .and_then(|chunk| chunk.cells.get(&pos))
            .and_then(|state| match inner.kinds.get(&state.kind) {
                Some(kind) => Some(Arc::clone(kind)),
                None => {
                    warn!(%pos, kind = %state.kind, "cell references unregistered kind");
                    None
                }
            });
        match kind {
            Some(kind) => BlockHandle::occupied(pos, kind),
            None => BlockHandle::empty(pos),
        }
    }

    fn is_loaded(&self, pos: BlockPos) -> bool {
        self.is_chunk_loaded(ChunkPos::containing(pos))
    }

    fn is_region_loaded(&self, region: &Region) -> bool {
        let inner = self.inner.read().unwrap();
        chunks_covering(region)
            .iter()
            .all(|chunk| inner.loaded.contains_key(chunk))
    }

    fn visibility_at(&self, pos: BlockPos) -> Option<Visibility> {
        self.read_cell(pos, |state| state.visibility)
    }

    fn set_visibility(&self, pos: BlockPos, visibility: Visibility) {
        let mut inner = self.inner.write().unwrap();
        let Inner { kinds, loaded, .. } = &mut *inner;
        let Some(state) = loaded
            .get_mut(&ChunkPos::containing(pos))
            .and_then(|chunk| chunk.cells.get_mut(&pos))
        else {
            return;
        };
        let toggleable = kinds
            .get(&state.kind)
            .is_some_and(|kind| kind.has_hidden_variant);
        if toggleable {
            state.visibility = visibility;
        }
    }
}

impl MarkerStore for GridWorld {
    fn anchor_at(&self, pos: BlockPos) -> Option<AnchorMarker> {
        self.read_cell(pos, |state| state.anchor.clone()).flatten()
    }

    fn member_at(&self, pos: BlockPos) -> Option<MemberMarker> {
        self.read_cell(pos, |state| state.member).flatten()
    }

    fn candidate_at(&self, pos: BlockPos) -> Option<CandidateTag> {
        self.read_cell(pos, |state| state.candidate.clone())
            .flatten()
    }

    fn attach_anchor(&self, pos: BlockPos, marker: AnchorMarker) {
        if !self.with_cell(pos, |state| state.anchor = Some(marker)) {
            warn!(%pos, "anchor marker attached to a vacant or unloaded cell");
        }
    }

    fn attach_member(&self, pos: BlockPos, marker: MemberMarker) {
        if !self.with_cell(pos, |state| state.member = Some(marker)) {
            warn!(%pos, "member marker attached to a vacant or unloaded cell");
        }
    }

    fn detach_anchor(&self, pos: BlockPos) -> Option<AnchorMarker> {
        let mut detached = None;
        self.with_cell(pos, |state| detached = state.anchor.take());
        detached
    }

    fn detach_member(&self, pos: BlockPos) -> Option<MemberMarker> {
        let mut detached = None;
        self.with_cell(pos, |state| detached = state.member.take());
        detached
    }

    fn set_aggregate(&self, anchor: BlockPos, aggregate: Option<StructureId>) {
        self.with_cell(anchor, |state| {
            if let Some(marker) = state.anchor.as_mut() {
                marker.aggregate = aggregate;
            }
        });
    }
}
