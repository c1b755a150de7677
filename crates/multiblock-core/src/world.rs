//! Collaborator interfaces consumed by detection and lifecycle management.
//!
//! Both traits are injected at construction and take `&self`;
//! implementations are free to lock internally. The core never reaches for
//! globals to find its collaborators.

use crate::{
    AnchorMarker, BlockHandle, BlockPos, CandidateTag, MemberMarker, Region, StructureId,
    Visibility,
};

/// Read/write access to the voxel world's cells.
pub trait WorldProvider: Send + Sync {
    /// Handle for the occupant of `pos`.
    ///
    /// Total: cells outside the loaded range yield the empty handle, never
    /// an error.
    fn handle_at(&self, pos: BlockPos) -> BlockHandle;

    /// Whether the cell is currently resident in memory.
    fn is_loaded(&self, pos: BlockPos) -> bool;

    /// Whether every cell of the region is currently resident in memory.
    fn is_region_loaded(&self, region: &Region) -> bool;

    /// Current visual variant of the cell's occupant, if any.
    fn visibility_at(&self, pos: BlockPos) -> Option<Visibility>;

    /// Switch the cell's occupant to a visual variant.
    ///
    /// A no-op for vacant cells and for kinds without a hidden variant.
    fn set_visibility(&self, pos: BlockPos, visibility: Visibility);
}

/// Persisted per-cell component storage for structure markers.
///
/// Markers attached here are serialized together with their cells when the
/// owning region pages out, and survive until explicitly detached.
pub trait MarkerStore: Send + Sync {
    /// Anchor marker at `pos`, if any.
    fn anchor_at(&self, pos: BlockPos) -> Option<AnchorMarker>;

    /// Member marker at `pos`, if any.
    fn member_at(&self, pos: BlockPos) -> Option<MemberMarker>;

    /// Candidate tag at `pos`, if any.
    fn candidate_at(&self, pos: BlockPos) -> Option<CandidateTag>;

    /// Attach an anchor marker to `pos`.
    fn attach_anchor(&self, pos: BlockPos, marker: AnchorMarker);

    /// Attach a member marker to `pos`.
    fn attach_member(&self, pos: BlockPos, marker: MemberMarker);

    /// Detach and return the anchor marker at `pos`.
    fn detach_anchor(&self, pos: BlockPos) -> Option<AnchorMarker>;

    /// Detach and return the member marker at `pos`.
    fn detach_member(&self, pos: BlockPos) -> Option<MemberMarker>;

    /// Update the live aggregate reference on an anchor marker.
    fn set_aggregate(&self, anchor: BlockPos, aggregate: Option<StructureId>);
}

/// Outcome the manager hands back for vetoable world events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event may proceed
    Pass,
    /// The event is consumed and must not be acted upon
    Consumed,
}

impl EventDisposition {
    /// Whether the event was consumed.
    pub fn is_consumed(&self) -> bool {
        matches!(self, EventDisposition::Consumed)
    }
}
