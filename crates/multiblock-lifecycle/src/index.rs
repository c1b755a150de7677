//! Spatial index of currently materialized structures.

use multiblock_core::{BlockPos, Region, StructureInstance};

/// Index of live structure instances keyed by bounding region.
///
/// Live regions never overlap (conflict resolution guarantees it), and the
/// structure count stays small relative to world size, so point lookups are
/// a linear scan over the live regions.
#[derive(Default)]
pub struct SpatialIndex {
    entries: Vec<(Region, StructureInstance)>,
}

impl SpatialIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no instance is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an instance under its bounding region.
    ///
    /// Replaces any instance already keyed by the same region.
    pub fn insert(&mut self, instance: StructureInstance) {
        let region = instance.region;
        self.remove(&region);
        self.entries.push((region, instance));
    }

    /// Remove and return the instance keyed by a region.
    pub fn remove(&mut self, region: &Region) -> Option<StructureInstance> {
        let position = self.entries.iter().position(|(key, _)| key == region)?;
        Some(self.entries.swap_remove(position).1)
    }

    /// Whether an instance is keyed by this exact region.
    pub fn contains_region(&self, region: &Region) -> bool {
        self.entries.iter().any(|(key, _)| key == region)
    }

    /// The instance whose region contains a cell, if any.
    pub fn instance_at(&self, pos: BlockPos) -> Option<&StructureInstance> {
        self.entries
            .iter()
            .find(|(region, _)| region.contains(pos))
            .map(|(_, instance)| instance)
    }

    /// Iterate over all live (region, instance) pairs.
    pub fn iter(&self) -> impl Iterator<Item = &(Region, StructureInstance)> {
        self.entries.iter()
    }

    /// Regions of all instances intersecting a region.
    pub fn intersecting_regions(&self, region: &Region) -> Vec<Region> {
        self.entries
            .iter()
            .filter(|(key, _)| key.intersects(region))
            .map(|(key, _)| *key)
            .collect()
    }
}
