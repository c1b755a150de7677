//! Homogeneous-box recipe.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::trace;

use multiblock_core::{
    BlockFilter, BlockPos, Direction, Region, Result, SizeFilter, StructureDefinition,
};

use crate::engine::DetectionEngine;
use crate::recipe::StructureRecipe;

/// Detects the maximal axis-aligned box of cells all satisfying one filter.
///
/// The six per-axis extensions only fix the boundary; the box is re-scanned
/// in full afterwards, since independent extensions cannot see concavities.
pub struct UniformRecipe {
    structure_type: String,
    engine: DetectionEngine,
    block_filter: Arc<dyn BlockFilter>,
    size_filter: Arc<dyn SizeFilter>,
}

impl UniformRecipe {
    /// Create a recipe producing definitions of the given pattern type.
    pub fn new(
        structure_type: impl Into<String>,
        engine: DetectionEngine,
        block_filter: Arc<dyn BlockFilter>,
        size_filter: Arc<dyn SizeFilter>,
    ) -> Self {
        Self {
            structure_type: structure_type.into(),
            engine,
            block_filter,
            size_filter,
        }
    }
}

impl StructureRecipe for UniformRecipe {
    fn structure_type(&self) -> &str {
        &self.structure_type
    }

    fn detect(&self, seed: BlockPos) -> Result<Option<StructureDefinition>> {
        let filter = self.block_filter.as_ref();
        if !filter.matches(&self.engine.handle_at(seed)) {
            return Ok(None);
        }

        let min_x = self.engine.last_matching(seed, Direction::NegX, filter)?.x;
        let max_x = self.engine.last_matching(seed, Direction::PosX, filter)?.x;
        let min_y = self.engine.last_matching(seed, Direction::NegY, filter)?.y;
        let max_y = self.engine.last_matching(seed, Direction::PosY, filter)?.y;
        let min_z = self.engine.last_matching(seed, Direction::NegZ, filter)?.z;
        let max_z = self.engine.last_matching(seed, Direction::PosZ, filter)?.z;

        let region = Region::span(
            BlockPos::new(min_x, min_y, min_z),
            BlockPos::new(max_x, max_y, max_z),
        );

        if !self.size_filter.accepts(region.extent()) {
            trace!(%region, "uniform candidate rejected by size filter");
            return Ok(None);
        }

        // The extensions ran along the seed's axes only; any cell off those
        // axes may still fail the filter.
        for pos in region.blocks() {
            if !filter.matches(&self.engine.handle_at(pos)) {
                trace!(%pos, "uniform candidate has a non-matching interior cell");
                return Ok(None);
            }
        }

        let members: BTreeSet<BlockPos> = region.blocks().filter(|pos| *pos != seed).collect();
        Ok(Some(StructureDefinition::new(
            self.structure_type.clone(),
            seed,
            members,
        )))
    }
}
