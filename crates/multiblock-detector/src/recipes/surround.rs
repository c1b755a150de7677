//! Hollow-shell recipe: an outside material enclosing an inside material.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::trace;

use multiblock_core::{
    BlockFilter, BlockPos, Direction, Region, Result, SizeFilter, StructureDefinition,
};

use crate::engine::DetectionEngine;
use crate::recipe::StructureRecipe;

/// Detects a box whose shell satisfies `outside_filter` and whose strict
/// interior satisfies `inside_filter`.
///
/// The seed may sit anywhere on the shell. The walk first heads to the
/// minimum corner (X, then Y, then Z), re-walks X from that corner — the
/// first X walk may have started mid-wall and undershot — and then walks
/// the three positive directions to the opposite corner.
pub struct SurroundRecipe {
    structure_type: String,
    engine: DetectionEngine,
    outside_filter: Arc<dyn BlockFilter>,
    inside_filter: Arc<dyn BlockFilter>,
    size_filter: Arc<dyn SizeFilter>,
}

impl SurroundRecipe {
    /// Create a recipe producing definitions of the given pattern type.
    ///
    /// The size filter should demand an extent of at least 3 along every
    /// axis that is to have an interior.
    pub fn new(
        structure_type: impl Into<String>,
        engine: DetectionEngine,
        outside_filter: Arc<dyn BlockFilter>,
        inside_filter: Arc<dyn BlockFilter>,
        size_filter: Arc<dyn SizeFilter>,
    ) -> Self {
        Self {
            structure_type: structure_type.into(),
            engine,
            outside_filter,
            inside_filter,
            size_filter,
        }
    }
}

impl StructureRecipe for SurroundRecipe {
    fn structure_type(&self) -> &str {
        &self.structure_type
    }

    fn detect(&self, seed: BlockPos) -> Result<Option<StructureDefinition>> {
        let engine = &self.engine;
        let outside = self.outside_filter.as_ref();
        if !outside.matches(&engine.handle_at(seed)) {
            return Ok(None);
        }

        let min_x = engine.last_matching(seed, Direction::NegX, outside)?.x;
        let min_y = engine
            .last_matching(BlockPos::new(min_x, seed.y, seed.z), Direction::NegY, outside)?
            .y;
        let min_z = engine
            .last_matching(BlockPos::new(min_x, min_y, seed.z), Direction::NegZ, outside)?
            .z;
        let corner = BlockPos::new(min_x, min_y, min_z);
        let min_x = engine.last_matching(corner, Direction::NegX, outside)?.x;
        let corner = BlockPos::new(min_x, min_y, min_z);

        let max_x = engine.last_matching(corner, Direction::PosX, outside)?.x;
        let max_y = engine
            .last_matching(BlockPos::new(max_x, min_y, min_z), Direction::PosY, outside)?
            .y;
        let max_z = engine
            .last_matching(BlockPos::new(max_x, max_y, min_z), Direction::PosZ, outside)?
            .z;

        let shell = Region::span(corner, BlockPos::new(max_x, max_y, max_z));
        if !self.size_filter.accepts(shell.extent()) {
            trace!(%shell, "surround candidate rejected by size filter");
            return Ok(None);
        }

        let interior = shell.interior();
        for pos in shell.blocks() {
            let handle = engine.handle_at(pos);
            let is_interior = interior.as_ref().is_some_and(|region| region.contains(pos));
            if is_interior {
                if !self.inside_filter.matches(&handle) {
                    trace!(%pos, "surround candidate has a non-matching interior cell");
                    return Ok(None);
                }
            } else if !outside.matches(&handle) {
                trace!(%pos, "surround candidate has a non-matching shell cell");
                return Ok(None);
            }
        }

        let members: BTreeSet<BlockPos> = shell.blocks().filter(|pos| *pos != seed).collect();
        Ok(Some(StructureDefinition::new(
            self.structure_type.clone(),
            seed,
            members,
        )))
    }
}
