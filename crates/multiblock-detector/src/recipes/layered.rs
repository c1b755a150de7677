//! Vertically stacked heterogeneous-layer recipe.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::trace;

use multiblock_core::{
    BlockFilter, BlockPos, Direction, Error, FootprintFilter, Region, Result,
    StructureDefinition, StructurePayload,
};

use crate::engine::DetectionEngine;
use crate::recipe::StructureRecipe;

struct LayerSpec {
    min_height: u32,
    max_height: u32,
    filter: Arc<dyn BlockFilter>,
}

/// Detects a stack of horizontal layers, bottom to top, each with its own
/// filter and height bounds.
///
/// The seed fixes the shared X/Z footprint; layers above and below are then
/// measured along the seed's column and finally re-validated over their full
/// footprint volume.
pub struct LayeredRecipe {
    structure_type: String,
    engine: DetectionEngine,
    footprint_filter: Arc<dyn FootprintFilter>,
    layers: Vec<LayerSpec>,
}

impl LayeredRecipe {
    /// Create a recipe with no layers configured yet.
    pub fn new(
        structure_type: impl Into<String>,
        engine: DetectionEngine,
        footprint_filter: Arc<dyn FootprintFilter>,
    ) -> Self {
        Self {
            structure_type: structure_type.into(),
            engine,
            footprint_filter,
            layers: Vec::new(),
        }
    }

    /// Append a layer spec on top of the previously added ones.
    ///
    /// Fails fast with [`Error::InvalidLayerBounds`] when
    /// `min_height > max_height` or `min_height < 0`; a recipe with a
    /// malformed layer must never run.
    pub fn add_layer(
        &mut self,
        min_height: i32,
        max_height: i32,
        filter: Arc<dyn BlockFilter>,
    ) -> Result<()> {
        if min_height > max_height || min_height < 0 {
            return Err(Error::InvalidLayerBounds {
                min: min_height,
                max: max_height,
            });
        }
        self.layers.push(LayerSpec {
            min_height: min_height as u32,
            max_height: max_height as u32,
            filter,
        });
        Ok(())
    }

    fn detect_for_layer(
        &self,
        layer_index: usize,
        seed: BlockPos,
    ) -> Result<Option<StructureDefinition>> {
        let engine = &self.engine;
        let seed_filter = self.layers[layer_index].filter.as_ref();

        let min_x = engine.last_matching(seed, Direction::NegX, seed_filter)?.x;
        let max_x = engine.last_matching(seed, Direction::PosX, seed_filter)?.x;
        let min_z = engine.last_matching(seed, Direction::NegZ, seed_filter)?.z;
        let max_z = engine.last_matching(seed, Direction::PosZ, seed_filter)?.z;

        let width = (max_x - min_x + 1) as u32;
        let depth = (max_z - min_z + 1) as u32;
        if !self.footprint_filter.accepts(width, depth) {
            trace!(width, depth, "layered candidate rejected by footprint filter");
            return Ok(None);
        }

        let min_y = engine.last_matching(seed, Direction::NegY, seed_filter)?.y;
        let max_y = engine.last_matching(seed, Direction::PosY, seed_filter)?.y;
        let seed_layer = &self.layers[layer_index];
        let seed_height = (max_y - min_y + 1) as u32;
        if seed_height < seed_layer.min_height || seed_height > seed_layer.max_height {
            return Ok(None);
        }

        let mut heights = vec![0u32; self.layers.len()];
        heights[layer_index] = seed_height;

        // Walk up through the specs above the seed layer. Each is measured
        // along the seed's column from the current stack top.
        let mut stack_top = max_y;
        for (index, layer) in self.layers.iter().enumerate().skip(layer_index + 1) {
            let column = BlockPos::new(seed.x, stack_top, seed.z);
            let last = engine
                .last_matching(column, Direction::PosY, layer.filter.as_ref())?
                .y;
            let height = (last - stack_top) as u32;
            if height < layer.min_height || height > layer.max_height {
                return Ok(None);
            }
            heights[index] = height;
            stack_top += height as i32;
        }

        // Walk down through the specs below it.
        let mut stack_bottom = min_y;
        for (index, layer) in self.layers.iter().enumerate().take(layer_index).rev() {
            let column = BlockPos::new(seed.x, stack_bottom, seed.z);
            let last = engine
                .last_matching(column, Direction::NegY, layer.filter.as_ref())?
                .y;
            let height = (stack_bottom - last) as u32;
            if height < layer.min_height || height > layer.max_height {
                return Ok(None);
            }
            heights[index] = height;
            stack_bottom -= height as i32;
        }

        // Every boundary is fixed; confirm each non-empty layer over its
        // full footprint volume, not just the scanned column.
        let mut validation_y = stack_bottom;
        for (index, &height) in heights.iter().enumerate() {
            if height == 0 {
                continue;
            }
            let layer_region = Region::span(
                BlockPos::new(min_x, validation_y, min_z),
                BlockPos::new(max_x, validation_y + height as i32 - 1, max_z),
            );
            let filter = self.layers[index].filter.as_ref();
            for pos in layer_region.blocks() {
                if !filter.matches(&engine.handle_at(pos)) {
                    trace!(%pos, layer = index, "layered candidate failed full-volume validation");
                    return Ok(None);
                }
            }
            validation_y += height as i32;
        }

        let region = Region::span(
            BlockPos::new(min_x, stack_bottom, min_z),
            BlockPos::new(max_x, stack_top, max_z),
        );
        let members: BTreeSet<BlockPos> = region.blocks().filter(|pos| *pos != seed).collect();
        Ok(Some(
            StructureDefinition::new(self.structure_type.clone(), seed, members)
                .with_payload(StructurePayload::LayerHeights(heights)),
        ))
    }
}

impl StructureRecipe for LayeredRecipe {
    fn structure_type(&self) -> &str {
        &self.structure_type
    }

    fn detect(&self, seed: BlockPos) -> Result<Option<StructureDefinition>> {
        let target = self.engine.handle_at(seed);
        // The seed may satisfy several layer specs; each matching spec is
        // tried in order and the first full-stack success wins.
        for index in 0..self.layers.len() {
            if self.layers[index].filter.matches(&target) {
                if let Some(definition) = self.detect_for_layer(index, seed)? {
                    return Ok(Some(definition));
                }
            }
        }
        Ok(None)
    }
}
