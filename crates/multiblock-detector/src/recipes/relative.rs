//! Anchor-relative box recipe for heterogeneous interiors.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::trace;

use multiblock_core::{
    BlockFilter, BlockPos, BlockRelation, Direction, Region, Result, SizeFilter,
    StructureDefinition,
};

use crate::engine::DetectionEngine;
use crate::recipe::StructureRecipe;

/// Box recipe whose extension step tests each neighbor against the *seed's*
/// handle through a binary relation, so membership can be judged relative
/// to the anchor instead of against one absolute predicate.
///
/// Note the box is grown by the relation but the final full-box validation
/// runs the base filter: a cell the relation accepted can still sink the
/// match. The discrepancy is long-standing behavior that registered
/// patterns depend on, so it is kept and pinned by
/// `grown_by_relation_but_validated_by_base_filter` below.
pub struct RelativeUniformRecipe {
    structure_type: String,
    engine: DetectionEngine,
    base_filter: Arc<dyn BlockFilter>,
    relation: Arc<dyn BlockRelation>,
    size_filter: Arc<dyn SizeFilter>,
}

impl RelativeUniformRecipe {
    /// Create a recipe producing definitions of the given pattern type.
    pub fn new(
        structure_type: impl Into<String>,
        engine: DetectionEngine,
        base_filter: Arc<dyn BlockFilter>,
        relation: Arc<dyn BlockRelation>,
        size_filter: Arc<dyn SizeFilter>,
    ) -> Self {
        Self {
            structure_type: structure_type.into(),
            engine,
            base_filter,
            relation,
            size_filter,
        }
    }
}

impl StructureRecipe for RelativeUniformRecipe {
    fn structure_type(&self) -> &str {
        &self.structure_type
    }

    fn detect(&self, seed: BlockPos) -> Result<Option<StructureDefinition>> {
        let engine = &self.engine;
        let target = engine.handle_at(seed);
        if !self.base_filter.matches(&target) {
            return Ok(None);
        }

        let relation = self.relation.as_ref();
        let min_x = engine
            .last_matching_related(&target, seed, Direction::NegX, relation)?
            .x;
        let max_x = engine
            .last_matching_related(&target, seed, Direction::PosX, relation)?
            .x;
        let min_y = engine
            .last_matching_related(&target, seed, Direction::NegY, relation)?
            .y;
        let max_y = engine
            .last_matching_related(&target, seed, Direction::PosY, relation)?
            .y;
        let min_z = engine
            .last_matching_related(&target, seed, Direction::NegZ, relation)?
            .z;
        let max_z = engine
            .last_matching_related(&target, seed, Direction::PosZ, relation)?
            .z;

        let region = Region::span(
            BlockPos::new(min_x, min_y, min_z),
            BlockPos::new(max_x, max_y, max_z),
        );

        if !self.size_filter.accepts(region.extent()) {
            trace!(%region, "relative candidate rejected by size filter");
            return Ok(None);
        }

        for pos in region.blocks() {
            if !self.base_filter.matches(&engine.handle_at(pos)) {
                trace!(%pos, "relative candidate failed base-filter validation");
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

#[cfg(test)]
mod tests {
    use super::*;
    use multiblock_core::{BlockHandle, BlockKind, CapabilityFilter, Extent};
    use multiblock_world::GridWorld;

    fn mineral_world() -> Arc<GridWorld> {
        let world = GridWorld::new();
        world.register_kind(BlockKind::new("stone").with_capability("mineral"));
        world.register_kind(
            BlockKind::new("ore")
                .with_capability("mineral")
                .with_capability("valuable"),
        );
        Arc::new(world)
    }

    fn share_mineral() -> Arc<dyn BlockRelation> {
        Arc::new(|anchor: &BlockHandle, other: &BlockHandle| {
            anchor.has_capability("mineral") && other.has_capability("mineral")
        })
    }

    #[test]
    fn test_detects_box_related_to_anchor() {
        let world = mineral_world();
        world.fill(
            &Region::span(BlockPos::new(0, 0, 0), BlockPos::new(2, 1, 0)),
            "stone",
        );

        let recipe = RelativeUniformRecipe::new(
            "lode",
            DetectionEngine::new(world.clone()),
            Arc::new(CapabilityFilter::new("mineral")),
            share_mineral(),
            Arc::new(|_: Extent| true),
        );

        let definition = recipe.detect(BlockPos::new(1, 0, 0)).unwrap().unwrap();
        assert_eq!(
            definition.region(),
            Region::span(BlockPos::new(0, 0, 0), BlockPos::new(2, 1, 0))
        );
        assert_eq!(definition.members.len(), 5);
    }

    #[test]
    fn test_seed_must_match_base_filter() {
        let world = mineral_world();
        world.place(BlockPos::origin(), "stone");

        let recipe = RelativeUniformRecipe::new(
            "lode",
            DetectionEngine::new(world.clone()),
            Arc::new(CapabilityFilter::new("valuable")),
            share_mineral(),
            Arc::new(|_: Extent| true),
        );

        assert!(recipe.detect(BlockPos::origin()).unwrap().is_none());
    }

    #[test]
    fn grown_by_relation_but_validated_by_base_filter() {
        // The relation accepts any mineral pair, so the box grows over the
        // plain stone neighbors. Validation then runs the "valuable" base
        // filter, which those same neighbors fail: growth and validation
        // disagree, and the match dies.
        let world = mineral_world();
        world.place(BlockPos::new(0, 0, 0), "ore");
        world.place(BlockPos::new(1, 0, 0), "stone");

        let recipe = RelativeUniformRecipe::new(
            "lode",
            DetectionEngine::new(world.clone()),
            Arc::new(CapabilityFilter::new("valuable")),
            share_mineral(),
            Arc::new(|_: Extent| true),
        );

        assert!(recipe.detect(BlockPos::origin()).unwrap().is_none());

        // Shrink the world to the ore cell alone and the same recipe
        // matches: the box no longer contains a relation-only member.
        world.remove(BlockPos::new(1, 0, 0));
        let definition = recipe.detect(BlockPos::origin()).unwrap().unwrap();
        assert_eq!(definition.region(), Region::single(BlockPos::origin()));
    }

    #[test]
    fn test_size_filter_applies_to_grown_box() {
        let world = mineral_world();
        world.fill(
            &Region::span(BlockPos::new(0, 0, 0), BlockPos::new(3, 0, 0)),
            "ore",
        );

        let recipe = RelativeUniformRecipe::new(
            "lode",
            DetectionEngine::new(world.clone()),
            Arc::new(CapabilityFilter::new("valuable")),
            share_mineral(),
            Arc::new(|extent: Extent| extent.x <= 3),
        );

        assert!(recipe.detect(BlockPos::origin()).unwrap().is_none());
    }
}
