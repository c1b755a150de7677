//! Bounded boundary-walk primitive shared by all recipes.

use std::sync::Arc;

use multiblock_core::{
    BlockFilter, BlockHandle, BlockPos, BlockRelation, Direction, Error, Result, WorldProvider,
};

/// Default maximum steps for a single boundary walk.
///
/// The walk trusts the world to eventually return a non-matching empty
/// handle past loaded bounds; the bound guards against filters that stay
/// true forever.
pub const DEFAULT_WALK_LIMIT: usize = 256;

/// Walks cell-by-cell from a seed until a filter stops matching.
///
/// Cheap to clone; recipes each hold their own copy.
#[derive(Clone)]
pub struct DetectionEngine {
    world: Arc<dyn WorldProvider>,
    walk_limit: usize,
}

impl DetectionEngine {
    /// Engine with the default walk limit.
    pub fn new(world: Arc<dyn WorldProvider>) -> Self {
        Self::with_walk_limit(world, DEFAULT_WALK_LIMIT)
    }

    /// Engine with a custom walk limit.
    pub fn with_walk_limit(world: Arc<dyn WorldProvider>, walk_limit: usize) -> Self {
        Self { world, walk_limit }
    }

    /// The world this engine scans.
    pub fn world(&self) -> &Arc<dyn WorldProvider> {
        &self.world
    }

    /// Handle for the occupant of `pos`.
    pub fn handle_at(&self, pos: BlockPos) -> BlockHandle {
        self.world.handle_at(pos)
    }

    /// Last cell matching `filter` walking from `seed` along `direction`.
    ///
    /// The seed itself is not re-tested: if the immediate neighbor fails,
    /// the seed is returned unchanged. Fails with
    /// [`Error::WalkLimitExceeded`] when the filter is still matching after
    /// the configured number of steps.
    pub fn last_matching(
        &self,
        seed: BlockPos,
        direction: Direction,
        filter: &dyn BlockFilter,
    ) -> Result<BlockPos> {
        let mut current = seed;
        for _ in 0..self.walk_limit {
            let next = current.step(direction);
            if !filter.matches(&self.world.handle_at(next)) {
                return Ok(current);
            }
            current = next;
        }
        Err(Error::WalkLimitExceeded {
            start: seed,
            direction,
            limit: self.walk_limit,
        })
    }

    /// Relation-driven variant of [`last_matching`](Self::last_matching):
    /// each candidate neighbor is tested against the anchor's handle
    /// instead of an absolute filter.
    pub fn last_matching_related(
        &self,
        anchor: &BlockHandle,
        seed: BlockPos,
        direction: Direction,
        relation: &dyn BlockRelation,
    ) -> Result<BlockPos> {
        let mut current = seed;
        for _ in 0..self.walk_limit {
            let next = current.step(direction);
            if !relation.related(anchor, &self.world.handle_at(next)) {
                return Ok(current);
            }
            current = next;
        }
        Err(Error::WalkLimitExceeded {
            start: seed,
            direction,
            limit: self.walk_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiblock_core::{BlockKind, KindFilter, Region};
    use multiblock_world::GridWorld;

    fn engine_over_row(length: i32) -> DetectionEngine {
        let world = GridWorld::new();
        world.register_kind(BlockKind::new("stone"));
        world.fill(
            &Region::span(BlockPos::origin(), BlockPos::new(length - 1, 0, 0)),
            "stone",
        );
        DetectionEngine::new(Arc::new(world))
    }

    #[test]
    fn test_walk_stops_at_last_matching_cell() {
        let engine = engine_over_row(5);
        let filter = KindFilter::new("stone");

        let last = engine
            .last_matching(BlockPos::origin(), Direction::PosX, &filter)
            .unwrap();
        assert_eq!(last, BlockPos::new(4, 0, 0));
    }

    #[test]
    fn test_walk_returns_seed_when_neighbor_fails() {
        let engine = engine_over_row(5);
        let filter = KindFilter::new("stone");

        // Walking off the negative end immediately fails.
        let last = engine
            .last_matching(BlockPos::origin(), Direction::NegX, &filter)
            .unwrap();
        assert_eq!(last, BlockPos::origin());
    }

    #[test]
    fn test_walk_does_not_retest_seed() {
        let engine = engine_over_row(5);
        let filter = KindFilter::new("glass");

        // The seed would fail the filter, but it is never tested.
        let last = engine
            .last_matching(BlockPos::origin(), Direction::PosX, &filter)
            .unwrap();
        assert_eq!(last, BlockPos::origin());
    }

    #[test]
    fn test_walk_limit_trips_on_always_true_filter() {
        let engine = engine_over_row(1);
        let always = |_: &BlockHandle| true;

        let result = engine.last_matching(BlockPos::origin(), Direction::PosX, &always);
        assert!(matches!(
            result,
            Err(Error::WalkLimitExceeded {
                limit: DEFAULT_WALK_LIMIT,
                ..
            })
        ));
    }

    #[test]
    fn test_related_walk_compares_against_anchor() {
        let world = GridWorld::new();
        world.register_kind(BlockKind::new("stone").with_capability("mineral"));
        world.register_kind(BlockKind::new("ore").with_capability("mineral"));
        world.place(BlockPos::origin(), "stone");
        world.place(BlockPos::new(1, 0, 0), "ore");
        world.place(BlockPos::new(2, 0, 0), "ore");

        let engine = DetectionEngine::new(Arc::new(world));
        let anchor = engine.handle_at(BlockPos::origin());
        let share_capability = |a: &BlockHandle, b: &BlockHandle| {
            a.has_capability("mineral") && b.has_capability("mineral")
        };

        let last = engine
            .last_matching_related(&anchor, BlockPos::origin(), Direction::PosX, &share_capability)
            .unwrap();
        assert_eq!(last, BlockPos::new(2, 0, 0));
    }
}
