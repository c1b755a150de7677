//! Property-based tests for pattern detection.
//!
//! Uses proptest to generate random worlds and verify recipe invariants.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use multiblock_core::{BlockKind, BlockPos, Extent, KindFilter, Region};
use multiblock_detector::{DetectionEngine, StructureRecipe, SurroundRecipe, UniformRecipe};
use multiblock_world::GridWorld;

/// Generate a box extent between 1 and 4 cells per axis.
fn box_extent() -> impl Strategy<Value = (i32, i32, i32)> {
    (1i32..=4, 1i32..=4, 1i32..=4)
}

/// Generate a box origin within a modest coordinate range.
fn box_origin() -> impl Strategy<Value = (i32, i32, i32)> {
    (-8i32..=8, -8i32..=8, -8i32..=8)
}

fn solid_box_world(region: Region) -> Arc<GridWorld> {
    let world = GridWorld::new();
    world.register_kind(BlockKind::new("brick"));
    world.fill(&region, "brick");
    Arc::new(world)
}

fn uniform_recipe(world: Arc<GridWorld>) -> UniformRecipe {
    UniformRecipe::new(
        "box",
        DetectionEngine::new(world),
        Arc::new(KindFilter::new("brick")),
        Arc::new(|_: Extent| true),
    )
}

proptest! {
    /// An isolated solid box is detected exactly, from any seed inside it.
    #[test]
    fn uniform_detects_isolated_box_exactly(
        (ox, oy, oz) in box_origin(),
        (ex, ey, ez) in box_extent(),
        seed_index in 0usize..64,
    ) {
        let origin = BlockPos::new(ox, oy, oz);
        let region = Region::span(
            origin,
            BlockPos::new(ox + ex - 1, oy + ey - 1, oz + ez - 1),
        );
        let cells: Vec<BlockPos> = region.blocks().collect();
        let seed = cells[seed_index % cells.len()];

        let recipe = uniform_recipe(solid_box_world(region));
        let definition = recipe.detect(seed).unwrap().unwrap();

        prop_assert_eq!(definition.region(), region);
        prop_assert_eq!(definition.anchor, seed);

        let mut covered: BTreeSet<BlockPos> = definition.members.clone();
        covered.insert(definition.anchor);
        let expected: BTreeSet<BlockPos> = region.blocks().collect();
        prop_assert_eq!(covered, expected);
    }

    /// Removing a cell off the seed's axes leaves the six extensions blind
    /// to the hole, and the full re-scan must reject the match.
    #[test]
    fn uniform_rejects_boxes_with_interior_holes(
        (ox, oy, oz) in box_origin(),
        (ex, ey) in (3i32..=4, 3i32..=4),
    ) {
        let origin = BlockPos::new(ox, oy, oz);
        let region = Region::span(origin, BlockPos::new(ox + ex - 1, oy + ey - 1, oz));
        let world = solid_box_world(region);

        // Seed at the minimum corner; the opposite X/Y corner shares no
        // axis line with it.
        let seed = origin;
        let hole = BlockPos::new(ox + ex - 1, oy + ey - 1, oz);
        world.remove(hole);

        let recipe = uniform_recipe(world);
        prop_assert!(recipe.detect(seed).unwrap().is_none());
    }

    /// Hollow shells are fully classified: every interior cell must pass
    /// the inside filter and every shell cell the outside filter.
    #[test]
    fn surround_detects_hollow_shells(
        (ox, oy, oz) in box_origin(),
        (ex, ey, ez) in (3i32..=5, 3i32..=5, 3i32..=5),
        flip_index in 0usize..64,
        flip in proptest::bool::ANY,
    ) {
        let region = Region::span(
            BlockPos::new(ox, oy, oz),
            BlockPos::new(ox + ex - 1, oy + ey - 1, oz + ez - 1),
        );
        let interior = region.interior().unwrap();

        let world = GridWorld::new();
        world.register_kind(BlockKind::new("wall"));
        world.register_kind(BlockKind::new("cavity"));
        for pos in region.blocks() {
            let inside = interior.contains(pos);
            world.place(pos, if inside { "cavity" } else { "wall" });
        }

        if flip {
            // Corrupt one interior cell; the whole match must die.
            let cells: Vec<BlockPos> = interior.blocks().collect();
            let victim = cells[flip_index % cells.len()];
            world.remove(victim);
            world.place(victim, "wall");
        }

        let recipe = SurroundRecipe::new(
            "shell",
            DetectionEngine::new(Arc::new(world)),
            Arc::new(KindFilter::new("wall")),
            Arc::new(KindFilter::new("cavity")),
            Arc::new(|extent: Extent| extent.x >= 3 && extent.y >= 3 && extent.z >= 3),
        );

        let result = recipe.detect(region.min()).unwrap();
        if flip {
            prop_assert!(result.is_none());
        } else {
            let definition = result.unwrap();
            prop_assert_eq!(definition.region(), region);
            let interior_volume = interior.extent().volume();
            prop_assert_eq!(
                (definition.members.len() + 1) as u64,
                region.extent().volume(),
            );
            prop_assert!(interior_volume > 0);
        }
    }

    /// Detection never panics on sparse random worlds, whatever the seed.
    #[test]
    fn detection_never_panics_on_random_worlds(
        cells in proptest::collection::vec(
            ((-6i32..=6, -6i32..=6, -6i32..=6), proptest::bool::ANY),
            0..40,
        ),
        (sx, sy, sz) in (-6i32..=6, -6i32..=6, -6i32..=6),
    ) {
        let world = GridWorld::new();
        world.register_kind(BlockKind::new("wall"));
        world.register_kind(BlockKind::new("cavity"));
        for ((x, y, z), is_wall) in cells {
            world.place(BlockPos::new(x, y, z), if is_wall { "wall" } else { "cavity" });
        }
        let world = Arc::new(world);
        let seed = BlockPos::new(sx, sy, sz);

        let uniform = UniformRecipe::new(
            "box",
            DetectionEngine::new(Arc::clone(&world) as Arc<dyn multiblock_core::WorldProvider>),
            Arc::new(KindFilter::new("wall")),
            Arc::new(|_: Extent| true),
        );
        let surround = SurroundRecipe::new(
            "shell",
            DetectionEngine::new(Arc::clone(&world) as Arc<dyn multiblock_core::WorldProvider>),
            Arc::new(KindFilter::new("wall")),
            Arc::new(KindFilter::new("cavity")),
            Arc::new(|_: Extent| true),
        );

        let _ = uniform.detect(seed);
        let _ = surround.detect(seed);
    }
}
