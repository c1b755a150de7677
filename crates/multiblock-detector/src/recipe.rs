//! The recipe trait every matching strategy implements.

use multiblock_core::{BlockPos, Result, StructureDefinition};

/// One pattern-matching strategy.
///
/// Recipes are registered under a pattern-type name and invoked with the
/// seed cell of a candidate placement. Detection is read-only: a recipe
/// never mutates the world.
pub trait StructureRecipe: Send + Sync {
    /// Pattern-type name embedded in produced definitions.
    fn structure_type(&self) -> &str;

    /// Attempt detection from `seed`.
    ///
    /// `Ok(None)` means the pattern does not match here, which is not an
    /// error. `Err` is reserved for defensive failures such as the walk
    /// bound tripping; callers log it and skip the placement.
    fn detect(&self, seed: BlockPos) -> Result<Option<StructureDefinition>>;
}
