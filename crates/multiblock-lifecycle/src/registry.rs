//! Mapping from pattern-type names to recipes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use multiblock_detector::StructureRecipe;

/// Registry of pattern recipes, keyed by pattern-type name.
///
/// Content modules register recipes programmatically at startup. Which of a
/// block's declared types is tried first is decided by the block's
/// candidate tag ordering, not by this registry.
#[derive(Default)]
pub struct StructureRegistry {
    recipes: HashMap<String, Arc<dyn StructureRecipe>>,
}

impl StructureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe under a pattern-type name.
    ///
    /// Idempotent overwrite: registering the same name again replaces the
    /// previous recipe.
    pub fn register(&mut self, structure_type: impl Into<String>, recipe: Arc<dyn StructureRecipe>) {
        let structure_type = structure_type.into();
        if self.recipes.insert(structure_type.clone(), recipe).is_some() {
            debug!(%structure_type, "replaced previously registered recipe");
        }
    }

    /// Recipe registered under a pattern-type name, if any.
    pub fn lookup(&self, structure_type: &str) -> Option<Arc<dyn StructureRecipe>> {
        self.recipes.get(structure_type).cloned()
    }

    /// Number of registered pattern types.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether no recipe is registered.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
