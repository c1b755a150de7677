//! # multiblock-detector
//!
//! Pattern detection engine for the multiblock workspace.
//!
//! This crate provides:
//! - `DetectionEngine`, the bounded boundary-walk primitive every matching
//!   strategy is built from
//! - The `StructureRecipe` trait
//! - The four recipe implementations (uniform, layered, surround,
//!   anchor-relative)
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on multiblock-core and
//! scans any `WorldProvider` implementation to detect forming structures.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod recipe;
pub mod recipes;

// Re-export commonly used types
pub use engine::{DetectionEngine, DEFAULT_WALK_LIMIT};
pub use recipe::StructureRecipe;
pub use recipes::{LayeredRecipe, RelativeUniformRecipe, SurroundRecipe, UniformRecipe};
