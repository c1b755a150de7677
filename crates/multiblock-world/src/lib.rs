//! # multiblock-world
//!
//! Chunked in-memory voxel store for the multiblock workspace.
//!
//! This crate provides:
//! - Chunk addressing (16-cell chunks, euclidean division for negatives)
//! - Per-cell state (kind, visual variant, structure markers, candidate tag)
//! - `GridWorld`, implementing the `WorldProvider` and `MarkerStore`
//!   collaborator traits with explicit chunk load/unload and serde-backed
//!   chunk paging
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on multiblock-core
//! and is the world the detection and lifecycle layers are exercised
//! against.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod grid;

// Re-export commonly used types
pub use chunk::{chunks_covering, BlockState, Chunk, ChunkPage, ChunkPos, CHUNK_EDGE};
pub use grid::GridWorld;
