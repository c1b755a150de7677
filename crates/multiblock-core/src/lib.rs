//! # multiblock-core
//!
//! Core types for the multiblock workspace.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other multiblock crates. It provides:
//!
//! - Geometry types (BlockPos, Direction, Extent, Region)
//! - Block model (BlockKind, Visibility, BlockHandle, CandidateTag)
//! - Filter predicates and size filters
//! - Structure data model (definitions, instances, persisted markers)
//! - Collaborator traits (WorldProvider, MarkerStore)
//! - Lifecycle events and observers
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other multiblock crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all modules
pub mod block;
pub mod error;
pub mod events;
pub mod filter;
pub mod geometry;
pub mod structure;
pub mod world;

// Re-export commonly used types
pub use block::{BlockHandle, BlockKind, CandidateTag, Visibility};
pub use error::{Error, Result};
pub use events::{NullObserver, RecordingObserver, StructureEvent, StructureObserver};
pub use filter::{
    AllOf, AnyOf, BlockFilter, BlockRelation, CapabilityFilter, ExactSize, Footprint2D,
    FootprintFilter, KindFilter, Not, SizeFilter, SizeRange,
};
pub use geometry::{BlockPos, Direction, Extent, Region, RegionIter};
pub use structure::{
    AnchorMarker, MemberMarker, StructureDefinition, StructureId, StructureInstance,
    StructurePayload,
};
pub use world::{EventDisposition, MarkerStore, WorldProvider};
