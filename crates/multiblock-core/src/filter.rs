//! Predicates over block handles, handle pairs, and structure sizes.
//!
//! Filters are built once at configuration time and handed to recipes as
//! trait objects; they must be total and side-effect-free.

use std::sync::Arc;

use crate::{BlockHandle, Extent};

/// Boolean predicate over a single block handle.
pub trait BlockFilter: Send + Sync {
    /// Whether the handle satisfies this filter.
    ///
    /// The empty handle must never match.
    fn matches(&self, handle: &BlockHandle) -> bool;
}

impl<F> BlockFilter for F
where
    F: Fn(&BlockHandle) -> bool + Send + Sync,
{
    fn matches(&self, handle: &BlockHandle) -> bool {
        self(handle)
    }
}

/// Binary relation between the detection anchor's handle and another handle.
///
/// Used where membership is judged relative to the anchor block rather than
/// against one absolute predicate.
pub trait BlockRelation: Send + Sync {
    /// Whether `other` is related to `anchor`.
    fn related(&self, anchor: &BlockHandle, other: &BlockHandle) -> bool;
}

impl<F> BlockRelation for F
where
    F: Fn(&BlockHandle, &BlockHandle) -> bool + Send + Sync,
{
    fn related(&self, anchor: &BlockHandle, other: &BlockHandle) -> bool {
        self(anchor, other)
    }
}

/// Matches occupied cells of one exact kind name.
pub struct KindFilter {
    name: String,
}

impl KindFilter {
    /// Filter for the given kind name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl BlockFilter for KindFilter {
    fn matches(&self, handle: &BlockHandle) -> bool {
        handle.kind_name() == Some(self.name.as_str())
    }
}

/// Matches occupied cells carrying a capability tag.
pub struct CapabilityFilter {
    capability: String,
}

impl CapabilityFilter {
    /// Filter for the given capability.
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }
}

impl BlockFilter for CapabilityFilter {
    fn matches(&self, handle: &BlockHandle) -> bool {
        handle.has_capability(&self.capability)
    }
}

/// Matches when every inner filter matches.
pub struct AllOf {
    filters: Vec<Arc<dyn BlockFilter>>,
}

impl AllOf {
    /// Combine filters conjunctively.
    pub fn new(filters: Vec<Arc<dyn BlockFilter>>) -> Self {
        Self { filters }
    }
}

impl BlockFilter for AllOf {
    fn matches(&self, handle: &BlockHandle) -> bool {
        self.filters.iter().all(|filter| filter.matches(handle))
    }
}

/// Matches when at least one inner filter matches.
pub struct AnyOf {
    filters: Vec<Arc<dyn BlockFilter>>,
}

impl AnyOf {
    /// Combine filters disjunctively.
    pub fn new(filters: Vec<Arc<dyn BlockFilter>>) -> Self {
        Self { filters }
    }
}

impl BlockFilter for AnyOf {
    fn matches(&self, handle: &BlockHandle) -> bool {
        self.filters.iter().any(|filter| filter.matches(handle))
    }
}

/// Inverts an inner filter.
///
/// Note this makes the empty handle match; combine with an occupancy check
/// when that is not intended.
pub struct Not {
    filter: Arc<dyn BlockFilter>,
}

impl Not {
    /// Negate a filter.
    pub fn new(filter: Arc<dyn BlockFilter>) -> Self {
        Self { filter }
    }
}

impl BlockFilter for Not {
    fn matches(&self, handle: &BlockHandle) -> bool {
        !self.filter.matches(handle)
    }
}

/// Boolean predicate over a candidate structure's 3D extent.
pub trait SizeFilter: Send + Sync {
    /// Whether the extent is acceptable.
    fn accepts(&self, extent: Extent) -> bool;
}

impl<F> SizeFilter for F
where
    F: Fn(Extent) -> bool + Send + Sync,
{
    fn accepts(&self, extent: Extent) -> bool {
        self(extent)
    }
}

/// Accepts exactly one extent.
pub struct ExactSize {
    extent: Extent,
}

impl ExactSize {
    /// Filter accepting only the given extent.
    pub fn new(extent: Extent) -> Self {
        Self { extent }
    }
}

impl SizeFilter for ExactSize {
    fn accepts(&self, extent: Extent) -> bool {
        extent == self.extent
    }
}

/// Accepts extents within per-axis inclusive bounds.
pub struct SizeRange {
    min: Extent,
    max: Extent,
}

impl SizeRange {
    /// Filter accepting extents between `min` and `max` inclusive, per axis.
    pub fn new(min: Extent, max: Extent) -> Self {
        Self { min, max }
    }
}

impl SizeFilter for SizeRange {
    fn accepts(&self, extent: Extent) -> bool {
        extent.x >= self.min.x
            && extent.x <= self.max.x
            && extent.y >= self.min.y
            && extent.y <= self.max.y
            && extent.z >= self.min.z
            && extent.z <= self.max.z
    }
}

/// Boolean predicate over a horizontal (X/Z) footprint.
pub trait FootprintFilter: Send + Sync {
    /// Whether the two horizontal extents are acceptable.
    fn accepts(&self, a: u32, b: u32) -> bool;
}

impl<F> FootprintFilter for F
where
    F: Fn(u32, u32) -> bool + Send + Sync,
{
    fn accepts(&self, a: u32, b: u32) -> bool {
        self(a, b)
    }
}

/// Axis-order-independent exact footprint match.
///
/// A footprint of (4, 2) and (2, 4) are the same shape rotated, so the two
/// configured sizes are compared against the sorted pair.
pub struct Footprint2D {
    small: u32,
    large: u32,
}

impl Footprint2D {
    /// Filter accepting the given footprint in either axis order.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            small: a.min(b),
            large: a.max(b),
        }
    }
}

impl FootprintFilter for Footprint2D {
    fn accepts(&self, a: u32, b: u32) -> bool {
        a.min(b) == self.small && a.max(b) == self.large
    }
}
