//! Error types for the multiblock workspace.
//!
//! A pattern simply not matching is *not* an error; recipes report that as
//! `Ok(None)`. Errors are reserved for configuration mistakes, the
//! defensive boundary-walk bound, and persisted-data integrity violations.

use thiserror::Error;

use crate::{BlockPos, Direction};

/// Main error type for multiblock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Layer spec rejected at recipe construction
    #[error("invalid layer bounds: min height {min}, max height {max}")]
    InvalidLayerBounds {
        /// Configured minimum height
        min: i32,
        /// Configured maximum height
        max: i32,
    },

    /// Boundary walk hit its defensive step bound
    #[error("boundary walk from {start} heading {direction:?} exceeded {limit} steps")]
    WalkLimitExceeded {
        /// Cell the walk started from
        start: BlockPos,
        /// Direction walked
        direction: Direction,
        /// Configured step bound
        limit: usize,
    },

    /// Member marker back-references a cell with no anchor marker
    #[error("member marker at {member} references {anchor}, which holds no anchor marker")]
    DanglingMemberMarker {
        /// The member cell
        member: BlockPos,
        /// The referenced anchor coordinate
        anchor: BlockPos,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_layer_bounds_display() {
        let err = Error::InvalidLayerBounds { min: 3, max: 1 };
        assert_eq!(
            err.to_string(),
            "invalid layer bounds: min height 3, max height 1"
        );
    }

    #[test]
    fn test_walk_limit_display() {
        let err = Error::WalkLimitExceeded {
            start: BlockPos::new(1, 2, 3),
            direction: Direction::PosY,
            limit: 256,
        };
        assert_eq!(
            err.to_string(),
            "boundary walk from (1, 2, 3) heading PosY exceeded 256 steps"
        );
    }

    #[test]
    fn test_dangling_member_display() {
        let err = Error::DanglingMemberMarker {
            member: BlockPos::new(0, 0, 0),
            anchor: BlockPos::new(5, 0, 0),
        };
        assert!(err.to_string().contains("(5, 0, 0)"));
        assert!(err.to_string().contains("no anchor marker"));
    }
}
