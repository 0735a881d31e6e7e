//! Error types for the farm simulation.

use thiserror::Error;

use crate::ids::{PlotId, TaskId};

/// Result type alias using [`FarmError`].
pub type Result<T> = std::result::Result<T, FarmError>;

/// Top-level error type for all farm simulation errors.
///
/// Business-rule rejections (`PlotNotFound` through `NotForSale`) are
/// expected during play; the plain service methods collapse them to
/// `false`/`0`. The remaining variants indicate a core bug or an
/// unusable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FarmError {
    /// No plot with this identifier exists on the farm.
    #[error("Plot not found: {0}")]
    PlotNotFound(PlotId),

    /// The plot already holds a crop or an animal.
    #[error("Plot is occupied: {0}")]
    PlotOccupied(PlotId),

    /// The plot holds a different kind of occupant than the operation needs.
    #[error("Plot {plot} does not hold a {expected}")]
    WrongOccupant {
        /// The plot that was targeted.
        plot: PlotId,
        /// What the operation expected to find.
        expected: &'static str,
    },

    /// Not enough gold.
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Amount required.
        required: u64,
        /// Amount available.
        available: u64,
    },

    /// Not enough seeds, livestock or goods in the inventory.
    #[error("Insufficient stock: need {required} {resource}, have {available}")]
    InsufficientStock {
        /// Resource name.
        resource: String,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// The shop does not offer this item in the requested form.
    #[error("Not for sale: {0}")]
    NotForSale(String),

    /// No configuration exists for a crop or animal kind.
    #[error("Missing configuration for {0}")]
    MissingConfig(String),

    /// A queued task could not be found.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Failed to parse configuration data.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Snapshot encoding or decoding failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Snapshot was written by an incompatible format version.
    #[error("Snapshot version mismatch: expected {expected}, got {found}")]
    SnapshotVersion {
        /// Version this build understands.
        expected: u32,
        /// Version found in the snapshot.
        found: u32,
    },

    /// Invalid farm state.
    #[error("Invalid farm state: {0}")]
    InvalidState(String),
}

impl FarmError {
    /// Whether this error is an expected business-rule rejection rather
    /// than a defect.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::PlotNotFound(_)
                | Self::PlotOccupied(_)
                | Self::WrongOccupant { .. }
                | Self::InsufficientFunds { .. }
                | Self::InsufficientStock { .. }
                | Self::NotForSale(_)
        )
    }
}
