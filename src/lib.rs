//! Index mapping between flat and hardware-tiled 3D tensor layouts.
//!
//! A `(channel, col, row)` tensor stored flat in memory is consumed by a
//! vectorized pipeline as a sequence of `(ch_vec, col_vec, row_vec)` tiles.
//! This crate computes the order in which the pipeline visits flat addresses
//! and provides the routines that move data between the two orders.
//!
//! # Pipeline
//!
//! ```text
//! Shape + TileVec -> Tiling -> TraversalPlan -> runs -> IndexMapping -> reorder
//! ```
//!
//! # Example
//!
//! ```
//! let mapping = tile_perm::compute_mapping(4, 4, 4, 2, 2, 2).unwrap();
//! assert_eq!(&mapping.hw()[..4], &[0, 1, 4, 5]);
//! ```

pub mod axis;
pub mod config;
pub mod kernel;
pub mod mapping;
pub mod plan;
pub mod radix;
pub mod reorder;
pub mod shape;

// Re-export primary API
pub use axis::{Axis, AxisOrder};
pub use config::{TilingConfig, TraversalConfig};
pub use kernel::{for_each_run, Run};
pub use mapping::{compute_mapping, IndexMapping};
pub use plan::{build_plan, Traversal, TraversalPlan};
pub use radix::{start_point, TileCoord};
pub use reorder::{gather_into, remap_into, scatter_into, to_flat, to_tiled};
#[cfg(feature = "parallel")]
pub use reorder::{par_gather_into, par_scatter_into};
pub use shape::{Shape, TileVec, Tiling};

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur while building or applying a tiled index mapping.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    /// A tensor dimension or tile size is zero.
    #[error("invalid shape: {axis} has dim {dim} and tile size {vec}")]
    InvalidShape { axis: Axis, dim: usize, vec: usize },

    /// A tile size does not evenly divide its tensor dimension.
    #[error("invalid tiling: {axis} tile size {vec} does not divide dim {dim}")]
    InvalidTiling { axis: Axis, dim: usize, vec: usize },

    /// An axis order is not a permutation of {channel, col, row}.
    #[error("invalid axis order: {0}")]
    InvalidAxisOrder(String),

    /// A data buffer does not hold exactly one value per tensor element.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Two mappings describe tensors of different shapes.
    #[error("shape mismatch: {0} vs {1}")]
    ShapeMismatch(Shape, Shape),

    /// Element count does not fit in `usize`.
    #[error("element count overflow")]
    Overflow,

    /// Tiling configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for tiling operations.
pub type Result<T> = std::result::Result<T, TileError>;
