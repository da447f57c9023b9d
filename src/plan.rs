//! Lowering a tiled traversal to a flat loop nest.
//!
//! A traversal visits the tensor with six nested loops: three inside a tile
//! and three over tiles. Each loop is a level `(extent, stride)` listed
//! fastest first. Levels of extent 1 are dropped and neighbouring levels that
//! step through memory contiguously are fused, so the kernel runs as few
//! levels as possible and hands out the longest possible runs.

use crate::axis::AxisOrder;
use crate::shape::Tiling;
use serde::{Deserialize, Serialize};

/// How a tiled tensor is laid out and walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Traversal {
    /// Memory layout of the flat tensor, unit-stride axis first.
    pub layout: AxisOrder,
    /// Loop order inside a tile, fastest first.
    pub within: AxisOrder,
    /// Radix order of the tile index, fastest first.
    pub across: AxisOrder,
}

impl Traversal {
    pub const fn new(layout: AxisOrder, within: AxisOrder, across: AxisOrder) -> Self {
        Self {
            layout,
            within,
            across,
        }
    }

    /// Interleaved layout, channel fastest inside and across tiles.
    pub const fn reference() -> Self {
        Self::new(
            AxisOrder::CHANNEL_COL_ROW,
            AxisOrder::CHANNEL_COL_ROW,
            AxisOrder::CHANNEL_COL_ROW,
        )
    }

    /// Planar layout, column fastest inside and across tiles.
    pub const fn planar() -> Self {
        Self::new(
            AxisOrder::COL_ROW_CHANNEL,
            AxisOrder::COL_ROW_CHANNEL,
            AxisOrder::COL_ROW_CHANNEL,
        )
    }

    /// Element strides of the flat tensor, indexed by `Axis::index`.
    pub fn strides(&self, tiling: &Tiling) -> [usize; 3] {
        self.layout.contiguous_strides(tiling.shape().extents())
    }
}

impl Default for Traversal {
    fn default() -> Self {
        Self::reference()
    }
}

/// Fused loop nest for one traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalPlan {
    /// Loop extents, fastest first.
    pub dims: Vec<usize>,
    /// Address step of each loop, fastest first.
    pub strides: Vec<usize>,
}

impl TraversalPlan {
    /// Elements visited by the plan.
    pub fn total_len(&self) -> usize {
        self.dims.iter().product()
    }

    /// Number of innermost runs the kernel emits.
    pub fn run_count(&self) -> usize {
        self.dims.iter().skip(1).product()
    }
}

/// The six unfused loop levels of a traversal, fastest first.
pub fn loop_levels(tiling: &Tiling, traversal: &Traversal) -> (Vec<usize>, Vec<usize>) {
    let strides = traversal.strides(tiling);
    let vecs = tiling.tile().extents();
    let times = tiling.times();

    let mut dims = Vec::with_capacity(6);
    let mut steps = Vec::with_capacity(6);
    for axis in traversal.within.axes() {
        dims.push(vecs[axis.index()]);
        steps.push(strides[axis.index()]);
    }
    for axis in traversal.across.axes() {
        dims.push(times[axis.index()]);
        steps.push(vecs[axis.index()] * strides[axis.index()]);
    }
    (dims, steps)
}

/// Remove extent-1 levels.
///
/// If every level has extent 1, a single unit level is kept so the kernel has
/// something to iterate over.
pub fn compress_levels(dims: &[usize], strides: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let kept: Vec<usize> = (0..dims.len()).filter(|&i| dims[i] != 1).collect();

    if kept.is_empty() {
        return (vec![1], vec![1]);
    }

    (
        kept.iter().map(|&i| dims[i]).collect(),
        kept.iter().map(|&i| strides[i]).collect(),
    )
}

/// Merge each level into its faster neighbour when it continues exactly
/// where the neighbour stops.
pub fn fuse_levels(dims: &[usize], strides: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let n = dims.len();
    if n <= 1 {
        return (dims.to_vec(), strides.to_vec());
    }

    let mut fused_dims = Vec::with_capacity(n);
    let mut fused_strides = Vec::with_capacity(n);
    fused_dims.push(dims[0]);
    fused_strides.push(strides[0]);

    for i in 1..n {
        let last = fused_dims.len() - 1;
        if strides[i] == fused_strides[last] * fused_dims[last] {
            fused_dims[last] *= dims[i];
        } else {
            fused_dims.push(dims[i]);
            fused_strides.push(strides[i]);
        }
    }

    (fused_dims, fused_strides)
}

/// Build the fused loop nest for `traversal` over `tiling`.
///
/// Pipeline: levels -> compress -> fuse.
pub fn build_plan(tiling: &Tiling, traversal: &Traversal) -> TraversalPlan {
    let (dims, strides) = loop_levels(tiling, traversal);
    let (dims, strides) = compress_levels(&dims, &strides);
    let (dims, strides) = fuse_levels(&dims, &strides);
    log::trace!("traversal plan: dims={dims:?} strides={strides:?}");
    TraversalPlan { dims, strides }
}
