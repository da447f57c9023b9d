//! Run-based iteration over a traversal plan.

use crate::plan::TraversalPlan;
use crate::Result;

/// A stretch of `len` addresses starting at `start`, `stride` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    pub start: usize,
    pub len: usize,
    pub stride: usize,
}

impl Run {
    /// Addresses covered by this run, in visiting order.
    pub fn addresses(&self) -> impl Iterator<Item = usize> {
        let Run { start, len, stride } = *self;
        (0..len).map(move |t| start + t * stride)
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.stride == 1 || self.len <= 1
    }
}

/// Call `f(run)` for every innermost run of `plan`, in traversal order.
///
/// The fastest level is handed out whole; the remaining levels are walked with
/// an odometer that keeps a running address offset.
pub fn for_each_run<F>(plan: &TraversalPlan, mut f: F) -> Result<()>
where
    F: FnMut(Run) -> Result<()>,
{
    let dims = &plan.dims;
    let strides = &plan.strides;
    let rank = dims.len();
    if rank == 0 {
        return f(Run {
            start: 0,
            len: 1,
            stride: 1,
        });
    }

    let d0 = dims[0];
    let s0 = strides[0];
    if rank == 1 {
        return f(Run {
            start: 0,
            len: d0,
            stride: s0,
        });
    }

    let mut idx = vec![0usize; rank];
    let mut offset = 0usize;

    loop {
        f(Run {
            start: offset,
            len: d0,
            stride: s0,
        })?;

        let mut level = 1usize;
        loop {
            offset += strides[level];
            idx[level] += 1;
            if idx[level] < dims[level] {
                break;
            }

            idx[level] = 0;
            offset -= dims[level] * strides[level];
            level += 1;
            if level == rank {
                return Ok(());
            }
        }
    }
}
