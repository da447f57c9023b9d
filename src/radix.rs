//! Mixed-radix decomposition of tile indices.
//!
//! Tile `i` is located by writing it in a mixed-radix system whose radices are
//! the per-axis tile counts `(ch_times, col_times, row_times)`, taken in some
//! axis order with the fastest-varying radix first.

use crate::axis::{Axis, AxisOrder};
use crate::shape::Tiling;

/// Position of a tile in tile units along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileCoord {
    pub channel: usize,
    pub col: usize,
    pub row: usize,
}

impl TileCoord {
    #[inline]
    pub const fn to_array(self) -> [usize; 3] {
        [self.channel, self.col, self.row]
    }

    #[inline]
    pub const fn from_array(a: [usize; 3]) -> Self {
        Self {
            channel: a[0],
            col: a[1],
            row: a[2],
        }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> usize {
        self.to_array()[axis.index()]
    }
}

/// Split tile index `i` into tile coordinates, `order.fastest()` varying fastest.
pub fn decompose(tiling: &Tiling, order: AxisOrder, i: usize) -> TileCoord {
    let times = tiling.times();
    let mut coord = [0usize; 3];
    let mut rest = i;
    for axis in order.axes() {
        let radix = times[axis.index()];
        coord[axis.index()] = rest % radix;
        rest /= radix;
    }
    debug_assert_eq!(rest, 0, "tile index {i} out of range");
    TileCoord::from_array(coord)
}

/// Inverse of [`decompose`].
pub fn compose(tiling: &Tiling, order: AxisOrder, coord: TileCoord) -> usize {
    let times = tiling.times();
    let c = coord.to_array();
    order
        .axes()
        .iter()
        .rev()
        .fold(0usize, |acc, &axis| acc * times[axis.index()] + c[axis.index()])
}

/// Flat address of the first element of a tile.
///
/// `strides` are element strides indexed by [`Axis::index`].
pub fn tile_origin(tiling: &Tiling, coord: TileCoord, strides: [usize; 3]) -> usize {
    let vecs = tiling.tile().extents();
    Axis::ALL
        .iter()
        .map(|&a| coord.get(a) * vecs[a.index()] * strides[a.index()])
        .sum()
}

/// Closed-form start address for tile `i`, within-tile row `m` and column `k`
/// under the interleaved layout (strides `(1, channel, channel*col)`) with
/// channel-fastest traversal inside and across tiles.
///
/// The `j`-th channel of that position lives at `start_point + j`.
pub fn start_point(tiling: &Tiling, i: usize, m: usize, k: usize) -> usize {
    let shape = tiling.shape();
    let tile = tiling.tile();
    let (channel, col) = (shape.channel, shape.col);
    let (ch_times, col_times) = (tiling.ch_times(), tiling.col_times());

    // i == 0 collapses to m*channel*col + k*channel
    (i / (col_times * ch_times)) * col * channel * tile.row_vec
        + m * channel * col
        + ((i / ch_times) % col_times) * channel * tile.col_vec
        + k * channel
        + (i % ch_times) * tile.ch_vec
}
