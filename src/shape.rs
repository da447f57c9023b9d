//! Tensor shapes, tile sizes, and validated tilings.

use crate::axis::Axis;
use crate::{Result, TileError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extent of a `(channel, col, row)` tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shape {
    pub channel: usize,
    pub col: usize,
    pub row: usize,
}

impl Shape {
    pub const fn new(channel: usize, col: usize, row: usize) -> Self {
        Self { channel, col, row }
    }

    /// Extents indexed by [`Axis::index`].
    #[inline]
    pub const fn extents(&self) -> [usize; 3] {
        [self.channel, self.col, self.row]
    }

    #[inline]
    pub fn extent(&self, axis: Axis) -> usize {
        self.extents()[axis.index()]
    }

    /// Number of elements, or `None` on overflow.
    pub fn checked_elements(&self) -> Option<usize> {
        self.channel.checked_mul(self.col)?.checked_mul(self.row)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}x{}]", self.channel, self.col, self.row)
    }
}

/// Tile extent along each axis: the number of elements the hardware consumes
/// per cycle in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileVec {
    pub ch_vec: usize,
    pub col_vec: usize,
    pub row_vec: usize,
}

impl TileVec {
    pub const fn new(ch_vec: usize, col_vec: usize, row_vec: usize) -> Self {
        Self {
            ch_vec,
            col_vec,
            row_vec,
        }
    }

    /// Tile sizes indexed by [`Axis::index`].
    #[inline]
    pub const fn extents(&self) -> [usize; 3] {
        [self.ch_vec, self.col_vec, self.row_vec]
    }

    #[inline]
    pub fn extent(&self, axis: Axis) -> usize {
        self.extents()[axis.index()]
    }
}

impl fmt::Display for TileVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}x{}x{}>", self.ch_vec, self.col_vec, self.row_vec)
    }
}

/// A shape together with a tile size that evenly divides it.
///
/// Construction is the only place the divisibility invariant is checked; every
/// other module takes a `&Tiling` and relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tiling {
    shape: Shape,
    tile: TileVec,
    elements: usize,
}

impl Tiling {
    pub fn new(shape: Shape, tile: TileVec) -> Result<Self> {
        let dims = shape.extents();
        let vecs = tile.extents();

        for axis in Axis::ALL {
            let (dim, vec) = (dims[axis.index()], vecs[axis.index()]);
            if dim == 0 || vec == 0 {
                return Err(TileError::InvalidShape { axis, dim, vec });
            }
        }
        for axis in Axis::ALL {
            let (dim, vec) = (dims[axis.index()], vecs[axis.index()]);
            if dim % vec != 0 {
                return Err(TileError::InvalidTiling { axis, dim, vec });
            }
        }
        let elements = shape.checked_elements().ok_or(TileError::Overflow)?;

        Ok(Self {
            shape,
            tile,
            elements,
        })
    }

    /// A single tile covering the whole tensor.
    pub fn whole(shape: Shape) -> Result<Self> {
        Self::new(shape, TileVec::new(shape.channel, shape.col, shape.row))
    }

    /// One element per tile.
    pub fn scalar(shape: Shape) -> Result<Self> {
        Self::new(shape, TileVec::new(1, 1, 1))
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn tile(&self) -> TileVec {
        self.tile
    }

    #[inline]
    pub fn elements(&self) -> usize {
        self.elements
    }

    #[inline]
    pub fn ch_times(&self) -> usize {
        self.shape.channel / self.tile.ch_vec
    }

    #[inline]
    pub fn col_times(&self) -> usize {
        self.shape.col / self.tile.col_vec
    }

    #[inline]
    pub fn row_times(&self) -> usize {
        self.shape.row / self.tile.row_vec
    }

    /// Tile counts along each axis, indexed by [`Axis::index`].
    #[inline]
    pub fn times(&self) -> [usize; 3] {
        [self.ch_times(), self.col_times(), self.row_times()]
    }

    /// Elements per tile.
    #[inline]
    pub fn tile_len(&self) -> usize {
        self.tile.ch_vec * self.tile.col_vec * self.tile.row_vec
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.elements / self.tile_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_counts() {
        let t = Tiling::new(Shape::new(8, 6, 4), TileVec::new(2, 3, 1)).unwrap();
        assert_eq!(t.elements(), 192);
        assert_eq!(t.ch_times(), 4);
        assert_eq!(t.col_times(), 2);
        assert_eq!(t.row_times(), 4);
        assert_eq!(t.tile_len(), 6);
        assert_eq!(t.tile_count(), 32);
        assert_eq!(t.tile_count(), t.ch_times() * t.col_times() * t.row_times());
    }

    #[test]
    fn test_non_divisible_rejected() {
        let err = Tiling::new(Shape::new(5, 4, 4), TileVec::new(2, 2, 2)).unwrap_err();
        match err {
            TileError::InvalidTiling { axis, dim, vec } => {
                assert_eq!(axis, Axis::Channel);
                assert_eq!(dim, 5);
                assert_eq!(vec, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_divisible_row_rejected() {
        let err = Tiling::new(Shape::new(4, 4, 6), TileVec::new(2, 2, 4)).unwrap_err();
        assert!(matches!(
            err,
            TileError::InvalidTiling {
                axis: Axis::Row,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_rejected() {
        let err = Tiling::new(Shape::new(4, 0, 4), TileVec::new(2, 2, 2)).unwrap_err();
        assert!(matches!(
            err,
            TileError::InvalidShape {
                axis: Axis::Col,
                dim: 0,
                ..
            }
        ));

        let err = Tiling::new(Shape::new(4, 4, 4), TileVec::new(2, 2, 0)).unwrap_err();
        assert!(matches!(
            err,
            TileError::InvalidShape {
                axis: Axis::Row,
                vec: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_reported_before_divisibility() {
        // channel is not divisible, but the zero col_vec must win
        let err = Tiling::new(Shape::new(5, 4, 4), TileVec::new(2, 0, 2)).unwrap_err();
        assert!(matches!(err, TileError::InvalidShape { .. }));
    }

    #[test]
    fn test_overflow_rejected() {
        let err = Tiling::scalar(Shape::new(usize::MAX, 2, 1)).unwrap_err();
        assert!(matches!(err, TileError::Overflow));
    }

    #[test]
    fn test_whole_and_scalar() {
        let shape = Shape::new(3, 5, 7);
        let whole = Tiling::whole(shape).unwrap();
        assert_eq!(whole.tile_count(), 1);
        assert_eq!(whole.tile_len(), 105);
        let scalar = Tiling::scalar(shape).unwrap();
        assert_eq!(scalar.tile_count(), 105);
        assert_eq!(scalar.tile_len(), 1);
    }

    #[test]
    fn test_shape_deserialize_rejects_unknown_fields() {
        let ok: Shape = serde_json::from_str(r#"{"channel":4,"col":4,"row":2}"#).unwrap();
        assert_eq!(ok, Shape::new(4, 4, 2));
        assert!(serde_json::from_str::<Shape>(r#"{"channel":4,"col":4,"row":2,"z":1}"#).is_err());
    }
}
