//! Tensor axes and axis orderings.

use crate::{Result, TileError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three tensor axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Channel,
    Col,
    Row,
}

impl Axis {
    /// All axes in `(channel, col, row)` storage order.
    pub const ALL: [Axis; 3] = [Axis::Channel, Axis::Col, Axis::Row];

    /// Slot of this axis in `(channel, col, row)` triples.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::Channel => 0,
            Axis::Col => 1,
            Axis::Row => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Channel => "channel",
            Axis::Col => "col",
            Axis::Row => "row",
        };
        f.write_str(name)
    }
}

impl FromStr for Axis {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ch" | "chnl" | "channel" => Ok(Axis::Channel),
            "col" | "cols" | "column" => Ok(Axis::Col),
            "row" | "rows" => Ok(Axis::Row),
            other => Err(TileError::InvalidAxisOrder(format!("unknown axis '{other}'"))),
        }
    }
}

/// A permutation of the three axes, fastest-varying first.
///
/// Used for three different things: the memory layout (which axis has unit
/// stride), the loop nest inside a tile, and the radix order used to decompose
/// a tile index into tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AxisOrder([Axis; 3]);

impl AxisOrder {
    /// Channel fastest, then column, then row (interleaved / HWC).
    pub const CHANNEL_COL_ROW: AxisOrder = AxisOrder([Axis::Channel, Axis::Col, Axis::Row]);
    /// Column fastest, then row, then channel (planar / CHW).
    pub const COL_ROW_CHANNEL: AxisOrder = AxisOrder([Axis::Col, Axis::Row, Axis::Channel]);
    pub const CHANNEL_ROW_COL: AxisOrder = AxisOrder([Axis::Channel, Axis::Row, Axis::Col]);
    pub const COL_CHANNEL_ROW: AxisOrder = AxisOrder([Axis::Col, Axis::Channel, Axis::Row]);
    pub const ROW_CHANNEL_COL: AxisOrder = AxisOrder([Axis::Row, Axis::Channel, Axis::Col]);
    pub const ROW_COL_CHANNEL: AxisOrder = AxisOrder([Axis::Row, Axis::Col, Axis::Channel]);

    /// Every possible order.
    pub const ALL: [AxisOrder; 6] = [
        Self::CHANNEL_COL_ROW,
        Self::CHANNEL_ROW_COL,
        Self::COL_CHANNEL_ROW,
        Self::COL_ROW_CHANNEL,
        Self::ROW_CHANNEL_COL,
        Self::ROW_COL_CHANNEL,
    ];

    /// Build an order, rejecting repeated axes.
    pub fn new(axes: [Axis; 3]) -> Result<Self> {
        let mut seen = [false; 3];
        for axis in axes {
            if std::mem::replace(&mut seen[axis.index()], true) {
                return Err(TileError::InvalidAxisOrder(format!(
                    "axis {axis} appears more than once in {axes:?}"
                )));
            }
        }
        Ok(AxisOrder(axes))
    }

    #[inline]
    pub fn axes(&self) -> [Axis; 3] {
        self.0
    }

    #[inline]
    pub fn fastest(&self) -> Axis {
        self.0[0]
    }

    /// Position of `axis` in this order (0 = fastest).
    pub fn position(&self, axis: Axis) -> usize {
        if self.0[0] == axis {
            0
        } else if self.0[1] == axis {
            1
        } else {
            2
        }
    }

    /// Contiguous strides for `extents` laid out in this order.
    ///
    /// `extents` and the result are both indexed by [`Axis::index`].
    pub fn contiguous_strides(&self, extents: [usize; 3]) -> [usize; 3] {
        let mut strides = [0usize; 3];
        let mut stride = 1usize;
        for axis in self.0 {
            strides[axis.index()] = stride;
            stride *= extents[axis.index()];
        }
        strides
    }
}

impl Default for AxisOrder {
    fn default() -> Self {
        Self::CHANNEL_COL_ROW
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a},{b},{c}")
    }
}

impl FromStr for AxisOrder {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split([',', '/', ' ']).filter(|p| !p.is_empty()).collect();
        if parts.len() != 3 {
            return Err(TileError::InvalidAxisOrder(format!(
                "expected three axes, got '{s}'"
            )));
        }
        let axes = [parts[0].parse()?, parts[1].parse()?, parts[2].parse()?];
        AxisOrder::new(axes)
    }
}

impl TryFrom<String> for AxisOrder {
    type Error = TileError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AxisOrder> for String {
    fn from(order: AxisOrder) -> Self {
        order.to_string()
    }
}
