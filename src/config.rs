//! JSON tiling configuration.
//!
//! ```json
//! {
//!   "shape": { "channel": 4, "col": 4, "row": 4 },
//!   "tile":  { "ch_vec": 2, "col_vec": 2, "row_vec": 2 },
//!   "traversal": { "layout": "ch,col,row" }
//! }
//! ```
//!
//! `traversal` and each of its fields are optional. `within` defaults to
//! `layout` and `across` defaults to `within`.

use crate::axis::AxisOrder;
use crate::mapping::IndexMapping;
use crate::plan::Traversal;
use crate::shape::{Shape, TileVec, Tiling};
use crate::{Result, TileError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilingConfig {
    pub shape: Shape,
    pub tile: TileVec,
    #[serde(default)]
    pub traversal: Option<TraversalConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraversalConfig {
    #[serde(default)]
    pub layout: Option<AxisOrder>,
    #[serde(default)]
    pub within: Option<AxisOrder>,
    #[serde(default)]
    pub across: Option<AxisOrder>,
}

impl TraversalConfig {
    pub fn resolve(&self) -> Traversal {
        let layout = self.layout.unwrap_or_default();
        let within = self.within.unwrap_or(layout);
        let across = self.across.unwrap_or(within);
        Traversal::new(layout, within, across)
    }
}

impl TilingConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| TileError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TileError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("loaded tiling config from {}", path.display());
        Self::from_json_str(&text)
    }

    /// Validate into a tiling and its traversal.
    pub fn build(&self) -> Result<(Tiling, Traversal)> {
        let tiling = Tiling::new(self.shape, self.tile)?;
        let traversal = self.traversal.clone().unwrap_or_default().resolve();
        Ok((tiling, traversal))
    }

    pub fn mapping(&self) -> Result<IndexMapping> {
        let (tiling, traversal) = self.build()?;
        IndexMapping::with_traversal(&tiling, traversal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = r#"{
        "shape": { "channel": 4, "col": 4, "row": 4 },
        "tile": { "ch_vec": 2, "col_vec": 2, "row_vec": 2 }
    }"#;

    #[test]
    fn test_minimal_config_uses_reference_traversal() {
        let cfg = TilingConfig::from_json_str(REFERENCE).unwrap();
        let (tiling, traversal) = cfg.build().unwrap();
        assert_eq!(tiling.elements(), 64);
        assert_eq!(traversal, Traversal::reference());
    }

    #[test]
    fn test_layout_propagates_to_loops() {
        let cfg = TilingConfig::from_json_str(
            r#"{
                "shape": { "channel": 2, "col": 4, "row": 2 },
                "tile": { "ch_vec": 1, "col_vec": 2, "row_vec": 2 },
                "traversal": { "layout": "col,row,ch" }
            }"#,
        )
        .unwrap();
        let (_, traversal) = cfg.build().unwrap();
        assert_eq!(traversal, Traversal::planar());
    }

    #[test]
    fn test_explicit_orders() {
        let cfg = TilingConfig::from_json_str(
            r#"{
                "shape": { "channel": 4, "col": 4, "row": 4 },
                "tile": { "ch_vec": 2, "col_vec": 2, "row_vec": 2 },
                "traversal": { "within": "row,col,ch", "across": "col,ch,row" }
            }"#,
        )
        .unwrap();
        let (_, traversal) = cfg.build().unwrap();
        assert_eq!(traversal.layout, AxisOrder::CHANNEL_COL_ROW);
        assert_eq!(traversal.within, AxisOrder::ROW_COL_CHANNEL);
        assert_eq!(traversal.across, AxisOrder::COL_CHANNEL_ROW);
        assert!(cfg.mapping().unwrap().is_bijection());
    }

    #[test]
    fn test_bad_axis_order_is_config_error() {
        let err = TilingConfig::from_json_str(
            r#"{
                "shape": { "channel": 4, "col": 4, "row": 4 },
                "tile": { "ch_vec": 2, "col_vec": 2, "row_vec": 2 },
                "traversal": { "layout": "ch,ch,row" }
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TileError::Config(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = TilingConfig::from_json_str(
            r#"{
                "shape": { "channel": 4, "col": 4, "row": 4 },
                "tile": { "ch_vec": 2, "col_vec": 2, "row_vec": 2 },
                "batch": 1
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TileError::Config(_)));
    }

    #[test]
    fn test_invalid_tiling_surfaces_from_build() {
        let cfg = TilingConfig::from_json_str(
            r#"{
                "shape": { "channel": 5, "col": 4, "row": 4 },
                "tile": { "ch_vec": 2, "col_vec": 2, "row_vec": 2 }
            }"#,
        )
        .unwrap();
        assert!(matches!(
            cfg.build().unwrap_err(),
            TileError::InvalidTiling { .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = TilingConfig::from_path("/nonexistent/tiling.json").unwrap_err();
        assert!(matches!(err, TileError::Config(_)));
    }

    #[test]
    fn test_serialize_roundtrip_orders_as_strings() {
        let cfg = TilingConfig {
            shape: Shape::new(4, 4, 4),
            tile: TileVec::new(2, 2, 2),
            traversal: Some(TraversalConfig {
                layout: Some(AxisOrder::COL_ROW_CHANNEL),
                within: None,
                across: None,
            }),
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"col,row,channel\""));
        assert_eq!(TilingConfig::from_json_str(&json).unwrap(), cfg);
    }
}
