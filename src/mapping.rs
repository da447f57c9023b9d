//! Flat-to-tiled index mapping.

use crate::kernel::{for_each_run, Run};
use crate::plan::{build_plan, Traversal, TraversalPlan};
use crate::radix::{decompose, tile_origin, TileCoord};
use crate::shape::{Shape, TileVec, Tiling};
use crate::Result;

/// The addresses a tiled traversal visits, computed once from a [`Tiling`].
///
/// - `hw[p]` is the flat (software) address visited at step `p`.
/// - `sw` is indexed by flat address and is filled in visiting order with
///   `sw[a] = a`, so `sw[hw[p]] == hw[p]` for every `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMapping {
    tiling: Tiling,
    traversal: Traversal,
    sw: Vec<usize>,
    hw: Vec<usize>,
}

/// Map a `(channel, col, row)` tensor tiled by `(ch_vec, col_vec, row_vec)`
/// using the reference traversal.
///
/// Fails if any argument is zero or a tile size does not divide its dimension.
pub fn compute_mapping(
    channel: usize,
    col: usize,
    row: usize,
    ch_vec: usize,
    col_vec: usize,
    row_vec: usize,
) -> Result<IndexMapping> {
    let tiling = Tiling::new(
        Shape::new(channel, col, row),
        TileVec::new(ch_vec, col_vec, row_vec),
    )?;
    IndexMapping::new(&tiling)
}

impl IndexMapping {
    /// Mapping for the reference traversal.
    pub fn new(tiling: &Tiling) -> Result<Self> {
        Self::with_traversal(tiling, Traversal::reference())
    }

    pub fn with_traversal(tiling: &Tiling, traversal: Traversal) -> Result<Self> {
        let elements = tiling.elements();
        log::debug!(
            "mapping {} tiled by {}: {} tiles of {} ({}, {}, {})",
            tiling.shape(),
            tiling.tile(),
            tiling.tile_count(),
            tiling.tile_len(),
            traversal.layout,
            traversal.within,
            traversal.across,
        );

        let plan = build_plan(tiling, &traversal);
        let mut sw = vec![0usize; elements];
        let mut hw = Vec::with_capacity(elements);
        for_each_run(&plan, |run| {
            for addr in run.addresses() {
                sw[addr] = addr;
                hw.push(addr);
            }
            Ok(())
        })?;
        debug_assert_eq!(hw.len(), elements);

        Ok(Self {
            tiling: *tiling,
            traversal,
            sw,
            hw,
        })
    }

    #[inline]
    pub fn tiling(&self) -> &Tiling {
        &self.tiling
    }

    #[inline]
    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.tiling.shape()
    }

    #[inline]
    pub fn sw(&self) -> &[usize] {
        &self.sw
    }

    #[inline]
    pub fn hw(&self) -> &[usize] {
        &self.hw
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hw.is_empty()
    }

    /// Consume the mapping, returning `(sw, hw)`.
    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>) {
        (self.sw, self.hw)
    }

    /// Inverse of `hw`: `positions()[hw[p]] == p`.
    pub fn positions(&self) -> Vec<usize> {
        let mut pos = vec![0usize; self.hw.len()];
        for (p, &addr) in self.hw.iter().enumerate() {
            pos[addr] = p;
        }
        pos
    }

    /// `hw` split into one slice per tile, in tile order.
    pub fn tiles(&self) -> std::slice::Chunks<'_, usize> {
        self.hw.chunks(self.tiling.tile_len())
    }

    /// Coordinates of tile `i` in tile units.
    pub fn tile_coord(&self, i: usize) -> TileCoord {
        decompose(&self.tiling, self.traversal.across, i)
    }

    /// Flat address of the first element of tile `i`.
    pub fn tile_start(&self, i: usize) -> usize {
        tile_origin(
            &self.tiling,
            self.tile_coord(i),
            self.traversal.strides(&self.tiling),
        )
    }

    /// Fused loop nest that produced `hw`.
    pub fn plan(&self) -> TraversalPlan {
        build_plan(&self.tiling, &self.traversal)
    }

    /// Maximal innermost runs of `hw`, in visiting order.
    pub fn runs(&self) -> Vec<Run> {
        let plan = self.plan();
        let mut runs = Vec::with_capacity(plan.run_count());
        let _ = for_each_run(&plan, |run| {
            runs.push(run);
            Ok(())
        });
        runs
    }

    /// Whether `hw` visits every address in `0..len()` exactly once.
    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.hw.len()];
        self.hw
            .iter()
            .all(|&a| a < seen.len() && !std::mem::replace(&mut seen[a], true))
    }
}
