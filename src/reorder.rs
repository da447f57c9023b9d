//! Moving data between flat and tiled order.

use crate::mapping::IndexMapping;
use crate::{Result, TileError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn check_len(mapping: &IndexMapping, len: usize) -> Result<()> {
    if len != mapping.len() {
        return Err(TileError::LengthMismatch {
            expected: mapping.len(),
            got: len,
        });
    }
    Ok(())
}

/// Flat to tiled: `dst[p] = src[hw[p]]`.
pub fn gather_into<T: Copy>(dst: &mut [T], src: &[T], mapping: &IndexMapping) -> Result<()> {
    check_len(mapping, src.len())?;
    check_len(mapping, dst.len())?;

    for (d, &addr) in dst.iter_mut().zip(mapping.hw()) {
        *d = src[addr];
    }
    Ok(())
}

/// Tiled to flat: `dst[hw[p]] = src[p]`.
pub fn scatter_into<T: Copy>(dst: &mut [T], src: &[T], mapping: &IndexMapping) -> Result<()> {
    check_len(mapping, src.len())?;
    check_len(mapping, dst.len())?;

    for (&s, &addr) in src.iter().zip(mapping.hw()) {
        dst[addr] = s;
    }
    Ok(())
}

/// Convert a stream in `from`'s tiled order into `to`'s tiled order.
///
/// Both mappings must describe the same tensor shape; their tile sizes and
/// traversals may differ.
pub fn remap_into<T: Copy>(
    dst: &mut [T],
    src: &[T],
    from: &IndexMapping,
    to: &IndexMapping,
) -> Result<()> {
    if from.shape() != to.shape() {
        return Err(TileError::ShapeMismatch(from.shape(), to.shape()));
    }
    check_len(from, src.len())?;
    check_len(to, dst.len())?;

    let from_pos = from.positions();
    for (d, &addr) in dst.iter_mut().zip(to.hw()) {
        *d = src[from_pos[addr]];
    }
    Ok(())
}

/// Allocating form of [`gather_into`].
pub fn to_tiled<T: Copy + Default>(src: &[T], mapping: &IndexMapping) -> Result<Vec<T>> {
    let mut dst = vec![T::default(); mapping.len()];
    gather_into(&mut dst, src, mapping)?;
    Ok(dst)
}

/// Allocating form of [`scatter_into`].
pub fn to_flat<T: Copy + Default>(src: &[T], mapping: &IndexMapping) -> Result<Vec<T>> {
    let mut dst = vec![T::default(); mapping.len()];
    scatter_into(&mut dst, src, mapping)?;
    Ok(dst)
}

/// Parallel [`gather_into`].
#[cfg(feature = "parallel")]
pub fn par_gather_into<T: Copy + Send + Sync>(
    dst: &mut [T],
    src: &[T],
    mapping: &IndexMapping,
) -> Result<()> {
    check_len(mapping, src.len())?;
    check_len(mapping, dst.len())?;

    dst.par_iter_mut()
        .zip(mapping.hw().par_iter())
        .for_each(|(d, &addr)| *d = src[addr]);
    Ok(())
}

/// Parallel [`scatter_into`].
///
/// Runs as a gather through the inverse permutation so every destination slot
/// has exactly one writer.
#[cfg(feature = "parallel")]
pub fn par_scatter_into<T: Copy + Send + Sync>(
    dst: &mut [T],
    src: &[T],
    mapping: &IndexMapping,
) -> Result<()> {
    check_len(mapping, src.len())?;
    check_len(mapping, dst.len())?;

    let pos = mapping.positions();
    dst.par_iter_mut()
        .zip(pos.par_iter())
        .for_each(|(d, &p)| *d = src[p]);
    Ok(())
}
