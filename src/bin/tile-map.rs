//! Print the tiled traversal order of a 3D tensor.
//!
//! ```text
//! tile-map CH COL ROW CH_VEC COL_VEC ROW_VEC [options]
//! tile-map --config tiling.json [options]
//!
//! options:
//!   --layout ORDER    memory layout, fastest axis first (default ch,col,row)
//!   --within ORDER    loop order inside a tile (default: layout)
//!   --across ORDER    tile index radix order (default: within)
//!   --runs            print the contiguous runs
//!   --verbose         print sw and hw
//! ```
//!
//! Set `RUST_LOG=debug` for mapping diagnostics.

use anyhow::{bail, Context, Result};
use tile_perm::{AxisOrder, IndexMapping, Shape, TileVec, TilingConfig, TraversalConfig};

#[derive(Debug, Default)]
struct Args {
    positional: Vec<usize>,
    config: Option<String>,
    traversal: TraversalConfig,
    runs: bool,
    verbose: bool,
}

fn parse_order(flag: &str, value: Option<String>) -> Result<AxisOrder> {
    let value = value.with_context(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .with_context(|| format!("invalid value for {flag}"))
}

fn parse_args(mut it: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(it.next().context("--config needs a path")?),
            "--layout" => args.traversal.layout = Some(parse_order(&arg, it.next())?),
            "--within" => args.traversal.within = Some(parse_order(&arg, it.next())?),
            "--across" => args.traversal.across = Some(parse_order(&arg, it.next())?),
            "--runs" => args.runs = true,
            "-v" | "--verbose" => args.verbose = true,
            flag if flag.starts_with('-') => bail!("unknown option {flag}"),
            value => args.positional.push(
                value
                    .parse()
                    .with_context(|| format!("expected a positive integer, got '{value}'"))?,
            ),
        }
    }
    Ok(args)
}

fn load(args: &Args) -> Result<TilingConfig> {
    let mut cfg = match (&args.config, args.positional.as_slice()) {
        (Some(path), []) => TilingConfig::from_path(path)?,
        (None, &[channel, col, row, ch_vec, col_vec, row_vec]) => TilingConfig {
            shape: Shape::new(channel, col, row),
            tile: TileVec::new(ch_vec, col_vec, row_vec),
            traversal: None,
        },
        (Some(_), _) => bail!("--config cannot be combined with positional sizes"),
        (None, _) => {
            bail!("usage: tile-map CH COL ROW CH_VEC COL_VEC ROW_VEC | --config FILE")
        }
    };

    let flags = &args.traversal;
    if flags.layout.is_some() || flags.within.is_some() || flags.across.is_some() {
        let base = cfg.traversal.take().unwrap_or_default();
        cfg.traversal = Some(TraversalConfig {
            layout: flags.layout.or(base.layout),
            within: flags.within.or(base.within),
            across: flags.across.or(base.across),
        });
    }
    Ok(cfg)
}

fn print_list(name: &str, values: &[usize]) {
    let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    println!("{name} = [{}]", joined.join(", "));
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args(std::env::args().skip(1))?;
    let cfg = load(&args)?;
    let mapping: IndexMapping = cfg.mapping().context("cannot build index mapping")?;

    let tiling = mapping.tiling();
    let traversal = mapping.traversal();
    println!(
        "shape {} tile {}: {} elements, {} tiles, layout {}, within {}, across {}",
        tiling.shape(),
        tiling.tile(),
        tiling.elements(),
        tiling.tile_count(),
        traversal.layout,
        traversal.within,
        traversal.across,
    );

    if args.runs {
        for run in mapping.runs() {
            println!("run start={} len={} stride={}", run.start, run.len, run.stride);
        }
    }
    if args.verbose {
        print_list("sw", mapping.sw());
        print_list("hw", mapping.hw());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_positional_sizes() {
        let a = args(&["4", "4", "4", "2", "2", "2", "--verbose"]).unwrap();
        assert!(a.verbose);
        let cfg = load(&a).unwrap();
        assert_eq!(cfg.shape, Shape::new(4, 4, 4));
        assert_eq!(cfg.tile, TileVec::new(2, 2, 2));
    }

    #[test]
    fn test_order_flags() {
        let a = args(&["2", "4", "2", "1", "2", "2", "--layout", "col,row,ch"]).unwrap();
        let cfg = load(&a).unwrap();
        let (_, traversal) = cfg.build().unwrap();
        assert_eq!(traversal, tile_perm::Traversal::planar());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(args(&["4", "x"]).is_err());
        assert!(args(&["--layout"]).is_err());
        assert!(args(&["--bogus"]).is_err());
        assert!(load(&args(&["4", "4", "4"]).unwrap()).is_err());
    }
}
