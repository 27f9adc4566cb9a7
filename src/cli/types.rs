use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::planes::PlaneRect;

#[derive(Debug, Parser)]
#[command(
    name = "bioimg",
    version,
    about = "Converts multidimensional microscopy images into planar records"
)]
pub(super) struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub(super) verbose: bool,

    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Prints per-series axis order, shape and pixel type as JSON.
    Info { input: PathBuf },
    /// Writes one container per series into OUTPUT, or a single container with --single.
    Convert {
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Sub-rectangle `X,Y,W,H`; non-positive W or H selects the full extent.
        #[arg(long)]
        rect: Option<PlaneRect>,
        #[arg(long, value_delimiter = ',')]
        depths: Vec<usize>,
        #[arg(long, value_delimiter = ',')]
        times: Vec<usize>,
        /// Require a single-series, one-sample-per-pixel input and write OUTPUT as one container.
        #[arg(long)]
        single: bool,
    },
    /// Emits the `path<TAB>series_count<TAB>planes_per_series` table for INPUTS.
    GetMeta {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Prints the split descriptors for INPUTS as JSON.
    Plan {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Planes per split; 0 means one split per series.
        #[arg(long, default_value_t = 0)]
        planes_per_split: usize,
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
    /// Plans and executes a YAML or JSON job.
    Run {
        #[arg(long)]
        job: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Lists a container's records as JSON, optionally saving one as a PNG preview.
    Dump {
        container: PathBuf,
        #[arg(long)]
        png: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        record: usize,
    },
}
