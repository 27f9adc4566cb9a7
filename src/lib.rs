pub mod cli;
pub mod formats;
pub mod model;
pub mod planes;
pub mod runtime;
pub mod splits;
pub mod workflow;

pub fn run_cli() -> Result<(), String> {
    cli::run_cli()
}
