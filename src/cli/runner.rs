use std::io::Write;

use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::prelude::*;

use crate::planes::PlaneFilter;
use crate::runtime::AppContext;

use super::types::{Cli, Commands};

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "bioimg_planes=debug"
    } else {
        "bioimg_planes=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}

fn plane_filter(depths: Vec<usize>, times: Vec<usize>) -> PlaneFilter {
    let mut filter = PlaneFilter::all();
    if !depths.is_empty() {
        filter = filter.with_depths(depths);
    }
    if !times.is_empty() {
        filter = filter.with_times(times);
    }
    filter
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let app = AppContext::new();

    match cli.command {
        Commands::Info { input } => {
            let info = app
                .convert_service()
                .info(&input)
                .map_err(|error| format!("info {}: {error}", input.display()))?;
            print_json(&info)?;
        }
        Commands::Convert {
            input,
            output,
            rect,
            depths,
            times,
            single,
        } => {
            let filter = plane_filter(depths, times);
            let rect = rect.unwrap_or_default();
            let failed = |error| format!("convert {}: {error}", input.display());
            if single {
                let records = app
                    .convert_service()
                    .convert_single(&input, &output, rect, &filter)
                    .map_err(failed)?;
                println!("{}", json!({"status": "ok", "output": output, "records": records}));
            } else {
                let report = app
                    .convert_service()
                    .convert(&input, &output, rect, &filter)
                    .map_err(failed)?;
                print_json(&report)?;
            }
        }
        Commands::GetMeta { inputs, output } => {
            let table = app
                .split_service()
                .collect_metadata(&inputs)
                .map_err(|error| format!("get-meta: {error}"))?;
            match output {
                Some(path) => table
                    .save(&path)
                    .map_err(|error| format!("get-meta {}: {error}", path.display()))?,
                None => std::io::stdout()
                    .write_all(table.to_tsv().as_bytes())
                    .map_err(|error| error.to_string())?,
            }
        }
        Commands::Plan {
            inputs,
            planes_per_split,
            metadata,
        } => {
            let splits = app
                .split_service()
                .plan(&inputs, planes_per_split, metadata.as_deref())
                .map_err(|error| format!("plan: {error}"))?;
            print_json(&splits)?;
        }
        Commands::Run { job, report } => {
            let failed = |error| format!("run {}: {error}", job.display());
            let spec = app.job_service().load_spec(&job).map_err(failed)?;
            let run_report = app.job_service().run(&spec).map_err(failed)?;
            if let Some(report_path) = report {
                app.job_service()
                    .save_report(&report_path, &run_report)
                    .map_err(|error| format!("run {}: {error}", report_path.display()))?;
            }
            print_json(&run_report)?;
        }
        Commands::Dump {
            container,
            png,
            record,
        } => {
            let failed = |error| format!("dump {}: {error}", container.display());
            if let Some(png) = png {
                app.container_service()
                    .export_png(&container, record, &png)
                    .map_err(failed)?;
            }
            let summary = app.container_service().dump(&container).map_err(failed)?;
            print_json(&summary)?;
        }
    }

    Ok(())
}
