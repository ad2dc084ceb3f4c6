use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use gui_bridge::bridge::GuiBridge;
use mpcore::export::ExportDocument;
use mpcore::model::DetectionMode;
use mpcore::summary::{percent, ResultSummary};
use mpcore::upload::ImageSource;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{default_bind_address, WorkflowConfig};
use workflow::runner::Runner;

mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Microplastic detection simulator driver")]
struct Args {
    /// Run a single analysis, print a summary and write the JSON export
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Image to analyze; the bundled sample is used when omitted
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long, default_value_t = DetectionMode::Fast)]
    mode: DetectionMode,
    /// Seed for reproducible detections
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "exports")]
    export_dir: PathBuf,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
    /// Keep the HTTP bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.mode, args.seed, args.export_dir, args.bind)
    };

    let runner = Arc::new(Runner::new(workflow_config.clone()));
    let gui_bridge = GuiBridge::new(runner.clone());
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    if args.offline {
        let image = match args.image.as_deref() {
            Some(path) => ImageSource::from_path(path)?,
            None => ImageSource::sample(),
        };
        let result = runtime.block_on(runner.execute(&image, None))?;
        let summary = ResultSummary::from_result(&result);

        println!(
            "Offline run ({} mode) on {} -> {}, {} polymer types",
            summary.mode,
            result.image_name,
            summary.headline(),
            summary.polymer_types
        );
        for entry in &summary.distribution {
            println!(
                "  {:<9} {:>3} ({:.1}%)",
                entry.particle, entry.count, entry.share_percent
            );
        }
        for (idx, detection) in result.detections.iter().enumerate() {
            println!(
                "  #{:<3} {:<9} {:<4} conf {:>4} | LDIR {:>6}",
                idx + 1,
                detection.particle_type,
                detection.polymer_type,
                percent(detection.confidence, 0),
                percent(detection.ldir_match_score, 1)
            );
        }

        let export_path = ExportDocument::from_result(&result)
            .write_to_dir(&workflow_config.export_dir, Utc::now())?;
        println!("Export written to {}", export_path.display());

        gui_bridge.publish(result)?;
        gui_bridge.publish_status(&format!(
            "Offline workflow results ready ({} completed runs).",
            gui_bridge.snapshot().completed_runs
        ));
    }

    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        runtime.block_on(async {
            tokio::select! {
                _ = gui_bridge.serve(workflow_config.bind) => Ok(()),
                res = signal::ctrl_c() => res.context("awaiting Ctrl+C to exit"),
            }
        })?;
    }

    Ok(())
}
