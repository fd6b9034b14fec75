mod args;

use anyhow::{anyhow, Context};
use args::Args;
use checkpoint::CheckpointStore;
use clap::Parser;
use file_io::create_file_buf_write;
use game::{FlappyGame, GameConfig, RewardScheme};
use model::{BasicModel, ModelDevice};
use plot::{spawn_plot_thread, PlotSender};
use serde::Serialize;
use solver::{Environment, Solver, SolverSettings};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::prelude::*;

// The replay memory keeps tens of thousands of stacked frames alive and
// churns through them constantly; jemalloc keeps fragmentation in check.
#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Everything needed to reproduce a run, written next to its checkpoints.
#[derive(Serialize)]
struct RunManifest<'a> {
    solver: &'a SolverSettings,
    learning_rate: f64,
    device: String,
    rewards: RewardScheme,
    game: &'a GameConfig,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
}

fn write_manifest(path: &Path, manifest: &RunManifest) -> anyhow::Result<()> {
    let mut file = create_file_buf_write(path)?;
    serde_json::to_writer_pretty(&mut file, manifest)?;
    file.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = args.solver_settings();
    settings
        .validate()
        .context("invalid training configuration")?;
    let experiment_dir = settings.experiment_dir();
    std::fs::create_dir_all(&experiment_dir)
        .with_context(|| format!("creating {}", experiment_dir.display()))?;

    let game_config = GameConfig::default();
    let rewards = args.reward_scheme();
    write_manifest(
        &experiment_dir.join("settings.json"),
        &RunManifest {
            solver: &settings,
            learning_rate: args.lr,
            device: args.device.to_string(),
            rewards,
            game: &game_config,
        },
    )
    .context("writing settings.json")?;

    let game = FlappyGame::new(game_config, rewards, args.seed);
    let device: ModelDevice = args.device;
    let model = BasicModel::new(game.n_actions(), args.lr, device)
        .with_context(|| format!("building the model on {device}"))?;
    let checkpoints = CheckpointStore::new(
        &settings.output_dir,
        &settings.experiment_name,
        &settings.model_name,
        settings.checkpoint_frequency,
        settings.checkpoint_retain,
    )?;

    let (plot_sender, plot_receiver) = crossbeam_channel::unbounded();
    let plot_thread = spawn_plot_thread(
        plot_receiver,
        experiment_dir.join("plots"),
        args.plot_data_per_point,
    )
    .context("starting the plot thread")?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            info!("interrupt received, stopping after the current frame");
            stop.store(true, Ordering::SeqCst);
        })
        .context("installing the Ctrl-C handler")?;
    }

    let telemetry = PlotSender::new(plot_sender);
    let mut solver = Solver::new(settings, game, model, checkpoints, telemetry)
        .context("could not start training")?;
    let result = solver.run(&stop);
    solver.telemetry().close();
    drop(solver);
    plot_thread
        .join()
        .map_err(|_| anyhow!("plot thread panicked"))?;
    result.context("training aborted")?;
    info!("done");
    Ok(())
}
