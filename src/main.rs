use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use frlayout::io::{FormatRegistry, GraphReader};
use frlayout::observer::{Frame, FrameKind, Paced};
use frlayout::simulator::run_seeded;

mod cli;
mod server;

use cli::{Cli, Commands, LayoutArgs};

/// Pause between preview frames when --delay-ms is not given
const PREVIEW_DELAY: Duration = Duration::from_millis(30);

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn layout(args: &LayoutArgs, input: &Path) -> anyhow::Result<()> {
    let config = args.simulation_config()?;

    // Pick the writer before simulating so a bad output name fails fast
    let registry = FormatRegistry::with_defaults();
    let writer = registry.resolve(args.format.as_deref(), &args.output)?;

    let graph = GraphReader::new()
        .read(input)
        .with_context(|| format!("failed to load graph from {}", input.display()))?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "random seed");

    let mut observer = Paced::new((), args.delay_or(Duration::ZERO));
    let (state, summary) = run_seeded(&graph, config.clone(), seed, &mut observer)?;

    let frame = Frame {
        kind: FrameKind::Final,
        graph: &graph,
        state: &state,
        config: &config,
    };
    writer
        .write(&frame, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Laid out {} nodes in {} steps (seed {seed}), wrote {} to {}",
        graph.node_count(),
        summary.steps,
        writer.format_id(),
        args.output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_normalized();
    init_tracing(cli.layout.verbose);

    let Some(input) = cli.layout.path.clone() else {
        anyhow::bail!("no graph file given");
    };

    match cli.command {
        Some(Commands::Serve { port, dir }) => {
            let options = server::ServeOptions {
                input,
                output: dir,
                port,
                config: cli.layout.simulation_config()?,
                seed: cli.layout.seed,
                delay: cli.layout.delay_or(PREVIEW_DELAY),
            };
            server::serve(options).await?;
        }
        None => {
            layout(&cli.layout, &input)?;
        }
    }

    Ok(())
}
