use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::Router;
use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::{LiveReloadLayer, Reloader};
use tracing::{info, warn};

use frlayout::config::SimulationConfig;
use frlayout::io::GraphReader;
use frlayout::observer::{Frame, FrameKind, Observer, Paced, StopSignal};
use frlayout::simulator::run_seeded;
use frlayout::svg_writer::SvgWriter;

/// What the preview server lays out and how
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub port: u16,
    pub config: SimulationConfig,
    pub seed: Option<u64>,
    pub delay: Duration,
}

/// Rewrites the preview page on every observed frame and reloads the browser
struct LiveFrames {
    page: PathBuf,
    staging: PathBuf,
    writer: SvgWriter,
    reloader: Reloader,
    stop: StopSignal,
}

impl Observer for LiveFrames {
    fn observe(&mut self, frame: &Frame<'_>) {
        // A superseded run must not overwrite its successor's frames.
        if self.stop.is_stopped() {
            return;
        }
        let status = match frame.kind {
            FrameKind::Initial => "initial placement".to_string(),
            FrameKind::Step(i) => format!("step {}/{}", i + 1, frame.config.iterations),
            FrameKind::Final => "done".to_string(),
        };
        match self.writer.render_page(frame, &status) {
            Ok(html) => match self.publish(&html) {
                Ok(true) => self.reloader.reload(),
                Ok(false) => {}
                Err(e) => warn!("could not write {}: {e}", self.page.display()),
            },
            Err(e) => warn!("could not render frame: {e}"),
        }
    }

    fn should_stop(&self) -> bool {
        self.stop.is_stopped()
    }
}

/// Distinguishes the staging files of overlapping runs
static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

impl LiveFrames {
    fn new(dir: &Path, writer: SvgWriter, reloader: Reloader, stop: StopSignal) -> Self {
        let run = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            page: dir.join("index.html"),
            staging: dir.join(format!(".index.{run}.html.tmp")),
            writer,
            reloader,
            stop,
        }
    }

    /// Replace the page unless this run was superseded while rendering.
    ///
    /// The page is swapped in with a rename, so a reader never sees a
    /// half-written file. Returns whether the page was replaced.
    fn publish(&self, html: &str) -> std::io::Result<bool> {
        if self.stop.is_stopped() {
            return Ok(false);
        }
        fs::write(&self.staging, html)?;
        if self.stop.is_stopped() {
            fs::remove_file(&self.staging)?;
            return Ok(false);
        }
        fs::rename(&self.staging, &self.page)?;
        Ok(true)
    }
}

/// Re-run the layout from the current graph file, streaming frames
fn relayout(options: &ServeOptions, stop: StopSignal, reloader: Reloader) -> anyhow::Result<()> {
    let graph = GraphReader::new().read(&options.input)?;
    let seed = options.seed.unwrap_or_else(rand::random);
    info!(seed, nodes = graph.node_count(), "starting layout");

    let title = options
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string());
    let live = LiveFrames::new(
        &options.output,
        SvgWriter::new().with_title(title),
        reloader,
        stop,
    );
    let mut observer = Paced::new(live, options.delay);

    let (_, summary) = run_seeded(&graph, options.config.clone(), seed, &mut observer)?;
    if !summary.stopped_early {
        println!("Layout finished after {} steps", summary.steps);
    }
    Ok(())
}

/// Start the live preview server
pub async fn serve(options: ServeOptions) -> anyhow::Result<()> {
    fs::create_dir_all(&options.output)?;

    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // Create channel for file change notifications
    let (tx, mut rx) = mpsc::channel::<()>(1);

    // Watch the input file's parent directory, reacting to the input only
    let input_name: Option<OsString> = options.input.file_name().map(|n| n.to_os_string());
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            let touches_input = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == input_name);
            if touches_input && (event.kind.is_modify() || event.kind.is_create()) {
                let _ = tx.blocking_send(());
            }
        }
    })?;
    let watch_path = options
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;

    // Each change cancels the running layout and starts a fresh one
    let job = options.clone();
    tokio::spawn(async move {
        let mut current: Option<StopSignal> = None;
        loop {
            if let Some(previous) = current.take() {
                previous.stop();
            }
            let stop = StopSignal::new();
            current = Some(stop.clone());

            let job = job.clone();
            let reloader = reloader.clone();
            tokio::task::spawn_blocking(move || {
                if let Err(e) = relayout(&job, stop, reloader) {
                    eprintln!("Error laying out {}: {e:#}", job.input.display());
                }
            });

            if rx.recv().await.is_none() {
                break;
            }
            // Debounce: wait a bit for rapid changes to settle
            tokio::time::sleep(Duration::from_millis(100)).await;

            // Drain any additional notifications
            while rx.try_recv().is_ok() {}
        }
    });

    // Build the router
    let app = Router::new()
        .fallback_service(ServeDir::new(&options.output))
        .layer(livereload);

    let addr = format!("0.0.0.0:{}", options.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Live preview running at http://localhost:{}", options.port);
    println!("Watching {} for changes...", options.input.display());
    println!("Press Ctrl+C to stop");

    // Keep watcher alive
    let _watcher = watcher;

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_frames(dir: &Path, stop: StopSignal) -> LiveFrames {
        LiveFrames::new(dir, SvgWriter::new(), LiveReloadLayer::new().reloader(), stop)
    }

    #[test]
    fn publish_replaces_page_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let live = live_frames(dir.path(), StopSignal::new());

        assert!(live.publish("<p>first</p>").unwrap());
        assert!(live.publish("<p>second</p>").unwrap());

        assert_eq!(
            fs::read_to_string(dir.path().join("index.html")).unwrap(),
            "<p>second</p>"
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn superseded_run_leaves_page_alone() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("index.html");
        fs::write(&page, "newer run").unwrap();

        let stop = StopSignal::new();
        let live = live_frames(dir.path(), stop.clone());
        stop.stop();

        assert!(!live.publish("stale frame").unwrap());
        assert_eq!(fs::read_to_string(&page).unwrap(), "newer run");
        assert!(live.should_stop());
    }

    #[test]
    fn overlapping_runs_stage_separately() {
        let dir = tempfile::tempdir().unwrap();
        let older = live_frames(dir.path(), StopSignal::new());
        let newer = live_frames(dir.path(), StopSignal::new());

        assert_ne!(older.staging, newer.staging);
        assert_eq!(older.page, newer.page);
    }
}
