use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use frlayout::boundary::BoundaryShape;
use frlayout::config::{ConfigError, SimulationConfig};

/// Fruchterman-Reingold force-directed graph layout.
#[derive(Parser, Debug)]
#[command(name = "frlayout")]
#[command(version, about, long_about = None, allow_negative_numbers = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Animate the layout in the browser, restarting when the graph file changes
    Serve {
        /// Port to run the server on
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Directory the preview page is written to
        #[arg(long, default_value = "output")]
        dir: PathBuf,
    },
}

/// Options shared by the one-shot layout and the preview server
#[derive(clap::Args, Debug)]
pub struct LayoutArgs {
    /// Graph description file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Output file; the format follows the extension unless --format is given
    #[arg(short, long, global = true, default_value = "layout.svg")]
    pub output: PathBuf,

    /// Output format (svg or json)
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Log run parameters and the temperature every 20 steps
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Steps between redraws, 0 draws only the final layout [default: 1]
    #[arg(short, long = "refresh", global = true)]
    pub refresh: Option<usize>,

    /// Repulsion coefficient [default: 0.003]
    #[arg(long = "c1", visible_alias = "repulsion", global = true)]
    pub repulsion: Option<f64>,

    /// Attraction coefficient [default: 0.03]
    #[arg(long = "c2", visible_alias = "attraction", alias = "atraccion", global = true)]
    pub attraction: Option<f64>,

    /// Number of iterations [default: 500]
    #[arg(short, long = "iters", global = true)]
    pub iterations: Option<usize>,

    /// Canvas width in layout units [default: 1.0]
    #[arg(long, global = true)]
    pub width: Option<f64>,

    /// Canvas height in layout units [default: 1.0]
    #[arg(long, global = true)]
    pub height: Option<f64>,

    /// Shape nodes are kept inside [default: rectangle]
    #[arg(long, value_enum, global = true)]
    pub boundary: Option<BoundaryShape>,

    /// Seed for the initial placement; random when omitted
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// YAML or JSON file with simulation settings, overridden by flags
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Pause after each redraw, in milliseconds
    #[arg(long = "delay-ms", global = true)]
    pub delay_ms: Option<u64>,
}

impl Cli {
    /// Parse the process arguments, accepting `-c1`/`-c2` spellings
    pub fn parse_normalized() -> Self {
        let cli = Self::parse_from(normalize_args(std::env::args_os()));
        if cli.layout.path.is_none() {
            Self::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "the following required arguments were not provided:\n  --path <FILE>",
                )
                .exit();
        }
        cli
    }
}

impl LayoutArgs {
    /// Defaults, then the config file, then explicit flags
    pub fn simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(refresh) = self.refresh {
            config.refresh_interval = refresh;
        }
        if let Some(repulsion) = self.repulsion {
            config.repulsion = repulsion;
        }
        if let Some(attraction) = self.attraction {
            config.attraction = attraction;
        }
        if let Some(width) = self.width {
            config.canvas_width = width;
        }
        if let Some(height) = self.height {
            config.canvas_height = height;
        }
        if let Some(boundary) = self.boundary {
            config.boundary = boundary;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn delay_or(&self, default: Duration) -> Duration {
        self.delay_ms.map(Duration::from_millis).unwrap_or(default)
    }
}

/// Rewrite `-c1`/`-c2` (and their `=value` forms) to the long flags clap knows
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut seen_separator = false;
    args.into_iter()
        .map(|arg| {
            if seen_separator {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                seen_separator = true;
                return arg;
            }
            for short in ["-c1", "-c2"] {
                match text.strip_prefix(short) {
                    Some(rest) if rest.is_empty() || rest.starts_with('=') => {
                        return OsString::from(format!("-{short}{rest}"));
                    }
                    _ => {}
                }
            }
            arg
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_args(args.iter().map(OsString::from))).unwrap()
    }

    #[test]
    fn cli_parses_with_defaults() {
        let cli = parse(&["frlayout", "-p", "graph.txt"]);

        assert_eq!(cli.layout.path, Some(PathBuf::from("graph.txt")));
        assert_eq!(cli.layout.output, PathBuf::from("layout.svg"));
        assert!(!cli.layout.verbose);
        assert!(cli.command.is_none());
        assert_eq!(
            cli.layout.simulation_config().unwrap(),
            SimulationConfig::default()
        );
    }

    #[test]
    fn normalizes_single_dash_coefficients() {
        let args = normalize_args(
            ["frlayout", "-c1", "0.5", "-c2=0.25", "-c", "--", "-c1"]
                .into_iter()
                .map(OsString::from),
        );

        assert_eq!(
            args,
            ["frlayout", "--c1", "0.5", "--c2=0.25", "-c", "--", "-c1"]
                .map(OsString::from)
                .to_vec()
        );
    }

    #[test]
    fn cli_parses_layout_flags() {
        let cli = parse(&[
            "frlayout", "-v", "-r", "10", "-c1", "0.01", "--atraccion", "0.2", "-i", "50", "-p",
            "g.txt", "-o", "out.json", "--boundary", "ellipse", "--seed", "7", "--width", "2",
            "--height", "3",
        ]);
        let config = cli.layout.simulation_config().unwrap();

        assert!(cli.layout.verbose);
        assert_eq!(cli.layout.seed, Some(7));
        assert_eq!(config.refresh_interval, 10);
        assert_eq!(config.repulsion, 0.01);
        assert_eq!(config.attraction, 0.2);
        assert_eq!(config.iterations, 50);
        assert_eq!(config.boundary, BoundaryShape::Ellipse);
        assert_eq!((config.canvas_width, config.canvas_height), (2.0, 3.0));
    }

    #[test]
    fn cli_parses_serve_subcommand() {
        let cli = parse(&["frlayout", "serve", "-p", "g.txt", "--port", "8080"]);

        match cli.command {
            Some(Commands::Serve { port, dir }) => {
                assert_eq!(port, 8080);
                assert_eq!(dir, PathBuf::from("output"));
            }
            _ => panic!("Expected Serve command"),
        }
        assert_eq!(cli.layout.path, Some(PathBuf::from("g.txt")));
    }

    #[test]
    fn rejects_negative_iterations() {
        let result = Cli::try_parse_from(["frlayout", "-p", "g.txt", "-i", "-5"]);

        assert!(result.is_err());
    }

    #[test]
    fn negative_coefficient_fails_validation() {
        let cli = parse(&["frlayout", "-p", "g.txt", "-c1", "-1"]);

        assert!(matches!(
            cli.layout.simulation_config(),
            Err(ConfigError::NegativeCoefficient { .. })
        ));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, "iterations: 20\nrepulsion: 0.5\n").unwrap();

        let cli = parse(&[
            "frlayout",
            "-p",
            "g.txt",
            "--config",
            path.to_str().unwrap(),
            "-i",
            "30",
        ]);
        let config = cli.layout.simulation_config().unwrap();

        assert_eq!(config.iterations, 30);
        assert_eq!(config.repulsion, 0.5);
        assert_eq!(config.attraction, SimulationConfig::default().attraction);
    }

    #[test]
    fn delay_falls_back_to_default() {
        let cli = parse(&["frlayout", "-p", "g.txt"]);
        assert_eq!(
            cli.layout.delay_or(Duration::from_millis(40)),
            Duration::from_millis(40)
        );

        let cli = parse(&["frlayout", "-p", "g.txt", "--delay-ms", "5"]);
        assert_eq!(cli.layout.delay_or(Duration::ZERO), Duration::from_millis(5));
    }
}
