//! Fruchterman-Reingold layout driver
//!
//! The simulator owns the [`LayoutState`] for one run and moves through
//! `Uninitialized -> Initialized -> Running -> Converged`:
//!
//! 1. [`Simulator::new`] validates the config against the graph.
//! 2. [`Simulator::initialize`] places nodes at random (or
//!    [`Simulator::initialize_with`] takes caller positions) and clamps them
//!    into the boundary.
//! 3. [`Simulator::run`] executes the iteration budget, calling the observer
//!    according to the refresh interval and once more at the end.
//!
//! Each step moves every node along its net displacement, capped at the
//! current temperature, then clamps it back into the boundary. The temperature
//! after step `i` is exactly `t0 - (i + 1) * dt`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::config::{ConfigError, SimulationConfig};
use crate::forces::ForceAccumulator;
use crate::graph::GraphModel;
use crate::layout::{LayoutState, randomize_positions};
use crate::observer::{Frame, FrameKind, Observer};

/// Steps between temperature log lines
pub const TEMPERATURE_LOG_INTERVAL: usize = 20;

/// Lifecycle of a simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    Running,
    Converged,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Initialized => "initialized",
            Phase::Running => "running",
            Phase::Converged => "converged",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("simulator is {found}, expected {expected}")]
    InvalidPhase { expected: Phase, found: Phase },

    #[error("iteration budget of {iterations} step(s) is exhausted")]
    BudgetExhausted { iterations: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Outcome of [`Simulator::run`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Steps executed over the simulator's lifetime
    pub steps: usize,
    /// Whether an observer asked to stop before the budget ran out
    pub stopped_early: bool,
    pub final_temperature: f64,
}

/// Runs the layout simulation for one graph
pub struct Simulator<'g> {
    graph: &'g GraphModel,
    config: SimulationConfig,
    forces: ForceAccumulator,
    initial_temperature: f64,
    cooling_step: f64,
    phase: Phase,
    state: LayoutState,
    steps_taken: usize,
}

impl<'g> Simulator<'g> {
    /// Validate `config` for `graph` and derive the run constants.
    ///
    /// Fails on an empty graph (the ideal edge length would divide by zero),
    /// a non-positive canvas, or unusable coefficients.
    pub fn new(graph: &'g GraphModel, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if graph.is_empty() {
            return Err(ConfigError::EmptyGraph);
        }

        let k = ForceAccumulator::ideal_edge_length(config.canvas_area(), graph.node_count());
        let forces = ForceAccumulator::new(config.repulsion, config.attraction, k);

        Ok(Self {
            graph,
            initial_temperature: config.initial_temperature(),
            cooling_step: config.cooling_step(),
            config,
            forces,
            phase: Phase::Uninitialized,
            state: LayoutState::default(),
            steps_taken: 0,
        })
    }

    /// Place every node uniformly at random over the canvas
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SimulationError> {
        self.expect_phase(Phase::Uninitialized)?;
        let state = randomize_positions(
            self.graph,
            self.config.canvas_width,
            self.config.canvas_height,
            rng,
        );
        self.start_from(state);
        Ok(())
    }

    /// Start from caller-supplied positions (clamped into the boundary)
    pub fn initialize_with(&mut self, state: LayoutState) -> Result<(), SimulationError> {
        self.expect_phase(Phase::Uninitialized)?;
        if state.len() != self.graph.node_count() {
            return Err(ConfigError::PositionCountMismatch {
                expected: self.graph.node_count(),
                found: state.len(),
            }
            .into());
        }
        self.start_from(state);
        Ok(())
    }

    fn start_from(&mut self, mut state: LayoutState) {
        let (width, height) = (self.config.canvas_width, self.config.canvas_height);
        for i in 0..state.len() {
            let clamped = self.config.boundary.clamp(state.positions()[i], width, height);
            state.set_position(i, clamped);
        }
        state.set_temperature(self.initial_temperature);

        self.state = state;
        self.steps_taken = 0;
        self.phase = Phase::Initialized;

        debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            k = self.forces.k(),
            t0 = self.initial_temperature,
            dt = self.cooling_step,
            boundary = %self.config.boundary,
            "layout initialized"
        );
    }

    /// Execute one step and return how many nodes moved
    pub fn step(&mut self) -> Result<usize, SimulationError> {
        match self.phase {
            Phase::Initialized | Phase::Running => {}
            found => {
                return Err(SimulationError::InvalidPhase {
                    expected: Phase::Running,
                    found,
                });
            }
        }
        if self.steps_taken >= self.config.iterations {
            return Err(SimulationError::BudgetExhausted {
                iterations: self.config.iterations,
            });
        }

        self.phase = Phase::Running;
        let moved = self.advance();
        if self.steps_taken == self.config.iterations {
            self.phase = Phase::Converged;
        }
        Ok(moved)
    }

    fn advance(&mut self) -> usize {
        let displacements = self.forces.compute(self.graph, &self.state);
        let temperature = self.state.temperature();
        let (width, height) = (self.config.canvas_width, self.config.canvas_height);

        let mut moved = 0;
        for (i, delta) in displacements.into_iter().enumerate() {
            let dist = delta.magnitude();
            // Zero (coincident or balanced) and non-finite displacements stay put.
            if dist == 0.0 || !dist.is_finite() {
                continue;
            }
            let target =
                self.state.positions()[i].add(delta.scale(dist.min(temperature) / dist));
            self.state
                .set_position(i, self.config.boundary.clamp(target, width, height));
            moved += 1;
        }

        let step = self.steps_taken;
        self.steps_taken += 1;
        let temperature =
            self.initial_temperature - self.steps_taken as f64 * self.cooling_step;
        self.state.set_temperature(temperature);

        trace!(step, moved, temperature, "step");
        if step % TEMPERATURE_LOG_INTERVAL == 0 {
            debug!(step, temperature, "temperature");
        }
        moved
    }

    /// Run the remaining iteration budget.
    ///
    /// With a non-zero refresh interval the observer sees the initial layout
    /// and every step whose index is a multiple of the interval. It always sees
    /// the final layout. `should_stop` is consulted before each step.
    pub fn run<O>(&mut self, observer: &mut O) -> Result<RunSummary, SimulationError>
    where
        O: Observer + ?Sized,
    {
        match self.phase {
            Phase::Initialized | Phase::Running => {}
            found => {
                return Err(SimulationError::InvalidPhase {
                    expected: Phase::Initialized,
                    found,
                });
            }
        }

        let refresh = self.config.refresh_interval;
        if refresh > 0 && self.phase == Phase::Initialized {
            observer.observe(&self.frame(FrameKind::Initial));
        }

        self.phase = Phase::Running;
        let mut stopped_early = false;
        while self.steps_taken < self.config.iterations {
            if observer.should_stop() {
                stopped_early = true;
                debug!(step = self.steps_taken, "stop requested");
                break;
            }
            let step = self.steps_taken;
            self.advance();
            if refresh > 0 && step % refresh == 0 {
                observer.observe(&self.frame(FrameKind::Step(step)));
            }
        }

        self.phase = Phase::Converged;
        observer.observe(&self.frame(FrameKind::Final));

        let summary = RunSummary {
            steps: self.steps_taken,
            stopped_early,
            final_temperature: self.state.temperature(),
        };
        info!(
            steps = summary.steps,
            stopped_early,
            temperature = summary.final_temperature,
            "layout finished"
        );
        Ok(summary)
    }

    fn frame(&self, kind: FrameKind) -> Frame<'_> {
        Frame {
            kind,
            graph: self.graph,
            state: &self.state,
            config: &self.config,
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), SimulationError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SimulationError::InvalidPhase {
                expected,
                found: self.phase,
            })
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn graph(&self) -> &'g GraphModel {
        self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current positions and temperature (empty until initialized)
    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn into_state(self) -> LayoutState {
        self.state
    }

    /// Ideal edge length `k`
    pub fn ideal_edge_length(&self) -> f64 {
        self.forces.k()
    }

    pub fn initial_temperature(&self) -> f64 {
        self.initial_temperature
    }

    pub fn cooling_step(&self) -> f64 {
        self.cooling_step
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }
}

/// Lay out `graph` from a seeded random placement and return the final state
pub fn run_seeded<O>(
    graph: &GraphModel,
    config: SimulationConfig,
    seed: u64,
    observer: &mut O,
) -> Result<(LayoutState, RunSummary), SimulationError>
where
    O: Observer + ?Sized,
{
    let mut simulator = Simulator::new(graph, config)?;
    simulator.initialize(&mut ChaCha8Rng::seed_from_u64(seed))?;
    let summary = simulator.run(observer)?;
    Ok((simulator.into_state(), summary))
}
