use crate::sampler::Sampler;
use crate::state::SimulationState;
use anyhow::Result;
use estimator_common::{LabelDisplay, RateParameters, Renderer};
use log::{debug, trace};
use std::time::Duration;

/// Run state of the cadence loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// Drives the sample-and-redraw cadence. Owns the user-tunable rate
/// parameters and the running flag, and performs one batch per tick while
/// running. Scheduling is cooperative: `tick` returns the delay to wait
/// before the next call, and returns `None` once the guard observes `Idle`.
/// There is no timer to cancel — a paused chain simply stops rescheduling.
pub struct CadenceController {
    run_state: RunState,
    params: RateParameters,
}

impl CadenceController {
    pub fn new(params: RateParameters) -> Self {
        Self {
            run_state: RunState::Idle,
            params,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn params(&self) -> &RateParameters {
        &self.params
    }

    /// Remaps both rate axes from the speed control. Read on the next tick.
    pub fn set_speed(&mut self, speed: u32) {
        self.params.set_speed(speed);
        debug!(
            "Speed adjusted: batch_size={}, tick_delay={}ms",
            self.params.batch_size, self.params.tick_delay_ms
        );
    }

    /// Cosmetic. Applies to batches plotted from the next tick onward,
    /// never retroactively to already-rendered points.
    pub fn set_marker_size(&mut self, size: u32) {
        self.params.set_marker_size(size);
    }

    /// Cosmetic, same timing as `set_marker_size`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.params.set_opacity(opacity);
    }

    /// Transitions Idle -> Running and immediately runs the first tick.
    /// A no-op while already running.
    pub fn start(
        &mut self,
        state: &mut SimulationState,
        sampler: &mut Sampler,
        renderer: &mut dyn Renderer,
        labels: &mut dyn LabelDisplay,
    ) -> Result<Option<Duration>> {
        if self.run_state == RunState::Running {
            debug!("Start requested while already running; ignoring.");
            return Ok(Some(self.tick_delay()));
        }
        self.run_state = RunState::Running;
        self.tick(state, sampler, renderer, labels)
    }

    /// Transitions to Idle without touching the accumulated state. A tick
    /// already scheduled when this is called will observe `Idle` and do
    /// nothing.
    pub fn pause(&mut self) {
        self.run_state = RunState::Idle;
        debug!("Cadence paused.");
    }

    /// Forces Idle, zeroes the accumulated state, redraws the reference
    /// geometry and pushes the zeroed metrics to the labels.
    pub fn reset(
        &mut self,
        state: &mut SimulationState,
        renderer: &mut dyn Renderer,
        labels: &mut dyn LabelDisplay,
    ) -> Result<()> {
        self.run_state = RunState::Idle;
        state.reset();
        renderer.clear_and_reinitialize()?;
        labels.update(
            state.total_points,
            state.points_inside,
            state.estimate,
            state.absolute_error,
            state.relative_error_percent,
        );
        debug!("Simulation reset.");
        Ok(())
    }

    /// One cadence tick, guarded by the running flag: draw a batch, hand
    /// the partitioned coordinates to the renderer, push the metrics to the
    /// labels, and return the delay until the next tick.
    pub fn tick(
        &mut self,
        state: &mut SimulationState,
        sampler: &mut Sampler,
        renderer: &mut dyn Renderer,
        labels: &mut dyn LabelDisplay,
    ) -> Result<Option<Duration>> {
        if self.run_state != RunState::Running {
            trace!("Tick fired while idle; skipping.");
            return Ok(None);
        }

        let batch = sampler.draw_batch(self.params.batch_size, state);
        trace!(
            "Tick drew {} samples ({} inside).",
            batch.drawn_count(),
            batch.inside_count()
        );
        renderer.plot_points(
            &batch.inside,
            &batch.outside,
            self.params.marker_size,
            self.params.opacity,
        )?;
        labels.update(
            state.total_points,
            state.points_inside,
            state.estimate,
            state.absolute_error,
            state.relative_error_percent,
        );

        Ok(Some(self.tick_delay()))
    }

    fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.params.tick_delay_ms)
    }
}
