use anyhow::Result;
use estimator_common::{EstimatorConfig, LabelDisplay, MetricsSnapshot, Renderer, UserPrompt};
use estimator_visualizer::ScatterRenderer;
use log::{debug, error, info, trace, warn};
use std::thread;
use std::time::{Duration, Instant};

// Define modules used by main
mod cadence;
mod export;
mod sampler;
mod state;

use cadence::CadenceController;
use sampler::Sampler;
use state::SimulationState;

/// Writes the metric labels to the log. Rate-limited so per-tick updates do
/// not flood the output the way a GUI label widget would absorb them.
struct LogLabels {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl LogLabels {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }
}

impl LabelDisplay for LogLabels {
    fn update(
        &mut self,
        total_points: u64,
        points_inside: u64,
        estimate: f64,
        absolute_error: f64,
        relative_error_percent: f64,
    ) {
        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.min_interval {
                return;
            }
        }
        self.last_emit = Some(now);
        info!(
            "Total Points: {} | Points Inside Circle: {} | Pi Estimate: {:.6} | Absolute Error: {:.6} | %Error: {:.6}",
            total_points, points_inside, estimate, absolute_error, relative_error_percent
        );
    }
}

/// Console-backed user prompt for the export flow.
struct ConsolePrompt;

impl UserPrompt for ConsolePrompt {
    fn ask_text(&mut self, title: &str, message: &str) -> Option<String> {
        println!("{}: {}", title, message);
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => None, // EOF
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                None
            }
        }
    }

    fn show_error(&mut self, title: &str, message: &str) {
        error!("{}: {}", title, message);
    }
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Pi Estimation Engine (Monte Carlo)...");

    // --- Load Configuration ---
    let config = EstimatorConfig::load_or_default("config.toml")?;
    let params = config.rate_parameters();
    info!(
        "Cadence: {} samples per tick, {} ms between ticks.",
        params.batch_size, params.tick_delay_ms
    );
    debug!("Configuration: {:#?}", config);

    // --- Wire Collaborators ---
    let mut state = SimulationState::new();
    let mut sampler = Sampler::new(config.sampling.seed)?;
    let mut renderer = ScatterRenderer::new(estimator_visualizer::DEFAULT_VIEW_SIZE_PX)?;
    renderer.initialize_view()?;
    let mut labels = LogLabels::new(Duration::from_secs(1));
    let mut controller = CadenceController::new(params);

    let target = config.sampling.target_total_points;
    let record_interval = u64::from(config.output.record_interval_ticks);
    let mut history: Vec<MetricsSnapshot> = Vec::new();
    let mut tick_index: u64 = 0;

    info!("Sampling until {} total points...", target);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    // --- Cadence Loop ---
    // The host loop plays the event loop's role: sleep for the delay the
    // controller hands back, then fire the next tick. A `None` delay means
    // the controller observed Idle and the chain stops.
    let mut next_delay = controller.start(&mut state, &mut sampler, &mut renderer, &mut labels)?;
    while let Some(delay) = next_delay {
        tick_index += 1;

        if tick_index % record_interval == 0 {
            history.push(state.snapshot(tick_index));
        }

        let now = Instant::now();
        if now.duration_since(previous_print_time).as_secs_f64() >= 5.0 {
            info!(
                "Tick {} | Points: {} | Estimate: {:.6} | Elapsed: {:.2} s",
                tick_index,
                state.total_points,
                state.estimate,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = now;
        } else {
            trace!("Tick {} completed.", tick_index);
        }

        if state.total_points >= target {
            info!("Target of {} points reached; pausing cadence.", target);
            controller.pause();
            debug!("Controller now {:?}.", controller.run_state());
        }

        if controller.is_running() {
            thread::sleep(delay);
        }
        next_delay = controller.tick(&mut state, &mut sampler, &mut renderer, &mut labels)?;
    }

    // Make sure the final metrics land in the history even when the run
    // stopped between record intervals.
    if history.last().map_or(true, |snap| snap.tick != tick_index) {
        history.push(state.snapshot(tick_index));
    }

    let total_duration = start_time.elapsed();
    info!(
        "Sampling finished in {:.3} seconds: {} points, estimate {:.6} (absolute error {:.6}).",
        total_duration.as_secs_f64(),
        state.total_points,
        state.estimate,
        state.absolute_error
    );

    // --- Export Results ---
    let mut prompt = ConsolePrompt;
    run_export_flow(&config, &state, &mut renderer, &history, &mut prompt);

    info!("Done.");
    Ok(())
}

/// The export boundary: a failure surfaces as a single user-visible error
/// message and leaves the accumulated state exactly as it was.
fn run_export_flow(
    config: &EstimatorConfig,
    state: &SimulationState,
    renderer: &mut dyn Renderer,
    history: &[MetricsSnapshot],
    prompt: &mut dyn UserPrompt,
) {
    let export_root = config
        .output
        .export_root
        .clone()
        .unwrap_or_else(export::resolve_default_export_root);
    let directory_name = config.output.directory_name.clone().or_else(|| {
        prompt.ask_text(
            "Directory Name",
            "Enter the name of the directory to save results:",
        )
    });
    let Some(directory_name) = directory_name else {
        info!("No directory name given; skipping export.");
        return;
    };

    let dir = export_root.join(directory_name);
    match export::export_results(&dir, state, renderer, history, &config.output) {
        Ok(()) => info!("Results saved to {}", dir.display()),
        Err(e) => prompt.show_error("Error Saving Results", &format!("{:#}", e)),
    }
}
