use crate::state::SimulationState;
use anyhow::{Context, Result};
use estimator_common::{MetricsSnapshot, OutputConfig, Renderer};
use log::{info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default export location: the platform downloads directory, falling back
/// to `~/downloads` where the platform does not define one.
pub fn resolve_default_export_root() -> PathBuf {
    if let Some(dir) = dirs::download_dir() {
        return dir;
    }
    match dirs::home_dir() {
        Some(home) => home.join("downloads"),
        None => PathBuf::from("."),
    }
}

/// Writes the full result set under `dir`: the rendered view (`graph.png`),
/// the flat summary (`data.txt`), and the recorded metrics history per the
/// output configuration. Failures propagate to the caller; nothing here
/// touches the simulation state.
pub fn export_results(
    dir: &Path,
    state: &SimulationState,
    renderer: &mut dyn Renderer,
    history: &[MetricsSnapshot],
    output: &OutputConfig,
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory '{}'", dir.display()))?;

    renderer.export_image(&dir.join("graph.png"))?;
    write_data_file(&dir.join("data.txt"), state)?;

    if output.save_history {
        let format = output.format.as_deref().unwrap_or("json");
        save_history(dir, history, format)?;
    } else {
        info!("Skipping metrics history as per config (save_history is false).");
    }

    if output.save_history_csv {
        save_history_csv(&dir.join("metrics.csv"), history)?;
    }

    Ok(())
}

/// The flat human-readable summary, newline-separated throughout.
fn write_data_file(path: &Path, state: &SimulationState) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    writeln!(file, "Total Points: {}", state.total_points)?;
    writeln!(file, "Points Inside Circle: {}", state.points_inside)?;
    writeln!(file, "Pi Estimate: {}", state.estimate)?;
    writeln!(file, "Absolute Error: {:.6}", state.absolute_error)?;
    writeln!(file, "%Error: {:.6}%", state.relative_error_percent)?;
    info!("Summary saved to {}", path.display());
    Ok(())
}

fn save_history(dir: &Path, history: &[MetricsSnapshot], format: &str) -> Result<()> {
    match format {
        "bincode" => {
            let path = dir.join("history.bin");
            let file = File::create(&path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            bincode::serialize_into(file, history)
                .context("Failed to serialize metrics history to bincode")?;
            info!("Metrics history saved to {} (binary format)", path.display());
        }
        "messagepack" => {
            let path = dir.join("history.msgpack");
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            rmp_serde::encode::write(&mut file, &history)
                .context("Failed to serialize metrics history to MessagePack")?;
            info!("Metrics history saved to {} (MessagePack format)", path.display());
        }
        other => {
            if other != "json" {
                warn!("Unknown history format: {}. Using JSON instead.", other);
            }
            let path = dir.join("history.json");
            let file = File::create(&path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            serde_json::to_writer(file, history)
                .context("Failed to serialize metrics history to JSON")?;
            info!("Metrics history saved to {}", path.display());
        }
    }
    Ok(())
}

fn save_history_csv(path: &Path, history: &[MetricsSnapshot]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    writer.write_record([
        "tick",
        "total_points",
        "points_inside",
        "estimate",
        "absolute_error",
        "relative_error_percent",
    ])?;
    for snap in history {
        writer.write_record(&[
            snap.tick.to_string(),
            snap.total_points.to_string(),
            snap.points_inside.to_string(),
            format!("{:.6}", snap.estimate),
            format!("{:.6}", snap.absolute_error),
            format!("{:.6}", snap.relative_error_percent),
        ])?;
    }
    writer.flush()?;
    info!("Metrics history saved to {}", path.display());
    Ok(())
}
