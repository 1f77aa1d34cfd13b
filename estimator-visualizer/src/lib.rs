use anyhow::{Context, Result};
use estimator_common::{MetricsSnapshot, Renderer, Sample};
use image::RgbImage;
use log::debug;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use std::f64::consts::PI;
use std::path::Path;

/// Default pixel size (square) of the rendered view.
pub const DEFAULT_VIEW_SIZE_PX: u32 = 600;

const CHART_MARGIN_PX: u32 = 10;

/// Scatter renderer backed by an in-memory RGB buffer. Plotted batches
/// accumulate in the buffer across ticks; only `clear_and_reinitialize`
/// starts over.
pub struct ScatterRenderer {
    width: u32,
    height: u32,
    buffer: Vec<u8>, // RGB, 3 bytes per pixel
}

impl ScatterRenderer {
    pub fn new(size_px: u32) -> Result<Self> {
        anyhow::ensure!(size_px > 0, "View size must be positive.");
        Ok(Self {
            width: size_px,
            height: size_px,
            buffer: vec![255u8; (size_px * size_px * 3) as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB pixels of the current view.
    pub fn pixels(&self) -> &[u8] {
        &self.buffer
    }

    /// White field, blue unit circle, black bounding square and axes over
    /// [-1, 1] x [-1, 1].
    fn draw_reference_geometry(&mut self) -> Result<()> {
        let (width, height) = (self.width, self.height);
        let root = BitMapBackend::with_buffer(&mut self.buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow::anyhow!("Failed to fill background: {}", e))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(CHART_MARGIN_PX)
            .build_cartesian_2d(-1.0..1.0, -1.0..1.0)
            .map_err(|e| anyhow::anyhow!("Failed to build chart: {}", e))?;

        // Axes through the origin
        chart
            .draw_series(LineSeries::new([(-1.0, 0.0), (1.0, 0.0)], &BLACK))
            .map_err(|e| anyhow::anyhow!("Failed to draw x axis: {}", e))?;
        chart
            .draw_series(LineSeries::new([(0.0, -1.0), (0.0, 1.0)], &BLACK))
            .map_err(|e| anyhow::anyhow!("Failed to draw y axis: {}", e))?;

        // Bounding square
        let square = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0)];
        chart
            .draw_series(LineSeries::new(square, BLACK.stroke_width(2)))
            .map_err(|e| anyhow::anyhow!("Failed to draw bounding square: {}", e))?;

        // Unit circle
        let circle = (0..=360).map(|deg| {
            let theta = f64::from(deg).to_radians();
            (theta.cos(), theta.sin())
        });
        chart
            .draw_series(LineSeries::new(circle, BLUE.stroke_width(2)))
            .map_err(|e| anyhow::anyhow!("Failed to draw unit circle: {}", e))?;

        root.present()
            .map_err(|e| anyhow::anyhow!("Failed to present view: {}", e))?;
        Ok(())
    }
}

impl Renderer for ScatterRenderer {
    fn initialize_view(&mut self) -> Result<()> {
        debug!("Initializing {}x{} view.", self.width, self.height);
        self.draw_reference_geometry()
    }

    fn plot_points(
        &mut self,
        inside: &[Sample],
        outside: &[Sample],
        marker_size: u32,
        opacity: f64,
    ) -> Result<()> {
        let (width, height) = (self.width, self.height);
        let root = BitMapBackend::with_buffer(&mut self.buffer, (width, height)).into_drawing_area();
        let mut chart = ChartBuilder::on(&root)
            .margin(CHART_MARGIN_PX)
            .build_cartesian_2d(-1.0..1.0, -1.0..1.0)
            .map_err(|e| anyhow::anyhow!("Failed to build chart: {}", e))?;

        // Green markers inside the disk, red outside.
        let inside_style = GREEN.mix(opacity).filled();
        chart
            .draw_series(
                inside
                    .iter()
                    .map(|s| Circle::new((s.x, s.y), marker_size as i32, inside_style)),
            )
            .map_err(|e| anyhow::anyhow!("Failed to plot inside points: {}", e))?;

        let outside_style = RED.mix(opacity).filled();
        chart
            .draw_series(
                outside
                    .iter()
                    .map(|s| Circle::new((s.x, s.y), marker_size as i32, outside_style)),
            )
            .map_err(|e| anyhow::anyhow!("Failed to plot outside points: {}", e))?;

        root.present()
            .map_err(|e| anyhow::anyhow!("Failed to present view: {}", e))?;
        Ok(())
    }

    fn clear_and_reinitialize(&mut self) -> Result<()> {
        debug!("Clearing plotted points.");
        self.draw_reference_geometry()
    }

    fn export_image(&mut self, path: &Path) -> Result<()> {
        let image = RgbImage::from_raw(self.width, self.height, self.buffer.clone())
            .context("Rendered buffer does not match the view dimensions")?;
        image
            .save(path)
            .with_context(|| format!("Failed to write image to '{}'", path.display()))?;
        Ok(())
    }
}

/// Renders an estimate-vs-samples convergence chart with a pi reference
/// line. Used by the standalone history visualizer.
pub fn render_convergence_chart(
    history: &[MetricsSnapshot],
    path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    anyhow::ensure!(!history.is_empty(), "Metrics history is empty; nothing to plot.");

    let max_points = history
        .iter()
        .map(|snap| snap.total_points)
        .max()
        .unwrap_or(1)
        .max(1) as f64;
    let mut y_min = PI;
    let mut y_max = PI;
    for snap in history {
        y_min = y_min.min(snap.estimate);
        y_max = y_max.max(snap.estimate);
    }
    // Breathing room around the series and the reference line.
    let pad = ((y_max - y_min) * 0.1).max(0.05);

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow::anyhow!("Failed to fill chart background: {}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0.0..max_points, (y_min - pad)..(y_max + pad))
        .map_err(|e| anyhow::anyhow!("Failed to build chart: {}", e))?;

    chart
        .draw_series(LineSeries::new([(0.0, PI), (max_points, PI)], &BLUE))
        .map_err(|e| anyhow::anyhow!("Failed to draw reference line: {}", e))?;
    chart
        .draw_series(LineSeries::new(
            history.iter().map(|snap| (snap.total_points as f64, snap.estimate)),
            GREEN.stroke_width(2),
        ))
        .map_err(|e| anyhow::anyhow!("Failed to draw estimate series: {}", e))?;

    root.present()
        .map_err(|e| anyhow::anyhow!("Failed to write chart to '{}': {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("estimator_vis_{}_{}", tag, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).unwrap();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn plotting_accumulates_and_clear_restores_the_baseline() {
        let mut renderer = ScatterRenderer::new(200).unwrap();
        renderer.initialize_view().unwrap();
        let baseline = renderer.pixels().to_vec();

        renderer
            .plot_points(&[Sample::new(0.0, 0.0)], &[], 5, 1.0)
            .unwrap();
        let plotted = renderer.pixels().to_vec();
        assert_ne!(plotted, baseline);

        // A second batch must overlay, not clear.
        renderer
            .plot_points(&[], &[Sample::new(0.9, 0.9)], 5, 1.0)
            .unwrap();
        assert_ne!(renderer.pixels(), baseline.as_slice());

        renderer.clear_and_reinitialize().unwrap();
        assert_eq!(renderer.pixels(), baseline.as_slice());
    }

    #[test]
    fn export_writes_a_png() {
        let dir = scratch_dir("export");
        let path = dir.join("graph.png");

        let mut renderer = ScatterRenderer::new(100).unwrap();
        renderer.initialize_view().unwrap();
        renderer.export_image(&path).unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn convergence_chart_renders_from_history() {
        let dir = scratch_dir("chart");
        let path = dir.join("convergence.png");

        let history = vec![
            MetricsSnapshot {
                tick: 1,
                total_points: 100,
                points_inside: 80,
                estimate: 3.2,
                absolute_error: 0.058_407,
                relative_error_percent: 1.859_163,
            },
            MetricsSnapshot {
                tick: 2,
                total_points: 200,
                points_inside: 156,
                estimate: 3.12,
                absolute_error: 0.021_593,
                relative_error_percent: 0.687_298,
            },
        ];
        render_convergence_chart(&history, &path, 400, 300).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn convergence_chart_rejects_empty_history() {
        let path = std::env::temp_dir().join("estimator_vis_unused.png");
        assert!(render_convergence_chart(&[], &path, 400, 300).is_err());
    }
}
