use crate::sample::Sample;
use anyhow::Result;
use std::path::Path;

/// Rendering collaborator. The engine never draws directly; it hands the
/// per-tick coordinate lists to an implementation of this trait.
pub trait Renderer {
    /// Draws the fixed reference geometry: the unit circle, its bounding
    /// square and the axes, scaled to [-1, 1] x [-1, 1].
    fn initialize_view(&mut self) -> Result<()>;

    /// Overlays one batch of classified samples on the current view without
    /// clearing previously plotted points.
    fn plot_points(
        &mut self,
        inside: &[Sample],
        outside: &[Sample],
        marker_size: u32,
        opacity: f64,
    ) -> Result<()>;

    /// Discards all plotted points and redraws the reference geometry.
    /// Used by Reset.
    fn clear_and_reinitialize(&mut self) -> Result<()>;

    /// Writes the current view to an image file.
    fn export_image(&mut self, path: &Path) -> Result<()>;
}

/// Metric labels collaborator. Implementations format floats to 6 decimal
/// places where applicable.
pub trait LabelDisplay {
    fn update(
        &mut self,
        total_points: u64,
        points_inside: u64,
        estimate: f64,
        absolute_error: f64,
        relative_error_percent: f64,
    );
}

/// User interaction collaborator for the export flow.
pub trait UserPrompt {
    /// Asks the user for a line of text. `None` means the user declined.
    fn ask_text(&mut self, title: &str, message: &str) -> Option<String>;

    /// Surfaces an error message to the user.
    fn show_error(&mut self, title: &str, message: &str);
}
