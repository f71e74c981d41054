//! Terminal progress bar for tile completion.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use kiln_renderer::RenderProgress;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tiles ({eta}) {msg}";

/// Reports finished tiles on a progress bar drawn to stderr.
pub struct TileProgress {
    bar: ProgressBar,
}

impl TileProgress {
    pub fn new(total_tiles: usize) -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        let bar = ProgressBar::with_draw_target(
            Some(total_tiles as u64),
            ProgressDrawTarget::stderr_with_hz(5),
        )
        .with_style(style);
        Self { bar }
    }

    /// A bar that draws nothing, for quiet runs.
    pub fn hidden(total_tiles: usize) -> Self {
        Self {
            bar: ProgressBar::with_draw_target(Some(total_tiles as u64), ProgressDrawTarget::hidden()),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RenderProgress for TileProgress {
    fn tile_completed(&self, completed: usize, total: usize) {
        // Counts may arrive out of order from different workers
        self.bar.inc(1);
        if completed == total {
            self.bar.set_message("done");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_every_tile() {
        let progress = TileProgress::hidden(3);
        progress.tile_completed(2, 3);
        progress.tile_completed(1, 3);
        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bar.length(), Some(3));
        assert!(progress.bar.message().is_empty());
        progress.tile_completed(3, 3);
        assert_eq!(progress.bar.position(), 3);
        assert_eq!(progress.bar.message(), "done");
        progress.finish();
    }

    #[test]
    fn test_template_shows_message() {
        assert!(TEMPLATE.contains("{msg}"));
        assert!(ProgressStyle::with_template(TEMPLATE).is_ok());
    }
}
