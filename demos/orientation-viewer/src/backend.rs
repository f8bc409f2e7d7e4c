//! A render backend that logs instead of drawing.

use input_pipeline::{RenderBackend, RotationOutput, TransformSnapshot};
use tracing::info;

/// Logs every `log_every`-th frame it is asked to draw.
#[derive(Debug)]
pub struct LoggingBackend {
    output: RotationOutput,
    log_every: u64,
    frames: u64,
}

impl LoggingBackend {
    pub fn new(output: RotationOutput, log_every: u64) -> Self {
        Self {
            output,
            log_every: log_every.max(1),
            frames: 0,
        }
    }

    /// Frames drawn so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderBackend for LoggingBackend {
    fn init(&mut self, width: u32, height: u32) {
        info!(width, height, output = ?self.output, "surface ready");
    }

    fn step(&mut self, snapshot: &TransformSnapshot) {
        self.frames += 1;
        if self.frames % self.log_every != 0 {
            return;
        }

        let [yaw, pitch, roll] = snapshot.euler().to_degrees();
        let model = snapshot.model_matrix(self.output);
        info!(
            revision = snapshot.revision,
            yaw = format_args!("{yaw:7.2}"),
            pitch = format_args!("{pitch:7.2}"),
            roll = format_args!("{roll:7.2}"),
            scale = format_args!("{:.3}", snapshot.scale),
            pan = format_args!("({:.1}, {:.1})", snapshot.pan.dx, snapshot.pan.dy),
            model_det = format_args!("{:.3}", model.determinant()),
            "frame"
        );
    }
}
