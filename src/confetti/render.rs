//! Render pipeline - adaptive quality and the per-instance draw pass
//!
//! While a parameter is being dragged, slow frames degrade to flat fills:
//!
//! | mode   | when                                   | fill     | highlights | edge pen  |
//! |--------|----------------------------------------|----------|------------|-----------|
//! | Full   | not interacting, or last frame ≤ 0.1 s | gradient | yes        | thickness |
//! | Fast   | interacting and last frame > 0.1 s     | flat     | no         | thickness |
//! | Faster | interacting and last frame > 0.5 s     | flat     | no         | 1 px      |
//!
//! Only full frames are timed, so the governor recovers as soon as the drag
//! ends.

use std::time::Duration;

use tiny_skia::Color;

use super::color::Fill;
use super::lighting::{Highlight, LightMetric};
use super::params::Params;
use crate::render::{with_alpha, Canvas, Paint};
use crate::shapes::Shape;

/// Frame time above which an interactive frame goes flat
pub const FAST_THRESHOLD: Duration = Duration::from_millis(100);
/// Frame time above which edges also drop to one pixel
pub const FASTER_THRESHOLD: Duration = Duration::from_millis(500);

/// Draw fidelity of one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Full,
    Fast,
    Faster,
}

impl RenderMode {
    /// Gradients and highlights are skipped
    pub fn is_fast(self) -> bool {
        self != RenderMode::Full
    }
}

/// Chooses the render mode from interaction state and past frame times
#[derive(Clone, Debug)]
pub struct QualityGovernor {
    interacting: bool,
    last_full_render: Duration,
}

impl Default for QualityGovernor {
    fn default() -> Self {
        Self {
            interacting: false,
            last_full_render: Duration::from_secs_f64(1.0 / 30.0),
        }
    }
}

impl QualityGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    pub fn set_interacting(&mut self, interacting: bool) {
        self.interacting = interacting;
    }

    /// Duration of the most recent full-fidelity frame
    pub fn last_full_render(&self) -> Duration {
        self.last_full_render
    }

    pub fn mode(&self) -> RenderMode {
        if !self.interacting || self.last_full_render <= FAST_THRESHOLD {
            RenderMode::Full
        } else if self.last_full_render <= FASTER_THRESHOLD {
            RenderMode::Fast
        } else {
            RenderMode::Faster
        }
    }

    /// Feed back the duration of a frame drawn in `mode`
    ///
    /// Degraded frames are ignored.
    pub fn record(&mut self, mode: RenderMode, elapsed: Duration) {
        if mode == RenderMode::Full {
            self.last_full_render = elapsed;
        }
    }
}

/// Everything the draw pass reads for one frame
///
/// All slices cover the active slots. `fills` and `highlights` are `None`
/// when they were not computed for this frame.
pub struct Frame<'a> {
    pub shapes: &'a [Shape],
    pub colors: &'a [Color],
    pub metrics: &'a [LightMetric],
    pub fills: Option<&'a [Fill]>,
    pub highlights: Option<&'a [Highlight]>,
    pub params: &'a Params,
    pub mode: RenderMode,
}

/// Draw every instance back to front
///
/// Per instance: shadow, fill, specular, edge, bevel.
pub fn draw_instances(canvas: &mut dyn Canvas, frame: &Frame<'_>) {
    let params = frame.params;
    let fast = frame.mode.is_fast();

    let flat_fill = fast || (params.min_opacity == 255 && params.gradient_opacity == 255);
    let fills = frame.fills.filter(|_| !flat_fill);
    let highlights = frame.highlights.filter(|_| !fast);

    let edge = match frame.mode {
        _ if params.edge_thickness <= 0.0 => 0.0,
        RenderMode::Faster => 1.0,
        _ => params.edge_thickness,
    };
    let flat_shadow = Paint::Solid(with_alpha(Color::BLACK, params.shadow_opacity));

    let instances = frame.shapes.iter().zip(frame.colors).zip(frame.metrics);
    for (i, ((shape, &color), metric)) in instances.enumerate() {
        if params.shadow_opacity > 0 {
            let shadow = match frame.fills.and_then(|f| f.get(i)).filter(|_| !fast) {
                Some(fill) => {
                    let alpha = params.shadow_opacity as u32 * fill.alpha as u32 / 255;
                    Paint::Solid(with_alpha(Color::BLACK, alpha as u8))
                }
                None => flat_shadow.clone(),
            };
            canvas.fill_translated(shape, metric.shadow.x, metric.shadow.y, &shadow);
        }

        match fills.and_then(|f| f.get(i)) {
            Some(fill) => canvas.fill(shape, &fill.paint),
            None => canvas.fill(shape, &Paint::Solid(with_alpha(color, 255))),
        }

        let highlight = highlights.and_then(|h| h.get(i));
        if let Some(h) = highlight.filter(|_| params.specular_brightness > 0) {
            canvas.fill(shape, &h.specular);
        }

        if edge > 0.0 {
            canvas.stroke(shape, edge, Color::BLACK);
        }

        if let Some(h) = highlight.filter(|_| params.bevel_thickness > 0.0) {
            canvas.fill_bevel(shape, params.bevel_thickness, &h.bevel);
        }
    }
}
