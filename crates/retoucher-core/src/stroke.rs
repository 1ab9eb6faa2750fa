//! Freehand draw and erase strokes.
//!
//! A stroke is a polyline with a brush width. Consecutive points are joined
//! by round-capped segments; since every segment ends in a half-disc the
//! joins come out round as well.
//!
//! Rendering goes through a per-stroke coverage mask: each pixel keeps the
//! highest coverage any segment gave it, and the visible result is always
//! recomposited from the buffer as it was when the stroke began. Overlapping
//! segments therefore never darken twice, and the live preview matches a
//! one-shot [`render_stroke`] of the same points.
//!
//! ## Compositing
//! - Draw: the brush color is laid over the pixel ("source-over").
//! - Erase: `alpha = alpha * (1 - coverage)`, color untouched
//!   ("destination-out").

use serde::{Deserialize, Serialize};

use crate::buffer::{clamp_channel, Rgba, CHANNELS};
use crate::PixelBuffer;

/// A pointer position in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// What a stroke does to the pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrushMode {
    /// Paint with the given color.
    Draw(Rgba),
    /// Cut the covered pixels' alpha.
    Erase,
}

/// One pointer-down to pointer-up gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    /// Brush diameter in pixels.
    pub width: u32,
    pub mode: BrushMode,
}

impl Stroke {
    pub fn new(mode: BrushMode, width: u32) -> Self {
        Self {
            points: Vec::new(),
            width,
            mode,
        }
    }

    /// History label for a committed stroke.
    pub fn label(&self) -> &'static str {
        match self.mode {
            BrushMode::Draw(_) => "Stroke Drawn",
            BrushMode::Erase => "Stroke Erased",
        }
    }

    /// True if the stroke has at least one segment.
    pub fn has_segments(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Pixel rectangle touched by a segment. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl DirtyRect {
    pub fn empty() -> Self {
        Self {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn union(&self, other: &DirtyRect) -> DirtyRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        DirtyRect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Highest brush coverage (0.0 to 1.0) reached by each pixel in this stroke.
#[derive(Debug, Clone)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    /// Coverage at (x, y); zero outside the mask.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.coverage[(y * self.width + x) as usize]
    }

    /// Rasterize a round-capped segment from `a` to `b`.
    ///
    /// Coverage falls off linearly over one pixel at the brush edge. Returns
    /// the clipped rectangle that was examined.
    pub fn add_segment(&mut self, a: Point, b: Point, brush_width: u32) -> DirtyRect {
        let radius = brush_width.max(1) as f32 / 2.0;
        let reach = radius + 1.0;

        let left = clip(a.x.min(b.x) - reach, self.width);
        let right = clip((a.x.max(b.x) + reach).ceil(), self.width);
        let top = clip(a.y.min(b.y) - reach, self.height);
        let bottom = clip((a.y.max(b.y) + reach).ceil(), self.height);

        let rect = DirtyRect {
            left,
            top,
            right,
            bottom,
        };
        if rect.is_empty() {
            return DirtyRect::empty();
        }

        for py in top..bottom {
            for px in left..right {
                let center = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                let dist = distance_to_segment(center, a, b);
                let cov = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if cov <= 0.0 {
                    continue;
                }
                let slot = &mut self.coverage[(py * self.width + px) as usize];
                if cov > *slot {
                    *slot = cov;
                }
            }
        }

        rect
    }
}

/// Clamp a coordinate into `0..=limit`, flooring it.
#[inline]
fn clip(v: f32, limit: u32) -> u32 {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        (v.floor() as u32).min(limit)
    }
}

/// Distance from `p` to the closest point of segment `a`-`b`.
fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let (apx, apy) = (p.x - a.x, p.y - a.y);
    let len_sq = abx * abx + aby * aby;

    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    };

    let (cx, cy) = (a.x + abx * t, a.y + aby * t);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Composite one pixel of the stroke over its base value.
#[inline]
fn composite_pixel(base: &[u8], coverage: f32, mode: BrushMode) -> Rgba {
    let base_px = [base[0], base[1], base[2], base[3]];
    if coverage <= 0.0 {
        return base_px;
    }
    let coverage = coverage as f64;

    match mode {
        BrushMode::Erase => {
            let alpha = base[3] as f64 * (1.0 - coverage);
            [base[0], base[1], base[2], clamp_channel(alpha)]
        }
        BrushMode::Draw(color) => {
            let src_a = coverage * color[3] as f64 / 255.0;
            let dst_a = base[3] as f64 / 255.0;
            let out_a = src_a + dst_a * (1.0 - src_a);
            if out_a <= 0.0 {
                return base_px;
            }
            let mut out = [0u8; 4];
            for c in 0..3 {
                let v = (color[c] as f64 * src_a + base[c] as f64 * dst_a * (1.0 - src_a)) / out_a;
                out[c] = clamp_channel(v);
            }
            out[3] = clamp_channel(out_a * 255.0);
            out
        }
    }
}

/// Recomposite `rect` of `target` from `base` and the stroke's mask.
pub fn composite(
    base: &PixelBuffer,
    mask: &CoverageMask,
    mode: BrushMode,
    target: &mut PixelBuffer,
    rect: DirtyRect,
) {
    debug_assert!(base.same_dimensions(target));
    let width = base.width() as usize;
    let src = base.samples();
    let dst = target.samples_mut();

    for y in rect.top..rect.bottom.min(base.height()) {
        for x in rect.left..rect.right.min(base.width()) {
            let idx = (y as usize * width + x as usize) * CHANNELS;
            let px = composite_pixel(&src[idx..idx + CHANNELS], mask.get(x, y), mode);
            dst[idx..idx + CHANNELS].copy_from_slice(&px);
        }
    }
}

/// Render a complete stroke onto a copy of `base`.
pub fn render_stroke(base: &PixelBuffer, stroke: &Stroke) -> PixelBuffer {
    let mut mask = CoverageMask::new(base.width(), base.height());
    let mut dirty = DirtyRect::empty();
    for pair in stroke.points.windows(2) {
        dirty = dirty.union(&mask.add_segment(pair[0], pair[1], stroke.width));
    }

    let mut out = base.clone();
    composite(base, &mask, stroke.mode, &mut out, dirty);
    out
}

/// Incremental renderer for a stroke in progress.
///
/// Holds the buffer as it was at pointer-down; each new point rasterizes one
/// more segment and recomposites only the area it touched.
#[derive(Debug, Clone)]
pub struct StrokeRenderer {
    base: PixelBuffer,
    mask: CoverageMask,
    stroke: Stroke,
}

impl StrokeRenderer {
    /// Start a stroke at `start` over `base`.
    pub fn begin(base: PixelBuffer, mode: BrushMode, width: u32, start: Point) -> Self {
        let mask = CoverageMask::new(base.width(), base.height());
        let mut stroke = Stroke::new(mode, width);
        stroke.points.push(start);
        Self { base, mask, stroke }
    }

    /// Extend the stroke to `point`, updating `working` in place.
    pub fn extend(&mut self, point: Point, working: &mut PixelBuffer) -> DirtyRect {
        let Some(&last) = self.stroke.points.last() else {
            self.stroke.points.push(point);
            return DirtyRect::empty();
        };
        self.stroke.points.push(point);

        let rect = self.mask.add_segment(last, point, self.stroke.width);
        if !rect.is_empty() {
            composite(&self.base, &self.mask, self.stroke.mode, working, rect);
        }
        rect
    }

    /// Finish the stroke, returning its recorded points.
    pub fn finish(self) -> Stroke {
        self.stroke
    }
}
