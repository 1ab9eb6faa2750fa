//! The editing session: committed source, live preview and undo.
//!
//! ```text
//!   Empty --load--> Loaded --preview--> PreviewDirty --commit--> Loaded
//!                     |  ^                   |
//!          begin_stroke  end_stroke          | begin_stroke (commits first)
//!                     v  |                   v
//!                    Drawing <---------------+
//! ```
//!
//! `source` is the last committed image and always matches the cursor entry
//! in [`History`]. `working` is what the user sees. The two only differ while
//! a slider preview is pending or a stroke is in progress, and they always
//! have the same dimensions.
//!
//! Previews are recomputed from `source` every time, so dragging a slider
//! back and forth never compounds. One-shot tools (grayscale, edges, color
//! filter, rotate) drop any pending preview and commit straight away.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjustments::{apply_intensity, intensity_from_percent, IntensityTool};
use crate::buffer::BufferError;
use crate::decode::{decode_image, DecodeError};
use crate::encode::{encode_png, EncodeError};
use crate::filters::{apply_random_color_filter, detect_edges, grayscale, ColorPreset};
use crate::gallery::GalleryError;
use crate::history::{system_clock, ActivityLog, Clock, History, HistoryError, UNDO_LABEL};
use crate::settings::{Color, EditorSettings, SettingsError};
use crate::stroke::{BrushMode, DirtyRect, Point, StrokeRenderer};
use crate::transform::{rotate, TransformError};
use crate::PixelBuffer;

/// History label for a freshly loaded image.
pub const LOADED_LABEL: &str = "Loaded";

const DEFAULT_SEED: u64 = 0x5EED_1234_ABCD_0001;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("No image loaded")]
    NoActiveImage,

    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

/// A toolbar tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Brightness,
    Contrast,
    Blur,
    Sharpen,
    Grayscale,
    EdgeDetection,
    #[serde(rename = "filter")]
    ColorFilter,
    Rotate,
    Draw,
    Erase,
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Brightness,
        ToolKind::Contrast,
        ToolKind::Blur,
        ToolKind::Sharpen,
        ToolKind::Grayscale,
        ToolKind::EdgeDetection,
        ToolKind::ColorFilter,
        ToolKind::Rotate,
        ToolKind::Draw,
        ToolKind::Erase,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Brightness => "brightness",
            ToolKind::Contrast => "contrast",
            ToolKind::Blur => "blur",
            ToolKind::Sharpen => "sharpen",
            ToolKind::Grayscale => "grayscale",
            ToolKind::EdgeDetection => "edge-detection",
            ToolKind::ColorFilter => "filter",
            ToolKind::Rotate => "rotate",
            ToolKind::Draw => "draw",
            ToolKind::Erase => "erase",
        }
    }

    /// The slider tool behind this toolbar entry, if any.
    pub fn intensity_tool(self) -> Option<IntensityTool> {
        match self {
            ToolKind::Brightness => Some(IntensityTool::Brightness),
            ToolKind::Contrast => Some(IntensityTool::Contrast),
            ToolKind::Blur => Some(IntensityTool::Blur),
            ToolKind::Sharpen => Some(IntensityTool::Sharpen),
            _ => None,
        }
    }

    /// The immediate action behind this toolbar entry, if any.
    ///
    /// The rotate button turns by 90 degrees clockwise.
    pub fn one_shot(self) -> Option<OneShot> {
        match self {
            ToolKind::Grayscale => Some(OneShot::Grayscale),
            ToolKind::EdgeDetection => Some(OneShot::EdgeDetection),
            ToolKind::ColorFilter => Some(OneShot::ColorFilter),
            ToolKind::Rotate => Some(OneShot::Rotate(90)),
            _ => None,
        }
    }

    pub fn is_brush(self) -> bool {
        matches!(self, ToolKind::Draw | ToolKind::Erase)
    }
}

impl From<IntensityTool> for ToolKind {
    fn from(tool: IntensityTool) -> Self {
        match tool {
            IntensityTool::Brightness => ToolKind::Brightness,
            IntensityTool::Contrast => ToolKind::Contrast,
            IntensityTool::Blur => ToolKind::Blur,
            IntensityTool::Sharpen => ToolKind::Sharpen,
        }
    }
}

impl FromStr for ToolKind {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| EditError::UnknownTool(s.to_string()))
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transforms that commit immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OneShot {
    Grayscale,
    EdgeDetection,
    /// Random preset.
    ColorFilter,
    /// Quarter-turn rotation in degrees, clockwise positive.
    Rotate(i32),
}

impl OneShot {
    pub fn label(self) -> &'static str {
        match self {
            OneShot::Grayscale => "Grayscale Applied",
            OneShot::EdgeDetection => "Edge Detection Applied",
            OneShot::ColorFilter => "Filter Applied",
            OneShot::Rotate(_) => "Image Rotated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Empty,
    Loaded,
    PreviewDirty,
    Drawing,
}

/// Input to [`EditSession::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Decode and open an uploaded file.
    LoadImage(Vec<u8>),
    /// Open an already decoded image (e.g. from the gallery).
    LoadFromGallery(PixelBuffer),
    SelectTool(ToolKind),
    /// Move the slider of the active intensity tool (0-100).
    SetIntensity(u8),
    Preview { tool: IntensityTool, intensity: f32 },
    ApplyOneShot(OneShot),
    /// Commit a pending preview.
    Commit,
    BeginStroke(Point),
    StrokePoint(Point),
    EndStroke,
    SetBrushColor(Color),
    SetDrawSize(u32),
    SetEraseSize(u32),
    Undo,
    Export,
}

/// What a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing changed.
    Unchanged,
    /// A new image is open.
    Loaded,
    /// `working` now shows an uncommitted preview.
    Previewed,
    /// `source` advanced and a history entry was pushed.
    Committed { label: &'static str },
    /// A random color filter was committed with this preset.
    Filtered(ColorPreset),
    /// Part of `working` was repainted by the stroke in progress.
    StrokeUpdated(DirtyRect),
    /// A stroke started.
    StrokeStarted,
    /// `source` and `working` were restored from history.
    Undone,
    /// Uncommitted work was dropped without moving through history.
    Discarded,
    /// A setting changed.
    SettingChanged,
    /// PNG bytes of `working`.
    Exported(Vec<u8>),
}

#[derive(Debug, Clone)]
struct Canvas {
    source: PixelBuffer,
    working: PixelBuffer,
}

impl Canvas {
    fn new(image: PixelBuffer) -> Self {
        Self {
            working: image.clone(),
            source: image,
        }
    }

    /// Make `image` both the committed and the visible state.
    fn replace(&mut self, image: PixelBuffer) {
        self.working = image.clone();
        self.source = image;
    }

    fn reset_working(&mut self) {
        self.working.clone_from(&self.source);
    }
}

/// One image editing session.
#[derive(Debug)]
pub struct EditSession {
    canvas: Option<Canvas>,
    active_tool: Option<ToolKind>,
    intensity: f32,
    /// Tool whose preview is currently in `working`.
    pending: Option<IntensityTool>,
    stroke: Option<StrokeRenderer>,
    history: History,
    activity: ActivityLog,
    settings: EditorSettings,
    rng: SmallRng,
    clock: Clock,
}

impl EditSession {
    /// Create an empty session.
    ///
    /// The color filter RNG starts from a fixed seed; hosts that want
    /// different picks per run call [`EditSession::with_seed`].
    pub fn new(settings: EditorSettings) -> Result<Self, EditError> {
        settings.validate()?;
        Ok(Self {
            canvas: None,
            active_tool: None,
            intensity: intensity_from_percent(settings.default_intensity),
            pending: None,
            stroke: None,
            history: History::new(settings.history_capacity),
            activity: ActivityLog::new(settings.history_display_limit),
            settings,
            rng: SmallRng::seed_from_u64(DEFAULT_SEED),
            clock: system_clock,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> SessionState {
        if self.canvas.is_none() {
            SessionState::Empty
        } else if self.stroke.is_some() {
            SessionState::Drawing
        } else if self.pending.is_some() {
            SessionState::PreviewDirty
        } else {
            SessionState::Loaded
        }
    }

    pub fn source(&self) -> Option<&PixelBuffer> {
        self.canvas.as_ref().map(|c| &c.source)
    }

    pub fn working(&self) -> Option<&PixelBuffer> {
        self.canvas.as_ref().map(|c| &c.working)
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.active_tool
    }

    /// Current slider intensity, `0.0..=1.0`.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Run one command.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, EditError> {
        match command {
            Command::LoadImage(bytes) => self.load_image(&bytes),
            Command::LoadFromGallery(image) => self.load_buffer(image),
            Command::SelectTool(tool) => self.select_tool(tool),
            Command::SetIntensity(percent) => self.set_intensity(percent),
            Command::Preview { tool, intensity } => self.preview(tool, intensity),
            Command::ApplyOneShot(op) => self.apply_one_shot(op),
            Command::Commit => self.commit(),
            Command::BeginStroke(point) => self.begin_stroke(point),
            Command::StrokePoint(point) => self.stroke_point(point),
            Command::EndStroke => self.end_stroke(),
            Command::SetBrushColor(color) => {
                self.set_brush_color(color);
                Ok(Outcome::SettingChanged)
            }
            Command::SetDrawSize(size) => {
                self.set_draw_size(size);
                Ok(Outcome::SettingChanged)
            }
            Command::SetEraseSize(size) => {
                self.set_erase_size(size);
                Ok(Outcome::SettingChanged)
            }
            Command::Undo => self.undo(),
            Command::Export => self.export().map(Outcome::Exported),
        }
    }

    // ===== Loading =====

    /// Decode `bytes` and start over with the result.
    ///
    /// On a decode failure the current session is left untouched.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<Outcome, EditError> {
        let image = decode_image(bytes)?;
        self.load_buffer(image)
    }

    /// Start over from raw RGBA samples.
    pub fn load_pixels(&mut self, width: u32, height: u32, samples: Vec<u8>) -> Result<Outcome, EditError> {
        let image = PixelBuffer::from_raw(width, height, samples)?;
        self.load_buffer(image)
    }

    /// Start over with `image`: history is reset to a single "Loaded" entry.
    pub fn load_buffer(&mut self, image: PixelBuffer) -> Result<Outcome, EditError> {
        if image.is_empty() {
            let (width, height) = image.dimensions();
            return Err(DecodeError::EmptyImage { width, height }.into());
        }

        let mut history = History::new(self.settings.history_capacity);
        history.push(&image, LOADED_LABEL, (self.clock)())?;

        log::info!("Loaded {}x{} image", image.width(), image.height());
        self.history = history;
        self.canvas = Some(Canvas::new(image));
        self.pending = None;
        self.stroke = None;
        Ok(Outcome::Loaded)
    }

    // ===== Tools =====

    /// Make `tool` active.
    ///
    /// Intensity tools reset the slider to the default and preview at once.
    /// One-shot tools apply immediately. Brush tools only arm the pointer.
    pub fn select_tool(&mut self, tool: ToolKind) -> Result<Outcome, EditError> {
        self.active_tool = Some(tool);

        if let Some(intensity_tool) = tool.intensity_tool() {
            self.intensity = intensity_from_percent(self.settings.default_intensity);
            if self.canvas.is_none() {
                return Ok(Outcome::Unchanged);
            }
            return self.preview(intensity_tool, self.intensity);
        }

        if let Some(op) = tool.one_shot() {
            return self.apply_one_shot(op);
        }

        Ok(Outcome::Unchanged)
    }

    /// Slider moved: re-preview the active intensity tool.
    pub fn set_intensity(&mut self, percent: u8) -> Result<Outcome, EditError> {
        self.intensity = intensity_from_percent(percent);
        match self.active_tool.and_then(ToolKind::intensity_tool) {
            Some(tool) => self.preview(tool, self.intensity),
            None => Ok(Outcome::Unchanged),
        }
    }

    /// Show `tool` at `intensity` in `working` without committing.
    pub fn preview(&mut self, tool: IntensityTool, intensity: f32) -> Result<Outcome, EditError> {
        self.cancel_stroke();
        let canvas = self.canvas_mut()?;
        canvas.working = apply_intensity(&canvas.source, tool, intensity);
        log::debug!("Preview {} at {:.2}", tool.display_name(), intensity);

        self.active_tool = Some(tool.into());
        self.intensity = intensity.clamp(0.0, 1.0);
        self.pending = Some(tool);
        Ok(Outcome::Previewed)
    }

    /// Commit the pending preview, if there is one.
    pub fn commit(&mut self) -> Result<Outcome, EditError> {
        if self.canvas.is_none() {
            return Err(EditError::NoActiveImage);
        }
        let Some(tool) = self.pending else {
            return Ok(Outcome::Unchanged);
        };

        let working = self.canvas_mut()?.working.clone();
        self.commit_working(working, tool.commit_label())?;
        Ok(Outcome::Committed {
            label: tool.commit_label(),
        })
    }

    /// Apply a one-shot transform to `source` and commit it.
    pub fn apply_one_shot(&mut self, op: OneShot) -> Result<Outcome, EditError> {
        self.cancel_stroke();
        let Some(canvas) = self.canvas.as_ref() else {
            log::warn!("{} ignored: no image loaded", op.label());
            return Err(EditError::NoActiveImage);
        };
        let source = &canvas.source;

        let mut preset = None;
        let result = match op {
            OneShot::Grayscale => grayscale(source),
            OneShot::EdgeDetection => detect_edges(source),
            OneShot::ColorFilter => {
                let (out, chosen) = apply_random_color_filter(source, &mut self.rng);
                log::debug!("Color filter preset: {}", chosen.name());
                preset = Some(chosen);
                out
            }
            OneShot::Rotate(degrees) => rotate(source, degrees)?,
        };

        self.commit_working(result, op.label())?;
        Ok(match preset {
            Some(preset) => Outcome::Filtered(preset),
            None => Outcome::Committed { label: op.label() },
        })
    }

    // ===== Strokes =====

    /// Start a stroke with the active brush tool.
    ///
    /// Does nothing unless Draw or Erase is active. A pending preview is
    /// committed first so the stroke lands on top of it.
    pub fn begin_stroke(&mut self, point: Point) -> Result<Outcome, EditError> {
        if self.canvas.is_none() {
            return Err(EditError::NoActiveImage);
        }
        let mode = match self.active_tool {
            Some(ToolKind::Draw) => BrushMode::Draw(self.settings.brush_color.rgba()),
            Some(ToolKind::Erase) => BrushMode::Erase,
            _ => return Ok(Outcome::Unchanged),
        };

        if self.stroke.is_some() {
            self.end_stroke()?;
        }
        if self.pending.is_some() {
            self.commit()?;
        }

        let width = match mode {
            BrushMode::Draw(_) => self.settings.draw_size,
            BrushMode::Erase => self.settings.erase_size,
        };
        let base = self.canvas_mut()?.source.clone();
        self.stroke = Some(StrokeRenderer::begin(base, mode, width, point));
        Ok(Outcome::StrokeStarted)
    }

    /// Extend the stroke in progress. Ignored when not drawing.
    pub fn stroke_point(&mut self, point: Point) -> Result<Outcome, EditError> {
        let (Some(renderer), Some(canvas)) = (self.stroke.as_mut(), self.canvas.as_mut()) else {
            return Ok(Outcome::Unchanged);
        };
        let rect = renderer.extend(point, &mut canvas.working);
        Ok(Outcome::StrokeUpdated(rect))
    }

    /// Finish the stroke and commit it. A stroke without movement leaves
    /// no trace.
    pub fn end_stroke(&mut self) -> Result<Outcome, EditError> {
        let Some(renderer) = self.stroke.take() else {
            return Ok(Outcome::Unchanged);
        };
        let stroke = renderer.finish();
        if !stroke.has_segments() {
            return Ok(Outcome::Unchanged);
        }

        let label = stroke.label();
        let working = self.canvas_mut()?.working.clone();
        self.commit_working(working, label)?;
        Ok(Outcome::Committed { label })
    }

    // ===== Brush settings =====

    /// Applies from the next stroke on.
    pub fn set_brush_color(&mut self, color: Color) {
        self.settings.brush_color = color;
    }

    /// Returns the size after clamping into range.
    pub fn set_draw_size(&mut self, size: u32) -> u32 {
        self.settings.set_draw_size(size)
    }

    /// Returns the size after clamping into range.
    pub fn set_erase_size(&mut self, size: u32) -> u32 {
        self.settings.set_erase_size(size)
    }

    // ===== Undo / export =====

    /// Undo.
    ///
    /// Uncommitted work (a preview or a stroke in progress) is dropped on
    /// its own, leaving history where it is. Otherwise the session steps
    /// back one history entry.
    pub fn undo(&mut self) -> Result<Outcome, EditError> {
        let Some(canvas) = self.canvas.as_mut() else {
            log::warn!("Undo ignored: no image loaded");
            return Ok(Outcome::Unchanged);
        };

        let had_uncommitted = self.pending.take().is_some() | self.stroke.take().is_some();
        if had_uncommitted {
            canvas.reset_working();
            log::debug!("Undo discarded uncommitted work");
            return Ok(Outcome::Discarded);
        }

        match self.history.undo()? {
            Some(restored) => {
                canvas.replace(restored);
                self.activity.record(UNDO_LABEL, (self.clock)());
                log::info!(
                    "Undo to entry {}",
                    self.history.current_index().unwrap_or_default()
                );
                Ok(Outcome::Undone)
            }
            None => Ok(Outcome::Unchanged),
        }
    }

    /// PNG bytes of what is currently shown.
    pub fn export(&self) -> Result<Vec<u8>, EditError> {
        let canvas = self.canvas.as_ref().ok_or(EditError::NoActiveImage)?;
        let png = encode_png(&canvas.working)?;
        log::info!("Exported {} bytes", png.len());
        Ok(png)
    }

    // ===== Internals =====

    fn canvas_mut(&mut self) -> Result<&mut Canvas, EditError> {
        self.canvas.as_mut().ok_or_else(|| {
            log::warn!("Tool ignored: no image loaded");
            EditError::NoActiveImage
        })
    }

    /// Drop a stroke in progress, restoring `working` from `source`.
    fn cancel_stroke(&mut self) {
        if self.stroke.take().is_some() {
            if let Some(canvas) = self.canvas.as_mut() {
                canvas.reset_working();
            }
        }
    }

    /// Make `image` the new committed state and record it.
    fn commit_working(&mut self, image: PixelBuffer, label: &str) -> Result<(), EditError> {
        let timestamp = (self.clock)();
        self.history.push(&image, label, timestamp)?;
        self.activity.record(label, timestamp);

        let canvas = self.canvas_mut()?;
        canvas.replace(image);
        self.pending = None;
        log::debug!("Committed '{}' (history {})", label, self.history.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::apply_color_filter;
    use crate::history::icon_for_label;

    fn fixed_clock() -> u64 {
        1_700_000_000_000
    }

    fn session() -> EditSession {
        EditSession::new(EditorSettings::default())
            .unwrap()
            .with_seed(42)
            .with_clock(fixed_clock)
    }

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let v = ((x * 31 + y * 17) % 256) as u8;
                buf.set(x, y, [v, 255 - v, v / 2, 255]).unwrap();
            }
        }
        buf
    }

    fn loaded(image: PixelBuffer) -> EditSession {
        let mut s = session();
        s.load_buffer(image).unwrap();
        s
    }

    fn assert_in_sync(s: &EditSession) {
        assert_eq!(s.source(), s.working());
        let restored = s.history().current().unwrap().restore().unwrap();
        assert_eq!(Some(&restored), s.source());
    }

    #[test]
    fn test_new_session_is_empty() {
        let s = session();
        assert_eq!(s.state(), SessionState::Empty);
        assert!(s.source().is_none());
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = EditorSettings::default();
        settings.draw_size = 0;
        assert!(matches!(
            EditSession::new(settings),
            Err(EditError::Settings(SettingsError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_load_seeds_history() {
        let s = loaded(gradient(4, 3));
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history().current().unwrap().label, LOADED_LABEL);
        assert_in_sync(&s);
    }

    #[test]
    fn test_load_png_bytes() {
        let png = encode_png(&gradient(5, 2)).unwrap();
        let mut s = session();
        assert_eq!(s.execute(Command::LoadImage(png)).unwrap(), Outcome::Loaded);
        assert_eq!(s.source(), Some(&gradient(5, 2)));
    }

    #[test]
    fn test_bad_upload_leaves_session_untouched() {
        let mut s = loaded(gradient(4, 4));
        s.preview(IntensityTool::Brightness, 0.9).unwrap();
        let working_before = s.working().cloned();

        let err = s.execute(Command::LoadImage(vec![1, 2, 3, 4])).unwrap_err();
        assert!(matches!(err, EditError::Decode(_)));
        assert_eq!(s.state(), SessionState::PreviewDirty);
        assert_eq!(s.working().cloned(), working_before);
        assert_eq!(s.source(), Some(&gradient(4, 4)));
    }

    #[test]
    fn test_load_pixels_validates_length() {
        let mut s = session();
        assert!(matches!(
            s.load_pixels(2, 2, vec![0; 3]),
            Err(EditError::Buffer(BufferError::SizeMismatch { .. }))
        ));
        assert_eq!(s.state(), SessionState::Empty);
        s.load_pixels(1, 1, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(s.state(), SessionState::Loaded);
    }

    #[test]
    fn test_tools_without_image() {
        let mut s = session();
        assert!(matches!(
            s.apply_one_shot(OneShot::Grayscale),
            Err(EditError::NoActiveImage)
        ));
        assert!(matches!(s.export(), Err(EditError::NoActiveImage)));
        assert!(matches!(
            s.preview(IntensityTool::Blur, 0.5),
            Err(EditError::NoActiveImage)
        ));
        // Undo is a silent no-op
        assert_eq!(s.undo().unwrap(), Outcome::Unchanged);
        // Selecting a slider tool just arms it
        assert_eq!(s.select_tool(ToolKind::Contrast).unwrap(), Outcome::Unchanged);
        assert_eq!(s.active_tool(), Some(ToolKind::Contrast));
    }

    #[test]
    fn test_select_intensity_tool_previews_at_default() {
        let image = gradient(6, 6);
        let mut s = loaded(image.clone());
        assert_eq!(s.select_tool(ToolKind::Brightness).unwrap(), Outcome::Previewed);
        assert_eq!(s.state(), SessionState::PreviewDirty);
        assert_eq!(s.intensity(), 0.5);
        // Brightness at 0.5 is an offset of zero
        assert_eq!(s.working(), Some(&image));
        assert_eq!(s.source(), Some(&image));
    }

    #[test]
    fn test_preview_recomputes_from_source() {
        let image = gradient(8, 8);
        let mut s = loaded(image.clone());
        s.select_tool(ToolKind::Brightness).unwrap();

        s.set_intensity(90).unwrap();
        s.set_intensity(10).unwrap();
        s.set_intensity(90).unwrap();

        let expected = apply_intensity(&image, IntensityTool::Brightness, 0.9);
        assert_eq!(s.working(), Some(&expected));
        assert_eq!(s.source(), Some(&image));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_commit_preview() {
        let image = gradient(5, 5);
        let mut s = loaded(image.clone());
        s.select_tool(ToolKind::Contrast).unwrap();
        s.set_intensity(80).unwrap();

        let outcome = s.execute(Command::Commit).unwrap();
        assert_eq!(
            outcome,
            Outcome::Committed {
                label: "Contrast Adjusted"
            }
        );
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(
            s.source(),
            Some(&apply_intensity(&image, IntensityTool::Contrast, 0.8))
        );
        assert_eq!(s.history().len(), 2);
        assert_in_sync(&s);

        // Nothing pending any more
        assert_eq!(s.commit().unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn test_one_shot_discards_preview() {
        let image = gradient(5, 5);
        let mut s = loaded(image.clone());
        s.preview(IntensityTool::Sharpen, 1.0).unwrap();

        s.execute(Command::ApplyOneShot(OneShot::Grayscale)).unwrap();
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.source(), Some(&grayscale(&image)));
        assert_eq!(s.history().current().unwrap().label, "Grayscale Applied");
        assert_in_sync(&s);
    }

    #[test]
    fn test_select_one_shot_tool_applies() {
        let image = gradient(5, 5);
        let mut s = loaded(image.clone());
        s.select_tool(ToolKind::EdgeDetection).unwrap();
        assert_eq!(s.source(), Some(&detect_edges(&image)));
        assert_eq!(
            s.activity().entries().next().map(|e| e.icon),
            Some("fas fa-border-all")
        );
    }

    #[test]
    fn test_rotate_updates_source_and_working() {
        let mut s = loaded(gradient(4, 2));
        s.select_tool(ToolKind::Rotate).unwrap();
        assert_eq!(s.source().unwrap().dimensions(), (2, 4));
        assert_eq!(s.history().current().unwrap().label, "Image Rotated");
        assert_in_sync(&s);
    }

    #[test]
    fn test_rotate_rejects_odd_angle() {
        let mut s = loaded(gradient(4, 2));
        let err = s.apply_one_shot(OneShot::Rotate(45)).unwrap_err();
        assert!(matches!(
            err,
            EditError::Transform(TransformError::UnsupportedAngle(45))
        ));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_color_filter_is_seeded() {
        let image = gradient(4, 4);
        let mut a = loaded(image.clone());
        let mut b = loaded(image.clone());

        let Outcome::Filtered(preset) = a.apply_one_shot(OneShot::ColorFilter).unwrap() else {
            panic!("expected a filter outcome");
        };
        assert_eq!(
            b.apply_one_shot(OneShot::ColorFilter).unwrap(),
            Outcome::Filtered(preset)
        );
        assert_eq!(a.source(), Some(&apply_color_filter(&image, preset)));
        assert_eq!(a.history().current().unwrap().label, "Filter Applied");
    }

    #[test]
    fn test_undo_restores_previous() {
        let image = gradient(6, 4);
        let mut s = loaded(image.clone());
        s.apply_one_shot(OneShot::Grayscale).unwrap();
        s.apply_one_shot(OneShot::Rotate(-90)).unwrap();

        assert_eq!(s.execute(Command::Undo).unwrap(), Outcome::Undone);
        assert_eq!(s.source(), Some(&grayscale(&image)));
        assert_eq!(s.history().current_index(), Some(1));
        assert_in_sync(&s);

        assert_eq!(s.undo().unwrap(), Outcome::Undone);
        assert_eq!(s.source(), Some(&image));

        // Back at the first entry: no-op
        assert_eq!(s.undo().unwrap(), Outcome::Unchanged);
        assert_eq!(s.history().current_index(), Some(0));

        let undo_lines = s
            .activity()
            .entries()
            .filter(|e| e.label == UNDO_LABEL)
            .count();
        assert_eq!(undo_lines, 2);
        assert_eq!(icon_for_label(UNDO_LABEL), "fas fa-undo");
    }

    #[test]
    fn test_undo_drops_preview_on_singleton() {
        let image = gradient(3, 3);
        let mut s = loaded(image.clone());
        s.preview(IntensityTool::Brightness, 1.0).unwrap();
        assert_eq!(s.undo().unwrap(), Outcome::Discarded);
        assert_eq!(s.state(), SessionState::Loaded);
        assert_in_sync(&s);
    }

    #[test]
    fn test_push_after_undo_truncates() {
        let image = gradient(4, 4);
        let mut s = loaded(image.clone());
        s.apply_one_shot(OneShot::Grayscale).unwrap();
        s.apply_one_shot(OneShot::EdgeDetection).unwrap();
        s.undo().unwrap();
        s.apply_one_shot(OneShot::Rotate(180)).unwrap();

        let labels: Vec<&str> = s.history().entries().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec![LOADED_LABEL, "Grayscale Applied", "Image Rotated"]);
    }

    #[test]
    fn test_history_capped_through_session() {
        let mut s = loaded(gradient(2, 2));
        for _ in 0..30 {
            s.apply_one_shot(OneShot::Rotate(90)).unwrap();
        }
        assert_eq!(s.history().len(), 20);
        assert_eq!(s.activity().len(), 10);
    }

    #[test]
    fn test_draw_stroke_commits() {
        let image = PixelBuffer::filled(20, 20, [255, 255, 255, 255]);
        let mut s = loaded(image.clone());
        s.select_tool(ToolKind::Draw).unwrap();
        s.execute(Command::SetBrushColor(Color([255, 0, 0, 255])))
            .unwrap();

        assert_eq!(
            s.execute(Command::BeginStroke(Point::new(2.0, 10.5))).unwrap(),
            Outcome::StrokeStarted
        );
        assert_eq!(s.state(), SessionState::Drawing);

        let outcome = s.execute(Command::StrokePoint(Point::new(17.0, 10.5))).unwrap();
        assert!(matches!(outcome, Outcome::StrokeUpdated(rect) if !rect.is_empty()));
        // Live in working, not yet in source
        assert_eq!(s.working().unwrap().get(10, 10).unwrap(), [255, 0, 0, 255]);
        assert_eq!(s.source(), Some(&image));

        assert_eq!(
            s.execute(Command::EndStroke).unwrap(),
            Outcome::Committed {
                label: "Stroke Drawn"
            }
        );
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.source().unwrap().get(10, 10).unwrap(), [255, 0, 0, 255]);
        assert_in_sync(&s);
    }

    #[test]
    fn test_erase_stroke_uses_erase_size() {
        let image = PixelBuffer::filled(40, 40, [10, 20, 30, 255]);
        let mut s = loaded(image);
        s.select_tool(ToolKind::Erase).unwrap();
        s.begin_stroke(Point::new(5.0, 20.0)).unwrap();
        s.stroke_point(Point::new(35.0, 20.0)).unwrap();
        s.end_stroke().unwrap();

        let source = s.source().unwrap();
        // Default eraser is 20px wide: 9 rows above the line are cleared
        assert_eq!(source.get(20, 11).unwrap(), [10, 20, 30, 0]);
        assert_eq!(source.get(20, 2).unwrap(), [10, 20, 30, 255]);
        assert_eq!(s.history().current().unwrap().label, "Stroke Erased");
    }

    #[test]
    fn test_stroke_without_brush_tool_ignored() {
        let mut s = loaded(gradient(4, 4));
        s.select_tool(ToolKind::Blur).unwrap();
        assert_eq!(s.begin_stroke(Point::new(1.0, 1.0)).unwrap(), Outcome::Unchanged);
        assert_eq!(s.stroke_point(Point::new(2.0, 2.0)).unwrap(), Outcome::Unchanged);
        assert_eq!(s.end_stroke().unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn test_click_without_move_leaves_no_entry() {
        let mut s = loaded(gradient(4, 4));
        s.select_tool(ToolKind::Draw).unwrap();
        s.begin_stroke(Point::new(1.0, 1.0)).unwrap();
        assert_eq!(s.end_stroke().unwrap(), Outcome::Unchanged);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.state(), SessionState::Loaded);
    }

    #[test]
    fn test_begin_stroke_commits_pending_preview() {
        let image = gradient(10, 10);
        let mut s = loaded(image.clone());
        s.preview(IntensityTool::Sharpen, 0.4).unwrap();
        s.active_tool = Some(ToolKind::Draw);

        s.begin_stroke(Point::new(0.0, 0.0)).unwrap();
        let labels: Vec<&str> = s.history().entries().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec![LOADED_LABEL, "Sharpen Applied"]);
        assert_eq!(
            s.source(),
            Some(&apply_intensity(&image, IntensityTool::Sharpen, 0.4))
        );
    }

    #[test]
    fn test_undo_while_drawing_cancels_stroke() {
        let image = PixelBuffer::filled(10, 10, [255, 255, 255, 255]);
        let mut s = loaded(image.clone());
        s.apply_one_shot(OneShot::Grayscale).unwrap();
        s.select_tool(ToolKind::Draw).unwrap();
        s.begin_stroke(Point::new(0.0, 5.0)).unwrap();
        s.stroke_point(Point::new(10.0, 5.0)).unwrap();

        assert_eq!(s.undo().unwrap(), Outcome::Discarded);
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.source(), Some(&grayscale(&image)));
        assert_eq!(s.history().current_index(), Some(1));
        assert_in_sync(&s);

        assert_eq!(s.undo().unwrap(), Outcome::Undone);
        assert_eq!(s.source(), Some(&image));
    }

    #[test]
    fn test_undo_drops_preview_but_keeps_last_commit() {
        let image = gradient(5, 3);
        let mut s = loaded(image.clone());
        s.apply_one_shot(OneShot::Grayscale).unwrap();
        s.preview(IntensityTool::Brightness, 1.0).unwrap();
        assert_eq!(s.state(), SessionState::PreviewDirty);

        assert_eq!(s.undo().unwrap(), Outcome::Discarded);
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.source(), Some(&grayscale(&image)));
        assert_eq!(s.history().current_index(), Some(1));
        assert_in_sync(&s);
        assert!(s.activity().entries().all(|e| e.label != UNDO_LABEL));

        assert_eq!(s.undo().unwrap(), Outcome::Undone);
        assert_eq!(s.source(), Some(&image));
        assert_eq!(s.history().current_index(), Some(0));
    }

    #[test]
    fn test_brush_size_commands_clamp() {
        let mut s = session();
        s.execute(Command::SetDrawSize(500)).unwrap();
        s.execute(Command::SetEraseSize(0)).unwrap();
        assert_eq!(s.settings().draw_size, 20);
        assert_eq!(s.settings().erase_size, 5);
    }

    #[test]
    fn test_export_is_png_of_working() {
        let image = gradient(3, 3);
        let mut s = loaded(image.clone());
        s.preview(IntensityTool::Contrast, 1.0).unwrap();
        let Outcome::Exported(png) = s.execute(Command::Export).unwrap() else {
            panic!("expected exported bytes");
        };
        let decoded = crate::decode::decode_image(&png).unwrap();
        assert_eq!(Some(&decoded), s.working());
    }

    #[test]
    fn test_gallery_load_resets_history() {
        let mut s = loaded(gradient(4, 4));
        s.apply_one_shot(OneShot::Grayscale).unwrap();
        s.execute(Command::LoadFromGallery(gradient(2, 7))).unwrap();
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.source().unwrap().dimensions(), (2, 7));
        assert_eq!(s.undo().unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn test_tool_kind_names_roundtrip() {
        for tool in ToolKind::ALL {
            assert_eq!(tool.name().parse::<ToolKind>().unwrap(), tool);
            assert_eq!(
                serde_json::to_string(&tool).unwrap(),
                format!("\"{}\"", tool.name())
            );
        }
        assert!(matches!(
            "crop".parse::<ToolKind>(),
            Err(EditError::UnknownTool(_))
        ));
    }

    #[test]
    fn test_timestamps_come_from_clock() {
        let s = loaded(gradient(2, 2));
        assert_eq!(s.history().current().unwrap().timestamp, fixed_clock());
    }
}
