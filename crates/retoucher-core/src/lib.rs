//! Retoucher Core - raster image editing library
//!
//! This crate holds everything behind the editor UI: the RGBA pixel buffer,
//! the pixel transforms, freehand strokes, the edit session state machine and
//! its bounded undo history. It has no browser dependencies; the wasm crate
//! wraps it for JavaScript.

pub mod adjustments;
pub mod buffer;
pub mod decode;
pub mod encode;
pub mod filters;
pub mod gallery;
pub mod history;
pub mod luminance;
pub mod session;
pub mod settings;
pub mod stroke;
pub mod transform;

pub use adjustments::{apply_intensity, IntensityTool};
pub use buffer::{clamp_channel, BufferError, PixelBuffer, Rgba};
pub use decode::{decode_image, DecodeError};
pub use encode::{encode_png, EncodeError};
pub use filters::{apply_color_filter, detect_edges, grayscale, ColorPreset};
pub use gallery::{Gallery, GalleryEntry, GalleryError};
pub use history::{ActivityEntry, ActivityLog, Clock, History, HistoryEntry, HistoryError};
pub use session::{Command, EditError, EditSession, OneShot, Outcome, SessionState, ToolKind};
pub use settings::{Color, EditorSettings, SettingsError};
pub use stroke::{render_stroke, BrushMode, Point, Stroke, StrokeRenderer};
pub use transform::{rotate, QuarterTurn, TransformError};
