//! The editor object the UI talks to.
//!
//! `JsEditor` owns one [`EditSession`] plus the upload gallery. Every UI event
//! maps to one method call; results come back as small plain objects
//! (`{ kind, label?, preset?, dirty? }`) and failures as rejected strings the
//! UI shows as a notification.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const editor = new JsEditor({ draw_size: 8 });
//! editor.load_image(new Uint8Array(await file.arrayBuffer()));
//! editor.select_tool('brightness');
//! editor.set_intensity(70);
//! editor.commit();
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(editor.working_pixels()),
//!     editor.width, editor.height), 0, 0);
//! ```

use retoucher_core::history::Clock;
use retoucher_core::stroke::DirtyRect;
use retoucher_core::{
    decode_image, ActivityEntry, Color, ColorPreset, EditError, EditSession, EditorSettings, Gallery,
    GalleryEntry, OneShot, Outcome, PixelBuffer, Point, ToolKind,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::types::JsPixelBuffer;

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn js_clock() -> u64 {
    js_sys::Date::now() as u64
}

/// 64 random bits from `Math.random()`.
fn js_seed() -> u64 {
    let half = || (js_sys::Math::random() * u32::MAX as f64) as u64;
    (half() << 32) | half()
}

/// Plain-object form of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct OutcomeSummary {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<ColorPreset>,
    /// `[left, top, right, bottom]`, right/bottom exclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    dirty: Option<[u32; 4]>,
}

impl OutcomeSummary {
    fn kind(kind: &'static str) -> Self {
        Self {
            kind,
            label: None,
            preset: None,
            dirty: None,
        }
    }
}

impl From<&Outcome> for OutcomeSummary {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Unchanged => Self::kind("unchanged"),
            Outcome::Loaded => Self::kind("loaded"),
            Outcome::Previewed => Self::kind("previewed"),
            Outcome::Committed { label } => Self {
                label: Some(*label),
                ..Self::kind("committed")
            },
            Outcome::Filtered(preset) => Self {
                label: Some(OneShot::ColorFilter.label()),
                preset: Some(*preset),
                ..Self::kind("committed")
            },
            Outcome::StrokeUpdated(DirtyRect {
                left,
                top,
                right,
                bottom,
            }) => Self {
                dirty: Some([*left, *top, *right, *bottom]),
                ..Self::kind("stroke")
            },
            Outcome::StrokeStarted => Self::kind("stroke-started"),
            Outcome::Undone => Self::kind("undone"),
            Outcome::Discarded => Self::kind("discarded"),
            Outcome::SettingChanged => Self::kind("setting-changed"),
            Outcome::Exported(_) => Self::kind("exported"),
        }
    }
}

/// Gallery listing entry without the image bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GalleryItem {
    id: u64,
    width: u32,
    height: u32,
}

impl From<&GalleryEntry> for GalleryItem {
    fn from(entry: &GalleryEntry) -> Self {
        Self {
            id: entry.id,
            width: entry.width,
            height: entry.height,
        }
    }
}

/// Session plus gallery, free of any JS types.
#[derive(Debug)]
pub(crate) struct Editor {
    session: EditSession,
    gallery: Gallery,
}

impl Editor {
    pub(crate) fn new(settings: EditorSettings, seed: u64, clock: Clock) -> Result<Self, EditError> {
        let gallery = Gallery::new(settings.gallery_max_edge);
        let session = EditSession::new(settings)?.with_seed(seed).with_clock(clock);
        Ok(Self { session, gallery })
    }

    /// Open an upload and add it to the gallery. Returns the gallery id.
    ///
    /// Nothing changes unless both the gallery and the session accept it.
    pub(crate) fn load_upload(&mut self, bytes: &[u8]) -> Result<u64, EditError> {
        let image = decode_image(bytes)?;
        let id = self.gallery.insert(&image)?;
        if let Err(e) = self.session.load_buffer(image) {
            self.gallery.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    pub(crate) fn load_from_gallery(&mut self, id: u64) -> Result<Outcome, EditError> {
        let image = self.gallery.load(id)?;
        self.session.load_buffer(image)
    }

    pub(crate) fn session(&self) -> &EditSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub(crate) fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub(crate) fn gallery_mut(&mut self) -> &mut Gallery {
        &mut self.gallery
    }

    pub(crate) fn restore_gallery(&mut self, entries: Vec<GalleryEntry>) {
        self.gallery = Gallery::from_entries(entries, self.session.settings().gallery_max_edge);
    }
}

#[derive(Deserialize)]
struct GalleryDump {
    entries: Vec<GalleryEntry>,
}

/// Browser-facing editor.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor. `settings` is a partial settings object or `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<JsEditor, JsValue> {
        let settings: EditorSettings = if settings.is_undefined() || settings.is_null() {
            EditorSettings::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?
        };
        let inner = Editor::new(settings, js_seed(), js_clock).map_err(to_js)?;
        Ok(JsEditor { inner })
    }

    /// Open an uploaded file and remember it in the gallery.
    ///
    /// Returns the new gallery id. On failure the current image stays open.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<f64, JsValue> {
        self.inner.load_upload(bytes).map(|id| id as f64).map_err(to_js)
    }

    /// Reopen a gallery image. History restarts from it.
    pub fn load_from_gallery(&mut self, id: f64) -> Result<JsValue, JsValue> {
        let outcome = self.inner.load_from_gallery(id as u64).map_err(to_js)?;
        summarize(&outcome)
    }

    /// Toolbar button: `"brightness"`, `"grayscale"`, `"draw"`, ...
    pub fn select_tool(&mut self, name: &str) -> Result<JsValue, JsValue> {
        let tool: ToolKind = name.parse().map_err(to_js)?;
        self.run(|s| s.select_tool(tool))
    }

    /// Intensity slider moved (0-100).
    pub fn set_intensity(&mut self, percent: u8) -> Result<JsValue, JsValue> {
        self.run(|s| s.set_intensity(percent))
    }

    pub fn commit(&mut self) -> Result<JsValue, JsValue> {
        self.run(EditSession::commit)
    }

    /// Rotate by a multiple of 90 degrees (positive = clockwise).
    pub fn rotate(&mut self, degrees: i32) -> Result<JsValue, JsValue> {
        self.run(|s| s.apply_one_shot(OneShot::Rotate(degrees)))
    }

    pub fn begin_stroke(&mut self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        self.run(|s| s.begin_stroke(Point::new(x, y)))
    }

    pub fn stroke_point(&mut self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        self.run(|s| s.stroke_point(Point::new(x, y)))
    }

    pub fn end_stroke(&mut self) -> Result<JsValue, JsValue> {
        self.run(EditSession::end_stroke)
    }

    pub fn undo(&mut self) -> Result<JsValue, JsValue> {
        self.run(EditSession::undo)
    }

    /// PNG bytes of the current image.
    pub fn export(&self) -> Result<Vec<u8>, JsValue> {
        self.inner.session().export().map_err(to_js)
    }

    /// Brush color as `#RRGGBB` or `#RRGGBBAA`.
    pub fn set_brush_color(&mut self, hex: &str) -> Result<(), JsValue> {
        let color: Color = hex.parse().map_err(to_js)?;
        self.inner.session_mut().set_brush_color(color);
        Ok(())
    }

    /// Returns the size actually applied after clamping.
    pub fn set_draw_size(&mut self, size: u32) -> u32 {
        self.inner.session_mut().set_draw_size(size)
    }

    /// Returns the size actually applied after clamping.
    pub fn set_erase_size(&mut self, size: u32) -> u32 {
        self.inner.session_mut().set_erase_size(size)
    }

    pub fn settings(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.session().settings()).map_err(to_js)
    }

    /// `"empty"`, `"loaded"`, `"preview-dirty"` or `"drawing"`.
    pub fn state(&self) -> String {
        state_name(&self.inner)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.session().working().map_or(0, PixelBuffer::width)
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.session().working().map_or(0, PixelBuffer::height)
    }

    /// RGBA samples of what should be on screen; empty when no image is open.
    pub fn working_pixels(&self) -> Vec<u8> {
        self.inner
            .session()
            .working()
            .map(|b| b.samples().to_vec())
            .unwrap_or_default()
    }

    /// Copy of the on-screen image.
    pub fn working(&self) -> Option<JsPixelBuffer> {
        self.inner.session().working().cloned().map(JsPixelBuffer::from_buffer)
    }

    /// Copy of the last committed image.
    pub fn source(&self) -> Option<JsPixelBuffer> {
        self.inner.session().source().cloned().map(JsPixelBuffer::from_buffer)
    }

    pub fn history_length(&self) -> usize {
        self.inner.session().history().len()
    }

    pub fn can_undo(&self) -> bool {
        self.inner.session().history().can_undo()
    }

    /// Activity panel entries, newest first: `{ label, icon, timestamp }`.
    pub fn activity(&self) -> Result<JsValue, JsValue> {
        let entries: Vec<&ActivityEntry> = self.inner.session().activity().entries().collect();
        serde_wasm_bindgen::to_value(&entries).map_err(to_js)
    }

    /// Gallery listing, newest first: `{ id, width, height }`.
    pub fn gallery(&self) -> Result<JsValue, JsValue> {
        let items: Vec<GalleryItem> = self.inner.gallery().iter().map(GalleryItem::from).collect();
        serde_wasm_bindgen::to_value(&items).map_err(to_js)
    }

    /// PNG bytes of a gallery image, for thumbnails.
    pub fn gallery_image(&self, id: f64) -> Option<Vec<u8>> {
        self.inner.gallery().get(id as u64).map(|e| e.image.clone())
    }

    pub fn remove_from_gallery(&mut self, id: f64) -> bool {
        self.inner.gallery_mut().remove(id as u64)
    }

    /// Whole gallery as a plain object, for localStorage.
    pub fn export_gallery(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.gallery()).map_err(to_js)
    }

    /// Restore a gallery saved with `export_gallery`.
    pub fn import_gallery(&mut self, value: JsValue) -> Result<(), JsValue> {
        let dump: GalleryDump = serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&format!("Invalid gallery: {}", e)))?;
        self.inner.restore_gallery(dump.entries);
        Ok(())
    }
}

impl JsEditor {
    fn run(
        &mut self,
        f: impl FnOnce(&mut EditSession) -> Result<Outcome, EditError>,
    ) -> Result<JsValue, JsValue> {
        let outcome = f(self.inner.session_mut()).map_err(to_js)?;
        summarize(&outcome)
    }
}

fn summarize(outcome: &Outcome) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&OutcomeSummary::from(outcome)).map_err(to_js)
}

fn state_name(editor: &Editor) -> String {
    match editor.session().state() {
        retoucher_core::SessionState::Empty => "empty",
        retoucher_core::SessionState::Loaded => "loaded",
        retoucher_core::SessionState::PreviewDirty => "preview-dirty",
        retoucher_core::SessionState::Drawing => "drawing",
    }
    .to_string()
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png() -> Vec<u8> {
        retoucher_core::encode_png(&PixelBuffer::filled(8, 8, [255, 255, 255, 255])).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_editor_default_settings() {
        let editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        assert_eq!(editor.state(), "empty");
        assert_eq!(editor.width(), 0);
        assert!(editor.export().is_err());
    }

    #[wasm_bindgen_test]
    fn test_editor_draw_and_undo() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        editor.load_image(&png()).unwrap();
        editor.select_tool("draw").unwrap();
        editor.set_brush_color("#FF0000").unwrap();
        editor.begin_stroke(0.0, 4.0).unwrap();
        editor.stroke_point(8.0, 4.0).unwrap();
        editor.end_stroke().unwrap();
        assert_eq!(editor.history_length(), 2);

        editor.undo().unwrap();
        assert!(!editor.can_undo());
        assert!(editor.working_pixels().iter().all(|&s| s == 255));
    }

    #[wasm_bindgen_test]
    fn test_editor_rejects_unknown_tool() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        assert!(editor.select_tool("crop").is_err());
    }

    #[wasm_bindgen_test]
    fn test_editor_bad_color() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        assert!(editor.set_brush_color("blue").is_err());
    }
}
