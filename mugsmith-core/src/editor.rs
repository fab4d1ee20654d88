//! Editing session: one scene, one gesture slot, at most one text edit.
//!
//! The session routes host input to the interaction controller or the text
//! edit sub-state. Editing a text element takes priority over moving or
//! resizing it. Dropping the session tears it down and releases every image
//! resource the scene still owns.

use crate::config::EditorConfig;
use crate::element::{ElementId, ElementKind, TextStyle};
use crate::error::{CanvasError, CanvasResult};
use crate::event::{EditKey, KeyModifiers};
use crate::frame::FrameToken;
use crate::geometry::{Point, Rect};
use crate::interaction::{HostEffects, InteractionController, ResizeHandle, VisualFeedback};
use crate::layout::{layout_text, LaidOutLine, TextBoxMetrics};
use crate::resource::ImageHandle;
use crate::scene::Scene;
use crate::text_edit::{EditAction, TextEditSession};
use crate::upload::UploadPolicy;
use crate::wrap::TextMeasure;

/// Last activation seen, for double-activation detection.
#[derive(Debug, Clone, Copy)]
struct Activation {
    id: ElementId,
    at_ms: u64,
}

/// A single editing session over one scene.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    controller: InteractionController,
    upload: UploadPolicy,
    editing: Option<TextEditSession>,
    last_activation: Option<Activation>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Start a session with an empty scene.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let scene = Scene::from_config(&config);
        let upload = UploadPolicy::with_limit(config.max_upload_bytes);
        tracing::debug!(
            width = config.canvas_width,
            height = config.canvas_height,
            "editor session started"
        );
        Self {
            config,
            scene,
            controller: InteractionController::default(),
            upload,
            editing: None,
            last_activation: None,
        }
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The scene being edited.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Text box metrics derived from the configuration.
    #[must_use]
    pub fn text_metrics(&self) -> TextBoxMetrics {
        TextBoxMetrics {
            padding: self.config.text_padding,
            line_height_factor: self.config.line_height_factor,
        }
    }

    /// Replace the upload policy (e.g. to widen accepted types).
    pub fn set_upload_policy(&mut self, policy: UploadPolicy) {
        self.upload = policy;
    }

    /// Tell the controller where the canvas sits in pointer coordinates.
    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.controller.set_canvas_origin(origin);
    }

    /// Pre-check and place an uploaded image at the default position.
    ///
    /// Nothing is acquired when the pre-check fails.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UploadTooLarge`], [`CanvasError::UnsupportedUpload`]
    /// or [`CanvasError::ImageLimitReached`].
    pub fn add_image(&mut self, bytes: Vec<u8>, mime_type: Option<&str>) -> CanvasResult<ElementId> {
        self.upload.check(bytes.len(), mime_type)?;
        if self.scene.image_count() >= self.scene.max_images() {
            return Err(CanvasError::ImageLimitReached(self.scene.max_images()));
        }
        let handle = self.scene.load_image(bytes, mime_type.map(str::to_string));
        let id = self.scene.add_image_default(handle)?;
        tracing::info!(%id, "image placed");
        Ok(id)
    }

    /// Place an already loaded image, such as a generated one downloaded
    /// into this scene's tracker, at the default position.
    ///
    /// No upload pre-check applies. The handle is released if it cannot be
    /// placed.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ImageLimitReached`] past the image cap.
    pub fn add_image_handle(&mut self, handle: ImageHandle) -> CanvasResult<ElementId> {
        if self.scene.image_count() >= self.scene.max_images() {
            return Err(CanvasError::ImageLimitReached(self.scene.max_images()));
        }
        let id = self.scene.add_image_default(handle)?;
        tracing::info!(%id, "loaded image placed");
        Ok(id)
    }

    /// Place a text block with default content.
    ///
    /// # Errors
    ///
    /// Returns an error only if the generated id collides.
    pub fn add_text(&mut self) -> CanvasResult<ElementId> {
        self.scene.add_text_default()
    }

    /// Delete an element, ending any gesture or edit that targets it.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] for an unknown id.
    pub fn delete(&mut self, id: ElementId) -> CanvasResult<()> {
        if self.controller.gesture().element() == Some(id) {
            self.controller.abort_gesture();
        }
        if self.editing_id() == Some(id) {
            self.editing = None;
        }
        if self.last_activation.is_some_and(|a| a.id == id) {
            self.last_activation = None;
        }
        self.scene.remove(id)?;
        Ok(())
    }

    /// Change a text element's style.
    ///
    /// # Errors
    ///
    /// Fails for a missing or non-text element, or an invalid color.
    pub fn set_text_style(&mut self, id: ElementId, style: TextStyle) -> CanvasResult<()> {
        self.scene.set_text_style(id, style)
    }

    /// Change the canvas background.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidColor`] for an unparsable color.
    pub fn set_background_color(&mut self, color: &str) -> CanvasResult<()> {
        self.scene.set_background_color(color)
    }

    /// Raise an element above all others.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] for an unknown id.
    pub fn bring_to_front(&mut self, id: ElementId) -> CanvasResult<()> {
        self.scene.bring_to_front(id)
    }

    /// Lower an element below all others.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] for an unknown id.
    pub fn send_to_back(&mut self, id: ElementId) -> CanvasResult<()> {
        self.scene.send_to_back(id)
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.scene.deselect();
    }

    // ---------------------------------------------------------------------
    // Gestures
    // ---------------------------------------------------------------------

    /// Start moving an element. Returns `false` when the element is being
    /// edited and the gesture was ignored.
    ///
    /// # Errors
    ///
    /// Fails if another gesture is active or the element does not exist.
    pub fn begin_move(&mut self, id: ElementId, pointer: Point) -> CanvasResult<bool> {
        if self.editing_id() == Some(id) {
            tracing::debug!(%id, "move ignored while editing");
            return Ok(false);
        }
        self.controller.begin_move(&mut self.scene, id, pointer)?;
        Ok(true)
    }

    /// Start resizing an element. Returns `false` when the element is being
    /// edited and the gesture was ignored.
    ///
    /// # Errors
    ///
    /// Fails if another gesture is active or the element does not exist.
    pub fn begin_resize(
        &mut self,
        id: ElementId,
        handle: ResizeHandle,
        pointer: Point,
    ) -> CanvasResult<bool> {
        if self.editing_id() == Some(id) {
            tracing::debug!(%id, "resize ignored while editing");
            return Ok(false);
        }
        self.controller
            .begin_resize(&mut self.scene, id, handle, pointer)?;
        Ok(true)
    }

    /// Forward a pointer sample; see [`InteractionController::on_pointer_move`].
    pub fn pointer_move(&mut self, pointer: Point) -> Option<FrameToken> {
        self.controller.on_pointer_move(pointer)
    }

    /// Per-frame recomputation.
    ///
    /// # Errors
    ///
    /// Fails if the gesture's element vanished.
    pub fn animation_frame(&mut self) -> CanvasResult<Option<Rect>> {
        self.controller.on_animation_frame(&mut self.scene)
    }

    /// Pointer released.
    ///
    /// # Errors
    ///
    /// Fails if the gesture's element vanished; the gesture is released anyway.
    pub fn end_gesture(&mut self) -> CanvasResult<()> {
        self.controller.end_gesture(&mut self.scene)
    }

    /// Pointer released outside the canvas or window lost focus.
    pub fn abort_gesture(&mut self) {
        self.controller.abort_gesture();
    }

    /// Visual feedback for the dragged element.
    #[must_use]
    pub fn feedback(&self) -> Option<VisualFeedback> {
        self.controller.feedback()
    }

    /// Cursor and text-selection state the host should apply.
    #[must_use]
    pub fn host_effects(&self) -> HostEffects {
        self.controller.host_effects()
    }

    // ---------------------------------------------------------------------
    // Text editing
    // ---------------------------------------------------------------------

    /// Activate (click/tap) an element: selects it, and a second activation
    /// of the same text element within the configured window enters editing.
    ///
    /// Returns `true` when editing was entered.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] for an unknown id.
    pub fn activate(&mut self, id: ElementId, now_ms: u64) -> CanvasResult<bool> {
        self.scene.select(id)?;

        let is_double = self.last_activation.is_some_and(|prev| {
            prev.id == id && now_ms.saturating_sub(prev.at_ms) <= self.config.double_activation_ms
        });
        let is_text = self.scene.get(id).is_some_and(|e| e.is_text());

        if is_double && is_text {
            self.last_activation = None;
            if self.editing_id() != Some(id) {
                self.begin_editing(id)?;
            }
            return Ok(true);
        }

        self.last_activation = Some(Activation { id, at_ms: now_ms });
        Ok(false)
    }

    /// Enter editing on a text element, committing any other edit first.
    ///
    /// # Errors
    ///
    /// Fails for a missing or non-text element.
    pub fn begin_editing(&mut self, id: ElementId) -> CanvasResult<()> {
        let content = self
            .scene
            .get(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?
            .text_content()
            .ok_or_else(|| CanvasError::InvalidOperation(format!("element {id} is not text")))?
            .to_string();

        if let Some(active) = self.editing_id() {
            if active == id {
                return Ok(());
            }
            self.commit_editing()?;
        }
        if self.controller.gesture().element() == Some(id) {
            self.controller.abort_gesture();
        }

        tracing::debug!(%id, "text editing started");
        self.editing = Some(TextEditSession::new(id, &content, self.config.edit_debounce_ms));
        Ok(())
    }

    /// The active text edit, if any.
    #[must_use]
    pub fn editing(&self) -> Option<&TextEditSession> {
        self.editing.as_ref()
    }

    /// Element currently being edited.
    #[must_use]
    pub fn editing_id(&self) -> Option<ElementId> {
        self.editing.as_ref().map(TextEditSession::element_id)
    }

    /// Deliver a key press to the active edit.
    ///
    /// Confirm commits and leaves editing; cancel reverts to the last
    /// committed content and leaves editing.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidOperation`] when nothing is being edited.
    pub fn handle_key(
        &mut self,
        key: &EditKey,
        modifiers: KeyModifiers,
        now_ms: u64,
    ) -> CanvasResult<EditAction> {
        let session = self
            .editing
            .as_mut()
            .ok_or_else(|| CanvasError::InvalidOperation("no text is being edited".into()))?;

        let action = session.handle_key(key, modifiers, now_ms);
        match action {
            EditAction::Continue => {}
            EditAction::Confirm => self.commit_editing()?,
            EditAction::Cancel => self.cancel_editing()?,
        }
        Ok(action)
    }

    /// Replace the whole edit buffer (paste, IME composition end).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidOperation`] when nothing is being edited.
    pub fn replace_text(&mut self, text: &str, now_ms: u64) -> CanvasResult<()> {
        self.editing
            .as_mut()
            .ok_or_else(|| CanvasError::InvalidOperation("no text is being edited".into()))?
            .replace_all(text, now_ms);
        Ok(())
    }

    /// Debounce tick. Commits the buffer to the scene once it has been
    /// quiet long enough; returns `true` when a commit happened.
    ///
    /// # Errors
    ///
    /// Fails if the edited element disappeared.
    pub fn poll(&mut self, now_ms: u64) -> CanvasResult<bool> {
        let Some(session) = self.editing.as_mut() else {
            return Ok(false);
        };
        match session.poll(now_ms) {
            Some(content) => {
                let id = session.element_id();
                self.scene.set_text_content(id, &content)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Focus left the editing surface: commit at once and leave editing.
    ///
    /// # Errors
    ///
    /// Fails if the edited element disappeared.
    pub fn blur(&mut self) -> CanvasResult<()> {
        self.commit_editing()
    }

    fn commit_editing(&mut self) -> CanvasResult<()> {
        if let Some(session) = self.editing.take() {
            let id = session.element_id();
            let content = session.confirm();
            self.scene.set_text_content(id, &content)?;
            tracing::debug!(%id, "text editing confirmed");
        }
        Ok(())
    }

    fn cancel_editing(&mut self) -> CanvasResult<()> {
        if let Some(session) = self.editing.take() {
            let id = session.element_id();
            let restored = session.cancel();
            self.scene.set_text_content(id, &restored)?;
            tracing::debug!(%id, "text editing cancelled");
        }
        Ok(())
    }

    /// Wrapped, positioned lines of a text element as they will be drawn.
    ///
    /// While the element is being edited the live buffer is laid out.
    ///
    /// # Errors
    ///
    /// Fails for a missing or non-text element.
    pub fn text_lines<M: TextMeasure + ?Sized>(
        &self,
        id: ElementId,
        measurer: &M,
    ) -> CanvasResult<Vec<LaidOutLine>> {
        let element = self
            .scene
            .get(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
        let (content, style) = match &element.kind {
            ElementKind::Text { content, style } => (content, style),
            ElementKind::Image { .. } => {
                return Err(CanvasError::InvalidOperation(format!(
                    "element {id} is not text"
                )))
            }
        };
        let content = match &self.editing {
            Some(session) if session.element_id() == id => session.buffer(),
            _ => content.as_str(),
        };
        Ok(layout_text(
            content,
            style,
            element.rect(),
            self.text_metrics(),
            measurer,
        ))
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Image resources still held by this session.
    #[must_use]
    pub fn live_image_resources(&self) -> usize {
        self.scene.tracker().live()
    }

    /// End the session: abort any gesture, discard any edit and remove every
    /// element. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.controller.abort_gesture();
        if let Some(session) = self.editing.take() {
            tracing::debug!(id = %session.element_id(), "discarding edit on teardown");
        }
        self.last_activation = None;
        if !self.scene.is_empty() {
            self.scene.clear();
            tracing::debug!(
                live = self.scene.tracker().live(),
                "editor session torn down"
            );
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
    use crate::element::FontSpec;

    struct HalfEm;

    impl TextMeasure for HalfEm {
        #[allow(clippy::cast_precision_loss)]
        fn measure(&self, text: &str, font: &FontSpec) -> f32 {
            text.chars().count() as f32 * font.size_px * 0.5
        }
    }

    fn no_mods() -> KeyModifiers {
        KeyModifiers::default()
    }

    #[test]
    fn test_double_activation_enters_editing() {
        let mut editor = Editor::default();
        let id = editor.add_text().expect("text");

        assert!(!editor.activate(id, 1_000).expect("first"));
        assert!(editor.activate(id, 1_300).expect("second"));
        assert_eq!(editor.editing_id(), Some(id));
    }

    #[test]
    fn test_slow_or_mixed_activations_do_not_edit() {
        let mut editor = Editor::default();
        let a = editor.add_text().expect("a");
        let b = editor.add_text().expect("b");

        editor.activate(a, 0).expect("a");
        assert!(!editor.activate(a, 1_000).expect("too slow"));
        assert!(!editor.activate(b, 1_100).expect("other element"));
        assert_eq!(editor.editing_id(), None);
        assert_eq!(editor.scene().selected(), Some(b));
    }

    #[test]
    fn test_image_double_activation_only_selects() {
        let mut editor = Editor::default();
        let id = editor.add_image(vec![1, 2, 3], Some("image/png")).expect("image");
        editor.activate(id, 0).expect("first");
        assert!(!editor.activate(id, 10).expect("second"));
        assert_eq!(editor.editing_id(), None);
    }

    #[test]
    fn test_editing_blocks_move_and_resize() {
        let mut editor = Editor::default();
        let id = editor.add_text().expect("text");
        editor.begin_editing(id).expect("edit");

        assert!(!editor.begin_move(id, Point::new(60.0, 60.0)).expect("move"));
        assert!(!editor
            .begin_resize(id, ResizeHandle::Se, Point::new(250.0, 110.0))
            .expect("resize"));
        assert!(editor.host_effects().text_selection);

        let other = editor.add_text().expect("other");
        assert!(editor.begin_move(other, Point::new(80.0, 80.0)).expect("move other"));
    }

    #[test]
    fn test_debounced_commit_then_cancel_reverts() {
        let mut editor = Editor::default();
        let id = editor.add_text().expect("text");
        editor.begin_editing(id).expect("edit");

        editor.handle_key(&EditKey::Text("!".into()), no_mods(), 0).expect("key");
        assert!(!editor.poll(100).expect("poll"));
        assert_eq!(editor.scene().get(id).and_then(|e| e.text_content()), Some("New text"));
        assert!(editor.poll(300).expect("poll"));
        assert_eq!(editor.scene().get(id).and_then(|e| e.text_content()), Some("New text!"));

        editor.handle_key(&EditKey::Text("?".into()), no_mods(), 400).expect("key");
        let action = editor.handle_key(&EditKey::Escape, no_mods(), 450).expect("escape");
        assert_eq!(action, EditAction::Cancel);
        assert_eq!(editor.editing_id(), None);
        assert_eq!(editor.scene().get(id).and_then(|e| e.text_content()), Some("New text!"));
    }

    #[test]
    fn test_confirm_and_blur_commit_immediately() {
        let mut editor = Editor::default();
        let id = editor.add_text().expect("text");

        editor.begin_editing(id).expect("edit");
        editor.replace_text("Hello", 0).expect("replace");
        editor.handle_key(&EditKey::Enter, no_mods(), 1).expect("enter");
        assert_eq!(editor.scene().get(id).and_then(|e| e.text_content()), Some("Hello"));

        editor.begin_editing(id).expect("edit again");
        editor.replace_text("Bye", 2).expect("replace");
        editor.blur().expect("blur");
        assert_eq!(editor.editing_id(), None);
        assert_eq!(editor.scene().get(id).and_then(|e| e.text_content()), Some("Bye"));
    }

    #[test]
    fn test_switching_edit_target_commits_previous() {
        let mut editor = Editor::default();
        let a = editor.add_text().expect("a");
        let b = editor.add_text().expect("b");
        editor.begin_editing(a).expect("edit a");
        editor.replace_text("first", 0).expect("replace");
        editor.begin_editing(b).expect("edit b");
        assert_eq!(editor.scene().get(a).and_then(|e| e.text_content()), Some("first"));
        assert_eq!(editor.editing_id(), Some(b));
    }

    #[test]
    fn test_handle_key_without_edit_fails() {
        let mut editor = Editor::default();
        assert!(editor.handle_key(&EditKey::Enter, no_mods(), 0).is_err());
    }

    #[test]
    fn test_upload_precheck_acquires_nothing() {
        let mut editor = Editor::default();
        let err = editor
            .add_image(vec![0; DEFAULT_MAX_UPLOAD_BYTES + 1], Some("image/png"))
            .unwrap_err();
        assert!(matches!(err, CanvasError::UploadTooLarge { .. }));
        assert_eq!(editor.live_image_resources(), 0);
        assert_eq!(editor.scene().tracker().released(), 0);
    }

    #[test]
    fn test_image_cap() {
        let mut editor = Editor::default();
        for _ in 0..3 {
            editor.add_image(vec![1], Some("image/jpeg")).expect("image");
        }
        assert_eq!(
            editor.add_image(vec![1], Some("image/jpeg")).unwrap_err(),
            CanvasError::ImageLimitReached(3)
        );
        assert_eq!(editor.live_image_resources(), 3);
        editor.add_text().expect("text is uncapped");
    }

    #[test]
    fn test_loaded_handle_is_placed_without_copy() {
        let mut editor = Editor::default();
        let handle = editor
            .scene()
            .tracker()
            .acquire(vec![7; DEFAULT_MAX_UPLOAD_BYTES + 1], Some("image/png".into()));
        let id = editor.add_image_handle(handle).expect("placed");
        assert_eq!(editor.live_image_resources(), 1);
        assert!(editor.scene().get(id).is_some_and(|e| e.is_image()));

        for _ in 0..2 {
            editor.add_image(vec![1], None).expect("image");
        }
        let extra = editor.scene().tracker().acquire(vec![1], None);
        assert_eq!(
            editor.add_image_handle(extra).unwrap_err(),
            CanvasError::ImageLimitReached(3)
        );
        assert_eq!(editor.live_image_resources(), 3);
    }

    #[test]
    fn test_delete_releases_and_ends_gesture() {
        let mut editor = Editor::default();
        let id = editor.add_image(vec![1], None).expect("image");
        editor.begin_move(id, Point::new(60.0, 60.0)).expect("move");
        editor.delete(id).expect("delete");
        assert!(editor.feedback().is_none());
        assert_eq!(editor.host_effects(), HostEffects::default());
        assert_eq!(editor.live_image_resources(), 0);
        assert!(editor.delete(id).is_err());
    }

    #[test]
    fn test_teardown_and_drop_release_resources() {
        let mut editor = Editor::default();
        editor.add_image(vec![1], None).expect("image");
        editor.add_image(vec![2], None).expect("image");
        let tracker = editor.scene().tracker().clone();
        assert_eq!(tracker.live(), 2);

        editor.teardown();
        assert_eq!(tracker.live(), 0);
        editor.teardown();

        let mut editor = Editor::default();
        editor.add_image(vec![1], None).expect("image");
        let tracker = editor.scene().tracker().clone();
        drop(editor);
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.released(), 1);
    }

    #[test]
    fn test_text_lines_follow_live_buffer() {
        let mut editor = Editor::default();
        let id = editor.add_text().expect("text");
        editor.begin_editing(id).expect("edit");
        editor.replace_text("a\nb", 0).expect("replace");
        let lines = editor.text_lines(id, &HalfEm).expect("lines");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "b");
    }
}
