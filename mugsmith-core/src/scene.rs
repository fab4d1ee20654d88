//! The editing canvas: element list, selection cursor and bounds.

use crate::color::Rgba;
use crate::config::EditorConfig;
use crate::element::{Element, ElementId, ElementKind, TextStyle, MIN_ELEMENT_SIZE};
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{clamp_rect, Point, Rect, Size};
use crate::resource::{ImageHandle, ResourceTracker};

/// Default size of a newly placed image.
const DEFAULT_IMAGE_SIZE: Size = Size::new(200.0, 150.0);
/// Default size of a newly placed text block.
const DEFAULT_TEXT_SIZE: Size = Size::new(200.0, 60.0);
/// Step between cascaded default placements.
const CASCADE_STEP: f32 = 20.0;

/// A fixed-size logical canvas holding placed elements.
#[derive(Debug)]
pub struct Scene {
    /// Elements in insertion order.
    elements: Vec<Element>,
    /// Currently selected element, if any.
    selected: Option<ElementId>,
    /// Logical canvas width.
    width: f32,
    /// Logical canvas height.
    height: f32,
    /// Background color as hex.
    background_color: String,
    /// Maximum number of placed images.
    max_images: usize,
    /// Minimum element width/height.
    min_element_size: f32,
    /// Tracks image resources owned by this scene's elements.
    tracker: ResourceTracker,
}

impl Scene {
    /// Create a new empty scene with the given logical size and default limits.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self::from_config(&EditorConfig {
            canvas_width: width,
            canvas_height: height,
            ..EditorConfig::default()
        })
    }

    /// Create a new empty scene from an editor configuration.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            width: config.canvas_width,
            height: config.canvas_height,
            background_color: config.background_color.clone(),
            max_images: config.max_images,
            min_element_size: config.min_element_size.max(0.0),
            tracker: ResourceTracker::new(),
        }
    }

    /// Logical canvas size.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Background color as configured.
    #[must_use]
    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    /// Parsed background color.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color is not valid hex.
    pub fn background_rgba(&self) -> CanvasResult<Rgba> {
        Rgba::from_hex(&self.background_color)
    }

    /// Change the background color.
    ///
    /// # Errors
    ///
    /// Returns an error if `color` is not valid hex.
    pub fn set_background_color(&mut self, color: &str) -> CanvasResult<()> {
        Rgba::from_hex(color)?;
        self.background_color = color.to_string();
        Ok(())
    }

    /// Minimum element width/height enforced by this scene.
    #[must_use]
    pub fn min_element_size(&self) -> f32 {
        self.min_element_size
    }

    /// Maximum number of placed images.
    #[must_use]
    pub fn max_images(&self) -> usize {
        self.max_images
    }

    /// Resource tracker for image sources placed in this scene.
    #[must_use]
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Take ownership of loaded image bytes, counted against this scene.
    #[must_use]
    pub fn load_image(&self, bytes: Vec<u8>, mime_type: Option<String>) -> ImageHandle {
        self.tracker.acquire(bytes, mime_type)
    }

    /// Add an element, keeping its z-index. The element is clamped into bounds.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ImageLimitReached`] when adding an image past the cap,
    /// or [`CanvasError::InvalidOperation`] if the id is already present.
    pub fn add_element(&mut self, mut element: Element) -> CanvasResult<ElementId> {
        if element.is_image() && self.image_count() >= self.max_images {
            return Err(CanvasError::ImageLimitReached(self.max_images));
        }
        if self.contains(element.id) {
            return Err(CanvasError::InvalidOperation(format!(
                "duplicate element id {}",
                element.id
            )));
        }

        let rect = self.clamp(element.rect());
        element.position = Point::new(rect.x, rect.y);
        element.size = Size::new(rect.width, rect.height);

        let id = element.id;
        tracing::debug!(%id, image = element.is_image(), "element added");
        self.elements.push(element);
        Ok(id)
    }

    /// Place an image on top of everything else.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ImageLimitReached`] past the image cap.
    pub fn add_image(
        &mut self,
        source: ImageHandle,
        position: Point,
        size: Size,
    ) -> CanvasResult<ElementId> {
        let z = self.z_above_all();
        let element = Element::image(source, position, size).with_z_index(z);
        self.add_element(element)
    }

    /// Place an image at the next cascaded default position.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ImageLimitReached`] past the image cap.
    pub fn add_image_default(&mut self, source: ImageHandle) -> CanvasResult<ElementId> {
        let position = self.cascade_position();
        self.add_image(source, position, DEFAULT_IMAGE_SIZE)
    }

    /// Place a text block on top of everything else.
    ///
    /// # Errors
    ///
    /// Returns an error only if the generated id collides.
    pub fn add_text(
        &mut self,
        content: impl Into<String>,
        style: TextStyle,
        position: Point,
        size: Size,
    ) -> CanvasResult<ElementId> {
        let z = self.z_above_all();
        let element = Element::text(content, style, position, size).with_z_index(z);
        self.add_element(element)
    }

    /// Place a text block with default content and style.
    ///
    /// # Errors
    ///
    /// Returns an error only if the generated id collides.
    pub fn add_text_default(&mut self) -> CanvasResult<ElementId> {
        let position = self.cascade_position();
        self.add_text("New text", TextStyle::default(), position, DEFAULT_TEXT_SIZE)
    }

    /// Remove an element, releasing any image resource it owned.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove(&mut self, id: ElementId) -> CanvasResult<Element> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(%id, "element removed");
        Ok(self.elements.remove(index))
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        let count = self.elements.len();
        self.elements.clear();
        self.selected = None;
        tracing::debug!(count, "scene cleared");
    }

    /// Check whether an element exists.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: ElementId) -> CanvasResult<&mut Element> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Elements in paint order: ascending z-index, ties by insertion order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// Topmost element containing `point`.
    #[must_use]
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.paint_order()
            .into_iter()
            .rev()
            .find(|e| e.contains_point(point))
            .map(|e| e.id)
    }

    /// Set an element's geometry, clamped into bounds.
    ///
    /// Returns the rectangle actually committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) -> CanvasResult<Rect> {
        let clamped = self.clamp(rect);
        let element = self.get_mut(id)?;
        element.position = Point::new(clamped.x, clamped.y);
        element.size = Size::new(clamped.width, clamped.height);
        Ok(clamped)
    }

    /// Replace the content of a text element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or not text.
    pub fn set_text_content(&mut self, id: ElementId, text: &str) -> CanvasResult<()> {
        match &mut self.get_mut(id)?.kind {
            ElementKind::Text { content, .. } => {
                text.clone_into(content);
                Ok(())
            }
            ElementKind::Image { .. } => Err(CanvasError::InvalidOperation(format!(
                "element {id} is not text"
            ))),
        }
    }

    /// Replace the style of a text element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or not text, or the color is invalid.
    pub fn set_text_style(&mut self, id: ElementId, new_style: TextStyle) -> CanvasResult<()> {
        new_style.rgba()?;
        match &mut self.get_mut(id)?.kind {
            ElementKind::Text { style, .. } => {
                *style = new_style;
                Ok(())
            }
            ElementKind::Image { .. } => Err(CanvasError::InvalidOperation(format!(
                "element {id} is not text"
            ))),
        }
    }

    /// Set an element's z-index.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn set_z_index(&mut self, id: ElementId, z_index: i32) -> CanvasResult<()> {
        self.get_mut(id)?.z_index = z_index;
        Ok(())
    }

    /// Raise an element above all others.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn bring_to_front(&mut self, id: ElementId) -> CanvasResult<()> {
        self.get_mut(id)?;
        let z = self.z_above_all();
        self.set_z_index(id, z)
    }

    /// Lower an element below all others.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn send_to_back(&mut self, id: ElementId) -> CanvasResult<()> {
        self.get_mut(id)?;
        let z = match self.bottom_z().checked_sub(1) {
            Some(z) => z,
            None => {
                self.renumber_z();
                -1
            }
        };
        self.set_z_index(id, z)
    }

    /// Select an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn select(&mut self, id: ElementId) -> CanvasResult<()> {
        if self.contains(id) {
            self.selected = Some(id);
            Ok(())
        } else {
            Err(CanvasError::ElementNotFound(id.to_string()))
        }
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Currently selected element id.
    #[must_use]
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    /// Number of placed images.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_image()).count()
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Clamp a rectangle into this scene's bounds.
    #[must_use]
    pub fn clamp(&self, rect: Rect) -> Rect {
        clamp_rect(rect, self.size(), self.min_element_size)
    }

    fn top_z(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).max().unwrap_or(0)
    }

    fn bottom_z(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).min().unwrap_or(0)
    }

    /// A z-index above every element, renumbering first if `i32::MAX` is taken.
    fn z_above_all(&mut self) -> i32 {
        if let Some(z) = self.top_z().checked_add(1) {
            return z;
        }
        self.renumber_z();
        i32::try_from(self.elements.len()).unwrap_or(i32::MAX)
    }

    /// Rewrite z-indices as `0..n` in paint order.
    fn renumber_z(&mut self) {
        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by_key(|&i| self.elements[i].z_index);
        for (rank, i) in order.into_iter().enumerate() {
            self.elements[i].z_index = i32::try_from(rank).unwrap_or(i32::MAX);
        }
        tracing::debug!(count = self.elements.len(), "z-indices renumbered");
    }

    #[allow(clippy::cast_precision_loss)]
    fn cascade_position(&self) -> Point {
        let step = (self.elements.len() % 10) as f32 * CASCADE_STEP;
        Point::new(MIN_ELEMENT_SIZE + step, MIN_ELEMENT_SIZE + step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(scene: &Scene) -> ImageHandle {
        scene.load_image(vec![0u8; 4], Some("image/png".to_string()))
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new(800.0, 600.0);
        assert!(scene.is_empty());

        let id = scene
            .add_text("Hello", TextStyle::default(), Point::new(10.0, 10.0), Size::new(100.0, 50.0))
            .expect("add text");

        assert_eq!(scene.element_count(), 1);
        assert!(scene.get(id).is_some());

        scene.remove(id).expect("should remove");
        assert!(scene.is_empty());
        assert!(scene.remove(id).is_err());
    }

    #[test]
    fn test_image_cap() {
        let mut scene = Scene::new(800.0, 600.0);
        for _ in 0..3 {
            let h = handle(&scene);
            scene.add_image_default(h).expect("under cap");
        }
        let h = handle(&scene);
        assert_eq!(
            scene.add_image_default(h),
            Err(CanvasError::ImageLimitReached(3))
        );
        // Text is uncapped
        for _ in 0..5 {
            scene.add_text_default().expect("text");
        }
        assert_eq!(scene.image_count(), 3);
        assert_eq!(scene.element_count(), 8);
    }

    #[test]
    fn test_remove_releases_resource() {
        let mut scene = Scene::new(800.0, 600.0);
        let h = handle(&scene);
        let id = scene.add_image_default(h).expect("add");
        assert_eq!(scene.tracker().live(), 1);
        scene.remove(id).expect("remove");
        assert_eq!(scene.tracker().live(), 0);
    }

    #[test]
    fn test_clear_releases_all_resources() {
        let mut scene = Scene::new(800.0, 600.0);
        for _ in 0..3 {
            let h = handle(&scene);
            scene.add_image_default(h).expect("add");
        }
        scene.clear();
        assert_eq!(scene.tracker().live(), 0);
        assert_eq!(scene.tracker().released(), 3);
    }

    #[test]
    fn test_add_clamps_into_bounds() {
        let mut scene = Scene::new(800.0, 600.0);
        let id = scene
            .add_text("x", TextStyle::default(), Point::new(790.0, -5.0), Size::new(10.0, 60.0))
            .expect("add");
        let element = scene.get(id).expect("element");
        assert_eq!(element.rect(), Rect::new(750.0, 0.0, 50.0, 60.0));
    }

    #[test]
    fn test_paint_order_is_stable() {
        let mut scene = Scene::new(800.0, 600.0);
        let a = Element::text("a", TextStyle::default(), Point::default(), Size::new(60.0, 60.0))
            .with_z_index(1);
        let b = Element::text("b", TextStyle::default(), Point::default(), Size::new(60.0, 60.0))
            .with_z_index(0);
        let c = Element::text("c", TextStyle::default(), Point::default(), Size::new(60.0, 60.0))
            .with_z_index(1);
        let (ia, ib, ic) = (a.id, b.id, c.id);
        scene.add_element(a).expect("a");
        scene.add_element(b).expect("b");
        scene.add_element(c).expect("c");

        let order: Vec<_> = scene.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![ib, ia, ic]);
        assert_eq!(scene.element_at(Point::new(10.0, 10.0)), Some(ic));
    }

    #[test]
    fn test_front_and_back() {
        let mut scene = Scene::new(800.0, 600.0);
        let a = scene.add_text_default().expect("a");
        let b = scene.add_text_default().expect("b");
        scene.bring_to_front(a).expect("front");
        let order: Vec<_> = scene.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, a]);
        scene.send_to_back(a).expect("back");
        let order: Vec<_> = scene.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_z_extremes_renumber_instead_of_overflowing() {
        let mut scene = Scene::new(800.0, 600.0);
        let a = scene.add_text_default().expect("a");
        let b = scene.add_text_default().expect("b");
        scene.set_z_index(a, i32::MAX).expect("z");

        let c = scene.add_text_default().expect("c");
        let order: Vec<_> = scene.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, a, c]);

        scene.bring_to_front(a).expect("front");
        let order: Vec<_> = scene.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, c, a]);

        scene.set_z_index(b, i32::MIN).expect("z");
        scene.send_to_back(c).expect("back");
        let order: Vec<_> = scene.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![c, b, a]);
    }

    #[test]
    fn test_single_selection() {
        let mut scene = Scene::new(800.0, 600.0);
        let a = scene.add_text_default().expect("a");
        let b = scene.add_text_default().expect("b");
        scene.select(a).expect("select a");
        scene.select(b).expect("select b");
        assert_eq!(scene.selected(), Some(b));
        scene.remove(b).expect("remove");
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn test_text_setters_reject_images() {
        let mut scene = Scene::new(800.0, 600.0);
        let h = handle(&scene);
        let id = scene.add_image_default(h).expect("add");
        assert!(scene.set_text_content(id, "nope").is_err());
        let t = scene.add_text_default().expect("text");
        scene.set_text_content(t, "changed").expect("set");
        assert_eq!(scene.get(t).and_then(Element::text_content), Some("changed"));
        let bad = TextStyle {
            color: "blue".to_string(),
            ..TextStyle::default()
        };
        assert!(matches!(scene.set_text_style(t, bad), Err(CanvasError::InvalidColor(_))));
    }
}
