//! Hotspot editor instance.
//!
//! One [`Editor`] per editing canvas. It owns its own viewport controller,
//! hotspot store and gesture sessions, so several editors can live side by
//! side without sharing state.
//!
//! The host feeds it raw pointer, wheel and touch input in screen coordinates
//! and gets back [`EditorEvent`]s for the things it has to react to (opening
//! the edit dialog, marking the map as changed).

use crate::config::AppConfig;
use crate::format::{
    CsvFormat, ExportOptions, ExportResult, FormatError, HotspotFormat, ImportOptions,
    ImportResult,
};
use crate::geometry::{self, GeometryError, ImagePercent, Point, Rect, Size};
use crate::model::{Hotspot, HotspotId, HotspotPatch, ImageMap, MapId};
use crate::store::{HotspotStore, Marker};
use crate::viewport::{PointerButton, PointerTarget, ViewportConfig, ViewportController};

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A click on the image created a hotspot; the host should open its edit dialog.
    HotspotAdded { id: HotspotId },
    /// An existing hotspot was clicked without dragging.
    EditRequested { id: HotspotId },
    /// A hotspot drag finished.
    HotspotMoved {
        id: HotspotId,
        from: ImagePercent,
        to: ImagePercent,
    },
}

/// Hotspot drag interaction state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HotspotDragState {
    /// No hotspot is being manipulated
    #[default]
    Idle,
    /// Pressed on a hotspot; becomes a drag once the pointer travels past the threshold
    PotentialDrag {
        id: HotspotId,
        start_pos: Point,
        /// Marker centre minus pointer at press time, so the marker doesn't jump
        grab_offset: Point,
        original: ImagePercent,
    },
    /// Hotspot follows the pointer
    Dragging {
        id: HotspotId,
        grab_offset: Point,
        original: ImagePercent,
    },
}

impl HotspotDragState {
    pub fn is_active(&self) -> bool {
        !matches!(self, HotspotDragState::Idle)
    }

    /// Check if a hotspot is actually moving (past the threshold).
    pub fn is_dragging(&self) -> bool {
        matches!(self, HotspotDragState::Dragging { .. })
    }
}

/// One row of the hotspot side list.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotListEntry {
    pub id: HotspotId,
    /// Title, or "Hotspot N" for untitled hotspots.
    pub label: String,
    pub color: String,
    pub active: bool,
}

/// An editing canvas for one image map.
#[derive(Debug, Clone)]
pub struct Editor {
    viewport: ViewportController,
    store: HotspotStore,
    hotspot_drag: HotspotDragState,
    map_id: Option<MapId>,
    title: String,
    image_url: String,
    /// Preview shows the map as visitors see it; clicks don't create hotspots.
    preview: bool,
    hit_radius: f64,
    import_options: ImportOptions,
    export_options: ExportOptions,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl Editor {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_viewport(config.editor.clone(), config)
    }

    /// Editor using a custom viewport configuration and the rest of `config`.
    pub fn with_viewport(viewport: ViewportConfig, config: &AppConfig) -> Self {
        Self {
            viewport: ViewportController::new(viewport),
            store: HotspotStore::with_default_color(&config.hotspots.default_color),
            hotspot_drag: HotspotDragState::Idle,
            map_id: None,
            title: String::new(),
            image_url: String::new(),
            preview: false,
            hit_radius: config.hotspots.hit_radius,
            import_options: config.import_options(),
            export_options: config.csv.export_options(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn store(&self) -> &HotspotStore {
        &self.store
    }

    pub fn hotspot_drag(&self) -> &HotspotDragState {
        &self.hotspot_drag
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn zoom_label(&self) -> String {
        self.viewport.zoom_label()
    }

    /// Hotspots changed since the last [`Editor::mark_saved`].
    pub fn has_unsaved_changes(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn mark_saved(&mut self) {
        self.store.clear_dirty();
    }

    // ========================================================================
    // Map and image lifecycle
    // ========================================================================

    /// Replace the editor contents with a stored map.
    ///
    /// The image size is unknown until [`Editor::image_loaded`] is called.
    pub fn load_map(&mut self, map: ImageMap) {
        self.end_gestures();
        self.map_id = map.id;
        self.title = map.title;
        self.set_image(map.image_url);
        self.store.replace_all(map.hotspots);
        self.store.clear_dirty();
        log::info!(
            "Loaded map {:?} with {} hotspots",
            self.map_id,
            self.store.len()
        );
    }

    /// Snapshot the current state as a map value for persistence.
    pub fn to_image_map(&self) -> ImageMap {
        ImageMap {
            id: self.map_id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            hotspots: self.store.as_slice().to_vec(),
        }
    }

    /// Record the id assigned by persistence after the first save.
    pub fn set_map_id(&mut self, id: impl Into<MapId>) {
        self.map_id = Some(id.into());
    }

    /// Point the editor at a new image. Geometry is unavailable until it loads.
    pub fn set_image(&mut self, url: impl Into<String>) {
        self.image_url = url.into();
        self.end_gestures();
        self.viewport.clear_image();
    }

    /// The image finished loading; fits it into the container.
    pub fn image_loaded(&mut self, natural: Size) -> Result<(), GeometryError> {
        self.viewport.image_loaded(natural)
    }

    pub fn set_container(&mut self, container: Rect) {
        self.viewport.set_container(container);
    }

    /// Container was resized: re-fit the image if one is loaded.
    pub fn on_resize(&mut self, container: Rect) -> Result<(), GeometryError> {
        self.viewport.set_container(container);
        if self.viewport.natural_size().is_none() {
            return Ok(());
        }
        self.viewport.reset()
    }

    // ========================================================================
    // Preview
    // ========================================================================

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn set_preview(&mut self, preview: bool) {
        if preview {
            self.cancel_hotspot_drag();
        }
        self.preview = preview;
    }

    /// Flip preview mode and return the new state.
    pub fn toggle_preview(&mut self) -> bool {
        self.set_preview(!self.preview);
        self.preview
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// Button pressed. A primary press on a hotspot starts a hotspot drag session,
    /// anywhere else it starts a pan.
    pub fn pointer_down(&mut self, screen: Point, button: PointerButton) -> Result<(), GeometryError> {
        let natural = self.viewport.require_image()?;

        if button == PointerButton::Primary && !self.preview {
            let hit = self
                .store
                .hit_test(
                    screen,
                    self.viewport.state(),
                    natural,
                    self.viewport.container(),
                    self.hit_radius,
                    false,
                )?
                .map(|h| (h.id.clone(), h.position()));

            if let Some((id, original)) = hit {
                let marker = geometry::image_percent_to_screen(
                    original,
                    self.viewport.state(),
                    natural,
                    self.viewport.container(),
                )?;
                log::debug!("Potential drag on hotspot {}", id);
                self.hotspot_drag = HotspotDragState::PotentialDrag {
                    id,
                    start_pos: screen,
                    grab_offset: screen.delta_to(&marker),
                    original,
                };
                self.viewport
                    .pointer_down(screen, button, PointerTarget::Hotspot)?;
                return Ok(());
            }
        }

        self.viewport
            .pointer_down(screen, button, PointerTarget::Canvas)?;
        Ok(())
    }

    /// Pointer moved. Returns whether anything needs redrawing.
    pub fn pointer_move(&mut self, screen: Point) -> Result<bool, GeometryError> {
        if self.hotspot_drag.is_active() {
            return self.drag_hotspot_to(screen);
        }
        Ok(self.viewport.pointer_move(screen))
    }

    /// Button released.
    ///
    /// A release that ends a press without a drag is a click: on a hotspot it
    /// requests the edit dialog, on the image it creates a hotspot (unless in
    /// preview or outside the image).
    pub fn pointer_up(&mut self, screen: Point) -> Result<Option<EditorEvent>, GeometryError> {
        if self.hotspot_drag.is_active() {
            return Ok(self.finish_hotspot_drag());
        }

        match self.viewport.pointer_up() {
            Some(end) if !end.moved => self.click_canvas(screen),
            _ => Ok(None),
        }
    }

    /// Pointer cancelled by the host. Pans stay where they are; a hotspot drag
    /// is rolled back.
    pub fn pointer_cancel(&mut self) {
        self.cancel_hotspot_drag();
        self.viewport.pointer_cancel();
    }

    /// Wheel zoom at the pointer.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> Result<bool, GeometryError> {
        self.viewport.wheel(screen, delta_y)
    }

    pub fn double_click(&mut self, screen: Point) -> Result<bool, GeometryError> {
        self.viewport.double_click(screen)
    }

    pub fn zoom_in(&mut self) -> Result<bool, GeometryError> {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Result<bool, GeometryError> {
        self.viewport.zoom_out()
    }

    pub fn reset_view(&mut self) -> Result<(), GeometryError> {
        self.end_gestures();
        self.viewport.reset()
    }

    // ========================================================================
    // Touch input
    // ========================================================================

    /// Touches went down. A single touch behaves like a primary press.
    pub fn touch_start(&mut self, touches: &[Point]) -> Result<(), GeometryError> {
        match touches {
            [only] => self.pointer_down(*only, PointerButton::Primary),
            _ => {
                // A second finger turns any hotspot drag into a pinch
                self.cancel_hotspot_drag();
                self.viewport.touch_start(touches, PointerTarget::Canvas)?;
                Ok(())
            }
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) -> Result<bool, GeometryError> {
        match touches {
            [only] if self.hotspot_drag.is_active() => self.drag_hotspot_to(*only),
            _ => self.viewport.touch_move(touches),
        }
    }

    /// Last touch lifted at `screen`. Taps behave like clicks.
    pub fn touch_end(&mut self, screen: Point) -> Result<Option<EditorEvent>, GeometryError> {
        if self.hotspot_drag.is_active() {
            return Ok(self.finish_hotspot_drag());
        }
        match self.viewport.touch_end() {
            Some(end) if !end.moved => self.click_canvas(screen),
            _ => Ok(None),
        }
    }

    /// Drop every in-flight gesture (component teardown, focus loss).
    pub fn end_gestures(&mut self) {
        self.cancel_hotspot_drag();
        self.viewport.end_gestures();
    }

    fn click_canvas(&mut self, screen: Point) -> Result<Option<EditorEvent>, GeometryError> {
        if self.preview {
            return Ok(None);
        }
        let natural = self.viewport.require_image()?;
        let projection = geometry::screen_to_image_percent(
            screen,
            self.viewport.state(),
            natural,
            self.viewport.container(),
        )?;
        let Some(percent) = projection.inside() else {
            log::debug!("Click outside the image, no hotspot created");
            return Ok(None);
        };

        let id = self.store.add(percent.x, percent.y).id.clone();
        log::info!(
            "Created hotspot {} at ({:.2}%, {:.2}%)",
            id,
            percent.x,
            percent.y
        );
        Ok(Some(EditorEvent::HotspotAdded { id }))
    }

    fn drag_hotspot_to(&mut self, screen: Point) -> Result<bool, GeometryError> {
        let threshold = self.viewport.config().drag_threshold;

        if let HotspotDragState::PotentialDrag {
            id,
            start_pos,
            grab_offset,
            original,
        } = &self.hotspot_drag
        {
            if start_pos.distance_to(&screen) <= threshold {
                return Ok(false);
            }
            log::debug!("Starting drag on hotspot {}", id);
            self.hotspot_drag = HotspotDragState::Dragging {
                id: id.clone(),
                grab_offset: *grab_offset,
                original: *original,
            };
        }

        let HotspotDragState::Dragging {
            id, grab_offset, ..
        } = &self.hotspot_drag
        else {
            return Ok(false);
        };

        let natural = self.viewport.require_image()?;
        let target = Point::new(screen.x + grab_offset.x, screen.y + grab_offset.y);
        let percent = geometry::screen_to_image_percent(
            target,
            self.viewport.state(),
            natural,
            self.viewport.container(),
        )?
        .percent();

        // Store clamps, so dragging past the edge pins the hotspot to it
        Ok(self.store.move_hotspot(id, percent.x, percent.y))
    }

    fn finish_hotspot_drag(&mut self) -> Option<EditorEvent> {
        self.viewport.pointer_up();
        match std::mem::take(&mut self.hotspot_drag) {
            HotspotDragState::Idle => None,
            HotspotDragState::PotentialDrag { id, .. } => {
                // Hotspots still exist in preview, but there is nothing to edit
                if self.preview || self.store.get(&id).is_none() {
                    return None;
                }
                Some(EditorEvent::EditRequested { id })
            }
            HotspotDragState::Dragging { id, original, .. } => {
                let to = self.store.get(&id)?.position();
                log::info!(
                    "Moved hotspot {} to ({:.2}%, {:.2}%)",
                    id,
                    to.x,
                    to.y
                );
                Some(EditorEvent::HotspotMoved {
                    id,
                    from: original,
                    to,
                })
            }
        }
    }

    fn cancel_hotspot_drag(&mut self) {
        if let HotspotDragState::Dragging { id, original, .. } =
            std::mem::take(&mut self.hotspot_drag)
        {
            log::debug!("Hotspot drag on {} cancelled", id);
            self.store.move_hotspot(&id, original.x, original.y);
        }
    }

    // ========================================================================
    // Hotspot editing
    // ========================================================================

    /// Apply the edit dialog's changes. Unknown ids are ignored.
    pub fn update_hotspot(&mut self, id: &str, patch: &HotspotPatch) -> bool {
        self.store.update(id, patch)
    }

    pub fn remove_hotspot(&mut self, id: &str) -> Option<Hotspot> {
        let dragging_removed = matches!(
            &self.hotspot_drag,
            HotspotDragState::PotentialDrag { id: drag_id, .. }
            | HotspotDragState::Dragging { id: drag_id, .. } if drag_id == id
        );
        if dragging_removed {
            self.hotspot_drag = HotspotDragState::Idle;
        }
        self.store.remove(id)
    }

    /// Hotspot markers in screen space. Preview hides inactive ones.
    pub fn markers(&self) -> Result<Vec<Marker>, GeometryError> {
        let natural = self.viewport.require_image()?;
        self.store.markers(
            self.viewport.state(),
            natural,
            self.viewport.container(),
            self.preview,
        )
    }

    /// Side list entries ordered by `order`.
    pub fn hotspot_list(&self) -> Vec<HotspotListEntry> {
        self.store
            .sorted_by_order()
            .into_iter()
            .enumerate()
            .map(|(index, h)| HotspotListEntry {
                id: h.id.clone(),
                label: h.display_title(index),
                color: h.color.clone(),
                active: h.active,
            })
            .collect()
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    /// Decode hotspots with `format` and add them to the map.
    ///
    /// With `merge` the imported hotspots are appended, otherwise they replace
    /// the current ones. A decode yielding no hotspots (e.g. a blank or `null`
    /// JSON file) is rejected with `NoValidRows`. On error the map is left
    /// untouched. The returned result holds the hotspots as stored (with their
    /// assigned ids).
    pub fn import(
        &mut self,
        format: &dyn HotspotFormat,
        content: &str,
        merge: bool,
    ) -> Result<ImportResult, FormatError> {
        let options = self.import_options.clone().merge(merge);
        let mut result = format.decode(content, &options)?;
        if result.hotspots.is_empty() {
            return Err(FormatError::NoValidRows {
                skipped: result.skipped_rows,
            });
        }
        let imported = std::mem::take(&mut result.hotspots);
        let count = imported.len();

        self.end_gestures();
        if merge {
            self.store.extend(imported);
        } else {
            self.store.replace_all(imported);
        }
        let start = self.store.len() - count;
        result.hotspots = self.store.as_slice()[start..].to_vec();

        log::info!(
            "Imported {} hotspots via {} (merge: {}, skipped rows: {})",
            count,
            format.id(),
            merge,
            result.skipped_rows
        );
        Ok(result)
    }

    pub fn import_csv(&mut self, content: &str, merge: bool) -> Result<ImportResult, FormatError> {
        self.import(&CsvFormat, content, merge)
    }

    /// Encode the map's hotspots with `format` using the configured export options.
    pub fn export(&self, format: &dyn HotspotFormat) -> Result<ExportResult, FormatError> {
        format.encode(self.store.as_slice(), &self.export_options)
    }

    /// CSV export (active hotspots only).
    pub fn export_csv(&self) -> Result<ExportResult, FormatError> {
        self.export(&CsvFormat)
    }
}
