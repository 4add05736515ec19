use crate::foundation::core::Point;
use crate::layout::schedule::ScheduleItem;
use crate::playback::scene::{Indicator, IndicatorStyle};
use crate::registry::entities::EntityId;

/// Drawing surface for the field. The engine only decides what to show;
/// implementors own the visuals.
pub trait SceneRenderer {
    /// Move an entity's glyph to `at` (field coordinates).
    fn place_entity(&mut self, id: &EntityId, at: Point);

    fn resize_entity(&mut self, id: &EntityId, radius: f64);

    /// Remove every indicator drawn by a previous scene.
    fn clear_indicators(&mut self);

    fn draw_indicator(&mut self, indicator: &Indicator, style: IndicatorStyle);

    /// Toggle free dragging of entities.
    fn set_drag_enabled(&mut self, enabled: bool);

    /// Show the current note text, or clear it with `None`.
    fn show_note(&mut self, text: Option<&str>);
}

/// Drawing surface for the schedule strip under the field.
pub trait ScheduleRenderer {
    fn clear_schedule(&mut self);

    fn draw_item(&mut self, item: &ScheduleItem);

    /// Playhead marker at horizontal pixel `x`.
    fn draw_cursor(&mut self, x: f64);
}

#[cfg(test)]
#[path = "../../tests/unit/playback/renderer.rs"]
mod tests;
