use crate::document::session::Document;
use crate::foundation::core::ensure_finite;
use crate::foundation::error::{DrillError, DrillResult};
use crate::playback::renderer::ScheduleRenderer;
use crate::timeline::event::{EventId, EventKind, Motion};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleGlyph {
    Pass,
    Run,
    Note,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One event placed on the schedule strip.
pub struct ScheduleItem {
    pub event: EventId,
    pub glyph: ScheduleGlyph,
    pub start_time: f64,
    pub end_time: f64,
    /// Horizontal pixel span; notes collapse to their start.
    pub x_start: f64,
    pub x_end: f64,
    /// Packed row for movements; notes live in their own lane.
    pub row: Option<usize>,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScheduleLayout {
    pub width: f64,
    pub duration: f64,
    /// Vertical offset of movement row 0 (non-zero once any note exists).
    pub lane_offset: f64,
    pub row_count: usize,
    /// Items in timeline order.
    pub items: Vec<ScheduleItem>,
}

impl ScheduleLayout {
    /// Horizontal pixel of time `t`.
    pub fn x_for(&self, t: f64) -> f64 {
        time_to_x(self.width, self.duration, t)
    }

    pub fn item(&self, event: EventId) -> Option<&ScheduleItem> {
        self.items.iter().find(|i| i.event == event)
    }

    /// Redraw the whole strip and the playhead cursor.
    pub fn present<R: ScheduleRenderer + ?Sized>(&self, playhead: f64, renderer: &mut R) {
        renderer.clear_schedule();
        for item in &self.items {
            renderer.draw_item(item);
        }
        renderer.draw_cursor(self.x_for(playhead));
    }
}

#[tracing::instrument(skip(doc))]
/// Lay out every timeline event for a strip `width` pixels wide spanning
/// the session duration.
///
/// Movements are packed greedily into the lowest row whose intervals they do
/// not overlap, in timeline order. Notes are not packed; they sit in a lane
/// above the rows, which are pushed down by the note lane height once any
/// note exists. The result depends only on the document and `width`.
pub fn layout_schedule(doc: &Document, width: f64) -> DrillResult<ScheduleLayout> {
    let width = ensure_finite(width, "layout width")?;
    if width < 0.0 {
        return Err(DrillError::validation("layout width must be >= 0"));
    }
    let cfg = doc.config();
    let duration = doc.duration();
    let lane_offset = if doc.notes().is_empty() {
        0.0
    } else {
        cfg.note_lane_height
    };

    let mut rows = RowPacker::default();
    let mut items = Vec::with_capacity(doc.timeline().len());
    for ev in doc.timeline().iter() {
        let (start, end) = (ev.start_time(), ev.end_time());
        let item = match &ev.kind {
            EventKind::Note(_) => {
                let x = time_to_x(width, duration, start);
                ScheduleItem {
                    event: ev.id,
                    glyph: ScheduleGlyph::Note,
                    start_time: start,
                    end_time: end,
                    x_start: x,
                    x_end: x,
                    row: None,
                    y: 0.0,
                }
            }
            EventKind::Movement(m) => {
                let row = rows.place(start, end);
                ScheduleItem {
                    event: ev.id,
                    glyph: match m.motion {
                        Motion::Pass { .. } => ScheduleGlyph::Pass,
                        Motion::Run => ScheduleGlyph::Run,
                    },
                    start_time: start,
                    end_time: end,
                    x_start: time_to_x(width, duration, start),
                    x_end: time_to_x(width, duration, end),
                    row: Some(row),
                    y: row as f64 * cfg.row_height + lane_offset,
                }
            }
        };
        items.push(item);
    }

    Ok(ScheduleLayout {
        width,
        duration,
        lane_offset,
        row_count: rows.len(),
        items,
    })
}

/// Greedy interval packing. Two closed intervals clash unless one ends
/// strictly before the other starts.
#[derive(Debug, Default)]
pub(crate) struct RowPacker {
    rows: Vec<Vec<(f64, f64)>>,
}

impl RowPacker {
    pub(crate) fn place(&mut self, start: f64, end: f64) -> usize {
        let free = self
            .rows
            .iter()
            .position(|slots| !slots.iter().any(|&(s, e)| !(e < start || s > end)));
        let row = match free {
            Some(row) => row,
            None => {
                self.rows.push(Vec::new());
                self.rows.len() - 1
            }
        };
        self.rows[row].push((start, end));
        row
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

fn time_to_x(width: f64, duration: f64, t: f64) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    width * t / duration
}

#[cfg(test)]
#[path = "../../tests/unit/layout/schedule.rs"]
mod tests;
