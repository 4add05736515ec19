use super::*;
use crate::document::session::Document;
use crate::foundation::config::DrillConfig;

#[derive(Debug, PartialEq)]
enum Call {
    Place(String, Point),
    Resize(String, f64),
    ClearIndicators,
    Indicator(String, &'static str, bool),
    Drag(bool),
    Note(Option<String>),
    ClearSchedule,
    Item(u64, Option<usize>),
    Cursor(f64),
}

#[derive(Default)]
struct Recording {
    calls: Vec<Call>,
}

impl SceneRenderer for Recording {
    fn place_entity(&mut self, id: &EntityId, at: Point) {
        self.calls.push(Call::Place(id.to_string(), at));
    }

    fn resize_entity(&mut self, id: &EntityId, radius: f64) {
        self.calls.push(Call::Resize(id.to_string(), radius));
    }

    fn clear_indicators(&mut self) {
        self.calls.push(Call::ClearIndicators);
    }

    fn draw_indicator(&mut self, indicator: &Indicator, style: IndicatorStyle) {
        self.calls.push(Call::Indicator(
            indicator.entity.to_string(),
            style.stroke,
            style.dash.is_some(),
        ));
    }

    fn set_drag_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::Drag(enabled));
    }

    fn show_note(&mut self, text: Option<&str>) {
        self.calls.push(Call::Note(text.map(str::to_owned)));
    }
}

impl ScheduleRenderer for Recording {
    fn clear_schedule(&mut self) {
        self.calls.push(Call::ClearSchedule);
    }

    fn draw_item(&mut self, item: &ScheduleItem) {
        self.calls.push(Call::Item(item.event.0, item.row));
    }

    fn draw_cursor(&mut self, x: f64) {
        self.calls.push(Call::Cursor(x));
    }
}

#[test]
fn scene_presents_in_draw_order() {
    let mut doc = Document::new(DrillConfig::default());
    let p = doc.add_player();
    let b = doc.add_ball();
    doc.set_setup_position(&p, Point::new(0.0, 0.0)).unwrap();
    doc.set_setup_position(&b, Point::new(200.0, 0.0)).unwrap();
    doc.add_pass(&b, 0.5, Point::new(200.0, 0.0), Point::new(200.0, 100.0))
        .unwrap();
    doc.add_note(0.0).unwrap();

    let mut r = Recording::default();
    doc.scene_at(0.0).unwrap().present(&mut r);

    assert_eq!(
        r.calls,
        vec![
            Call::Drag(true),
            Call::Place("ball-1".into(), Point::new(200.0, 0.0)),
            Call::Resize("ball-1".into(), 10.0),
            Call::Place("player-1".into(), Point::new(0.0, 0.0)),
            Call::Resize("player-1".into(), 16.0),
            Call::ClearIndicators,
            Call::Indicator("ball-1".into(), "white", true),
            Call::Note(Some("Note 1".into())),
        ]
    );
}

#[test]
fn leaving_setup_disables_drag_and_clears_note() {
    let mut doc = Document::new(DrillConfig::default());
    doc.add_player();
    let mut r = Recording::default();
    doc.scene_at(3.0).unwrap().present(&mut r);
    assert_eq!(r.calls.first(), Some(&Call::Drag(false)));
    assert_eq!(r.calls.last(), Some(&Call::Note(None)));
    assert!(!r.calls.iter().any(|c| matches!(c, Call::Indicator(..))));
}

#[test]
fn schedule_presents_items_then_cursor() {
    let mut doc = Document::new(DrillConfig::default());
    let p = doc.add_player();
    let first = doc
        .add_run(&p, 0.0, Point::new(0.0, 0.0), Point::new(96.0, 0.0))
        .unwrap();
    let second = doc
        .add_run(&p, 0.5, Point::new(0.0, 0.0), Point::new(96.0, 0.0))
        .unwrap();

    let mut r = Recording::default();
    doc.layout(1000.0).unwrap().present(5.0, &mut r);
    assert_eq!(
        r.calls,
        vec![
            Call::ClearSchedule,
            Call::Item(first.0, Some(0)),
            Call::Item(second.0, Some(1)),
            Call::Cursor(500.0),
        ]
    );
}
