use super::*;
use crate::foundation::config::DrillConfig;
use crate::foundation::core::Point;
use crate::registry::entities::EntityId;
use crate::timeline::event::MovementKind;

fn doc_with_players(n: usize) -> (Document, Vec<EntityId>) {
    let mut doc = Document::new(DrillConfig::default());
    let ids = (0..n).map(|_| doc.add_player()).collect();
    (doc, ids)
}

/// Run of exactly `secs` seconds (player speed is 96 px/s by default).
fn run(doc: &mut Document, who: &EntityId, start: f64, secs: f64) -> EventId {
    doc.add_movement(
        MovementKind::Run,
        who,
        start,
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        100.0 / secs,
    )
    .unwrap()
}

#[test]
fn overlapping_moves_take_new_rows() {
    let (mut doc, ids) = doc_with_players(3);
    let a = run(&mut doc, &ids[0], 0.0, 2.0);
    let b = run(&mut doc, &ids[1], 1.0, 2.0);
    let c = run(&mut doc, &ids[2], 2.5, 1.5);

    let layout = doc.layout(1000.0).unwrap();
    assert_eq!(layout.item(a).unwrap().row, Some(0));
    assert_eq!(layout.item(b).unwrap().row, Some(1));
    assert_eq!(layout.item(c).unwrap().row, Some(0));
    assert_eq!(layout.row_count, 2);
}

#[test]
fn touching_intervals_clash() {
    let (mut doc, ids) = doc_with_players(1);
    run(&mut doc, &ids[0], 0.0, 2.0);
    let next = run(&mut doc, &ids[0], 2.0, 1.0);
    assert_eq!(doc.layout(100.0).unwrap().item(next).unwrap().row, Some(1));
}

#[test]
fn pixel_spans_scale_with_duration() {
    let (mut doc, ids) = doc_with_players(2);
    let a = run(&mut doc, &ids[0], 0.0, 2.0);
    let b = run(&mut doc, &ids[1], 1.0, 4.0);

    let layout = doc.layout(1000.0).unwrap();
    assert_eq!(layout.duration, 10.0);
    let ia = layout.item(a).unwrap();
    assert_eq!((ia.x_start, ia.x_end), (0.0, 200.0));
    assert_eq!(ia.y, 0.0);
    assert_eq!(ia.glyph, ScheduleGlyph::Run);
    let ib = layout.item(b).unwrap();
    assert_eq!((ib.x_start, ib.x_end), (100.0, 500.0));
    assert_eq!(ib.y, doc.config().row_height);
}

#[test]
fn notes_get_their_own_lane() {
    let mut doc = Document::new(DrillConfig::default());
    let ball = doc.add_ball();
    let pass = doc
        .add_movement(
            MovementKind::Pass,
            &ball,
            0.0,
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            50.0,
        )
        .unwrap();
    assert_eq!(doc.layout(500.0).unwrap().item(pass).unwrap().y, 0.0);

    let note = doc.add_note(5.0).unwrap();
    let layout = doc.layout(500.0).unwrap();
    assert_eq!(layout.lane_offset, doc.config().note_lane_height);
    let n = layout.item(note).unwrap();
    assert_eq!(n.glyph, ScheduleGlyph::Note);
    assert_eq!(n.row, None);
    assert_eq!((n.x_start, n.x_end), (250.0, 250.0));
    let p = layout.item(pass).unwrap();
    assert_eq!(p.glyph, ScheduleGlyph::Pass);
    assert_eq!(p.y, doc.config().note_lane_height);
    assert_eq!(layout.row_count, 1);
}

#[test]
fn rows_never_hold_overlapping_moves() {
    let (mut doc, ids) = doc_with_players(4);
    let mut seed = 7u64;
    for i in 0..60 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let start = (seed >> 33) as f64 % 40.0 / 4.0;
        let secs = 0.25 + (seed >> 20) as f64 % 12.0 / 4.0;
        run(&mut doc, &ids[i % ids.len()], start, secs);
    }

    let layout = doc.layout(800.0).unwrap();
    assert_eq!(layout.items.len(), 60);
    for (i, a) in layout.items.iter().enumerate() {
        for b in &layout.items[i + 1..] {
            if a.row == b.row {
                assert!(
                    a.end_time < b.start_time || b.end_time < a.start_time,
                    "{a:?} overlaps {b:?}"
                );
            }
        }
    }
}

#[test]
fn layout_is_recomputed_after_edits() {
    let (mut doc, ids) = doc_with_players(2);
    let a = run(&mut doc, &ids[0], 0.0, 2.0);
    let b = run(&mut doc, &ids[1], 1.0, 2.0);
    assert_eq!(doc.layout(100.0).unwrap().item(b).unwrap().row, Some(1));

    doc.delete_event(a).unwrap();
    let layout = doc.layout(100.0).unwrap();
    assert!(layout.item(a).is_none());
    assert_eq!(layout.item(b).unwrap().row, Some(0));
}

#[test]
fn zero_duration_maps_everything_to_origin() {
    let cfg = DrillConfig {
        initial_duration: 0.0,
        ..DrillConfig::default()
    };
    let doc = Document::new(cfg);
    let layout = doc.layout(640.0).unwrap();
    assert!(layout.items.is_empty());
    assert_eq!(layout.x_for(3.0), 0.0);
}

#[test]
fn invalid_width_is_rejected() {
    let doc = Document::default();
    assert!(matches!(
        doc.layout(-1.0).unwrap_err(),
        DrillError::Validation(_)
    ));
    assert!(doc.layout(f64::INFINITY).is_err());
}

#[test]
fn packer_reuses_first_free_row() {
    let mut rows = RowPacker::default();
    assert_eq!(rows.place(0.0, 1.0), 0);
    assert_eq!(rows.place(0.5, 2.0), 1);
    assert_eq!(rows.place(0.2, 0.4), 2);
    assert_eq!(rows.place(1.5, 3.0), 0);
    assert_eq!(rows.len(), 3);
}
