use super::*;
use crate::timeline::event::TimelineEvent;

const LEGACY: &str = r#"{
  "height": 520,
  "cones": [{"id": "cone-1", "colour": "2"}],
  "players": [
    {"id": "player-1", "role": "1", "number": "7"},
    {"id": "player-3", "role": 0, "number": 10}
  ],
  "balls": 1,
  "notes": [
    {"text": "Go", "startTime": 0, "endTime": 3.9},
    {"text": "Shoot", "startTime": 4, "endTime": "10"}
  ],
  "setupPositions": {
    "player-1": {"x": 10, "y": 20},
    "ball-2": {"x": 5, "y": 5}
  },
  "timeline": {
    "0": [
      {"type": "note", "entityId": 0, "origin": null, "destination": null, "startTime": 0, "endTime": 3.9}
    ],
    "10": [
      {"type": "run", "entityId": "player-3", "origin": {"x": 0, "y": 0}, "destination": {"x": 96, "y": 0}, "startTime": 10, "endTime": 11}
    ],
    "1.5": [
      {"type": "pass", "entityId": "ball-2", "origin": {"x": 5, "y": 5}, "destination": {"x": 133, "y": 5}, "startTime": 1.5, "endTime": 2.5, "height": "1"}
    ],
    "4": [
      {"type": "note", "entityId": 1, "startTime": 4, "endTime": 10}
    ]
  },
  "duration": "10"
}"#;

fn legacy() -> Document {
    decode_str(LEGACY, DrillConfig::default()).unwrap()
}

#[test]
fn legacy_file_loads_with_string_numbers() {
    let doc = legacy();
    assert_eq!(doc.field_height(), 520.0);
    assert_eq!(doc.registry().cones()[0].colour, 2);
    let players = doc.registry().players();
    assert_eq!(players[0].id.as_str(), "player-1");
    assert_eq!(players[0].number, 7);
    assert_eq!(players[0].role, PlayerRole::Defender);
    assert_eq!(players[1].id.as_str(), "player-3");
    assert_eq!(players[1].role, PlayerRole::Attacker);
    assert_eq!(doc.notes().len(), 2);
    assert_eq!(doc.playhead(), 0.0);
    assert_eq!(doc.revision(), 0);
}

#[test]
fn latest_event_end_extends_duration() {
    assert_eq!(legacy().duration(), 11.0);
}

#[test]
fn ball_references_are_remapped() {
    let doc = legacy();
    let ball = EntityId::from("ball-1");
    assert!(doc.registry().contains(&ball));
    assert_eq!(
        doc.setup_positions().get(&ball),
        Some(&Point::new(5.0, 5.0))
    );
    let pass = doc
        .timeline()
        .iter()
        .find_map(TimelineEvent::as_movement)
        .unwrap();
    assert_eq!(pass.entity, ball);
    assert_eq!(
        pass.motion,
        Motion::Pass {
            height: PassHeight::Lofted
        }
    );
}

#[test]
fn buckets_are_ordered_numerically() {
    let doc = legacy();
    let keys: Vec<f64> = doc.timeline().keys().map(TimeKey::secs).collect();
    assert_eq!(keys, vec![0.0, 1.5, 4.0, 10.0]);
}

#[test]
fn note_events_bind_to_notes_by_index() {
    let doc = legacy();
    let texts: Vec<&str> = doc
        .timeline()
        .iter()
        .filter_map(TimelineEvent::as_note)
        .map(|cue| doc.notes().get(cue.note).unwrap().text.as_str())
        .collect();
    assert_eq!(texts, vec!["Go", "Shoot"]);
}

#[test]
fn new_entities_do_not_reuse_loaded_ids() {
    let mut doc = legacy();
    assert_eq!(doc.add_player().as_str(), "player-4");
    assert_eq!(doc.add_cone().as_str(), "cone-2");
    assert_eq!(doc.add_ball().as_str(), "ball-2");
}

#[test]
fn encode_writes_original_shape() {
    let doc = legacy();
    let file = encode(&doc).unwrap();
    assert_eq!(file.balls, 1);
    let keys: Vec<&str> = file.timeline.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["0", "1.5", "10", "4"]);
    assert_eq!(file.timeline["0"][0].entity_id, EventRef::NoteIndex(0));
    assert_eq!(file.timeline["1.5"][0].height, Some(1));
    assert_eq!(file.timeline["10"][0].height, None);
    assert!(file.setup_positions.contains_key("ball-1"));

    let json: serde_json::Value = serde_json::from_str(&encode_string(&doc).unwrap()).unwrap();
    assert!(json["setupPositions"].is_object());
    assert_eq!(json["timeline"]["1.5"][0]["type"], "pass");
    assert_eq!(json["timeline"]["1.5"][0]["entityId"], "ball-1");
    assert!(json["timeline"]["10"][0].get("height").is_none());
    assert_eq!(json["notes"][1]["startTime"], 4.0);
}

#[test]
fn note_indices_follow_deletions() {
    let mut doc = Document::new(DrillConfig::default());
    let a = doc.add_note(0.0).unwrap();
    doc.add_note(3.0).unwrap();
    doc.add_note(6.0).unwrap();
    doc.delete_event(a).unwrap();

    let file = encode(&doc).unwrap();
    assert_eq!(file.notes.len(), 2);
    assert_eq!(file.timeline["3"][0].entity_id, EventRef::NoteIndex(0));
    assert_eq!(file.timeline["6"][0].entity_id, EventRef::NoteIndex(1));
}

#[test]
fn reencoding_is_stable() {
    let once = encode_string(&legacy()).unwrap();
    let twice = encode_string(&decode_str(&once, DrillConfig::default()).unwrap()).unwrap();
    assert_eq!(once, twice);
}

fn with(patch: impl FnOnce(&mut serde_json::Value)) -> DrillResult<Document> {
    let mut v: serde_json::Value = serde_json::from_str(LEGACY).unwrap();
    patch(&mut v);
    decode_str(&v.to_string(), DrillConfig::default())
}

fn is_validation(r: DrillResult<Document>) -> bool {
    matches!(r, Err(DrillError::Validation(_)))
}

#[test]
fn missing_fields_are_serde_errors() {
    let r = with(|v| {
        v.as_object_mut().unwrap().remove("notes");
    });
    assert!(matches!(r, Err(DrillError::Serde(_))));
    let r = with(|v| v["players"][0]["number"] = "seven".into());
    assert!(matches!(r, Err(DrillError::Serde(_))));
}

#[test]
fn unknown_entity_in_timeline_is_rejected() {
    assert!(is_validation(with(|v| {
        v["timeline"]["10"][0]["entityId"] = "player-9".into();
    })));
}

#[test]
fn out_of_range_note_index_is_rejected() {
    assert!(is_validation(with(|v| {
        v["timeline"]["4"][0]["entityId"] = 5.into();
    })));
}

#[test]
fn bucket_key_must_match_start_time() {
    assert!(is_validation(with(|v| {
        v["timeline"]["10"][0]["startTime"] = 9.into();
    })));
    assert!(is_validation(with(|v| {
        let t = v["timeline"].as_object_mut().unwrap();
        let events = t.remove("10").unwrap();
        t.insert("ten".into(), events);
    })));
}

#[test]
fn movement_kind_must_match_entity() {
    assert!(is_validation(with(|v| {
        v["timeline"]["10"][0]["type"] = "pass".into();
    })));
}

#[test]
fn movement_needs_origin() {
    assert!(is_validation(with(|v| {
        v["timeline"]["10"][0]["origin"] = serde_json::Value::Null;
    })));
}

#[test]
fn backwards_movement_loads_as_instant() {
    let doc = with(|v| v["timeline"]["10"][0]["endTime"] = 9.into()).unwrap();
    let scene = doc.scene_at(10.0).unwrap();
    assert_eq!(
        scene.pose(&EntityId::from("player-3")).unwrap().position,
        Point::new(96.0, 0.0)
    );
}

#[test]
fn duplicate_ids_are_rejected() {
    assert!(is_validation(with(|v| {
        v["players"][1]["id"] = "cone-1".into();
    })));
}

#[test]
fn more_ball_references_than_balls_is_rejected() {
    assert!(is_validation(with(|v| {
        v["setupPositions"]["ball-7"] = serde_json::json!({"x": 1, "y": 1});
    })));
}

#[test]
fn setup_position_for_unknown_entity_is_rejected() {
    assert!(is_validation(with(|v| {
        v["setupPositions"]["cone-9"] = serde_json::json!({"x": 1, "y": 1});
    })));
}

#[test]
fn bad_role_or_height_is_rejected() {
    assert!(with(|v| v["players"][0]["role"] = 9.into()).is_err());
    assert!(is_validation(with(|v| {
        v["timeline"]["1.5"][0]["height"] = 4.into();
    })));
    assert!(is_validation(with(|v| v["height"] = 0.into())));
}

#[test]
fn clipped_notes_may_end_before_they_start() {
    let doc = with(|v| v["notes"][0]["endTime"] = (-0.1).into()).unwrap();
    assert_eq!(doc.notes().iter().next().unwrap().end_time, -0.1);
}

#[test]
fn huge_loaded_suffix_fails_the_load() {
    let json = LEGACY.replace("player-3", "player-4294967295");
    assert!(matches!(
        decode_str(&json, DrillConfig::default()),
        Err(DrillError::Validation(_))
    ));

    let json = LEGACY.replace("player-3", "player-4294967294");
    let mut doc = decode_str(&json, DrillConfig::default()).unwrap();
    assert_eq!(doc.add_player().as_str(), "player-4294967295");
}

#[test]
fn ids_loaded_under_another_kind_are_not_regenerated() {
    let mut doc = with(|v| v["cones"][0]["id"] = "player-5".into()).unwrap();
    assert_eq!(doc.add_player().as_str(), "player-6");
    assert_eq!(doc.add_cone().as_str(), "cone-2");
}
