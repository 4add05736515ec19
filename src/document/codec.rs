//! JSON document encoding.
//!
//! Field names and shapes follow the drill format the editor has always
//! written, so existing saved drills load unchanged:
//!
//! - `timeline` is an object keyed by start time rendered as a string;
//! - a note event's `entityId` is the note's index in `notes`, a movement's is
//!   the entity id string;
//! - numbers written from form fields (`role`, `number`, `colour`,
//!   `duration`) may arrive as strings and are accepted either way;
//! - balls are stored as a count and get fresh ids on load; references to
//!   them are remapped onto the new ids in suffix order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer};

use crate::document::session::Document;
use crate::foundation::config::DrillConfig;
use crate::foundation::core::{Point, TimeKey, ensure_finite, ensure_finite_point};
use crate::foundation::error::{DrillError, DrillResult};
use crate::registry::entities::{EntityId, EntityKind, PlayerRole};
use crate::timeline::event::{EventKind, Motion, Movement, NoteCue, PassHeight};
use crate::timeline::notes::NoteId;

/// Serialized form of a [`Document`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillFile {
    /// Field viewport height in pixels.
    #[serde(deserialize_with = "lenient_f64")]
    pub height: f64,
    pub cones: Vec<ConeRecord>,
    pub players: Vec<PlayerRecord>,
    /// Number of balls; their ids are regenerated on load.
    #[serde(deserialize_with = "lenient_u32")]
    pub balls: u32,
    pub notes: Vec<NoteRecord>,
    pub setup_positions: BTreeMap<String, Point>,
    pub timeline: BTreeMap<String, Vec<EventRecord>>,
    /// Session duration bound.
    #[serde(deserialize_with = "lenient_f64")]
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConeRecord {
    pub id: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub colour: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub role: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub number: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub text: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub start_time: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub end_time: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Pass,
    Run,
    Note,
}

/// `entityId` of an event: an entity id for movements, a note index for notes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum EventRef {
    Entity(String),
    NoteIndex(u64),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: EventType,
    pub entity_id: EventRef,
    pub origin: Option<Point>,
    pub destination: Option<Point>,
    #[serde(deserialize_with = "lenient_f64")]
    pub start_time: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub end_time: f64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_u32"
    )]
    pub height: Option<u32>,
}

pub(crate) fn encode_string(doc: &Document) -> DrillResult<String> {
    let file = encode(doc)?;
    serde_json::to_string_pretty(&file)
        .map_err(|e| DrillError::serde(format!("encode drill JSON: {e}")))
}

pub(crate) fn decode_str(json: &str, config: DrillConfig) -> DrillResult<Document> {
    let file: DrillFile = serde_json::from_str(json)
        .map_err(|e| DrillError::serde(format!("parse drill JSON: {e}")))?;
    decode(file, config)
}

/// Snapshot a document into its serialized form.
pub fn encode(doc: &Document) -> DrillResult<DrillFile> {
    let mut timeline = BTreeMap::new();
    for (key, events) in doc.timeline.buckets() {
        let mut records = Vec::with_capacity(events.len());
        for ev in events {
            records.push(match &ev.kind {
                EventKind::Movement(m) => EventRecord {
                    kind: match m.motion {
                        Motion::Pass { .. } => EventType::Pass,
                        Motion::Run => EventType::Run,
                    },
                    entity_id: EventRef::Entity(m.entity.as_str().to_owned()),
                    origin: Some(m.origin),
                    destination: Some(m.destination),
                    start_time: m.start_time,
                    end_time: m.end_time,
                    height: match m.motion {
                        Motion::Pass { height } => Some(height.code()),
                        Motion::Run => None,
                    },
                },
                EventKind::Note(cue) => {
                    let index = doc.notes.position(cue.note).ok_or_else(|| {
                        DrillError::lookup(format!(
                            "event {} refers to missing note {}",
                            ev.id.0, cue.note.0
                        ))
                    })?;
                    EventRecord {
                        kind: EventType::Note,
                        entity_id: EventRef::NoteIndex(index as u64),
                        origin: None,
                        destination: None,
                        start_time: cue.start_time,
                        end_time: cue.end_time,
                        height: None,
                    }
                }
            });
        }
        timeline.insert(key.to_string(), records);
    }

    Ok(DrillFile {
        height: doc.field_height,
        cones: doc
            .registry
            .cones()
            .iter()
            .map(|c| ConeRecord {
                id: c.id.as_str().to_owned(),
                colour: c.colour,
            })
            .collect(),
        players: doc
            .registry
            .players()
            .iter()
            .map(|p| PlayerRecord {
                id: p.id.as_str().to_owned(),
                role: p.role.code(),
                number: p.number,
            })
            .collect(),
        balls: u32::try_from(doc.registry.balls().len())
            .map_err(|_| DrillError::validation("too many balls to encode"))?,
        notes: doc
            .notes
            .iter()
            .map(|n| NoteRecord {
                text: n.text.clone(),
                start_time: n.start_time,
                end_time: n.end_time,
            })
            .collect(),
        setup_positions: doc
            .setup_positions
            .iter()
            .map(|(id, p)| (id.as_str().to_owned(), *p))
            .collect(),
        timeline,
        duration: doc.duration,
    })
}

/// Build a document from its serialized form.
///
/// Entities are created through the registry first and then given their
/// saved ids and metadata. Any inconsistency fails the whole decode.
pub fn decode(file: DrillFile, config: DrillConfig) -> DrillResult<Document> {
    let height = ensure_finite(file.height, "document height")?;
    if height <= 0.0 {
        return Err(DrillError::validation("document height must be > 0"));
    }
    let duration = ensure_finite(file.duration, "document duration")?;
    if duration < 0.0 {
        return Err(DrillError::validation("document duration must be >= 0"));
    }

    let mut doc = Document::new(config);
    doc.field_height = height;
    doc.duration = duration;

    let mut seen = BTreeSet::new();
    for id in file
        .cones
        .iter()
        .map(|c| &c.id)
        .chain(file.players.iter().map(|p| &p.id))
    {
        if id.trim().is_empty() {
            return Err(DrillError::validation("entity id must be non-empty"));
        }
        if !seen.insert(id.as_str()) {
            return Err(DrillError::validation(format!("duplicate entity id '{id}'")));
        }
    }

    for _ in &file.cones {
        doc.registry.add_cone();
    }
    for (i, c) in file.cones.iter().enumerate() {
        doc.registry
            .reassign_cone(i, EntityId::new(c.id.clone()), c.colour)?;
    }
    for _ in &file.players {
        doc.registry.add_player();
    }
    for (i, p) in file.players.iter().enumerate() {
        doc.registry.reassign_player(
            i,
            EntityId::new(p.id.clone()),
            p.number,
            PlayerRole::from_code(p.role)?,
        )?;
    }

    let ball_ids: Vec<EntityId> = (0..file.balls).map(|_| doc.registry.add_ball()).collect();
    if let Some(clash) = ball_ids.iter().find(|b| seen.contains(b.as_str())) {
        return Err(DrillError::validation(format!(
            "entity id '{clash}' collides with a regenerated ball id"
        )));
    }
    let ball_map = remap_balls(&file, &seen, &ball_ids)?;
    let resolve = |raw: &str| -> EntityId {
        ball_map
            .get(raw)
            .cloned()
            .unwrap_or_else(|| EntityId::new(raw))
    };

    let mut note_ids: Vec<NoteId> = Vec::with_capacity(file.notes.len());
    for n in &file.notes {
        let start = ensure_finite(n.start_time, "note startTime")?;
        let end = ensure_finite(n.end_time, "note endTime")?;
        note_ids.push(doc.notes.push(n.text.clone(), start, end));
    }

    for (raw, p) in &file.setup_positions {
        let id = resolve(raw);
        if !doc.registry.contains(&id) {
            return Err(DrillError::validation(format!(
                "setup position for unknown entity '{raw}'"
            )));
        }
        let p = ensure_finite_point(*p, "setup position")?;
        doc.setup_positions.insert(id, p);
    }

    let mut buckets = Vec::with_capacity(file.timeline.len());
    for (raw_key, events) in &file.timeline {
        buckets.push((TimeKey::parse(raw_key)?, events));
    }
    buckets.sort_by_key(|(k, _)| *k);

    for (key, events) in buckets {
        for rec in events {
            let start = ensure_finite(rec.start_time, "event startTime")?;
            let end = ensure_finite(rec.end_time, "event endTime")?;
            if start != key.secs() {
                return Err(DrillError::validation(format!(
                    "event startTime {start} does not match its bucket '{key}'"
                )));
            }
            let kind = decode_event(rec, start, end, &note_ids, &resolve, &doc)?;
            doc.timeline.insert(kind)?;
        }
    }

    if let Some(end) = doc.timeline.latest_end() {
        doc.extend_duration(end);
    }
    doc.playhead = 0.0;
    doc.revision = 0;
    tracing::debug!(
        entities = doc.registry.len(),
        events = doc.timeline.len(),
        notes = doc.notes.len(),
        "document decoded"
    );
    Ok(doc)
}

fn decode_event(
    rec: &EventRecord,
    start: f64,
    end: f64,
    note_ids: &[NoteId],
    resolve: &impl Fn(&str) -> EntityId,
    doc: &Document,
) -> DrillResult<EventKind> {
    if rec.kind == EventType::Note {
        let &EventRef::NoteIndex(idx) = &rec.entity_id else {
            return Err(DrillError::validation(
                "note event entityId must be a note index",
            ));
        };
        let note = usize::try_from(idx)
            .ok()
            .and_then(|i| note_ids.get(i))
            .copied()
            .ok_or_else(|| {
                DrillError::validation(format!("note event refers to missing note {idx}"))
            })?;
        return Ok(EventKind::Note(NoteCue {
            note,
            start_time: start,
            end_time: end,
        }));
    }

    let EventRef::Entity(raw) = &rec.entity_id else {
        return Err(DrillError::validation(
            "movement entityId must be an entity id",
        ));
    };
    let entity = resolve(raw);
    let motion = match (rec.kind, doc.registry.kind_of(&entity)) {
        (EventType::Pass, Some(EntityKind::Ball)) => {
            let code = rec.height.unwrap_or(0);
            let height = PassHeight::from_code(code).ok_or_else(|| {
                DrillError::validation(format!("unknown pass height code {code}"))
            })?;
            Motion::Pass { height }
        }
        (EventType::Run, Some(EntityKind::Player)) => Motion::Run,
        (_, None) => {
            return Err(DrillError::validation(format!(
                "movement refers to unknown entity '{raw}'"
            )));
        }
        (kind, Some(entity_kind)) => {
            return Err(DrillError::validation(format!(
                "a {kind:?} cannot move {entity_kind:?} '{raw}'"
            )));
        }
    };
    let origin = rec
        .origin
        .ok_or_else(|| DrillError::validation(format!("movement of '{raw}' has no origin")))?;
    let destination = rec.destination.ok_or_else(|| {
        DrillError::validation(format!("movement of '{raw}' has no destination"))
    })?;
    Ok(EventKind::Movement(Movement {
        entity,
        motion,
        origin: ensure_finite_point(origin, "movement origin")?,
        destination: ensure_finite_point(destination, "movement destination")?,
        start_time: start,
        end_time: end,
    }))
}

/// Map every `ball-*` id referenced by the file onto the regenerated ball ids.
fn remap_balls(
    file: &DrillFile,
    known: &BTreeSet<&str>,
    ball_ids: &[EntityId],
) -> DrillResult<BTreeMap<String, EntityId>> {
    let mut refs: BTreeSet<&str> = BTreeSet::new();
    for raw in file.setup_positions.keys() {
        refs.insert(raw.as_str());
    }
    for rec in file.timeline.values().flatten() {
        if let EventRef::Entity(raw) = &rec.entity_id {
            refs.insert(raw.as_str());
        }
    }
    let mut refs: Vec<&str> = refs
        .into_iter()
        .filter(|r| r.starts_with("ball-") && !known.contains(r))
        .collect();
    refs.sort_by_key(|r| (EntityId::new(*r).numeric_suffix(), *r));

    if refs.len() > ball_ids.len() {
        return Err(DrillError::validation(format!(
            "document references {} balls but declares {}",
            refs.len(),
            ball_ids.len()
        )));
    }
    Ok(refs
        .into_iter()
        .zip(ball_ids.iter().cloned())
        .map(|(raw, id)| (raw.to_owned(), id))
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn into_f64(self) -> Result<f64, String> {
        match self {
            NumberOrString::Number(v) => Ok(v),
            NumberOrString::String(s) => s
                .trim()
                .parse()
                .map_err(|e| format!("'{s}' is not a number: {e}")),
        }
    }

    fn into_u32(self) -> Result<u32, String> {
        let v = self.into_f64()?;
        if v.fract() != 0.0 || v < 0.0 || v > f64::from(u32::MAX) {
            return Err(format!("{v} is not a non-negative integer"));
        }
        Ok(v as u32)
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    NumberOrString::deserialize(d)?
        .into_f64()
        .map_err(serde::de::Error::custom)
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    NumberOrString::deserialize(d)?
        .into_u32()
        .map_err(serde::de::Error::custom)
}

fn lenient_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Option::<NumberOrString>::deserialize(d)?
        .map(NumberOrString::into_u32)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
#[path = "../../tests/unit/document/codec.rs"]
mod tests;
