use std::collections::{BTreeMap, BTreeSet};

use crate::document::session::Document;
use crate::foundation::core::{Point, TimeKey, lerp_point, loft_radius};
use crate::foundation::error::{DrillError, DrillResult};
use crate::playback::renderer::SceneRenderer;
use crate::registry::entities::{EntityId, EntityKind};
use crate::timeline::event::{EventId, Movement, MovementKind, TimelineEvent};
use crate::timeline::notes::NoteId;

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Where an entity is drawn at the query time, and how big.
pub struct EntityPose {
    pub kind: EntityKind,
    pub position: Point,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Preview arrow for a move starting soon.
pub struct Indicator {
    pub entity: EntityId,
    pub event: EventId,
    pub kind: MovementKind,
    /// Start of the arrow, already pushed clear of the entity glyph.
    pub from: Point,
    pub to: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct IndicatorStyle {
    pub stroke: &'static str,
    /// Dash/gap lengths; `None` is a solid line.
    pub dash: Option<[f64; 2]>,
}

impl Indicator {
    pub fn style(&self) -> IndicatorStyle {
        match self.kind {
            MovementKind::Pass => IndicatorStyle {
                stroke: "white",
                dash: Some([6.0, 4.0]),
            },
            MovementKind::Run => IndicatorStyle {
                stroke: "black",
                dash: None,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CurrentNote {
    pub id: NoteId,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Everything needed to draw the field at one instant.
pub struct Scene {
    pub time: f64,
    /// Free dragging is allowed (time zero only).
    pub setup_mode: bool,
    pub poses: BTreeMap<EntityId, EntityPose>,
    /// Entities with a move started by the query time, plus those given a
    /// preview indicator.
    pub moving: BTreeSet<EntityId>,
    pub indicators: Vec<Indicator>,
    pub current_note: Option<CurrentNote>,
}

impl Scene {
    pub fn pose(&self, id: &EntityId) -> Option<&EntityPose> {
        self.poses.get(id)
    }

    /// Push this scene to a renderer, replacing whatever it showed before.
    pub fn present<R: SceneRenderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_drag_enabled(self.setup_mode);
        for (id, pose) in &self.poses {
            renderer.place_entity(id, pose.position);
            renderer.resize_entity(id, pose.radius);
        }
        renderer.clear_indicators();
        for indicator in &self.indicators {
            renderer.draw_indicator(indicator, indicator.style());
        }
        renderer.show_note(self.current_note.as_ref().map(|n| n.text.as_str()));
    }
}

/// Stateless scene evaluation; every query is recomputed from the document.
pub struct Playback;

impl Playback {
    #[tracing::instrument(skip(doc))]
    /// Compute the scene at `time`.
    ///
    /// Buckets are walked in ascending time up to `time`: elapsed moves snap
    /// to their destination, in-flight moves interpolate (lofted passes also
    /// grow the ball); either way the entity counts as moving. Buckets in the
    /// following look-ahead window then give each entity not yet moving one
    /// preview indicator.
    pub fn scene_at(doc: &Document, time: f64) -> DrillResult<Scene> {
        if !time.is_finite() || time < 0.0 {
            return Err(DrillError::playback(format!(
                "query time must be finite and >= 0, got {time}"
            )));
        }
        let cfg = doc.config();

        let mut poses: BTreeMap<EntityId, EntityPose> = doc
            .registry()
            .iter()
            .map(|(id, kind)| {
                let position = doc
                    .setup_positions()
                    .get(id)
                    .copied()
                    .unwrap_or_else(|| cfg.spawn(kind));
                (
                    id.clone(),
                    EntityPose {
                        kind,
                        position,
                        radius: cfg.glyph_radius(kind),
                    },
                )
            })
            .collect();
        let mut moving = BTreeSet::new();
        let mut indicators = Vec::new();

        if !doc.timeline().is_empty() {
            let mut last_key: Option<TimeKey> = None;
            for (key, events) in doc.timeline().buckets() {
                if key.secs() > time {
                    break;
                }
                last_key = Some(key);
                for (ev, m) in movements(events) {
                    let Some(pose) = poses.get_mut(&m.entity) else {
                        tracing::warn!(event = ev.id.0, entity = %m.entity, "skipping move of unknown entity");
                        continue;
                    };
                    let rest = cfg.glyph_radius(pose.kind);
                    if m.end_time < time {
                        pose.position = m.destination;
                        pose.radius = rest;
                    } else {
                        let p = m.progress_at(time);
                        pose.position = lerp_point(m.origin, m.destination, p);
                        pose.radius = if m.motion.is_lofted() {
                            loft_radius(cfg.ball_ground_radius, cfg.ball_air_radius, p)
                        } else {
                            rest
                        };
                    }
                    moving.insert(m.entity.clone());
                }
            }

            for (_, events) in doc
                .timeline()
                .buckets_between(last_key, time + cfg.lookahead)
            {
                for (ev, m) in movements(events) {
                    if moving.contains(&m.entity) {
                        continue;
                    }
                    let Some(pose) = poses.get(&m.entity) else {
                        tracing::warn!(event = ev.id.0, entity = %m.entity, "skipping preview of unknown entity");
                        continue;
                    };
                    moving.insert(m.entity.clone());
                    if let Some(indicator) = preview(ev.id, m, pose, cfg.indicator_margin) {
                        indicators.push(indicator);
                    }
                }
            }
        }

        let current_note = doc.notes().current_at(time).map(|n| CurrentNote {
            id: n.id,
            text: n.text.clone(),
        });

        Ok(Scene {
            time,
            setup_mode: time == 0.0,
            poses,
            moving,
            indicators,
            current_note,
        })
    }
}

fn movements(events: &[TimelineEvent]) -> impl Iterator<Item = (&TimelineEvent, &Movement)> {
    events
        .iter()
        .filter_map(|ev| ev.as_movement().map(|m| (ev, m)))
}

/// Arrow from the entity toward the move's destination, starting
/// `radius + margin` out from the entity centre. `None` when the destination
/// lies inside that offset.
fn preview(event: EventId, m: &Movement, pose: &EntityPose, margin: f64) -> Option<Indicator> {
    let delta = m.destination - pose.position;
    let distance = delta.hypot();
    let offset = pose.radius + margin;
    if distance <= offset {
        return None;
    }
    Some(Indicator {
        entity: m.entity.clone(),
        event,
        kind: m.motion.kind(),
        from: pose.position + delta * (offset / distance),
        to: m.destination,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scene.rs"]
mod tests;
