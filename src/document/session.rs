use std::collections::BTreeMap;
use std::path::Path;

use crate::foundation::config::DrillConfig;
use crate::foundation::core::{Point, ensure_finite, ensure_finite_point};
use crate::foundation::error::{DrillError, DrillResult};
use crate::layout::schedule::{ScheduleLayout, layout_schedule};
use crate::playback::scene::{Playback, Scene};
use crate::registry::entities::{EntityId, EntityKind, EntityRegistry, PlayerRole};
use crate::timeline::event::{
    EventId, EventKind, Motion, Movement, MovementKind, NoteCue, PassHeight, TimelineEvent,
};
use crate::timeline::notes::NoteBook;
use crate::timeline::store::TimelineStore;

/// One drill being edited: entities, their setup layout, the timeline and
/// its notes.
///
/// Every authoring operation goes through this type. Layout and playback
/// are pure reads ([`Document::layout`], [`Document::scene_at`]) and are
/// recomputed from scratch on each call; [`Document::revision`] changes
/// whenever something they depend on does.
#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) config: DrillConfig,
    pub(crate) registry: EntityRegistry,
    pub(crate) setup_positions: BTreeMap<EntityId, Point>,
    pub(crate) timeline: TimelineStore,
    pub(crate) notes: NoteBook,
    pub(crate) duration: f64,
    pub(crate) field_height: f64,
    pub(crate) playhead: f64,
    pub(crate) revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DrillConfig::default())
    }
}

impl Document {
    /// An empty document.
    pub fn new(config: DrillConfig) -> Self {
        Self {
            duration: config.initial_duration,
            field_height: config.field_height,
            config,
            registry: EntityRegistry::new(),
            setup_positions: BTreeMap::new(),
            timeline: TimelineStore::new(),
            notes: NoteBook::new(),
            playhead: 0.0,
            revision: 0,
        }
    }

    /// A fresh document with one player and one ball, ready to author.
    pub fn starter(config: DrillConfig) -> Self {
        let mut doc = Self::new(config);
        doc.add_player();
        doc.add_ball();
        doc
    }

    /// Drop all content, keeping the config.
    pub fn reset(&mut self) {
        let revision = self.revision + 1;
        *self = Self::new(self.config.clone());
        self.revision = revision;
        tracing::debug!("document reset");
    }

    /// Replace this document with one decoded from `json`.
    ///
    /// On failure nothing is changed.
    pub fn load(&mut self, json: &str) -> DrillResult<()> {
        let mut loaded = crate::document::codec::decode_str(json, self.config.clone())?;
        loaded.revision = self.revision + 1;
        *self = loaded;
        Ok(())
    }

    pub fn from_json(json: &str, config: DrillConfig) -> DrillResult<Self> {
        crate::document::codec::decode_str(json, config)
    }

    pub fn from_path(path: impl AsRef<Path>, config: DrillConfig) -> DrillResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DrillError::validation(format!("read drill JSON '{}': {e}", path.display()))
        })?;
        Self::from_json(&json, config)
    }

    /// Encode into the document JSON format.
    pub fn save(&self) -> DrillResult<String> {
        crate::document::codec::encode_string(self)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> DrillResult<()> {
        let path = path.as_ref();
        let json = self.save()?;
        std::fs::write(path, json).map_err(|e| {
            DrillError::Other(anyhow::Error::new(e).context(format!(
                "write drill JSON '{}'",
                path.display()
            )))
        })
    }

    pub fn config(&self) -> &DrillConfig {
        &self.config
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn timeline(&self) -> &TimelineStore {
        &self.timeline
    }

    pub fn notes(&self) -> &NoteBook {
        &self.notes
    }

    pub fn setup_positions(&self) -> &BTreeMap<EntityId, Point> {
        &self.setup_positions
    }

    /// Upper bound of the playback timeline.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn field_height(&self) -> f64 {
        self.field_height
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Setup mode (free dragging) is only active at time zero.
    pub fn in_setup(&self) -> bool {
        self.playhead == 0.0
    }

    pub fn set_field_height(&mut self, height: f64) -> DrillResult<()> {
        let height = ensure_finite(height, "field height")?;
        if height <= 0.0 {
            return Err(DrillError::validation("field height must be > 0"));
        }
        self.field_height = height;
        self.touch();
        Ok(())
    }

    pub fn add_player(&mut self) -> EntityId {
        self.touch();
        self.registry.add_player()
    }

    pub fn add_cone(&mut self) -> EntityId {
        self.touch();
        self.registry.add_cone()
    }

    pub fn add_ball(&mut self) -> EntityId {
        self.touch();
        self.registry.add_ball()
    }

    pub fn set_player_number(&mut self, id: &EntityId, number: u32) -> DrillResult<()> {
        self.registry.set_player_number(id, number)?;
        self.touch();
        Ok(())
    }

    pub fn set_player_role(&mut self, id: &EntityId, role: PlayerRole) -> DrillResult<()> {
        self.registry.set_player_role(id, role)?;
        self.touch();
        Ok(())
    }

    pub fn set_cone_colour(&mut self, id: &EntityId, colour: u32) -> DrillResult<()> {
        self.registry.set_cone_colour(id, colour)?;
        self.touch();
        Ok(())
    }

    /// Delete an entity and every reference to it: its setup position and
    /// all timeline events that move it. Returns how many events were purged.
    pub fn delete_entity(&mut self, id: &EntityId) -> DrillResult<usize> {
        let kind = self.registry.remove(id)?;
        self.setup_positions.remove(id);
        let purged = self.timeline.retain(|e| e.entity() != Some(id));
        tracing::debug!(%id, ?kind, purged = purged.len(), "entity deleted");
        self.touch();
        Ok(purged.len())
    }

    /// Move an entity during setup. Rejected once the playhead left zero.
    pub fn drag_entity(&mut self, id: &EntityId, to: Point) -> DrillResult<()> {
        if !self.in_setup() {
            return Err(DrillError::validation(
                "entities can only be dragged at time zero",
            ));
        }
        self.set_setup_position(id, to)
    }

    pub fn set_setup_position(&mut self, id: &EntityId, to: Point) -> DrillResult<()> {
        let to = ensure_finite_point(to, "setup position")?;
        if !self.registry.contains(id) {
            return Err(DrillError::lookup(format!("unknown entity '{id}'")));
        }
        self.setup_positions.insert(id.clone(), to);
        self.touch();
        Ok(())
    }

    /// Position at time zero: the setup position if the entity was ever
    /// dragged, otherwise where its kind spawns.
    pub fn baseline_position(&self, id: &EntityId) -> Option<Point> {
        let kind = self.registry.kind_of(id)?;
        Some(
            self.setup_positions
                .get(id)
                .copied()
                .unwrap_or_else(|| self.config.spawn(kind)),
        )
    }

    /// Schedule a pass or run starting at `time`; it lasts
    /// `distance(origin, destination) / speed` seconds.
    pub fn add_movement(
        &mut self,
        kind: MovementKind,
        entity: &EntityId,
        time: f64,
        origin: Point,
        destination: Point,
        speed: f64,
    ) -> DrillResult<EventId> {
        let time = ensure_time(time)?;
        let origin = ensure_finite_point(origin, "movement origin")?;
        let destination = ensure_finite_point(destination, "movement destination")?;
        let speed = ensure_finite(speed, "movement speed")?;
        if speed <= 0.0 {
            return Err(DrillError::validation("movement speed must be > 0"));
        }
        let entity_kind = self
            .registry
            .kind_of(entity)
            .ok_or_else(|| DrillError::lookup(format!("unknown entity '{entity}'")))?;
        let motion = match (kind, entity_kind) {
            (MovementKind::Pass, EntityKind::Ball) => Motion::Pass {
                height: PassHeight::Grounded,
            },
            (MovementKind::Run, EntityKind::Player) => Motion::Run,
            (kind, entity_kind) => {
                return Err(DrillError::validation(format!(
                    "a {kind:?} cannot move {entity_kind:?} '{entity}'"
                )));
            }
        };

        let duration = origin.distance(destination) / speed;
        let end_time = time + duration;
        let id = self.timeline.insert(EventKind::Movement(Movement {
            entity: entity.clone(),
            motion,
            origin,
            destination,
            start_time: time,
            end_time,
        }))?;
        tracing::debug!(event = id.0, %entity, ?kind, start = time, end = end_time, "movement added");
        self.extend_duration(end_time);
        self.touch();
        Ok(id)
    }

    /// [`Document::add_movement`] for a ball at the configured ball speed.
    pub fn add_pass(
        &mut self,
        ball: &EntityId,
        time: f64,
        origin: Point,
        destination: Point,
    ) -> DrillResult<EventId> {
        let speed = self.config.speed_for(MovementKind::Pass);
        self.add_movement(MovementKind::Pass, ball, time, origin, destination, speed)
    }

    /// [`Document::add_movement`] for a player at the configured run speed.
    pub fn add_run(
        &mut self,
        player: &EntityId,
        time: f64,
        origin: Point,
        destination: Point,
    ) -> DrillResult<EventId> {
        let speed = self.config.speed_for(MovementKind::Run);
        self.add_movement(MovementKind::Run, player, time, origin, destination, speed)
    }

    /// Add a note starting at `time`.
    ///
    /// A note already running at `time` is cut short just before it. The new
    /// note runs until the next later note starts, or to the session end; a
    /// note added past the end first grows the session to `time`.
    pub fn add_note(&mut self, time: f64) -> DrillResult<EventId> {
        let time = ensure_time(time)?;
        for (note_id, end) in self.notes.clip_overlapping(time, self.config.note_clip_gap) {
            let cue = self
                .timeline
                .iter()
                .find(|e| matches!(&e.kind, EventKind::Note(c) if c.note == note_id))
                .map(|e| e.id);
            if let Some(cue) = cue
                && let Some(TimelineEvent {
                    kind: EventKind::Note(c),
                    ..
                }) = self.timeline.get_mut(cue)
            {
                c.end_time = end;
            }
        }

        self.extend_duration(time);
        let end_time = self
            .notes
            .next_start_after(time)
            .unwrap_or(self.duration);
        let text = format!("Note {}", self.notes.len() + 1);
        let note = self.notes.push(text, time, end_time);
        let id = self.timeline.insert(EventKind::Note(NoteCue {
            note,
            start_time: time,
            end_time,
        }))?;
        tracing::debug!(event = id.0, note = note.0, start = time, end = end_time, "note added");
        self.touch();
        Ok(id)
    }

    /// Reserve idle time: grow the session to at least `time + duration`.
    pub fn add_pause(&mut self, time: f64, duration: f64) -> DrillResult<()> {
        let time = ensure_time(time)?;
        let duration = ensure_finite(duration, "pause duration")?;
        if duration < 0.0 {
            return Err(DrillError::validation("pause duration must be >= 0"));
        }
        self.extend_duration(time + duration);
        self.touch();
        Ok(())
    }

    /// Remove one event. Removing a note cue also removes its note.
    pub fn delete_event(&mut self, id: EventId) -> DrillResult<TimelineEvent> {
        let removed = self
            .timeline
            .remove(id)
            .ok_or_else(|| DrillError::lookup(format!("unknown event {}", id.0)))?;
        if let EventKind::Note(cue) = &removed.kind {
            self.notes.remove(cue.note);
        }
        tracing::debug!(event = id.0, "event deleted");
        self.touch();
        Ok(removed)
    }

    /// Retime a movement to last `duration` seconds from its start.
    pub fn set_event_duration(&mut self, id: EventId, duration: f64) -> DrillResult<()> {
        let duration = ensure_finite(duration, "event duration")?;
        if duration < 0.0 {
            return Err(DrillError::validation("event duration must be >= 0"));
        }
        let movement = self.movement_mut(id)?;
        movement.end_time = movement.start_time + duration;
        let end = movement.end_time;
        self.extend_duration(end);
        self.touch();
        Ok(())
    }

    pub fn set_pass_height(&mut self, id: EventId, height: PassHeight) -> DrillResult<()> {
        let movement = self.movement_mut(id)?;
        match &mut movement.motion {
            Motion::Pass { height: h } => *h = height,
            Motion::Run => {
                return Err(DrillError::validation(format!(
                    "event {} is a run; only passes have a height",
                    id.0
                )));
            }
        }
        self.touch();
        Ok(())
    }

    pub fn set_note_text(&mut self, id: EventId, text: impl Into<String>) -> DrillResult<()> {
        let note_id = self
            .timeline
            .get(id)
            .and_then(TimelineEvent::as_note)
            .map(|c| c.note)
            .ok_or_else(|| DrillError::lookup(format!("event {} is not a note", id.0)))?;
        let note = self
            .notes
            .get_mut(note_id)
            .ok_or_else(|| DrillError::lookup(format!("note {} is missing", note_id.0)))?;
        note.text = text.into();
        self.touch();
        Ok(())
    }

    /// Suggested duration of a movement at the default speed of its kind,
    /// rounded to hundredths.
    pub fn default_duration(&self, id: EventId) -> DrillResult<f64> {
        let movement = self
            .timeline
            .get(id)
            .and_then(TimelineEvent::as_movement)
            .ok_or_else(|| DrillError::lookup(format!("event {} is not a movement", id.0)))?;
        let speed = self.config.speed_for(movement.motion.kind());
        Ok(((movement.distance() / speed) * 100.0 + 50.0).floor() / 100.0)
    }

    /// Compute the scene at `time` and move the playhead there.
    pub fn scrub(&mut self, time: f64) -> DrillResult<Scene> {
        let scene = self.scene_at(time)?;
        self.playhead = time;
        Ok(scene)
    }

    pub fn scene_at(&self, time: f64) -> DrillResult<Scene> {
        Playback::scene_at(self, time)
    }

    pub fn layout(&self, width: f64) -> DrillResult<ScheduleLayout> {
        layout_schedule(self, width)
    }

    fn movement_mut(&mut self, id: EventId) -> DrillResult<&mut Movement> {
        match self.timeline.get_mut(id) {
            Some(TimelineEvent {
                kind: EventKind::Movement(m),
                ..
            }) => Ok(m),
            Some(_) => Err(DrillError::validation(format!(
                "event {} is not a movement",
                id.0
            ))),
            None => Err(DrillError::lookup(format!("unknown event {}", id.0))),
        }
    }

    /// Grow the session bound; it never shrinks.
    pub(crate) fn extend_duration(&mut self, end: f64) {
        if end > self.duration {
            tracing::debug!(from = self.duration, to = end, "session duration extended");
            self.duration = end;
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

fn ensure_time(time: f64) -> DrillResult<f64> {
    let time = ensure_finite(time, "time")?;
    if time < 0.0 {
        return Err(DrillError::validation("time must be >= 0"));
    }
    Ok(time)
}

#[cfg(test)]
#[path = "../../tests/unit/document/session.rs"]
mod tests;
