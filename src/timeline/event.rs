use crate::foundation::core::{Point, lerp_point};
use crate::registry::entities::EntityId;
use crate::timeline::notes::NoteId;

/// Stable identifier of a timeline event, assigned at creation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EventId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassHeight {
    #[default]
    Grounded,
    /// Ball is drawn larger mid-flight.
    Lofted,
}

impl PassHeight {
    pub fn code(self) -> u32 {
        match self {
            PassHeight::Grounded => 0,
            PassHeight::Lofted => 1,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(PassHeight::Grounded),
            1 => Some(PassHeight::Lofted),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Ball travels between two points.
    Pass,
    /// Player travels between two points.
    Run,
}

/// What a movement does; only passes carry a height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Pass { height: PassHeight },
    Run,
}

impl Motion {
    pub fn kind(self) -> MovementKind {
        match self {
            Motion::Pass { .. } => MovementKind::Pass,
            Motion::Run => MovementKind::Run,
        }
    }

    pub fn is_lofted(self) -> bool {
        matches!(
            self,
            Motion::Pass {
                height: PassHeight::Lofted
            }
        )
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Movement {
    pub entity: EntityId,
    pub motion: Motion,
    pub origin: Point,
    pub destination: Point,
    pub start_time: f64,
    pub end_time: f64,
}

impl Movement {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn distance(&self) -> f64 {
        self.origin.distance(self.destination)
    }

    /// Normalized progress at `t`, clamped to `[0, 1]`.
    ///
    /// A zero-length movement is an instant placement and reports `1` once
    /// reached.
    pub fn progress_at(&self, t: f64) -> f64 {
        let d = self.duration();
        if d <= 0.0 {
            return if t >= self.start_time { 1.0 } else { 0.0 };
        }
        ((t - self.start_time) / d).clamp(0.0, 1.0)
    }

    pub fn position_at(&self, t: f64) -> Point {
        lerp_point(self.origin, self.destination, self.progress_at(t))
    }
}

/// Timeline marker for an entry of the note list.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NoteCue {
    pub note: NoteId,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Movement(Movement),
    Note(NoteCue),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineEvent {
    pub id: EventId,
    pub kind: EventKind,
}

impl TimelineEvent {
    pub fn start_time(&self) -> f64 {
        match &self.kind {
            EventKind::Movement(m) => m.start_time,
            EventKind::Note(n) => n.start_time,
        }
    }

    pub fn end_time(&self) -> f64 {
        match &self.kind {
            EventKind::Movement(m) => m.end_time,
            EventKind::Note(n) => n.end_time,
        }
    }

    pub fn as_movement(&self) -> Option<&Movement> {
        match &self.kind {
            EventKind::Movement(m) => Some(m),
            EventKind::Note(_) => None,
        }
    }

    pub fn as_note(&self) -> Option<&NoteCue> {
        match &self.kind {
            EventKind::Movement(_) => None,
            EventKind::Note(n) => Some(n),
        }
    }

    /// Entity moved by this event; notes move nothing.
    pub fn entity(&self) -> Option<&EntityId> {
        self.as_movement().map(|m| &m.entity)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/event.rs"]
mod tests;
