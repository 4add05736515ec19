/// Stable identifier of a note, independent of its position in the list.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NoteId(pub u64);

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl Note {
    /// Inclusive at both ends.
    pub fn contains(&self, t: f64) -> bool {
        self.start_time <= t && t <= self.end_time
    }
}

/// Ordered list of notes. List order is authoring order and decides which
/// note wins when intervals overlap.
#[derive(Clone, Debug, Default)]
pub struct NoteBook {
    notes: Vec<Note>,
    next_id: u64,
}

impl NoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    /// Current list position of a note.
    pub fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    pub fn push(&mut self, text: impl Into<String>, start_time: f64, end_time: f64) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        self.notes.push(Note {
            id,
            text: text.into(),
            start_time,
            end_time,
        });
        id
    }

    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        let idx = self.position(id)?;
        Some(self.notes.remove(idx))
    }

    /// End every note with `start < t <= end` at `t - gap`; returns the ids
    /// that changed along with their new end.
    pub fn clip_overlapping(&mut self, t: f64, gap: f64) -> Vec<(NoteId, f64)> {
        let mut clipped = Vec::new();
        for note in self
            .notes
            .iter_mut()
            .filter(|n| n.start_time < t && n.end_time >= t)
        {
            note.end_time = t - gap;
            tracing::debug!(note = note.id.0, end = note.end_time, "note clipped");
            clipped.push((note.id, note.end_time));
        }
        clipped
    }

    /// Earliest start strictly after `t`.
    pub fn next_start_after(&self, t: f64) -> Option<f64> {
        self.notes
            .iter()
            .map(|n| n.start_time)
            .filter(|&s| s > t)
            .min_by(f64::total_cmp)
    }

    /// The note shown at `t`: first in list order whose interval contains it.
    pub fn current_at(&self, t: f64) -> Option<&Note> {
        let mut hits = self.notes.iter().filter(|n| n.contains(t));
        let first = hits.next()?;
        let extra = hits.count();
        if extra > 0 {
            tracing::warn!(
                time = t,
                winner = first.id.0,
                extra,
                "overlapping notes at query time; using first in list order"
            );
        }
        Some(first)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/notes.rs"]
mod tests;
