use std::collections::BTreeMap;
use std::ops::Bound;

use crate::foundation::core::TimeKey;
use crate::foundation::error::DrillResult;
use crate::timeline::event::{EventId, EventKind, TimelineEvent};

/// Events bucketed by start time.
///
/// Buckets iterate in ascending numeric time order. Within a bucket, events
/// keep insertion order, which is also their display and selection order.
#[derive(Clone, Debug, Default)]
pub struct TimelineStore {
    buckets: BTreeMap<TimeKey, Vec<TimelineEvent>>,
    next_id: u64,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Append an event to the bucket of its start time.
    pub fn insert(&mut self, kind: EventKind) -> DrillResult<EventId> {
        let key = match &kind {
            EventKind::Movement(m) => TimeKey::new(m.start_time)?,
            EventKind::Note(n) => TimeKey::new(n.start_time)?,
        };
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.buckets
            .entry(key)
            .or_default()
            .push(TimelineEvent { id, kind });
        Ok(id)
    }

    pub fn get(&self, id: EventId) -> Option<&TimelineEvent> {
        self.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EventId) -> Option<&mut TimelineEvent> {
        self.buckets
            .values_mut()
            .flat_map(|b| b.iter_mut())
            .find(|e| e.id == id)
    }

    /// Positional `(time-key, index)` address of an event. Only valid until
    /// the next removal from the same bucket.
    pub fn locate(&self, id: EventId) -> Option<(TimeKey, usize)> {
        self.buckets.iter().find_map(|(key, bucket)| {
            bucket
                .iter()
                .position(|e| e.id == id)
                .map(|idx| (*key, idx))
        })
    }

    pub fn remove(&mut self, id: EventId) -> Option<TimelineEvent> {
        let (key, idx) = self.locate(id)?;
        let bucket = self.buckets.get_mut(&key)?;
        let removed = bucket.remove(idx);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        Some(removed)
    }

    /// Remove every event for which `keep` returns false; returns them in
    /// chronological order.
    pub fn retain(&mut self, mut keep: impl FnMut(&TimelineEvent) -> bool) -> Vec<TimelineEvent> {
        let mut removed = Vec::new();
        for bucket in self.buckets.values_mut() {
            let (kept, dropped): (Vec<_>, Vec<_>) =
                std::mem::take(bucket).into_iter().partition(|e| keep(e));
            *bucket = kept;
            removed.extend(dropped);
        }
        self.buckets.retain(|_, b| !b.is_empty());
        removed
    }

    pub fn bucket(&self, key: TimeKey) -> &[TimelineEvent] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = TimeKey> + '_ {
        self.buckets.keys().copied()
    }

    pub fn buckets(&self) -> impl Iterator<Item = (TimeKey, &[TimelineEvent])> {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Buckets with `after < key <= until`; `after == None` starts from the
    /// first bucket.
    pub fn buckets_between(
        &self,
        after: Option<TimeKey>,
        until: f64,
    ) -> impl Iterator<Item = (TimeKey, &[TimelineEvent])> {
        let lower = match after {
            Some(k) => Bound::Excluded(k),
            None => Bound::Unbounded,
        };
        self.buckets
            .range((lower, Bound::Unbounded))
            .take_while(move |(k, _)| k.secs() <= until)
            .map(|(k, v)| (*k, v.as_slice()))
    }

    /// All events, chronologically then by insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TimelineEvent> {
        self.buckets.values().flatten()
    }

    pub fn latest_end(&self) -> Option<f64> {
        self.iter().map(TimelineEvent::end_time).max_by(f64::total_cmp)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/store.rs"]
mod tests;
