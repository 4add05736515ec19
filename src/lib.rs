//! Drillboard is the timeline and playback engine behind a sports-drill
//! editor.
//!
//! A [`Document`] holds players, cones and balls on a field, their setup
//! positions, and a timeline of timed passes, runs and notes. Two pure views
//! are computed from it on demand:
//!
//! 1. **Schedule layout** ([`Document::layout`]): every event placed on a
//!    horizontal strip, movements packed into non-overlapping rows.
//! 2. **Scene** ([`Document::scene_at`]): entity positions and sizes at a
//!    query time, plus preview arrows for moves starting shortly after it.
//!
//! Drawing is left to implementors of [`SceneRenderer`] and
//! [`ScheduleRenderer`]. Documents round-trip through the JSON drill format
//! ([`Document::save`] / [`Document::load`]).
#![forbid(unsafe_code)]

mod document;
mod foundation;
mod layout;
mod playback;
mod registry;
mod timeline;

pub use document::codec::{
    ConeRecord, DrillFile, EventRecord, EventRef, EventType, NoteRecord, PlayerRecord, decode,
    encode,
};
pub use document::session::Document;
pub use foundation::config::DrillConfig;
pub use foundation::core::{Point, TimeKey, Vec2, lerp_point, loft_radius};
pub use foundation::error::{DrillError, DrillResult};
pub use layout::schedule::{ScheduleGlyph, ScheduleItem, ScheduleLayout, layout_schedule};
pub use playback::renderer::{SceneRenderer, ScheduleRenderer};
pub use playback::scene::{CurrentNote, EntityPose, Indicator, IndicatorStyle, Playback, Scene};
pub use registry::entities::{Ball, Cone, EntityId, EntityKind, EntityRegistry, Player, PlayerRole};
pub use timeline::event::{
    EventId, EventKind, Motion, Movement, MovementKind, NoteCue, PassHeight, TimelineEvent,
};
pub use timeline::notes::{Note, NoteBook, NoteId};
pub use timeline::store::TimelineStore;
