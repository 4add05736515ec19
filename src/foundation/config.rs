use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Point;
use crate::foundation::error::{DrillError, DrillResult};
use crate::registry::entities::EntityKind;
use crate::timeline::event::MovementKind;

/// Tunables shared by authoring, layout and playback.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DrillConfig {
    /// Pass speed in px/s.
    pub ball_speed: f64,
    /// Run speed in px/s.
    pub player_speed: f64,
    /// Ball radius on the ground.
    pub ball_ground_radius: f64,
    /// Peak ball radius of a lofted pass.
    pub ball_air_radius: f64,
    /// Player glyph radius.
    pub player_radius: f64,
    /// Cone glyph radius.
    pub cone_radius: f64,
    /// Window past the query time in which upcoming moves get a preview.
    pub lookahead: f64,
    /// Gap between an entity glyph and the start of its preview indicator.
    pub indicator_margin: f64,
    /// Gap left before a new note when an earlier note is clipped.
    pub note_clip_gap: f64,
    /// Session duration of a fresh document.
    pub initial_duration: f64,
    /// Field viewport height of a fresh document.
    pub field_height: f64,
    /// Vertical pitch of schedule rows.
    pub row_height: f64,
    /// Height reserved above movement rows once any note exists.
    pub note_lane_height: f64,
    pub player_spawn: Point,
    pub cone_spawn: Point,
    pub ball_spawn: Point,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            ball_speed: 128.0,
            player_speed: 96.0,
            ball_ground_radius: 10.0,
            ball_air_radius: 14.0,
            player_radius: 16.0,
            cone_radius: 12.0,
            lookahead: 1.0,
            indicator_margin: 4.0,
            note_clip_gap: 0.1,
            initial_duration: 10.0,
            field_height: 600.0,
            row_height: 24.0,
            note_lane_height: 48.0,
            player_spawn: Point::new(24.0, 24.0),
            cone_spawn: Point::new(100.0, 24.0),
            ball_spawn: Point::new(100.0, 200.0),
        }
    }
}

impl DrillConfig {
    /// Parse a config from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> DrillResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| DrillError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> DrillResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DrillError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Resting glyph radius of an entity kind.
    pub fn glyph_radius(&self, kind: EntityKind) -> f64 {
        match kind {
            EntityKind::Player => self.player_radius,
            EntityKind::Cone => self.cone_radius,
            EntityKind::Ball => self.ball_ground_radius,
        }
    }

    /// Where a freshly added entity of `kind` appears.
    pub fn spawn(&self, kind: EntityKind) -> Point {
        match kind {
            EntityKind::Player => self.player_spawn,
            EntityKind::Cone => self.cone_spawn,
            EntityKind::Ball => self.ball_spawn,
        }
    }

    pub fn speed_for(&self, kind: MovementKind) -> f64 {
        match kind {
            MovementKind::Pass => self.ball_speed,
            MovementKind::Run => self.player_speed,
        }
    }

    pub fn validate(&self) -> DrillResult<()> {
        for (name, value) in [
            ("ball_speed", self.ball_speed),
            ("player_speed", self.player_speed),
            ("ball_ground_radius", self.ball_ground_radius),
            ("ball_air_radius", self.ball_air_radius),
            ("player_radius", self.player_radius),
            ("cone_radius", self.cone_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DrillError::validation(format!(
                    "config {name} must be finite and > 0"
                )));
            }
        }
        for (name, value) in [
            ("lookahead", self.lookahead),
            ("indicator_margin", self.indicator_margin),
            ("note_clip_gap", self.note_clip_gap),
            ("initial_duration", self.initial_duration),
            ("field_height", self.field_height),
            ("row_height", self.row_height),
            ("note_lane_height", self.note_lane_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DrillError::validation(format!(
                    "config {name} must be finite and >= 0"
                )));
            }
        }
        for (name, p) in [
            ("player_spawn", self.player_spawn),
            ("cone_spawn", self.cone_spawn),
            ("ball_spawn", self.ball_spawn),
        ] {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(DrillError::validation(format!(
                    "config {name} must be finite"
                )));
            }
        }
        if self.ball_air_radius < self.ball_ground_radius {
            return Err(DrillError::validation(
                "config ball_air_radius must be >= ball_ground_radius",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
