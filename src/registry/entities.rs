use std::fmt;

use crate::foundation::error::{DrillError, DrillResult};

/// Stable identifier of an on-field entity (`player-3`, `cone-1`, `ball-2`).
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing `-N` counter of a generated id, if any.
    pub(crate) fn numeric_suffix(&self) -> Option<u32> {
        self.0.rsplit_once('-').and_then(|(_, n)| n.parse().ok())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Cone,
    Ball,
}

impl EntityKind {
    fn prefix(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Cone => "cone",
            EntityKind::Ball => "ball",
        }
    }
}

/// Player role; the document encoding carries it as its numeric code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    #[default]
    Attacker,
    Defender,
    Goalkeeper,
}

impl PlayerRole {
    pub fn code(self) -> u32 {
        match self {
            PlayerRole::Attacker => 0,
            PlayerRole::Defender => 1,
            PlayerRole::Goalkeeper => 2,
        }
    }

    pub fn from_code(code: u32) -> DrillResult<Self> {
        match code {
            0 => Ok(PlayerRole::Attacker),
            1 => Ok(PlayerRole::Defender),
            2 => Ok(PlayerRole::Goalkeeper),
            other => Err(DrillError::validation(format!(
                "unknown player role code {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Player {
    pub id: EntityId,
    /// Jersey number shown on the glyph.
    pub number: u32,
    pub role: PlayerRole,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Cone {
    pub id: EntityId,
    /// Index into the editor's cone palette.
    pub colour: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Ball {
    pub id: EntityId,
}

/// Live entities of a document, grouped by kind in creation order.
///
/// Generated ids come from per-kind counters that only move forward, so an id
/// is never handed out twice within a document even after deletions.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    players: Vec<Player>,
    cones: Vec<Cone>,
    balls: Vec<Ball>,
    next_player: u32,
    next_cone: u32,
    next_ball: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player; its jersey number defaults to its sequence number.
    pub fn add_player(&mut self) -> EntityId {
        let n = bump(&mut self.next_player);
        let id = generated_id(EntityKind::Player, n);
        self.players.push(Player {
            id: id.clone(),
            number: n,
            role: PlayerRole::Attacker,
        });
        tracing::debug!(%id, "player added");
        id
    }

    pub fn add_cone(&mut self) -> EntityId {
        let n = bump(&mut self.next_cone);
        let id = generated_id(EntityKind::Cone, n);
        self.cones.push(Cone {
            id: id.clone(),
            colour: 0,
        });
        tracing::debug!(%id, "cone added");
        id
    }

    pub fn add_ball(&mut self) -> EntityId {
        let n = bump(&mut self.next_ball);
        let id = generated_id(EntityKind::Ball, n);
        self.balls.push(Ball { id: id.clone() });
        tracing::debug!(%id, "ball added");
        id
    }

    /// Remove an entity from its kind list. Purging references to it is the
    /// caller's job (see [`crate::Document::delete_entity`]).
    pub fn remove(&mut self, id: &EntityId) -> DrillResult<EntityKind> {
        let kind = self
            .kind_of(id)
            .ok_or_else(|| DrillError::lookup(format!("unknown entity '{id}'")))?;
        match kind {
            EntityKind::Player => self.players.retain(|p| &p.id != id),
            EntityKind::Cone => self.cones.retain(|c| &c.id != id),
            EntityKind::Ball => self.balls.retain(|b| &b.id != id),
        }
        tracing::debug!(%id, ?kind, "entity removed");
        Ok(kind)
    }

    pub fn kind_of(&self, id: &EntityId) -> Option<EntityKind> {
        if self.players.iter().any(|p| &p.id == id) {
            Some(EntityKind::Player)
        } else if self.cones.iter().any(|c| &c.id == id) {
            Some(EntityKind::Cone)
        } else if self.balls.iter().any(|b| &b.id == id) {
            Some(EntityKind::Ball)
        } else {
            None
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.kind_of(id).is_some()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn cones(&self) -> &[Cone] {
        &self.cones
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn len(&self) -> usize {
        self.players.len() + self.cones.len() + self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live entities as `(id, kind)`: cones, then players, then balls.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, EntityKind)> {
        self.cones
            .iter()
            .map(|c| (&c.id, EntityKind::Cone))
            .chain(self.players.iter().map(|p| (&p.id, EntityKind::Player)))
            .chain(self.balls.iter().map(|b| (&b.id, EntityKind::Ball)))
    }

    pub fn player(&self, id: &EntityId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn cone(&self, id: &EntityId) -> Option<&Cone> {
        self.cones.iter().find(|c| &c.id == id)
    }

    pub fn set_player_number(&mut self, id: &EntityId, number: u32) -> DrillResult<()> {
        self.player_mut(id)?.number = number;
        Ok(())
    }

    pub fn set_player_role(&mut self, id: &EntityId, role: PlayerRole) -> DrillResult<()> {
        self.player_mut(id)?.role = role;
        Ok(())
    }

    pub fn set_cone_colour(&mut self, id: &EntityId, colour: u32) -> DrillResult<()> {
        let cone = self
            .cones
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| DrillError::lookup(format!("unknown cone '{id}'")))?;
        cone.colour = colour;
        Ok(())
    }

    /// Overwrite the id and metadata of the `index`-th player.
    ///
    /// Used by the loader, which first creates players through
    /// [`EntityRegistry::add_player`] and then applies the saved identity.
    /// Duplicate detection across the saved ids is the loader's job.
    pub(crate) fn reassign_player(
        &mut self,
        index: usize,
        id: EntityId,
        number: u32,
        role: PlayerRole,
    ) -> DrillResult<()> {
        self.reserve(&id)?;
        let player = self
            .players
            .get_mut(index)
            .ok_or_else(|| DrillError::lookup(format!("no player at index {index}")))?;
        player.id = id;
        player.number = number;
        player.role = role;
        Ok(())
    }

    pub(crate) fn reassign_cone(
        &mut self,
        index: usize,
        id: EntityId,
        colour: u32,
    ) -> DrillResult<()> {
        self.reserve(&id)?;
        let cone = self
            .cones
            .get_mut(index)
            .ok_or_else(|| DrillError::lookup(format!("no cone at index {index}")))?;
        cone.id = id;
        cone.colour = colour;
        Ok(())
    }

    /// Move the counter of the kind named by `id`'s prefix past its suffix,
    /// whatever list the id is loaded into, so no generated id repeats it.
    fn reserve(&mut self, id: &EntityId) -> DrillResult<()> {
        let Some((prefix, n)) = id
            .as_str()
            .rsplit_once('-')
            .and_then(|(prefix, n)| Some((prefix, n.parse::<u32>().ok()?)))
        else {
            return Ok(());
        };
        let counter = match prefix {
            "player" => &mut self.next_player,
            "cone" => &mut self.next_cone,
            "ball" => &mut self.next_ball,
            _ => return Ok(()),
        };
        if n == u32::MAX {
            return Err(DrillError::validation(format!(
                "entity id '{id}' leaves no room for generated ids"
            )));
        }
        *counter = (*counter).max(n);
        Ok(())
    }

    fn player_mut(&mut self, id: &EntityId) -> DrillResult<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| DrillError::lookup(format!("unknown player '{id}'")))
    }
}

fn bump(counter: &mut u32) -> u32 {
    *counter += 1;
    *counter
}

fn generated_id(kind: EntityKind, n: u32) -> EntityId {
    EntityId(format!("{}-{n}", kind.prefix()))
}

#[cfg(test)]
#[path = "../../tests/unit/registry/entities.rs"]
mod tests;
