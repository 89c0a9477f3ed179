//! Level description: the tile map plus the actors placed in it
//!
//! Loaded from JSON. Only the actor kinds the dynamic geometry code cares about
//! are distinguished; everything else is `Other`.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::behavior::GeometryType;
use super::map::Map;
use super::rect::Rect;

/// Actor kinds relevant to dynamic map geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActorKind {
    /// Falls after a short delay, then sinks into the ground
    SinkingGeometry,
    /// Falls while the earth is shaking, explodes on impact
    QuakeGeometry,
    /// Falls whenever unsupported, rests on the ground
    RestingGeometry,
    /// Falls whenever unsupported, explodes on impact
    ExplodingGeometry,
    /// Falls after a short delay, then rests on the ground
    DelayedRestingGeometry,
    /// Drops and sinks once opened with the blue key
    BlueKeyDoor,
    /// Wall that can be shot to pieces, never falls
    ShootableWall,
    /// Missile standing upright; punches a hole into the ceiling above it
    MissileIntact,
    #[default]
    Other,
}

impl ActorKind {
    /// Behavior a piece of this kind starts with, if it moves on its own
    pub fn initial_geometry_type(self) -> Option<GeometryType> {
        match self {
            ActorKind::SinkingGeometry => Some(GeometryType::FallDownAfterDelayThenSinkIntoGround),
            ActorKind::QuakeGeometry => Some(GeometryType::FallDownWhileEarthQuakeActiveThenExplode),
            ActorKind::RestingGeometry => Some(GeometryType::FallDownImmediatelyThenStayOnGround),
            ActorKind::ExplodingGeometry => Some(GeometryType::FallDownImmediatelyThenExplode),
            ActorKind::DelayedRestingGeometry => {
                Some(GeometryType::FallDownAfterDelayThenStayOnGround)
            }
            ActorKind::BlueKeyDoor
            | ActorKind::ShootableWall
            | ActorKind::MissileIntact
            | ActorKind::Other => None,
        }
    }

    /// Geometry that stays in place until destroyed
    pub fn is_shootable_wall(self) -> bool {
        self == ActorKind::ShootableWall
    }
}

/// One actor placement from the level file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDesc {
    pub kind: ActorKind,
    /// Bottom-left tile of the actor
    pub position: IVec2,
    /// Map area owned by the actor (dynamic geometry only)
    #[serde(default)]
    pub assigned_area: Option<Rect>,
}

impl ActorDesc {
    pub fn new(kind: ActorKind, position: IVec2) -> Self {
        Self {
            kind,
            position,
            assigned_area: None,
        }
    }

    /// Dynamic geometry actor owning `area`; positioned at the area's bottom-left
    pub fn with_area(kind: ActorKind, area: Rect) -> Self {
        Self {
            kind,
            position: area.bottom_left(),
            assigned_area: Some(area),
        }
    }
}

/// A complete level as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub map: Map,
    #[serde(default)]
    pub actors: Vec<ActorDesc>,
}

impl LevelData {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let level: LevelData = serde_json::from_str(json)?;
        log::info!(
            "Loaded level: {}x{} tiles, {} actors",
            level.map.width(),
            level.map.height(),
            level.actors.len()
        );
        Ok(level)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
