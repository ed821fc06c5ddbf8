//! Fixture placement: fixture descriptors to room-space positions.

use glam::Vec3;
use serde::Serialize;

use super::geometry::{inward_direction, resolve_wall_position};
use super::source::{FixtureDescriptor, RoomSpec, WallId};

/// How far a fixture type sits off its wall, and at what height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureProfile {
    pub push: f32,
    pub height: f32,
    /// Mesh box dimensions (width, height, depth).
    pub size: Vec3,
    /// Floor-standing meshes are lifted by half their height.
    pub rests_on_floor: bool,
}

pub const SINK_PROFILE: FixtureProfile = FixtureProfile {
    push: 0.35,
    height: 0.9,
    size: Vec3::new(0.6, 0.2, 0.45),
    rests_on_floor: false,
};

pub const FLOOR_PROFILE: FixtureProfile = FixtureProfile {
    push: 0.3,
    height: 0.0,
    size: Vec3::new(0.5, 0.8, 0.5),
    rests_on_floor: true,
};

/// Sink anchor used when the configuration lists no fixtures at all.
pub const DEFAULT_SINK_ANCHOR: SinkAnchor = SinkAnchor {
    position: Vec3::new(0.0, 0.9, -0.95),
    wall: WallId::North,
    source: AnchorSource::Default,
};

impl FixtureProfile {
    pub fn for_fixture(fixture: &FixtureDescriptor) -> Self {
        if fixture.is_sink() { SINK_PROFILE } else { FLOOR_PROFILE }
    }

    /// Center of the fixture mesh given its resolved placement.
    pub fn mesh_center(&self, placement: Vec3) -> Vec3 {
        if self.rests_on_floor {
            placement + Vec3::Y * (self.size.y / 2.0)
        } else {
            placement
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixturePlacement {
    pub fixture: FixtureDescriptor,
    pub position: Vec3,
}

/// Resolve every fixture independently; output order matches input order.
pub fn resolve_fixture_placements(
    room: &RoomSpec,
    fixtures: &[FixtureDescriptor],
) -> Vec<FixturePlacement> {
    fixtures
        .iter()
        .map(|f| {
            let profile = FixtureProfile::for_fixture(f);
            let base = resolve_wall_position(room, f.wall, f.offset, profile.height);
            FixturePlacement {
                fixture: f.clone(),
                position: base + inward_direction(f.wall) * profile.push,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    /// A fixture of type "sink".
    Sink,
    /// No sink listed; the first fixture stands in.
    FirstFixture,
    /// Empty fixture list.
    Default,
}

/// The fixture the camera approaches during the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SinkAnchor {
    pub position: Vec3,
    pub wall: WallId,
    pub source: AnchorSource,
}

/// First sink, else the first fixture, else `DEFAULT_SINK_ANCHOR`.
// NOTE: a non-sink first fixture silently becomes the camera's sink target.
pub fn sink_anchor(placements: &[FixturePlacement]) -> SinkAnchor {
    let (placement, source) = match placements.iter().find(|p| p.fixture.is_sink()) {
        Some(p) => (p, AnchorSource::Sink),
        None => match placements.first() {
            Some(p) => (p, AnchorSource::FirstFixture),
            None => return DEFAULT_SINK_ANCHOR,
        },
    };
    SinkAnchor {
        position: placement.position,
        wall: placement.fixture.wall,
        source,
    }
}
