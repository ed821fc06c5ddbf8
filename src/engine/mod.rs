//! Engine: the scene resolver.
//!
//! Turns a `ShowroomConfig` (intent) into a `ScenePlan`: a scene graph with
//! absolute placements, the resolved surface materials and the camera
//! waypoints. Runs once at startup. It never deals with time or with any
//! particular rendering backend.

pub mod fixtures;
pub mod geometry;
pub mod materials;
pub mod scene;
pub mod source;

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use serde::Serialize;

use crate::types::Waypoints;
use fixtures::{FixturePlacement, FixtureProfile, SinkAnchor, resolve_fixture_placements, sink_anchor};
use geometry::{facing_yaw, inward_direction, resolve_wall_position, wall_span};
use materials::MaterialTable;
use scene::{MaterialSlot, Node, NodeId, Role, SceneGraph, Shape};
use source::{Brand, MaterialDef, RoomSpec, ShowroomConfig, TimelineConfig, WallId, WallOffsetPlacement};

pub const WALL_THICKNESS: f32 = 0.05;
pub const EYE_HEIGHT: f32 = 1.6;
/// Distance the door waypoint stands inside the doorway.
pub const DOOR_STANDOFF: f32 = 0.4;
/// Distance between the sink anchor and the camera when looking at it.
pub const SINK_VIEW_DISTANCE: f32 = 0.8;
pub const WATER_SIZE: f32 = 0.22;
pub const WATER_COLOR: [f32; 3] = [0.6, 0.7, 1.0];
pub const WATER_ALPHA: f32 = 0.7;
const DOOR_WIDTH: f32 = 0.8;
const DOOR_HEIGHT: f32 = 2.0;

/// Everything the frame loop and the renderer need, resolved once.
#[derive(Debug, Clone, Serialize)]
pub struct ScenePlan {
    pub room: RoomSpec,
    pub graph: SceneGraph,
    pub floor_material: MaterialDef,
    pub wall_material: MaterialDef,
    pub fixtures: Vec<FixturePlacement>,
    /// Scene node of each fixture, parallel to `fixtures`.
    pub fixture_nodes: Vec<NodeId>,
    pub sink: SinkAnchor,
    pub water_node: NodeId,
    pub waypoints: Waypoints,
    pub brand: Brand,
    pub timeline: TimelineConfig,
}

pub struct Engine;

impl Engine {
    /// Resolve a validated configuration against a material table.
    pub fn build(config: &ShowroomConfig, table: &MaterialTable) -> ScenePlan {
        let room = config.room.spec;
        let door = config.room.door.unwrap_or_else(|| default_door(&room));

        let mut table_with_tiles = table.clone();
        table_with_tiles.extend(&config.tiles);
        let floor_material = table_with_tiles.resolve(&config.materials.floor);
        let wall_material = table_with_tiles.resolve(&config.materials.walls);

        let fixtures = resolve_fixture_placements(&room, &config.fixtures);
        let sink = sink_anchor(&fixtures);
        let waypoints = Self::waypoints(&room, door, &sink);

        let mut graph = SceneGraph::new();
        Self::build_room(&mut graph, &room);
        Self::build_door(&mut graph, &room, door);
        let fixture_nodes = fixtures
            .iter()
            .map(|p| Self::build_fixture(&mut graph, p))
            .collect();
        let water_node = Self::build_water(&mut graph, &sink);

        log::info!(
            "Resolved scene: {} nodes, {} fixtures, sink anchor {:?} at {}",
            graph.len(),
            fixtures.len(),
            sink.source,
            sink.position,
        );
        log::debug!("Waypoints: {waypoints:?}");

        ScenePlan {
            room,
            graph,
            floor_material,
            wall_material,
            fixtures,
            fixture_nodes,
            sink,
            water_node,
            waypoints,
            brand: config.brand.clone(),
            timeline: config.timeline.clone(),
        }
    }

    pub fn waypoints(room: &RoomSpec, door: WallOffsetPlacement, sink: &SinkAnchor) -> Waypoints {
        let door_pos = resolve_wall_position(room, door.wall, door.offset, EYE_HEIGHT)
            + inward_direction(door.wall) * DOOR_STANDOFF;
        let mut sink_front = sink.position + inward_direction(sink.wall) * SINK_VIEW_DISTANCE;
        sink_front.y = EYE_HEIGHT;

        Waypoints {
            door: door_pos,
            center: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            sink_front,
            sink_target: sink.position + Vec3::Y * 0.1,
        }
    }

    fn build_room(graph: &mut SceneGraph, room: &RoomSpec) -> NodeId {
        let root = graph.add_root(Node::new("room", Role::Room, Shape::Empty));
        graph.add_child(
            root,
            Node::new("floor", Role::Floor, Shape::Ground { width: room.length, depth: room.width })
                .with_material(MaterialSlot::Floor),
        );

        for wall in WallId::ALL {
            let span = wall_span(room, wall);
            let mut center = resolve_wall_position(room, wall, span / 2.0, room.height / 2.0);
            // Keep the inner face flush with the room boundary.
            center -= inward_direction(wall) * (WALL_THICKNESS / 2.0);
            let rotation = match wall {
                WallId::North | WallId::South => Vec3::ZERO,
                WallId::East | WallId::West => Vec3::new(0.0, FRAC_PI_2, 0.0),
            };
            graph.add_child(
                root,
                Node::new(
                    format!("wall-{}", wall.name()),
                    Role::Wall,
                    Shape::Box { size: Vec3::new(span, room.height, WALL_THICKNESS) },
                )
                .at(center)
                .rotated(rotation)
                .with_material(MaterialSlot::Walls),
            );
        }
        root
    }

    fn build_door(graph: &mut SceneGraph, room: &RoomSpec, door: WallOffsetPlacement) -> NodeId {
        let position = resolve_wall_position(room, door.wall, door.offset, DOOR_HEIGHT / 2.0)
            + inward_direction(door.wall) * WALL_THICKNESS;
        graph.add_root(
            Node::new("door", Role::Door, Shape::Plane { size: DOOR_WIDTH })
                .at(position)
                .rotated(Vec3::new(0.0, facing_yaw(door.wall), 0.0)),
        )
    }

    fn build_fixture(graph: &mut SceneGraph, placement: &FixturePlacement) -> NodeId {
        let profile = FixtureProfile::for_fixture(&placement.fixture);
        let yaw = facing_yaw(placement.fixture.wall);
        let id = graph.add_root(
            Node::new(
                format!("fixture-{}", placement.fixture.id),
                Role::Fixture,
                Shape::Box { size: profile.size },
            )
            .at(profile.mesh_center(placement.position))
            .rotated(Vec3::new(0.0, yaw, 0.0))
            .with_material(MaterialSlot::Fixture),
        );

        if placement.fixture.is_sink() {
            let inward = inward_direction(placement.fixture.wall);
            let faucet = placement.position + Vec3::Y * 0.15 - inward * 0.1;
            graph.add_root(
                Node::new(
                    format!("faucet-{}", placement.fixture.id),
                    Role::Faucet,
                    Shape::Box { size: Vec3::new(0.03, 0.2, 0.03) },
                )
                .at(faucet)
                .with_material(MaterialSlot::Fixture),
            );
        }
        id
    }

    fn build_water(graph: &mut SceneGraph, sink: &SinkAnchor) -> NodeId {
        let position = sink.position + Vec3::Y * 0.1 + inward_direction(sink.wall) * 0.15;
        graph.add_root(
            Node::new("water", Role::Water, Shape::Plane { size: WATER_SIZE })
                .at(position)
                .rotated(Vec3::new(FRAC_PI_2, 0.0, 0.0))
                .with_material(MaterialSlot::Water)
                .hidden(),
        )
    }
}

fn default_door(room: &RoomSpec) -> WallOffsetPlacement {
    WallOffsetPlacement {
        wall: WallId::West,
        offset: room.width / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(fixtures: &str) -> ShowroomConfig {
        let json = format!(
            r#"{{
                "room": {{ "length": 3.0, "width": 2.2, "height": 2.6,
                           "door": {{ "wall": "west", "offset": 1.1 }} }},
                "materials": {{ "floor": "tile-travertine", "walls": "no-such-code" }},
                "fixtures": {fixtures}
            }}"#
        );
        ShowroomConfig::from_json(&json).unwrap()
    }

    #[test]
    fn test_room_owns_floor_and_walls() {
        let plan = Engine::build(&config("[]"), &MaterialTable::builtin());
        let room = plan.graph.find(Role::Room).unwrap();
        let owned: Vec<_> = plan.graph.children(room).map(|id| plan.graph.get(id).role).collect();
        assert_eq!(owned.iter().filter(|r| **r == Role::Wall).count(), 4);
        assert_eq!(owned.iter().filter(|r| **r == Role::Floor).count(), 1);

        for (_, node) in plan.graph.nodes() {
            if matches!(node.role, Role::Fixture | Role::Water | Role::Door) {
                assert!(node.parent.is_none());
            }
        }
    }

    #[test]
    fn test_materials_resolve_with_fallback() {
        let plan = Engine::build(&config("[]"), &MaterialTable::builtin());
        assert!(plan.floor_material.albedo_url.is_some());
        assert_eq!(plan.wall_material, MaterialDef::fallback());
    }

    #[test]
    fn test_empty_fixtures_use_default_sink() {
        let plan = Engine::build(&config("[]"), &MaterialTable::new());
        assert_eq!(plan.sink, fixtures::DEFAULT_SINK_ANCHOR);
        assert!(plan.fixture_nodes.is_empty());
        assert!(!plan.graph.get(plan.water_node).visible);
    }

    #[test]
    fn test_waypoints_from_sink_and_door() {
        let plan = Engine::build(
            &config(r#"[{ "id": "s1", "type": "sink", "wall": "south", "offset": 1.0 }]"#),
            &MaterialTable::new(),
        );
        let wp = plan.waypoints;
        assert!((wp.door - Vec3::new(-1.1, EYE_HEIGHT, 0.0)).length() < 1e-5);
        assert_eq!(wp.center, Vec3::new(0.0, EYE_HEIGHT, 0.0));
        assert!((wp.sink_front - Vec3::new(-0.5, EYE_HEIGHT, -0.05)).length() < 1e-5);
        assert!((wp.sink_target - Vec3::new(-0.5, 1.0, 0.75)).length() < 1e-5);
        assert_eq!(plan.fixture_nodes.len(), 1);
        assert!(plan.graph.find(Role::Faucet).is_some());
    }

    #[test]
    fn test_walls_sit_outside_room_bounds() {
        let plan = Engine::build(&config("[]"), &MaterialTable::new());
        for (id, node) in plan.graph.nodes() {
            if node.role == Role::Wall {
                let p = plan.graph.world_position(id);
                assert!((p.y - 1.3).abs() < 1e-6);
                assert!(p.x.abs() >= 1.5 || p.z.abs() >= 1.1);
            }
        }
    }
}
