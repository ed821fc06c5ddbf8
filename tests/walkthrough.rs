use std::cell::Cell;

use glam::Vec3;

use showroom::engine::materials::MaterialTable;
use showroom::engine::source::ShowroomConfig;
use showroom::engine::{Engine, ScenePlan};
use showroom::renderer::{MaterialDesc, MaterialHandle, MeshHandle, RenderBackend, Walkthrough};

const DEMO: &str = include_str!("../demos/showroom.json");

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(String),
    Parent(u32, u32),
    Material(String, MaterialDesc),
    Assign(u32, u32),
    Visible(u32, bool),
    Alpha(f32),
    Camera(Vec3, Vec3),
    Immersive(usize),
}

/// Records every call; the clock is set by the test.
#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    meshes: u32,
    materials: u32,
    now: Cell<f64>,
}

impl Recorder {
    fn create(&mut self, name: &str) -> MeshHandle {
        self.calls.push(Call::Create(name.to_string()));
        self.meshes += 1;
        MeshHandle(self.meshes - 1)
    }

    fn water_toggles(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Visible(_, v) => Some(*v),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for Recorder {
    fn create_node(&mut self, name: &str) -> MeshHandle {
        self.create(name)
    }
    fn create_plane(&mut self, name: &str, _size: f32) -> MeshHandle {
        self.create(name)
    }
    fn create_box(&mut self, name: &str, _size: Vec3) -> MeshHandle {
        self.create(name)
    }
    fn create_ground(&mut self, name: &str, _width: f32, _depth: f32) -> MeshHandle {
        self.create(name)
    }
    fn set_position(&mut self, _mesh: MeshHandle, _position: Vec3) {}
    fn set_rotation(&mut self, _mesh: MeshHandle, _rotation: Vec3) {}
    fn set_parent(&mut self, mesh: MeshHandle, parent: MeshHandle) {
        self.calls.push(Call::Parent(mesh.0, parent.0));
    }
    fn create_material(&mut self, name: &str, desc: &MaterialDesc) -> MaterialHandle {
        self.calls.push(Call::Material(name.to_string(), desc.clone()));
        self.materials += 1;
        MaterialHandle(self.materials - 1)
    }
    fn assign_material(&mut self, mesh: MeshHandle, material: MaterialHandle) {
        self.calls.push(Call::Assign(mesh.0, material.0));
    }
    fn set_mesh_visible(&mut self, mesh: MeshHandle, visible: bool) {
        self.calls.push(Call::Visible(mesh.0, visible));
    }
    fn set_overlay_alpha(&mut self, alpha: f32) {
        self.calls.push(Call::Alpha(alpha));
    }
    fn set_camera_pose(&mut self, position: Vec3, target: Vec3) {
        self.calls.push(Call::Camera(position, target));
    }
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
    fn enable_immersive_session(&mut self, floor: &[MeshHandle]) -> anyhow::Result<()> {
        self.calls.push(Call::Immersive(floor.len()));
        Ok(())
    }
}

fn demo_plan() -> anyhow::Result<ScenePlan> {
    let config = ShowroomConfig::from_json(DEMO)?;
    Ok(Engine::build(&config, &MaterialTable::builtin()))
}

#[test]
fn test_demo_sink_lands_where_expected() -> anyhow::Result<()> {
    let plan = demo_plan()?;
    let sink = &plan.fixtures[0];
    assert_eq!(sink.fixture.id, "sink-1");
    assert!((sink.position - Vec3::new(-0.5, 0.9, 0.75)).length() < 1e-5);
    assert_eq!(plan.sink.position, sink.position);

    let ids: Vec<_> = plan.fixtures.iter().map(|p| p.fixture.id.as_str()).collect();
    assert_eq!(ids, ["sink-1", "wc-1", "shower-1"]);
    Ok(())
}

#[test]
fn test_mount_creates_scene_once() -> anyhow::Result<()> {
    let plan = demo_plan()?;
    let nodes = plan.graph.len();
    let mut backend = Recorder::default();
    let walkthrough = Walkthrough::mount(plan, &mut backend)?;

    let created = backend.calls.iter().filter(|c| matches!(c, Call::Create(_))).count();
    assert_eq!(created, nodes);
    assert_eq!(backend.meshes as usize, nodes);

    // Room node owns floor + four walls.
    let parented = backend.calls.iter().filter(|c| matches!(c, Call::Parent(_, 0))).count();
    assert_eq!(parented, 5);

    // One material per slot, shared between meshes.
    let materials: Vec<_> = backend
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Material(name, desc) => Some((name.clone(), desc.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(materials.len(), 4);
    let (_, floor) = materials.iter().find(|(n, _)| n == "floor-material").unwrap();
    match floor {
        MaterialDesc::Pbr { albedo: Some(tex), normal, .. } => {
            assert_eq!((tex.u_scale, tex.v_scale, tex.w_ang), (2.0, 2.0, 0.0));
            assert!(normal.is_none());
        }
        other => panic!("unexpected floor material {other:?}"),
    }

    assert!(backend.calls.contains(&Call::Immersive(1)));
    assert!(backend.calls.contains(&Call::Visible(walkthrough.water_mesh().0, false)));
    Ok(())
}

#[test]
fn test_frames_follow_the_loop() -> anyhow::Result<()> {
    let plan = demo_plan()?;
    let door = plan.waypoints.door;
    let center = plan.waypoints.center;
    let mut backend = Recorder::default();
    backend.now.set(100.0);
    let mut walkthrough = Walkthrough::mount(plan, &mut backend)?;
    backend.calls.clear();

    backend.now.set(105.0);
    let state = walkthrough.frame(&mut backend);
    assert_eq!(state.phase, 5.0);
    assert_eq!(state.overlay_alpha, 1.0);
    assert!(!state.water_visible);
    assert_eq!(
        backend.calls,
        vec![
            Call::Camera(door, center),
            Call::Alpha(1.0),
            Call::Visible(walkthrough.water_mesh().0, false),
        ]
    );

    backend.now.set(160.0);
    let state = walkthrough.frame(&mut backend);
    assert!(state.water_visible);
    assert_eq!(state.overlay_alpha, 0.0);

    // Same state on the next lap; water only pushed on changes.
    backend.now.set(280.0);
    let again = walkthrough.frame(&mut backend);
    assert_eq!(again, state);
    assert_eq!(backend.water_toggles(), vec![false, true]);
    Ok(())
}

#[test]
fn test_restart_rewinds_phase() -> anyhow::Result<()> {
    let mut backend = Recorder::default();
    let mut walkthrough = Walkthrough::mount(demo_plan()?, &mut backend)?;
    backend.now.set(70.0);
    assert_eq!(walkthrough.frame(&mut backend).segment, 3);

    walkthrough.restart(70.0);
    backend.now.set(72.0);
    let state = walkthrough.frame(&mut backend);
    assert_eq!(state.phase, 2.0);
    assert_eq!(state.segment, 0);
    Ok(())
}

#[test]
fn test_missing_fixtures_still_walk() -> anyhow::Result<()> {
    let config = ShowroomConfig::from_json(
        r#"{ "room": { "length": 2.0, "width": 2.0, "height": 2.4 },
             "materials": { "floor": "??", "walls": "??" } }"#,
    )?;
    let plan = Engine::build(&config, &MaterialTable::builtin());
    assert!(plan.fixtures.is_empty());

    let mut backend = Recorder::default();
    let mut walkthrough = Walkthrough::mount(plan, &mut backend)?;
    backend.now.set(40.0);
    let state = walkthrough.frame(&mut backend);
    assert_eq!(state.camera_position, walkthrough.plan().waypoints.sink_front);
    assert!(state.water_visible);
    Ok(())
}

#[test]
fn test_non_positive_duration_rejected_at_load() {
    let json = DEMO.replace("\"loop_duration\": 120", "\"loop_duration\": 0");
    let err = ShowroomConfig::from_json(&json).unwrap_err();
    assert!(format!("{err:#}").contains("loop duration"));
}
