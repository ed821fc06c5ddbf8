//! Renderer: the boundary to a rendering backend.
//!
//! `RenderBackend` is the small set of primitives the walkthrough needs from
//! a 3D engine. `Walkthrough` mounts a `ScenePlan` on a backend once and then
//! pushes one `LoopState` per frame. Nothing here knows how pixels (or
//! terminal cells) are produced.

pub mod map;

use anyhow::Result;
use glam::Vec3;
use serde::Serialize;

use crate::engine::materials::TextureParams;
use crate::engine::scene::{MaterialSlot, Shape};
use crate::engine::source::MaterialDef;
use crate::engine::{ScenePlan, WATER_ALPHA, WATER_COLOR};
use crate::scheduler::Scheduler;
use crate::types::LoopState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MaterialHandle(pub u32);

/// Material parameters handed to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialDesc {
    /// Physically based surface; textures share one UV transform.
    Pbr {
        albedo_color: [f32; 3],
        albedo: Option<TextureParams>,
        normal: Option<TextureParams>,
        roughness: f32,
        metallic: f32,
    },
    /// Flat translucent surface.
    Standard { color: [f32; 3], alpha: f32 },
}

impl MaterialDesc {
    pub fn from_def(def: &MaterialDef) -> Self {
        MaterialDesc::Pbr {
            albedo_color: def.albedo_color,
            albedo: def.albedo_texture(),
            normal: def.normal_texture(),
            roughness: def.roughness,
            metallic: def.metallic,
        }
    }

    /// Representative flat color, used by backends that cannot sample
    /// textures.
    pub fn base_color(&self) -> [f32; 3] {
        match self {
            MaterialDesc::Pbr { albedo_color, .. } => *albedo_color,
            MaterialDesc::Standard { color, .. } => *color,
        }
    }
}

/// Primitive operations of an external rendering engine.
pub trait RenderBackend {
    /// A transform-only node.
    fn create_node(&mut self, name: &str) -> MeshHandle;
    fn create_plane(&mut self, name: &str, size: f32) -> MeshHandle;
    fn create_box(&mut self, name: &str, size: Vec3) -> MeshHandle;
    fn create_ground(&mut self, name: &str, width: f32, depth: f32) -> MeshHandle;
    fn set_position(&mut self, mesh: MeshHandle, position: Vec3);
    fn set_rotation(&mut self, mesh: MeshHandle, rotation: Vec3);
    fn set_parent(&mut self, mesh: MeshHandle, parent: MeshHandle);
    fn create_material(&mut self, name: &str, desc: &MaterialDesc) -> MaterialHandle;
    fn assign_material(&mut self, mesh: MeshHandle, material: MaterialHandle);
    fn set_mesh_visible(&mut self, mesh: MeshHandle, visible: bool);
    fn set_overlay_alpha(&mut self, alpha: f32);
    fn set_camera_pose(&mut self, position: Vec3, target: Vec3);
    /// Monotonic clock in seconds.
    fn now_seconds(&self) -> f64;

    /// Offer an immersive (VR) session walking on `floor`. Backends without
    /// one keep the default.
    fn enable_immersive_session(&mut self, floor: &[MeshHandle]) -> Result<()> {
        log::debug!("Immersive session not available ({} floor meshes)", floor.len());
        Ok(())
    }
}

/// A mounted scene plus its scheduler.
#[derive(Debug)]
pub struct Walkthrough {
    plan: ScenePlan,
    scheduler: Scheduler,
    water: MeshHandle,
    /// Last scheduled water state pushed to the backend.
    water_applied: Option<bool>,
}

impl Walkthrough {
    /// Create every scene node on `backend` and start the loop clock.
    pub fn mount<B: RenderBackend>(plan: ScenePlan, backend: &mut B) -> Result<Self> {
        let mut meshes: Vec<MeshHandle> = Vec::with_capacity(plan.graph.len());
        let mut slots: Vec<(MaterialSlot, MaterialHandle)> = Vec::new();
        let mut floor = Vec::new();

        for (id, node) in plan.graph.nodes() {
            let mesh = match node.shape {
                Shape::Empty => backend.create_node(&node.name),
                Shape::Plane { size } => backend.create_plane(&node.name, size),
                Shape::Box { size } => backend.create_box(&node.name, size),
                Shape::Ground { width, depth } => {
                    let mesh = backend.create_ground(&node.name, width, depth);
                    floor.push(mesh);
                    mesh
                }
            };
            backend.set_position(mesh, node.position);
            backend.set_rotation(mesh, node.rotation);
            if let Some(parent) = node.parent {
                // Parents always precede their children.
                backend.set_parent(mesh, meshes[parent.0]);
            }
            if let Some(slot) = node.material {
                let material = match slots.iter().find(|(s, _)| *s == slot) {
                    Some((_, handle)) => *handle,
                    None => {
                        let handle = backend.create_material(slot_name(slot), &Self::material(&plan, slot));
                        slots.push((slot, handle));
                        handle
                    }
                };
                backend.assign_material(mesh, material);
            }
            if !node.visible {
                backend.set_mesh_visible(mesh, false);
            }
            debug_assert_eq!(meshes.len(), id.0);
            meshes.push(mesh);
        }

        backend.set_overlay_alpha(0.0);
        backend.enable_immersive_session(&floor)?;

        let water = meshes[plan.water_node.0];
        let scheduler = Scheduler::for_plan(&plan, backend.now_seconds());
        log::info!(
            "Mounted {} meshes with {} materials; loop of {} s",
            meshes.len(),
            slots.len(),
            scheduler.timeline().loop_duration,
        );

        Ok(Walkthrough {
            plan,
            scheduler,
            water,
            water_applied: None,
        })
    }

    fn material(plan: &ScenePlan, slot: MaterialSlot) -> MaterialDesc {
        match slot {
            MaterialSlot::Floor => MaterialDesc::from_def(&plan.floor_material),
            MaterialSlot::Walls => MaterialDesc::from_def(&plan.wall_material),
            MaterialSlot::Fixture => MaterialDesc::Pbr {
                albedo_color: [0.95, 0.95, 0.95],
                albedo: None,
                normal: None,
                roughness: 0.2,
                metallic: 0.0,
            },
            MaterialSlot::Water => MaterialDesc::Standard {
                color: WATER_COLOR,
                alpha: WATER_ALPHA,
            },
        }
    }

    /// Advance one frame: compute the loop state for the backend's clock and
    /// apply it. Water visibility is only pushed when the schedule changes
    /// it, so a manual toggle holds until the next scheduled change.
    pub fn frame<B: RenderBackend>(&mut self, backend: &mut B) -> LoopState {
        let state = self.scheduler.tick(backend.now_seconds());
        backend.set_camera_pose(state.camera_position, state.camera_target);
        backend.set_overlay_alpha(state.overlay_alpha);
        if self.water_applied != Some(state.water_visible) {
            backend.set_mesh_visible(self.water, state.water_visible);
            self.water_applied = Some(state.water_visible);
        }
        state
    }

    /// Restart the loop at `now`.
    pub fn restart(&mut self, now: f64) {
        self.scheduler = Scheduler::for_plan(&self.plan, now);
        self.water_applied = None;
    }

    pub fn plan(&self) -> &ScenePlan {
        &self.plan
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn water_mesh(&self) -> MeshHandle {
        self.water
    }
}

fn slot_name(slot: MaterialSlot) -> &'static str {
    match slot {
        MaterialSlot::Floor => "floor-material",
        MaterialSlot::Walls => "wall-material",
        MaterialSlot::Fixture => "fixture-material",
        MaterialSlot::Water => "water-material",
    }
}
