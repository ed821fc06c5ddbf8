//! In-memory scene store behind the terminal player.
//!
//! Records what the walkthrough asks the renderer to do and turns it into a
//! top-down map on demand.

use std::time::Instant;

use glam::Vec3;

use crate::renderer::map::MapProjection;
use crate::renderer::{MaterialDesc, MaterialHandle, MeshHandle, RenderBackend};
use crate::types::{Color, DrawOp, NamedColor, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshShape {
    Node,
    Plane { size: f32 },
    Box { size: Vec3 },
    Ground { width: f32, depth: f32 },
}

#[derive(Debug, Clone)]
pub struct MeshEntry {
    pub name: String,
    pub shape: MeshShape,
    pub position: Vec3,
    pub rotation: Vec3,
    pub parent: Option<MeshHandle>,
    pub material: Option<MaterialHandle>,
    pub visible: bool,
}

/// Pausable wall clock.
#[derive(Debug, Clone)]
pub struct Clock {
    origin: Instant,
    paused_at: Option<f64>,
    paused_total: f64,
}

impl Clock {
    pub fn new() -> Self {
        Clock {
            origin: Instant::now(),
            paused_at: None,
            paused_total: 0.0,
        }
    }

    pub fn now(&self) -> f64 {
        match self.paused_at {
            Some(t) => t,
            None => self.origin.elapsed().as_secs_f64() - self.paused_total,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn toggle_pause(&mut self) {
        match self.paused_at.take() {
            Some(t) => self.paused_total = self.origin.elapsed().as_secs_f64() - t,
            None => self.paused_at = Some(self.now()),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct TerminalBackend {
    pub meshes: Vec<MeshEntry>,
    pub materials: Vec<MaterialDesc>,
    pub camera: Option<(Vec3, Vec3)>,
    pub overlay_alpha: f32,
    pub clock: Clock,
}

impl TerminalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, name: &str, shape: MeshShape) -> MeshHandle {
        self.meshes.push(MeshEntry {
            name: name.to_string(),
            shape,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            parent: None,
            material: None,
            visible: true,
        });
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    pub fn entry(&self, mesh: MeshHandle) -> &MeshEntry {
        &self.meshes[mesh.0 as usize]
    }

    pub fn world_position(&self, mesh: MeshHandle) -> Vec3 {
        let mut entry = self.entry(mesh);
        let mut position = entry.position;
        while let Some(parent) = entry.parent {
            entry = self.entry(parent);
            position += entry.position;
        }
        position
    }

    pub fn toggle_visible(&mut self, mesh: MeshHandle) {
        let entry = &mut self.meshes[mesh.0 as usize];
        entry.visible = !entry.visible;
    }

    fn material_style(&self, material: Option<MaterialHandle>) -> Style {
        match material {
            Some(m) => Style::fg(Color::from_linear(self.materials[m.0 as usize].base_color())),
            None => Style::default(),
        }
    }

    /// Draw operations for the current scene state.
    pub fn map_ops(&self, projection: &MapProjection) -> Vec<DrawOp> {
        let floor = self.meshes.iter().find(|m| matches!(m.shape, MeshShape::Ground { .. }));
        let wall = self.meshes.iter().find(|m| m.name.starts_with("wall-"));
        let mut floor_style = self.material_style(floor.and_then(|m| m.material));
        floor_style.dim = true;
        let mut wall_style = self.material_style(wall.and_then(|m| m.material));
        wall_style.bold = true;

        let mut ops = projection.room_ops(floor_style, wall_style);

        for (i, entry) in self.meshes.iter().enumerate() {
            if !entry.visible || entry.parent.is_some() {
                continue;
            }
            let center = self.world_position(MeshHandle(i as u32));
            let style = self.material_style(entry.material);
            match entry.shape {
                MeshShape::Plane { .. } if entry.name == "water" => {
                    let water = Style {
                        fg: Some(Color::Named(NamedColor::Cyan)),
                        bold: true,
                        ..Default::default()
                    };
                    ops.extend(projection.point_op(center, '≈', water, 7));
                }
                MeshShape::Plane { .. } if entry.name == "door" => {
                    let door = Style::fg(Color::Named(NamedColor::Magenta));
                    ops.extend(projection.point_op(center, '▒', door, 2));
                }
                MeshShape::Box { .. } if entry.name.starts_with("faucet-") => {
                    ops.extend(projection.point_op(center, '┬', style, 4));
                }
                MeshShape::Box { size } => {
                    // Quarter-turned boxes swap their footprint axes.
                    let sideways = entry.rotation.y.sin().abs() > 0.5;
                    let (hx, hz) = if sideways {
                        (size.z / 2.0, size.x / 2.0)
                    } else {
                        (size.x / 2.0, size.z / 2.0)
                    };
                    ops.extend(projection.footprint_ops(center, hx, hz, '■', style, 5));
                }
                _ => {}
            }
        }

        if let Some((position, target)) = self.camera {
            ops.extend(projection.camera_ops(position, target));
        }
        ops
    }
}

impl RenderBackend for TerminalBackend {
    fn create_node(&mut self, name: &str) -> MeshHandle {
        self.add(name, MeshShape::Node)
    }

    fn create_plane(&mut self, name: &str, size: f32) -> MeshHandle {
        self.add(name, MeshShape::Plane { size })
    }

    fn create_box(&mut self, name: &str, size: Vec3) -> MeshHandle {
        self.add(name, MeshShape::Box { size })
    }

    fn create_ground(&mut self, name: &str, width: f32, depth: f32) -> MeshHandle {
        self.add(name, MeshShape::Ground { width, depth })
    }

    fn set_position(&mut self, mesh: MeshHandle, position: Vec3) {
        self.meshes[mesh.0 as usize].position = position;
    }

    fn set_rotation(&mut self, mesh: MeshHandle, rotation: Vec3) {
        self.meshes[mesh.0 as usize].rotation = rotation;
    }

    fn set_parent(&mut self, mesh: MeshHandle, parent: MeshHandle) {
        self.meshes[mesh.0 as usize].parent = Some(parent);
    }

    fn create_material(&mut self, name: &str, desc: &MaterialDesc) -> MaterialHandle {
        if let MaterialDesc::Pbr { albedo: Some(tex), .. } = desc {
            log::debug!("{name}: albedo {} (uv {}x{}, {} rad)", tex.url, tex.u_scale, tex.v_scale, tex.w_ang);
        }
        self.materials.push(desc.clone());
        MaterialHandle(self.materials.len() as u32 - 1)
    }

    fn assign_material(&mut self, mesh: MeshHandle, material: MaterialHandle) {
        self.meshes[mesh.0 as usize].material = Some(material);
    }

    fn set_mesh_visible(&mut self, mesh: MeshHandle, visible: bool) {
        self.meshes[mesh.0 as usize].visible = visible;
    }

    fn set_overlay_alpha(&mut self, alpha: f32) {
        self.overlay_alpha = alpha;
    }

    fn set_camera_pose(&mut self, position: Vec3, target: Vec3) {
        self.camera = Some((position, target));
    }

    fn now_seconds(&self) -> f64 {
        self.clock.now()
    }
}
