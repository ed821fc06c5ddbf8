//! Room geometry: wall-relative placements to room-space coordinates.
//!
//! The room is centered on the origin with the floor at `y = 0`. Every
//! function here is total: out-of-range offsets simply land outside the room.

use glam::Vec3;

use super::source::{RoomSpec, WallId};

/// Absolute position of a point `offset` meters along `wall`, at `height`.
pub fn resolve_wall_position(room: &RoomSpec, wall: WallId, offset: f32, height: f32) -> Vec3 {
    let half_l = room.length / 2.0;
    let half_w = room.width / 2.0;
    match wall {
        WallId::North => Vec3::new(-half_l + offset, height, -half_w),
        WallId::South => Vec3::new(-half_l + offset, height, half_w),
        WallId::East => Vec3::new(half_l, height, -half_w + offset),
        WallId::West => Vec3::new(-half_l, height, -half_w + offset),
    }
}

/// Unit vector from `wall` toward the room interior.
pub fn inward_direction(wall: WallId) -> Vec3 {
    match wall {
        WallId::North => Vec3::Z,
        WallId::South => Vec3::NEG_Z,
        WallId::West => Vec3::X,
        WallId::East => Vec3::NEG_X,
    }
}

/// Usable length of a wall, i.e. the valid range of offsets is `[0, span]`.
pub fn wall_span(room: &RoomSpec, wall: WallId) -> f32 {
    match wall {
        WallId::North | WallId::South => room.length,
        WallId::East | WallId::West => room.width,
    }
}

/// Yaw (radians around +Y) that turns a mesh's local +Z toward the room
/// interior from `wall`.
pub fn facing_yaw(wall: WallId) -> f32 {
    let dir = inward_direction(wall);
    dir.x.atan2(dir.z)
}
