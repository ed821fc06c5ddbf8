//! Shared boundary types for the showroom walkthrough.
//!
//! This module defines the data contracts between the stages:
//! - Engine → Scheduler: `Waypoints`, resolved once at startup
//! - Scheduler → Renderer (per frame): `LoopState`
//! - Map rasterizer → Player: `DrawOp`s and `Cell` grids

use glam::Vec3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Engine → Scheduler boundary
// ---------------------------------------------------------------------------

/// Named camera positions, fixed for the lifetime of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoints {
    pub door: Vec3,
    pub center: Vec3,
    pub sink_front: Vec3,
    /// Look-at point while the camera visits the sink.
    pub sink_target: Vec3,
}

// ---------------------------------------------------------------------------
// Scheduler → Renderer boundary (recomputed every frame)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopState {
    /// Seconds into the current loop, in `[0, loop_duration)`.
    pub phase: f64,
    /// Index of the active timeline segment.
    pub segment: usize,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub water_visible: bool,
    /// Brand overlay opacity in `[0, 1]`.
    pub overlay_alpha: f32,
}

// ---------------------------------------------------------------------------
// Terminal style primitives (map preview)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// Linear RGB in `[0, 1]` to a terminal color.
    pub fn from_linear(rgb: [f32; 3]) -> Self {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::Rgb {
            r: to_u8(rgb[0]),
            g: to_u8(rgb[1]),
            b: to_u8(rgb[2]),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Style {
            fg: Some(color),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DrawOp {
    pub x: u16,
    pub y: u16,
    pub ch: char,
    pub style: Style,
    pub z_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}
