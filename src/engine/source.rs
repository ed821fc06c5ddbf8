//! Source configuration: the human-authored room description.
//!
//! These types define *what the showroom contains* (room extents, surfaces,
//! fixtures, branding, timeline pacing), never how it is drawn. The engine
//! reads them once at startup and resolves them into a `ScenePlan`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Duration of the reference walkthrough; timeline fractions are defined
/// against it.
pub const REFERENCE_LOOP_SECONDS: f64 = 120.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowroomConfig {
    pub room: RoomConfig,
    pub materials: SurfaceMaterials,
    /// Extra tile definitions keyed by material code. Entries override the
    /// built-in library.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tiles: BTreeMap<String, MaterialDef>,
    #[serde(default)]
    pub fixtures: Vec<FixtureDescriptor>,
    #[serde(default)]
    pub brand: Brand,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub length: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    #[serde(flatten)]
    pub spec: RoomSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door: Option<WallOffsetPlacement>,
}

/// Wall labels. North/South run along X at `z = ∓width/2`, East/West run
/// along Z at `x = ±length/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallId {
    North,
    South,
    East,
    West,
}

impl WallId {
    pub const ALL: [WallId; 4] = [WallId::North, WallId::South, WallId::East, WallId::West];

    pub fn name(self) -> &'static str {
        match self {
            WallId::North => "north",
            WallId::South => "south",
            WallId::East => "east",
            WallId::West => "west",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallOffsetPlacement {
    pub wall: WallId,
    pub offset: f32,
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceMaterials {
    pub floor: String,
    pub walls: String,
}

fn default_repeat() -> f32 {
    1.0
}

/// A tile material: textures plus how they are tiled across a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    #[serde(default, alias = "albedoUrl", skip_serializing_if = "Option::is_none")]
    pub albedo_url: Option<String>,
    #[serde(default, alias = "normalUrl", skip_serializing_if = "Option::is_none")]
    pub normal_url: Option<String>,
    #[serde(default = "default_repeat", alias = "repeatX")]
    pub repeat_x: f32,
    #[serde(default = "default_repeat", alias = "repeatY")]
    pub repeat_y: f32,
    #[serde(default, alias = "rotationDeg")]
    pub rotation_deg: f32,
    /// Flat albedo used when no texture is present (linear RGB).
    #[serde(default = "default_albedo_color")]
    pub albedo_color: [f32; 3],
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default)]
    pub metallic: f32,
}

pub const DEFAULT_ROUGHNESS: f32 = 0.8;
pub const NEUTRAL_GRAY: [f32; 3] = [0.7, 0.7, 0.7];

fn default_albedo_color() -> [f32; 3] {
    NEUTRAL_GRAY
}

fn default_roughness() -> f32 {
    DEFAULT_ROUGHNESS
}

// ---------------------------------------------------------------------------
// Fixtures and branding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub wall: WallId,
    pub offset: f32,
}

impl FixtureDescriptor {
    pub fn is_sink(&self) -> bool {
        self.kind == "sink"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default)]
    pub claim: String,
    #[serde(default, alias = "logoUrl", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Timeline pacing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_loop_duration")]
    pub loop_duration: f64,
    #[serde(default = "default_fade_time")]
    pub fade_time: f64,
    #[serde(default = "default_show_time")]
    pub show_time: f64,
    /// Closed interval (seconds into the loop) during which water runs.
    /// Defaults to the reference `[30, 95]` scaled to `loop_duration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<[f64; 2]>,
}

fn default_loop_duration() -> f64 {
    REFERENCE_LOOP_SECONDS
}

fn default_fade_time() -> f64 {
    1.0
}

fn default_show_time() -> f64 {
    5.0
}

impl Default for TimelineConfig {
    fn default() -> Self {
        TimelineConfig {
            loop_duration: default_loop_duration(),
            fade_time: default_fade_time(),
            show_time: default_show_time(),
            water: None,
        }
    }
}

impl TimelineConfig {
    pub fn water_interval(&self) -> [f64; 2] {
        self.water.unwrap_or_else(|| {
            let scale = self.loop_duration / REFERENCE_LOOP_SECONDS;
            [30.0 * scale, 95.0 * scale]
        })
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("room {field} must be a positive number of meters, got {value}")]
    RoomDimension { field: &'static str, value: f32 },
    #[error("loop duration must be positive, got {0}")]
    LoopDuration(f64),
    #[error("fade time must be positive and show time non-negative (fade {fade}, show {show})")]
    OverlayTiming { fade: f64, show: f64 },
    #[error("water interval [{0}, {1}] is not inside the loop")]
    WaterInterval(f64, f64),
    #[error("tile '{code}' must repeat a positive number of times (x {x}, y {y})")]
    TileRepeat { code: String, x: f32, y: f32 },
    #[error("fixture '{0}' has a non-finite offset")]
    FixtureOffset(String),
    #[error("door offset must be finite, got {0}")]
    DoorOffset(f32),
}

impl ShowroomConfig {
    /// Read, parse and validate a configuration document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_json(&json)
            .with_context(|| format!("Invalid configuration {}", path.display()))?;
        log::info!(
            "Loaded showroom {}x{}x{} m with {} fixtures from {}",
            config.room.spec.length,
            config.room.spec.width,
            config.room.spec.height,
            config.fixtures.len(),
            path.display(),
        );
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: ShowroomConfig = serde_json::from_str(json).context("Failed to parse JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let RoomSpec { length, width, height } = self.room.spec;
        for (field, value) in [("length", length), ("width", width), ("height", height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::RoomDimension { field, value });
            }
        }

        let t = &self.timeline;
        if !(t.loop_duration.is_finite() && t.loop_duration > 0.0) {
            return Err(ConfigError::LoopDuration(t.loop_duration));
        }
        if !(t.fade_time > 0.0 && t.show_time >= 0.0) {
            return Err(ConfigError::OverlayTiming { fade: t.fade_time, show: t.show_time });
        }
        let [start, end] = t.water_interval();
        if !(0.0 <= start && start <= end && end <= t.loop_duration) {
            return Err(ConfigError::WaterInterval(start, end));
        }

        for (code, tile) in &self.tiles {
            let (x, y) = (tile.repeat_x, tile.repeat_y);
            if !(x.is_finite() && x > 0.0 && y.is_finite() && y > 0.0) {
                return Err(ConfigError::TileRepeat { code: code.clone(), x, y });
            }
        }

        if let Some(door) = &self.room.door {
            if !door.offset.is_finite() {
                return Err(ConfigError::DoorOffset(door.offset));
            }
        }
        if let Some(f) = self.fixtures.iter().find(|f| !f.offset.is_finite()) {
            return Err(ConfigError::FixtureOffset(f.id.clone()));
        }
        Ok(())
    }
}
