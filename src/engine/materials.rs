//! Material resolver: tile codes to tiling parameters.
//!
//! The lookup table is passed in explicitly; `MaterialTable::builtin()` is
//! the stock tile library and configuration `tiles` are layered on top.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::source::{DEFAULT_ROUGHNESS, MaterialDef, NEUTRAL_GRAY};

/// Texture sampling parameters, identical for albedo and normal maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureParams {
    pub url: String,
    pub u_scale: f32,
    pub v_scale: f32,
    /// UV rotation in radians.
    pub w_ang: f32,
}

#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    entries: BTreeMap<String, MaterialDef>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock tile library.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(
            "tile-travertine",
            MaterialDef::tiled(
                "https://images.pexels.com/photos/1457842/pexels-photo-1457842.jpeg?w=1024",
                None,
                2.0,
                2.0,
                0.0,
            ),
        );
        table.insert(
            "tile-hex-white",
            MaterialDef::tiled(
                "textures/hex_white_albedo.jpg",
                Some("textures/hex_white_normal.jpg"),
                6.0,
                6.0,
                0.0,
            ),
        );
        table.insert(
            "tile-herringbone-oak",
            MaterialDef::tiled(
                "textures/herringbone_oak_albedo.jpg",
                Some("textures/herringbone_oak_normal.jpg"),
                3.0,
                1.5,
                45.0,
            ),
        );
        table.insert(
            "plaster-white",
            MaterialDef {
                albedo_color: [0.92, 0.91, 0.88],
                roughness: 0.95,
                ..MaterialDef::fallback()
            },
        );
        table
    }

    pub fn insert(&mut self, code: impl Into<String>, def: MaterialDef) {
        self.entries.insert(code.into(), def);
    }

    /// Layer `overrides` on top of this table.
    pub fn extend<'a>(&mut self, overrides: impl IntoIterator<Item = (&'a String, &'a MaterialDef)>) {
        for (code, def) in overrides {
            self.entries.insert(code.clone(), def.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up `code`. Unknown codes resolve to the neutral fallback so that
    /// incomplete catalogs never stop the walkthrough.
    pub fn resolve(&self, code: &str) -> MaterialDef {
        self.entries
            .get(code)
            .cloned()
            .unwrap_or_else(MaterialDef::fallback)
    }
}

impl MaterialDef {
    pub fn tiled(
        albedo_url: &str,
        normal_url: Option<&str>,
        repeat_x: f32,
        repeat_y: f32,
        rotation_deg: f32,
    ) -> Self {
        MaterialDef {
            albedo_url: Some(albedo_url.to_string()),
            normal_url: normal_url.map(str::to_string),
            repeat_x,
            repeat_y,
            rotation_deg,
            albedo_color: [1.0, 1.0, 1.0],
            roughness: DEFAULT_ROUGHNESS,
            metallic: 0.0,
        }
    }

    /// Flat neutral gray, no textures.
    pub fn fallback() -> Self {
        MaterialDef {
            albedo_url: None,
            normal_url: None,
            repeat_x: 1.0,
            repeat_y: 1.0,
            rotation_deg: 0.0,
            albedo_color: NEUTRAL_GRAY,
            roughness: DEFAULT_ROUGHNESS,
            metallic: 0.0,
        }
    }

    pub fn albedo_texture(&self) -> Option<TextureParams> {
        self.albedo_url.as_deref().map(|url| self.texture(url))
    }

    /// Normal map sampling; only present alongside an albedo texture.
    pub fn normal_texture(&self) -> Option<TextureParams> {
        self.albedo_url.as_ref()?;
        self.normal_url.as_deref().map(|url| self.texture(url))
    }

    fn texture(&self, url: &str) -> TextureParams {
        TextureParams {
            url: url.to_string(),
            u_scale: self.repeat_x,
            v_scale: self.repeat_y,
            w_ang: self.rotation_deg * std::f32::consts::PI / 180.0,
        }
    }
}
