//! Chunk map data: a height field plus its color classification

use serde::{Deserialize, Serialize};

use super::noise_map::{generate_noise_map, HeightField, NoiseParams};
use crate::core::types::Vec2;

/// Vertex resolution of one chunk footprint. The streamed chunk edge is one
/// less (240 quads), so neighbouring chunks share their border vertices.
pub const MAP_CHUNK_SIZE: usize = 241;

/// RGBA color, 8 bits per channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Row-major grid of colors
#[derive(Clone, Debug, PartialEq)]
pub struct ColorField {
    width: usize,
    height: usize,
    values: Vec<Color>,
}

impl ColorField {
    fn filled(width: usize, height: usize, fill: Color) -> Self {
        Self {
            width,
            height,
            values: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Color {
        self.values[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, color: Color) {
        self.values[y * self.width + x] = color;
    }

    /// Raw row-major pixels
    pub fn pixels(&self) -> &[Color] {
        &self.values
    }
}

/// One band of the height classification; `height` is the inclusive upper
/// bound of the band in normalized height units.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainRegion {
    pub name: String,
    pub height: f32,
    pub color: Color,
}

impl TerrainRegion {
    pub fn new(name: &str, height: f32, color: Color) -> Self {
        Self {
            name: name.to_string(),
            height,
            color,
        }
    }
}

/// Default water-to-snow band table, ascending by upper bound
pub fn default_regions() -> Vec<TerrainRegion> {
    vec![
        TerrainRegion::new("deep water", 0.3, Color::rgb(52, 98, 195)),
        TerrainRegion::new("shallow water", 0.4, Color::rgb(54, 103, 199)),
        TerrainRegion::new("sand", 0.45, Color::rgb(210, 208, 125)),
        TerrainRegion::new("grass", 0.55, Color::rgb(86, 152, 23)),
        TerrainRegion::new("forest", 0.6, Color::rgb(62, 107, 18)),
        TerrainRegion::new("rock", 0.7, Color::rgb(90, 69, 60)),
        TerrainRegion::new("mountain", 0.9, Color::rgb(75, 60, 53)),
        TerrainRegion::new("snow", 1.0, Color::rgb(255, 255, 255)),
    ]
}

/// Height and color fields for one chunk footprint. Produced once,
/// immutable thereafter.
#[derive(Clone, Debug)]
pub struct ChunkData {
    pub height_field: HeightField,
    pub color_field: ColorField,
}

/// Produces `ChunkData` for arbitrary chunk centers from one parameter set
#[derive(Clone, Debug)]
pub struct MapGenerator {
    params: NoiseParams,
    regions: Vec<TerrainRegion>,
}

impl MapGenerator {
    /// Create a generator; the footprint resolution is pinned to
    /// `MAP_CHUNK_SIZE` regardless of what the params carry.
    pub fn new(mut params: NoiseParams, regions: Vec<TerrainRegion>) -> Self {
        params.width = MAP_CHUNK_SIZE;
        params.height = MAP_CHUNK_SIZE;
        Self { params, regions }
    }

    /// Default noise parameters and region table for `seed`
    pub fn with_defaults(seed: u32) -> Self {
        Self::new(
            NoiseParams {
                seed,
                ..NoiseParams::default()
            },
            default_regions(),
        )
    }

    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    pub fn regions(&self) -> &[TerrainRegion] {
        &self.regions
    }

    /// Generate the map data for a chunk footprint centered at `center`
    /// (planar chunk-space units).
    pub fn generate_at(&self, center: Vec2) -> ChunkData {
        let params = NoiseParams {
            offset: self.params.offset + center,
            ..self.params.clone()
        };
        let height_field = generate_noise_map(&params);
        let color_field = self.classify(&height_field);
        ChunkData {
            height_field,
            color_field,
        }
    }

    /// Assign each cell the color of the first band whose upper bound
    /// contains its height; heights above every band keep the last color.
    fn classify(&self, heights: &HeightField) -> ColorField {
        let fallback = self
            .regions
            .last()
            .map(|r| r.color)
            .unwrap_or(Color::rgb(0, 0, 0));
        let mut colors = ColorField::filled(heights.width(), heights.height(), fallback);

        for y in 0..heights.height() {
            for x in 0..heights.width() {
                let h = heights.get(x, y);
                for region in &self.regions {
                    if h <= region.height {
                        colors.set(x, y, region.color);
                        break;
                    }
                }
            }
        }
        colors
    }
}
