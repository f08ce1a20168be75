//! Fractal octave-noise height fields
//!
//! Sums several Perlin layers at increasing frequency and decreasing
//! amplitude into a 2D scalar field. The whole generation is a pure
//! function of its parameters: equal inputs produce bit-identical fields,
//! which is what makes a world reproducible from its seed.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Smallest allowed noise scale; smaller configured values are floored
/// to this instead of failing.
pub const MIN_NOISE_SCALE: f32 = 1e-4;

/// Octave offsets are drawn from this half-open integer range.
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// How raw octave sums are mapped into a usable height range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Remap against the min/max observed in this field. Always fills
    /// [0, 1] exactly, but neighbouring fields normalize differently.
    Local,
    /// Divide by the theoretical amplitude bound so every field shares one
    /// mapping. Values are >= 0 with no upper clamp.
    Global,
}

/// Parameters controlling height-field generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub width: usize,
    pub height: usize,
    /// Horizontal scale (larger = smoother)
    pub scale: f32,
    pub seed: u32,
    /// Number of noise layers summed per cell
    pub octaves: u32,
    /// Per-octave amplitude falloff (0.5 typical)
    pub persistence: f32,
    /// Per-octave frequency growth (2.0 typical)
    pub lacunarity: f32,
    /// Planar sampling offset, added on top of the per-octave offsets
    pub offset: Vec2,
    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            width: 241,
            height: 241,
            scale: 50.0,
            seed: 12345,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
            normalize_mode: NormalizeMode::Global,
        }
    }
}

/// Row-major grid of heights
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightField {
    fn filled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Height at cell (x, y)
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, value: f32) {
        self.values[y * self.width + x] = value;
    }

    /// Raw row-major cell values
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Generate a fractal noise height field from `params`.
///
/// Each octave samples Perlin noise at a seeded random planar offset; the
/// x component adds the configured offset while the y component subtracts
/// it. That asymmetry is load-bearing: existing worlds reproduce only if
/// the offsets combine exactly this way.
pub fn generate_noise_map(params: &NoiseParams) -> HeightField {
    let scale = params.scale.max(MIN_NOISE_SCALE);
    let perlin = Perlin::new(params.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed as u64);

    let mut octave_offsets = Vec::with_capacity(params.octaves as usize);
    let mut max_possible_height = 0.0f32;
    let mut amplitude = 1.0f32;
    for _ in 0..params.octaves {
        let offset_x = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f32
            + params.offset.x;
        let offset_y = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f32
            - params.offset.y;
        octave_offsets.push(Vec2::new(offset_x, offset_y));

        max_possible_height += amplitude;
        amplitude *= params.persistence;
    }

    let mut field = HeightField::filled(params.width, params.height);
    let mut min_height = f32::MAX;
    let mut max_height = f32::MIN;

    // Integer halves: sampling stays centered on the same lattice cell for
    // odd dimensions, which existing seeds depend on.
    let half_width = (params.width / 2) as f32;
    let half_height = (params.height / 2) as f32;

    for y in 0..params.height {
        for x in 0..params.width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f32;
            let mut noise_height = 0.0f32;

            for octave in &octave_offsets {
                let sample_x = (x as f32 - half_width + octave.x) / scale * frequency;
                let sample_y = (y as f32 - half_height + octave.y) / scale * frequency;

                // Perlin output is already signed in [-1, 1]
                let value = perlin.get([sample_x as f64, sample_y as f64]) as f32;
                noise_height += value * amplitude;

                amplitude *= params.persistence;
                frequency *= params.lacunarity;
            }

            min_height = min_height.min(noise_height);
            max_height = max_height.max(noise_height);
            field.set(x, y, noise_height);
        }
    }

    normalize(
        &mut field,
        params.normalize_mode,
        min_height,
        max_height,
        max_possible_height,
    );
    field
}

fn normalize(
    field: &mut HeightField,
    mode: NormalizeMode,
    min_height: f32,
    max_height: f32,
    max_possible_height: f32,
) {
    for value in &mut field.values {
        *value = match mode {
            NormalizeMode::Local => inverse_lerp(min_height, max_height, *value),
            // Asymmetric on purpose: floored at zero, unbounded above.
            NormalizeMode::Global => ((*value + 1.0) / max_possible_height / 1.2).max(0.0),
        };
    }
}

fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}
