//! Procedural map generation: noise fields, color classification, meshes
//!
//! The pipeline per chunk:
//! 1. Fractal noise height field (noise_map)
//! 2. Region color classification (map)
//! 3. Decimated mesh per requested LOD tier (mesh)
//! 4. RGBA texture from the color field (texture)
//!
//! `jobs` wraps the whole thing as background workers behind the
//! streaming request contract.

pub mod jobs;
pub mod map;
pub mod mesh;
pub mod noise_map;
pub mod texture;

pub use jobs::BackgroundGenerator;
pub use map::{default_regions, ChunkData, Color, ColorField, MapGenerator, TerrainRegion, MAP_CHUNK_SIZE};
pub use mesh::{generate_terrain_mesh, MeshGeometry};
pub use noise_map::{generate_noise_map, HeightField, NoiseParams, NormalizeMode, MIN_NOISE_SCALE};
pub use texture::{build_color_texture, TextureArtifact};
