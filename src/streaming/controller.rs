//! Observer tracking and the chunk streaming window
//!
//! The controller owns the chunk registry and the observer state. Each
//! tick it drains finished worker results and, once the observer has
//! moved far enough since the last recompute, hides the previous pass's
//! visible chunks and rescans the square window of coordinates around
//! the observer, updating chunks that exist and creating the ones that
//! don't. The visible set filled by chunk updates during one pass
//! becomes the hide list of the next: that indirection is what hides
//! stale chunks the window left behind without the controller tracking
//! their distance itself.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec2, Vec3};
use crate::generation::map::MAP_CHUNK_SIZE;
use super::chunk::{ChunkContext, GridCoord, TerrainChunk};
use super::lod::{default_levels, max_view_distance, validate_levels, LodLevel};
use super::request::{
    completion_channel, Completion, CompletionReceiver, CompletionSender, MapDataSource,
    MeshService,
};
use super::sink::GeometrySink;

/// Minimum observer displacement (planar units) worth re-evaluating the
/// streaming window for. Fixed by design, not per-instance configuration.
pub const VIEWER_MOVE_THRESHOLD: f32 = 25.0;
const SQR_VIEWER_MOVE_THRESHOLD: f32 = VIEWER_MOVE_THRESHOLD * VIEWER_MOVE_THRESHOLD;

/// Static configuration of the streaming layer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Chunk edge length in planar units (map footprint resolution minus one)
    pub chunk_size: u32,
    /// World-to-planar scale divisor applied to observer positions
    pub world_scale: f32,
    /// Ordered LOD table; the last threshold is the max view distance
    pub levels: Vec<LodLevel>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: (MAP_CHUNK_SIZE - 1) as u32,
            world_scale: 2.0,
            levels: default_levels(),
        }
    }
}

impl StreamingConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Streams terrain chunks around a moving observer
pub struct StreamingController {
    config: StreamingConfig,
    max_view_distance: f32,
    collision_index: usize,
    /// Window half-width in chunk units
    chunks_in_view: i32,

    chunks: HashMap<GridCoord, TerrainChunk>,
    /// Chunks shown during the current visibility pass; hidden wholesale
    /// at the start of the next recompute
    visible_chunks: Vec<GridCoord>,

    viewer_position: Vec2,
    last_recompute_position: Vec2,
    has_recomputed: bool,

    map_source: Arc<dyn MapDataSource>,
    mesher: Arc<dyn MeshService>,
    sink: Box<dyn GeometrySink>,
    completion_tx: CompletionSender,
    completion_rx: CompletionReceiver,
}

impl StreamingController {
    pub fn new(
        config: StreamingConfig,
        map_source: Arc<dyn MapDataSource>,
        mesher: Arc<dyn MeshService>,
        sink: Box<dyn GeometrySink>,
    ) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(Error::Config("chunk size must be positive".into()));
        }
        if !config.world_scale.is_finite() || config.world_scale <= 0.0 {
            return Err(Error::Config(format!(
                "world scale {} must be positive",
                config.world_scale
            )));
        }
        let collision_index = validate_levels(&config.levels, config.chunk_size)?;
        let max_distance = max_view_distance(&config.levels);
        let chunks_in_view = (max_distance / config.chunk_size as f32).round() as i32;

        info!(
            "streaming: chunk size {}, {} LOD tiers, view distance {:.0} ({} chunk window radius)",
            config.chunk_size,
            config.levels.len(),
            max_distance,
            chunks_in_view
        );

        let (completion_tx, completion_rx) = completion_channel();
        Ok(Self {
            config,
            max_view_distance: max_distance,
            collision_index,
            chunks_in_view,
            chunks: HashMap::new(),
            visible_chunks: Vec::new(),
            viewer_position: Vec2::ZERO,
            last_recompute_position: Vec2::ZERO,
            has_recomputed: false,
            map_source,
            mesher,
            sink,
            completion_tx,
            completion_rx,
        })
    }

    /// Per-frame entry point. Never blocks: drains finished worker
    /// results, then recomputes the visible window if the observer moved
    /// far enough since the last recompute. The first tick always
    /// recomputes.
    pub fn on_tick(&mut self, viewer_world: Vec3) {
        self.viewer_position =
            Vec2::new(viewer_world.x, viewer_world.z) / self.config.world_scale;

        self.drain_completions();

        let moved_sq = self
            .viewer_position
            .distance_squared(self.last_recompute_position);
        if !self.has_recomputed || moved_sq > SQR_VIEWER_MOVE_THRESHOLD {
            self.refresh_visible_chunks();
            self.last_recompute_position = self.viewer_position;
            self.has_recomputed = true;
        }
    }

    /// Dispatch every completed worker result to its chunk. Results for
    /// coordinates the registry has never seen are dropped.
    fn drain_completions(&mut self) {
        while let Ok(event) = self.completion_rx.try_recv() {
            match event {
                Completion::MapData { coord, data } => {
                    if let Some(chunk) = self.chunks.get_mut(&coord) {
                        let mut ctx = ChunkContext {
                            viewer_position: self.viewer_position,
                            max_view_distance: self.max_view_distance,
                            levels: &self.config.levels,
                            mesher: self.mesher.as_ref(),
                            sink: self.sink.as_mut(),
                            completions: &self.completion_tx,
                            visible_this_pass: &mut self.visible_chunks,
                        };
                        chunk.on_map_data(data, &mut ctx);
                    }
                }
                Completion::Mesh {
                    coord,
                    lod_index,
                    geometry,
                } => {
                    if let Some(chunk) = self.chunks.get_mut(&coord) {
                        chunk.on_mesh_ready(lod_index, geometry);
                    }
                }
            }
        }
    }

    /// Hide the previous pass's visible chunks, then update or create
    /// every chunk in the window around the observer's chunk coordinate.
    fn refresh_visible_chunks(&mut self) {
        let previously_visible = std::mem::take(&mut self.visible_chunks);
        for coord in previously_visible {
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.set_visible(false, self.sink.as_mut());
            }
        }

        let chunk_size = self.config.chunk_size as f32;
        let center_x = (self.viewer_position.x / chunk_size).round() as i32;
        let center_y = (self.viewer_position.y / chunk_size).round() as i32;

        for y_offset in -self.chunks_in_view..=self.chunks_in_view {
            for x_offset in -self.chunks_in_view..=self.chunks_in_view {
                let coord = GridCoord::new(center_x + x_offset, center_y + y_offset);
                match self.chunks.entry(coord) {
                    Entry::Occupied(mut entry) => {
                        let mut ctx = ChunkContext {
                            viewer_position: self.viewer_position,
                            max_view_distance: self.max_view_distance,
                            levels: &self.config.levels,
                            mesher: self.mesher.as_ref(),
                            sink: self.sink.as_mut(),
                            completions: &self.completion_tx,
                            visible_this_pass: &mut self.visible_chunks,
                        };
                        entry.get_mut().update(&mut ctx);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(TerrainChunk::new(
                            coord,
                            self.config.chunk_size,
                            &self.config.levels,
                            self.collision_index,
                            self.map_source.as_ref(),
                            &self.completion_tx,
                        ));
                        debug!("chunk {} created", coord);
                    }
                }
            }
        }
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Observer position in planar chunk-space units
    pub fn viewer_position(&self) -> Vec2 {
        self.viewer_position
    }

    pub fn max_view_distance(&self) -> f32 {
        self.max_view_distance
    }

    /// Total chunks ever created; the registry never evicts
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks shown by the current visibility pass
    pub fn visible_count(&self) -> usize {
        self.visible_chunks.len()
    }

    pub fn chunk(&self, coord: GridCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }
}
