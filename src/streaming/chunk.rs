//! Terrain chunk lifecycle: data arrival, LOD selection, visibility
//!
//! A chunk moves through two phases. Until its map data arrives it is
//! inert: hidden, no meshes, update calls do nothing. Once the data is in,
//! every update re-evaluates visibility and the wanted LOD tier against
//! the current observer position, requesting mesh builds lazily and
//! adopting them as they become ready.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::core::types::Vec2;
use crate::generation::map::ChunkData;
use crate::generation::mesh::MeshGeometry;
use crate::generation::texture::build_color_texture;
use crate::math::rect::Rect;
use super::lod::{select_lod_index, LodLevel};
use super::mesh_slot::LodMeshSlot;
use super::request::{CompletionSender, MapDataSource, MeshService};
use super::sink::GeometrySink;

/// Integer chunk-grid key: chunk-index units, not world units
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Everything one chunk update needs from the controller: observer state,
/// the LOD table, collaborator handles, and the visible-set being built
/// this pass.
pub struct ChunkContext<'a> {
    /// Observer position in planar chunk-space units
    pub viewer_position: Vec2,
    pub max_view_distance: f32,
    pub levels: &'a [LodLevel],
    pub mesher: &'a dyn MeshService,
    pub sink: &'a mut dyn GeometrySink,
    pub completions: &'a CompletionSender,
    pub visible_this_pass: &'a mut Vec<GridCoord>,
}

/// One grid cell of streamed terrain
pub struct TerrainChunk {
    coord: GridCoord,
    bounds: Rect,
    data: Option<Arc<ChunkData>>,
    slots: Vec<LodMeshSlot>,
    collision_index: usize,
    current_lod: Option<usize>,
    visible: bool,
}

impl TerrainChunk {
    /// Create the chunk entry and issue its one map-data request. The
    /// chunk starts hidden and stays inert until the data arrives.
    pub fn new(
        coord: GridCoord,
        chunk_size: u32,
        levels: &[LodLevel],
        collision_index: usize,
        source: &dyn MapDataSource,
        reply: &CompletionSender,
    ) -> Self {
        let position = Vec2::new(coord.x as f32, coord.y as f32) * chunk_size as f32;
        let bounds = Rect::from_center_half_extent(position, Vec2::splat(chunk_size as f32 * 0.5));
        let slots = levels.iter().map(|level| LodMeshSlot::new(*level)).collect();

        source.request_map_data(coord, position, reply.clone());
        trace!("chunk {} spawned, map data requested", coord);

        Self {
            coord,
            bounds,
            data: None,
            slots,
            collision_index,
            current_lod: None,
            visible: false,
        }
    }

    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Index of the adopted LOD tier, `None` until a mesh has been adopted
    pub fn current_lod(&self) -> Option<usize> {
        self.current_lod
    }

    pub fn slot(&self, lod_index: usize) -> Option<&LodMeshSlot> {
        self.slots.get(lod_index)
    }

    /// Map data arrival: store the fields, hand the derived color texture
    /// to the sink, then evaluate visibility and LOD immediately.
    pub fn on_map_data(&mut self, data: ChunkData, ctx: &mut ChunkContext<'_>) {
        if self.data.is_some() {
            // The contract is at-most-once delivery; a second message for
            // the same coord is a collaborator bug. Keep the first.
            debug!("chunk {} received duplicate map data, ignoring", self.coord);
            return;
        }

        let texture = build_color_texture(&data.color_field);
        ctx.sink.attach_texture(self.coord, texture);
        self.data = Some(Arc::new(data));
        debug!("chunk {} map data received", self.coord);

        self.update(ctx);
    }

    /// Mesh arrival for one LOD slot. The geometry is only stored; the
    /// next update pass adopts it if that tier is still the one wanted.
    pub fn on_mesh_ready(&mut self, lod_index: usize, geometry: MeshGeometry) {
        if let Some(slot) = self.slots.get_mut(lod_index) {
            slot.on_mesh_ready(geometry);
            trace!("chunk {} lod {} mesh ready", self.coord, lod_index);
        } else {
            debug!(
                "chunk {} received mesh for unknown lod {}, ignoring",
                self.coord, lod_index
            );
        }
    }

    /// Re-evaluate visibility and LOD against the current observer
    /// position. Idempotent and safe to call any number of times; a no-op
    /// until map data has arrived.
    pub fn update(&mut self, ctx: &mut ChunkContext<'_>) {
        let Some(data) = &self.data else {
            return;
        };

        let distance = self.bounds.distance_to_point(ctx.viewer_position);
        let visible = distance <= ctx.max_view_distance;

        if visible {
            let lod_index = select_lod_index(ctx.levels, distance);

            if Some(lod_index) != self.current_lod {
                if let Some(mesh) = self.slots[lod_index].geometry().cloned() {
                    self.current_lod = Some(lod_index);
                    ctx.sink.set_render_mesh(self.coord, Arc::clone(&mesh));
                    ctx.sink.set_collision_mesh(self.coord, mesh);
                    debug!(
                        "chunk {} adopted lod {} at distance {:.1}",
                        self.coord, lod_index, distance
                    );
                } else {
                    // Not ready: request at most once, keep whatever mesh
                    // is currently showing until the build lands.
                    self.slots[lod_index].request_build(
                        self.coord,
                        lod_index,
                        data,
                        ctx.mesher,
                        ctx.completions,
                    );
                }
            }

            // Collision fidelity is evaluated on its own whenever the
            // highest-detail tier is selected. The collision tier may be a
            // different slot than the render tier.
            if lod_index == 0 {
                let collision = self.collision_index;
                if let Some(mesh) = self.slots[collision].geometry().cloned() {
                    ctx.sink.set_collision_mesh(self.coord, mesh);
                } else {
                    self.slots[collision].request_build(
                        self.coord,
                        collision,
                        data,
                        ctx.mesher,
                        ctx.completions,
                    );
                }
            }

            // Register once per visibility pass; the flag is still false
            // here if this chunk was hidden when the pass started.
            if !self.visible {
                ctx.visible_this_pass.push(self.coord);
            }
        }

        self.set_visible(visible, ctx.sink);
    }

    /// Forward the visibility toggle to the sink and remember it
    pub fn set_visible(&mut self, visible: bool, sink: &mut dyn GeometrySink) {
        self.visible = visible;
        sink.set_visible(self.coord, visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::generation::map::MapGenerator;
    use crate::generation::mesh::generate_terrain_mesh;
    use crate::streaming::lod::{default_levels, max_view_distance};
    use crate::streaming::request::{completion_channel, Completion, CompletionReceiver};
    use crate::streaming::sink::{RecordingSink, SinkEvent};

    const CHUNK_SIZE: u32 = 240;

    /// Answers map requests inline and counts mesh requests; mesh replies
    /// are sent only when the test asks for them.
    struct InlineWorkers {
        generator: MapGenerator,
        mesh_requests: AtomicUsize,
        reply_to_mesh: bool,
        sent: Mutex<Vec<(GridCoord, usize)>>,
    }

    impl InlineWorkers {
        fn new(reply_to_mesh: bool) -> Self {
            Self {
                generator: MapGenerator::with_defaults(9),
                mesh_requests: AtomicUsize::new(0),
                reply_to_mesh,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl MapDataSource for InlineWorkers {
        fn request_map_data(&self, coord: GridCoord, center: Vec2, reply: CompletionSender) {
            let data = self.generator.generate_at(center);
            let _ = reply.send(Completion::MapData { coord, data });
        }
    }

    impl MeshService for InlineWorkers {
        fn request_mesh(
            &self,
            data: Arc<ChunkData>,
            skip_factor: u32,
            coord: GridCoord,
            lod_index: usize,
            reply: CompletionSender,
        ) {
            self.mesh_requests.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push((coord, lod_index));
            if self.reply_to_mesh {
                let geometry = generate_terrain_mesh(&data.height_field, 10.0, skip_factor);
                let _ = reply.send(Completion::Mesh {
                    coord,
                    lod_index,
                    geometry,
                });
            }
        }
    }

    struct Harness {
        workers: InlineWorkers,
        sink: RecordingSink,
        tx: CompletionSender,
        rx: CompletionReceiver,
        levels: Vec<LodLevel>,
        visible: Vec<GridCoord>,
    }

    impl Harness {
        fn new(reply_to_mesh: bool) -> Self {
            let (tx, rx) = completion_channel();
            Self {
                workers: InlineWorkers::new(reply_to_mesh),
                sink: RecordingSink::new(),
                tx,
                rx,
                levels: default_levels(),
                visible: Vec::new(),
            }
        }

        fn spawn(&self, coord: GridCoord) -> TerrainChunk {
            TerrainChunk::new(coord, CHUNK_SIZE, &self.levels, 0, &self.workers, &self.tx)
        }

        fn update(&mut self, chunk: &mut TerrainChunk, viewer: Vec2) {
            let mut sink = self.sink.clone();
            let mut ctx = ChunkContext {
                viewer_position: viewer,
                max_view_distance: max_view_distance(&self.levels),
                levels: &self.levels,
                mesher: &self.workers,
                sink: &mut sink,
                completions: &self.tx,
                visible_this_pass: &mut self.visible,
            };
            chunk.update(&mut ctx);
        }

        /// Deliver queued completions to the chunk the way the controller
        /// would: map data runs the update procedure, mesh data is stored.
        fn drain_into(&mut self, chunk: &mut TerrainChunk, viewer: Vec2) {
            while let Ok(event) = self.rx.try_recv() {
                match event {
                    Completion::MapData { data, .. } => {
                        let mut sink = self.sink.clone();
                        let mut ctx = ChunkContext {
                            viewer_position: viewer,
                            max_view_distance: max_view_distance(&self.levels),
                            levels: &self.levels,
                            mesher: &self.workers,
                            sink: &mut sink,
                            completions: &self.tx,
                            visible_this_pass: &mut self.visible,
                        };
                        chunk.on_map_data(data, &mut ctx);
                    }
                    Completion::Mesh {
                        lod_index, geometry, ..
                    } => {
                        chunk.on_mesh_ready(lod_index, geometry);
                    }
                }
            }
        }
    }

    #[test]
    fn test_awaiting_data_is_inert() {
        let mut harness = Harness::new(false);
        let mut chunk = harness.spawn(GridCoord::new(0, 0));

        harness.update(&mut chunk, Vec2::ZERO);

        assert!(!chunk.has_data());
        assert!(!chunk.is_visible());
        assert!(harness.sink.is_empty());
        assert!(harness.visible.is_empty());
    }

    #[test]
    fn test_data_arrival_attaches_texture_and_shows() {
        let mut harness = Harness::new(false);
        let mut chunk = harness.spawn(GridCoord::new(0, 0));

        harness.drain_into(&mut chunk, Vec2::ZERO);

        assert!(chunk.has_data());
        assert!(chunk.is_visible());
        assert_eq!(harness.visible, vec![GridCoord::new(0, 0)]);
        let events = harness.sink.events();
        assert!(matches!(events[0], SinkEvent::Texture(_, 241, 241)));
        assert!(events.contains(&SinkEvent::Visible(GridCoord::new(0, 0), true)));
    }

    #[test]
    fn test_visibility_boundary_is_inclusive() {
        let mut harness = Harness::new(false);
        // Chunk (2, 0): bounds span x in [360, 600]
        let mut chunk = harness.spawn(GridCoord::new(2, 0));
        harness.drain_into(&mut chunk, Vec2::ZERO);

        let max = max_view_distance(&harness.levels);

        // Exactly at the max view distance from the nearest edge: visible
        harness.update(&mut chunk, Vec2::new(360.0 - max, 0.0));
        assert!(chunk.is_visible());

        // A hair past it: hidden
        harness.update(&mut chunk, Vec2::new(360.0 - max - 0.5, 0.0));
        assert!(!chunk.is_visible());
    }

    #[test]
    fn test_lod_zero_adopted_once_slot_ready() {
        let mut harness = Harness::new(true);
        let mut chunk = harness.spawn(GridCoord::new(0, 0));

        // Data arrives and the first update requests the tier-0 build; the
        // inline reply is drained in the same pass and stored in the slot.
        // Nothing is adopted until the next update runs.
        harness.drain_into(&mut chunk, Vec2::ZERO);
        assert_eq!(chunk.current_lod(), None);
        assert!(chunk.slot(0).unwrap().is_ready());

        harness.update(&mut chunk, Vec2::ZERO);

        assert_eq!(chunk.current_lod(), Some(0));
        let events = harness.sink.events();
        assert!(events.iter().any(|e| matches!(e, SinkEvent::RenderMesh(_, _))));
        assert!(events.iter().any(|e| matches!(e, SinkEvent::CollisionMesh(_, _))));
    }

    #[test]
    fn test_pending_build_not_duplicated() {
        let mut harness = Harness::new(false);
        let mut chunk = harness.spawn(GridCoord::new(0, 0));
        harness.drain_into(&mut chunk, Vec2::ZERO);

        // Repeated updates while the build is in flight issue nothing new.
        // The first update requested tier 0 and the collision tier shares
        // that slot, so exactly one request total.
        harness.update(&mut chunk, Vec2::ZERO);
        harness.update(&mut chunk, Vec2::ZERO);

        assert_eq!(harness.workers.mesh_requests.load(Ordering::SeqCst), 1);
        assert_eq!(chunk.current_lod(), None);
    }

    #[test]
    fn test_distant_chunk_requests_coarser_tier() {
        let mut harness = Harness::new(false);
        let mut chunk = harness.spawn(GridCoord::new(0, 0));
        // Viewer ~480 planar units from the chunk edge: tier 1 territory
        let viewer = Vec2::new(600.0, 0.0);
        harness.drain_into(&mut chunk, viewer);

        assert!(chunk.is_visible());
        let sent = harness.workers.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![(GridCoord::new(0, 0), 1)]);
    }

    #[test]
    fn test_registers_once_per_pass() {
        let mut harness = Harness::new(false);
        let mut chunk = harness.spawn(GridCoord::new(0, 0));
        harness.drain_into(&mut chunk, Vec2::ZERO);

        // Further updates in the same pass must not re-register
        harness.update(&mut chunk, Vec2::ZERO);
        harness.update(&mut chunk, Vec2::ZERO);
        assert_eq!(harness.visible, vec![GridCoord::new(0, 0)]);

        // After a hide the next pass registers again
        let mut sink = harness.sink.clone();
        chunk.set_visible(false, &mut sink);
        harness.update(&mut chunk, Vec2::ZERO);
        assert_eq!(
            harness.visible,
            vec![GridCoord::new(0, 0), GridCoord::new(0, 0)]
        );
    }

    #[test]
    fn test_duplicate_map_data_ignored() {
        let mut harness = Harness::new(false);
        let mut chunk = harness.spawn(GridCoord::new(0, 0));
        harness.drain_into(&mut chunk, Vec2::ZERO);

        let texture_count_before = harness
            .sink
            .events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Texture(..)))
            .count();

        let extra = harness.workers.generator.generate_at(Vec2::ZERO);
        let mut sink = harness.sink.clone();
        let mut ctx = ChunkContext {
            viewer_position: Vec2::ZERO,
            max_view_distance: max_view_distance(&harness.levels),
            levels: &harness.levels,
            mesher: &harness.workers,
            sink: &mut sink,
            completions: &harness.tx,
            visible_this_pass: &mut harness.visible,
        };
        chunk.on_map_data(extra, &mut ctx);

        let texture_count_after = harness
            .sink
            .events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Texture(..)))
            .count();
        assert_eq!(texture_count_before, texture_count_after);
    }
}
