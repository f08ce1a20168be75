//! Background workers for the streaming request contract
//!
//! Reference implementation of `MapDataSource` and `MeshService` that runs
//! map generation and mesh triangulation as rayon jobs and reports each
//! result through the completion channel. The scheduler is rayon's; the
//! streaming core only ever sees the request/completion contract.

use std::sync::Arc;

use crate::core::types::Vec2;
use crate::streaming::chunk::GridCoord;
use crate::streaming::request::{Completion, CompletionSender, MapDataSource, MeshService};
use super::map::{ChunkData, MapGenerator};
use super::mesh::generate_terrain_mesh;

/// Schedules map and mesh builds on the rayon thread pool. Requests never
/// fail and are never cancelled; every spawned job sends exactly one
/// completion.
pub struct BackgroundGenerator {
    generator: Arc<MapGenerator>,
    height_multiplier: f32,
}

impl BackgroundGenerator {
    pub fn new(generator: MapGenerator, height_multiplier: f32) -> Self {
        Self {
            generator: Arc::new(generator),
            height_multiplier,
        }
    }

    pub fn generator(&self) -> &MapGenerator {
        &self.generator
    }
}

impl MapDataSource for BackgroundGenerator {
    fn request_map_data(&self, coord: GridCoord, center: Vec2, reply: CompletionSender) {
        let generator = Arc::clone(&self.generator);
        rayon::spawn(move || {
            let data = generator.generate_at(center);
            // A closed receiver just means the controller is gone
            let _ = reply.send(Completion::MapData { coord, data });
        });
    }
}

impl MeshService for BackgroundGenerator {
    fn request_mesh(
        &self,
        data: Arc<ChunkData>,
        skip_factor: u32,
        coord: GridCoord,
        lod_index: usize,
        reply: CompletionSender,
    ) {
        let height_multiplier = self.height_multiplier;
        rayon::spawn(move || {
            let geometry = generate_terrain_mesh(&data.height_field, height_multiplier, skip_factor);
            let _ = reply.send(Completion::Mesh {
                coord,
                lod_index,
                geometry,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::streaming::request::completion_channel;

    fn wait_for<T>(rx: &std::sync::mpsc::Receiver<T>) -> T {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Ok(value) = rx.try_recv() {
                return value;
            }
            assert!(Instant::now() < deadline, "worker never completed");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_map_request_completes_once() {
        let workers = BackgroundGenerator::new(MapGenerator::with_defaults(3), 10.0);
        let (tx, rx) = completion_channel();

        workers.request_map_data(GridCoord::new(1, -2), Vec2::new(240.0, -480.0), tx);

        match wait_for(&rx) {
            Completion::MapData { coord, data } => {
                assert_eq!(coord, GridCoord::new(1, -2));
                assert_eq!(data.height_field.width(), 241);
            }
            other => panic!("unexpected completion {:?}", other),
        }
        // Exactly one message; the sender side is gone afterwards
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_mesh_request_completes_once() {
        let workers = BackgroundGenerator::new(MapGenerator::with_defaults(3), 10.0);
        let data = Arc::new(workers.generator().generate_at(Vec2::ZERO));
        let (tx, rx) = completion_channel();

        workers.request_mesh(data, 8, GridCoord::new(0, 0), 2, tx);

        match wait_for(&rx) {
            Completion::Mesh {
                coord,
                lod_index,
                geometry,
            } => {
                assert_eq!(coord, GridCoord::new(0, 0));
                assert_eq!(lod_index, 2);
                assert_eq!(geometry.vertex_count(), 31 * 31);
            }
            other => panic!("unexpected completion {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }
}
