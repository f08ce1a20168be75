//! Asynchronous request/completion contract with the worker collaborators
//!
//! The streaming core never blocks: heavy work (map-data generation, mesh
//! triangulation) is issued through the traits below and the results come
//! back as tagged messages on a channel the controller drains at the start
//! of each tick. That drain is the single synchronization point: every
//! state transition happens on the controller's logical thread, one
//! completion at a time, in whatever order the workers finish.
//!
//! The contract per request: exactly one completion, no error channel, no
//! cancellation. A worker that never answers stalls only the chunk or slot
//! that asked.

use std::sync::Arc;
use std::sync::mpsc;

use crate::core::types::Vec2;
use crate::generation::map::ChunkData;
use crate::generation::mesh::MeshGeometry;
use super::chunk::GridCoord;

/// Completion messages delivered back to the controller thread
#[derive(Debug)]
pub enum Completion {
    /// Map data for a chunk footprint has been generated
    MapData { coord: GridCoord, data: ChunkData },
    /// A mesh build for one LOD slot has finished
    Mesh {
        coord: GridCoord,
        lod_index: usize,
        geometry: MeshGeometry,
    },
}

/// Sending half of the completion channel, cloned into each request
pub type CompletionSender = mpsc::Sender<Completion>;
/// Receiving half, owned by the controller
pub type CompletionReceiver = mpsc::Receiver<Completion>;

pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::channel()
}

/// Produces `ChunkData` for chunk footprints off the controller thread.
///
/// `center` is the chunk's footprint center in planar chunk-space units.
pub trait MapDataSource: Send + Sync {
    fn request_map_data(&self, coord: GridCoord, center: Vec2, reply: CompletionSender);
}

/// Builds LOD meshes from delivered chunk data off the controller thread
pub trait MeshService: Send + Sync {
    fn request_mesh(
        &self,
        data: Arc<ChunkData>,
        skip_factor: u32,
        coord: GridCoord,
        lod_index: usize,
        reply: CompletionSender,
    );
}
