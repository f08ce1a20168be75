//! Chunk streaming, LOD state machines, and observer-driven visibility

pub mod chunk;
pub mod controller;
pub mod lod;
pub mod mesh_slot;
pub mod request;
pub mod sink;

pub use chunk::{ChunkContext, GridCoord, TerrainChunk};
pub use controller::{StreamingConfig, StreamingController, VIEWER_MOVE_THRESHOLD};
pub use lod::{default_levels, max_view_distance, select_lod_index, validate_levels, LodLevel};
pub use mesh_slot::LodMeshSlot;
pub use request::{
    completion_channel, Completion, CompletionReceiver, CompletionSender, MapDataSource,
    MeshService,
};
pub use sink::{GeometrySink, RecordingSink, SinkEvent};
