//! Per-chunk, per-LOD lazily built mesh cache entries

use std::sync::Arc;

use crate::generation::map::ChunkData;
use crate::generation::mesh::MeshGeometry;
use super::chunk::GridCoord;
use super::lod::LodLevel;
use super::request::{CompletionSender, MeshService};

/// Lazily built geometry for one chunk at one detail tier.
///
/// State only moves forward: not requested -> requested -> ready. A ready
/// slot keeps its geometry for the rest of the session; there is no
/// cancellation and no rebuild.
pub struct LodMeshSlot {
    level: LodLevel,
    requested: bool,
    geometry: Option<Arc<MeshGeometry>>,
}

impl LodMeshSlot {
    pub fn new(level: LodLevel) -> Self {
        Self {
            level,
            requested: false,
            geometry: None,
        }
    }

    pub fn level(&self) -> &LodLevel {
        &self.level
    }

    pub fn has_requested(&self) -> bool {
        self.requested
    }

    /// Ready implies the geometry is present and immutable
    pub fn is_ready(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn geometry(&self) -> Option<&Arc<MeshGeometry>> {
        self.geometry.as_ref()
    }

    /// Issue the build for this slot. A slot that has already requested
    /// (or finished) its build no-ops: at most one underlying request is
    /// ever made per slot.
    pub fn request_build(
        &mut self,
        coord: GridCoord,
        lod_index: usize,
        data: &Arc<ChunkData>,
        mesher: &dyn MeshService,
        reply: &CompletionSender,
    ) {
        if self.requested {
            return;
        }
        self.requested = true;
        mesher.request_mesh(
            Arc::clone(data),
            self.level.skip_factor,
            coord,
            lod_index,
            reply.clone(),
        );
    }

    /// Store the finished geometry. The first delivery wins; a ready slot
    /// never regresses or swaps its mesh.
    pub fn on_mesh_ready(&mut self, geometry: MeshGeometry) {
        if self.geometry.is_none() {
            self.geometry = Some(Arc::new(geometry));
        }
    }
}
