//! Capability interface to the rendering/physics collaborator

use std::sync::{Arc, Mutex};

use crate::generation::mesh::MeshGeometry;
use crate::generation::texture::TextureArtifact;
use super::chunk::GridCoord;

/// The narrow surface the streaming core drives: visibility toggles,
/// active mesh and collider selection, and material texture attachment.
/// Implemented by the rendering collaborator; the core has no dependency
/// on any concrete graphics API.
pub trait GeometrySink {
    fn set_visible(&mut self, coord: GridCoord, visible: bool);
    fn set_render_mesh(&mut self, coord: GridCoord, mesh: Arc<MeshGeometry>);
    fn set_collision_mesh(&mut self, coord: GridCoord, mesh: Arc<MeshGeometry>);
    fn attach_texture(&mut self, coord: GridCoord, texture: TextureArtifact);
}

/// One recorded sink call
#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
    Visible(GridCoord, bool),
    /// Coord and vertex count of the adopted render mesh
    RenderMesh(GridCoord, usize),
    /// Coord and vertex count of the adopted collision mesh
    CollisionMesh(GridCoord, usize),
    /// Coord and pixel dimensions of the attached texture
    Texture(GridCoord, usize, usize),
}

/// Records every sink call for assertions and headless runs. Cloning
/// shares the underlying event log, so a handle kept outside the
/// controller still sees everything.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the event log so far
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().expect("sink log poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("sink log poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many `Visible(coord, visible)` calls were recorded
    pub fn visibility_calls(&self, coord: GridCoord, visible: bool) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Visible(c, v) if *c == coord && *v == visible))
            .count()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().expect("sink log poisoned").push(event);
    }
}

impl GeometrySink for RecordingSink {
    fn set_visible(&mut self, coord: GridCoord, visible: bool) {
        self.push(SinkEvent::Visible(coord, visible));
    }

    fn set_render_mesh(&mut self, coord: GridCoord, mesh: Arc<MeshGeometry>) {
        self.push(SinkEvent::RenderMesh(coord, mesh.vertex_count()));
    }

    fn set_collision_mesh(&mut self, coord: GridCoord, mesh: Arc<MeshGeometry>) {
        self.push(SinkEvent::CollisionMesh(coord, mesh.vertex_count()));
    }

    fn attach_texture(&mut self, coord: GridCoord, texture: TextureArtifact) {
        self.push(SinkEvent::Texture(coord, texture.width, texture.height));
    }
}
