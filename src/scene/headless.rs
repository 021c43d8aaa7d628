//! Headless presentation layer
//!
//! Keeps a ledger of live meshes instead of drawing them. Used by the native
//! demo driver and by tests to check that every handle is created, placed
//! and destroyed consistently.

use std::collections::BTreeMap;

use glam::Vec3;

use super::{Engine, Scene};

/// Handle issued by [`HeadlessScene`]. Deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct MeshId(u32);

impl MeshId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Pocket,
    Ball,
}

/// A mesh currently alive in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRecord {
    pub kind: MeshKind,
    pub radius: f32,
    pub pos: Vec3,
}

#[derive(Debug, Default)]
pub struct HeadlessScene {
    live: BTreeMap<u32, MeshRecord>,
    next_id: u32,
    /// Total meshes ever created
    pub created: usize,
    /// Total meshes ever destroyed
    pub destroyed: usize,
    /// Background size from the last `setup_background`
    pub background: Option<(f32, f32)>,
    /// Last value shown on the progress bar
    pub progress: f32,
    pub progress_updates: usize,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, kind: MeshKind, radius: f32) -> MeshId {
        let id = self.next_id;
        self.next_id += 1;
        self.created += 1;
        self.live.insert(
            id,
            MeshRecord {
                kind,
                radius,
                pos: Vec3::ZERO,
            },
        );
        MeshId(id)
    }

    /// Number of live meshes of the given kind
    pub fn live_count(&self, kind: MeshKind) -> usize {
        self.live.values().filter(|m| m.kind == kind).count()
    }

    pub fn mesh(&self, mesh: &MeshId) -> Option<&MeshRecord> {
        self.live.get(&mesh.0)
    }

    pub fn live_meshes(&self) -> impl Iterator<Item = &MeshRecord> {
        self.live.values()
    }
}

impl Scene for HeadlessScene {
    type Mesh = MeshId;

    fn create_pocket_mesh(&mut self, radius: f32) -> MeshId {
        self.create(MeshKind::Pocket, radius)
    }

    fn create_ball_mesh(&mut self, radius: f32) -> MeshId {
        self.create(MeshKind::Ball, radius)
    }

    fn place_mesh(&mut self, mesh: &MeshId, x: f32, y: f32, z: f32) {
        let record = self.live.get_mut(&mesh.0);
        assert!(record.is_some(), "placing destroyed mesh {}", mesh.0);
        if let Some(record) = record {
            record.pos = Vec3::new(x, y, z);
        }
    }

    fn destroy_mesh(&mut self, mesh: MeshId) {
        let removed = self.live.remove(&mesh.0);
        assert!(removed.is_some(), "mesh {} destroyed twice", mesh.0);
        self.destroyed += 1;
    }

    fn setup_background(&mut self, width: f32, height: f32) {
        self.background = Some((width, height));
    }

    fn update_progress_bar(&mut self, progress: f32) {
        self.progress = progress;
        self.progress_updates += 1;
    }
}

/// Scheduler stub that records the requested rate
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    pub target_fps: Option<u32>,
}

impl Engine for HeadlessEngine {
    fn set_target_fps(&mut self, fps: u32) {
        log::debug!("Target FPS set to {fps}");
        self.target_fps = Some(fps);
    }
}
