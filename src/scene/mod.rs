//! Presentation and scheduling collaborators
//!
//! The simulation never draws anything itself. It creates, places and
//! destroys opaque mesh handles through [`Scene`], and asks the frame
//! scheduler for a target rate through [`Engine`].

pub mod headless;

pub use headless::{HeadlessEngine, HeadlessScene};

/// Passive presentation layer driven by the simulation
///
/// Mesh handles are moved into [`Scene::destroy_mesh`], so each created
/// handle can be destroyed at most once.
pub trait Scene {
    /// Opaque handle to a drawable owned by the presentation layer
    type Mesh;

    fn create_pocket_mesh(&mut self, radius: f32) -> Self::Mesh;
    fn create_ball_mesh(&mut self, radius: f32) -> Self::Mesh;
    fn place_mesh(&mut self, mesh: &Self::Mesh, x: f32, y: f32, z: f32);
    fn destroy_mesh(&mut self, mesh: Self::Mesh);

    /// Size the table background (table space, centered on the origin)
    fn setup_background(&mut self, width: f32, height: f32);
    /// Shot power indicator, `progress` in [0, 1]
    fn update_progress_bar(&mut self, progress: f32);
}

/// Frame scheduler
pub trait Engine {
    fn set_target_fps(&mut self, fps: u32);
}
