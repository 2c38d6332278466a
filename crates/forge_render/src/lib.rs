//! bevy viewer for generated universes: background generation, particle
//! points coloured by category and structure tint, fly camera and HUD.

pub mod camera;
pub mod loading;
pub mod particles;
pub mod plugin;
pub mod state;
pub mod ui;

pub use plugin::ForgeRenderPlugin;
pub use state::{AppState, UniverseView, ViewerSettings};
