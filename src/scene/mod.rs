//! 3D scene: model data, loading, framing and rendering

pub mod classify;
pub mod framing;
pub mod loader;
pub mod math;
pub mod model;
pub mod obj;
pub mod render;

pub use framing::{frame_model, OrthoCamera};
pub use loader::{prepare_model, LoadOutcome, PendingModel};
pub use model::{MaterialId, Model};
pub use render::ModelRenderer;
