//! Model fitting and camera framing
//!
//! The viewer uses an orthographic camera looking down -Z. Framing picks the
//! frustum height so the model's world bounds, padded, fit both vertically
//! and horizontally for the current window aspect.

use super::math::Vec3;
use super::model::Model;
use crate::config::FramingConfig;

/// Frustum height before any model is framed (world units)
pub const DEFAULT_FRUSTUM_HEIGHT: f32 = 10.0;

/// Orthographic camera state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    pub frustum_height: f32,
    /// Viewport width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl OrthoCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            frustum_height: DEFAULT_FRUSTUM_HEIGHT,
            aspect: sanitize_aspect(aspect),
            near: 0.01,
            far: 2000.0,
            position: Vec3::new(0.0, 0.0, 10.0),
        }
    }

    pub fn left(&self) -> f32 {
        -self.aspect * self.frustum_height / 2.0
    }

    pub fn right(&self) -> f32 {
        self.aspect * self.frustum_height / 2.0
    }

    pub fn top(&self) -> f32 {
        self.frustum_height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        -self.frustum_height / 2.0
    }

    pub fn width(&self) -> f32 {
        self.right() - self.left()
    }
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

/// Scale the model so its largest dimension equals the target width, then
/// center it on the origin, nudged up by the configured offset.
///
/// Returns false (and leaves the model alone) for empty or degenerate models.
pub fn fit_model(model: &mut Model, framing: &FramingConfig) -> bool {
    let bounds = model.local_bounds();
    let max_dim = bounds.size().max_element();
    if !(max_dim > 0.0) || !max_dim.is_finite() {
        return false;
    }

    let scale = framing.target_width / max_dim;
    model.transform.scale = scale;
    model.transform.position = -(bounds.center() * scale) + Vec3::new(0.0, framing.vertical_offset, 0.0);
    true
}

/// Recompute the camera extents so the model's current world bounds fit the
/// viewport with padding. Leaves the frustum height alone for empty models.
pub fn frame_model(camera: &mut OrthoCamera, model: &Model, aspect: f32, padding: f32) {
    camera.aspect = sanitize_aspect(aspect);

    let size = model.world_bounds().size();
    let required = (size.y * padding).max(size.x * padding / camera.aspect);
    if required > 0.0 && required.is_finite() {
        camera.frustum_height = required;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::math::Aabb;

    fn framing() -> FramingConfig {
        FramingConfig {
            target_width: 20.0,
            vertical_offset: 0.05,
            padding: 1.5,
        }
    }

    #[test]
    fn test_fit_model_scales_largest_dimension() {
        let mut model = Model::placeholder();
        assert!(fit_model(&mut model, &framing()));
        assert!((model.transform.scale - 10.0).abs() < 1e-5);

        let world = model.world_bounds();
        assert!((world.size().max_element() - 20.0).abs() < 1e-3);
        assert!((world.center().x).abs() < 1e-4);
        assert!((world.center().y - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_fit_model_recenters_offset_geometry() {
        let mut model = Model::placeholder();
        for p in &mut model.meshes[0].positions {
            *p = *p + Vec3::new(5.0, -3.0, 2.0);
        }
        fit_model(&mut model, &framing());
        let center = model.world_bounds().center();
        assert!(center.x.abs() < 1e-3);
        assert!((center.y - 0.05).abs() < 1e-3);
        assert!(center.z.abs() < 1e-3);
    }

    #[test]
    fn test_fit_empty_model_is_noop() {
        let mut model = Model::new();
        assert!(!fit_model(&mut model, &framing()));
        assert_eq!(model.transform.scale, 1.0);
    }

    #[test]
    fn test_frame_model_wide_and_tall_windows() {
        // 20 wide, 4 tall model
        let mut model = Model::placeholder();
        for p in &mut model.meshes[0].positions {
            p.x *= 10.0;
            p.y *= 2.0;
        }
        let bounds: Aabb = model.world_bounds();
        assert_eq!(bounds.size().x, 20.0);

        let mut camera = OrthoCamera::new(1.0);

        // Wide window: 4 * 1.5 = 6 tall vs 30 / 3 = 10 for width, width wins
        frame_model(&mut camera, &model, 3.0, 1.5);
        assert!((camera.frustum_height - 10.0).abs() < 1e-4);
        assert!(camera.width() >= 20.0 * 1.5 - 1e-3);

        // Portrait window: width needs 30 / 0.5 = 60
        frame_model(&mut camera, &model, 0.5, 1.5);
        assert!((camera.frustum_height - 60.0).abs() < 1e-3);
        assert!(camera.top() - camera.bottom() >= 4.0 * 1.5);
    }

    #[test]
    fn test_bad_aspect_falls_back() {
        let mut camera = OrthoCamera::new(f32::NAN);
        assert_eq!(camera.aspect, 1.0);
        frame_model(&mut camera, &Model::new(), 0.0, 1.5);
        assert_eq!(camera.aspect, 1.0);
        assert_eq!(camera.frustum_height, DEFAULT_FRUSTUM_HEIGHT);
    }
}
