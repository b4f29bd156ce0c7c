//! Per-session viewer state
//!
//! The session is the single writer of model rotation and material opacity.
//! Phases receive it by `&mut` and never keep references across frames.

use crate::scene::{MaterialId, Model, OrthoCamera};

/// Baseline appearance of one material, restored after a fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeTarget {
    pub material: MaterialId,
    pub opacity: f32,
    pub depth_write: bool,
    pub transparent: bool,
}

#[derive(Debug, Clone)]
pub struct ViewerSession {
    pub model: Option<Model>,
    pub camera: OrthoCamera,
    /// Built on the first fade and reused by later ones
    fade_targets: Option<Vec<FadeTarget>>,
    pub is_animating: bool,
    pub is_panning: bool,
    pub allow_user_rotate: bool,
    /// Radians per pixel of drag
    pub drag_speed: f32,
}

impl ViewerSession {
    pub fn new(aspect: f32, allow_user_rotate: bool, drag_speed: f32) -> Self {
        Self {
            model: None,
            camera: OrthoCamera::new(aspect),
            fade_targets: None,
            is_animating: false,
            is_panning: false,
            allow_user_rotate,
            drag_speed,
        }
    }

    pub fn fade_targets(&self) -> &[FadeTarget] {
        self.fade_targets.as_deref().unwrap_or(&[])
    }

    /// Collect every distinct material once. Later calls keep the cached set,
    /// so the baselines stay the pre-fade values.
    pub fn ensure_fade_targets(&mut self) -> usize {
        if self.fade_targets.is_none() {
            let Some(model) = &self.model else {
                return 0;
            };
            let targets: Vec<FadeTarget> = model
                .distinct_materials()
                .into_iter()
                .filter_map(|id| {
                    model.material(id).map(|m| FadeTarget {
                        material: id,
                        opacity: m.opacity,
                        depth_write: m.depth_write,
                        transparent: m.transparent,
                    })
                })
                .collect();
            self.fade_targets = Some(targets);
        }
        self.fade_targets().len()
    }

    /// Make every fade target transparent with depth writes off
    pub fn begin_fade(&mut self) {
        self.ensure_fade_targets();
        let (Some(model), Some(targets)) = (self.model.as_mut(), self.fade_targets.as_ref()) else {
            return;
        };
        for target in targets {
            if let Some(material) = model.material_mut(target.material) {
                material.transparent = true;
                material.depth_write = false;
            }
        }
    }

    /// Set every fade target to `factor` times its baseline opacity
    pub fn set_fade(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        let (Some(model), Some(targets)) = (self.model.as_mut(), self.fade_targets.as_ref()) else {
            return;
        };
        for target in targets {
            if let Some(material) = model.material_mut(target.material) {
                material.opacity = target.opacity * factor;
            }
        }
    }

    /// Put opacity, transparency and depth writes back to their baselines
    pub fn restore_baselines(&mut self) {
        let (Some(model), Some(targets)) = (self.model.as_mut(), self.fade_targets.as_ref()) else {
            return;
        };
        for target in targets {
            if let Some(material) = model.material_mut(target.material) {
                material.opacity = target.opacity;
                material.depth_write = target.depth_write;
                material.transparent = target.transparent;
            }
        }
    }

    pub fn rotation_y(&self) -> f32 {
        self.model.as_ref().map_or(0.0, |m| m.rotation_y())
    }

    pub fn set_rotation_y(&mut self, angle: f32) {
        if let Some(model) = self.model.as_mut() {
            model.set_rotation_y(angle);
        }
    }

    pub fn set_model_visible(&mut self, visible: bool) {
        if let Some(model) = self.model.as_mut() {
            model.visible = visible;
        }
    }

    pub fn model_visible(&self) -> bool {
        self.model.as_ref().is_some_and(|m| m.visible)
    }

    /// Manual rotation from a mouse drag. Ignored while a scripted driver
    /// owns the rotation or when user rotation is off.
    pub fn drag(&mut self, dx: f32, dy: f32) -> bool {
        if !self.allow_user_rotate || self.is_animating || self.is_panning {
            return false;
        }
        let speed = self.drag_speed;
        let Some(model) = self.model.as_mut() else {
            return false;
        };
        model.transform.rotation.y += dx * speed;
        model.transform.rotation.x += dy * speed;
        true
    }
}
