//! Easing curves

use super::Millis;

/// Shape applied to linear progress before interpolating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Progress is used as-is
    #[default]
    Linear,
    /// Quadratic ease-in-out: slow start, fast middle, slow end
    InOutQuad,
}

impl Easing {
    /// Map clamped linear progress to eased progress
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InOutQuad => ease_in_out_quad(t),
        }
    }
}

/// `t < 0.5: 2t²; else: 1 - (-2t + 2)² / 2`
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Linear progress of a span that began at `start`, clamped to [0, 1].
///
/// A zero or negative duration is already complete.
pub fn linear_progress(now: Millis, start: Millis, duration: Millis) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (((now - start) / duration) as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_in_out_endpoints() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            let a = ease_in_out_quad(t);
            let b = 1.0 - ease_in_out_quad(1.0 - t);
            assert!((a - b).abs() < 1e-5, "asymmetric at t={}", t);
        }
    }

    #[test]
    fn test_ease_in_out_monotonic() {
        let mut last = 0.0;
        for i in 0..=100 {
            let v = ease_in_out_quad(i as f32 / 100.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn test_apply_clamps_input() {
        assert_eq!(Easing::InOutQuad.apply(-3.0), 0.0);
        assert_eq!(Easing::InOutQuad.apply(7.0), 1.0);
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
    }

    #[test]
    fn test_linear_progress() {
        assert_eq!(linear_progress(100.0, 100.0, 1000.0), 0.0);
        assert!((linear_progress(600.0, 100.0, 1000.0) - 0.5).abs() < 1e-6);
        assert_eq!(linear_progress(5000.0, 100.0, 1000.0), 1.0);
        // Before the start (delayed span) stays at zero
        assert_eq!(linear_progress(50.0, 100.0, 1000.0), 0.0);
        assert_eq!(linear_progress(0.0, 0.0, 0.0), 1.0);
    }
}
