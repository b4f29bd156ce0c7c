//! Surface classification
//!
//! Decides from a mesh's name and shape whether it is part of the frame, a
//! lens, or a flat HUD panel that should be hidden. Pure functions over plain
//! data so the heuristics can be tested without a loaded model.

use super::math::Vec3;
use super::model::Material;

/// Smallest dimension under which a mesh counts as a flat plate
const THIN_PLATE_MAX: f32 = 0.003;
/// Largest / middle dimension ratio above which a plate counts as wide
const WIDE_PLATE_RATIO: f32 = 1.3;

const LENS_KEYWORDS: [&str; 2] = ["lens", "glass"];
const PANEL_KEYWORDS: [&str; 6] = ["ui", "hud", "panel", "screen", "canvas", "overlay"];

/// How a mesh surface gets treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceClass {
    /// Opaque structure: brightened, slightly metallic
    Frame,
    /// See-through glass: translucent, no depth writes
    Lens,
    /// Flat display panel, hidden from the viewer
    HiddenPanel,
}

/// Inputs the classifier looks at
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSample<'a> {
    /// Mesh name and material name, space separated
    pub name: &'a str,
    /// Size of the mesh's local bounding box
    pub size: Vec3,
    /// The material is transparent and not fully opaque
    pub translucent: bool,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_ascii_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

/// Name suggests glass
pub fn is_lens_name(name: &str) -> bool {
    contains_any(name, &LENS_KEYWORDS)
}

/// Name suggests a display panel
pub fn is_panel_name(name: &str) -> bool {
    contains_any(name, &PANEL_KEYWORDS)
}

/// Very thin and noticeably wider than tall
pub fn is_thin_plate(size: Vec3) -> bool {
    let dims = size.sorted();
    let very_thin = dims[0] < THIN_PLATE_MAX;
    let wide = dims[2] / dims[1].max(1e-6) > WIDE_PLATE_RATIO;
    very_thin && wide
}

/// Classify one surface. Lens-named meshes are never hidden, and panels are
/// only hidden when `hide_panels` is on.
pub fn classify_surface(sample: SurfaceSample<'_>, hide_panels: bool) -> SurfaceClass {
    let lens_name = is_lens_name(sample.name);

    if !lens_name && hide_panels && (is_thin_plate(sample.size) || is_panel_name(sample.name)) {
        return SurfaceClass::HiddenPanel;
    }

    if lens_name || sample.translucent {
        SurfaceClass::Lens
    } else {
        SurfaceClass::Frame
    }
}

/// Apply the look for a class to a material. `HiddenPanel` leaves it alone.
pub fn tune_material(class: SurfaceClass, material: &mut Material) {
    match class {
        SurfaceClass::Frame => {
            material.metalness = 0.25;
            material.roughness = 0.25;
            material.emissive = [0x11 as f32 / 255.0; 3];
            material.emissive_intensity = 0.2;
        }
        SurfaceClass::Lens => {
            material.roughness = 0.2;
            material.metalness = 0.05;
            material.transparent = true;
            material.opacity = material.opacity.min(0.92);
            material.depth_write = false;
        }
        SurfaceClass::HiddenPanel => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, size: Vec3) -> SurfaceSample<'_> {
        SurfaceSample { name, size, translucent: false }
    }

    #[test]
    fn test_lens_names() {
        assert!(is_lens_name("Lens_L"));
        assert!(is_lens_name("mesh_12 SunGlass"));
        assert!(!is_lens_name("temple_arm frame_mat"));
    }

    #[test]
    fn test_thin_plate() {
        assert!(is_thin_plate(Vec3::new(2.0, 1.0, 0.001)));
        // Square plates are not wide
        assert!(!is_thin_plate(Vec3::new(1.0, 1.0, 0.001)));
        // Thick boxes are not plates
        assert!(!is_thin_plate(Vec3::new(2.0, 1.0, 0.5)));
        // Degenerate middle dimension does not divide by zero
        assert!(is_thin_plate(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_frame_and_lens() {
        let size = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(classify_surface(sample("bridge", size), true), SurfaceClass::Frame);
        assert_eq!(classify_surface(sample("lens_right", size), true), SurfaceClass::Lens);

        let translucent = SurfaceSample { name: "cover", size, translucent: true };
        assert_eq!(classify_surface(translucent, false), SurfaceClass::Lens);
    }

    #[test]
    fn test_panels_hidden_only_when_enabled() {
        let plate = Vec3::new(2.0, 1.0, 0.001);
        assert_eq!(classify_surface(sample("mesh_3", plate), true), SurfaceClass::HiddenPanel);
        assert_eq!(classify_surface(sample("mesh_3", plate), false), SurfaceClass::Frame);

        let chunky = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(classify_surface(sample("HUD_Display", chunky), true), SurfaceClass::HiddenPanel);
    }

    #[test]
    fn test_lens_name_wins_over_panel() {
        let plate = Vec3::new(2.0, 1.0, 0.001);
        assert_eq!(classify_surface(sample("glass_screen", plate), true), SurfaceClass::Lens);
    }

    #[test]
    fn test_tune_lens_material() {
        let mut material = Material::new("lens");
        tune_material(SurfaceClass::Lens, &mut material);
        assert!(material.transparent);
        assert!(!material.depth_write);
        assert!((material.opacity - 0.92).abs() < 1e-6);

        let mut tinted = Material::new("tint");
        tinted.opacity = 0.5;
        tune_material(SurfaceClass::Lens, &mut tinted);
        assert!((tinted.opacity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tune_frame_material() {
        let mut material = Material::new("frame");
        tune_material(SurfaceClass::Frame, &mut material);
        assert!((material.metalness - 0.25).abs() < 1e-6);
        assert!((material.emissive_intensity - 0.2).abs() < 1e-6);
        assert!(material.depth_write);
    }
}
