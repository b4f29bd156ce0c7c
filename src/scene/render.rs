//! Model rendering
//!
//! Software rasterizer for the viewer: the model is projected through the
//! orthographic camera into an RGBA framebuffer with a depth buffer, then
//! the framebuffer is uploaded as a texture and drawn over the overlay clip.
//! Translucent materials blend over what is already there and only write
//! depth when their material asks for it.

use macroquad::prelude::{draw_texture_ex, vec2, DrawTextureParams, FilterMode, Texture2D, WHITE};

use super::framing::OrthoCamera;
use super::math::Vec3;
use super::model::{Material, Model};

/// Key light direction (towards the light), upper front right
const KEY_LIGHT: Vec3 = Vec3::new(0.5, 0.8, 0.6);
/// Fill light from the lower left
const FILL_LIGHT: Vec3 = Vec3::new(-0.6, -0.3, 0.4);
const AMBIENT: f32 = 0.45;

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>,   // RGBA, 4 bytes per pixel
    pub zbuffer: Vec<f32>, // Distance from the camera plane
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![f32::MAX; width * height],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width * height * 4];
            self.zbuffer = vec![f32::MAX; width * height];
        }
    }

    /// Clear to transparent black so whatever is behind shows through
    pub fn clear_transparent(&mut self) {
        self.pixels.fill(0);
        self.zbuffer.fill(f32::MAX);
    }

    /// Depth-tested "over" blend in straight alpha. Returns true if drawn.
    pub fn blend_pixel(&mut self, x: usize, y: usize, z: f32, rgba: [f32; 4], write_depth: bool) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y * self.width + x;
        if z >= self.zbuffer[idx] {
            return false;
        }
        if write_depth {
            self.zbuffer[idx] = z;
        }

        let p = idx * 4;
        let src_a = rgba[3].clamp(0.0, 1.0);
        let dst_a = self.pixels[p + 3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return true;
        }
        for c in 0..3 {
            let dst = self.pixels[p + c] as f32 / 255.0;
            let out = (rgba[c] * src_a + dst * dst_a * (1.0 - src_a)) / out_a;
            self.pixels[p + c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        self.pixels[p + 3] = (out_a * 255.0).round() as u8;
        true
    }

    #[cfg(test)]
    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        self.pixels[(y * self.width + x) * 4 + 3]
    }
}

/// A triangle ready to rasterize: screen-space corners with depth
struct ScreenTri {
    v: [Vec3; 3],
    rgba: [f32; 4],
}

fn shade(material: &Material, normal: Vec3) -> [f32; 4] {
    let key = normal.dot(KEY_LIGHT.normalize()).max(0.0);
    let fill = normal.dot(FILL_LIGHT.normalize()).max(0.0) * 0.35;
    let diffuse = AMBIENT + (1.0 - AMBIENT) * key + fill;

    // Cheap highlight: smoother, more metallic surfaces catch more of the key
    let gloss = (1.0 - material.roughness).clamp(0.0, 1.0);
    let highlight = key.powi(8) * gloss * (0.3 + material.metalness);

    let mut rgba = [0.0, 0.0, 0.0, material.opacity];
    for c in 0..3 {
        let emissive = material.emissive[c] * material.emissive_intensity;
        rgba[c] = (material.color[c] * diffuse + highlight + emissive).clamp(0.0, 1.0);
    }
    rgba
}

/// World to framebuffer: x right, y down, z distance in front of the camera
fn project(camera: &OrthoCamera, fb: &Framebuffer, p: Vec3) -> Vec3 {
    let sx = (p.x - camera.position.x - camera.left()) / camera.width() * fb.width as f32;
    let sy = (camera.top() - (p.y - camera.position.y)) / (camera.top() - camera.bottom()) * fb.height as f32;
    Vec3::new(sx, sy, camera.position.z - p.z)
}

fn rasterize_triangle(fb: &mut Framebuffer, tri: &ScreenTri, write_depth: bool) {
    let [v1, v2, v3] = tri.v;

    // Bounding box
    let min_x = v1.x.min(v2.x).min(v3.x).max(0.0) as usize;
    let max_x = (v1.x.max(v2.x).max(v3.x) + 1.0).min(fb.width as f32).max(0.0) as usize;
    let min_y = v1.y.min(v2.y).min(v3.y).max(0.0) as usize;
    let max_y = (v1.y.max(v2.y).max(v3.y) + 1.0).min(fb.height as f32).max(0.0) as usize;
    if min_x >= max_x || min_y >= max_y {
        return;
    }

    // Edge functions; orthographic depth interpolates linearly
    let area = (v2.y - v3.y) * (v1.x - v3.x) + (v3.x - v2.x) * (v1.y - v3.y);
    if area.abs() < 0.00001 {
        return; // Degenerate triangle
    }
    let inv_area = 1.0 / area;

    for y in min_y..max_y {
        let py = y as f32 + 0.5;
        for x in min_x..max_x {
            let px = x as f32 + 0.5;
            let b0 = ((v2.y - v3.y) * (px - v3.x) + (v3.x - v2.x) * (py - v3.y)) * inv_area;
            let b1 = ((v3.y - v1.y) * (px - v3.x) + (v1.x - v3.x) * (py - v3.y)) * inv_area;
            let b2 = 1.0 - b0 - b1;

            const ERR: f32 = -0.0001;
            if b0 >= ERR && b1 >= ERR && b2 >= ERR {
                let z = b0 * v1.z + b1 * v2.z + b2 * v3.z;
                fb.blend_pixel(x, y, z, tri.rgba, write_depth);
            }
        }
    }
}

/// Project every visible triangle of the model. Returns (opaque, translucent)
/// lists, translucent ones sorted back to front.
fn collect_triangles(model: &Model, camera: &OrthoCamera, fb: &Framebuffer) -> (Vec<ScreenTri>, Vec<(ScreenTri, bool)>) {
    let mut opaque = Vec::new();
    let mut translucent = Vec::new();

    for mesh in model.meshes.iter().filter(|m| m.visible) {
        let Some(material) = model.material(mesh.material) else {
            continue;
        };
        if material.opacity <= 0.0 {
            continue;
        }

        for tri in mesh.indices.chunks_exact(3) {
            let idx = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if idx.iter().any(|&i| i >= mesh.positions.len()) {
                continue;
            }
            let world = idx.map(|i| model.transform.apply(mesh.positions[i]));
            let normal = idx
                .iter()
                .fold(Vec3::ZERO, |n, &i| n + model.transform.apply_dir(mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO)))
                .normalize();
            // Light the side facing the camera
            let normal = if normal.z < 0.0 { -normal } else { normal };

            let screen = ScreenTri {
                v: world.map(|p| project(camera, fb, p)),
                rgba: shade(material, normal),
            };
            if material.transparent {
                translucent.push((screen, material.depth_write));
            } else {
                opaque.push(screen);
            }
        }
    }

    let depth = |t: &ScreenTri| (t.v[0].z + t.v[1].z + t.v[2].z) / 3.0;
    translucent.sort_by(|a, b| depth(&b.0).total_cmp(&depth(&a.0)));
    (opaque, translucent)
}

/// Draw the model into the framebuffer (cleared first)
pub fn render_model(fb: &mut Framebuffer, model: &Model, camera: &OrthoCamera) {
    fb.clear_transparent();
    if !model.visible {
        return;
    }

    let (opaque, translucent) = collect_triangles(model, camera, fb);
    for tri in &opaque {
        rasterize_triangle(fb, tri, true);
    }
    for (tri, write_depth) in &translucent {
        rasterize_triangle(fb, tri, *write_depth);
    }
}

/// Owns the framebuffer and blits it to the screen each frame
pub struct ModelRenderer {
    fb: Framebuffer,
    /// Framebuffer pixels per screen pixel
    resolution_scale: f32,
}

impl ModelRenderer {
    pub fn new(resolution_scale: f32) -> Self {
        Self {
            fb: Framebuffer::new(1, 1),
            resolution_scale: resolution_scale.clamp(0.1, 1.0),
        }
    }

    pub fn draw(&mut self, model: &Model, camera: &OrthoCamera, screen_w: f32, screen_h: f32) {
        let w = ((screen_w * self.resolution_scale) as usize).max(1);
        let h = ((screen_h * self.resolution_scale) as usize).max(1);
        self.fb.resize(w, h);
        render_model(&mut self.fb, model, camera);

        // Blit framebuffer to screen
        let texture = Texture2D::from_rgba8(self.fb.width as u16, self.fb.height as u16, &self.fb.pixels);
        texture.set_filter(FilterMode::Linear);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_w, screen_h)),
                ..Default::default()
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrthoCamera {
        // 4 x 4 world units around the origin
        let mut camera = OrthoCamera::new(1.0);
        camera.frustum_height = 4.0;
        camera
    }

    #[test]
    fn test_placeholder_covers_center() {
        let mut fb = Framebuffer::new(32, 32);
        let model = Model::placeholder();
        render_model(&mut fb, &model, &camera());
        assert!(fb.alpha_at(16, 16) > 0);
        // Box spans -1..1 of the -2..2 view, corners stay empty
        assert_eq!(fb.alpha_at(1, 1), 0);
    }

    #[test]
    fn test_hidden_model_draws_nothing() {
        let mut fb = Framebuffer::new(16, 16);
        let mut model = Model::placeholder();
        model.visible = false;
        render_model(&mut fb, &model, &camera());
        assert!(fb.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_opacity_draws_nothing() {
        let mut fb = Framebuffer::new(16, 16);
        let mut model = Model::placeholder();
        model.materials[0].opacity = 0.0;
        render_model(&mut fb, &model, &camera());
        assert_eq!(fb.alpha_at(8, 8), 0);
    }

    #[test]
    fn test_depth_write_flag() {
        let mut fb = Framebuffer::new(2, 2);
        assert!(fb.blend_pixel(0, 0, 5.0, [1.0, 0.0, 0.0, 0.5], false));
        assert_eq!(fb.zbuffer[0], f32::MAX);
        assert!(fb.blend_pixel(0, 0, 5.0, [1.0, 0.0, 0.0, 1.0], true));
        assert_eq!(fb.zbuffer[0], 5.0);
        // Behind what was written
        assert!(!fb.blend_pixel(0, 0, 6.0, [0.0, 1.0, 0.0, 1.0], true));
        assert_eq!(fb.pixels[0], 255);
    }
}
