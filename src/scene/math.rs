//! Vector math for the model viewer
//!
//! Just enough linear algebra for framing and classification: a 3D vector,
//! an axis-aligned bounding box, and the object transform the viewer applies
//! (uniform scale, then X/Y Euler rotation, then translation).

use std::ops::{Add, Mul, Neg, Sub};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        self.scale(1.0 / l)
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn min(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Largest of the three components
    pub fn max_element(self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    /// Components sorted ascending
    pub fn sorted(self) -> [f32; 3] {
        let mut dims = [self.x, self.y, self.z];
        dims.sort_by(|a, b| a.total_cmp(b));
        dims
    }

    /// Rotate around X by `rx` after rotating around Y by `ry` (radians).
    /// Matches an XYZ Euler order with no Z component.
    pub fn rotate_xy(self, rx: f32, ry: f32) -> Vec3 {
        let (sy, cy) = ry.sin_cos();
        let (sx, cx) = rx.sin_cos();

        // Y first
        let x = self.x * cy + self.z * sy;
        let z = -self.x * sy + self.z * cy;
        let y = self.y;

        // Then X
        Vec3 {
            x,
            y: y * cx - z * sx,
            z: y * sx + z * cx,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        self.scale(-1.0)
    }
}

/// Object transform: `world = position + rotate_xy(point * scale)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians (only X and Y are driven)
    pub rotation: Vec3,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: 1.0,
    };

    pub fn apply(&self, point: Vec3) -> Vec3 {
        (point * self.scale).rotate_xy(self.rotation.x, self.rotation.y) + self.position
    }

    /// Rotate a direction (normals); scale and translation do not apply
    pub fn apply_dir(&self, dir: Vec3) -> Vec3 {
        dir.rotate_xy(self.rotation.x, self.rotation.y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box containing nothing; the identity for `union`
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        points.into_iter().fold(Aabb::EMPTY, |b, p| b.expand(*p))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand(self, p: Vec3) -> Aabb {
        Aabb::new(self.min.min(p), self.max.max(p))
    }

    pub fn union(self, other: Aabb) -> Aabb {
        if other.is_empty() {
            return self;
        }
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// World-space box enclosing this box after `transform`
    pub fn transformed(&self, transform: &Transform) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        self.corners()
            .iter()
            .fold(Aabb::EMPTY, |b, c| b.expand(transform.apply(*c)))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 1e-4
    }

    #[test]
    fn test_vec3_cross() {
        let c = Vec3::new(1.0, 0.0, 0.0).cross(Vec3::new(0.0, 1.0, 0.0));
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_rotate_y_half_turn() {
        let v = Vec3::new(1.0, 2.0, 3.0).rotate_xy(0.0, PI);
        assert!(approx(v, Vec3::new(-1.0, 2.0, -3.0)));
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        // +X swings to -Z under a positive yaw
        let v = Vec3::new(1.0, 0.0, 0.0).rotate_xy(0.0, FRAC_PI_2);
        assert!(approx(v, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_aabb_union_and_size() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.5));
        let u = a.union(b);
        assert_eq!(u.size(), Vec3::new(2.0, 3.0, 1.0));
        assert_eq!(Aabb::EMPTY.union(a), a);
        assert_eq!(a.union(Aabb::EMPTY), a);
        assert_eq!(Aabb::EMPTY.size(), Vec3::ZERO);
    }

    #[test]
    fn test_aabb_transformed() {
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -2.0), Vec3::new(1.0, 1.0, 2.0));
        let t = Transform {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
            scale: 2.0,
        };
        let w = b.transformed(&t);
        // Depth and width swap under a quarter yaw, everything doubles
        assert!(approx(w.size(), Vec3::new(8.0, 4.0, 4.0)));
        assert!(approx(w.center(), Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_sorted_dims() {
        assert_eq!(Vec3::new(3.0, 0.001, 2.0).sorted(), [0.001, 2.0, 3.0]);
    }
}
