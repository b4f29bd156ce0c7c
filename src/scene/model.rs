//! Model, meshes and materials
//!
//! A loaded model is a flat list of mesh nodes plus a material arena.
//! Meshes refer to materials by `MaterialId`, so two meshes that share a
//! material share every opacity write made to it.

use super::math::{Aabb, Transform, Vec3};

/// Index into `Model::materials`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Surface appearance consumed by the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Linear RGB
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub depth_write: bool,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: [0.8, 0.8, 0.8],
            opacity: 1.0,
            transparent: false,
            depth_write: true,
            metalness: 0.0,
            roughness: 1.0,
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 0.0,
        }
    }

    /// Transparent and not fully opaque
    pub fn is_translucent(&self) -> bool {
        self.transparent && self.opacity < 1.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

/// One drawable mesh of the model
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// One normal per position (zero when the source had none)
    pub normals: Vec<Vec3>,
    /// Triangle list, three indices per face
    pub indices: Vec<u32>,
    pub material: MaterialId,
    pub visible: bool,
}

impl MeshNode {
    pub fn new(name: impl Into<String>, material: MaterialId) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            material,
            visible: true,
        }
    }

    /// Bounds in model space (before the model transform)
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    #[cfg(test)]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A complete model: meshes, the materials they use, and the object transform
#[derive(Debug, Clone)]
pub struct Model {
    pub meshes: Vec<MeshNode>,
    pub materials: Vec<Material>,
    pub transform: Transform,
    pub visible: bool,
    /// True when this is the built-in stand-in for a model that failed to load
    pub placeholder: bool,
}

impl Model {
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            materials: Vec::new(),
            transform: Transform::IDENTITY,
            visible: true,
            placeholder: false,
        }
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    /// Every distinct material referenced by a mesh, in first-use order
    pub fn distinct_materials(&self) -> Vec<MaterialId> {
        let mut seen = Vec::new();
        for mesh in &self.meshes {
            if self.material(mesh.material).is_some() && !seen.contains(&mesh.material) {
                seen.push(mesh.material);
            }
        }
        seen
    }

    /// Union of every mesh's bounds in model space
    pub fn local_bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .fold(Aabb::EMPTY, |b, m| b.union(m.local_bounds()))
    }

    /// Bounds after the current transform
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds().transformed(&self.transform)
    }

    pub fn rotation_y(&self) -> f32 {
        self.transform.rotation.y
    }

    pub fn set_rotation_y(&mut self, angle: f32) {
        self.transform.rotation.y = angle;
    }

    /// Built-in stand-in used when the asset cannot be loaded:
    /// a 2×2×2 box with one translucent blue-violet material.
    pub fn placeholder() -> Self {
        let mut model = Model::new();
        let mut material = Material::new("placeholder");
        material.color = [0x66 as f32 / 255.0, 0x7e as f32 / 255.0, 0xea as f32 / 255.0];
        material.transparent = true;
        material.opacity = 0.9;
        let material = model.add_material(material);

        let mut mesh = MeshNode::new("placeholder_box", material);
        // Six faces, four corners each, so every face gets a flat normal
        let faces: [(Vec3, [Vec3; 4]); 6] = [
            (Vec3::new(1.0, 0.0, 0.0), [
                Vec3::new(1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, -1.0, 1.0),
            ]),
            (Vec3::new(-1.0, 0.0, 0.0), [
                Vec3::new(-1.0, -1.0, 1.0), Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(-1.0, 1.0, -1.0), Vec3::new(-1.0, -1.0, -1.0),
            ]),
            (Vec3::new(0.0, 1.0, 0.0), [
                Vec3::new(-1.0, 1.0, -1.0), Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, -1.0),
            ]),
            (Vec3::new(0.0, -1.0, 0.0), [
                Vec3::new(-1.0, -1.0, 1.0), Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0), Vec3::new(1.0, -1.0, 1.0),
            ]),
            (Vec3::new(0.0, 0.0, 1.0), [
                Vec3::new(-1.0, -1.0, 1.0), Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0), Vec3::new(-1.0, 1.0, 1.0),
            ]),
            (Vec3::new(0.0, 0.0, -1.0), [
                Vec3::new(1.0, -1.0, -1.0), Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0), Vec3::new(1.0, 1.0, -1.0),
            ]),
        ];
        for (normal, corners) in faces {
            let base = mesh.positions.len() as u32;
            for corner in corners {
                mesh.positions.push(corner);
                mesh.normals.push(normal);
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        model.meshes.push(mesh);
        model.placeholder = true;
        model
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
