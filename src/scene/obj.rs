//! Wavefront OBJ/MTL import
//!
//! Supports the subset product models are exported with: positions (v),
//! normals (vn), faces (f, fan-triangulated), objects/groups (o, g) which
//! become separate mesh nodes, and materials (mtllib, usemtl) read from the
//! sibling MTL file (newmtl, Kd, d, Tr).

use std::collections::HashMap;
use std::path::Path;

use super::loader::LoadError;
use super::math::Vec3;
use super::model::{Material, MaterialId, MeshNode, Model};

/// Name given to geometry that appears before any `o`/`g` statement
const DEFAULT_NODE_NAME: &str = "mesh";

/// OBJ file importer
pub struct ObjImporter;

/// Mesh node under construction, with its own vertex dedup cache
struct NodeBuilder {
    node: MeshNode,
    /// (position index, normal index) -> local vertex index
    cache: HashMap<(usize, usize), u32>,
}

impl NodeBuilder {
    fn new(name: &str, material: MaterialId) -> Self {
        Self {
            node: MeshNode::new(name, material),
            cache: HashMap::new(),
        }
    }
}

impl ObjImporter {
    /// Load an OBJ file and the MTL library it names (if any)
    pub fn load_from_file(path: &Path) -> Result<Model, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        // A missing or broken material library only costs the material looks
        let materials = match Self::mtllib_name(&contents) {
            Some(lib) => {
                let mtl_path = path.with_file_name(lib);
                match std::fs::read_to_string(&mtl_path) {
                    Ok(mtl) => Self::parse_mtl(&mtl).unwrap_or_else(|e| {
                        log::warn!("Ignoring material library {}: {}", mtl_path.display(), e);
                        Vec::new()
                    }),
                    Err(e) => {
                        log::warn!("Material library {} unavailable: {}", mtl_path.display(), e);
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };

        Self::parse(&contents, materials)
    }

    /// First `mtllib` statement in an OBJ file
    pub fn mtllib_name(contents: &str) -> Option<&str> {
        contents.lines().find_map(|line| {
            let line = line.trim();
            line.strip_prefix("mtllib ").map(str::trim)
        })
    }

    /// Parse MTL contents into materials (Kd colour, d / Tr opacity)
    pub fn parse_mtl(contents: &str) -> Result<Vec<Material>, LoadError> {
        let mut materials: Vec<Material> = Vec::new();

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts[0] {
                "newmtl" => {
                    let name = parts.get(1).copied().unwrap_or("unnamed");
                    materials.push(Material::new(name));
                }
                "Kd" | "d" | "Tr" => {
                    let Some(current) = materials.last_mut() else {
                        return Err(LoadError::Parse {
                            line: line_num + 1,
                            message: format!("'{}' before any newmtl", parts[0]),
                        });
                    };
                    match parts[0] {
                        "Kd" => {
                            if parts.len() < 4 {
                                return Err(LoadError::Parse {
                                    line: line_num + 1,
                                    message: "Kd expects 3 values".to_string(),
                                });
                            }
                            for i in 0..3 {
                                current.color[i] = Self::parse_float(parts[i + 1], line_num)?;
                            }
                        }
                        "d" => {
                            let d = Self::parse_float(parts.get(1).copied().unwrap_or(""), line_num)?;
                            Self::set_opacity(current, d);
                        }
                        _ => {
                            // Tr is inverted dissolve
                            let tr = Self::parse_float(parts.get(1).copied().unwrap_or(""), line_num)?;
                            Self::set_opacity(current, 1.0 - tr);
                        }
                    }
                }
                _ => {
                    // Ignore shading params, texture maps, etc.
                }
            }
        }

        Ok(materials)
    }

    fn set_opacity(material: &mut Material, opacity: f32) {
        material.opacity = opacity.clamp(0.0, 1.0);
        material.transparent = material.opacity < 1.0;
    }

    /// Parse OBJ contents. `materials` are the entries of the MTL library;
    /// names used by `usemtl` but missing from it get a default material.
    pub fn parse(contents: &str, materials: Vec<Material>) -> Result<Model, LoadError> {
        let mut model = Model::new();
        let mut by_name: HashMap<String, MaterialId> = HashMap::new();
        for material in materials {
            let name = material.name.clone();
            let id = model.add_material(material);
            by_name.entry(name).or_insert(id);
        }

        let mut positions: Vec<Vec3> = Vec::new();
        let mut normals: Vec<Vec3> = Vec::new();

        let mut finished: Vec<MeshNode> = Vec::new();
        let mut current: Option<NodeBuilder> = None;
        let mut node_name = DEFAULT_NODE_NAME.to_string();
        let mut material: Option<MaterialId> = None;

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts[0] {
                "v" => {
                    // Vertex position: v x y z
                    if parts.len() < 4 {
                        return Err(LoadError::Parse {
                            line: line_num + 1,
                            message: "invalid vertex position (expected 3 values)".to_string(),
                        });
                    }
                    let x = Self::parse_float(parts[1], line_num)?;
                    let y = Self::parse_float(parts[2], line_num)?;
                    let z = Self::parse_float(parts[3], line_num)?;
                    positions.push(Vec3::new(x, y, z));
                }

                "vn" => {
                    if parts.len() < 4 {
                        return Err(LoadError::Parse {
                            line: line_num + 1,
                            message: "invalid normal (expected 3 values)".to_string(),
                        });
                    }
                    let x = Self::parse_float(parts[1], line_num)?;
                    let y = Self::parse_float(parts[2], line_num)?;
                    let z = Self::parse_float(parts[3], line_num)?;
                    normals.push(Vec3::new(x, y, z));
                }

                "o" | "g" => {
                    Self::finish_node(&mut current, &mut finished);
                    node_name = parts[1..].join(" ");
                    if node_name.is_empty() {
                        node_name = DEFAULT_NODE_NAME.to_string();
                    }
                }

                "usemtl" => {
                    let name = parts[1..].join(" ");
                    let id = match by_name.get(&name) {
                        Some(id) => *id,
                        None => {
                            let id = model.add_material(Material::new(name.clone()));
                            by_name.insert(name, id);
                            id
                        }
                    };
                    // A material switch mid-object splits it into a new node
                    if current.as_ref().is_some_and(|b| b.node.material != id) {
                        Self::finish_node(&mut current, &mut finished);
                    }
                    material = Some(id);
                }

                "f" => {
                    if parts.len() < 4 {
                        return Err(LoadError::Parse {
                            line: line_num + 1,
                            message: "face must have at least 3 vertices".to_string(),
                        });
                    }

                    let builder = current.get_or_insert_with(|| {
                        let id = *material.get_or_insert_with(|| {
                            *by_name
                                .entry("default".to_string())
                                .or_insert_with(|| model.add_material(Material::default()))
                        });
                        NodeBuilder::new(&node_name, id)
                    });

                    let mut face_verts = Vec::with_capacity(parts.len() - 1);
                    for spec in &parts[1..] {
                        face_verts.push(Self::parse_face_vertex(
                            spec, line_num, &positions, &normals, builder,
                        )?);
                    }

                    // Fan triangulation from first vertex
                    for i in 1..(face_verts.len() - 1) {
                        builder.node.indices.extend_from_slice(&[
                            face_verts[0],
                            face_verts[i],
                            face_verts[i + 1],
                        ]);
                    }
                }

                _ => {
                    // Ignore other OBJ commands (vt, s, mtllib, etc.)
                }
            }
        }

        Self::finish_node(&mut current, &mut finished);

        if finished.is_empty() {
            return Err(LoadError::Empty);
        }

        for node in &mut finished {
            Self::compute_face_normals(node);
        }
        model.meshes = finished;
        Ok(model)
    }

    fn finish_node(current: &mut Option<NodeBuilder>, finished: &mut Vec<MeshNode>) {
        if let Some(builder) = current.take() {
            if !builder.node.indices.is_empty() {
                finished.push(builder.node);
            }
        }
    }

    /// Parse a face vertex string like "1/2/3" or "1//3" or "1"
    fn parse_face_vertex(
        spec: &str,
        line_num: usize,
        positions: &[Vec3],
        normals: &[Vec3],
        builder: &mut NodeBuilder,
    ) -> Result<u32, LoadError> {
        let parts: Vec<&str> = spec.split('/').collect();

        // Position index (required)
        let pos_idx = if !parts[0].is_empty() {
            Self::parse_index(parts[0], positions.len(), line_num)?
        } else {
            return Err(LoadError::Parse {
                line: line_num + 1,
                message: "missing position index in face".to_string(),
            });
        };

        // Normal index (optional); texture coordinates are not used
        let norm_idx = if parts.len() > 2 && !parts[2].is_empty() {
            Self::parse_index(parts[2], normals.len(), line_num)?
        } else {
            usize::MAX // Sentinel for missing
        };

        let cache_key = (pos_idx, norm_idx);
        if let Some(&vertex_idx) = builder.cache.get(&cache_key) {
            return Ok(vertex_idx);
        }

        let normal = if norm_idx != usize::MAX {
            normals[norm_idx]
        } else {
            Vec3::ZERO // Filled in by compute_face_normals
        };

        let vertex_idx = builder.node.positions.len() as u32;
        builder.node.positions.push(positions[pos_idx]);
        builder.node.normals.push(normal);
        builder.cache.insert(cache_key, vertex_idx);

        Ok(vertex_idx)
    }

    fn parse_float(s: &str, line_num: usize) -> Result<f32, LoadError> {
        s.parse().map_err(|_| LoadError::Parse {
            line: line_num + 1,
            message: format!("invalid float value '{}'", s),
        })
    }

    /// Parse an index (handles negative indices for relative indexing)
    fn parse_index(s: &str, count: usize, line_num: usize) -> Result<usize, LoadError> {
        let idx: i64 = s.parse().map_err(|_| LoadError::Parse {
            line: line_num + 1,
            message: format!("invalid index '{}'", s),
        })?;

        let result = if idx > 0 {
            // Positive index (1-based)
            idx - 1
        } else if idx < 0 {
            // Negative index (relative to current count)
            count as i64 + idx
        } else {
            return Err(LoadError::Parse {
                line: line_num + 1,
                message: "index cannot be 0".to_string(),
            });
        };

        if result < 0 || result as usize >= count {
            return Err(LoadError::Parse {
                line: line_num + 1,
                message: format!("index {} out of range (have {} elements)", idx, count),
            });
        }

        Ok(result as usize)
    }

    /// Give vertices without a normal the normal of a face that uses them
    pub fn compute_face_normals(node: &mut MeshNode) {
        for tri in node.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = node.positions[a];
            let normal = (node.positions[b] - p0).cross(node.positions[c] - p0).normalize();
            for idx in [a, b, c] {
                if node.normals[idx] == Vec3::ZERO {
                    node.normals[idx] = normal;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_triangle() {
        let obj = r#"
# Simple triangle
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1//1 2//1 3//1
"#;

        let model = ObjImporter::parse(obj, Vec::new()).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.meshes[0].positions.len(), 3);
        assert_eq!(model.meshes[0].triangle_count(), 1);
        assert_eq!(model.meshes[0].name, "mesh");
    }

    #[test]
    fn test_parse_quad_triangulation() {
        let obj = r#"
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
"#;

        let model = ObjImporter::parse(obj, Vec::new()).unwrap();
        let mesh = &model.meshes[0];
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        // Computed normal faces +Z for a CCW quad
        assert!((mesh.normals[0].z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_objects_and_shared_materials() {
        let mtl = r#"
newmtl frame
Kd 0.1 0.1 0.1
newmtl lens
Kd 0.2 0.3 0.4
d 0.5
"#;
        let obj = r#"
mtllib glasses.mtl
v 0 0 0
v 1 0 0
v 0 1 0
o LeftTemple
usemtl frame
f 1 2 3
o Lens_L
usemtl lens
f -3 -2 -1
o RightTemple
usemtl frame
f 1 2 3
"#;
        assert_eq!(ObjImporter::mtllib_name(obj), Some("glasses.mtl"));

        let materials = ObjImporter::parse_mtl(mtl).unwrap();
        let model = ObjImporter::parse(obj, materials).unwrap();

        let names: Vec<_> = model.meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["LeftTemple", "Lens_L", "RightTemple"]);
        assert_eq!(model.meshes[0].material, model.meshes[2].material);
        assert_eq!(model.distinct_materials().len(), 2);

        let lens = model.material(model.meshes[1].material).unwrap();
        assert!(lens.transparent);
        assert!((lens.opacity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_usemtl_creates_material() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl mystery\nf 1 2 3\n";
        let model = ObjImporter::parse(obj, Vec::new()).unwrap();
        assert_eq!(model.materials.len(), 1);
        assert_eq!(model.materials[0].name, "mystery");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(ObjImporter::parse("", Vec::new()), Err(LoadError::Empty)));
        assert!(matches!(
            ObjImporter::parse("v 0 0\n", Vec::new()),
            Err(LoadError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            ObjImporter::parse("v 0 0 0\nf 1 2 5\n", Vec::new()),
            Err(LoadError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            ObjImporter::parse_mtl("d 0.5\n"),
            Err(LoadError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_from_file_with_library() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("m.mtl"), "newmtl glass\nTr 0.25\n").unwrap();
        let obj_path = dir.path().join("m.obj");
        std::fs::write(
            &obj_path,
            "mtllib m.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl glass\nf 1 2 3\n",
        )
        .unwrap();

        let model = ObjImporter::load_from_file(&obj_path).unwrap();
        assert!((model.materials[0].opacity - 0.75).abs() < 1e-6);

        let missing = ObjImporter::load_from_file(&dir.path().join("nope.obj"));
        assert!(matches!(missing, Err(LoadError::Io { .. })));
    }
}
