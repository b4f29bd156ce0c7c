//! Model loading
//!
//! Parsing runs off the frame loop: `PendingModel::spawn` hands the file to a
//! worker thread and the viewer polls the handle once per frame. On WASM the
//! bytes are fetched with macroquad's async file API first and parsed in
//! place. Whatever comes back, `prepare_model` turns it into something the
//! viewer can show: the tuned model, or the placeholder box.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};

use thiserror::Error;

use super::classify::{classify_surface, tune_material, SurfaceClass, SurfaceSample};
use super::framing::fit_model;
use super::model::{MaterialId, Model};
use super::obj::ObjImporter;
use crate::config::{FramingConfig, ModelConfig};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("model contains no faces")]
    Empty,
    #[error("loader stopped before producing a model")]
    WorkerLost,
}

pub type LoadResult = Result<Model, LoadError>;

/// How the viewer got its model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Success,
    /// The asset failed and the placeholder stands in
    Fallback,
}

/// A model load in flight, polled each frame
pub struct PendingModel {
    receiver: Receiver<LoadResult>,
    result: Option<LoadResult>,
    finished: bool,
    pub path: PathBuf,
}

impl PendingModel {
    fn from_receiver(receiver: Receiver<LoadResult>, path: PathBuf) -> Self {
        Self {
            receiver,
            result: None,
            finished: false,
            path,
        }
    }

    /// Start parsing `path` on a worker thread
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = channel();
        let worker_path = path.clone();

        std::thread::spawn(move || {
            let result = ObjImporter::load_from_file(&worker_path);
            let _ = sender.send(result);
        });

        Self::from_receiver(receiver, path)
    }

    /// Fetch and parse `path` through the browser, then wrap the result
    #[cfg(target_arch = "wasm32")]
    pub async fn fetch(path: PathBuf) -> Self {
        let result = fetch_model(&path).await;
        Self::ready(path, result)
    }

    /// A handle that is already complete
    #[cfg(any(test, target_arch = "wasm32"))]
    pub fn ready(path: PathBuf, result: LoadResult) -> Self {
        let (sender, receiver) = channel();
        let _ = sender.send(result);
        Self::from_receiver(receiver, path)
    }

    /// A handle fed by hand through the returned sender
    #[cfg(test)]
    pub fn channel(path: PathBuf) -> (std::sync::mpsc::Sender<LoadResult>, Self) {
        let (sender, receiver) = channel();
        (sender, Self::from_receiver(receiver, path))
    }

    /// Check for completion. Returns the result exactly once.
    pub fn poll(&mut self) -> Option<LoadResult> {
        if self.finished {
            return None;
        }
        if self.result.is_none() {
            match self.receiver.try_recv() {
                Ok(result) => self.result = Some(result),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    // Worker panicked or dropped the sender
                    self.result = Some(Err(LoadError::WorkerLost));
                }
            }
        }
        self.finished = true;
        self.result.take()
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_model(path: &Path) -> LoadResult {
    let name = path.to_string_lossy().to_string();
    let bytes = macroquad::file::load_file(&name).await.map_err(|e| LoadError::Io {
        path: name.clone(),
        message: e.to_string(),
    })?;
    let contents = String::from_utf8_lossy(&bytes).to_string();

    let mut materials = Vec::new();
    if let Some(lib) = ObjImporter::mtllib_name(&contents) {
        let mtl_name = path.with_file_name(lib).to_string_lossy().to_string();
        match macroquad::file::load_file(&mtl_name).await {
            Ok(mtl) => match ObjImporter::parse_mtl(&String::from_utf8_lossy(&mtl)) {
                Ok(parsed) => materials = parsed,
                Err(e) => log::warn!("Ignoring material library {}: {}", mtl_name, e),
            },
            Err(e) => log::warn!("Material library {} unavailable: {}", mtl_name, e),
        }
    }

    ObjImporter::parse(&contents, materials)
}

/// Classify every mesh and tune its material; hidden panels are made invisible
pub fn tune_surfaces(model: &mut Model, hide_panels: bool) {
    let mut classes = Vec::with_capacity(model.meshes.len());
    for mesh in &model.meshes {
        let material = model.material(mesh.material);
        let name = match material {
            Some(m) => format!("{} {}", mesh.name, m.name),
            None => mesh.name.clone(),
        };
        let sample = SurfaceSample {
            name: &name,
            size: mesh.local_bounds().size(),
            translucent: material.is_some_and(|m| m.is_translucent()),
        };
        classes.push(classify_surface(sample, hide_panels));
    }

    // A shared material is tuned once; any lens user makes it a lens
    let mut per_material: Vec<(MaterialId, SurfaceClass)> = Vec::new();
    for (mesh, class) in model.meshes.iter_mut().zip(classes) {
        if class == SurfaceClass::HiddenPanel {
            mesh.visible = false;
            continue;
        }
        match per_material.iter_mut().find(|(id, _)| *id == mesh.material) {
            Some((_, existing)) => {
                if class == SurfaceClass::Lens {
                    *existing = SurfaceClass::Lens;
                }
            }
            None => per_material.push((mesh.material, class)),
        }
    }

    for (id, class) in per_material {
        if let Some(material) = model.material_mut(id) {
            tune_material(class, material);
        }
    }
}

/// Turn a load result into the model the viewer shows
pub fn prepare_model(
    result: LoadResult,
    path: &Path,
    model_config: &ModelConfig,
    framing: &FramingConfig,
) -> (Model, LoadOutcome) {
    let (mut model, outcome) = match result {
        Ok(mut model) => {
            tune_surfaces(&mut model, model_config.hide_hud_panels);
            log::info!(
                "Loaded {} ({} meshes, {} materials)",
                path.display(),
                model.meshes.len(),
                model.materials.len()
            );
            (model, LoadOutcome::Success)
        }
        Err(e) => {
            log::error!("Failed to load {}: {}; using placeholder", path.display(), e);
            (Model::placeholder(), LoadOutcome::Fallback)
        }
    };

    fit_model(&mut model, framing);
    model.set_rotation_y(model_config.initial_yaw);
    (model, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::model::{Material, MeshNode};
    use crate::scene::math::Vec3;

    fn plate_model() -> Model {
        let mut model = Model::new();
        let frame = model.add_material(Material::new("frame_mat"));
        let mut lens = Material::new("clear");
        lens.transparent = true;
        lens.opacity = 0.95;
        let lens = model.add_material(lens);

        let mut arm = MeshNode::new("arm_left", frame);
        arm.positions = vec![Vec3::ZERO, Vec3::new(1.0, 0.5, 0.5)];
        let mut arm2 = MeshNode::new("arm_right", frame);
        arm2.positions = arm.positions.clone();
        let mut display = MeshNode::new("mesh_7", frame);
        display.positions = vec![Vec3::ZERO, Vec3::new(2.0, 1.0, 0.001)];
        let mut glass = MeshNode::new("front", lens);
        glass.positions = vec![Vec3::ZERO, Vec3::new(1.0, 1.0, 0.2)];

        model.meshes = vec![arm, display, arm2, glass];
        model
    }

    #[test]
    fn test_tune_surfaces() {
        let mut model = plate_model();
        tune_surfaces(&mut model, true);

        assert!(model.meshes[0].visible);
        assert!(!model.meshes[1].visible);
        let frame = &model.materials[0];
        assert!((frame.metalness - 0.25).abs() < 1e-6);
        let lens = &model.materials[1];
        assert!(!lens.depth_write);
        assert!((lens.opacity - 0.92).abs() < 1e-6);
    }

    #[test]
    fn test_shared_material_tuned_as_lens() {
        let mut model = Model::new();
        let shared = model.add_material(Material::new("shell"));
        let mut rim = MeshNode::new("rim", shared);
        rim.positions = vec![Vec3::ZERO, Vec3::new(1.0, 0.5, 0.5)];
        let mut lens = MeshNode::new("lens_left", shared);
        lens.positions = vec![Vec3::ZERO, Vec3::new(1.0, 1.0, 0.2)];
        model.meshes = vec![rim, lens];

        tune_surfaces(&mut model, false);

        let material = &model.materials[0];
        assert!(material.transparent);
        assert!(!material.depth_write);
        assert!((material.opacity - 0.92).abs() < 1e-6);
        assert!(model.meshes.iter().all(|m| m.visible));
    }

    #[test]
    fn test_panels_kept_when_not_hiding() {
        let mut model = plate_model();
        tune_surfaces(&mut model, false);
        assert!(model.meshes.iter().all(|m| m.visible));
    }

    #[test]
    fn test_prepare_failure_uses_placeholder() {
        let config = ModelConfig::default();
        let (model, outcome) = prepare_model(
            Err(LoadError::Empty),
            Path::new("missing.obj"),
            &config,
            &FramingConfig::default(),
        );
        assert_eq!(outcome, LoadOutcome::Fallback);
        assert!(model.placeholder);
        assert!((model.rotation_y() - std::f32::consts::PI).abs() < 1e-6);
        assert!((model.world_bounds().size().max_element() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_pending_model_polls_once() {
        let (sender, mut pending) = PendingModel::channel(PathBuf::from("m.obj"));
        assert!(pending.poll().is_none());

        sender.send(Ok(Model::placeholder())).unwrap();
        assert!(matches!(pending.poll(), Some(Ok(_))));
        assert!(pending.is_finished());
        // Dropping the sender afterwards is not a second result
        drop(sender);
        assert!(pending.poll().is_none());
    }

    #[test]
    fn test_dropped_worker_reports_lost() {
        let (sender, mut pending) = PendingModel::channel(PathBuf::from("m.obj"));
        drop(sender);
        assert_eq!(pending.poll().map(|r| r.err()), Some(Some(LoadError::WorkerLost)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_spawned_load_completes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mut pending = PendingModel::spawn(path);
        let result = loop {
            if let Some(result) = pending.poll() {
                break result;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        };
        assert_eq!(result.unwrap().meshes.len(), 1);
    }
}
