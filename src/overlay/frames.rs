//! PNG frame-sequence clips
//!
//! A clip is a directory of numbered PNG frames. Frames are decoded on a
//! worker thread and uploaded as textures when the frame loop polls, so
//! playback can start as soon as the first frame is in.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};

use macroquad::prelude::{draw_texture_ex, vec2, DrawTextureParams, FilterMode, Texture2D, WHITE};

use super::{ClipRef, ClipStatus, ClipSurface, OverlayError};
use crate::anim::Millis;
use crate::ui::Rect;

/// Decoded RGBA frame waiting for upload
struct DecodedFrame {
    width: u16,
    height: u16,
    bytes: Vec<u8>,
}

pub struct FrameClip {
    key: String,
    receiver: Option<Receiver<Result<DecodedFrame, OverlayError>>>,
    frames: Vec<Texture2D>,
    frame_count: usize,
    fps: f32,
    play_requested: bool,
    /// Set when the first frame is available
    started: Option<Millis>,
    current: usize,
}

/// Sorted frame files of a clip directory
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, OverlayError> {
    let entries = std::fs::read_dir(dir).map_err(|_| OverlayError::MissingClip(dir.display().to_string()))?;

    let mut frames: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")))
        .collect();
    frames.sort();

    if frames.is_empty() {
        return Err(OverlayError::NoFrames(dir.display().to_string()));
    }
    Ok(frames)
}

/// Frame shown `elapsed` ms into playback
pub fn frame_index(elapsed: Millis, fps: f32) -> usize {
    if elapsed <= 0.0 || fps <= 0.0 {
        return 0;
    }
    (elapsed * fps as f64 / 1000.0).floor() as usize
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_decoder(paths: Vec<PathBuf>) -> Receiver<Result<DecodedFrame, OverlayError>> {
    let (sender, receiver) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        for path in paths {
            let frame = image::open(&path)
                .map_err(|e| OverlayError::Decode {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
                .and_then(|img| {
                    let rgba = img.to_rgba8();
                    let (w, h) = rgba.dimensions();
                    if w > u16::MAX as u32 || h > u16::MAX as u32 {
                        return Err(OverlayError::Decode {
                            path: path.display().to_string(),
                            message: format!("frame too large ({}x{})", w, h),
                        });
                    }
                    Ok(DecodedFrame {
                        width: w as u16,
                        height: h as u16,
                        bytes: rgba.into_raw(),
                    })
                });
            let failed = frame.is_err();
            // Receiver dropped: the clip was detached or destroyed
            if sender.send(frame).is_err() || failed {
                break;
            }
        }
    });

    receiver
}

/// Plays clips from `assets/clips/<name>/*.png`
#[derive(Debug, Default)]
pub struct FrameSequenceSurface;

impl FrameSequenceSurface {
    pub fn new() -> Self {
        Self
    }
}

impl ClipSurface for FrameSequenceSurface {
    type Clip = FrameClip;

    #[cfg(not(target_arch = "wasm32"))]
    fn construct(&mut self, clip: &ClipRef) -> Result<FrameClip, OverlayError> {
        let paths = list_frames(&clip.path)?;
        Ok(FrameClip {
            key: clip.key.clone(),
            frame_count: paths.len(),
            receiver: Some(spawn_decoder(paths)),
            frames: Vec::new(),
            fps: clip.fps,
            play_requested: false,
            started: None,
            current: 0,
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn construct(&mut self, _clip: &ClipRef) -> Result<FrameClip, OverlayError> {
        Err(OverlayError::Unsupported)
    }

    fn attach(&mut self, _clip: &mut FrameClip) {}

    fn play(&mut self, clip: &mut FrameClip, _now: Millis) {
        clip.play_requested = true;
    }

    fn poll(&mut self, clip: &mut FrameClip, now: Millis) -> ClipStatus {
        if let Some(receiver) = &clip.receiver {
            loop {
                match receiver.try_recv() {
                    Ok(Ok(frame)) => {
                        let texture = Texture2D::from_rgba8(frame.width, frame.height, &frame.bytes);
                        texture.set_filter(FilterMode::Linear);
                        clip.frames.push(texture);
                    }
                    Ok(Err(e)) => return ClipStatus::Failed(e),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if clip.frames.len() < clip.frame_count {
                            return ClipStatus::Failed(OverlayError::WorkerLost);
                        }
                        break;
                    }
                }
            }
        }
        if clip.frames.len() >= clip.frame_count {
            clip.receiver = None;
        }

        if clip.frames.is_empty() || !clip.play_requested {
            return ClipStatus::Loading;
        }
        let started = *clip.started.get_or_insert(now);

        let wanted = frame_index(now - started, clip.fps);
        clip.current = wanted.min(clip.frames.len() - 1);
        if wanted + 1 >= clip.frame_count && clip.frames.len() == clip.frame_count {
            clip.current = clip.frame_count - 1;
            log::debug!("Clip '{}' reached its last frame", clip.key);
            ClipStatus::Ended
        } else {
            ClipStatus::Playing
        }
    }

    fn detach(&mut self, clip: &mut FrameClip) {
        // Stops the decoder; frames already uploaded stay for drawing
        clip.receiver = None;
        clip.play_requested = false;
    }

    fn destroy(&mut self, clip: FrameClip) {
        drop(clip);
    }

    fn draw(&self, clip: &FrameClip, screen: Rect) {
        let Some(texture) = clip.frames.get(clip.current) else {
            return;
        };
        let dest = screen.cover(texture.width(), texture.height());
        draw_texture_ex(
            texture,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                ..Default::default()
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_index() {
        assert_eq!(frame_index(0.0, 24.0), 0);
        assert_eq!(frame_index(41.0, 24.0), 0);
        assert_eq!(frame_index(42.0, 24.0), 1);
        assert_eq!(frame_index(1000.0, 24.0), 24);
        assert_eq!(frame_index(-5.0, 24.0), 0);
    }

    #[test]
    fn test_list_frames_sorted_png_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["0002.png", "0001.png", "notes.txt", "0003.PNG"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let frames = list_frames(dir.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["0001.png", "0002.png", "0003.PNG"]);
    }

    #[test]
    fn test_list_frames_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(list_frames(dir.path()), Err(OverlayError::NoFrames(_))));
        assert!(matches!(
            list_frames(&dir.path().join("missing")),
            Err(OverlayError::MissingClip(_))
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_decoder_reports_bad_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0001.png");
        std::fs::write(&path, b"not a png").unwrap();

        let receiver = spawn_decoder(vec![path]);
        let first = receiver.recv().unwrap();
        assert!(matches!(first, Err(OverlayError::Decode { .. })));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_decoder_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0001.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255])).save(&path).unwrap();

        let receiver = spawn_decoder(vec![path]);
        let frame = receiver.recv().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(&frame.bytes[..4], &[10, 20, 30, 255]);
    }
}
