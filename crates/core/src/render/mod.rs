use crate::{scene::BarLayout, Algorithm, Camera, Result};

/// What the core hands to a renderer each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView<'a> {
    pub snapshot: &'a [i64],
    pub algorithm: Algorithm,
    pub index: usize,
    pub len: usize,
    pub paused: bool,
    pub muted: bool,
    pub volume: f32,
}

/// Presentation backend. Draws a frame and feeds nothing back into the
/// core.
pub trait Renderer {
    fn draw(&mut self, frame: &FrameView<'_>, camera: &Camera) -> Result<()>;
}

/// Headless renderer that keeps the most recent layout instead of drawing
/// pixels.
#[derive(Debug, Default)]
pub struct LayoutRecorder {
    spacing: f32,
    last_layout: Option<BarLayout>,
    last_camera: Option<Camera>,
    frames_drawn: usize,
}

impl LayoutRecorder {
    pub fn new(spacing: f32) -> Self {
        Self {
            spacing,
            ..Self::default()
        }
    }

    pub fn last_layout(&self) -> Option<&BarLayout> {
        self.last_layout.as_ref()
    }

    pub fn last_camera(&self) -> Option<&Camera> {
        self.last_camera.as_ref()
    }

    pub fn frames_drawn(&self) -> usize {
        self.frames_drawn
    }
}

impl Renderer for LayoutRecorder {
    fn draw(&mut self, frame: &FrameView<'_>, camera: &Camera) -> Result<()> {
        self.last_layout = Some(BarLayout::from_snapshot(frame.snapshot, self.spacing));
        self.last_camera = Some(*camera);
        self.frames_drawn += 1;
        tracing::trace!(
            algorithm = %frame.algorithm,
            index = frame.index,
            len = frame.len,
            paused = frame.paused,
            "frame drawn"
        );
        Ok(())
    }
}
