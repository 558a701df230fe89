use serde::{Deserialize, Serialize};

const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 40.0;
const DEFAULT_DISTANCE: f32 = 10.0;
const PITCH_LIMIT: f32 = 89.0;
const DRAG_DEGREES_PER_PIXEL: f32 = 0.5;

/// Orbit camera around the bar chart, driven by drag and scroll input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Degrees around the vertical axis.
    pub yaw: f32,
    /// Degrees above the horizontal plane, within ±89.
    pub pitch: f32,
    pub distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: DEFAULT_DISTANCE,
        }
    }
}

impl Camera {
    /// Applies a mouse drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw = (self.yaw + dx * DRAG_DEGREES_PER_PIXEL).rem_euclid(360.0);
        self.pitch = (self.pitch + dy * DRAG_DEGREES_PER_PIXEL).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Positive `delta` moves the camera closer.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

/// One bar of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub value: i64,
    /// Horizontal centre, with the chart centred on zero.
    pub x: f32,
    /// Height normalised so the tallest bar is 1.0.
    pub height: f32,
}

/// Geometry for drawing a snapshot as a row of bars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarLayout {
    pub bars: Vec<Bar>,
    pub spacing: f32,
}

impl BarLayout {
    pub fn from_snapshot(snapshot: &[i64], spacing: f32) -> Self {
        let max = snapshot
            .iter()
            .map(|value| value.unsigned_abs())
            .max()
            .unwrap_or(0)
            .max(1) as f32;
        let offset = (snapshot.len().saturating_sub(1)) as f32 * spacing / 2.0;
        let bars = snapshot
            .iter()
            .enumerate()
            .map(|(index, &value)| Bar {
                value,
                x: index as f32 * spacing - offset,
                height: value as f32 / max,
            })
            .collect();
        Self { bars, spacing }
    }

    pub fn width(&self) -> f32 {
        self.bars.len().saturating_sub(1) as f32 * self.spacing
    }
}
