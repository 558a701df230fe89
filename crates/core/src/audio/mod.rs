//! Maps classified events to tone-synthesis requests.

pub mod synth;

use serde::{Deserialize, Serialize};

use crate::{AudioConfig, Event, Result};

const SWAP_BASE_HZ: f32 = 150.0;
const SWAP_RANGE_HZ: f32 = 100.0;
const SWAP_DURATION: f32 = 0.15;

const PARTITION_BASE_HZ: f32 = 250.0;
const PARTITION_RANGE_HZ: f32 = 200.0;
const PARTITION_DURATION: f32 = 0.06;

const PIVOT_BASE_HZ: f32 = 400.0;
const PIVOT_RANGE_HZ: f32 = 300.0;
const PIVOT_DURATION: f32 = 0.08;

const MERGE_BASE_HZ: f32 = 180.0;
const MERGE_RANGE_HZ: f32 = 250.0;
const MERGE_DURATION: f32 = 0.05;

/// Ascending C major arpeggio (C3, E3, G3, C4) played on completion.
pub const COMPLETION_NOTES_HZ: [f32; 4] = [131.0, 165.0, 196.0, 262.0];
const COMPLETION_NOTE_DURATION: f32 = 0.3;

/// Oscillator shape of a cue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    /// Sine carrier multiplied by a second sine at `rate_hz`.
    Modulated { rate_hz: f32 },
}

/// Parameters sufficient to synthesise one audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneRequest {
    pub frequency_hz: f32,
    pub duration_sec: f32,
    /// Share of samples faded in at the start and out at the end.
    pub fade_fraction: f32,
    /// Linear gain in `[0, 1]`.
    pub amplitude: f32,
    /// Offset from the moment of submission, used to sequence multi-note cues.
    pub delay_sec: f32,
    pub waveform: Waveform,
}

impl ToneRequest {
    /// Seconds from submission until the cue has finished sounding.
    pub fn end_sec(&self) -> f32 {
        self.delay_sec + self.duration_sec
    }
}

/// Synthesizer contract: receives requests and reports nothing back.
pub trait ToneSink {
    /// `at_sec` is the session time at which the request was emitted.
    fn submit(&mut self, at_sec: f64, request: &ToneRequest) -> Result<()>;
}

/// Snapshot-derived scale used to normalise event values into frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneContext {
    pub max_value: i64,
    pub len: usize,
}

impl ToneContext {
    pub fn from_snapshot(snapshot: &[i64]) -> Self {
        Self {
            max_value: snapshot.iter().copied().max().unwrap_or(1),
            len: snapshot.len(),
        }
    }

    fn ratio(&self, value: f32) -> f32 {
        let max = self.max_value.max(1) as f32;
        (value / max).clamp(0.0, 1.0)
    }

    fn position(&self, left: usize, right: usize) -> f32 {
        let len = self.len.max(1) as f32;
        ((left + right) as f32 / (2.0 * len)).clamp(0.0, 1.0)
    }
}

/// Turns events into tone requests and owns the master volume and mute
/// switch.
#[derive(Debug, Clone)]
pub struct ToneMapper {
    volume: f32,
    volume_step: f32,
    muted: bool,
    fade_fraction: f32,
    completion_gap_sec: f32,
    pivot_modulation_hz: f32,
}

impl ToneMapper {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            volume: config.master_volume.clamp(0.0, 1.0),
            volume_step: config.volume_step.abs(),
            muted: config.muted,
            fade_fraction: config.fade_fraction.clamp(0.0, 0.5),
            completion_gap_sec: config.completion_gap_sec.max(0.0),
            pivot_modulation_hz: config.pivot_modulation_hz,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn increase_volume(&mut self) {
        self.set_volume(self.volume + self.volume_step);
    }

    pub fn decrease_volume(&mut self) {
        self.set_volume(self.volume - self.volume_step);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Maps one event to its cue(s). Ignores the mute switch.
    pub fn map_event(&self, event: &Event, context: ToneContext) -> Vec<ToneRequest> {
        match *event {
            Event::Swap { values, .. } => {
                let avg = (values.0 as f32 + values.1 as f32) / 2.0;
                vec![self.sine(
                    SWAP_BASE_HZ + context.ratio(avg) * SWAP_RANGE_HZ,
                    SWAP_DURATION,
                )]
            }
            Event::PartitionSpan { left, right } => vec![self.sine(
                PARTITION_BASE_HZ + context.position(left, right) * PARTITION_RANGE_HZ,
                PARTITION_DURATION,
            )],
            Event::PivotPlaced { value } => vec![ToneRequest {
                waveform: Waveform::Modulated {
                    rate_hz: self.pivot_modulation_hz,
                },
                ..self.sine(
                    PIVOT_BASE_HZ + context.ratio(value as f32) * PIVOT_RANGE_HZ,
                    PIVOT_DURATION,
                )
            }],
            Event::MergeWrite { value, .. } => vec![self.sine(
                MERGE_BASE_HZ + context.ratio(value as f32) * MERGE_RANGE_HZ,
                MERGE_DURATION,
            )],
            Event::Completed => COMPLETION_NOTES_HZ
                .iter()
                .enumerate()
                .map(|(step, &frequency)| ToneRequest {
                    delay_sec: step as f32 * (COMPLETION_NOTE_DURATION + self.completion_gap_sec),
                    ..self.sine(frequency, COMPLETION_NOTE_DURATION)
                })
                .collect(),
        }
    }

    /// Maps a batch of events, emitting nothing while muted.
    pub fn requests_for(&self, events: &[Event], context: ToneContext) -> Vec<ToneRequest> {
        if self.muted {
            return Vec::new();
        }
        events
            .iter()
            .flat_map(|event| self.map_event(event, context))
            .collect()
    }

    fn sine(&self, frequency_hz: f32, duration_sec: f32) -> ToneRequest {
        ToneRequest {
            frequency_hz,
            duration_sec,
            fade_fraction: self.fade_fraction,
            amplitude: self.volume,
            delay_sec: 0.0,
            waveform: Waveform::Sine,
        }
    }
}

impl Default for ToneMapper {
    fn default() -> Self {
        Self::new(&AudioConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn context(max_value: i64, len: usize) -> ToneContext {
        ToneContext { max_value, len }
    }

    #[test]
    fn swap_pitch_tracks_average_value() {
        let mapper = ToneMapper::default();
        let event = Event::Swap {
            i: 2,
            j: 3,
            values: (4, 3),
        };
        let tones = mapper.map_event(&event, context(4, 4));
        assert_eq!(tones.len(), 1);
        assert!((tones[0].frequency_hz - 237.5).abs() < 1e-3);
        assert!((tones[0].duration_sec - 0.15).abs() < 1e-6);
        assert_eq!(tones[0].waveform, Waveform::Sine);
    }

    #[test]
    fn partition_pitch_encodes_position() {
        let mapper = ToneMapper::default();
        let event = Event::PartitionSpan { left: 0, right: 9 };
        let tones = mapper.map_event(&event, context(50, 10));
        assert!((tones[0].frequency_hz - (250.0 + 0.45 * 200.0)).abs() < 1e-3);
        assert!((tones[0].duration_sec - 0.06).abs() < 1e-6);
    }

    #[test]
    fn pivot_uses_modulated_carrier() {
        let mapper = ToneMapper::default();
        let tones = mapper.map_event(&Event::PivotPlaced { value: 10 }, context(10, 5));
        assert!((tones[0].frequency_hz - 700.0).abs() < 1e-3);
        assert!(matches!(tones[0].waveform, Waveform::Modulated { .. }));
    }

    #[test]
    fn merge_write_pitch() {
        let mapper = ToneMapper::default();
        let tones = mapper.map_event(&Event::MergeWrite { value: 0, index: 3 }, context(20, 5));
        assert!((tones[0].frequency_hz - 180.0).abs() < 1e-3);
        assert!((tones[0].duration_sec - 0.05).abs() < 1e-6);
    }

    #[test]
    fn completion_is_a_sequenced_arpeggio() {
        let mapper = ToneMapper::default();
        let tones = mapper.map_event(&Event::Completed, context(10, 10));
        let frequencies: Vec<f32> = tones.iter().map(|tone| tone.frequency_hz).collect();
        assert_eq!(frequencies, COMPLETION_NOTES_HZ.to_vec());
        for pair in tones.windows(2) {
            assert!(pair[1].delay_sec > pair[0].end_sec());
        }
    }

    #[test]
    fn volume_is_clamped_and_scales_amplitude() {
        let mut mapper = ToneMapper::default();
        for _ in 0..20 {
            mapper.increase_volume();
        }
        assert_eq!(mapper.volume(), 1.0);
        for _ in 0..20 {
            mapper.decrease_volume();
        }
        assert_eq!(mapper.volume(), 0.0);

        mapper.set_volume(0.25);
        let tones = mapper.map_event(&Event::PivotPlaced { value: 1 }, context(1, 1));
        assert!((tones[0].amplitude - 0.25).abs() < 1e-6);
    }

    #[test]
    fn muting_suppresses_requests_only() {
        let mut mapper = ToneMapper::default();
        let events = [Event::MergeWrite { value: 1, index: 0 }];
        assert_eq!(mapper.requests_for(&events, context(1, 1)).len(), 1);
        mapper.toggle_mute();
        assert!(mapper.requests_for(&events, context(1, 1)).is_empty());
        assert_eq!(mapper.map_event(&events[0], context(1, 1)).len(), 1);
    }

    #[test]
    fn degenerate_context_does_not_divide_by_zero() {
        let mapper = ToneMapper::default();
        let tones = mapper.map_event(&Event::MergeWrite { value: 3, index: 0 }, context(0, 0));
        assert!(tones[0].frequency_hz.is_finite());
    }

    proptest! {
        #[test]
        fn swap_frequency_within_band(max in 1i64..1000, a in 0i64..1000, b in 0i64..1000) {
            let a = a % (max + 1);
            let b = b % (max + 1);
            let mapper = ToneMapper::default();
            let event = Event::Swap { i: 0, j: 1, values: (a, b) };
            let frequency = mapper.map_event(&event, context(max, 2))[0].frequency_hz;
            prop_assert!((150.0..=250.0).contains(&frequency));
        }

        #[test]
        fn pivot_frequency_within_band(max in 1i64..1000, value in -50i64..2000) {
            let mapper = ToneMapper::default();
            let tones = mapper.map_event(&Event::PivotPlaced { value }, context(max, 2));
            let frequency = tones[0].frequency_hz;
            prop_assert!((400.0..=700.0).contains(&frequency));
        }
    }
}
