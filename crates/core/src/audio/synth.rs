use std::f32::consts::TAU;

use super::{ToneRequest, Waveform};

/// Renders a request into mono PCM samples in `[-1, 1]`.
///
/// The carrier is a plain sine with linear fade-in and fade-out over
/// `fade_fraction` of the samples at each end. `Modulated` cues are further
/// multiplied by a second sine at the modulation rate. `delay_sec` is not
/// applied here; callers place the buffer at the right offset.
pub fn render(request: &ToneRequest, sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate.max(1) as f32;
    let count = (request.duration_sec.max(0.0) * rate).round() as usize;
    let fade = ((count as f32) * request.fade_fraction.clamp(0.0, 0.5)).round() as usize;

    (0..count)
        .map(|index| {
            let t = index as f32 / rate;
            let mut sample = (TAU * request.frequency_hz * t).sin();
            if let Waveform::Modulated { rate_hz } = request.waveform {
                sample *= (TAU * rate_hz * t).sin();
            }
            sample * envelope(index, count, fade) * request.amplitude
        })
        .collect()
}

fn envelope(index: usize, count: usize, fade: usize) -> f32 {
    if fade == 0 {
        return 1.0;
    }
    let from_end = count - 1 - index;
    if index < fade {
        index as f32 / fade as f32
    } else if from_end < fade {
        from_end as f32 / fade as f32
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frequency_hz: f32, duration_sec: f32) -> ToneRequest {
        ToneRequest {
            frequency_hz,
            duration_sec,
            fade_fraction: 0.1,
            amplitude: 0.5,
            delay_sec: 0.0,
            waveform: Waveform::Sine,
        }
    }

    #[test]
    fn length_follows_duration() {
        let samples = render(&tone(440.0, 0.15), 44_100);
        assert_eq!(samples.len(), 6615);
    }

    #[test]
    fn fades_in_and_out() {
        let samples = render(&tone(440.0, 0.1), 8_000);
        assert_eq!(samples[0], 0.0);
        assert!(samples.last().unwrap().abs() < 1e-6);
        let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        assert!(peak <= 0.5 + 1e-6);
        assert!(peak > 0.45);
    }

    #[test]
    fn modulation_changes_the_waveform() {
        let plain = render(&tone(500.0, 0.08), 44_100);
        let modulated = render(
            &ToneRequest {
                waveform: Waveform::Modulated { rate_hz: 30.0 },
                ..tone(500.0, 0.08)
            },
            44_100,
        );
        assert_eq!(plain.len(), modulated.len());
        assert_ne!(plain, modulated);
        assert!(plain
            .iter()
            .zip(&modulated)
            .all(|(p, m)| m.abs() <= p.abs() + 1e-6));
    }

    #[test]
    fn zero_duration_is_silent() {
        assert!(render(&tone(440.0, 0.0), 44_100).is_empty());
    }
}
