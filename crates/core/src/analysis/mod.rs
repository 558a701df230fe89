use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

use crate::{Result, SortVizError};

/// Spectrum measurements over a rendered cue, used to check that the
/// synthesiser produces the pitch a request asked for.
pub struct ToneAnalyser {
    sample_rate: u32,
    fft_planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
}

impl ToneAnalyser {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            fft_planner: RealFftPlanner::new(),
            fft: None,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frequency of the strongest spectral bin, in Hz. Resolution is
    /// `sample_rate / samples.len()`.
    pub fn dominant_frequency(&mut self, samples: &[f32]) -> Result<f32> {
        if samples.len() < 2 {
            return Err(SortVizError::msg(
                "pitch analysis requires at least two samples",
            ));
        }

        let len = samples.len();
        let bin_hz = self.sample_rate as f32 / len as f32;
        let fft = self.prepare_fft(len);

        for (index, value) in samples.iter().enumerate() {
            fft.input[index] = *value * hann_value(index, len);
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)?;

        let peak = fft
            .spectrum
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
            .map(|(bin, _)| bin)
            .unwrap_or(0);

        Ok(peak as f32 * bin_hz)
    }

    fn prepare_fft(&mut self, size: usize) -> &mut FftResources {
        let resources = match self.fft.take() {
            Some(fft) if fft.size == size => fft,
            _ => {
                let plan = self.fft_planner.plan_fft_forward(size);
                let scratch = plan.make_scratch_vec();
                let spectrum = plan.make_output_vec();
                let input = plan.make_input_vec();
                FftResources {
                    size,
                    plan,
                    scratch,
                    spectrum,
                    input,
                }
            }
        };

        self.fft.insert(resources)
    }
}

/// Root-mean-square level of a buffer; zero for an empty one.
pub fn compute_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    (sum / samples.len() as f32).sqrt()
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl fmt::Debug for ToneAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToneAnalyser")
            .field("sample_rate", &self.sample_rate)
            .field("fft", &self.fft)
            .finish()
    }
}

impl fmt::Debug for FftResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftResources")
            .field("size", &self.size)
            .finish()
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{synth, ToneRequest, Waveform};

    fn sine(frequency_hz: f32) -> ToneRequest {
        ToneRequest {
            frequency_hz,
            duration_sec: 0.5,
            fade_fraction: 0.1,
            amplitude: 1.0,
            delay_sec: 0.0,
            waveform: Waveform::Sine,
        }
    }

    #[test]
    fn measures_rendered_pitch() {
        let mut analyser = ToneAnalyser::new(44_100);
        for frequency in [150.0, 237.5, 431.0, 700.0] {
            let samples = synth::render(&sine(frequency), 44_100);
            let measured = analyser.dominant_frequency(&samples).unwrap();
            assert!(
                (measured - frequency).abs() <= 2.0,
                "expected {frequency} Hz, measured {measured} Hz"
            );
        }
    }

    #[test]
    fn rejects_tiny_buffers() {
        let mut analyser = ToneAnalyser::new(44_100);
        assert!(analyser.dominant_frequency(&[0.5]).is_err());
    }

    #[test]
    fn rms_of_silence_and_constant() {
        assert_eq!(compute_rms(&[]), 0.0);
        assert_eq!(compute_rms(&[0.0; 16]), 0.0);
        assert!((compute_rms(&[0.5; 16]) - 0.5).abs() < 1e-6);
    }
}
