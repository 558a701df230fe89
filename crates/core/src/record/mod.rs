use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::{
    analysis::compute_rms,
    audio::{synth, ToneRequest, ToneSink},
    Result,
};

/// Offline synthesiser backend: mixes every submitted cue into one mono
/// buffer that can be written out as a WAV file.
#[derive(Debug, Clone)]
pub struct ToneRecorder {
    sample_rate: u32,
    buffer: Vec<f32>,
    submitted: usize,
}

impl ToneRecorder {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            buffer: Vec::new(),
            submitted: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.buffer
    }

    /// Number of requests mixed so far.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn duration_seconds(&self) -> f32 {
        self.buffer.len() as f32 / self.sample_rate as f32
    }

    pub fn rms(&self) -> f32 {
        compute_rms(&self.buffer)
    }

    /// Writes the mix as 16-bit mono PCM, clipping anything outside `[-1, 1]`.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path.as_ref(), spec)?;
        for sample in &self.buffer {
            let clipped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clipped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        tracing::info!(
            path = %path.as_ref().display(),
            seconds = self.duration_seconds(),
            cues = self.submitted,
            "wrote tone recording"
        );
        Ok(())
    }
}

impl ToneSink for ToneRecorder {
    fn submit(&mut self, at_sec: f64, request: &ToneRequest) -> Result<()> {
        let start_sec = at_sec.max(0.0) + f64::from(request.delay_sec.max(0.0));
        let start = (start_sec * f64::from(self.sample_rate)).round() as usize;
        let samples = synth::render(request, self.sample_rate);
        let end = start + samples.len();
        if self.buffer.len() < end {
            self.buffer.resize(end, 0.0);
        }
        for (slot, sample) in self.buffer[start..end].iter_mut().zip(samples) {
            *slot += sample;
        }
        self.submitted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Waveform;

    fn tone(delay_sec: f32) -> ToneRequest {
        ToneRequest {
            frequency_hz: 220.0,
            duration_sec: 0.1,
            fade_fraction: 0.1,
            amplitude: 0.5,
            delay_sec,
            waveform: Waveform::Sine,
        }
    }

    #[test]
    fn places_cues_at_their_offsets() {
        let mut recorder = ToneRecorder::new(1_000);
        recorder.submit(0.5, &tone(0.0)).unwrap();
        recorder.submit(0.5, &tone(0.25)).unwrap();

        assert_eq!(recorder.samples().len(), 850);
        assert!(recorder.samples()[..500].iter().all(|s| *s == 0.0));
        assert_eq!(recorder.submitted(), 2);
        assert!(recorder.rms() > 0.0);
    }

    #[test]
    fn writes_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cues.wav");
        let mut recorder = ToneRecorder::new(8_000);
        recorder.submit(0.0, &tone(0.0)).unwrap();
        recorder.write_wav(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8_000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 800);
    }
}
