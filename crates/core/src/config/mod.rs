use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Algorithm, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub playback: PlaybackConfig,
    pub audio: AudioConfig,
    pub trace: TraceConfig,
    pub completion: CompletionConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections and fields fall back
    /// to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Frame cadence of the playback loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub tick_rate_hz: u32,
    /// Number of ticks between automatic cursor advances.
    pub ticks_per_step: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            ticks_per_step: 6,
        }
    }
}

/// Configuration specific to the audio cue subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub master_volume: f32,
    pub volume_step: f32,
    pub muted: bool,
    /// Share of each cue spent fading in, and again fading out.
    pub fade_fraction: f32,
    pub completion_gap_sec: f32,
    pub pivot_modulation_hz: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            master_volume: 0.5,
            volume_step: 0.1,
            muted: false,
            fade_fraction: 0.1,
            completion_gap_sec: 0.05,
            pivot_modulation_hz: 30.0,
        }
    }
}

/// External program launched to produce a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl TraceCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Where traces come from and how long the loader waits for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub sources: BTreeMap<Algorithm, TraceCommand>,
    pub fallback_len: usize,
    pub fallback_seed: Option<u64>,
    pub max_lines: usize,
    pub timeout_ms: u64,
}

impl TraceConfig {
    pub fn command_for(&self, algorithm: Algorithm) -> Option<&TraceCommand> {
        self.sources.get(&algorithm)
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        let sources = Algorithm::ALL
            .into_iter()
            .map(|algorithm| (algorithm, TraceCommand::new(format!("./{algorithm}_sort"))))
            .collect();
        Self {
            sources,
            fallback_len: 30,
            fallback_seed: None,
            max_lines: 100_000,
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub memo_capacity: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self { memo_capacity: 256 }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_point_at_sibling_executables() {
        let config = AppConfig::default();
        let quick = config.trace.command_for(Algorithm::Quick).unwrap();
        assert_eq!(quick.program, "./quick_sort");
        assert!(quick.args.is_empty());
        assert_eq!(config.playback.tick_rate_hz, 60);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "audio": {{ "master_volume": 0.8 }},
                "trace": {{
                    "sources": {{ "merge": {{ "program": "/opt/merge", "args": ["-n", "40"] }} }},
                    "fallback_len": 12
                }}
            }}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert!((config.audio.master_volume - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.trace.fallback_len, 12);
        assert_eq!(config.trace.timeout_ms, 5_000);
        let merge = config.trace.command_for(Algorithm::Merge).unwrap();
        assert_eq!(merge.args, vec!["-n".to_string(), "40".to_string()]);
        assert!(config.trace.command_for(Algorithm::Bubble).is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }
}
