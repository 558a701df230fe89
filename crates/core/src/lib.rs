//! Core library for the Sort Visualiser application.
//!
//! Plays back sorting traces (ordered snapshots of an array) and infers the
//! operation behind each transition so that it can be voiced as a short
//! tone. Trace acquisition, playback, classification, tone mapping and
//! completion tracking each live in their own module; drawing and audio
//! output sit behind the [`Renderer`] and [`ToneSink`] traits.

pub mod algorithm;
pub mod analysis;
pub mod audio;
pub mod classify;
pub mod completion;
pub mod config;
pub mod error;
pub mod playback;
pub mod record;
pub mod render;
pub mod scene;
pub mod session;
pub mod trace;

pub use algorithm::Algorithm;
pub use analysis::ToneAnalyser;
pub use audio::{ToneContext, ToneMapper, ToneRequest, ToneSink, Waveform};
pub use classify::{classify, Event};
pub use completion::CompletionMemo;
pub use config::{AppConfig, AudioConfig, PlaybackConfig, TraceCommand, TraceConfig};
pub use error::{Result, SortVizError};
pub use playback::PlaybackCursor;
pub use record::ToneRecorder;
pub use render::{FrameView, LayoutRecorder, Renderer};
pub use scene::{BarLayout, Camera};
pub use session::{Command, Session, TickOutput};
pub use trace::{LoadedTrace, SnapshotSequence, TraceLoader, TraceOrigin, TraceSource};
