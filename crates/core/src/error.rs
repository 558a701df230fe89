/// Result alias that carries the custom [`SortVizError`] type.
pub type Result<T> = std::result::Result<T, SortVizError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SortVizError {
    /// Free-form failure surfaced to the application with a readable message.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or report (de)serialisation failure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Failure while writing rendered cues to a WAV file.
    #[error("wav: {0}")]
    Wav(#[from] hound::Error),
    /// Spectrum analysis rejected its buffers.
    #[error("fft: {0}")]
    Fft(#[from] realfft::FftError),
    /// The loaded trace has no snapshots, so there is nothing to play.
    #[error("trace for `{0}` contains no snapshots")]
    EmptyTrace(String),
    /// An algorithm name did not match any supported family.
    #[error("unknown algorithm `{0}` (expected bubble, merge or quick)")]
    UnknownAlgorithm(String),
}

impl SortVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SortVizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SortVizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
