//! Formant estimation and vowel-chart classification.
//!
//! A [`FormantEstimator`] turns one magnitude spectrum into a smoothed
//! (F1, F2) pair. A [`VowelClassifier`] keeps a short history of those pairs
//! on a vowel chart and reports the nearest reference vowel. [`Session`] wires
//! the two together per frame.
//!
//! ```
//! use formant_chart::{Session, SessionConfig, SignalLevel, SpectrumFrame};
//!
//! let mut session = Session::new(SessionConfig::live()).unwrap();
//! let frame = SpectrumFrame::decibels(vec![-100.0; 1024], 44_100.0);
//! let report = session.process(&frame, SignalLevel::of_frame(&frame));
//! assert!(report.formants().is_none());
//! ```

pub mod chart;
pub mod classifier;
pub mod estimator;
pub mod history;
pub mod peaks;
pub mod processing;
pub mod recording;
pub mod session;
pub mod telemetry;
pub mod tracking;
pub mod types;
pub mod vowels;

pub use chart::{ChartGeometry, PrototypeLayout};
pub use classifier::{Classification, ClassifierConfig, NearestVowel, VowelClassifier};
pub use estimator::{Estimation, EstimatorConfig, FormantEstimator, GateConfig, Normalization};
pub use history::{History, HistoryPoint, PointWeight};
pub use recording::{analyze_recording, FormantTrack, RecordingConfig, TrackPoint};
pub use session::{FrameReport, Session, SessionConfig};
pub use tracking::SmoothingState;
pub use types::{FormantEstimate, FrequencyRange, MagnitudeUnits, SignalLevel, SpectrumFrame};
pub use vowels::{VowelPrototype, FRENCH_VOWELS};

/// Errors returned when building estimators, classifiers and sessions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid recording: {0}")]
    InvalidRecording(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidConfiguration(msg.into())
}
