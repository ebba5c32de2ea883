//! Frame-by-frame formant analysis of a recorded clip.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::VowelClassifier;
use crate::estimator::{EstimatorConfig, FormantEstimator};
use crate::processing::{rms_level, SpectrumAnalyzer};
use crate::types::{FormantEstimate, SignalLevel, SpectrumFrame};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Samples per analysis frame; the spectrum has half as many bins.
    pub fft_size: usize,
    pub hop_seconds: f64,
    pub pre_emphasis: f32,
    /// `sample_rate` is replaced by the clip's own rate.
    pub estimator: EstimatorConfig,
}

impl RecordingConfig {
    pub const DEFAULT_FFT_SIZE: usize = 2048;
    pub const MIN_FFT_SIZE: usize = 64;
    pub const DEFAULT_HOP_SECONDS: f64 = 0.01;

    pub fn validate(&self) -> crate::Result<()> {
        if self.fft_size < Self::MIN_FFT_SIZE || self.fft_size % 2 != 0 {
            return Err(crate::invalid(format!(
                "fft size must be even and at least {}, got {}",
                Self::MIN_FFT_SIZE,
                self.fft_size
            )));
        }
        if !self.hop_seconds.is_finite() || self.hop_seconds <= 0.0 {
            return Err(crate::invalid(format!(
                "hop must be a positive number of seconds, got {}",
                self.hop_seconds
            )));
        }
        if !(0.0..1.0).contains(&self.pre_emphasis) {
            return Err(crate::invalid(format!(
                "pre-emphasis must lie in [0, 1), got {}",
                self.pre_emphasis
            )));
        }
        Ok(())
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            fft_size: Self::DEFAULT_FFT_SIZE,
            hop_seconds: Self::DEFAULT_HOP_SECONDS,
            pre_emphasis: 0.0,
            estimator: EstimatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    /// Start of the frame, in seconds from the beginning of the clip.
    pub time: f64,
    pub formants: Option<FormantEstimate>,
}

/// Per-frame estimates of a whole clip, in time order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormantTrack {
    points: Vec<TrackPoint>,
}

impl FormantTrack {
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn voiced_count(&self) -> usize {
        self.points.iter().filter(|p| p.formants.is_some()).count()
    }

    /// Most recent frame that produced an estimate.
    pub fn last_valid(&self) -> Option<&TrackPoint> {
        self.points.iter().rev().find(|p| p.formants.is_some())
    }

    /// Replaces the classifier history with this track, older frames fainter.
    ///
    /// Returns how many points the classifier accepted. Only the newest
    /// `capacity` of them are kept.
    pub fn fill_history(&self, classifier: &mut VowelClassifier) -> usize {
        classifier.clear();
        let n = self.points.len() as f64;
        let mut accepted = 0;
        for (i, point) in self.points.iter().enumerate() {
            let Some(f) = point.formants else {
                continue;
            };
            let opacity = 0.2 + 0.8 * i as f64 / n;
            if classifier.add_point(f.f1, f.f2, Some(opacity)) {
                accepted += 1;
            }
        }
        accepted
    }
}

/// Runs the estimator over `samples` with a sliding window.
///
/// Each window is gated on its own RMS amplitude. A partial window at the
/// end of the clip is not analyzed.
pub fn analyze_recording(
    samples: &[f32],
    sample_rate: f64,
    config: &RecordingConfig,
) -> crate::Result<FormantTrack> {
    config.validate()?;
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(crate::Error::InvalidRecording(format!(
            "sample rate must be positive, got {sample_rate}"
        )));
    }
    if samples.is_empty() {
        return Err(crate::Error::InvalidRecording("clip is empty".into()));
    }
    if samples.len() < config.fft_size {
        return Err(crate::Error::InvalidRecording(format!(
            "clip has {} samples, shorter than one {}-sample frame",
            samples.len(),
            config.fft_size
        )));
    }

    let mut estimator = FormantEstimator::new(EstimatorConfig {
        sample_rate,
        ..config.estimator
    })?;
    estimator.config().check_resolution(config.fft_size / 2)?;
    let mut analyzer = SpectrumAnalyzer::new(config.fft_size, config.pre_emphasis);
    let hop = ((config.hop_seconds * sample_rate).round() as usize).max(1);

    let mut points = Vec::with_capacity((samples.len() - config.fft_size) / hop + 1);
    for start in (0..=samples.len() - config.fft_size).step_by(hop) {
        let window = &samples[start..start + config.fft_size];
        let level = SignalLevel::Rms(rms_level(window) as f64);
        let frame = SpectrumFrame::decibels(analyzer.spectrum_db(window), sample_rate);
        points.push(TrackPoint {
            time: start as f64 / sample_rate,
            formants: estimator.estimate(&frame, level),
        });
    }

    let track = FormantTrack { points };
    info!(
        "[recording] {:.2}s clip: {} frames, {} with formants",
        samples.len() as f64 / sample_rate,
        track.len(),
        track.voiced_count()
    );
    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierConfig;
    use crate::vowels::FRENCH_VOWELS;

    fn track(formants: &[Option<(f64, f64)>]) -> FormantTrack {
        FormantTrack {
            points: formants
                .iter()
                .enumerate()
                .map(|(i, f)| TrackPoint {
                    time: i as f64 * 0.01,
                    formants: f.map(|(f1, f2)| FormantEstimate::new(f1, f2)),
                })
                .collect(),
        }
    }

    #[test]
    fn last_valid_skips_trailing_silence() {
        let t = track(&[Some((400.0, 2000.0)), Some((500.0, 1500.0)), None]);
        assert_eq!(
            t.last_valid().and_then(|p| p.formants),
            Some(FormantEstimate::new(500.0, 1500.0))
        );
        assert!(track(&[None, None]).last_valid().is_none());
        assert_eq!(t.voiced_count(), 2);
    }

    #[test]
    fn fill_history_fades_older_frames() {
        let t = track(&[Some((400.0, 2000.0)), None, Some((500.0, 1500.0)), Some((100.0, 1500.0))]);
        let mut c = VowelClassifier::new(ClassifierConfig::batch(100), &FRENCH_VOWELS).unwrap();
        c.add_point(600.0, 1200.0, None);
        assert_eq!(t.fill_history(&mut c), 2);
        let weights = c.weights_at(std::time::Instant::now());
        assert_eq!(weights.len(), 2);
        assert!((weights[0] - 0.2).abs() < 1e-12);
        assert!((weights[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_input() {
        let cfg = RecordingConfig::default();
        assert!(matches!(
            analyze_recording(&[], 44_100.0, &cfg),
            Err(crate::Error::InvalidRecording(_))
        ));
        assert!(matches!(
            analyze_recording(&[0.0; 4096], 0.0, &cfg),
            Err(crate::Error::InvalidRecording(_))
        ));
        assert!(matches!(
            analyze_recording(&[0.0; 1000], 44_100.0, &cfg),
            Err(crate::Error::InvalidRecording(_))
        ));
        let odd = RecordingConfig {
            fft_size: 1001,
            ..cfg
        };
        assert!(matches!(
            analyze_recording(&[0.0; 4096], 44_100.0, &odd),
            Err(crate::Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn fft_too_small_for_the_bands_is_rejected() {
        let cfg = RecordingConfig {
            fft_size: 64,
            ..RecordingConfig::default()
        };
        let samples: Vec<f32> = (0..44_100)
            .map(|i| {
                let t = i as f32 / 44_100.0;
                0.3 * (2.0 * std::f32::consts::PI * 400.0 * t).sin()
                    + 0.3 * (2.0 * std::f32::consts::PI * 2000.0 * t).sin()
            })
            .collect();
        assert!(matches!(
            analyze_recording(&samples, 44_100.0, &cfg),
            Err(crate::Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn silence_yields_no_formants() {
        let t = analyze_recording(&[0.0; 8192], 16_000.0, &RecordingConfig::default()).unwrap();
        assert_eq!(t.len(), (8192 - 2048) / 160 + 1);
        assert_eq!(t.voiced_count(), 0);
    }
}
