//! One estimator and one classifier driven together, frame by frame.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::{Classification, ClassifierConfig, VowelClassifier};
use crate::estimator::{Estimation, EstimatorConfig, FormantEstimator};
use crate::history::History;
use crate::types::{FormantEstimate, SignalLevel, SpectrumFrame};
use crate::vowels::{VowelPrototype, FRENCH_VOWELS};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub estimator: EstimatorConfig,
    pub classifier: ClassifierConfig,
}

impl SessionConfig {
    /// Live microphone settings: five-point history with time-based fading.
    pub fn live() -> Self {
        Self::default()
    }

    /// Offline settings keeping up to `capacity` points.
    pub fn batch(capacity: usize) -> Self {
        Self {
            classifier: ClassifierConfig::batch(capacity),
            ..Self::default()
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.estimator.validate()?;
        self.classifier.validate()
    }
}

/// Everything a renderer needs after one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub estimation: Estimation,
    /// `false` when the estimate fell outside the chart domain.
    pub accepted: bool,
    pub classification: Classification,
}

impl FrameReport {
    pub fn formants(&self) -> Option<FormantEstimate> {
        self.estimation.formants()
    }
}

pub struct Session {
    config: SessionConfig,
    prototypes: &'static [VowelPrototype],
    estimator: FormantEstimator,
    classifier: VowelClassifier,
}

impl Session {
    pub fn new(config: SessionConfig) -> crate::Result<Self> {
        Self::with_prototypes(config, &FRENCH_VOWELS)
    }

    pub fn with_prototypes(
        config: SessionConfig,
        prototypes: &'static [VowelPrototype],
    ) -> crate::Result<Self> {
        config.validate()?;
        let estimator = FormantEstimator::new(config.estimator)?;
        let classifier = VowelClassifier::new(config.classifier, prototypes)?;
        info!(
            "[session] started: {} Hz, smoothing {}, history capacity {}",
            config.estimator.sample_rate, config.estimator.smoothing_factor, config.classifier.capacity
        );
        Ok(Self {
            config,
            prototypes,
            estimator,
            classifier,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn estimator(&self) -> &FormantEstimator {
        &self.estimator
    }

    pub fn classifier(&self) -> &VowelClassifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut VowelClassifier {
        &mut self.classifier
    }

    pub fn history(&self) -> &History {
        self.classifier.history()
    }

    /// Estimates formants for `frame`, records them on the chart and classifies.
    ///
    /// Frames without an estimate leave the history alone, so the report then
    /// carries the classification of the last accepted point.
    pub fn process(&mut self, frame: &SpectrumFrame, level: SignalLevel) -> FrameReport {
        let estimation = self.estimator.analyze(frame, level);
        let accepted = match estimation.formants() {
            Some(f) => self.classifier.add_point(f.f1, f.f2, None),
            None => false,
        };
        FrameReport {
            estimation,
            accepted,
            classification: self.classifier.classify(),
        }
    }

    /// Drops chart history but keeps the estimator's smoothing state.
    pub fn clear_history(&mut self) {
        self.classifier.clear();
    }

    /// Starts over with a fresh estimator and classifier.
    pub fn restart(&mut self) -> crate::Result<()> {
        *self = Self::with_prototypes(self.config, self.prototypes)?;
        info!("[session] restarted");
        Ok(())
    }
}
