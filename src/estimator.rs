//! Per-frame F1/F2 estimation from a magnitude spectrum.
//!
//! Each frame goes through a level gate, a strongest-local-maximum search in
//! the F1 and F2 bands, a power floor check on both peaks, and finally
//! exponential smoothing against the previous estimate.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::peaks::{band_bins, strongest_peak, Peak, LOCAL_MAX_HALF_WINDOW};
use crate::processing::{db_to_lin, min_max_normalize};
use crate::tracking::{FormantSmoother, SmoothingState};
use crate::types::{FormantEstimate, FrequencyRange, MagnitudeUnits, SignalLevel, SpectrumFrame};

/// How the magnitude frame is turned into the spectrum that peaks are searched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `10^(dB / 20)`.
    Decibel,
    /// Linear magnitudes rescaled onto `[0, 1]` per frame.
    MinMax,
}

/// Minimum signal level below which frames are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Applied to [`SignalLevel::AverageDb`].
    pub min_average_db: f64,
    /// Applied to [`SignalLevel::Rms`].
    pub min_rms: f64,
}

impl GateConfig {
    pub const DEFAULT_MIN_AVERAGE_DB: f64 = -100.0;
    pub const DEFAULT_MIN_RMS: f64 = 0.01;

    pub fn passes(&self, level: SignalLevel) -> bool {
        match level {
            SignalLevel::AverageDb(db) => db >= self.min_average_db,
            SignalLevel::Rms(rms) => rms >= self.min_rms,
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.min_average_db.is_nan() {
            return Err(crate::invalid("gate min_average_db is NaN"));
        }
        if !self.min_rms.is_finite() || self.min_rms < 0.0 {
            return Err(crate::invalid(format!(
                "gate min_rms must be a non-negative number, got {}",
                self.min_rms
            )));
        }
        Ok(())
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_average_db: Self::DEFAULT_MIN_AVERAGE_DB,
            min_rms: Self::DEFAULT_MIN_RMS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub sample_rate: f64,
    pub f1_band: FrequencyRange,
    pub f2_band: FrequencyRange,
    /// Weight of the previous estimate, in `[0, 1)`. Zero disables smoothing.
    pub smoothing_factor: f64,
    pub gate: GateConfig,
    /// Peaks at or below this raw level are rejected.
    pub peak_floor_db: f64,
    pub normalization: Normalization,
}

impl EstimatorConfig {
    pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;
    pub const F1_BAND: FrequencyRange = FrequencyRange::new(200.0, 1000.0);
    pub const F2_BAND: FrequencyRange = FrequencyRange::new(750.0, 2600.0);
    pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.5;
    pub const DEFAULT_PEAK_FLOOR_DB: f64 = -80.0;

    pub fn with_sample_rate(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    pub fn validate(&self) -> crate::Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(crate::invalid(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        self.f1_band.validate("f1 band", Some(self.nyquist()))?;
        self.f2_band.validate("f2 band", Some(self.nyquist()))?;
        if !(0.0..1.0).contains(&self.smoothing_factor) {
            return Err(crate::invalid(format!(
                "smoothing factor must lie in [0, 1), got {}",
                self.smoothing_factor
            )));
        }
        if self.peak_floor_db.is_nan() {
            return Err(crate::invalid("peak floor is NaN"));
        }
        self.gate.validate()
    }

    /// Checks that `bin_count` bins at this sample rate leave a non-empty
    /// peak search inside both bands.
    pub fn check_resolution(&self, bin_count: usize) -> crate::Result<()> {
        if bin_count == 0 {
            return Err(crate::invalid("spectrum has no bins"));
        }
        let bin_hz = self.nyquist() / bin_count as f64;
        for band in [&self.f1_band, &self.f2_band] {
            let (start, end) = band_bins(band, bin_hz);
            let scan_empty =
                end.saturating_sub(LOCAL_MAX_HALF_WINDOW) <= start + LOCAL_MAX_HALF_WINDOW;
            if end > bin_count || scan_empty {
                return Err(crate::invalid(format!(
                    "{} bins of {:.1} Hz cannot resolve [{}, {}] Hz",
                    bin_count, bin_hz, band.min, band.max
                )));
            }
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            f1_band: Self::F1_BAND,
            f2_band: Self::F2_BAND,
            smoothing_factor: Self::DEFAULT_SMOOTHING_FACTOR,
            gate: GateConfig::default(),
            peak_floor_db: Self::DEFAULT_PEAK_FLOOR_DB,
            normalization: Normalization::Decibel,
        }
    }
}

/// Outcome of one [`FormantEstimator::analyze`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimation {
    Formants(FormantEstimate),
    /// Level below the gate.
    NoSignal,
    /// A band had no qualifying local maximum, or its peak sat on the floor.
    NoPeak,
    /// Frame does not match the configured sample rate or band coverage.
    Unusable,
}

impl Estimation {
    pub fn formants(&self) -> Option<FormantEstimate> {
        match self {
            Estimation::Formants(f) => Some(*f),
            _ => None,
        }
    }
}

pub struct FormantEstimator {
    config: EstimatorConfig,
    smoother: FormantSmoother,
}

impl FormantEstimator {
    pub fn new(config: EstimatorConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            smoother: FormantSmoother::new(config.smoothing_factor),
            config,
        })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn smoothing_state(&self) -> SmoothingState {
        self.smoother.state()
    }

    /// Forget the previous estimate, as at the start of a new session.
    pub fn reset(&mut self) {
        self.smoother.reset();
    }

    pub fn estimate(&mut self, frame: &SpectrumFrame, level: SignalLevel) -> Option<FormantEstimate> {
        self.analyze(frame, level).formants()
    }

    pub fn analyze(&mut self, frame: &SpectrumFrame, level: SignalLevel) -> Estimation {
        if !self.config.gate.passes(level) {
            debug!("[estimator] frame gated: {level:?}");
            return Estimation::NoSignal;
        }
        if frame.is_empty() {
            debug!("[estimator] empty frame");
            return Estimation::NoPeak;
        }
        if !self.is_usable(frame) {
            return Estimation::Unusable;
        }

        let spectrum = self.normalized_spectrum(frame);
        let bin_hz = frame.bin_hz();
        let Some(p1) = self.band_peak(&spectrum, frame, &self.config.f1_band, bin_hz) else {
            return Estimation::NoPeak;
        };
        let Some(p2) = self.band_peak(&spectrum, frame, &self.config.f2_band, bin_hz) else {
            return Estimation::NoPeak;
        };

        let raw = FormantEstimate {
            f1: frame.bin_frequency(p1.bin),
            f2: frame.bin_frequency(p2.bin),
        };
        let smoothed = self.smoother.update(raw);
        debug!(
            "[estimator] raw f1 {:.1} f2 {:.1} -> smoothed f1 {:.1} f2 {:.1}",
            raw.f1, raw.f2, smoothed.f1, smoothed.f2
        );
        Estimation::Formants(smoothed)
    }

    fn is_usable(&self, frame: &SpectrumFrame) -> bool {
        let expected = self.config.sample_rate;
        if (frame.sample_rate() - expected).abs() > expected * 1e-9 {
            warn!(
                "[estimator] frame sample rate {} Hz does not match configured {} Hz",
                frame.sample_rate(),
                expected
            );
            return false;
        }
        if let Err(err) = self.config.check_resolution(frame.bin_count()) {
            warn!("[estimator] unusable frame: {err}");
            return false;
        }
        true
    }

    fn normalized_spectrum(&self, frame: &SpectrumFrame) -> Vec<f64> {
        let linear: Vec<f64> = match frame.units() {
            MagnitudeUnits::Decibels => frame.magnitudes().iter().map(|&db| db_to_lin(db)).collect(),
            MagnitudeUnits::Linear => frame.magnitudes().iter().map(|&v| v as f64).collect(),
        };
        match self.config.normalization {
            Normalization::Decibel => linear,
            Normalization::MinMax => min_max_normalize(&linear),
        }
    }

    fn band_peak(
        &self,
        spectrum: &[f64],
        frame: &SpectrumFrame,
        band: &FrequencyRange,
        bin_hz: f64,
    ) -> Option<Peak> {
        let (start, end) = band_bins(band, bin_hz);
        let Some(peak) = strongest_peak(spectrum, start, end, LOCAL_MAX_HALF_WINDOW) else {
            debug!("[estimator] no local maximum in [{}, {}] Hz", band.min, band.max);
            return None;
        };
        let power_db = frame.bin_db(peak.bin)?;
        if power_db > self.config.peak_floor_db {
            Some(peak)
        } else {
            debug!(
                "[estimator] peak at bin {} is {power_db:.1} dB, floor {} dB",
                peak.bin, self.config.peak_floor_db
            );
            None
        }
    }
}
