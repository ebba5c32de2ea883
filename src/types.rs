use serde::{Deserialize, Serialize};

use crate::processing::{average_db, lin_to_db};

/// One smoothed (F1, F2) pair in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormantEstimate {
    pub f1: f64,
    pub f2: f64,
}

impl FormantEstimate {
    pub fn new(f1: f64, f2: f64) -> Self {
        Self { f1, f2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeUnits {
    Decibels,
    Linear,
}

/// Magnitude-per-bin snapshot of one analysis window.
///
/// Bin `i` sits at `i * (sample_rate / 2) / bin_count` Hz.
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    magnitudes: Vec<f32>,
    sample_rate: f64,
    units: MagnitudeUnits,
}

impl SpectrumFrame {
    pub fn new(magnitudes: Vec<f32>, sample_rate: f64, units: MagnitudeUnits) -> Self {
        Self {
            magnitudes,
            sample_rate,
            units,
        }
    }

    pub fn decibels(magnitudes: Vec<f32>, sample_rate: f64) -> Self {
        Self::new(magnitudes, sample_rate, MagnitudeUnits::Decibels)
    }

    pub fn linear(magnitudes: Vec<f32>, sample_rate: f64) -> Self {
        Self::new(magnitudes, sample_rate, MagnitudeUnits::Linear)
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn units(&self) -> MagnitudeUnits {
        self.units
    }

    pub fn bin_count(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Width of one bin in Hz. Zero for an empty frame.
    pub fn bin_hz(&self) -> f64 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        (self.sample_rate / 2.0) / self.magnitudes.len() as f64
    }

    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_hz()
    }

    /// Level of `bin` in dB regardless of the frame's units.
    pub fn bin_db(&self, bin: usize) -> Option<f64> {
        let value = *self.magnitudes.get(bin)?;
        Some(match self.units {
            MagnitudeUnits::Decibels => value as f64,
            MagnitudeUnits::Linear => lin_to_db(value) as f64,
        })
    }

    /// Mean dB level across all bins, `-inf` for an empty frame.
    pub fn average_db(&self) -> f64 {
        match self.units {
            MagnitudeUnits::Decibels => average_db(&self.magnitudes),
            MagnitudeUnits::Linear => {
                let db: Vec<f32> = self.magnitudes.iter().copied().map(lin_to_db).collect();
                average_db(&db)
            }
        }
    }
}

/// Overall loudness of a frame, as supplied by the capture layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalLevel {
    /// Mean of the frame's dB magnitudes.
    AverageDb(f64),
    /// RMS amplitude of the time-domain window behind the frame.
    Rms(f64),
}

impl SignalLevel {
    pub fn of_frame(frame: &SpectrumFrame) -> Self {
        SignalLevel::AverageDb(frame.average_db())
    }
}

/// Closed frequency interval in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min: f64,
    pub max: f64,
}

impl FrequencyRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, hz: f64) -> bool {
        hz >= self.min && hz <= self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub(crate) fn validate(&self, name: &str, nyquist: Option<f64>) -> crate::Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(crate::invalid(format!("{name} bounds must be finite")));
        }
        if self.min < 0.0 {
            return Err(crate::invalid(format!(
                "{name} minimum {} Hz is negative",
                self.min
            )));
        }
        if self.min >= self.max {
            return Err(crate::invalid(format!(
                "{name} is inverted or empty: [{}, {}] Hz",
                self.min, self.max
            )));
        }
        if let Some(nyquist) = nyquist {
            if self.max > nyquist {
                return Err(crate::invalid(format!(
                    "{name} maximum {} Hz exceeds nyquist {} Hz",
                    self.max, nyquist
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_frequency_uses_half_sample_rate() {
        let frame = SpectrumFrame::decibels(vec![0.0; 1024], 44_100.0);
        assert!((frame.bin_hz() - 22_050.0 / 1024.0).abs() < 1e-12);
        assert!((frame.bin_frequency(93) - 93.0 * 22_050.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn empty_frame_is_silent() {
        let frame = SpectrumFrame::decibels(Vec::new(), 48_000.0);
        assert_eq!(frame.bin_hz(), 0.0);
        assert_eq!(frame.average_db(), f64::NEG_INFINITY);
    }

    #[test]
    fn linear_bins_report_db() {
        let frame = SpectrumFrame::linear(vec![1.0, 0.1], 8_000.0);
        assert!(frame.bin_db(0).unwrap().abs() < 1e-6);
        assert!((frame.bin_db(1).unwrap() + 20.0).abs() < 1e-4);
        assert_eq!(frame.bin_db(2), None);
    }

    #[test]
    fn range_validation() {
        assert!(FrequencyRange::new(200.0, 1000.0).validate("f1", Some(22_050.0)).is_ok());
        assert!(FrequencyRange::new(1000.0, 200.0).validate("f1", None).is_err());
        assert!(FrequencyRange::new(200.0, 200.0).validate("f1", None).is_err());
        assert!(FrequencyRange::new(-1.0, 200.0).validate("f1", None).is_err());
        assert!(FrequencyRange::new(200.0, 5000.0).validate("f2", Some(4000.0)).is_err());
        assert!(FrequencyRange::new(f64::NAN, 200.0).validate("f2", None).is_err());
    }
}
