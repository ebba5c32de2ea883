use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

type Complex32 = Complex<f32>;

pub(crate) const DB_EPSILON: f32 = 1e-9;

pub fn lin_to_db(value: f32) -> f32 {
    20.0 * value.max(DB_EPSILON).log10()
}

pub fn db_to_lin(db: f32) -> f64 {
    10f64.powf(db as f64 / 20.0)
}

/// Mean of a dB spectrum. `-inf` when empty.
pub fn average_db(spectrum_db: &[f32]) -> f64 {
    if spectrum_db.is_empty() {
        return f64::NEG_INFINITY;
    }
    spectrum_db.iter().map(|&v| v as f64).sum::<f64>() / spectrum_db.len() as f64
}

/// Rescales `values` onto `[0, 1]`. A flat or empty input maps to all zeros.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|&v| if v.is_finite() { (v - min) / range } else { 0.0 })
        .collect()
}

pub fn rms_level(x: &[f32]) -> f32 {
    if x.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for &v in x {
        sum += (v as f64) * (v as f64);
    }
    let rms = (sum / x.len() as f64).sqrt();
    rms as f32
}

pub fn hamming_window(n: usize) -> Vec<f32> {
    if n < 2 {
        return vec![1.0; n];
    }
    let mut w = Vec::with_capacity(n);
    for i in 0..n {
        let val = 0.54 - 0.46 * ((2.0 * PI * i as f64) / (n as f64 - 1.0)).cos();
        w.push(val as f32);
    }
    w
}

/// Windowed FFT turning time-domain frames into dB magnitude spectra.
///
/// Produces `fft_size / 2` bins so that bin `i` sits at
/// `i * (sample_rate / 2) / bin_count`, the same layout live frames use.
pub struct SpectrumAnalyzer {
    fft_size: usize,
    pre_emphasis: f32,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_input: Vec<Complex32>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize, pre_emphasis: f32) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self {
            fft_size,
            pre_emphasis,
            window: hamming_window(fft_size),
            fft,
            fft_input: vec![Complex32::new(0.0, 0.0); fft_size],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Frames shorter than `fft_size` are zero-padded.
    pub fn spectrum_db(&mut self, frame: &[f32]) -> Vec<f32> {
        let mut prev = frame.first().copied().unwrap_or(0.0);
        for (i, v) in self.fft_input.iter_mut().enumerate() {
            let sample = if i < frame.len() {
                let current = frame[i];
                // x[n] - k * x[n-1]
                let emphasized = if i == 0 {
                    current
                } else {
                    current - self.pre_emphasis * prev
                };
                prev = current;
                emphasized * self.window[i]
            } else {
                0.0
            };
            *v = Complex32::new(sample, 0.0);
        }
        self.fft.process(&mut self.fft_input);

        let scale = 1.0 / self.fft_size as f32;
        self.fft_input[..self.bin_count()]
            .iter()
            .map(|c| lin_to_db(c.norm() * scale))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip() {
        for db in [-80.0f32, -20.0, 0.0, 6.0] {
            let lin = db_to_lin(db);
            assert!((lin_to_db(lin as f32) - db).abs() < 1e-3);
        }
    }

    #[test]
    fn min_max_spans_unit_interval() {
        let out = min_max_normalize(&[2.0, 4.0, 3.0]);
        assert_eq!(out, vec![0.0, 1.0, 0.5]);
        assert_eq!(min_max_normalize(&[1.0, 1.0]), vec![0.0, 0.0]);
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn rms_of_constant() {
        assert!((rms_level(&[0.5; 64]) - 0.5).abs() < 1e-6);
        assert_eq!(rms_level(&[]), 0.0);
    }

    #[test]
    fn analyzer_peaks_at_tone_bin() {
        let sample_rate = 16_000.0f32;
        let fft_size = 1024;
        let bin_hz = sample_rate / fft_size as f32;
        let tone = 40.0 * bin_hz;
        let frame: Vec<f32> = (0..fft_size)
            .map(|i| (2.0 * std::f32::consts::PI * tone * i as f32 / sample_rate).sin())
            .collect();
        let mut analyzer = SpectrumAnalyzer::new(fft_size, 0.0);
        let spectrum = analyzer.spectrum_db(&frame);
        assert_eq!(spectrum.len(), fft_size / 2);
        let (peak, _) = spectrum
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
                if v > best.1 {
                    (i, v)
                } else {
                    best
                }
            });
        assert_eq!(peak, 40);
    }
}
