//! Band-limited spectral peak picking.

use crate::types::FrequencyRange;

/// Half-width of the local-maximum neighbourhood, in bins.
pub const LOCAL_MAX_HALF_WINDOW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub bin: usize,
    /// Magnitude in the spectrum the search ran over.
    pub value: f64,
}

/// Bin span `[floor(min / bin_hz), ceil(max / bin_hz)]` covering `band`.
pub fn band_bins(band: &FrequencyRange, bin_hz: f64) -> (usize, usize) {
    let start = (band.min / bin_hz).floor().max(0.0) as usize;
    let end = (band.max / bin_hz).ceil().max(0.0) as usize;
    (start, end)
}

/// Strongest strict local maximum with its centre in `start + w .. end - w`.
///
/// A bin qualifies only when all `±w` neighbours are strictly lower. Among
/// qualifying bins the first one with the largest value wins.
pub fn strongest_peak(
    spectrum: &[f64],
    start: usize,
    end: usize,
    half_window: usize,
) -> Option<Peak> {
    let end = end.min(spectrum.len());
    let lo = start + half_window;
    let hi = end.saturating_sub(half_window);

    let mut best: Option<Peak> = None;
    for i in lo..hi {
        let center = spectrum[i];
        if !center.is_finite() {
            continue;
        }
        let is_peak = (i - half_window..=i + half_window)
            .filter(|&j| j != i)
            .all(|j| spectrum[j] < center);
        if !is_peak {
            continue;
        }
        if best.map_or(true, |b| center > b.value) {
            best = Some(Peak { bin: i, value: center });
        }
    }
    best
}
