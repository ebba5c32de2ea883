//! Offline analysis of synthetic clips.

use std::f32::consts::PI;

use formant_chart::{
    analyze_recording, ClassifierConfig, RecordingConfig, VowelClassifier, FRENCH_VOWELS,
};

const SR: f64 = 44_100.0;

/// Sum of equal-amplitude sines, `seconds` long.
fn tones(freqs: &[f32], seconds: f64) -> Vec<f32> {
    let n = (seconds * SR) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SR as f32;
            freqs.iter().map(|&f| 0.3 * (2.0 * PI * f * t).sin()).sum()
        })
        .collect()
}

#[test]
fn two_tones_track_as_formants() -> anyhow::Result<()> {
    formant_chart::telemetry::init_for_tests();
    let samples = tones(&[400.0, 2000.0], 0.5);
    let cfg = RecordingConfig::default();
    let track = analyze_recording(&samples, SR, &cfg)?;

    let hop = (cfg.hop_seconds * SR).round() as usize;
    assert_eq!(track.len(), (samples.len() - cfg.fft_size) / hop + 1);
    assert_eq!(track.voiced_count(), track.len());

    let bin_hz = SR / cfg.fft_size as f64;
    let last = track.last_valid().and_then(|p| p.formants).expect("voiced clip");
    assert!((last.f1 - 400.0).abs() <= bin_hz, "f1 {}", last.f1);
    assert!((last.f2 - 2000.0).abs() <= bin_hz, "f2 {}", last.f2);

    let times: Vec<f64> = track.points().iter().map(|p| p.time).collect();
    assert_eq!(times[0], 0.0);
    assert!(times.windows(2).all(|w| w[1] > w[0]));
    Ok(())
}

#[test]
fn leading_silence_is_gated() -> anyhow::Result<()> {
    let mut samples = vec![0.0f32; (0.1 * SR) as usize];
    samples.extend(tones(&[400.0, 2000.0], 0.3));
    let track = analyze_recording(&samples, SR, &RecordingConfig::default())?;
    assert!(track.points()[0].formants.is_none());
    assert!(track.voiced_count() > 0);
    assert!(track.voiced_count() < track.len());
    Ok(())
}

#[test]
fn track_fills_a_batch_chart() -> anyhow::Result<()> {
    let samples = tones(&[400.0, 2000.0], 0.5);
    let track = analyze_recording(&samples, SR, &RecordingConfig::default())?;
    let mut classifier = VowelClassifier::new(ClassifierConfig::batch(100), &FRENCH_VOWELS)?;

    let accepted = track.fill_history(&mut classifier);
    assert_eq!(accepted, track.voiced_count());
    assert_eq!(classifier.history().len(), accepted.min(100));

    let weights = classifier.weights_at(std::time::Instant::now());
    assert!((weights[0] - 0.2).abs() < 1e-12);
    assert!(weights.windows(2).all(|w| w[1] > w[0]));
    assert!(weights.iter().all(|&w| w < 1.0));

    let nearest = classifier.classify();
    assert_eq!(nearest.matched().map(|n| n.label()), Some("y"));
    Ok(())
}
