//! End-to-end pipeline tests on synthesized horn signals: segment location,
//! spectral peak extraction, and classification chained together.

use klaxon_core::classify::{classify_peaks, ClassifyConfig, ThirdKind};
use klaxon_core::segment::{locate_horn_segment, SegmentConfig};
use klaxon_core::spectrum::{extract_peaks, SpectralConfig};

const SAMPLE_RATE: u32 = 22_050;
const N_FFT: usize = 4096;

fn bin_hz(bin: usize) -> f32 {
    bin as f32 * SAMPLE_RATE as f32 / N_FFT as f32
}

/// Silence, then a sum of bin-aligned sines, then silence again.
fn synth_horn(partials: &[(usize, f32)], tone_s: f32, pad_s: f32) -> Vec<f32> {
    let pad = (pad_s * SAMPLE_RATE as f32) as usize;
    let tone = (tone_s * SAMPLE_RATE as f32) as usize;
    let mut samples = vec![0.0f32; pad];
    for i in 0..tone {
        let t = i as f32 / SAMPLE_RATE as f32;
        let mut s = 0.0;
        for &(bin, amp) in partials {
            s += amp * (2.0 * std::f32::consts::PI * bin_hz(bin) * t).sin();
        }
        samples.push(s);
    }
    samples.extend(std::iter::repeat(0.0).take(pad));
    samples
}

#[test]
fn single_horn_fundamental_and_harmonics() {
    // Fundamental at ~430.7 Hz with second and third harmonics.
    let partials = [(80, 1.0), (160, 0.4), (240, 0.2)];
    let samples = synth_horn(&partials, 2.0, 0.5);

    let seg_cfg = SegmentConfig::default();
    let seg = locate_horn_segment(&samples, &seg_cfg);
    assert!(!seg.degenerate);
    // The located segment should bracket the tone, give or take a frame.
    let pad = (0.5 * SAMPLE_RATE as f32) as usize;
    assert!(seg.start <= pad);
    assert!(seg.start + seg_cfg.frame_len + seg_cfg.hop > pad);
    assert!(seg.end + 2 * seg_cfg.frame_len > samples.len() - pad);

    let peaks = extract_peaks(
        &samples[seg.start..seg.end],
        SAMPLE_RATE,
        &SpectralConfig::default(),
    );
    let analysis = classify_peaks(&peaks, &ClassifyConfig::default()).unwrap();

    let f0 = bin_hz(80);
    assert!(
        (analysis.fundamental_hz - f0).abs() < 6.0,
        "fundamental {} Hz, expected ~{} Hz",
        analysis.fundamental_hz,
        f0
    );

    let note = analysis.fundamental_note.unwrap();
    assert_eq!(note.name, "A");
    assert_eq!(note.octave, 4);

    let numbers: Vec<u32> = analysis.harmonics.iter().map(|h| h.number).collect();
    assert!(numbers.contains(&2), "missing 2nd harmonic in {numbers:?}");
    assert!(numbers.contains(&3), "missing 3rd harmonic in {numbers:?}");

    assert!(analysis.dual_horn.is_none());
}

#[test]
fn dual_horn_major_third() {
    // Two in-band tones a 5:4 ratio apart (~430.7 and ~538.3 Hz).
    let partials = [(80, 1.0), (100, 0.7)];
    let samples = synth_horn(&partials, 2.0, 0.5);

    let seg = locate_horn_segment(&samples, &SegmentConfig::default());
    let peaks = extract_peaks(
        &samples[seg.start..seg.end],
        SAMPLE_RATE,
        &SpectralConfig::default(),
    );
    let analysis = classify_peaks(&peaks, &ClassifyConfig::default()).unwrap();

    assert!((analysis.fundamental_hz - bin_hz(80)).abs() < 6.0);

    let dual = analysis.dual_horn.expect("second horn not detected");
    assert!((dual.freq_hz - bin_hz(100)).abs() < 6.0);
    assert!((dual.ratio - 1.25).abs() < 0.02);
    assert_eq!(dual.interval, ThirdKind::Major);
}

#[test]
fn silence_yields_no_peaks() {
    let samples = vec![0.0f32; 4 * SAMPLE_RATE as usize];
    let seg = locate_horn_segment(&samples, &SegmentConfig::default());
    assert!(seg.degenerate);

    let peaks = extract_peaks(
        &samples[seg.start..seg.end],
        SAMPLE_RATE,
        &SpectralConfig::default(),
    );
    assert!(classify_peaks(&peaks, &ClassifyConfig::default()).is_err());
}
