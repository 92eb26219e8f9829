//! Perceptual dissonance scoring with the Sethares parameterization of the
//! Plomp–Levelt roughness curve.
//!
//! Roughness between two pure tones peaks when they sit about a quarter of a
//! critical bandwidth apart and vanishes both at unison and at wide
//! separations:
//!
//! ```text
//! s = D* / (S1·f_low + S2)
//! x = s · (f_high − f_low)
//! d = C1·exp(A1·x) + C2·exp(A2·x)
//! ```
//!
//! The raw curve dips marginally below zero far past the roughness peak; the
//! score is floored at zero rather than "fixing" the formula.
//!
//! References:
//! - Plomp & Levelt, "Tonal Consonance and Critical Bandwidth" (1965).
//! - Sethares, "Tuning, Timbre, Spectrum, Scale" (1998).

/// Critical bandwidth scaling.
const D_STAR: f32 = 0.24;
/// Critical bandwidth coefficients.
const S1: f32 = 0.0207;
const S2: f32 = 18.96;
/// Exponential decay rates.
const A1: f32 = -3.51;
const A2: f32 = -5.75;
/// Amplitude coefficients.
const C1: f32 = 5.0;
const C2: f32 = -5.0;

/// Dissonance between two pure tones. Order-independent and non-negative;
/// exactly zero at unison.
pub fn pairwise_dissonance(f1: f32, f2: f32) -> f32 {
    let (lo, hi) = if f1 <= f2 { (f1, f2) } else { (f2, f1) };

    let s = D_STAR / (S1 * lo + S2);
    let x = s * (hi - lo);
    let d = C1 * (A1 * x).exp() + C2 * (A2 * x).exp();

    d.max(0.0)
}

/// Total dissonance of a chord: sum over all unordered pairs.
pub fn chord_dissonance(frequencies: &[f32]) -> f32 {
    let mut total = 0.0;
    for (i, &a) in frequencies.iter().enumerate() {
        for &b in &frequencies[i + 1..] {
            total += pairwise_dissonance(a, b);
        }
    }
    total
}

/// A named reference chord and its dissonance, used as a comparison scale.
#[derive(Clone, Copy, Debug)]
pub struct ChordBenchmark {
    pub name: &'static str,
    pub frequencies: [f32; 3],
    pub dissonance: f32,
}

/// Reference chords anchored at A4 = 440 Hz using just-intonation ratios
/// (major third 5/4, minor third 6/5, perfect fifth 3/2, tritone 45/32),
/// plus a literal semitone cluster and a well-spaced octave case.
pub fn benchmark_chords() -> Vec<ChordBenchmark> {
    const BASE: f32 = 440.0;
    const MAJOR_THIRD: f32 = 5.0 / 4.0;
    const MINOR_THIRD: f32 = 6.0 / 5.0;
    const PERFECT_FIFTH: f32 = 3.0 / 2.0;
    const TRITONE: f32 = 45.0 / 32.0;

    let chords: [(&'static str, [f32; 3]); 5] = [
        (
            "Major triad (A-C#-E)",
            [BASE, BASE * MAJOR_THIRD, BASE * PERFECT_FIFTH],
        ),
        (
            "Minor triad (A-C-E)",
            [BASE, BASE * MINOR_THIRD, BASE * PERFECT_FIFTH],
        ),
        (
            "Diminished (A-C-Eb)",
            [BASE, BASE * MINOR_THIRD, BASE * TRITONE],
        ),
        ("Semitone cluster", [440.0, 466.0, 494.0]),
        ("Octave spread", [220.0, 440.0, 660.0]),
    ];

    chords
        .iter()
        .map(|&(name, frequencies)| ChordBenchmark {
            name,
            frequencies,
            dissonance: chord_dissonance(&frequencies),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetry() {
        for (f1, f2) in [(440.0, 466.0), (200.0, 800.0), (393.0, 415.0), (100.0, 101.0)] {
            assert_eq!(pairwise_dissonance(f1, f2), pairwise_dissonance(f2, f1));
        }
    }

    #[test]
    fn self_consonance_is_exactly_zero() {
        for f in [55.0, 220.0, 440.0, 493.88, 1000.0] {
            assert_eq!(pairwise_dissonance(f, f), 0.0);
        }
    }

    #[test]
    fn never_negative() {
        // Wide separations push the raw curve slightly negative; the floor
        // must hold everywhere.
        let mut f = 20.0f32;
        while f < 4000.0 {
            let d = pairwise_dissonance(440.0, f);
            assert!(d >= 0.0, "d({f}) = {d}");
            f += 7.3;
        }
        assert!(chord_dissonance(&[100.0, 1700.0, 3900.0]) >= 0.0);
    }

    #[test]
    fn roughness_peaks_near_unison_not_at_it() {
        let near = pairwise_dissonance(440.0, 460.0);
        let unison = pairwise_dissonance(440.0, 440.0);
        let far = pairwise_dissonance(440.0, 1320.0);
        assert!(near > unison);
        assert!(near > far);
    }

    #[test]
    fn chord_sums_all_pairs() {
        let f = [400.0, 500.0, 620.0];
        let expected = pairwise_dissonance(f[0], f[1])
            + pairwise_dissonance(f[0], f[2])
            + pairwise_dissonance(f[1], f[2]);
        assert!((chord_dissonance(&f) - expected).abs() < 1e-6);
        // Duplicates contribute zero.
        assert!((chord_dissonance(&[440.0, 440.0, 500.0])
            - pairwise_dissonance(440.0, 500.0) * 2.0)
            .abs()
            < 1e-6);
    }

    #[test]
    fn chord_edge_sizes() {
        assert_eq!(chord_dissonance(&[]), 0.0);
        assert_eq!(chord_dissonance(&[440.0]), 0.0);
        assert!(chord_dissonance(&[440.0, 466.0, 494.0, 523.0]) > 0.0);
    }

    #[test]
    fn benchmarks_rank_as_expected() {
        let b = benchmark_chords();
        let get = |name: &str| b.iter().find(|c| c.name == name).unwrap().dissonance;
        let major = get("Major triad (A-C#-E)");
        let minor = get("Minor triad (A-C-E)");
        let dim = get("Diminished (A-C-Eb)");
        let cluster = get("Semitone cluster");
        let octave = get("Octave spread");

        assert!(octave < major);
        assert!(major < minor);
        assert!(minor < dim);
        assert!(dim < cluster);
    }
}
