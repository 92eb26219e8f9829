//! Frequency to musical pitch mapping (A4 = 440 Hz equal temperament).

use std::fmt;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Nearest equal-temperament pitch plus the signed cents deviation from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pitch {
    pub name: &'static str,
    pub octave: i32,
    /// Deviation from the named pitch, truncated toward zero.
    pub cents: i32,
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} ({:+} cents)", self.name, self.octave, self.cents)
    }
}

/// Map a frequency to the nearest pitch. Returns `None` for `freq_hz <= 0`
/// (displayed as "N/A" by callers); never panics.
pub fn pitch_for(freq_hz: f32) -> Option<Pitch> {
    if freq_hz <= 0.0 || !freq_hz.is_finite() {
        return None;
    }
    let semitones = 12.0 * (freq_hz as f64 / 440.0).log2();
    let nearest = semitones.round() as i64;

    let name = NOTE_NAMES[(nearest + 9).rem_euclid(12) as usize];
    let octave = 4 + (nearest + 3).div_euclid(12) as i32;
    let cents = ((semitones - nearest as f64) * 100.0) as i32;

    Some(Pitch { name, octave, cents })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a440_is_a4_exact() {
        let p = pitch_for(440.0).unwrap();
        assert_eq!(p.name, "A");
        assert_eq!(p.octave, 4);
        assert_eq!(p.cents, 0);
        assert_eq!(p.to_string(), "A4 (+0 cents)");
    }

    #[test]
    fn octave_doubling() {
        assert_eq!(pitch_for(880.0).unwrap(), Pitch { name: "A", octave: 5, cents: 0 });
        assert_eq!(pitch_for(220.0).unwrap(), Pitch { name: "A", octave: 3, cents: 0 });
    }

    #[test]
    fn sharp_and_flat_deviations_keep_sign() {
        // 440 * 2^(30/1200) ≈ 447.69 Hz: 30 cents sharp of A4.
        let p = pitch_for(447.69).unwrap();
        assert_eq!(p.name, "A");
        assert_eq!(p.cents, 29); // truncation toward zero, not rounding
        // 25 cents flat of A4.
        let p = pitch_for(433.68).unwrap();
        assert_eq!(p.name, "A");
        assert!(p.cents <= -24 && p.cents >= -25);
    }

    #[test]
    fn nearby_pitch_classes() {
        assert_eq!(pitch_for(466.16).unwrap().name, "A#");
        assert_eq!(pitch_for(392.0).unwrap().name, "G");
        assert_eq!(pitch_for(261.63).unwrap().name, "C");
    }

    #[test]
    fn non_positive_frequency_is_not_applicable() {
        assert_eq!(pitch_for(0.0), None);
        assert_eq!(pitch_for(-5.0), None);
        assert_eq!(pitch_for(f32::NAN), None);
    }
}
