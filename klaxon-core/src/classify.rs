//! Fundamental selection, harmonic detection and dual-horn classification.
//!
//! Input is the amplitude-sorted peak set from the spectral extractor. The
//! fundamental is the loudest peak inside the plausible car-horn band
//! (200–800 Hz); when nothing falls in-band the loudest peak overall is used
//! as a deliberate fallback. Harmonics are peaks at near-integer multiples of
//! the fundamental, and a second closely-related fundamental a musical third
//! away marks a dual-horn assembly. All scans respect the amplitude order of
//! the peak set: the classifier is greedy and first-match-wins by design.

use std::fmt;

use thiserror::Error;

use crate::note::{self, Pitch};
use crate::spectrum::SpectralPeak;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No clear peaks found")]
    NoPeaksFound,
}

#[derive(Clone, Debug)]
pub struct ClassifyConfig {
    /// Plausible fundamental band for car horns (Hz).
    pub band_lo_hz: f32,
    pub band_hi_hz: f32,
    /// Harmonic ratio acceptance range (exclusive bounds).
    pub harmonic_lo: f32,
    pub harmonic_hi: f32,
    /// Max distance of a harmonic ratio from its nearest integer.
    pub harmonic_tol: f32,
    /// Dual-horn interval ratio range (exclusive bounds), larger/smaller form.
    pub dual_lo: f32,
    pub dual_hi: f32,
    /// Ratios below this split classify as a minor third, at or above as
    /// major. Sits between the just minor (6/5) and major (5/4) thirds.
    pub third_split: f32,
    /// How many peaks to carry through for diagnostics/plotting.
    pub max_top_peaks: usize,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            band_lo_hz: 200.0,
            band_hi_hz: 800.0,
            harmonic_lo: 1.8,
            harmonic_hi: 6.2,
            harmonic_tol: 0.1,
            dual_lo: 1.15,
            dual_hi: 1.35,
            third_split: 1.22,
            max_top_peaks: 10,
        }
    }
}

/// A peak at a near-integer multiple of the fundamental.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Harmonic {
    pub freq_hz: f32,
    pub number: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThirdKind {
    Minor,
    Major,
}

impl fmt::Display for ThirdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThirdKind::Minor => write!(f, "minor third"),
            ThirdKind::Major => write!(f, "major third"),
        }
    }
}

/// A second fundamental a musical third from the first (chord horns).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualHorn {
    pub freq_hz: f32,
    pub interval: ThirdKind,
    /// The larger/smaller frequency ratio, always >= 1.
    pub ratio: f32,
}

/// Complete per-file analysis. Constructed once, never mutated.
#[derive(Clone, Debug)]
pub struct HornAnalysis {
    pub fundamental_hz: f32,
    /// `None` only if the fundamental is non-positive (cannot happen for
    /// peaks from a real spectrum; kept total anyway).
    pub fundamental_note: Option<Pitch>,
    /// Harmonics in peak-amplitude order (loudest first), not by number.
    pub harmonics: Vec<Harmonic>,
    pub dual_horn: Option<DualHorn>,
    /// Loudest peaks regardless of band, for diagnostics and plotting.
    pub top_peaks: Vec<SpectralPeak>,
}

/// Classify an amplitude-sorted peak set into a [`HornAnalysis`].
///
/// An empty peak set is the single reportable failure of a file's analysis.
pub fn classify_peaks(
    peaks: &[SpectralPeak],
    cfg: &ClassifyConfig,
) -> Result<HornAnalysis, AnalysisError> {
    if peaks.is_empty() {
        return Err(AnalysisError::NoPeaksFound);
    }

    let in_band: Vec<SpectralPeak> = peaks
        .iter()
        .filter(|p| p.freq_hz >= cfg.band_lo_hz && p.freq_hz <= cfg.band_hi_hz)
        .copied()
        .collect();

    // Loudest in-band peak; outside the band, fall back to the loudest peak
    // overall. The input is amplitude-sorted, so "first" is "loudest".
    let fundamental = in_band.first().map(|p| p.freq_hz).unwrap_or(peaks[0].freq_hz);

    let mut harmonics = Vec::new();
    for p in peaks {
        let ratio = p.freq_hz / fundamental;
        let nearest = ratio.round();
        if ratio > cfg.harmonic_lo && ratio < cfg.harmonic_hi && (ratio - nearest).abs() < cfg.harmonic_tol
        {
            harmonics.push(Harmonic {
                freq_hz: p.freq_hz,
                number: nearest as u32,
            });
        }
    }

    // First in-band peak (amplitude order) a musical third away wins; no
    // search for a better match.
    let mut dual_horn = None;
    for p in &in_band {
        if p.freq_hz == fundamental {
            continue;
        }
        let ratio = if p.freq_hz > fundamental {
            p.freq_hz / fundamental
        } else {
            fundamental / p.freq_hz
        };
        if ratio > cfg.dual_lo && ratio < cfg.dual_hi {
            let interval = if ratio < cfg.third_split {
                ThirdKind::Minor
            } else {
                ThirdKind::Major
            };
            dual_horn = Some(DualHorn {
                freq_hz: p.freq_hz,
                interval,
                ratio,
            });
            break;
        }
    }

    Ok(HornAnalysis {
        fundamental_hz: fundamental,
        fundamental_note: note::pitch_for(fundamental),
        harmonics,
        dual_horn,
        top_peaks: peaks.iter().take(cfg.max_top_peaks).copied().collect(),
    })
}
