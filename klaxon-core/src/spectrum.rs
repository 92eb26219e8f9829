//! Time-averaged magnitude spectrum and spectral peak picking.
//!
//! The segment is analyzed with a Hann-windowed STFT (`realfft`), magnitudes
//! are averaged across all time frames per bin and converted to dB, and
//! salient peaks are detected with three gates applied in order:
//!
//! 1. absolute amplitude ≥ `min_height_db`,
//! 2. minimum separation of `min_distance_bins` (louder peaks win),
//! 3. topographic prominence ≥ `min_prominence_db`, measured against the
//!    surrounding local minima (lowest-contour-line bases).
//!
//! Peaks are returned sorted by descending amplitude. An empty peak set is a
//! legitimate outcome (short or noisy segments), not a failure; the
//! classifier reports it as an analysis error.

use realfft::RealFftPlanner;

#[derive(Clone, Debug)]
pub struct SpectralConfig {
    /// FFT window size in samples.
    pub n_fft: usize,
    /// Hop between STFT frames in samples (fixed, independent of `n_fft`).
    pub hop: usize,
    /// Minimum absolute peak amplitude (dB).
    pub min_height_db: f32,
    /// Minimum separation between reported peaks, in frequency bins.
    pub min_distance_bins: usize,
    /// Minimum peak prominence (dB) over the surrounding local minimum.
    pub min_prominence_db: f32,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            n_fft: 4096,
            hop: 512,
            min_height_db: -40.0,
            min_distance_bins: 20,
            min_prominence_db: 10.0,
        }
    }
}

/// One detected spectral peak. Frequencies lie within [0, sample_rate/2].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectralPeak {
    pub freq_hz: f32,
    pub amplitude_db: f32,
}

/// Magnitude spectrum averaged over time, in dB, with its frequency axis.
#[derive(Clone, Debug)]
pub struct AveragedSpectrum {
    /// Frequency per bin (Hz), length `n_fft/2 + 1`.
    pub freqs_hz: Vec<f32>,
    /// Time-averaged magnitude per bin (dB).
    pub mag_db: Vec<f32>,
}

/// Convenience wrapper: averaged spectrum, then peak picking.
pub fn extract_peaks(samples: &[f32], sample_rate: u32, cfg: &SpectralConfig) -> Vec<SpectralPeak> {
    let spec = average_spectrum(samples, sample_rate, cfg);
    find_spectral_peaks(&spec, cfg)
}

/// Compute the time-averaged magnitude spectrum of `samples` in dB.
///
/// Segments shorter than one window are zero-padded to a single frame, so
/// every non-empty signal yields a spectrum.
pub fn average_spectrum(samples: &[f32], sample_rate: u32, cfg: &SpectralConfig) -> AveragedSpectrum {
    let n = cfg.n_fft.max(8);
    let hop = cfg.hop.max(1);
    let n_bins = n / 2 + 1;
    let sr = sample_rate as f32;

    let freqs_hz: Vec<f32> = (0..n_bins).map(|k| k as f32 * sr / n as f32).collect();

    if samples.is_empty() || sample_rate == 0 {
        return AveragedSpectrum {
            freqs_hz,
            mag_db: vec![crate::common::amp_to_db(0.0); n_bins],
        };
    }

    let hann: Vec<f32> = (0..n)
        .map(|i| 0.5 - 0.5 * ((2.0 * std::f32::consts::PI * i as f32) / (n as f32 - 1.0)).cos())
        .collect();

    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(n);
    let mut in_buf = r2c.make_input_vec();
    let mut spec_buf = r2c.make_output_vec();

    let mut acc = vec![0.0f32; n_bins];
    let mut n_frames = 0usize;

    if samples.len() < n {
        // Too short for one full window: analyze a single zero-padded frame.
        for (j, slot) in in_buf.iter_mut().enumerate() {
            *slot = samples.get(j).copied().unwrap_or(0.0) * hann[j];
        }
        if r2c.process(&mut in_buf, &mut spec_buf).is_ok() {
            for (k, c) in spec_buf.iter().enumerate() {
                acc[k] += c.norm();
            }
            n_frames = 1;
        }
    } else {
        let mut i = 0usize;
        while i + n <= samples.len() {
            for j in 0..n {
                in_buf[j] = samples[i + j] * hann[j];
            }
            if r2c.process(&mut in_buf, &mut spec_buf).is_err() {
                break;
            }
            for (k, c) in spec_buf.iter().enumerate() {
                acc[k] += c.norm();
            }
            n_frames += 1;
            i += hop;
        }
    }

    let mut mag_db: Vec<f32> = acc
        .iter()
        .map(|&a| crate::common::amp_to_db(a / n_frames.max(1) as f32))
        .collect();

    // Clamp the dynamic range to 80 dB below the loudest bin; sub-floor
    // detail (window sidelobes, numeric noise) must not form peaks.
    let top = mag_db.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    if top.is_finite() {
        let floor = top - 80.0;
        for v in &mut mag_db {
            if *v < floor {
                *v = floor;
            }
        }
    }

    AveragedSpectrum { freqs_hz, mag_db }
}

/// Detect qualifying peaks in an averaged spectrum, sorted loudest-first.
pub fn find_spectral_peaks(spec: &AveragedSpectrum, cfg: &SpectralConfig) -> Vec<SpectralPeak> {
    let x = &spec.mag_db;
    let mut bins = local_maxima(x);

    bins.retain(|&k| x[k] >= cfg.min_height_db);
    let bins = select_by_distance(x, bins, cfg.min_distance_bins);
    let mut peaks: Vec<SpectralPeak> = bins
        .into_iter()
        .filter(|&k| prominence(x, k) >= cfg.min_prominence_db)
        .map(|k| SpectralPeak {
            freq_hz: spec.freqs_hz[k],
            amplitude_db: x[k],
        })
        .collect();

    peaks.sort_by(|a, b| b.amplitude_db.partial_cmp(&a.amplitude_db).unwrap());
    peaks
}

/// Interior local maxima with plateau handling: a flat run higher than both
/// neighbors reports its midpoint.
fn local_maxima(x: &[f32]) -> Vec<usize> {
    let mut out = Vec::new();
    if x.len() < 3 {
        return out;
    }
    let mut i = 1usize;
    let i_max = x.len() - 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            // Walk over any plateau of equal values.
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                out.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    out
}

/// Keep peaks at least `distance` bins apart, louder peaks taking priority.
fn select_by_distance(x: &[f32], bins: Vec<usize>, distance: usize) -> Vec<usize> {
    if distance <= 1 || bins.len() < 2 {
        return bins;
    }
    let mut order: Vec<usize> = (0..bins.len()).collect();
    order.sort_by(|&a, &b| x[bins[b]].partial_cmp(&x[bins[a]]).unwrap());

    let mut keep = vec![true; bins.len()];
    for &idx in &order {
        if !keep[idx] {
            continue;
        }
        // Suppress weaker neighbors within the exclusion distance.
        let mut j = idx;
        while j > 0 && bins[idx] - bins[j - 1] < distance {
            j -= 1;
            keep[j] = false;
        }
        let mut j = idx;
        while j + 1 < bins.len() && bins[j + 1] - bins[idx] < distance {
            j += 1;
            keep[j] = false;
        }
    }
    bins.into_iter()
        .zip(keep)
        .filter_map(|(b, k)| k.then_some(b))
        .collect()
}

/// Topographic prominence of the peak at bin `k`: height above the higher of
/// the two lowest contour points reached before a taller sample on each side.
fn prominence(x: &[f32], k: usize) -> f32 {
    let h = x[k];

    let mut left_min = h;
    let mut i = k;
    while i > 0 {
        i -= 1;
        if x[i] > h {
            break;
        }
        if x[i] < left_min {
            left_min = x[i];
        }
    }

    let mut right_min = h;
    let mut i = k;
    while i + 1 < x.len() {
        i += 1;
        if x[i] > h {
            break;
        }
        if x[i] < right_min {
            right_min = x[i];
        }
    }

    h - left_min.max(right_min)
}
