//! Horn segment location: find the loudest contiguous passage in a recording.
//!
//! Short-time RMS energy is computed over fixed-size frames, converted to
//! dBFS, and gated against a level threshold. The first contiguous run of
//! active frames, scaled by the hop size, becomes the returned sample range.
//! The locator is total: it always returns a valid `start <= end` range
//! within the signal bounds, falling back to the full signal (flagged as
//! degenerate) when nothing clears the gate.
//!
//! Frames are left-aligned at their hop offsets (no centering pad), so run
//! boundaries can sit up to `frame_len - hop` samples later than a
//! centered-frame analysis would place them.

use crate::common::amp_to_db;

#[derive(Clone, Debug)]
pub struct SegmentConfig {
    /// RMS analysis frame length in samples.
    pub frame_len: usize,
    /// Hop between frames in samples. Fixed, not sample-rate-relative.
    pub hop: usize,
    /// Frames above this level (dBFS) count as active.
    pub threshold_db: f32,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            frame_len: 2048,
            hop: 512,
            threshold_db: -20.0,
        }
    }
}

/// Sample-index range `[start, end)` of the detected horn blast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HornSegment {
    pub start: usize,
    pub end: usize,
    /// True when no frame cleared the threshold and the full signal was
    /// returned. Downstream consumers should treat this as lower-confidence.
    pub degenerate: bool,
}

impl HornSegment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Locate the loudest contiguous passage of `samples`.
pub fn locate_horn_segment(samples: &[f32], cfg: &SegmentConfig) -> HornSegment {
    if samples.is_empty() {
        return HornSegment {
            start: 0,
            end: 0,
            degenerate: true,
        };
    }

    let hop = cfg.hop.max(1);
    let rms_db = frame_rms_db(samples, cfg.frame_len.max(1), hop);
    let active: Vec<bool> = rms_db.iter().map(|&db| db > cfg.threshold_db).collect();

    if !active.iter().any(|&a| a) {
        return HornSegment {
            start: 0,
            end: samples.len(),
            degenerate: true,
        };
    }

    let n_frames = active.len();
    // Rising/falling transitions of the active mask. A rise at index i means
    // frame i+1 is the first active frame of a run; the run is reported from
    // frame i so the attack is not clipped.
    let mut starts: Vec<usize> = Vec::new();
    let mut ends: Vec<usize> = Vec::new();
    for i in 0..n_frames.saturating_sub(1) {
        if !active[i] && active[i + 1] {
            starts.push(i);
        }
        if active[i] && !active[i + 1] {
            ends.push(i);
        }
    }

    // Runs touching the signal boundaries have no observed transition.
    if starts.is_empty() {
        starts.push(0);
    }
    if ends.is_empty() {
        ends.push(n_frames - 1);
    }
    if ends[0] < starts[0] {
        starts.insert(0, 0);
    }
    if *starts.last().unwrap() > *ends.last().unwrap() {
        ends.push(n_frames - 1);
    }

    let start = (starts[0] * hop).min(samples.len());
    let end = (ends[0] * hop).min(samples.len());

    HornSegment {
        start,
        end: end.max(start),
        degenerate: false,
    }
}

/// Short-time RMS per frame, in dBFS.
fn frame_rms_db(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len() / hop + 1);
    let mut start = 0usize;
    while start < samples.len() {
        let end = (start + frame_len).min(samples.len());
        let frame = &samples[start..end];
        let energy: f32 = frame.iter().map(|&s| s * s).sum();
        let rms = (energy / frame.len() as f32).sqrt();
        out.push(amp_to_db(rms));
        start += hop;
    }
    out
}
