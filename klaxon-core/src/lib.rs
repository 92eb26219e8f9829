//! Core analysis library for car-horn recordings.
//!
//! The pipeline turns raw mono samples into a structured per-file result:
//!
//! 1. [`segment`]: isolate the loudest contiguous passage (the horn blast).
//! 2. [`spectrum`]: time-averaged magnitude spectrum and peak picking.
//! 3. [`classify`]: fundamental selection, harmonic and dual-horn detection.
//! 4. [`note`]: map a frequency to a pitch name and cents (A4 = 440 Hz).
//!
//! Separately, [`dissonance`] scores the perceptual roughness of frequency
//! combinations (Sethares/Plomp–Levelt kernel) and [`sampler`] draws random
//! three-horn chords from a population to build a dissonance distribution.
//!
//! Every step is a pure computation over immutable inputs: no I/O, no global
//! state. Decoding, batch orchestration, CSV export and plotting live in the
//! CLI crate.

pub mod classify;
pub mod common;
pub mod dissonance;
pub mod note;
pub mod sampler;
pub mod segment;
pub mod spectrum;
