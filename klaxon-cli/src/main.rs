mod audio;
mod catalog;
#[cfg(feature = "visualise")]
mod plot;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;

use klaxon_core::classify::{classify_peaks, ClassifyConfig};
use klaxon_core::dissonance::benchmark_chords;
use klaxon_core::sampler::{run_monte_carlo, SamplerConfig};
use klaxon_core::segment::{locate_horn_segment, SegmentConfig};
use klaxon_core::spectrum::{extract_peaks, SpectralConfig};

use report::FileReport;

#[derive(Parser, Debug)]
#[command(name = "klaxon", about = "Car horn pitch and consonance analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a horn recording, or every recording in a directory
    Analyze {
        /// Audio file or directory of audio files
        input: PathBuf,

        /// CSV file for the per-recording results
        #[arg(short, long, default_value = "horn_analysis.csv")]
        output: PathBuf,

        /// Save a waveform/spectrum plot next to each input file
        #[arg(long)]
        plot: bool,
    },
    /// Monte Carlo dissonance analysis over a population of fundamentals
    Dissonance {
        /// CSV with a `fundamental_hz` column (or one frequency per line)
        csv: PathBuf,

        /// Number of random three-horn chords to draw
        #[arg(long, default_value_t = 10_000)]
        samples: usize,

        /// RNG seed for a reproducible draw
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Save a histogram of the score distribution
        #[arg(long)]
        plot: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match Cli::parse().command {
        Command::Analyze {
            input,
            output,
            plot,
        } => run_analyze(&input, &output, plot),
        Command::Dissonance {
            csv,
            samples,
            seed,
            plot,
        } => run_dissonance(&csv, samples, seed, plot),
    }
}

const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "m4a", "aac"];

fn run_analyze(input: &Path, output: &Path, plot: bool) -> Result<()> {
    let files = if input.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(input)
            .with_context(|| format!("reading directory {}", input.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            })
            .collect();
        files.sort();
        files
    } else {
        vec![input.to_path_buf()]
    };
    if files.is_empty() {
        anyhow::bail!("no audio files found in {}", input.display());
    }
    log::info!("Analyzing {} file(s)", files.len());

    let mut reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| analyze_file(path, plot))
        .collect::<Result<_>>()?;
    reports.sort_by(|a, b| a.filename.cmp(&b.filename));

    for r in &reports {
        print_report(r);
    }
    if let Some(summary) = report::summarize_by_group(&reports) {
        print_batch_summary(&summary);
    }
    report::write_results_csv(output, &reports)
        .with_context(|| format!("writing {}", output.display()))?;
    log::info!("Results written to {}", output.display());

    let failed = reports.iter().filter(|r| r.outcome.is_err()).count();
    if failed > 0 {
        log::warn!("{failed}/{} file(s) had no usable peaks", reports.len());
    }
    Ok(())
}

fn analyze_file(path: &Path, plot: bool) -> Result<FileReport> {
    let decoded = audio::decode_to_mono(path)?;

    let seg = locate_horn_segment(&decoded.samples, &SegmentConfig::default());
    if seg.degenerate {
        log::warn!(
            "{}: no sustained loud section, analyzing the whole signal",
            path.display()
        );
    }
    let horn = &decoded.samples[seg.start..seg.end];

    let spec_cfg = SpectralConfig::default();
    let peaks = extract_peaks(horn, decoded.sample_rate, &spec_cfg);
    let outcome = classify_peaks(&peaks, &ClassifyConfig::default());

    if plot {
        #[cfg(feature = "visualise")]
        if let Ok(analysis) = &outcome {
            let spectrum = klaxon_core::spectrum::average_spectrum(
                horn,
                decoded.sample_rate,
                &spec_cfg,
            );
            let out = path.with_extension("png");
            plot::plot_analysis(&out, horn, decoded.sample_rate, &spectrum, analysis)?;
            log::info!("Plot saved to {}", out.display());
        }
        #[cfg(not(feature = "visualise"))]
        log::warn!("built without the `visualise` feature; --plot ignored");
    }

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let vehicle = catalog::vehicle_from_filename(path);
    Ok(FileReport {
        filename,
        vehicle,
        outcome,
        degenerate_segment: seg.degenerate,
    })
}

fn print_report(r: &FileReport) {
    if r.degenerate_segment {
        println!("== {} (whole-signal fallback) ==", r.filename);
    } else {
        println!("== {} ==", r.filename);
    }
    if let Some(v) = &r.vehicle {
        println!(
            "Vehicle: {} {} ({}, {})",
            v.make,
            v.model,
            v.country.unwrap_or("unknown origin"),
            v.segment
        );
    }
    match &r.outcome {
        Ok(a) => {
            let note = a
                .fundamental_note
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".into());
            println!("Fundamental: {:.1} Hz -> {}", a.fundamental_hz, note);
            for h in &a.harmonics {
                println!("  Harmonic {}: {:.1} Hz", h.number, h.freq_hz);
            }
            match &a.dual_horn {
                Some(d) => println!(
                    "Dual horn: {:.1} Hz ({}, ratio {:.3})",
                    d.freq_hz, d.interval, d.ratio
                ),
                None => println!("Dual horn: not detected"),
            }
        }
        Err(e) => println!("Analysis failed: {e}"),
    }
    println!();
}

fn print_batch_summary(s: &report::BatchSummary) {
    println!("== Summary ==");
    println!("Analyzed {}/{} file(s)", s.analyzed, s.total);
    println!("Frequency range: {:.0} - {:.0} Hz", s.freq_lo, s.freq_hi);
    println!(
        "Mean {:.0} Hz | Median {:.0} Hz | Std dev {:.0} Hz",
        s.mean, s.median, s.std_dev
    );

    let sections = [
        ("By manufacturer", &s.by_make),
        ("By country of origin", &s.by_country),
        ("By segment", &s.by_segment),
        ("Luxury vs mass market", &s.by_luxury),
    ];
    for (title, groups) in sections {
        if groups.is_empty() {
            continue;
        }
        println!("\n== {title} ==");
        for g in groups.iter() {
            println!(
                "{:<16} mean {:.0} Hz | std {:.0} | n={}",
                g.label, g.mean, g.std_dev, g.count
            );
        }
    }

    if let Some((vehicle, hz)) = &s.lowest {
        println!("\nLowest pitch: {vehicle} at {hz:.0} Hz");
    }
    if let Some((vehicle, hz)) = &s.highest {
        println!("Highest pitch: {vehicle} at {hz:.0} Hz");
    }
    println!();
}

fn run_dissonance(csv: &Path, samples: usize, seed: u64, plot: bool) -> Result<()> {
    let population = report::read_population(csv)?;
    log::info!(
        "Population: {} fundamentals from {}",
        population.frequencies.len(),
        csv.display()
    );

    let cfg = SamplerConfig {
        n_samples: samples,
        seed,
    };
    let scores = run_monte_carlo(&population.frequencies, &cfg)?;

    let benchmarks = benchmark_chords();
    println!("== Benchmark chords ==");
    for b in &benchmarks {
        println!(
            "{:<22} [{:.1}, {:.1}, {:.1}] Hz -> {:.4}",
            b.name, b.frequencies[0], b.frequencies[1], b.frequencies[2], b.dissonance
        );
    }

    let summary = report::summarize_distribution(&scores, &benchmarks);
    println!(
        "\n== Random trios ({} draws, seed {}) ==",
        scores.len(),
        seed
    );
    println!(
        "Mean {:.4} | Median {:.4} | Std dev {:.4}",
        summary.mean, summary.median, summary.std_dev
    );
    for (label, pct) in &summary.bands {
        println!("{label}: {pct:.1}%");
    }

    if !population.labeled.is_empty() {
        let pairings = report::make_pairings(&population.labeled);
        if !pairings.is_empty() {
            println!("\n== Manufacturer pairings (worst first) ==");
            for p in &pairings {
                println!(
                    "{} ({:.1} Hz) + {} ({:.1} Hz) -> {:.4}",
                    p.make1, p.freq1, p.make2, p.freq2, p.dissonance
                );
            }
        }
    }

    if plot {
        #[cfg(feature = "visualise")]
        {
            let out = csv.with_extension("png");
            plot::plot_histogram(&out, &scores, &benchmarks)?;
            log::info!("Histogram saved to {}", out.display());
        }
        #[cfg(not(feature = "visualise"))]
        log::warn!("built without the `visualise` feature; --plot ignored");
    }
    Ok(())
}
