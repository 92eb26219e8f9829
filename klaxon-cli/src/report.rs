//! Reporting layer: CSV export/import, dissonance distribution summary and
//! manufacturer pairings. Consumes core results; holds no analysis logic.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use klaxon_core::classify::{AnalysisError, HornAnalysis};
use klaxon_core::common::{mean, median, std_dev};
use klaxon_core::dissonance::{pairwise_dissonance, ChordBenchmark};

use crate::catalog::Vehicle;

/// Everything known about one analyzed file.
pub struct FileReport {
    pub filename: String,
    pub vehicle: Option<Vehicle>,
    pub outcome: Result<HornAnalysis, AnalysisError>,
    /// Segment locator fell back to the full signal (lower confidence).
    pub degenerate_segment: bool,
}

/// Write per-file analysis rows to a CSV file.
pub fn write_results_csv(path: impl AsRef<Path>, reports: &[FileReport]) -> std::io::Result<()> {
    let f = File::create(path)?;
    let mut w = BufWriter::new(f);
    writeln!(
        w,
        "filename,make,model,country,segment,fundamental_hz,fundamental_note,dual_horn_hz,dual_horn_interval,error"
    )?;
    for r in reports {
        let (make, model, country, segment) = match &r.vehicle {
            Some(v) => (
                v.make.as_str(),
                v.model.as_str(),
                v.country.unwrap_or(""),
                v.segment,
            ),
            None => ("", "", "", ""),
        };
        match &r.outcome {
            Ok(a) => {
                let note = a
                    .fundamental_note
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "N/A".into());
                let (dual_hz, dual_interval) = match &a.dual_horn {
                    Some(d) => (format!("{:.1}", d.freq_hz), d.interval.to_string()),
                    None => (String::new(), String::new()),
                };
                writeln!(
                    w,
                    "{},{},{},{},{},{:.1},{},{},{},",
                    r.filename, make, model, country, segment, a.fundamental_hz, note, dual_hz,
                    dual_interval
                )?;
            }
            Err(e) => {
                writeln!(
                    w,
                    "{},{},{},{},{},,,,,{}",
                    r.filename, make, model, country, segment, e
                )?;
            }
        }
    }
    Ok(())
}

/// Fundamental frequencies loaded for dissonance analysis, with the optional
/// make label used for pairing reports.
pub struct Population {
    pub frequencies: Vec<f32>,
    pub labeled: Vec<(String, f32)>,
}

/// Read a population of fundamentals from a CSV file.
///
/// Accepts either the analyzer's own export (columns located by header) or a
/// bare one-frequency-per-line file.
pub fn read_population(path: impl AsRef<Path>) -> Result<Population> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(f);

    let mut freq_col: Option<usize> = None;
    let mut make_col: Option<usize> = None;
    let mut frequencies = Vec::new();
    let mut labeled = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        if line_no == 0 {
            if let Some(idx) = fields.iter().position(|&h| h == "fundamental_hz") {
                freq_col = Some(idx);
                make_col = fields.iter().position(|&h| h == "make");
                continue; // header row
            }
        }

        let value = match freq_col {
            Some(idx) => fields.get(idx).and_then(|s| s.parse::<f32>().ok()),
            None => fields.first().and_then(|s| s.parse::<f32>().ok()),
        };
        // Rows without a frequency (analysis errors) are skipped.
        let Some(hz) = value else { continue };
        if hz <= 0.0 {
            continue;
        }
        frequencies.push(hz);
        if let Some(mk) = make_col.and_then(|idx| fields.get(idx)) {
            if !mk.is_empty() {
                labeled.push((mk.to_string(), hz));
            }
        }
    }

    if frequencies.is_empty() {
        return Err(anyhow!("no fundamentals found in {}", path.display()));
    }
    Ok(Population {
        frequencies,
        labeled,
    })
}

/// Descriptive statistics of one group of fundamentals.
pub struct GroupStats {
    pub label: String,
    pub mean: f32,
    pub std_dev: f32,
    pub count: usize,
}

/// Batch-level aggregation of per-file results along the catalog dimensions,
/// plus the overall distribution and the extreme-pitch vehicles.
pub struct BatchSummary {
    pub total: usize,
    pub analyzed: usize,
    pub freq_lo: f32,
    pub freq_hi: f32,
    pub mean: f32,
    pub median: f32,
    pub std_dev: f32,
    /// Sorted by ascending mean fundamental.
    pub by_make: Vec<GroupStats>,
    pub by_country: Vec<GroupStats>,
    /// Sorted by ascending mean fundamental.
    pub by_segment: Vec<GroupStats>,
    pub by_luxury: Vec<GroupStats>,
    /// (vehicle or filename, fundamental Hz).
    pub lowest: Option<(String, f32)>,
    pub highest: Option<(String, f32)>,
}

/// Aggregate successful analyses by make, country, segment and luxury flag.
/// Returns `None` when no file yielded a fundamental.
pub fn summarize_by_group(reports: &[FileReport]) -> Option<BatchSummary> {
    let mut freqs = Vec::new();
    let mut by_make: BTreeMap<String, Vec<f32>> = BTreeMap::new();
    let mut by_country: BTreeMap<String, Vec<f32>> = BTreeMap::new();
    let mut by_segment: BTreeMap<String, Vec<f32>> = BTreeMap::new();
    let mut by_luxury: BTreeMap<String, Vec<f32>> = BTreeMap::new();
    let mut lowest: Option<(String, f32)> = None;
    let mut highest: Option<(String, f32)> = None;

    for r in reports {
        let Ok(a) = &r.outcome else { continue };
        let hz = a.fundamental_hz;
        freqs.push(hz);

        let label = match &r.vehicle {
            Some(v) => format!("{} {}", v.make, v.model),
            None => r.filename.clone(),
        };
        if lowest.as_ref().map_or(true, |(_, f)| hz < *f) {
            lowest = Some((label.clone(), hz));
        }
        if highest.as_ref().map_or(true, |(_, f)| hz > *f) {
            highest = Some((label, hz));
        }

        if let Some(v) = &r.vehicle {
            by_make.entry(v.make.clone()).or_default().push(hz);
            if let Some(c) = v.country {
                by_country.entry(c.to_string()).or_default().push(hz);
            }
            by_segment.entry(v.segment.to_string()).or_default().push(hz);
            let tier = if v.is_luxury { "Luxury" } else { "Mass market" };
            by_luxury.entry(tier.to_string()).or_default().push(hz);
        }
    }
    if freqs.is_empty() {
        return None;
    }

    let freq_lo = freqs.iter().fold(f32::INFINITY, |m, &v| m.min(v));
    let freq_hi = freqs.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    let mut by_make = group_stats(by_make);
    by_make.sort_by(|a, b| a.mean.partial_cmp(&b.mean).unwrap());
    let mut by_segment = group_stats(by_segment);
    by_segment.sort_by(|a, b| a.mean.partial_cmp(&b.mean).unwrap());

    let mut sorted = freqs.clone();
    Some(BatchSummary {
        total: reports.len(),
        analyzed: freqs.len(),
        freq_lo,
        freq_hi,
        mean: mean(&freqs),
        median: median(&mut sorted),
        std_dev: std_dev(&freqs),
        by_make,
        by_country: group_stats(by_country),
        by_segment,
        by_luxury: group_stats(by_luxury),
        lowest,
        highest,
    })
}

fn group_stats(groups: BTreeMap<String, Vec<f32>>) -> Vec<GroupStats> {
    groups
        .into_iter()
        .map(|(label, v)| GroupStats {
            mean: mean(&v),
            std_dev: std_dev(&v),
            count: v.len(),
            label,
        })
        .collect()
}

/// Descriptive statistics of a dissonance score distribution, banded against
/// the benchmark chords.
pub struct DistributionSummary {
    pub mean: f32,
    pub median: f32,
    pub std_dev: f32,
    /// (band label, percent of scores).
    pub bands: Vec<(String, f32)>,
}

pub fn summarize_distribution(
    scores: &[f32],
    benchmarks: &[ChordBenchmark],
) -> DistributionSummary {
    let lookup = |name: &str| {
        benchmarks
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.dissonance)
            .unwrap_or(f32::INFINITY)
    };
    let major = lookup("Major triad (A-C#-E)");
    let minor = lookup("Minor triad (A-C-E)");
    let dim = lookup("Diminished (A-C-Eb)");
    let cluster = lookup("Semitone cluster");

    let pct = |pred: &dyn Fn(f32) -> bool| {
        if scores.is_empty() {
            0.0
        } else {
            100.0 * scores.iter().filter(|&&d| pred(d)).count() as f32 / scores.len() as f32
        }
    };

    let bands = vec![
        ("Consonant (<= major triad)".to_string(), pct(&|d| d <= major)),
        (
            "Mild (major to minor triad)".to_string(),
            pct(&|d| d > major && d <= minor),
        ),
        (
            "Moderate (minor to diminished)".to_string(),
            pct(&|d| d > minor && d <= dim),
        ),
        ("Dissonant (> diminished)".to_string(), pct(&|d| d > dim)),
        (
            "Terrible (> semitone cluster)".to_string(),
            pct(&|d| d > cluster),
        ),
    ];

    let mut sorted = scores.to_vec();
    DistributionSummary {
        mean: mean(scores),
        median: median(&mut sorted),
        std_dev: std_dev(scores),
        bands,
    }
}

/// One manufacturer pair scored by the dissonance of their mean fundamentals.
pub struct MakePairing {
    pub make1: String,
    pub make2: String,
    pub freq1: f32,
    pub freq2: f32,
    pub dissonance: f32,
}

/// All manufacturer pairings sorted worst-first (most dissonant mean
/// fundamentals). Needs at least two distinct makes.
pub fn make_pairings(labeled: &[(String, f32)]) -> Vec<MakePairing> {
    let mut by_make: BTreeMap<&str, Vec<f32>> = BTreeMap::new();
    for (mk, hz) in labeled {
        by_make.entry(mk.as_str()).or_default().push(*hz);
    }
    let means: Vec<(&str, f32)> = by_make.iter().map(|(mk, v)| (*mk, mean(v))).collect();

    let mut out = Vec::new();
    for i in 0..means.len() {
        for j in i + 1..means.len() {
            let (m1, f1) = means[i];
            let (m2, f2) = means[j];
            out.push(MakePairing {
                make1: m1.to_string(),
                make2: m2.to_string(),
                freq1: f1,
                freq2: f2,
                dissonance: pairwise_dissonance(f1, f2),
            });
        }
    }
    out.sort_by(|a, b| b.dissonance.partial_cmp(&a.dissonance).unwrap());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use klaxon_core::dissonance::benchmark_chords;
    use klaxon_core::note;

    fn analyzed(filename: &str, hz: f32) -> FileReport {
        FileReport {
            filename: filename.to_string(),
            vehicle: crate::catalog::vehicle_from_filename(filename),
            outcome: Ok(HornAnalysis {
                fundamental_hz: hz,
                fundamental_note: note::pitch_for(hz),
                harmonics: vec![],
                dual_horn: None,
                top_peaks: vec![],
            }),
            degenerate_segment: false,
        }
    }

    #[test]
    fn group_summary_aggregates_catalog_dimensions() {
        let reports = vec![
            analyzed("toyota_corolla_2021.wav", 400.0),
            analyzed("toyota_camry_2020.wav", 440.0),
            analyzed("bmw_x5_01.wav", 500.0),
            FileReport {
                filename: "broken.wav".to_string(),
                vehicle: None,
                outcome: Err(AnalysisError::NoPeaksFound),
                degenerate_segment: false,
            },
        ];
        let s = summarize_by_group(&reports).unwrap();

        assert_eq!((s.total, s.analyzed), (4, 3));
        assert_eq!((s.freq_lo, s.freq_hi), (400.0, 500.0));
        assert_eq!(s.median, 440.0);

        // Makes sorted by ascending mean fundamental.
        assert_eq!(s.by_make[0].label, "Toyota");
        assert_eq!(s.by_make[0].count, 2);
        assert_eq!(s.by_make[0].mean, 420.0);
        assert_eq!(s.by_make[1].label, "BMW");

        let japan = s.by_country.iter().find(|g| g.label == "Japan").unwrap();
        assert_eq!(japan.count, 2);
        let germany = s.by_country.iter().find(|g| g.label == "Germany").unwrap();
        assert_eq!(germany.mean, 500.0);

        // Segments ordered by mean: compact (400) < midsize (440) < luxury_suv.
        let labels: Vec<&str> = s.by_segment.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["compact", "midsize", "luxury_suv"]);

        let lux = s.by_luxury.iter().find(|g| g.label == "Luxury").unwrap();
        assert_eq!((lux.count, lux.mean), (1, 500.0));
        let mass = s.by_luxury.iter().find(|g| g.label == "Mass market").unwrap();
        assert_eq!(mass.count, 2);

        assert_eq!(s.lowest, Some(("Toyota Corolla".to_string(), 400.0)));
        assert_eq!(s.highest, Some(("BMW X5".to_string(), 500.0)));
    }

    #[test]
    fn group_summary_empty_without_successful_analyses() {
        assert!(summarize_by_group(&[]).is_none());
        let only_err = [FileReport {
            filename: "x.wav".to_string(),
            vehicle: None,
            outcome: Err(AnalysisError::NoPeaksFound),
            degenerate_segment: false,
        }];
        assert!(summarize_by_group(&only_err).is_none());
    }

    #[test]
    fn bands_cover_the_distribution() {
        let benches = benchmark_chords();
        // One score per band: well under major, just over major, over minor,
        // over diminished, over the cluster.
        let major = benches[0].dissonance;
        let minor = benches[1].dissonance;
        let dim = benches[2].dissonance;
        let cluster = benches[3].dissonance;
        let scores = [0.0, major + 0.01, minor + 0.01, dim + 0.01, cluster + 0.01];

        let s = summarize_distribution(&scores, &benches);
        assert_eq!(s.bands[0].1, 20.0); // consonant
        assert_eq!(s.bands[1].1, 20.0); // mild
        assert_eq!(s.bands[2].1, 20.0); // moderate
        assert_eq!(s.bands[3].1, 40.0); // dissonant includes terrible
        assert_eq!(s.bands[4].1, 20.0); // terrible
    }

    #[test]
    fn pairings_sorted_worst_first() {
        let labeled = vec![
            ("Toyota".to_string(), 420.0),
            ("Toyota".to_string(), 440.0),
            ("Honda".to_string(), 445.0),
            ("BMW".to_string(), 660.0),
        ];
        let pairs = make_pairings(&labeled);
        assert_eq!(pairs.len(), 3);
        // Toyota mean 430 vs Honda 445 is far rougher than either vs 660.
        assert_eq!(
            (pairs[0].make1.as_str(), pairs[0].make2.as_str()),
            ("Honda", "Toyota")
        );
        assert!(pairs[0].dissonance >= pairs[1].dissonance);
        assert!(pairs[1].dissonance >= pairs[2].dissonance);
    }

    #[test]
    fn summary_of_empty_scores_is_zeroed() {
        let s = summarize_distribution(&[], &benchmark_chords());
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.median, 0.0);
    }
}
