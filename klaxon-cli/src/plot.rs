//! Plot rendering for the `visualise` feature: per-recording waveform and
//! spectrum views, plus the Monte Carlo score histogram.

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use klaxon_core::classify::HornAnalysis;
use klaxon_core::dissonance::ChordBenchmark;
use klaxon_core::spectrum::AveragedSpectrum;

const SPECTRUM_X_LIMIT_HZ: f32 = 2000.0;

/// Waveform plus averaged spectrum with the detected fundamental and dual
/// horn marked.
pub fn plot_analysis(
    out: &Path,
    samples: &[f32],
    sample_rate: u32,
    spectrum: &AveragedSpectrum,
    analysis: &HornAnalysis,
) -> Result<()> {
    let root = BitMapBackend::new(out, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let (top, bottom) = root.split_vertically(450);

    // -- waveform --
    let duration_s = samples.len() as f32 / sample_rate as f32;
    let peak = samples.iter().fold(0.0f32, |m, &s| m.max(s.abs())).max(1e-3);
    let mut chart = ChartBuilder::on(&top)
        .caption("Horn segment", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f32..duration_s.max(1e-3), -peak..peak)?;
    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Amplitude")
        .draw()?;
    chart.draw_series(LineSeries::new(
        samples
            .iter()
            .enumerate()
            .map(|(i, &s)| (i as f32 / sample_rate as f32, s)),
        &BLUE,
    ))?;

    // -- averaged spectrum --
    let in_range = spectrum
        .freqs_hz
        .iter()
        .zip(&spectrum.mag_db)
        .take_while(|(&f, _)| f <= SPECTRUM_X_LIMIT_HZ);
    let (mut db_min, mut db_max) = (0.0f32, -200.0f32);
    for (_, &db) in in_range.clone() {
        db_min = db_min.min(db);
        db_max = db_max.max(db);
    }
    let mut chart = ChartBuilder::on(&bottom)
        .caption("Averaged spectrum", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f32..SPECTRUM_X_LIMIT_HZ, db_min..db_max + 5.0)?;
    chart
        .configure_mesh()
        .x_desc("Frequency (Hz)")
        .y_desc("Magnitude (dB)")
        .draw()?;
    chart.draw_series(LineSeries::new(
        in_range.map(|(&f, &db)| (f, db)),
        &BLUE,
    ))?;

    let f0 = analysis.fundamental_hz;
    chart
        .draw_series(LineSeries::new([(f0, db_min), (f0, db_max + 5.0)], &RED))?
        .label(format!("Fundamental {f0:.1} Hz"))
        .legend(|(x, y)| PathElement::new([(x, y), (x + 20, y)], RED));
    if let Some(d) = &analysis.dual_horn {
        let hz = d.freq_hz;
        chart
            .draw_series(LineSeries::new([(hz, db_min), (hz, db_max + 5.0)], &GREEN))?
            .label(format!("Dual horn {hz:.1} Hz"))
            .legend(|(x, y)| PathElement::new([(x, y), (x + 20, y)], GREEN));
    }
    chart.configure_series_labels().border_style(BLACK).draw()?;

    root.present()?;
    Ok(())
}

const HISTOGRAM_BINS: usize = 50;

/// Histogram of Monte Carlo dissonance scores with the benchmark chords
/// marked as vertical lines.
pub fn plot_histogram(out: &Path, scores: &[f32], benchmarks: &[ChordBenchmark]) -> Result<()> {
    let max_score = scores
        .iter()
        .chain(benchmarks.iter().map(|b| &b.dissonance))
        .fold(0.0f32, |m, &s| m.max(s))
        .max(1e-3);
    let bin_width = max_score / HISTOGRAM_BINS as f32;
    let mut counts = vec![0u32; HISTOGRAM_BINS];
    for &s in scores {
        let bin = ((s / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }
    let max_count = counts.iter().copied().max().unwrap_or(1).max(1);

    let root = BitMapBackend::new(out, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Dissonance of {} random horn trios", scores.len()),
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f32..max_score, 0u32..max_count + max_count / 10 + 1)?;
    chart
        .configure_mesh()
        .x_desc("Dissonance")
        .y_desc("Trios")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &c)| {
        let x0 = i as f32 * bin_width;
        Rectangle::new([(x0, 0), (x0 + bin_width, c)], BLUE.mix(0.5).filled())
    }))?;

    let palette = [RED, GREEN, MAGENTA, CYAN, BLACK];
    for (b, color) in benchmarks.iter().zip(palette.iter().cycle()) {
        let color = *color;
        chart
            .draw_series(LineSeries::new(
                [(b.dissonance, 0), (b.dissonance, max_count)],
                &color,
            ))?
            .label(format!("{} ({:.3})", b.name, b.dissonance))
            .legend(move |(x, y)| PathElement::new([(x, y), (x + 20, y)], color));
    }
    chart.configure_series_labels().border_style(BLACK).draw()?;

    root.present()?;
    Ok(())
}
