//! Console reporting
//!
//! Fixed-width text tables for every analysis result. Presentation only: all
//! numbers are computed elsewhere. Each writer takes any `io::Write` so the
//! binaries print to stdout and tests render into a buffer.

use std::io::{self, Write};

use chrono::{TimeZone, Utc};

use crate::pipeline::PipelineReport;
use crate::types::{
    Diagnostic, ElementMetrics, HealthReport, HourlyLoad, IntervalReport, LayeringBias,
    PeriodicityCandidate, SegmentStats, SignatureReport, UpgradeScenario,
};

const RULE_WIDTH: usize = 64;

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn diagnostics(out: &mut impl Write, diagnostics: &[Diagnostic]) -> io::Result<()> {
    for d in diagnostics {
        writeln!(out, "  {d}")?;
    }
    Ok(())
}

fn timestamp(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map_or_else(|| ms.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

fn periodicities(out: &mut impl Write, title: &str, label: &str, peaks: &[PeriodicityCandidate]) -> io::Result<()> {
    heading(out, title)?;
    if peaks.is_empty() {
        return writeln!(out, "  (none)");
    }
    writeln!(out, "  {:<4} {:>14} {:>14}", "#", "Period (min)", label)?;
    for (i, p) in peaks.iter().enumerate() {
        writeln!(out, "  {:<4} {:>14.1} {:>14.3}", i + 1, p.period_minutes, p.strength)?;
    }
    Ok(())
}

// ============================================================================
// Pipeline
// ============================================================================

pub fn write_pipeline(out: &mut impl Write, report: &PipelineReport) -> io::Result<()> {
    heading(out, "Series")?;
    writeln!(out, "  {:<22} {}", "Raw samples:", report.series.raw_samples)?;
    writeln!(out, "  {:<22} {}", "Resampled points:", report.series.samples)?;
    writeln!(out, "  {:<22} {} ms", "Interval:", report.series.interval_ms)?;
    writeln!(out, "  {:<22} {:.1} h", "Span:", report.series.span_minutes / 60.0)?;

    periodicities(out, "Spectral periodicities (FFT)", "Magnitude", &report.spectral)?;
    periodicities(out, "Autocorrelation periodicities", "r", &report.acf)?;

    heading(out, "Load groups")?;
    if report.groups.is_empty() {
        writeln!(out, "  (none)")?;
    } else {
        writeln!(
            out,
            "  {:<4} {:>10} {:>8} {:>12} {:>12} {:>8}",
            "#", "Step (W)", "Events", "On (samp)", "Period", "Duty"
        )?;
        for (i, g) in report.groups.iter().enumerate() {
            let duty = g
                .duty_cycle()
                .map_or_else(|| "-".to_string(), |d| format!("{:.0}%", d * 100.0));
            writeln!(
                out,
                "  {:<4} {:>10.0} {:>8} {:>12.1} {:>12.1} {:>8}",
                i,
                g.centroid,
                g.member_count(),
                g.mean_on_duration(),
                g.median_period,
                duty
            )?;
        }
    }

    if !report.links.is_empty() {
        heading(out, "Group links")?;
        for link in &report.links {
            writeln!(
                out,
                "  group {} -> group {}: {}/{} events (Δ {:.0} W)",
                link.leader, link.follower, link.links, link.leader_count, link.centroid_diff
            )?;
        }
    }

    if !report.thermal.is_empty() {
        heading(out, "Thermal responses")?;
        writeln!(out, "  {:<6} {:<12} {:>12}", "Group", "Sensor", "Mean Δ")?;
        for r in &report.thermal {
            let coupled = report
                .attributions
                .iter()
                .any(|a| a.group == r.group && a.sensor == r.sensor);
            writeln!(
                out,
                "  {:<6} {:<12} {:>+12.2}{}",
                r.group,
                r.sensor,
                r.mean_delta,
                if coupled { "  <- coupled" } else { "" }
            )?;
        }
    }

    if !report.diagnostics.is_empty() {
        heading(out, "Diagnostics")?;
        diagnostics(out, &report.diagnostics)?;
    }
    Ok(())
}

// ============================================================================
// Element Health
// ============================================================================

fn element_row(out: &mut impl Write, metrics: &ElementMetrics) -> io::Result<()> {
    let resistance = metrics
        .mean_resistance_ohms
        .map_or_else(|| "-".to_string(), |r| format!("{r:.2}"));
    writeln!(
        out,
        "  {:<15} {:>8} {:>12} {:>16.5}",
        metrics.element.to_string(),
        metrics.cycle_count,
        resistance,
        metrics.mean_efficiency
    )
}

pub fn write_health(out: &mut impl Write, report: &HealthReport) -> io::Result<()> {
    heading(out, "Element health")?;
    writeln!(
        out,
        "  {:<15} {:>8} {:>12} {:>16}",
        "Element", "Cycles", "R (Ω)", "°F per Wh"
    )?;
    for metrics in [&report.lower, &report.upper].into_iter().flatten() {
        element_row(out, metrics)?;
    }

    if let Some(cmp) = &report.comparison {
        if let Some(delta) = cmp.resistance_delta_ohms {
            writeln!(out, "  {:<22} {delta:+.2} Ω", "Resistance delta:")?;
        }
        if let Some(ratio) = cmp.efficiency_ratio {
            writeln!(out, "  {:<22} {:.2}", "Efficiency ratio:", ratio)?;
        }
    }

    diagnostics(out, &report.diagnostics)
}

// ============================================================================
// Cycle Intervals
// ============================================================================

pub fn write_intervals(out: &mut impl Write, report: &IntervalReport) -> io::Result<()> {
    heading(out, "Furnace cycle intervals")?;
    writeln!(out, "  {:<18} {:<18} {:>10} {:>12}", "Start", "End", "Minutes", "Outdoor °F")?;
    for iv in &report.intervals {
        writeln!(
            out,
            "  {:<18} {:<18} {:>10.1} {:>12.1}",
            timestamp(iv.start_timestamp_ms),
            timestamp(iv.end_timestamp_ms),
            iv.interval_minutes,
            iv.median_outdoor_f
        )?;
    }

    if let Some(mean) = report.mean_interval_minutes {
        writeln!(out, "  {:<22} {mean:.1} min", "Mean interval:")?;
    }
    if let Some(mean) = report.mean_outdoor_f {
        writeln!(out, "  {:<22} {mean:.1} °F", "Mean outdoor:")?;
    }
    if let (Some(r), Some(p)) = (report.correlation, report.p_value) {
        writeln!(out, "  {:<22} r = {r:.3} (p = {p:.3})", "Correlation:")?;
    }
    if let Some(class) = report.classification {
        writeln!(out, "  {class}")?;
    }

    diagnostics(out, &report.diagnostics)
}

// ============================================================================
// Diurnal Profile
// ============================================================================

pub fn write_hourly(out: &mut impl Write, profile: &[HourlyLoad]) -> io::Result<()> {
    heading(out, "Hourly load profile")?;
    writeln!(out, "  {:<6} {:>12} {:>10}", "Hour", "Mean (W)", "Samples")?;
    for h in profile {
        writeln!(out, "  {:02}:00  {:>12.0} {:>10}", h.hour, h.mean_watts, h.samples)?;
    }
    Ok(())
}

// ============================================================================
// Load Signatures
// ============================================================================

fn segment(out: &mut impl Write, label: &str, stats: Option<&SegmentStats>) -> io::Result<()> {
    let Some(stats) = stats else {
        return writeln!(out, "  {label}: no samples");
    };
    writeln!(
        out,
        "  {label}: {} samples, baseload {:.0} W, peak {:.0} W, mean {:.0} W",
        stats.samples, stats.baseload_watts, stats.peak_watts, stats.mean_watts
    )?;
    for bucket in &stats.top_buckets {
        writeln!(
            out,
            "    {:>6}-{:<6} W {:>6.1}%",
            bucket.floor_watts,
            bucket.floor_watts + bucket.width_watts,
            bucket.ratio * 100.0
        )?;
    }
    Ok(())
}

pub fn write_signatures(out: &mut impl Write, report: &SignatureReport) -> io::Result<()> {
    heading(out, "Regime shift")?;
    writeln!(
        out,
        "  {} ({:.1} h into record), jump {:.1}",
        timestamp(report.shift_timestamp_ms),
        report.hours_into_record,
        report.shift_magnitude
    )?;

    heading(out, "Power signatures")?;
    segment(out, "Before", report.power_before.as_ref())?;
    segment(out, "After ", report.power_after.as_ref())?;

    if let (Some(before), Some(after)) = (&report.temperature_before, &report.temperature_after) {
        heading(out, "Temperature")?;
        writeln!(
            out,
            "  Before: mean {:.1}, range {:.1}-{:.1}",
            before.mean_f, before.min_f, before.max_f
        )?;
        writeln!(
            out,
            "  After:  mean {:.1}, range {:.1}-{:.1}",
            after.mean_f, after.min_f, after.max_f
        )?;
    }
    Ok(())
}

// ============================================================================
// Upgrade Simulation
// ============================================================================

pub fn write_upgrade(
    out: &mut impl Write,
    scenarios: &[UpgradeScenario],
    bias: Option<LayeringBias>,
) -> io::Result<()> {
    heading(out, "Element upgrade scenarios")?;
    for s in scenarios {
        writeln!(out, "  {} ({:.0} W)", s.label, s.watts)?;
        writeln!(
            out,
            "    HWD density:  {:>7.1} W/in²{}",
            s.density.hwd,
            if s.density.hwd_scaling_risk { "  [!] scaling risk" } else { "" }
        )?;
        writeln!(
            out,
            "    LWD density:  {:>7.1} W/in²{}",
            s.density.lwd,
            if s.density.lwd_dry_fire_safe { "  dry-fire safe" } else { "" }
        )?;
        writeln!(
            out,
            "    Recovery:     {:>7.1} °F/h, {:.1} min to target",
            s.recovery.rate_f_per_hour, s.recovery.minutes_to_target
        )?;
        writeln!(out, "    Meter pulses: {:>7.2} Hz", s.recovery.meter_pulse_hz)?;
    }

    if let Some(bias) = bias {
        heading(out, "Layering")?;
        writeln!(out, "  {bias}")?;
    }
    Ok(())
}
