//! Summary statistics over raster bands and zone metrics.

use landcover_common::{Raster, ZoneMetric, ZoneRecord};
use serde::Serialize;

/// Percentile of `values` with linear interpolation between closest ranks.
///
/// `q` is in `[0, 100]`. Non-finite values are ignored. Returns `None` when
/// no finite value remains.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, q))
}

/// Several percentiles from one sort.
pub fn percentiles<const N: usize>(values: &[f64], qs: [f64; N]) -> Option<[f64; N]> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(qs.map(|q| percentile_sorted(&sorted, q)))
}

/// `sorted` must be non-empty and ascending.
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Mean of the finite values, or `None` if there are none.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Per-year summary of an index raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearStats {
    pub year: u16,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl YearStats {
    /// Statistics over the finite, non-sentinel pixels, or `None` for an
    /// empty band.
    pub fn from_raster(year: u16, raster: &Raster) -> Option<Self> {
        let values = raster.valid_values();
        let mean = mean(&values)?;
        let n = values.len() as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self {
            year,
            mean,
            std: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Mean and 90th percentile of one zone metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricKpi {
    pub metric: ZoneMetric,
    pub mean: f64,
    pub p90: f64,
}

/// Headline numbers for the zones panel.
///
/// Missing values count as zero. Returns `None` when no zone carries either
/// metric or there are no zones.
pub fn zone_kpis(zones: &[ZoneRecord]) -> Option<Vec<MetricKpi>> {
    let kpis: Vec<MetricKpi> = ZoneMetric::ALL
        .iter()
        .filter(|&&m| zones.iter().any(|z| z.metric(m).is_some()))
        .filter_map(|&metric| {
            let values: Vec<f64> = zones.iter().map(|z| z.metric_or_zero(metric)).collect();
            Some(MetricKpi {
                metric,
                mean: mean(&values)?,
                p90: percentile(&values, 90.0)?,
            })
        })
        .collect();
    (!kpis.is_empty()).then_some(kpis)
}

/// Count, range and mean of a numeric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl SeriesSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let mean = mean(&finite)?;
        let (min, max) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self {
            count: finite.len(),
            min,
            max,
            mean,
        })
    }
}
