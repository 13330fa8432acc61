//! Interface quality grading and pass/fail thresholds.

use serde::{Deserialize, Serialize};
use vlpim_common::{config::FilterThresholds, InterfaceMetrics, InterfaceQuality, StructuralMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAssessment {
    pub quality: InterfaceQuality,
    /// 0-10
    pub points: u32,
}

fn dg_dsasa_points(dg: f64) -> u32 {
    if dg < -10.0 {
        3
    } else if dg < -5.0 {
        2
    } else if dg < -1.0 {
        1
    } else {
        0
    }
}

fn packstat_points(packstat: f64) -> u32 {
    if packstat > 0.7 {
        3
    } else if packstat > 0.5 {
        2
    } else if packstat > 0.3 {
        1
    } else {
        0
    }
}

fn buns_points(buns: f64) -> u32 {
    if buns < 2.0 {
        3
    } else if buns < 5.0 {
        2
    } else if buns < 10.0 {
        1
    } else {
        0
    }
}

/// Points for binding energy, packing and unsatisfied polar groups, with one
/// bonus point for shape complementarity above 50.
pub fn assess_interface(metrics: &InterfaceMetrics) -> InterfaceAssessment {
    let mut points = dg_dsasa_points(metrics.dg_dsasa)
        + packstat_points(metrics.packstat)
        + buns_points(metrics.buns);
    if metrics.interface_sc.is_some_and(|sc| sc > 50.0) {
        points += 1;
    }
    let quality = match points {
        8.. => InterfaceQuality::Excellent,
        6..=7 => InterfaceQuality::Good,
        4..=5 => InterfaceQuality::Fair,
        _ => InterfaceQuality::Poor,
    };
    InterfaceAssessment { quality, points }
}

/// RMSD, dG/dSASA and BUNS within their maxima and packstat at or above its
/// minimum. Any missing metric fails.
pub fn passes_filters(metrics: &StructuralMetrics, thresholds: &FilterThresholds) -> bool {
    let (Some(rmsd), Some(dg), Some(buns), Some(packstat)) =
        (metrics.rmsd, metrics.dg_dsasa, metrics.buns, metrics.packstat)
    else {
        return false;
    };
    rmsd <= thresholds.rmsd
        && dg <= thresholds.dg_dsasa
        && buns <= thresholds.buns
        && packstat >= thresholds.packstat
}
