//! Run bookkeeping written next to the results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;
use vlpim_common::ImmunogenicityMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub mode: ImmunogenicityMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub output_dir: PathBuf,
    pub epitopes: usize,
    pub mutants: usize,
    pub scored: usize,
    pub structure_candidates: usize,
    pub ranked: usize,
    pub passing_filters: usize,
    /// Per-candidate collaborator failures that were tolerated.
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn start(mode: ImmunogenicityMode, output_dir: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            mode,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            output_dir,
            epitopes: 0,
            mutants: 0,
            scored: 0,
            structure_candidates: 0,
            ranked: 0,
            passing_filters: 0,
            warnings: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serialises() {
        let mut summary = RunSummary::start(ImmunogenicityMode::Enhance, PathBuf::from("results"));
        summary.warnings.push("structure prediction failed for mutant_0002".into());
        summary.finish();
        assert!(summary.finished_at >= summary.started_at);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"mode\":\"enhance\""));
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, summary.run_id);
    }
}
