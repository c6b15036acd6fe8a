use crate::models::Region;
use serde::{Deserialize, Serialize};

/// How the width/height ratio of a candidate is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectPolicy {
    /// Truncating `width / height`, so 61x2 has ratio 30
    #[default]
    IntegerDivision,
    /// Exact `width as f64 / height as f64`, so 61x2 has ratio 30.5
    Float,
}

impl AspectPolicy {
    /// True when the region is flatter than `max_ratio` allows
    pub fn exceeds(&self, region: &Region, max_ratio: u32) -> bool {
        if region.height == 0 {
            return true;
        }
        match self {
            AspectPolicy::IntegerDivision => region.width / region.height > max_ratio,
            AspectPolicy::Float => region.width as f64 / region.height as f64 > max_ratio as f64,
        }
    }
}

/// Drop candidates whose width/height ratio exceeds `max_ratio`
pub fn filter_aspect(candidates: &[Region], max_ratio: u32, policy: AspectPolicy) -> Vec<Region> {
    candidates
        .iter()
        .filter(|r| !policy.exceeds(r, max_ratio))
        .copied()
        .collect()
}

/// The widest candidate; on equal widths the earliest one wins
pub fn select_widest(candidates: &[Region]) -> Option<Region> {
    let mut best: Option<Region> = None;
    for candidate in candidates {
        let best_width = best.map(|b| b.width).unwrap_or(0);
        if candidate.width > best_width {
            best = Some(*candidate);
        }
    }
    best.filter(|b| !b.is_empty())
}
