//! Stack grouping over computed positions.
//!
//! Two independent strategies: bit-exact position hashing (for layouts that
//! form stacks by construction, e.g. grid and binned) and hierarchical
//! agglomerative clustering over pairwise Euclidean distances (when the user
//! asked for proximity-based stacking). Both only supply the grouping; the
//! caller materializes the merged stacks and usually places each at its
//! cluster's centroid.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use shoal_core::geom::Point;
use shoal_core::{CancelToken, Error, Result};

/// Element index → non-negative cluster id. Ids need not be contiguous;
/// two elements with the same id are merged into one stack by the caller.
pub type ClusterAssignment = Vec<usize>;

/// Rule for the distance between two clusters during agglomeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Linkage {
    #[default]
    Single,
    Complete,
    /// Unweighted pair-group average.
    Upgma,
    /// Weighted pair-group average (McQuitty).
    Wpgma,
}

/// Desired cluster count, either explicit or from the UI slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterTarget {
    /// Must be in `[1, element_count]`.
    Count(usize),
    /// `0` keeps every element its own cluster; values toward `1` collapse
    /// toward a single cluster. Must be in `[0, 1]`.
    Slider(f64),
}

impl ClusterTarget {
    pub fn resolve(&self, element_count: usize) -> Result<usize> {
        match *self {
            ClusterTarget::Count(target) => {
                if target < 1 || target > element_count {
                    return Err(Error::ClusterTargetOutOfRange {
                        target,
                        element_count,
                    });
                }
                Ok(target)
            }
            ClusterTarget::Slider(value) => {
                if !(0.0..=1.0).contains(&value) {
                    return Err(Error::ClusterSliderOutOfRange { value });
                }
                let raw = ((1.0 - value) * element_count as f64).round() as usize;
                Ok(raw.clamp(1, element_count))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringOptions {
    pub linkage: Linkage,
    pub target: ClusterTarget,
}

impl ClusteringOptions {
    pub fn new(linkage: Linkage, target: ClusterTarget) -> Self {
        Self { linkage, target }
    }
}

/// Groups elements by bit-exact equality of their computed position; each
/// distinct `(x, y)` becomes one cluster id, in first-seen order.
pub fn assign_by_position(positions: &[Point]) -> ClusterAssignment {
    let mut ids: IndexMap<(u64, u64), usize> = IndexMap::new();
    positions
        .iter()
        .map(|p| {
            let key = (p.x.to_bits(), p.y.to_bits());
            let next = ids.len();
            *ids.entry(key).or_insert(next)
        })
        .collect()
}

/// Hierarchical agglomerative clustering over pairwise Euclidean distances,
/// cut at the resolved target cluster count.
///
/// Cluster distances are maintained with Lance–Williams updates; on equal
/// merge distances the lowest index pair wins, which makes the partition
/// deterministic. Cancellation is polled once per merge round.
pub fn assign_by_proximity(
    positions: &[Point],
    options: &ClusteringOptions,
    cancel: &CancelToken,
) -> Result<ClusterAssignment> {
    let n = positions.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let target = options.target.resolve(n)?;

    let mut dist = DMatrix::<f64>::from_fn(n, n, |i, j| (positions[i] - positions[j]).length());
    let mut active = vec![true; n];
    let mut sizes = vec![1.0f64; n];
    let mut assignment: ClusterAssignment = (0..n).collect();

    let mut cluster_count = n;
    while cluster_count > target {
        cancel.checkpoint()?;

        // Closest active pair; strict comparison keeps the lowest index
        // pair on ties.
        let mut best: Option<(f64, usize, usize)> = None;
        for i in 0..n {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..n {
                if !active[j] {
                    continue;
                }
                let d = dist[(i, j)];
                if best.is_none_or(|(bd, _, _)| d < bd) {
                    best = Some((d, i, j));
                }
            }
        }
        let Some((_, keep, gone)) = best else {
            break;
        };

        for k in 0..n {
            if !active[k] || k == keep || k == gone {
                continue;
            }
            let dik = dist[(keep, k)];
            let djk = dist[(gone, k)];
            let updated = match options.linkage {
                Linkage::Single => dik.min(djk),
                Linkage::Complete => dik.max(djk),
                Linkage::Upgma => {
                    (sizes[keep] * dik + sizes[gone] * djk) / (sizes[keep] + sizes[gone])
                }
                Linkage::Wpgma => 0.5 * (dik + djk),
            };
            dist[(keep, k)] = updated;
            dist[(k, keep)] = updated;
        }

        sizes[keep] += sizes[gone];
        active[gone] = false;
        for id in assignment.iter_mut() {
            if *id == gone {
                *id = keep;
            }
        }
        cluster_count -= 1;
    }

    Ok(assignment)
}

/// Centroid of each cluster's member positions, keyed by cluster id in
/// first-seen order. This is the position the caller gives a newly merged
/// stack.
pub fn centroids(positions: &[Point], assignment: &ClusterAssignment) -> IndexMap<usize, Point> {
    let mut sums: IndexMap<usize, (Point, usize)> = IndexMap::new();
    for (i, &id) in assignment.iter().enumerate() {
        let entry = sums.entry(id).or_insert((Point::zero(), 0));
        entry.0.x += positions[i].x;
        entry.0.y += positions[i].y;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(id, (sum, count))| {
            let count = count as f64;
            (id, shoal_core::geom::point(sum.x / count, sum.y / count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::ClusterTarget;

    #[test]
    fn slider_zero_keeps_every_element_separate() {
        assert_eq!(ClusterTarget::Slider(0.0).resolve(12).unwrap(), 12);
    }

    #[test]
    fn slider_one_collapses_to_a_single_cluster() {
        assert_eq!(ClusterTarget::Slider(1.0).resolve(12).unwrap(), 1);
    }

    #[test]
    fn slider_outside_unit_interval_is_rejected() {
        assert!(ClusterTarget::Slider(1.5).resolve(12).is_err());
        assert!(ClusterTarget::Slider(-0.1).resolve(12).is_err());
        assert!(ClusterTarget::Slider(f64::NAN).resolve(12).is_err());
    }

    #[test]
    fn explicit_count_is_validated_against_element_count() {
        assert!(ClusterTarget::Count(0).resolve(5).is_err());
        assert!(ClusterTarget::Count(6).resolve(5).is_err());
        assert_eq!(ClusterTarget::Count(5).resolve(5).unwrap(), 5);
    }
}
