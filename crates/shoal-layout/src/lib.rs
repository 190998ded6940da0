#![forbid(unsafe_code)]

//! Card positioning strategies, stack clustering and recompute coordination.
//!
//! The engine computes 2D positions for card elements from data-column
//! values and decides which elements merge into stacks. Five interchangeable
//! strategies sit behind one closed [`Positioner`] contract; the
//! [`coordinator::RecomputeCoordinator`] keeps at most one cancellable
//! recomputation in flight; [`cluster`] regroups elements either by
//! bit-exact position or by hierarchical proximity clustering.
//!
//! The typical round trip is [`compute_layout`], run inside a coordinator
//! job:
//!
//! ```no_run
//! use shoal_core::{CancelToken, CardElement, MemoryTable, RecordId, geom::size};
//! use shoal_layout::linear::{Axis, LinearAxisPositioner};
//! use shoal_layout::{Positioner, compute_layout};
//!
//! let mut table = MemoryTable::new();
//! let column = table.push_numeric(vec![3.0, 1.0, 2.0]);
//! let elements: Vec<_> = (0..3)
//!     .map(|row| CardElement::single(RecordId(row), size(40.0, 60.0)))
//!     .collect();
//!
//! let mut positioner = Positioner::Linear(LinearAxisPositioner::new(column, Axis::X));
//! let cancel = CancelToken::new();
//! let outcome = compute_layout(&mut positioner, &elements, &table, &cancel, None).unwrap();
//! assert_eq!(outcome.positions.len(), elements.len());
//! ```

pub mod binned;
pub mod cluster;
pub mod coordinator;
pub mod curve;
pub mod linear;
pub mod positioner;
pub mod scatter;
pub mod spiral;

pub use binned::BinnedStackPositioner;
pub use cluster::{ClusterAssignment, ClusterTarget, ClusteringOptions, Linkage};
pub use coordinator::RecomputeCoordinator;
pub use curve::{CurveSamplingPositioner, CurveShape};
pub use linear::{Axis, LinearAxisPositioner};
pub use positioner::{LayoutContext, Positioner};
pub use scatter::RankScatterPositioner;
pub use spiral::SpiralSequencePositioner;

use shoal_core::geom::Point;
use shoal_core::{CancelToken, CardElement, DataAccessor, Error, Result};

/// Spacing heuristics multiply card dimensions by this factor so neighbors
/// keep a readable gap regardless of element count.
pub(crate) const SPACING_FACTOR: f64 = 1.5;

/// Result of one full recompute: positions index-aligned with the input
/// elements, plus the grouping into stacks when one was produced.
#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    pub positions: Vec<Point>,
    pub clusters: Option<ClusterAssignment>,
}

/// One full layout pass: validate, position every element, then group.
///
/// Grouping uses exact-position hashing when the active strategy forms
/// stacks by construction, and proximity clustering when the caller asked
/// for it; otherwise no grouping is produced. Configuration errors surface
/// before any positioning work starts. A position-count mismatch aborts the
/// whole computation; no partial layout is ever returned.
pub fn compute_layout(
    positioner: &mut Positioner,
    elements: &[CardElement],
    data: &dyn DataAccessor,
    cancel: &CancelToken,
    clustering: Option<&ClusteringOptions>,
) -> Result<LayoutOutcome> {
    positioner.validate(data)?;
    if let Some(options) = clustering {
        if !elements.is_empty() {
            options.target.resolve(elements.len())?;
        }
    }

    let ctx = LayoutContext::new(data, cancel);
    let positions = positioner.position_all(elements, &ctx)?;
    if positions.len() != elements.len() {
        return Err(Error::PositionCountMismatch {
            expected: elements.len(),
            produced: positions.len(),
        });
    }

    let clusters = if positioner.should_form_stacks() {
        Some(cluster::assign_by_position(&positions))
    } else if let Some(options) = clustering {
        Some(cluster::assign_by_proximity(&positions, options, cancel)?)
    } else {
        None
    };

    Ok(LayoutOutcome {
        positions,
        clusters,
    })
}
