//! The contract every layout strategy satisfies, and the closed set of
//! strategies behind it.

use crate::binned::BinnedStackPositioner;
use crate::curve::CurveSamplingPositioner;
use crate::linear::LinearAxisPositioner;
use crate::scatter::RankScatterPositioner;
use crate::spiral::SpiralSequencePositioner;
use shoal_core::geom::Point;
use shoal_core::{CancelToken, CardElement, ColumnId, DataAccessor, Error, PropertyMap, Result};

/// Everything a strategy needs besides its own configuration: the data
/// accessor seam and the cancellation flag of the current recompute.
pub struct LayoutContext<'a> {
    pub data: &'a dyn DataAccessor,
    pub cancel: &'a CancelToken,
}

impl<'a> LayoutContext<'a> {
    pub fn new(data: &'a dyn DataAccessor, cancel: &'a CancelToken) -> Self {
        Self { data, cancel }
    }
}

/// The closed set of layout strategies.
///
/// A closed enum rather than trait objects: validation, cancellation and
/// configuration handling stay centralized and exhaustive, and adding a
/// strategy is a deliberate change to this type, not an open subclassing
/// point.
#[derive(Debug, Clone)]
pub enum Positioner {
    Linear(LinearAxisPositioner),
    Curve(CurveSamplingPositioner),
    RankScatter(RankScatterPositioner),
    SpiralSequence(SpiralSequencePositioner),
    BinnedStack(BinnedStackPositioner),
}

impl Positioner {
    pub fn name(&self) -> &'static str {
        match self {
            Positioner::Linear(_) => "linear-axis",
            Positioner::Curve(_) => "curve-sampling",
            Positioner::RankScatter(_) => "rank-scatter",
            Positioner::SpiralSequence(_) => "spiral-sequence",
            Positioner::BinnedStack(_) => "binned-stack",
        }
    }

    /// Column compatibility check, run synchronously before any background
    /// work starts.
    pub fn validate(&self, data: &dyn DataAccessor) -> Result<()> {
        match self {
            Positioner::Linear(p) => p.validate(data),
            Positioner::Curve(p) => p.validate(data),
            Positioner::RankScatter(p) => p.validate(data),
            Positioner::SpiralSequence(p) => p.validate(data),
            Positioner::BinnedStack(p) => p.validate(data),
        }
    }

    /// Positions the entire element list, index-aligned with the input.
    ///
    /// Strategies need global statistics (extents, rank order, element
    /// count) before placing any single element, so this is the primary
    /// entry point. An empty input yields an empty result. Cancellation
    /// aborts with [`Error::Cancelled`]; partial results are never
    /// returned.
    pub fn position_all(
        &mut self,
        elements: &[CardElement],
        ctx: &LayoutContext<'_>,
    ) -> Result<Vec<Point>> {
        match self {
            Positioner::Linear(p) => p.position_all(elements, ctx),
            Positioner::Curve(p) => p.position_all(elements, ctx),
            Positioner::RankScatter(p) => p.position_all(elements, ctx),
            Positioner::SpiralSequence(p) => p.position_all(elements, ctx),
            Positioner::BinnedStack(p) => p.position_all(elements, ctx),
        }
    }

    /// Places one element (a newly created card) against the state cached
    /// by the last [`Positioner::position_all`] call, without recomputing
    /// the whole layout.
    ///
    /// Strategies whose placement depends on global rank cannot do this and
    /// fail with [`Error::SingleElementUnsupported`].
    pub fn position_one(
        &mut self,
        element: &CardElement,
        ctx: &LayoutContext<'_>,
    ) -> Result<Point> {
        match self {
            Positioner::Linear(p) => p.position_one(element, ctx),
            Positioner::Curve(p) => p.position_one(element, ctx),
            Positioner::RankScatter(_)
            | Positioner::SpiralSequence(_)
            | Positioner::BinnedStack(_) => Err(Error::SingleElementUnsupported {
                positioner: self.name(),
            }),
        }
    }

    /// Whether the strategy reads column data at all. Every shipped
    /// strategy does; only a purely geometric placeholder would not.
    pub fn requires_data_accessor(&self) -> bool {
        true
    }

    pub fn supports_single_element_positioning(&self) -> bool {
        matches!(self, Positioner::Linear(_) | Positioner::Curve(_))
    }

    /// Whether elements landing on exactly the same computed position are
    /// to be coalesced into one stack by the caller.
    pub fn should_form_stacks(&self) -> bool {
        match self {
            Positioner::Curve(p) => p.should_form_stacks(),
            Positioner::BinnedStack(_) => true,
            Positioner::Linear(_) | Positioner::RankScatter(_) | Positioner::SpiralSequence(_) => {
                false
            }
        }
    }

    /// Flat key-value snapshot of the configuration, suitable for
    /// persistence by the caller. Keys are strategy-specific.
    pub fn config(&self) -> PropertyMap {
        match self {
            Positioner::Linear(p) => p.config(),
            Positioner::Curve(p) => p.config(),
            Positioner::RankScatter(p) => p.config(),
            Positioner::SpiralSequence(p) => p.config(),
            Positioner::BinnedStack(p) => p.config(),
        }
    }

    /// Applies a configuration snapshot. Unknown keys and out-of-domain
    /// values are rejected with the offending key named.
    pub fn apply_config(&mut self, props: &PropertyMap) -> Result<()> {
        match self {
            Positioner::Linear(p) => p.apply_config(props),
            Positioner::Curve(p) => p.apply_config(props),
            Positioner::RankScatter(p) => p.apply_config(props),
            Positioner::SpiralSequence(p) => p.apply_config(props),
            Positioner::BinnedStack(p) => p.apply_config(props),
        }
    }
}

/// Largest card width/height over the element list. Spacing heuristics
/// scale with card size so layouts stay readable regardless of count.
pub(crate) fn card_extent(elements: &[CardElement]) -> (f64, f64) {
    let mut width: f64 = 0.0;
    let mut height: f64 = 0.0;
    for element in elements {
        width = width.max(element.size().width);
        height = height.max(element.size().height);
    }
    (width, height)
}

/// Column check shared by every strategy: in range, and carrying either
/// numeric values or category indices.
pub(crate) fn validate_column(
    positioner: &'static str,
    data: &dyn DataAccessor,
    column: ColumnId,
) -> Result<()> {
    if column.0 >= data.column_count() {
        return Err(Error::ColumnOutOfRange {
            column,
            column_count: data.column_count(),
        });
    }
    if !data.is_numeric(column) && !data.is_category(column) {
        return Err(Error::UnsupportedColumnType { positioner, column });
    }
    Ok(())
}

/// Finite min/max over a value slice; `None` when every value is NaN.
pub(crate) fn finite_extent(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    (min <= max).then_some((min, max))
}
