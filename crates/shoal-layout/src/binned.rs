//! Two-column binning into a stack grid.

use crate::positioner::{LayoutContext, card_extent, finite_extent, validate_column};
use shoal_core::extract::{self, ExtractionMode, NanPolicy};
use shoal_core::geom::{Point, point};
use shoal_core::props::{self, PropertyMap};
use shoal_core::{CardElement, ColumnId, DataAccessor, Error, Result};

const NAME: &str = "binned-stack";

pub const DEFAULT_BIN_COUNT: usize = 10;

/// Fraction of the value span the bin range is expanded by on each side,
/// so boundary values land strictly inside the first/last bin.
const RANGE_PADDING: f64 = 0.001;

/// Bins two columns into an N×M grid; every occupied bin becomes one stack.
///
/// Numeric axes are split into `bin_count` equal-width bins over the padded
/// `[min, max]` span. Categorical axes skip the re-binning entirely: the
/// category index already is the bin index. All elements sharing a bin get
/// the bit-identical position `(bin_x, bin_y) * grid_spacing`, which is what
/// lets the exact-position grouping coalesce them.
#[derive(Debug, Clone)]
pub struct BinnedStackPositioner {
    column_x: ColumnId,
    column_y: ColumnId,
    bin_count: usize,
}

impl BinnedStackPositioner {
    pub fn new(column_x: ColumnId, column_y: ColumnId) -> Self {
        Self {
            column_x,
            column_y,
            bin_count: DEFAULT_BIN_COUNT,
        }
    }

    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count.max(1);
        self
    }

    pub fn validate(&self, data: &dyn DataAccessor) -> Result<()> {
        validate_column(NAME, data, self.column_x)?;
        validate_column(NAME, data, self.column_y)
    }

    pub fn position_all(
        &mut self,
        elements: &[CardElement],
        ctx: &LayoutContext<'_>,
    ) -> Result<Vec<Point>> {
        if elements.is_empty() {
            return Ok(Vec::new());
        }

        let bins_x = self.axis_bins(self.column_x, elements, ctx)?;
        let bins_y = self.axis_bins(self.column_y, elements, ctx)?;

        let (card_width, card_height) = card_extent(elements);
        let grid_spacing = 4.0 * card_width.max(card_height);

        let mut out = Vec::with_capacity(elements.len());
        for i in 0..elements.len() {
            ctx.cancel.checkpoint()?;
            out.push(point(
                bins_x[i] as f64 * grid_spacing,
                bins_y[i] as f64 * grid_spacing,
            ));
        }
        Ok(out)
    }

    fn axis_bins(
        &self,
        column: ColumnId,
        elements: &[CardElement],
        ctx: &LayoutContext<'_>,
    ) -> Result<Vec<usize>> {
        let values = extract::extract_batch(
            ctx.data,
            column,
            elements,
            ExtractionMode::Numerical,
            NanPolicy::DontConsider,
            ctx.cancel,
        )?;

        if ctx.data.is_category(column) {
            // The category-derived value is the bin index.
            return Ok(values
                .iter()
                .map(|v| if v.is_nan() { 0 } else { v.round().max(0.0) as usize })
                .collect());
        }

        let Some((min, max)) = finite_extent(&values) else {
            tracing::warn!(
                column = %column,
                "every extracted value is missing; all elements land in bin 0"
            );
            return Ok(vec![0; values.len()]);
        };

        let span = max - min;
        if span == 0.0 {
            return Ok(vec![0; values.len()]);
        }

        let lo = min - span * RANGE_PADDING;
        let hi = max + span * RANGE_PADDING;
        let width = (hi - lo) / self.bin_count as f64;

        Ok(values
            .iter()
            .map(|v| {
                if v.is_nan() {
                    0
                } else {
                    (((v - lo) / width).floor() as usize).min(self.bin_count - 1)
                }
            })
            .collect())
    }

    pub fn config(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.set("column-x", self.column_x.0);
        props.set("column-y", self.column_y.0);
        props.set("bin-count", self.bin_count);
        props
    }

    pub fn apply_config(&mut self, props: &PropertyMap) -> Result<()> {
        for (key, value) in props.iter() {
            match key {
                "column-x" => self.column_x = ColumnId(props::expect_usize(key, value)?),
                "column-y" => self.column_y = ColumnId(props::expect_usize(key, value)?),
                "bin-count" => {
                    let count = props::expect_usize(key, value)?;
                    if count == 0 {
                        return Err(Error::InvalidProperty {
                            key: key.to_string(),
                            message: "bin count must be at least 1".to_string(),
                        });
                    }
                    self.bin_count = count;
                }
                _ => {
                    return Err(Error::UnknownProperty {
                        positioner: NAME,
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
