//! Rank-rank scatter layout.

use crate::SPACING_FACTOR;
use crate::positioner::{LayoutContext, card_extent, validate_column};
use shoal_core::extract::{self, ExtractionMode, NanPolicy};
use shoal_core::geom::{Point, point};
use shoal_core::props::{self, PropertyMap};
use shoal_core::{CardElement, ColumnId, DataAccessor, Error, Result};

const NAME: &str = "rank-scatter";

/// Maps the rank order of two columns independently onto grid cell indices.
///
/// Because rank compresses any value distribution to a uniform integer
/// sequence, the layout is immune to extreme outliers and skew. Rank
/// assignment is deterministic for a fixed input ordering: ties are broken
/// by original index order.
#[derive(Debug, Clone)]
pub struct RankScatterPositioner {
    column_x: ColumnId,
    column_y: ColumnId,
    stretch_x: f64,
    stretch_y: f64,
}

impl RankScatterPositioner {
    pub fn new(column_x: ColumnId, column_y: ColumnId) -> Self {
        Self {
            column_x,
            column_y,
            stretch_x: 1.0,
            stretch_y: 1.0,
        }
    }

    pub fn with_stretch(mut self, stretch_x: f64, stretch_y: f64) -> Self {
        self.stretch_x = stretch_x;
        self.stretch_y = stretch_y;
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

        let ranks_x = extract::extract_batch(
            ctx.data,
            self.column_x,
            elements,
            ExtractionMode::Order,
            NanPolicy::DontConsider,
            ctx.cancel,
        )?;
        let ranks_y = extract::extract_batch(
            ctx.data,
            self.column_y,
            elements,
            ExtractionMode::Order,
            NanPolicy::DontConsider,
            ctx.cancel,
        )?;

        let (card_width, card_height) = card_extent(elements);
        let cell_width = card_width * SPACING_FACTOR * self.stretch_x;
        let cell_height = card_height * SPACING_FACTOR * self.stretch_y;

        let mut out = Vec::with_capacity(elements.len());
        for i in 0..elements.len() {
            ctx.cancel.checkpoint()?;
            out.push(point(ranks_x[i] * cell_width, ranks_y[i] * cell_height));
        }
        Ok(out)
    }

    pub fn config(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.set("column-x", self.column_x.0);
        props.set("column-y", self.column_y.0);
        props.set("stretch-x", self.stretch_x);
        props.set("stretch-y", self.stretch_y);
        props
    }

    pub fn apply_config(&mut self, props: &PropertyMap) -> Result<()> {
        for (key, value) in props.iter() {
            match key {
                "column-x" => self.column_x = ColumnId(props::expect_usize(key, value)?),
                "column-y" => self.column_y = ColumnId(props::expect_usize(key, value)?),
                "stretch-x" => self.stretch_x = props::expect_f64(key, value)?,
                "stretch-y" => self.stretch_y = props::expect_f64(key, value)?,
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
