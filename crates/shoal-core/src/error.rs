use crate::data::ColumnId;
use crate::element::ElementId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("column {column} is out of range (accessor exposes {column_count} columns)")]
    ColumnOutOfRange {
        column: ColumnId,
        column_count: usize,
    },

    #[error("{positioner} cannot read column {column}: it is neither numeric nor categorical")]
    UnsupportedColumnType {
        positioner: &'static str,
        column: ColumnId,
    },

    #[error("cluster target {target} is outside [1, {element_count}]")]
    ClusterTargetOutOfRange { target: usize, element_count: usize },

    #[error("cluster slider value {value} is outside [0, 1]")]
    ClusterSliderOutOfRange { value: f64 },

    #[error("{positioner} does not support single-element positioning")]
    SingleElementUnsupported { positioner: &'static str },

    #[error("shape has not been initialized; position the full element list first")]
    ShapeNotInitialized,

    #[error("unknown property `{key}` for {positioner}")]
    UnknownProperty {
        positioner: &'static str,
        key: String,
    },

    #[error("invalid value for property `{key}`: {message}")]
    InvalidProperty { key: String, message: String },

    #[error("layout computation was cancelled")]
    Cancelled,

    #[error("positioner produced {produced} positions for {expected} elements")]
    PositionCountMismatch { expected: usize, produced: usize },

    #[error("no cached grid cell for element {element}")]
    GridCellMissing { element: ElementId },

    #[error("layout worker panicked")]
    WorkerPanicked,
}

impl Error {
    /// Expected interruption of an in-flight computation; the coordinator
    /// discards it instead of surfacing it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Reported to the caller before any background work starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ColumnOutOfRange { .. }
                | Error::UnsupportedColumnType { .. }
                | Error::ClusterTargetOutOfRange { .. }
                | Error::ClusterSliderOutOfRange { .. }
                | Error::SingleElementUnsupported { .. }
                | Error::ShapeNotInitialized
                | Error::UnknownProperty { .. }
                | Error::InvalidProperty { .. }
        )
    }

    /// Defect-level failures that must abort the whole recomputation rather
    /// than degrade into a partial or substituted layout.
    pub fn is_data_inconsistency(&self) -> bool {
        matches!(
            self,
            Error::PositionCountMismatch { .. }
                | Error::GridCellMissing { .. }
                | Error::WorkerPanicked
        )
    }
}
