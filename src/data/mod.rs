//! Data module - CSV loading and schema validation

mod loader;

pub use loader::{
    flow_column_name, LoaderError, Record, ScoreTable, DIMENSIONS, FLOW_COLUMN_PREFIX,
    NAME_COLUMN, RADAR_AXES,
};
