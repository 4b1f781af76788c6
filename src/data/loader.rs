//! CSV Score Loader Module
//! Handles CSV file loading and schema validation using Polars.

use std::collections::HashSet;
use std::path::Path;

use polars::prelude::*;
use thiserror::Error;

/// Column holding the unique display label of each record.
pub const NAME_COLUMN: &str = "name";

/// Prefix of the five flow-diagram source columns (`sankey-<dimension>`).
pub const FLOW_COLUMN_PREFIX: &str = "sankey-";

/// Flow-diagram category dimensions, in node order.
pub const DIMENSIONS: [&str; 5] = [
    "Teaching Ability",
    "Professional Expertise",
    "Mentoring",
    "Career Development",
    "Community Impact",
];

/// Radar chart axes; these are also the names of the radar source columns.
pub const RADAR_AXES: [&str; 5] = [
    "Teaching Quality",
    "Innovation",
    "Communication",
    "Research",
    "Career Growth",
];

/// Name of the flow source column for a dimension.
pub fn flow_column_name(dimension: &str) -> String {
    format!("{FLOW_COLUMN_PREFIX}{dimension}")
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("column '{column}' has a missing or non-numeric value at row {row}")]
    BadValue { column: String, row: usize },
    #[error("record label at row {row} is empty")]
    EmptyLabel { row: usize },
    #[error("duplicate record label '{0}'")]
    DuplicateLabel(String),
}

/// One evaluated entity: a source row with its display label, the five
/// radar-axis scores, and the five per-dimension flow values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub label: String,
    pub radar: [f64; 5],
    pub flows: [f64; 5],
}

/// The loaded score table, in source row order. Read-only after load and
/// passed explicitly through each pipeline stage.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    records: Vec<Record>,
}

impl ScoreTable {
    /// Build a table from already-materialized records, enforcing the label
    /// invariants shared with the CSV path.
    pub fn from_records(records: Vec<Record>) -> Result<Self, LoaderError> {
        let mut seen = HashSet::new();
        for (row, record) in records.iter().enumerate() {
            if record.label.trim().is_empty() {
                return Err(LoaderError::EmptyLabel { row });
            }
            if !seen.insert(record.label.clone()) {
                return Err(LoaderError::DuplicateLabel(record.label.clone()));
            }
        }
        Ok(Self { records })
    }

    /// Load a scores CSV using Polars.
    pub fn load_csv(path: &Path) -> Result<Self, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        Self::from_dataframe(&df)
    }

    /// Validate the fixed schema and materialize one `Record` per row.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, LoaderError> {
        let labels = label_column(df)?;

        let radar_columns: Vec<Vec<f64>> = RADAR_AXES
            .iter()
            .map(|axis| numeric_column(df, axis))
            .collect::<Result<_, _>>()?;
        let flow_columns: Vec<Vec<f64>> = DIMENSIONS
            .iter()
            .map(|dim| numeric_column(df, &flow_column_name(dim)))
            .collect::<Result<_, _>>()?;

        let records = labels
            .into_iter()
            .enumerate()
            .map(|(row, label)| Record {
                label,
                radar: std::array::from_fn(|axis| radar_columns[axis][row]),
                flows: std::array::from_fn(|dim| flow_columns[dim][row]),
            })
            .collect();

        Self::from_records(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn label_column(df: &DataFrame) -> Result<Vec<String>, LoaderError> {
    let column = df
        .column(NAME_COLUMN)
        .map_err(|_| LoaderError::MissingColumn(NAME_COLUMN.to_string()))?;
    let series = column.as_materialized_series();

    let mut labels = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let value = series.get(row)?;
        if value.is_null() {
            return Err(LoaderError::EmptyLabel { row });
        }
        labels.push(value.to_string().trim_matches('"').trim().to_string());
    }
    Ok(labels)
}

/// Extract a required numeric column as f64, rejecting nulls and values
/// that do not cast cleanly.
fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, LoaderError> {
    let column = df
        .column(name)
        .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
    let casted = column.cast(&DataType::Float64)?;
    let values = casted.f64()?;

    let mut out = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        match values.get(row) {
            Some(v) if v.is_finite() => out.push(v),
            _ => {
                return Err(LoaderError::BadValue {
                    column: name.to_string(),
                    row,
                })
            }
        }
    }
    Ok(out)
}
