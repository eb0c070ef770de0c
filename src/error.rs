//! Error types for each stage of the analysis pipeline.
//!
//! Every error here ends up as a visible message in the report; none of
//! them abort the session.

use thiserror::Error;

/// Failure to turn a file into a [`Table`](crate::data::model::Table).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("No columns to parse from file")]
    NoColumns,

    #[error("Error tokenizing data: expected {expected} fields in line {line}, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure while building indicator columns.
#[derive(Error, Debug, PartialEq)]
pub enum EncodeError {
    #[error("column '{0}' not found in the data")]
    MissingColumn(String),

    #[error("indicator column '{0}' already exists in the data")]
    NameCollision(String),
}

/// Column-role selection that violates a table invariant.
#[derive(Error, Debug, PartialEq)]
pub enum SelectionError {
    #[error("No result column selected")]
    NoResultColumn,

    #[error("Column '{0}' not found in the data")]
    UnknownColumn(String),

    #[error("Column '{0}' cannot be both the result and a predictor")]
    ResultIsPredictor(String),
}

/// Failure to prepare plot data.
#[derive(Error, Debug, PartialEq)]
pub enum PlotError {
    #[error("No discrete variable selected for hue in {0}.")]
    MissingHue(&'static str),

    #[error("Column '{0}' not found in the data")]
    UnknownColumn(String),

    #[error("No numerical variables selected for {0}.")]
    NoVariables(&'static str),
}

/// Failure to fit the feature-importance model.
#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("No predictor columns selected for the model")]
    NoFeatures,

    #[error("Cannot fit a model on an empty table")]
    EmptyInput,

    #[error("Model not fitted")]
    NotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Column '{0}' must be numeric without missing values to be used by the model")]
    NonNumericColumn(String),

    #[error("Column '{0}' not found in the data")]
    UnknownColumn(String),
}
