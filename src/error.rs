use thiserror::Error;

/// A column mapping that cannot drive the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("unknown field '{0}' in column mapping")]
    UnknownField(String),
    #[error("required field '{0}' is not mapped to any column")]
    RequiredFieldUnbound(&'static str),
    #[error("field '{0}' appears more than once in column mapping")]
    DuplicateField(&'static str),
    #[error("field '{field}' is mapped to column '{column}', which is not in the file")]
    ColumnNotFound { field: &'static str, column: String },
}

/// Fatal input failures. Row-level problems are counted, not raised.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unreadable spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("spreadsheet has no worksheets")]
    NoWorksheet,
    #[error(transparent)]
    Mapping(#[from] MappingError),
}
