use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Missing column: '{column}'")]
    MissingColumn { column: String },

    #[error("Row {row}: column '{column}' has invalid value '{value}'")]
    InvalidNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: product name is empty")]
    EmptyProductName { row: usize },

    #[error("Arithmetic overflow computing {0}")]
    Overflow(String),

    #[error("Sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] calamine::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
