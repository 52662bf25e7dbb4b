use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResidencyStatsError {
    #[error("Could not extract a reporting period from filename: {0}")]
    UnrecognizedFilename(String),

    #[error("Invalid period label {0}: expected MM.YYYY")]
    InvalidPeriod(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook {0} contains no sheets")]
    EmptyWorkbook(String),

    #[error("No row containing marker '{0}' found")]
    AnchorNotFound(String),

    #[error("Cannot convert value '{value}' in column {column} to an integer count")]
    CellCoercion { column: usize, value: String },

    #[error("Sheet has no count column at position {0}")]
    MissingCountColumn(usize),

    #[error("Total mismatch for {country} in {period}: stored {stored:?}, expected {expected:?}")]
    TotalsMismatch {
        country: String,
        period: String,
        stored: crate::schema::CountRecord,
        expected: crate::schema::CountRecord,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ResidencyStatsError>;
