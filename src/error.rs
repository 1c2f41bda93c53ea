use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing mandatory column '{0}' (tried: {1})")]
    MissingMandatoryColumn(String, String),

    #[error("No dataset found. Pass --csv or place one of these files here: {0}")]
    DatasetNotFound(String),

    #[error("The champion column is empty")]
    EmptyDataset,

    #[error("Champion not found in dataset: {0}")]
    ChampionNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}
