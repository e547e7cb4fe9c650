use mira_schemas::parameter::Parameter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiraError {
    #[error("Crop '{0}' not found in catalog")]
    CropNotFound(String),

    #[error("No crop was provided for the simulation")]
    CropNotDefined,

    #[error("Invalid crop configuration for '{0}': {1}")]
    InvalidCropConfig(String, String),

    #[error("Parameter '{0}' cannot be set directly")]
    ReadOnlyParameter(Parameter),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("An error occurred during logging: {0}")]
    LoggingError(#[from] anyhow::Error),
}
