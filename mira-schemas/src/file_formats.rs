use crate::crop::CropConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CropFile {
    pub schema_version: String,
    pub crops: Vec<CropConfig>,
}
