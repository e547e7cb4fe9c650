//! The crop catalog: an immutable, validated table of crop varieties.
//!
//! A catalog is either the built-in table or loaded from a directory of YAML files
//! (`crops: [...]`). Every entry is validated before the catalog is handed out, so the
//! rest of the engine can rely on positive cycle lengths and yields and on every stage
//! carrying the targets the ramps and heuristics read.

use crate::error::MiraError;
use mira_schemas::{
    crop::{CropConfig, CropProfile, OptimalRanges, StageTargets},
    environment::SetValues,
    file_formats::CropFile,
    parameter::Parameter,
    plant::{GrowthStage, PlantStage},
};
use std::{collections::BTreeMap, fs, path::Path};

/// Targets every stage must define.
const REQUIRED_STAGE_TARGETS: [Parameter; 4] = [
    Parameter::Temperature,
    Parameter::RelativeHumidity,
    Parameter::Co2,
    Parameter::Ppfd,
];

#[derive(Debug, Clone)]
pub struct CropCatalog {
    crops: BTreeMap<String, CropConfig>,
}

impl CropCatalog {
    /// Builds a catalog from a list of crops, rejecting invalid or duplicate entries.
    pub fn from_crops(crops: Vec<CropConfig>) -> Result<Self, MiraError> {
        let mut map = BTreeMap::new();
        for crop in crops {
            validate_crop(&crop)?;
            if map.contains_key(&crop.id) {
                return Err(MiraError::InvalidCropConfig(
                    crop.id.clone(),
                    "duplicate crop id".to_string(),
                ));
            }
            map.insert(crop.id.clone(), crop);
        }
        Ok(Self { crops: map })
    }

    /// The lettuce / basil / strawberries table the demo ships with.
    pub fn builtin() -> Self {
        let crops = vec![lettuce(), basil(), strawberries()];
        Self {
            crops: crops.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    /// Loads all `.yaml` / `.yml` files in a directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, MiraError> {
        let dir = dir.as_ref();
        let dir_name = dir.display().to_string();
        let mut crops = Vec::new();

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| MiraError::FileIO(dir_name.clone(), e))? {
            let entry = entry.map_err(|e| MiraError::FileIO(dir_name.clone(), e))?;
            let path = entry.path();
            if path.is_file() && path.extension().map_or(false, |s| s == "yaml" || s == "yml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let path_name = path.display().to_string();
            let content =
                fs::read_to_string(&path).map_err(|e| MiraError::FileIO(path_name.clone(), e))?;
            let file: CropFile = serde_yaml::from_str(&content)
                .map_err(|e| MiraError::YamlParsing(path_name.clone(), e))?;
            log::debug!(
                "Loaded {} crop(s) from {} (schema {})",
                file.crops.len(),
                path_name,
                file.schema_version
            );
            crops.extend(file.crops);
        }

        if crops.is_empty() {
            return Err(MiraError::ConfigError(format!(
                "no crop definitions found in '{}'",
                dir_name
            )));
        }
        Self::from_crops(crops)
    }

    pub fn get(&self, id: &str) -> Result<&CropConfig, MiraError> {
        self.crops
            .get(id)
            .ok_or_else(|| MiraError::CropNotFound(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.crops.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CropConfig> {
        self.crops.values()
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }
}

pub fn validate_crop(crop: &CropConfig) -> Result<(), MiraError> {
    let invalid = |msg: String| MiraError::InvalidCropConfig(crop.id.clone(), msg);

    if crop.id.trim().is_empty() {
        return Err(invalid("crop id is empty".to_string()));
    }
    if crop.cycle_length == 0 {
        return Err(invalid("cycle_length must be greater than zero".to_string()));
    }
    if !(crop.target_yield.is_finite() && crop.target_yield > 0.0) {
        return Err(invalid(format!(
            "target_yield must be positive, got {}",
            crop.target_yield
        )));
    }
    for stage in GrowthStage::ALL {
        let targets = crop.optimal_ranges.for_stage(stage);
        for parameter in REQUIRED_STAGE_TARGETS {
            match targets.get(parameter) {
                Some(value) if value.is_finite() => {}
                _ => {
                    return Err(invalid(format!(
                        "{} stage is missing a {} target",
                        stage,
                        parameter.key()
                    )))
                }
            }
        }
    }
    Ok(())
}

fn stage(temperature: f64, relative_humidity: f64, ppfd: f64, ph: f64, ec: f64) -> StageTargets {
    StageTargets {
        temperature: Some(temperature),
        relative_humidity: Some(relative_humidity),
        co2: Some(450.0),
        ppfd: Some(ppfd),
        ph: Some(ph),
        ec: Some(ec),
        ..Default::default()
    }
}

fn initial_set_values(
    temperature: f64,
    relative_humidity: f64,
    vpd: f64,
    airflow_velocity: f64,
    solution_temperature: f64,
    ec: f64,
    ph: f64,
) -> SetValues {
    SetValues {
        temperature,
        relative_humidity,
        vpd,
        co2: 450.0,
        ppfd: 0.0,
        airflow_velocity,
        solution_temperature,
        ec,
        ph,
        stomata_openings: 60.0,
        photosynthesis_rate: 12.0,
    }
}

fn lettuce() -> CropConfig {
    CropConfig {
        id: "lettuce".to_string(),
        name: "Lettuce".to_string(),
        description: "Fast-growing leafy green, ideal for vertical farming".to_string(),
        cycle_length: 31,
        target_yield: 200.0,
        profile: CropProfile::LeafyGreen,
        initial_set_values: initial_set_values(20.0, 70.0, 0.8, 1.2, 18.0, 1.2, 6.0),
        initial_stage: PlantStage::default(),
        optimal_ranges: OptimalRanges {
            germination: stage(20.0, 80.0, 0.0, 6.0, 0.8),
            vegetative: stage(20.0, 70.0, 200.0, 6.0, 1.2),
            flowering: stage(18.0, 65.0, 300.0, 6.0, 1.0),
            fruiting: stage(18.0, 65.0, 350.0, 6.0, 1.0),
            harvest: stage(18.0, 60.0, 250.0, 6.0, 0.8),
        },
    }
}

fn basil() -> CropConfig {
    CropConfig {
        id: "basil".to_string(),
        name: "Basil".to_string(),
        description: "Aromatic herb requiring warm conditions and high light".to_string(),
        cycle_length: 31,
        target_yield: 80.0,
        profile: CropProfile::LeafyGreen,
        initial_set_values: initial_set_values(24.0, 65.0, 1.0, 1.5, 22.0, 1.8, 6.2),
        initial_stage: PlantStage::default(),
        optimal_ranges: OptimalRanges {
            germination: stage(24.0, 80.0, 0.0, 6.2, 1.0),
            vegetative: stage(24.0, 65.0, 300.0, 6.2, 1.8),
            flowering: stage(22.0, 60.0, 400.0, 6.0, 2.0),
            fruiting: stage(22.0, 60.0, 450.0, 6.0, 2.0),
            harvest: stage(20.0, 55.0, 200.0, 6.0, 1.0),
        },
    }
}

fn strawberries() -> CropConfig {
    CropConfig {
        id: "strawberries".to_string(),
        name: "Strawberries".to_string(),
        description: "Fruit crop requiring precise temperature and nutrient control".to_string(),
        cycle_length: 65,
        target_yield: 200.0,
        profile: CropProfile::Fruiting,
        initial_set_values: initial_set_values(22.0, 70.0, 0.8, 1.8, 20.0, 2.0, 6.0),
        initial_stage: PlantStage::default(),
        optimal_ranges: OptimalRanges {
            germination: stage(22.0, 85.0, 0.0, 6.0, 1.0),
            vegetative: stage(22.0, 70.0, 250.0, 6.0, 2.0),
            flowering: stage(20.0, 65.0, 400.0, 6.0, 2.2),
            fruiting: stage(20.0, 65.0, 500.0, 6.0, 2.2),
            harvest: stage(18.0, 60.0, 300.0, 6.0, 1.5),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = CropCatalog::builtin();
        assert_eq!(catalog.len(), 3);
        for crop in catalog.iter() {
            validate_crop(crop).unwrap();
        }
        assert_eq!(
            catalog.ids().collect::<Vec<_>>(),
            vec!["basil", "lettuce", "strawberries"]
        );
    }

    #[test]
    fn test_unknown_crop_is_an_error() {
        let catalog = CropCatalog::builtin();
        assert!(matches!(
            catalog.get("tomato"),
            Err(MiraError::CropNotFound(id)) if id == "tomato"
        ));
    }

    #[test]
    fn test_rejects_zero_cycle_length() {
        let mut crop = lettuce();
        crop.cycle_length = 0;
        assert!(matches!(
            CropCatalog::from_crops(vec![crop]),
            Err(MiraError::InvalidCropConfig(..))
        ));
    }

    #[test]
    fn test_rejects_non_positive_target_yield() {
        let mut crop = basil();
        crop.target_yield = -5.0;
        assert!(CropCatalog::from_crops(vec![crop]).is_err());
    }

    #[test]
    fn test_rejects_missing_stage_target() {
        let mut crop = strawberries();
        crop.optimal_ranges.fruiting.ppfd = None;
        let err = CropCatalog::from_crops(vec![crop]).unwrap_err();
        assert!(err.to_string().contains("fruiting"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        assert!(CropCatalog::from_crops(vec![lettuce(), lettuce()]).is_err());
    }

    #[test]
    fn test_load_dir_reads_yaml() {
        let dir = std::env::temp_dir().join(format!("mira-catalog-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let yaml = r#"
schema_version: "1"
crops:
  - id: microgreens
    name: Microgreens
    cycle_length: 12
    target_yield: 50.0
    profile: leafy_green
    initial_set_values:
      temperature: 21.0
      relative_humidity: 70.0
      vpd: 0.75
      co2: 450.0
      ppfd: 0.0
      airflow_velocity: 1.0
      solution_temperature: 19.0
      ec: 1.0
      ph: 6.0
      stomata_openings: 60.0
      photosynthesis_rate: 12.0
    optimal_ranges:
      germination: { temperature: 21, relative_humidity: 80, co2: 450, ppfd: 0 }
      vegetative: { temperature: 21, relative_humidity: 70, co2: 450, ppfd: 180 }
      flowering: { temperature: 20, relative_humidity: 65, co2: 450, ppfd: 200 }
      fruiting: { temperature: 20, relative_humidity: 65, co2: 450, ppfd: 200 }
      harvest: { temperature: 19, relative_humidity: 60, co2: 450, ppfd: 150 }
"#;
        fs::write(dir.join("greens.yaml"), yaml).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let catalog = CropCatalog::load_dir(&dir).unwrap();
        let crop = catalog.get("microgreens").unwrap();
        assert_eq!(crop.cycle_length, 12);
        assert_eq!(crop.initial_stage.stage, GrowthStage::Germination);
        assert_eq!(crop.optimal_ranges.vegetative.ec, None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_shipped_catalog_matches_builtin() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../data/crops");
        let shipped = CropCatalog::load_dir(dir).unwrap();
        let builtin = CropCatalog::builtin();
        assert_eq!(shipped.len(), builtin.len());
        for crop in builtin.iter() {
            assert_eq!(shipped.get(&crop.id).unwrap(), crop);
        }
    }
}
