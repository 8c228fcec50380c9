//! Load and write parameter and override documents as JSON files

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use super::{ProjectParameters, RawParameters};
use crate::projection::OverrideMap;

#[derive(Error, Debug)]
pub enum ParamsFileError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn read(path: &Path) -> Result<String, ParamsFileError> {
    fs::read_to_string(path).map_err(|source| ParamsFileError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn write(path: &Path, contents: String) -> Result<(), ParamsFileError> {
    fs::write(path, contents).map_err(|source| ParamsFileError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_error(path: &Path) -> impl FnOnce(serde_json::Error) -> ParamsFileError {
    let path = path.display().to_string();
    move |source| ParamsFileError::Parse { path, source }
}

/// Load a (possibly partial or legacy) parameter document and sanitize it
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<ProjectParameters, ParamsFileError> {
    let path = path.as_ref();
    let raw: RawParameters = serde_json::from_str(&read(path)?).map_err(parse_error(path))?;
    Ok(raw.sanitize())
}

/// Write parameters in the saved-document field format
pub fn write_parameters<P: AsRef<Path>>(
    path: P,
    params: &ProjectParameters,
) -> Result<(), ParamsFileError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&RawParameters::from(params))
        .map_err(parse_error(path))?;
    write(path, json)
}

/// Load an override map keyed by zero-based month index
pub fn load_overrides<P: AsRef<Path>>(path: P) -> Result<OverrideMap, ParamsFileError> {
    let path = path.as_ref();
    OverrideMap::from_json_str(&read(path)?).map_err(parse_error(path))
}

/// Like [`load_overrides`], but a missing file is an empty map
pub fn load_overrides_or_default<P: AsRef<Path>>(path: P) -> Result<OverrideMap, ParamsFileError> {
    let path = path.as_ref();
    if path.exists() {
        load_overrides(path)
    } else {
        Ok(OverrideMap::new())
    }
}

pub fn write_overrides<P: AsRef<Path>>(
    path: P,
    overrides: &OverrideMap,
) -> Result<(), ParamsFileError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(overrides).map_err(parse_error(path))?;
    write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::OverrideField;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lease_roi_loader_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_parameters_round_trip_through_file() {
        let path = temp_path("params.json");
        let params = ProjectParameters {
            project_name: "Shop B".to_string(),
            contract_months: 36,
            ..Default::default()
        };

        write_parameters(&path, &params).unwrap();
        let loaded = load_parameters(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, params);
    }

    #[test]
    fn test_missing_override_file_is_empty() {
        let path = temp_path("does_not_exist.json");
        let overrides = load_overrides_or_default(&path).unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_overrides_round_trip_through_file() {
        let path = temp_path("overrides.json");
        let mut overrides = OverrideMap::new();
        overrides.apply(3, OverrideField::Income, "70000");

        write_overrides(&path, &overrides).unwrap();
        let loaded = load_overrides(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, overrides);
    }

    #[test]
    fn test_malformed_parameters_report_path() {
        let path = temp_path("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_parameters(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(matches!(err, ParamsFileError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
