//! Configuration profile persistence
//!
//! Save/load/list/delete named port configurations as JSON files in a
//! caller-supplied directory, so a front-end can keep one profile per
//! device setup ("Lab bench COM3", "Modem 19200", ...).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::PortConfiguration;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("invalid profile name: {0}")]
    InvalidName(String),

    #[error("profile not found: {0}")]
    NotFound(String),

    #[error("profile storage error: {0}")]
    Storage(String),
}

/// Sanitize a profile name to prevent path traversal. Rejects anything
/// with path separators, "..", or characters outside alphanumerics,
/// spaces, hyphens, and underscores.
fn sanitize_name(name: &str) -> Result<String, ProfileError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::InvalidName("empty name".to_string()));
    }
    if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(ProfileError::InvalidName(trimmed.to_string()));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(ProfileError::InvalidName(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

fn profile_path(dir: &Path, name: &str) -> Result<PathBuf, ProfileError> {
    Ok(dir.join(format!("{}.json", sanitize_name(name)?)))
}

pub fn save(dir: &Path, name: &str, config: &PortConfiguration) -> Result<(), ProfileError> {
    let path = profile_path(dir, name)?;
    std::fs::create_dir_all(dir)
        .map_err(|e| ProfileError::Storage(format!("could not create {}: {e}", dir.display())))?;
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| ProfileError::Storage(format!("serialization error: {e}")))?;
    std::fs::write(&path, json)
        .map_err(|e| ProfileError::Storage(format!("could not write {}: {e}", path.display())))
}

pub fn load(dir: &Path, name: &str) -> Result<PortConfiguration, ProfileError> {
    let path = profile_path(dir, name)?;
    if !path.exists() {
        return Err(ProfileError::NotFound(name.trim().to_string()));
    }
    let json = std::fs::read_to_string(&path)
        .map_err(|e| ProfileError::Storage(format!("could not read {}: {e}", path.display())))?;
    serde_json::from_str(&json)
        .map_err(|e| ProfileError::Storage(format!("could not parse '{name}': {e}")))
}

pub fn list(dir: &Path) -> Result<Vec<String>, ProfileError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map_err(|e| ProfileError::Storage(format!("could not read {}: {e}", dir.display())))?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension()?.to_str()? == "json" {
                path.file_stem()?.to_str().map(String::from)
            } else {
                None
            }
        })
        .collect();
    names.sort();
    Ok(names)
}

pub fn delete(dir: &Path, name: &str) -> Result<(), ProfileError> {
    let path = profile_path(dir, name)?;
    if !path.exists() {
        return Err(ProfileError::NotFound(name.trim().to_string()));
    }
    std::fs::remove_file(&path)
        .map_err(|e| ProfileError::Storage(format!("could not delete {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Parity;

    #[test]
    fn sanitize_name_rejects_path_traversal() {
        assert!(sanitize_name("../evil").is_err());
        assert!(sanitize_name("foo/bar").is_err());
        assert!(sanitize_name("foo\\bar").is_err());
        assert!(sanitize_name("").is_err());
        assert!(sanitize_name("  ").is_err());
    }

    #[test]
    fn sanitize_name_accepts_valid_names() {
        assert_eq!(sanitize_name("Default").unwrap(), "Default");
        assert_eq!(sanitize_name("Lab bench COM3").unwrap(), "Lab bench COM3");
        assert_eq!(sanitize_name("modem_19200-v2").unwrap(), "modem_19200-v2");
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PortConfiguration::for_port("COM4");
        config.baud_rate = 19_200;
        config.parity = Parity::Even;

        save(dir.path(), "Modem 19200", &config).unwrap();
        let back = load(dir.path(), "Modem 19200").unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn list_returns_sorted_profile_names() {
        let dir = tempfile::tempdir().unwrap();
        let config = PortConfiguration::default();
        save(dir.path(), "beta", &config).unwrap();
        save(dir.path(), "alpha", &config).unwrap();
        assert_eq!(list(dir.path()).unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn list_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nothing-here");
        assert!(list(&missing).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_the_profile() {
        let dir = tempfile::tempdir().unwrap();
        save(dir.path(), "gone", &PortConfiguration::default()).unwrap();
        delete(dir.path(), "gone").unwrap();
        assert!(matches!(
            load(dir.path(), "gone"),
            Err(ProfileError::NotFound(_))
        ));
    }

    #[test]
    fn delete_of_missing_profile_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            delete(dir.path(), "never-saved"),
            Err(ProfileError::NotFound(_))
        ));
    }
}
