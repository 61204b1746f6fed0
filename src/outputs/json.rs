//! JSON persistence for raw and intermediate data.
//!
//! Everything is written pretty-printed so snapshot files stay readable when
//! a run needs debugging. Timestamps serialize as RFC 3339 strings (chrono's
//! serde default), and [`load_json`] reproduces the persisted structure
//! exactly.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::PersistError;

/// Serialize `data` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), PersistError> {
    let body = serde_json::to_string_pretty(data).map_err(|source| PersistError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| PersistError::Io {
                path: path.to_path_buf(),
                source,
            })?;
    }

    fs::write(path, body)
        .await
        .map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!("wrote json file");
    Ok(())
}

/// Load a value previously written with [`save_json`].
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let body = fs::read_to_string(path)
        .await
        .map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&body).map_err(|source| PersistError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeywordSeries, TrendPoint};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_round_trip_preserves_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic_trends.json");

        let mut series = BTreeMap::new();
        series.insert(
            "ai".to_string(),
            KeywordSeries {
                keyword: "ai".to_string(),
                points: vec![
                    TrendPoint {
                        timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                        value: 42.0,
                    },
                    TrendPoint {
                        timestamp: Utc.timestamp_opt(1_700_086_400, 0).unwrap(),
                        value: 58.0,
                    },
                ],
            },
        );

        save_json(&path, &series).await.unwrap();
        let loaded: BTreeMap<String, KeywordSeries> = load_json(&path).await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["ai"].points, series["ai"].points);
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/topics.json");
        save_json(&path, &vec!["ai".to_string()]).await.unwrap();
        let loaded: Vec<String> = load_json(&path).await.unwrap();
        assert_eq!(loaded, vec!["ai".to_string()]);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_json::<Vec<String>>(&path).await.unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }

    #[tokio::test]
    async fn test_load_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        tokio::fs::write(&path, "not json at all").await.unwrap();
        let err = load_json::<Vec<String>>(&path).await.unwrap_err();
        assert!(matches!(err, PersistError::Decode { .. }));
    }
}
