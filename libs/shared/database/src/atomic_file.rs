use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Reads and deserializes a JSON document. Returns `Ok(None)` if the file
/// does not exist yet (first run) rather than treating it as an error.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Option<T>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => {
            let value = serde_json::from_str(&contents)
                .with_context(|| format!("parsing JSON store at {}", path.display()))?;
            Ok(Some(value))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading JSON store at {}", path.display())),
    }
}

/// Serializes `value` and replaces the file at `path` atomically: write to a
/// sibling temp file, `fsync`, then rename over the destination. A crash
/// mid-write leaves the old file intact rather than a truncated one.
pub fn write_json_atomic<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating parent directory for {}", path.display()))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let serialized = serde_json::to_vec_pretty(value).context("serializing JSON store")?;

    {
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("creating temp file {}", tmp_path.display()))?;
        file.write_all(&serialized)
            .with_context(|| format!("writing temp file {}", tmp_path.display()))?;
        file.sync_all().ok();
    }

    fs::rename(&tmp_path, path).with_context(|| {
        format!("renaming {} over {}", tmp_path.display(), path.display())
    })?;

    Ok(())
}

/// Best-effort read used on the non-fatal-for-reads path (spec.md §4.G
/// Failure semantics): IO failures log and fall back to an empty default
/// rather than propagating.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> T {
    let path = path.as_ref();
    match read_json::<T>(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            warn!("failed to load store at {}: {err:#} - starting from empty state", path.display());
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
    struct Doc {
        items: Vec<String>,
    }

    #[test]
    fn round_trips_through_atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let doc = Doc { items: vec!["a".into(), "b".into()] };

        write_json_atomic(&path, &doc).unwrap();
        let loaded: Doc = read_json(&path).unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let loaded: Option<Doc> = read_json(&path).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn default_fallback_survives_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        fs::write(&path, b"{not json").unwrap();
        let loaded: Doc = read_json_or_default(&path);
        assert_eq!(loaded, Doc::default());
    }
}
