use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use trekday_engine::{Itinerary, ItineraryConfig, ItineraryLoader, SelectionEngine};

/// Sample itinerary used when no `--itinerary` is given.
pub const SAMPLE_ITINERARY: &str =
    include_str!("../../../assets/itineraries/alpine-traverse.json");

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads `<root>/<itinerary_id>.json` from disk.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, itinerary_id: &str) -> PathBuf {
        self.root.join(format!("{itinerary_id}.json"))
    }
}

impl ItineraryLoader for FileLoader {
    type Error = LoadError;

    fn load_itinerary_config(&self, itinerary_id: &str) -> Result<ItineraryConfig, Self::Error> {
        let path = self.path_for(itinerary_id);
        let json = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        ItineraryConfig::from_json(&json).map_err(|source| LoadError::Parse { path, source })
    }
}

/// Load the itinerary at `path`, or the embedded sample when `path` is `None`.
pub fn load_itinerary(path: Option<&Path>) -> Result<Itinerary> {
    let Some(path) = path else {
        return Itinerary::from_json(SAMPLE_ITINERARY).context("embedded sample itinerary");
    };
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let id = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("invalid itinerary path {}", path.display()))?;
    let engine = SelectionEngine::new(FileLoader::new(root));
    let itinerary = engine
        .open(id)
        .with_context(|| format!("failed to load itinerary {}", path.display()))?;
    log::info!(
        "loaded itinerary '{}' with {} days from {}",
        itinerary.name(),
        itinerary.catalog().len(),
        path.display()
    );
    Ok(itinerary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "trekday-loader-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn embedded_sample_loads() {
        let itinerary = load_itinerary(None).unwrap();
        assert_eq!(itinerary.name(), "Alpine Traverse 2025");
        assert_eq!(itinerary.catalog().len(), 13);
    }

    #[test]
    fn file_loader_reads_by_id() {
        let dir = temp_dir("read");
        fs::write(
            dir.join("mini.json"),
            r#"{"name": "mini", "days": [{"day_number": 1}, {"day_number": 2}]}"#,
        )
        .unwrap();
        let itinerary = load_itinerary(Some(&dir.join("mini.json"))).unwrap();
        assert_eq!(itinerary.name(), "mini");
        assert_eq!(itinerary.catalog().len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = temp_dir("missing");
        let err = FileLoader::new(&dir)
            .load_itinerary_config("absent")
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = temp_dir("parse");
        fs::write(dir.join("broken.json"), "{ days: ").unwrap();
        let err = FileLoader::new(&dir)
            .load_itinerary_config("broken")
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
