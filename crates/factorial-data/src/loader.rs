//! Shared loading plumbing: format detection, deserialization and name
//! resolution helpers used by the catalog and plan loaders.

use factorial_planner::catalog::{suggestions, CatalogError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}, similar: {suggestions:?}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
        suggestions: Vec<String>,
    },

    /// An item stack with neither `amount` nor `minimum_resource_amount`.
    #[error("item stack '{item}' in {file} has no amount")]
    MissingAmount { file: PathBuf, item: String },

    /// The catalog rejected the loaded content, or a plan named something
    /// the catalog doesn't have.
    #[error("{file}: {source}")]
    Catalog {
        file: PathBuf,
        #[source]
        source: CatalogError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in the given format. `file` only labels errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error with
/// similarly named entries if not found.
pub fn resolve_name<V: Copy>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<V, DataLoadError> {
    map.get(name).copied().ok_or_else(|| {
        let mut similar = suggestions(name, map.keys());
        similar.sort();
        DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind,
            suggestions: similar,
        }
    })
}

/// Attach the file a catalog error came from.
pub fn in_file(file: &Path) -> impl Fn(CatalogError) -> DataLoadError + '_ {
    move |source| DataLoadError::Catalog {
        file: file.to_path_buf(),
        source,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        items: Vec<Named>,
    }

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "factorial_data_loader_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("plan.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("plan.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("data.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["plan.yaml", "plan"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // deserialize_file
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_file_in_each_format() {
        let dir = make_test_dir("each_format");
        fs::write(
            dir.join("a.ron"),
            r#"(items: [(name: "iron-plate"), (name: "copper-plate")])"#,
        )
        .unwrap();
        fs::write(
            dir.join("a.json"),
            r#"{"items": [{"name": "iron-plate"}, {"name": "copper-plate"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.join("a.toml"),
            "[[items]]\nname = \"iron-plate\"\n\n[[items]]\nname = \"copper-plate\"\n",
        )
        .unwrap();

        for ext in ["ron", "json", "toml"] {
            let wrapper: Wrapper = deserialize_file(&dir.join(format!("a.{ext}"))).unwrap();
            assert_eq!(wrapper.items.len(), 2, "{ext}");
            assert_eq!(wrapper.items[1].name, "copper-plate", "{ext}");
        }

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_parse_error_names_file() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<Wrapper, _> = deserialize_file(&path);
        match result {
            Err(DataLoadError::Parse { file, .. }) => assert_eq!(file, path),
            other => panic!("expected Parse, got: {other:?}"),
        }

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_missing_is_io() {
        let result: Result<Wrapper, _> =
            deserialize_file(Path::new("/definitely/not/here/plan.json"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
    }

    // -----------------------------------------------------------------------
    // resolve_name
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_name_found() {
        let mut map = HashMap::new();
        map.insert("iron-plate".to_string(), 7u32);
        let val = resolve_name(&map, "iron-plate", Path::new("data.json"), "item").unwrap();
        assert_eq!(val, 7);
    }

    #[test]
    fn resolve_name_missing_suggests() {
        let map: HashMap<String, u32> = ["iron-plate", "iron-ore", "copper-cable"]
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), i as u32))
            .collect();
        match resolve_name(&map, "iron-gear", Path::new("data.json"), "item") {
            Err(DataLoadError::UnresolvedRef {
                name,
                expected_kind,
                suggestions,
                ..
            }) => {
                assert_eq!(name, "iron-gear");
                assert_eq!(expected_kind, "item");
                assert_eq!(suggestions, vec!["iron-ore", "iron-plate"]);
            }
            other => panic!("expected UnresolvedRef, got: {other:?}"),
        }
    }

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::Parse {
            file: PathBuf::from("bad.ron"),
            detail: "syntax error".to_string(),
        };
        assert!(e.to_string().contains("bad.ron"));
        assert!(e.to_string().contains("syntax error"));

        let e = in_file(Path::new("plan.toml"))(CatalogError::DuplicateName {
            kind: "item",
            name: "pipe".to_string(),
        });
        let msg = e.to_string();
        assert!(msg.starts_with("plan.toml: "), "got: {msg}");
        assert!(msg.contains("pipe"), "got: {msg}");
    }
}
