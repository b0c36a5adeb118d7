//! Configuration loading.
//!
//! Configuration types live next to the code that uses them; this module only
//! turns JSON text or files into those types.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

/// Parses a configuration value from a JSON string.
///
/// `origin` names the source in error messages.
pub fn from_json_str<T: DeserializeOwned>(text: &str, origin: &Path) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::Config {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}

/// Reads and parses a JSON configuration file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`] if
/// its contents do not match `T`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading config from {:?}", path);
    let text = std::fs::read_to_string(path)?;
    from_json_str(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        frames: u32,
        #[serde(default)]
        label: String,
    }

    #[test]
    fn test_from_json_str_applies_defaults() {
        let sample: Sample = from_json_str(r#"{ "frames": 3 }"#, Path::new("inline")).unwrap();
        assert_eq!(
            sample,
            Sample {
                frames: 3,
                label: String::new()
            }
        );
    }

    #[test]
    fn test_from_json_str_reports_origin() {
        let err = from_json_str::<Sample>("{ \"frames\": \"x\" }", Path::new("demo.json"))
            .unwrap_err();
        match err {
            Error::Config { path, .. } => assert_eq!(path, Path::new("demo.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_json_missing_file_is_io_error() {
        let err = load_json::<Sample>(Path::new("/nonexistent/hamlet.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
