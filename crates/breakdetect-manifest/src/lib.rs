//! breakdetect configuration
//!
//! Parses `breakdetect.toml`, which holds the batch settings, the analysis tolerance
//! and the ordered list of instrumented parts making up the network.

pub mod error;
pub mod manifest;

pub use error::{ManifestError, Result};
pub use manifest::{AnalysisSection, Manifest, SimulationSection, DEFAULT_MANIFEST_NAME};

use std::path::Path;

/// Parse a manifest from a file path
pub fn from_path(path: impl AsRef<Path>) -> Result<Manifest> {
    let contents =
        std::fs::read_to_string(path.as_ref()).map_err(|e| ManifestError::Io(e.to_string()))?;
    from_str(&contents)
}

/// Parse a manifest from a string
pub fn from_str(s: &str) -> Result<Manifest> {
    toml::from_str(s).map_err(|e| ManifestError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_manifest_parse() {
        let toml = r#"
            [simulation]
            simulations = 250

            [[parts]]
            mttf = 15.0
            resistance = 1000.0
        "#;

        let manifest = from_str(toml).unwrap();
        assert_eq!(manifest.simulation.simulations, 250);
        assert_eq!(manifest.parts.len(), 1);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        let err = from_str("[simulation\nsimulations = 1").unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = from_path("does/not/exist/breakdetect.toml").unwrap_err();
        assert!(matches!(err, ManifestError::Io(_)));
    }
}
