//! Policies deciding whether an existing output must be regenerated.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::resource::QualifiedResource;

/// Decision contract consulted before (re)writing an output file.
///
/// `true` means the output must be (re)written; `false` means the existing
/// output is reused without writing. `rendered` carries the rendered bytes
/// when the caller already has them, allowing content-aware policies.
pub trait OverrideDecision {
    /// Decide whether `destination` must be regenerated for `resource`.
    fn should_override(
        &self,
        resource: &QualifiedResource,
        destination: &Path,
        rendered: Option<&[u8]>,
    ) -> bool;
}

/// Built-in override policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverrideMode {
    /// Always regenerate outputs.
    Always,
    /// Regenerate when the destination is missing or older than the source.
    IfModified,
    /// Only generate outputs that do not exist yet.
    Never,
}

impl OverrideDecision for OverrideMode {
    fn should_override(
        &self,
        resource: &QualifiedResource,
        destination: &Path,
        _rendered: Option<&[u8]>,
    ) -> bool {
        match self {
            OverrideMode::Always => true,
            OverrideMode::Never => !destination.exists(),
            OverrideMode::IfModified => {
                match fs::metadata(destination).and_then(|metadata| metadata.modified()) {
                    Ok(existing) => resource.last_modified() > existing,
                    Err(_) => true,
                }
            }
        }
    }
}

impl FromStr for OverrideMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "always" => Ok(OverrideMode::Always),
            "ifModified" | "if-modified" => Ok(OverrideMode::IfModified),
            "never" => Ok(OverrideMode::Never),
            other => Err(format!("unrecognized override mode `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn resource(dir: &Path, file_name: &str) -> QualifiedResource {
        let path = dir.join(file_name);
        fs::write(&path, "<svg/>").unwrap();
        QualifiedResource::from_path(&path).unwrap()
    }

    #[test]
    fn always_regenerates_existing_outputs() {
        let temp = tempdir().unwrap();
        let source = resource(temp.path(), "icon-mdpi.svg");
        let destination = temp.path().join("out.svg");
        fs::write(&destination, "old").unwrap();

        assert!(OverrideMode::Always.should_override(&source, &destination, None));
    }

    #[test]
    fn never_only_generates_missing_outputs() {
        let temp = tempdir().unwrap();
        let source = resource(temp.path(), "icon-mdpi.svg");
        let missing = temp.path().join("missing.svg");
        let existing = temp.path().join("existing.svg");
        fs::write(&existing, "old").unwrap();

        assert!(OverrideMode::Never.should_override(&source, &missing, None));
        assert!(!OverrideMode::Never.should_override(&source, &existing, None));
    }

    #[test]
    fn if_modified_compares_timestamps() {
        let temp = tempdir().unwrap();
        let source = resource(temp.path(), "icon-mdpi.svg");

        assert!(
            OverrideMode::IfModified.should_override(&source, &PathBuf::from("/nope/out.svg"), None)
        );

        // Written after the source, so the destination is at least as fresh.
        let fresh_destination = temp.path().join("out.svg");
        fs::write(&fresh_destination, "new").unwrap();
        assert!(!OverrideMode::IfModified.should_override(&source, &fresh_destination, None));
    }

    #[test]
    fn parses_configuration_spellings() {
        assert_eq!("always".parse::<OverrideMode>().unwrap(), OverrideMode::Always);
        assert_eq!(
            "ifModified".parse::<OverrideMode>().unwrap(),
            OverrideMode::IfModified
        );
        assert_eq!(
            "if-modified".parse::<OverrideMode>().unwrap(),
            OverrideMode::IfModified
        );
        assert!("sometimes".parse::<OverrideMode>().is_err());
    }
}
