//! Qualified resources: files whose names carry a typed qualifier set.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::qualifiers::{
    parse_qualifiers, to_qualified_string, Density, QualifierError, QualifierKind, QualifierMap,
};

/// Output directory family a rendered resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Regular drawable resources.
    Drawable,
    /// Launcher icon resources.
    Mipmap,
}

impl OutputKind {
    /// Directory name prefix for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Drawable => "drawable",
            OutputKind::Mipmap => "mipmap",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "drawable" => Ok(OutputKind::Drawable),
            "mipmap" => Ok(OutputKind::Mipmap),
            other => Err(format!("unrecognized output kind `{other}`")),
        }
    }
}

/// A file with an unqualified base name, a typed qualifier set and a
/// mandatory density. Immutable once constructed; the masking engine creates
/// synthetic instances with a derived timestamp.
#[derive(Debug, Clone)]
pub struct QualifiedResource {
    path: PathBuf,
    name: String,
    qualifiers: QualifierMap,
    density: Density,
    last_modified: SystemTime,
}

impl QualifiedResource {
    /// Parse a qualified resource from an input file path.
    ///
    /// The file stem must consist of a `\w+` base name, a `-` separator and
    /// at least one qualifier segment including a density. The modification
    /// timestamp is read from the filesystem and falls back to the epoch when
    /// unavailable.
    pub fn from_path(path: &Path) -> Result<Self, QualifierError> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| QualifierError::UnusableFileName(path.to_path_buf()))?;

        let (name, qualifier_part) = stem
            .split_once('-')
            .ok_or_else(|| QualifierError::MalformedResourceName(stem.to_string()))?;
        if name.is_empty()
            || qualifier_part.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(QualifierError::MalformedResourceName(stem.to_string()));
        }

        let qualifiers = parse_qualifiers(stem, qualifier_part)?;
        let density = qualifiers
            .get(&QualifierKind::Density)
            .ok_or_else(|| QualifierError::MissingDensityQualifier(stem.to_string()))?
            .parse::<Density>()
            .map_err(|err| QualifierError::UnknownQualifier {
                name: stem.to_string(),
                segment: err.0,
            })?;

        let last_modified = fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        Ok(Self {
            path: path.to_path_buf(),
            name: name.to_string(),
            qualifiers,
            density,
            last_modified,
        })
    }

    /// Construct a synthetic resource with an explicit density and timestamp,
    /// as produced by the masking engine for composite outputs.
    pub(crate) fn with_density(
        path: PathBuf,
        name: String,
        mut qualifiers: QualifierMap,
        density: Density,
        last_modified: SystemTime,
    ) -> Self {
        qualifiers.insert(QualifierKind::Density, density.to_string());
        Self {
            path,
            name,
            qualifiers,
            density,
            last_modified,
        }
    }

    /// File system path of this resource.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unqualified base name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed qualifier set, density included.
    pub fn qualifiers(&self) -> &QualifierMap {
        &self.qualifiers
    }

    /// Density bucket extracted from the qualifier set.
    pub fn density(&self) -> Density {
        self.density
    }

    /// Modification timestamp; for composite resources the maximum over the
    /// mask and every chosen candidate.
    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    /// Destination directory for rendering this resource at `density`: the
    /// qualifier set with its density replaced, serialized canonically and
    /// prefixed with the output kind tag, joined onto `dest`.
    pub fn output_for(&self, density: Density, dest: &Path, kind: OutputKind) -> PathBuf {
        let mut qualifiers = self.qualifiers.clone();
        qualifiers.insert(QualifierKind::Density, density.to_string());
        dest.join(format!("{}{}", kind, to_qualified_string(&qualifiers)))
    }
}

impl std::fmt::Display for QualifiedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path.file_name().and_then(|name| name.to_str()) {
            Some(file_name) => f.write_str(file_name),
            None => write!(f, "{}", self.path.display()),
        }
    }
}
