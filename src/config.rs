//! Project configuration loader describing the bundler's directory layout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::overrides::OverrideMode;
use crate::qualifiers::Density;
use crate::resource::OutputKind;

const DEFAULT_CONFIG_FILE: &str = "svgbundler.config.json";

/// Discoverable project configuration. Every field has a default so a
/// project without a configuration file still builds with sensible
/// assumptions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    /// Directory containing plain qualified SVG sources.
    pub sources_dir: String,
    /// Directory containing `*.svgmask` templates.
    pub masks_dir: String,
    /// Optional directory of resources used to fill mask slots; defaults to
    /// the sources directory.
    pub mask_resources_dir: Option<String>,
    /// Directory where generated composite SVG files are written.
    pub masked_svg_dir: String,
    /// Root of the per-density output directories.
    pub output_dir: String,
    /// Output directory family (`drawable` or `mipmap`).
    pub output_kind: OutputKind,
    /// Densities to plan outputs for.
    pub densities: Vec<Density>,
    /// Discard mask combinations that select the same source file for more
    /// than one slot.
    pub use_same_svg_only_once: bool,
    /// Policy deciding whether existing outputs are regenerated.
    pub override_mode: OverrideMode,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            sources_dir: "svg".into(),
            masks_dir: "svgmask".into(),
            mask_resources_dir: None,
            masked_svg_dir: "target/generated-svg".into(),
            output_dir: "res".into(),
            output_kind: OutputKind::Drawable,
            densities: vec![
                Density::Mdpi,
                Density::Hdpi,
                Density::Xhdpi,
                Density::Xxhdpi,
            ],
            use_same_svg_only_once: false,
            override_mode: OverrideMode::Always,
        }
    }
}

impl BundlerConfig {
    /// Attempt to load configuration from the provided project root.
    ///
    /// When the configuration file does not exist or fails to parse we fall
    /// back to default values so downstream callers can continue operating.
    pub fn discover(root: &Path) -> Self {
        let candidate = root.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Path to the plain sources directory.
    pub fn sources_path(&self, root: &Path) -> PathBuf {
        root.join(&self.sources_dir)
    }

    /// Path to the mask templates directory.
    pub fn masks_path(&self, root: &Path) -> PathBuf {
        root.join(&self.masks_dir)
    }

    /// Path to the directory mask slots are resolved against.
    pub fn mask_resources_path(&self, root: &Path) -> PathBuf {
        match &self.mask_resources_dir {
            Some(dir) => root.join(dir),
            None => self.sources_path(root),
        }
    }

    /// Path composite SVG files are written to.
    pub fn masked_svg_path(&self, root: &Path) -> PathBuf {
        root.join(&self.masked_svg_dir)
    }

    /// Root of the per-density output directories.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }
}
