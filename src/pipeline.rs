//! Orchestrates scanning, mask expansion and per-density output planning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::BundlerConfig;
use crate::discovery::{scan_qualified_files, RejectedFile};
use crate::mask::{MaskError, SvgMask};
use crate::qualifiers::Density;
use crate::resource::QualifiedResource;

/// A mask whose processing failed. Failures never abort other masks.
#[derive(Debug)]
pub struct FailedMask {
    /// Mask template path.
    pub path: PathBuf,
    /// Why processing failed.
    pub error: MaskError,
}

/// One planned rendering target for a resource at a specific density.
#[derive(Debug)]
pub struct PlannedOutput {
    /// Source resource file name.
    pub resource: String,
    /// Target density for this output.
    pub density: Density,
    /// Destination directory derived from the resource's qualifiers.
    pub destination: PathBuf,
}

/// Aggregated outcome of one bundler run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Full resource pool handed to the rendering stage: plain sources plus
    /// generated composite resources, in deterministic order.
    pub resources: Vec<QualifiedResource>,
    /// Number of composite resources generated by masks.
    pub generated: usize,
    /// Input files rejected by the qualifier parser.
    pub rejected: Vec<RejectedFile>,
    /// Masks that failed to parse or write.
    pub failed_masks: Vec<FailedMask>,
    /// Masks that processed cleanly but produced no composite resources
    /// (no placeholders, an unmatched slot, or every combination filtered).
    pub masks_without_output: Vec<PathBuf>,
    /// Per-density destinations for every resource in the pool.
    pub planned_outputs: Vec<PlannedOutput>,
}

/// Run the bundler against a project root: discover qualified sources,
/// expand every mask and plan the per-density outputs.
///
/// Per-file and per-mask failures are collected in the report; only
/// infrastructure failures (an unreadable sources directory, say) abort the
/// run.
pub fn run(root: &Path, config: &BundlerConfig) -> Result<PipelineReport> {
    let sources_dir = config.sources_path(root);
    let sources = scan_qualified_files(&sources_dir, "svg")
        .with_context(|| format!("failed to scan sources in {}", sources_dir.display()))?;

    let mask_resources_dir = config.mask_resources_path(root);
    let mask_pool = if mask_resources_dir == sources_dir {
        sources.resources.clone()
    } else {
        scan_qualified_files(&mask_resources_dir, "svg")
            .with_context(|| {
                format!(
                    "failed to scan mask resources in {}",
                    mask_resources_dir.display()
                )
            })?
            .resources
    };

    let masks_dir = config.masks_path(root);
    let masks = scan_qualified_files(&masks_dir, "svgmask")
        .with_context(|| format!("failed to scan masks in {}", masks_dir.display()))?;

    let mut report = PipelineReport {
        resources: sources.resources,
        ..PipelineReport::default()
    };
    report.rejected = sources.rejected;
    report.rejected.extend(masks.rejected);

    let masked_dir = config.masked_svg_path(root);
    for mask_resource in masks.resources {
        let mask_path = mask_resource.path().to_path_buf();
        let generated = SvgMask::parse(mask_resource).and_then(|mask| {
            mask.generate(
                &masked_dir,
                &mask_pool,
                config.use_same_svg_only_once,
                &config.override_mode,
            )
        });
        match generated {
            Ok(composites) => {
                if composites.is_empty() {
                    report.masks_without_output.push(mask_path);
                } else {
                    info!(
                        mask = %mask_path.display(),
                        count = composites.len(),
                        "expanded mask template"
                    );
                    report.generated += composites.len();
                    report.resources.extend(composites);
                }
            }
            Err(error) => {
                warn!(mask = %mask_path.display(), %error, "mask processing failed");
                report.failed_masks.push(FailedMask {
                    path: mask_path,
                    error,
                });
            }
        }
    }

    let output_dir = config.output_path(root);
    for resource in &report.resources {
        for &density in &config.densities {
            report.planned_outputs.push(PlannedOutput {
                resource: resource.to_string(),
                density,
                destination: resource.output_for(density, &output_dir, config.output_kind),
            });
        }
    }

    info!(
        resources = report.resources.len(),
        generated = report.generated,
        rejected = report.rejected.len(),
        failed_masks = report.failed_masks.len(),
        planned_outputs = report.planned_outputs.len(),
        "bundler run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn svg_body() -> &'static str {
        r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="1" height="1"/></svg>"#
    }

    fn mask_body(patterns: &[&str]) -> String {
        let mut images = String::new();
        for pattern in patterns {
            images.push_str(&format!(
                r##"<image xlink:href="#{{{pattern}}}" x="0" y="0"/>"##
            ));
        }
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">{images}</svg>"#
        )
    }

    #[test]
    fn aggregates_sources_masks_and_planned_outputs() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("svg")).unwrap();
        fs::create_dir_all(root.join("svgmask")).unwrap();

        fs::write(root.join("svg/flag_fr-land-mdpi.svg"), svg_body()).unwrap();
        fs::write(root.join("svg/flag_de-land-mdpi.svg"), svg_body()).unwrap();
        fs::write(root.join("svg/broken.svg"), svg_body()).unwrap();
        fs::write(
            root.join("svgmask/pin-land-hdpi.svgmask"),
            mask_body(&["flag_.*"]),
        )
        .unwrap();

        let config = BundlerConfig {
            densities: vec![Density::Mdpi, Density::Hdpi],
            ..BundlerConfig::default()
        };
        let report = run(root, &config).unwrap();

        // Two plain sources plus one composite per flag.
        assert_eq!(report.generated, 2);
        assert_eq!(report.resources.len(), 4);
        assert_eq!(report.rejected.len(), 1);
        assert!(report.failed_masks.is_empty());
        assert_eq!(report.planned_outputs.len(), 4 * 2);

        let generated: Vec<&QualifiedResource> = report
            .resources
            .iter()
            .filter(|resource| resource.name().starts_with("pin_"))
            .collect();
        assert_eq!(generated.len(), 2);
        // Scan order is sorted, so `flag_de` precedes `flag_fr`.
        assert_eq!(generated[0].to_string(), "pin_flag_de-land-hdpi.svg");
        assert_eq!(generated[1].to_string(), "pin_flag_fr-land-hdpi.svg");
        assert!(generated[0].path().exists());
    }

    #[test]
    fn unparseable_masks_are_reported_but_do_not_abort() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("svg")).unwrap();
        fs::create_dir_all(root.join("svgmask")).unwrap();

        fs::write(root.join("svg/dot-mdpi.svg"), svg_body()).unwrap();
        fs::write(root.join("svgmask/bad-mdpi.svgmask"), "<svg").unwrap();
        fs::write(
            root.join("svgmask/good-mdpi.svgmask"),
            mask_body(&["dot"]),
        )
        .unwrap();

        let report = run(root, &BundlerConfig::default()).unwrap();
        assert_eq!(report.failed_masks.len(), 1);
        assert!(matches!(
            report.failed_masks[0].error,
            MaskError::TemplateParse { .. }
        ));
        assert_eq!(report.generated, 1);
    }

    #[test]
    fn masks_without_matches_are_soft_skipped() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("svg")).unwrap();
        fs::create_dir_all(root.join("svgmask")).unwrap();

        fs::write(root.join("svg/dot-mdpi.svg"), svg_body()).unwrap();
        fs::write(
            root.join("svgmask/empty-mdpi.svgmask"),
            mask_body(&["nomatch_.*"]),
        )
        .unwrap();

        let report = run(root, &BundlerConfig::default()).unwrap();
        assert!(report.failed_masks.is_empty());
        assert_eq!(report.generated, 0);
        assert_eq!(report.masks_without_output.len(), 1);
    }
}
