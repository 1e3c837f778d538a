//! Masking engine: expands SVG mask templates into composite resources.
//!
//! A mask is a qualified `*.svgmask` resource whose document contains
//! `<image>` elements referencing other resources through the placeholder
//! syntax `#{<regex>}`. Every placeholder becomes a slot; the engine resolves
//! each slot against the available resource pool, enumerates one candidate
//! per slot, filters combinations with contradictory qualifiers (and
//! optionally combinations reusing the same source file), and writes one
//! composite SVG per surviving combination.

mod combinations;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use regex::Regex;
use same_file::is_same_file;
use thiserror::Error;
use tracing::debug;
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::overrides::OverrideDecision;
use crate::qualifiers::{to_qualified_string, QualifierKind, QualifierMap};
use crate::resource::QualifiedResource;

pub use combinations::Combinations;

/// Errors fatal for a single mask. Other masks continue processing.
#[derive(Debug, Error)]
pub enum MaskError {
    /// The mask template file could not be read.
    #[error("failed to read mask template {path}: {source}")]
    TemplateRead {
        /// Mask template path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The mask template is not a well-formed XML document.
    #[error("failed to parse mask template {path}: {source}")]
    TemplateParse {
        /// Mask template path.
        path: PathBuf,
        /// Underlying XML error.
        #[source]
        source: xmltree::ParseError,
    },
    /// A placeholder carried a pattern that is not a valid regular expression.
    #[error("invalid slot pattern `{pattern}` in mask template {path}: {source}")]
    InvalidSlotPattern {
        /// Mask template path.
        path: PathBuf,
        /// Pattern as written in the placeholder.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
    /// A composite destination could not be created or written.
    #[error("failed to write masked template {path}: {source}")]
    TemplateWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// One placeholder within a mask: the pattern candidates must match.
#[derive(Debug)]
struct MaskSlot {
    raw: String,
    pattern: Regex,
}

impl MaskSlot {
    /// Candidates from the pool whose base name matches the slot pattern and
    /// whose non-density qualifiers are a subset of the mask's own.
    fn matching_resources<'a>(
        &self,
        mask: &QualifiedResource,
        available: &'a [QualifiedResource],
    ) -> Vec<&'a QualifiedResource> {
        available
            .iter()
            .filter(|candidate| {
                self.pattern.is_match(candidate.name()) && is_compatible(mask, candidate)
            })
            .collect()
    }
}

/// A parsed mask template together with its placeholder slots.
#[derive(Debug)]
pub struct SvgMask {
    resource: QualifiedResource,
    document: Element,
    slots: Vec<MaskSlot>,
}

impl SvgMask {
    /// Read and parse a mask template, extracting its placeholder slots in
    /// document order. A template without placeholders parses successfully
    /// and simply generates nothing.
    pub fn parse(resource: QualifiedResource) -> Result<Self, MaskError> {
        let file = fs::File::open(resource.path()).map_err(|source| MaskError::TemplateRead {
            path: resource.path().to_path_buf(),
            source,
        })?;
        let document = Element::parse(io::BufReader::new(file)).map_err(|source| {
            MaskError::TemplateParse {
                path: resource.path().to_path_buf(),
                source,
            }
        })?;

        let placeholder = placeholder_regex();
        let namespace = document.namespace.clone();
        let mut patterns = Vec::new();
        collect_patterns(&document, namespace.as_deref(), &placeholder, &mut patterns);

        let mut slots = Vec::with_capacity(patterns.len());
        for raw in patterns {
            // Full-match semantics: a slot pattern must cover the whole
            // candidate base name.
            let pattern = Regex::new(&format!("^(?:{raw})$")).map_err(|source| {
                MaskError::InvalidSlotPattern {
                    path: resource.path().to_path_buf(),
                    pattern: raw.clone(),
                    source,
                }
            })?;
            slots.push(MaskSlot { raw, pattern });
        }

        Ok(Self {
            resource,
            document,
            slots,
        })
    }

    /// Qualified resource backing this mask.
    pub fn resource(&self) -> &QualifiedResource {
        &self.resource
    }

    /// Number of placeholder slots found in the template.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Generate composite resources for every valid combination of slot
    /// candidates, writing the substituted templates into `dest`.
    ///
    /// A mask without slots, or with any slot matching no candidate, yields
    /// an empty collection; both are defined empty-output cases, not errors.
    /// Combinations whose candidates carry contradictory qualifier values are
    /// silently excluded, as are combinations reusing one source file across
    /// slots when `use_same_svg_only_once` is set. For each surviving
    /// combination the `decision` collaborator is consulted; the substituted
    /// template is only written when it requests regeneration, and a write
    /// failure aborts this mask with [`MaskError::TemplateWrite`].
    pub fn generate(
        &self,
        dest: &Path,
        available: &[QualifiedResource],
        use_same_svg_only_once: bool,
        decision: &dyn OverrideDecision,
    ) -> Result<Vec<QualifiedResource>, MaskError> {
        if self.slots.is_empty() {
            debug!(mask = %self.resource, "mask template has no placeholder slots");
            return Ok(Vec::new());
        }

        fs::create_dir_all(dest).map_err(|source| MaskError::TemplateWrite {
            path: dest.to_path_buf(),
            source,
        })?;

        let mut candidates = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let matches = slot.matching_resources(&self.resource, available);
            if matches.is_empty() {
                debug!(
                    mask = %self.resource,
                    pattern = %slot.raw,
                    "slot matched no compatible resources; skipping mask"
                );
                return Ok(Vec::new());
            }
            candidates.push(matches);
        }

        let counts: Vec<usize> = candidates.iter().map(Vec::len).collect();
        let mut generated = Vec::new();
        for combination in Combinations::new(&counts) {
            let chosen: Vec<&QualifiedResource> = combination
                .iter()
                .zip(&candidates)
                .map(|(&index, slot_candidates)| slot_candidates[index])
                .collect();

            if use_same_svg_only_once && shares_a_source(&chosen) {
                continue;
            }
            let Some(mut qualifiers) = union_qualifiers(&chosen) else {
                continue;
            };
            qualifiers.insert(QualifierKind::Density, self.resource.density().to_string());

            let mut name = self.resource.name().to_string();
            for candidate in &chosen {
                name.push('_');
                name.push_str(candidate.name());
            }
            let last_modified = chosen
                .iter()
                .map(|candidate| candidate.last_modified())
                .fold(self.resource.last_modified(), SystemTime::max);

            let destination = dest.join(format!("{name}{}.svg", to_qualified_string(&qualifiers)));
            let composite = QualifiedResource::with_density(
                destination.clone(),
                name,
                qualifiers,
                self.resource.density(),
                last_modified,
            );

            if decision.should_override(&composite, &destination, None) {
                self.write_masked(&destination, &chosen)?;
                debug!(masked = %composite, "wrote masked template");
            } else {
                debug!(masked = %composite, "reusing existing masked template");
            }
            generated.push(composite);
        }

        Ok(generated)
    }

    /// Serialize a copy of the template with each slot's reference replaced
    /// by its chosen candidate's path. Writes to a staging file and renames
    /// into place so an aborted write never looks like a valid output.
    fn write_masked(
        &self,
        destination: &Path,
        chosen: &[&QualifiedResource],
    ) -> Result<(), MaskError> {
        let mut document = self.document.clone();
        let namespace = document.namespace.clone();
        let placeholder = placeholder_regex();
        let values: Vec<String> = chosen
            .iter()
            .map(|candidate| format!("file://{}", candidate.path().display()))
            .collect();
        let mut next = 0;
        substitute_hrefs(
            &mut document,
            namespace.as_deref(),
            &placeholder,
            &values,
            &mut next,
        );

        let staging = destination.with_extension("svg.part");
        match serialize_document(&document, &staging) {
            Ok(()) => fs::rename(&staging, destination).map_err(|source| {
                let _ = fs::remove_file(&staging);
                MaskError::TemplateWrite {
                    path: destination.to_path_buf(),
                    source,
                }
            }),
            Err(error) => {
                let _ = fs::remove_file(&staging);
                Err(error)
            }
        }
    }
}

fn serialize_document(document: &Element, path: &Path) -> Result<(), MaskError> {
    let file = fs::File::create(path).map_err(|source| MaskError::TemplateWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = io::BufWriter::new(file);
    document
        .write_with_config(&mut writer, EmitterConfig::new())
        .map_err(|error| MaskError::TemplateWrite {
            path: path.to_path_buf(),
            source: io::Error::other(error),
        })?;
    writer.flush().map_err(|source| MaskError::TemplateWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn placeholder_regex() -> Regex {
    Regex::new(r"^#\{(.*)\}$").expect("invalid placeholder regex")
}

/// Placeholder pattern carried by this element, when it is an `<image>` in
/// the document's default namespace with a placeholder reference.
fn placeholder_of<'a>(
    element: &'a Element,
    namespace: Option<&str>,
    placeholder: &Regex,
) -> Option<&'a str> {
    if element.name != "image" || element.namespace.as_deref() != namespace {
        return None;
    }
    let href = element.attributes.get("href")?;
    placeholder
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|group| group.as_str())
}

fn collect_patterns(
    element: &Element,
    namespace: Option<&str>,
    placeholder: &Regex,
    found: &mut Vec<String>,
) {
    if let Some(pattern) = placeholder_of(element, namespace, placeholder) {
        found.push(pattern.to_string());
    }
    for child in &element.children {
        if let XMLNode::Element(child) = child {
            collect_patterns(child, namespace, placeholder, found);
        }
    }
}

/// Rewrite placeholder references in document order with the values chosen
/// for the current combination. The walk order matches [`collect_patterns`].
fn substitute_hrefs(
    element: &mut Element,
    namespace: Option<&str>,
    placeholder: &Regex,
    values: &[String],
    next: &mut usize,
) {
    if placeholder_of(element, namespace, placeholder).is_some() {
        if let Some(value) = values.get(*next) {
            element.attributes.insert("href".to_string(), value.clone());
        }
        *next += 1;
    }
    for child in &mut element.children {
        if let XMLNode::Element(child) = child {
            substitute_hrefs(child, namespace, placeholder, values, next);
        }
    }
}

/// A candidate is compatible when every non-density qualifier it carries is
/// also carried, with the same value, by the mask itself. Density is excluded
/// because it is resolved independently per output target.
fn is_compatible(mask: &QualifiedResource, candidate: &QualifiedResource) -> bool {
    candidate.qualifiers().iter().all(|(kind, value)| {
        *kind == QualifierKind::Density
            || mask
                .qualifiers()
                .get(kind)
                .is_some_and(|own| own == value)
    })
}

/// True when any two chosen candidates resolve to the same physical file.
/// Comparison uses stable file identity, falling back to path equality for
/// files that cannot be inspected.
fn shares_a_source(chosen: &[&QualifiedResource]) -> bool {
    for (index, first) in chosen.iter().enumerate() {
        for second in &chosen[index + 1..] {
            let same = is_same_file(first.path(), second.path())
                .unwrap_or_else(|_| first.path() == second.path());
            if same {
                return true;
            }
        }
    }
    false
}

/// Union the non-density qualifiers of the chosen candidates in slot order.
/// The first writer for an axis wins; a later candidate carrying a different
/// value for an already-set axis makes the combination unsatisfiable.
fn union_qualifiers(chosen: &[&QualifiedResource]) -> Option<QualifierMap> {
    let mut merged = QualifierMap::new();
    for candidate in chosen {
        for (kind, value) in candidate.qualifiers() {
            if *kind == QualifierKind::Density {
                continue;
            }
            match merged.get(kind) {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => {
                    merged.insert(*kind, value.clone());
                }
            }
        }
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qualifiers::{parse_qualifiers, Density};
    use std::path::PathBuf;

    fn resource(name: &str, qualifier_part: &str) -> QualifiedResource {
        let qualifiers = parse_qualifiers(name, qualifier_part).unwrap();
        let density = qualifiers
            .get(&QualifierKind::Density)
            .map(|value| value.parse::<Density>().unwrap())
            .unwrap_or(Density::Mdpi);
        QualifiedResource::with_density(
            PathBuf::from(format!("/in/{name}-{qualifier_part}.svg")),
            name.to_string(),
            qualifiers,
            density,
            SystemTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn union_rejects_contradictory_axis_values() {
        let land = resource("x", "land-mdpi");
        let port = resource("y", "port-mdpi");
        assert!(union_qualifiers(&[&land, &port]).is_none());
    }

    #[test]
    fn union_merges_equal_values_once() {
        let first = resource("x", "land-mdpi");
        let second = resource("y", "land-hdpi");
        let merged = union_qualifiers(&[&first, &second]).unwrap();
        assert_eq!(merged.get(&QualifierKind::Orientation).unwrap(), "land");
        // Density never takes part in the union.
        assert!(!merged.contains_key(&QualifierKind::Density));
    }

    #[test]
    fn union_keeps_the_first_writer_per_axis() {
        let night = resource("x", "night-land-mdpi");
        let plain = resource("y", "mdpi");
        let merged = union_qualifiers(&[&night, &plain]).unwrap();
        assert_eq!(merged.get(&QualifierKind::NightMode).unwrap(), "night");
        assert_eq!(merged.get(&QualifierKind::Orientation).unwrap(), "land");
    }

    #[test]
    fn compatibility_requires_candidate_subset() {
        let mask = resource("mask", "land-hdpi");
        assert!(is_compatible(&mask, &resource("x", "land-mdpi")));
        assert!(is_compatible(&mask, &resource("x", "mdpi")));
        assert!(!is_compatible(&mask, &resource("x", "port-mdpi")));
        assert!(!is_compatible(&mask, &resource("x", "night-mdpi")));
    }

    #[test]
    fn compatibility_ignores_density_differences() {
        let mask = resource("mask", "hdpi");
        assert!(is_compatible(&mask, &resource("x", "xxxhdpi")));
    }

    #[test]
    fn shared_source_detection_uses_file_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x-mdpi.svg");
        std::fs::write(&path, "<svg/>").unwrap();

        let first = QualifiedResource::from_path(&path).unwrap();
        let second = QualifiedResource::from_path(&path).unwrap();
        assert!(shares_a_source(&[&first, &second]));

        let other_path = dir.path().join("y-mdpi.svg");
        std::fs::write(&other_path, "<svg/>").unwrap();
        let other = QualifiedResource::from_path(&other_path).unwrap();
        assert!(!shares_a_source(&[&first, &other]));
    }

    #[test]
    fn uniqueness_is_irrelevant_for_a_single_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a-land-hdpi.svg");
        std::fs::write(&path, "<svg/>").unwrap();
        let only = QualifiedResource::from_path(&path).unwrap();
        assert!(!shares_a_source(&[&only]));
    }
}
