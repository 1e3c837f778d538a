//! Qualifier model: typed qualifier axes embedded in resource file names.
//!
//! A qualified file name is an unqualified base name followed by
//! dash-separated qualifier values, e.g. `icon-land-hdpi.svg`. Each value
//! belongs to exactly one axis ([`QualifierKind`]) and the density axis is
//! mandatory. Parsing accepts axes in any order; serialization always emits
//! them in the fixed canonical axis order.

mod density;

use std::collections::BTreeMap;
use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;

pub use density::{Density, ParseDensityError};

/// Ordered mapping from qualifier axis to its raw string value.
pub type QualifierMap = BTreeMap<QualifierKind, String>;

/// A qualifier axis. Declaration order is the canonical serialization order
/// and must not be reordered: every consumer matching on serialized qualifier
/// strings depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualifierKind {
    /// Language, optionally with a `-rXX` region suffix (`en`, `fr-rCA`).
    Locale,
    /// Layout direction (`ldrtl`, `ldltr`).
    LayoutDirection,
    /// Smallest width in dp (`sw600dp`).
    SmallestWidth,
    /// Available width in dp (`w720dp`).
    AvailableWidth,
    /// Available height in dp (`h1024dp`).
    AvailableHeight,
    /// Screen size bucket (`small`, `normal`, `large`, `xlarge`).
    ScreenSize,
    /// Screen aspect (`long`, `notlong`).
    Aspect,
    /// Orientation (`port`, `land`).
    Orientation,
    /// UI mode (`car`, `desk`, `television`, `appliance`, `watch`).
    UiMode,
    /// Night mode (`night`, `notnight`).
    NightMode,
    /// Density bucket (`ldpi` .. `xxxhdpi`, `tvdpi`, `nodpi`, `anydpi`).
    /// Mandatory for every qualified resource.
    Density,
    /// Touch screen capability (`notouch`, `stylus`, `finger`).
    TouchScreen,
    /// Keyboard availability (`keysexposed`, `keyshidden`, `keyssoft`).
    Keyboard,
    /// Text input method (`nokeys`, `qwerty`, `12key`).
    TextInputMethod,
    /// Navigation key availability (`navexposed`, `navhidden`).
    NavigationKey,
    /// Navigation method (`nonav`, `dpad`, `trackball`, `wheel`).
    NavigationMethod,
    /// Platform version (`v21`).
    PlatformVersion,
}

impl QualifierKind {
    /// All axes in canonical order.
    pub const ALL: [QualifierKind; 17] = [
        QualifierKind::Locale,
        QualifierKind::LayoutDirection,
        QualifierKind::SmallestWidth,
        QualifierKind::AvailableWidth,
        QualifierKind::AvailableHeight,
        QualifierKind::ScreenSize,
        QualifierKind::Aspect,
        QualifierKind::Orientation,
        QualifierKind::UiMode,
        QualifierKind::NightMode,
        QualifierKind::Density,
        QualifierKind::TouchScreen,
        QualifierKind::Keyboard,
        QualifierKind::TextInputMethod,
        QualifierKind::NavigationKey,
        QualifierKind::NavigationMethod,
        QualifierKind::PlatformVersion,
    ];

    /// Value pattern recognized for this axis.
    pub fn pattern(self) -> &'static str {
        match self {
            QualifierKind::Locale => "[a-z]{2}(-r[A-Z]{2})?",
            QualifierKind::LayoutDirection => "(ldrtl|ldltr)",
            QualifierKind::SmallestWidth => "sw[0-9]+dp",
            QualifierKind::AvailableWidth => "w[0-9]+dp",
            QualifierKind::AvailableHeight => "h[0-9]+dp",
            QualifierKind::ScreenSize => "(small|normal|large|xlarge)",
            QualifierKind::Aspect => "(long|notlong)",
            QualifierKind::Orientation => "(port|land)",
            QualifierKind::UiMode => "(car|desk|television|appliance|watch)",
            QualifierKind::NightMode => "(night|notnight)",
            QualifierKind::Density => "(l|m|h|xh|xxh|xxxh|tv|no|any)dpi",
            QualifierKind::TouchScreen => "(notouch|stylus|finger)",
            QualifierKind::Keyboard => "(keysexposed|keyshidden|keyssoft)",
            QualifierKind::TextInputMethod => "(nokeys|qwerty|12key)",
            QualifierKind::NavigationKey => "(navexposed|navhidden)",
            QualifierKind::NavigationMethod => "(nonav|dpad|trackball|wheel)",
            QualifierKind::PlatformVersion => "v[0-9]+",
        }
    }

    /// Stable lowercase label used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            QualifierKind::Locale => "locale",
            QualifierKind::LayoutDirection => "layout-direction",
            QualifierKind::SmallestWidth => "smallest-width",
            QualifierKind::AvailableWidth => "available-width",
            QualifierKind::AvailableHeight => "available-height",
            QualifierKind::ScreenSize => "screen-size",
            QualifierKind::Aspect => "aspect",
            QualifierKind::Orientation => "orientation",
            QualifierKind::UiMode => "ui-mode",
            QualifierKind::NightMode => "night-mode",
            QualifierKind::Density => "density",
            QualifierKind::TouchScreen => "touch-screen",
            QualifierKind::Keyboard => "keyboard",
            QualifierKind::TextInputMethod => "text-input-method",
            QualifierKind::NavigationKey => "navigation-key",
            QualifierKind::NavigationMethod => "navigation-method",
            QualifierKind::PlatformVersion => "platform-version",
        }
    }
}

impl std::fmt::Display for QualifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while parsing a qualified file name.
#[derive(Debug, Error)]
pub enum QualifierError {
    /// The file name has no qualifier section or an invalid base name.
    #[error("malformed resource name `{0}`: expected `<name>-<qualifier>[-<qualifier>...]`")]
    MalformedResourceName(String),
    /// A qualifier segment matched no known axis pattern.
    #[error("unrecognized qualifier segment `{segment}` in `{name}`")]
    UnknownQualifier {
        /// Resource name being parsed.
        name: String,
        /// Offending segment.
        segment: String,
    },
    /// The mandatory density axis is absent.
    #[error("resource name `{0}` carries no density qualifier")]
    MissingDensityQualifier(String),
    /// The file name is not valid UTF-8 or has no stem at all.
    #[error("resource path {0} has no usable file name")]
    UnusableFileName(PathBuf),
}

/// Parse the qualifier section of a file name (everything after the first
/// `-`) into a typed qualifier map.
///
/// Each chunk is matched against the axis patterns in canonical order and
/// must end at a `-` boundary; the locale axis may consume its optional
/// region suffix, so a single axis value can span two dash-separated chunks.
pub fn parse_qualifiers(name: &str, input: &str) -> Result<QualifierMap, QualifierError> {
    let mut qualifiers = QualifierMap::new();
    let mut rest = input;
    while !rest.is_empty() {
        match match_axis(rest) {
            Some((kind, end)) => {
                qualifiers.insert(kind, rest[..end].to_string());
                rest = rest.get(end + 1..).unwrap_or("");
            }
            None => {
                let segment = rest.split('-').next().unwrap_or(rest);
                return Err(QualifierError::UnknownQualifier {
                    name: name.to_string(),
                    segment: segment.to_string(),
                });
            }
        }
    }
    Ok(qualifiers)
}

/// Serialize a qualifier map into its canonical dash-prefixed string form.
///
/// Axes are emitted strictly in [`QualifierKind::ALL`] order regardless of how
/// the map was populated, e.g. `-land-hdpi` for an orientation + density map.
pub fn to_qualified_string(qualifiers: &QualifierMap) -> String {
    let mut serialized = String::new();
    for kind in QualifierKind::ALL {
        if let Some(value) = qualifiers.get(&kind) {
            serialized.push('-');
            serialized.push_str(value);
        }
    }
    serialized
}

/// Match the longest axis value anchored at the start of `rest`, trying axes
/// in canonical order. The match must be followed by a `-` or the end of the
/// string so that e.g. `sw600dp` is never misread as a locale.
fn match_axis(rest: &str) -> Option<(QualifierKind, usize)> {
    for kind in QualifierKind::ALL {
        let pattern =
            Regex::new(&format!("^(?:{})", kind.pattern())).expect("invalid qualifier pattern");
        if let Some(found) = pattern.find(rest) {
            let end = found.end();
            if end == rest.len() || rest.as_bytes()[end] == b'-' {
                return Some((kind, end));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_qualifiers_in_any_order() {
        let forward = parse_qualifiers("x", "land-hdpi").unwrap();
        let backward = parse_qualifiers("x", "hdpi-land").unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.get(&QualifierKind::Orientation).unwrap(), "land");
        assert_eq!(forward.get(&QualifierKind::Density).unwrap(), "hdpi");
    }

    #[test]
    fn serialization_is_order_canonical() {
        let qualifiers = parse_qualifiers("x", "hdpi-land").unwrap();
        assert_eq!(to_qualified_string(&qualifiers), "-land-hdpi");
    }

    #[test]
    fn round_trips_through_canonical_form() {
        let qualifiers =
            parse_qualifiers("x", "xxhdpi-sw600dp-night-fr-rCA-land").unwrap();
        let serialized = to_qualified_string(&qualifiers);
        let reparsed = parse_qualifiers("x", serialized.trim_start_matches('-')).unwrap();
        assert_eq!(qualifiers, reparsed);
        assert_eq!(serialized, "-fr-rCA-sw600dp-land-night-xxhdpi");
    }

    #[test]
    fn locale_consumes_region_suffix() {
        let qualifiers = parse_qualifiers("x", "en-rUS-mdpi").unwrap();
        assert_eq!(qualifiers.get(&QualifierKind::Locale).unwrap(), "en-rUS");
    }

    #[test]
    fn ambiguous_prefixes_resolve_by_boundary() {
        // `sw600dp`, `tvdpi` and `notlong` all start with two lowercase
        // letters but must not be consumed by the locale axis.
        let qualifiers = parse_qualifiers("x", "sw600dp-notlong-tvdpi").unwrap();
        assert_eq!(
            qualifiers.get(&QualifierKind::SmallestWidth).unwrap(),
            "sw600dp"
        );
        assert_eq!(qualifiers.get(&QualifierKind::Aspect).unwrap(), "notlong");
        assert_eq!(qualifiers.get(&QualifierKind::Density).unwrap(), "tvdpi");
        assert!(!qualifiers.contains_key(&QualifierKind::Locale));
    }

    #[test]
    fn rejects_unknown_segments() {
        let error = parse_qualifiers("x", "hdpi-sideways").unwrap_err();
        match error {
            QualifierError::UnknownQualifier { segment, .. } => {
                assert_eq!(segment, "sideways");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn map_iteration_follows_axis_order() {
        let qualifiers = parse_qualifiers("x", "v21-port-en").unwrap();
        let kinds: Vec<QualifierKind> = qualifiers.keys().copied().collect();
        assert_eq!(kinds, vec![
            QualifierKind::Locale,
            QualifierKind::Orientation,
            QualifierKind::PlatformVersion,
        ]);
    }
}
