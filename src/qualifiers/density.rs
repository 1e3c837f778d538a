//! Density buckets and their scale factors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A screen density bucket. `mdpi` is the baseline; [`Density::scale`] gives
/// the factor used downstream to compute target raster dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    /// Low density (~120 dpi, 0.75x).
    Ldpi,
    /// Medium density (~160 dpi, baseline).
    Mdpi,
    /// High density (~240 dpi, 1.5x).
    Hdpi,
    /// Extra-high density (~320 dpi, 2x).
    Xhdpi,
    /// Extra-extra-high density (~480 dpi, 3x).
    Xxhdpi,
    /// Extra-extra-extra-high density (~640 dpi, 4x).
    Xxxhdpi,
    /// Television density (~213 dpi).
    Tvdpi,
    /// Resources that must not be scaled.
    Nodpi,
    /// Resources valid for any density.
    Anydpi,
}

/// Error returned when a string names no known density bucket.
#[derive(Debug, Error)]
#[error("unrecognized density bucket `{0}`")]
pub struct ParseDensityError(pub String);

impl Density {
    /// Nominal dots per inch of this bucket. The density-independent buckets
    /// report the baseline value.
    pub fn dpi(self) -> u32 {
        match self {
            Density::Ldpi => 120,
            Density::Mdpi => 160,
            Density::Hdpi => 240,
            Density::Xhdpi => 320,
            Density::Xxhdpi => 480,
            Density::Xxxhdpi => 640,
            Density::Tvdpi => 213,
            Density::Nodpi | Density::Anydpi => 160,
        }
    }

    /// Scale factor relative to the `mdpi` baseline.
    pub fn scale(self) -> f64 {
        f64::from(self.dpi()) / f64::from(Density::Mdpi.dpi())
    }

    /// Qualifier string form of this bucket.
    pub fn as_str(self) -> &'static str {
        match self {
            Density::Ldpi => "ldpi",
            Density::Mdpi => "mdpi",
            Density::Hdpi => "hdpi",
            Density::Xhdpi => "xhdpi",
            Density::Xxhdpi => "xxhdpi",
            Density::Xxxhdpi => "xxxhdpi",
            Density::Tvdpi => "tvdpi",
            Density::Nodpi => "nodpi",
            Density::Anydpi => "anydpi",
        }
    }
}

impl std::fmt::Display for Density {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Density {
    type Err = ParseDensityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ldpi" => Ok(Density::Ldpi),
            "mdpi" => Ok(Density::Mdpi),
            "hdpi" => Ok(Density::Hdpi),
            "xhdpi" => Ok(Density::Xhdpi),
            "xxhdpi" => Ok(Density::Xxhdpi),
            "xxxhdpi" => Ok(Density::Xxxhdpi),
            "tvdpi" => Ok(Density::Tvdpi),
            "nodpi" => Ok(Density::Nodpi),
            "anydpi" => Ok(Density::Anydpi),
            other => Err(ParseDensityError(other.to_string())),
        }
    }
}
