#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod discovery;
pub mod mask;
pub mod overrides;
pub mod pipeline;
pub mod qualifiers;
pub mod resource;

pub use config::BundlerConfig;
pub use mask::{Combinations, MaskError, SvgMask};
pub use overrides::{OverrideDecision, OverrideMode};
pub use pipeline::PipelineReport;
pub use qualifiers::{Density, QualifierError, QualifierKind, QualifierMap};
pub use resource::{OutputKind, QualifiedResource};
