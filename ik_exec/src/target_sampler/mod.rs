//! Target sampler module
//!
//! Produces candidate end effector targets spread through a spherical shell
//! around the arm's shoulder. Each tick makes one attempt, which may or may not
//! produce a candidate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TargetSampler operation.
#[derive(Debug, thiserror::Error)]
pub enum TargetSamplerError {
    #[error("Cannot load the TargetSampler parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid TargetSampler parameters: {0}")]
    InvalidParams(String),

    #[error("Cannot archive TargetSampler data: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError),
}
