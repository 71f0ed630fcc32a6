//! Compatibility check between the executable and the library it links.
//!
//! The executable records the library version it was written against; at
//! startup that version, as a caret requirement, must accept the library
//! actually linked. A mismatch is fatal before any file I/O.

use semver::{Version, VersionReq};
use std::fmt;

/// Version of this library.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors during version checking
#[derive(Debug, Clone)]
pub enum VersionError {
    /// Invalid version string (e.g., "not-a-version")
    InvalidVersion { value: String, source: String },
    /// Invalid version requirement (e.g., ">=bad")
    InvalidRequirement { value: String, source: String },
    /// The linked library does not satisfy the executable's requirement
    Mismatch { library: String, required: String },
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidVersion { value, source } => {
                write!(f, "invalid version '{}': {}", value, source)
            }
            VersionError::InvalidRequirement { value, source } => {
                write!(f, "invalid version requirement '{}': {}", value, source)
            }
            VersionError::Mismatch { library, required } => {
                write!(
                    f,
                    "library version {} does not satisfy required {}",
                    library, required
                )
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// Check if a version matches a requirement string
///
/// # Examples
///
/// ```
/// use streamfix::version::matches_requirement;
///
/// assert!(matches_requirement("0.1.1", Some("^0.1")).unwrap());
/// assert!(!matches_requirement("0.2.0", Some("^0.1")).unwrap());
///
/// // None requirement accepts everything
/// assert!(matches_requirement("1.0.0", None).unwrap());
/// ```
pub fn matches_requirement(
    version: &str,
    requirement: Option<&str>,
) -> Result<bool, VersionError> {
    let Some(req_str) = requirement else {
        return Ok(true);
    };

    let req_str = req_str.trim();
    if req_str.is_empty() {
        return Ok(true);
    }

    let version = Version::parse(version).map_err(|e| VersionError::InvalidVersion {
        value: version.to_string(),
        source: e.to_string(),
    })?;

    let req = VersionReq::parse(req_str).map_err(|e| VersionError::InvalidRequirement {
        value: req_str.to_string(),
        source: e.to_string(),
    })?;

    Ok(req.matches(&version))
}

/// Fail unless `library` is caret-compatible with `expected`.
pub fn check_compatible(library: &str, expected: &str) -> Result<(), VersionError> {
    let required = format!("^{expected}");
    if matches_requirement(library, Some(&required))? {
        Ok(())
    } else {
        Err(VersionError::Mismatch {
            library: library.to_string(),
            required,
        })
    }
}

/// Check the linked library against the version an executable expects.
pub fn ensure_library(expected: &str) -> Result<(), VersionError> {
    check_compatible(LIBRARY_VERSION, expected)
}
