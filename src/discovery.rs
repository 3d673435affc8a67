//! API version discovery
//!
//! Identity servers describe themselves with a version document at their
//! root. [`VersionDoc`] parses the document shapes in the wild and
//! negotiates the version to talk to.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Version;

/// A parsed version discovery document
#[derive(Debug, Clone)]
pub struct VersionDoc {
    versions: Vec<Version>,
}

impl VersionDoc {
    /// Parse a discovery document body.
    ///
    /// Accepts the three shapes servers emit: `{"versions": {"values":
    /// [...]}}`, `{"versions": [...]}` and the single-version
    /// `{"version": {...}}`.
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::InvalidResponse(format!("version document is not JSON: {}", e)))?;

        let versions = if let Some(versions) = value.get("versions") {
            let list = versions.get("values").unwrap_or(versions).clone();
            serde_json::from_value::<Vec<Version>>(list).map_err(|e| {
                Error::InvalidResponse(format!("unrecognized versions listing: {}", e))
            })?
        } else if let Some(version) = value.get("version") {
            let one: Version = serde_json::from_value(version.clone()).map_err(|e| {
                Error::InvalidResponse(format!("unrecognized version entry: {}", e))
            })?;
            vec![one]
        } else {
            return Err(Error::InvalidResponse(
                "document carries neither \"versions\" nor \"version\"".to_string(),
            ));
        };

        Ok(VersionDoc { versions })
    }

    /// All advertised versions, in document order.
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Negotiate the version to use.
    ///
    /// With a requested version ("v3", "3", "3.0", "v3.14"), the major must
    /// match and the advertised minor must be at least the requested minor;
    /// the highest qualifying version wins, stable releases first. With no
    /// request, the highest stable version wins, falling back to the highest
    /// of any status.
    pub fn best_match(&self, requested: Option<&str>) -> Result<&Version> {
        if self.versions.is_empty() {
            return Err(Error::Discovery(
                "version document advertised no versions".to_string(),
            ));
        }

        let wanted = match requested {
            Some(raw) => Some(normalize_version(raw)?),
            None => None,
        };

        let best = self
            .versions
            .iter()
            .filter_map(|version| match normalize_version(&version.id) {
                Ok(number) => Some((version, number)),
                Err(_) => {
                    debug!(id = %version.id, "skipping unparseable version id");
                    None
                }
            })
            .filter(|(_, (major, minor))| match wanted {
                Some((want_major, want_minor)) => *major == want_major && *minor >= want_minor,
                None => true,
            })
            .max_by_key(|&(version, number)| (is_stable(version), number))
            .map(|(version, _)| version);

        match (best, requested) {
            (Some(version), _) => Ok(version),
            (None, Some(raw)) => Err(Error::VersionNotAvailable(raw.to_string())),
            (None, None) => Err(Error::Discovery(
                "no advertised version has a usable id".to_string(),
            )),
        }
    }
}

fn is_stable(version: &Version) -> bool {
    ["stable", "current", "supported"]
        .iter()
        .any(|status| version.status.eq_ignore_ascii_case(status))
}

/// Parse a version spec into `(major, minor)`.
///
/// Accepts "3", "3.1", "v3", "v3.1". Anything else is an
/// [`Error::UnsupportedVersion`].
pub fn normalize_version(spec: &str) -> Result<(u32, u32)> {
    let unsupported = || Error::UnsupportedVersion(spec.to_string());
    let trimmed = spec.trim();
    let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(unsupported());
    }
    let mut parts = trimmed.splitn(2, '.');
    let major = parts
        .next()
        .and_then(|part| part.parse::<u32>().ok())
        .ok_or_else(unsupported)?;
    let minor = match parts.next() {
        Some(part) => part.parse::<u32>().map_err(|_| unsupported())?,
        None => 0,
    };
    Ok((major, minor))
}
