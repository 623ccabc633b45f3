use crate::{MvnlockError, Result};
use std::fmt;

pub const DEFAULT_EXTENSION: &str = "jar";

/// One Maven artifact in `group:artifact[:extension[:classifier]]:version`
/// ("GACEV") notation. Values are immutable; `set_classifier` and
/// `set_extension` return fresh instances.
///
/// The extension is stored normalized: an absent or empty extension becomes
/// `jar`, so two coordinates describing the same artifact compare equal no
/// matter how they were built.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Coordinates {
    group_id: String,
    artifact_id: String,
    extension: String,
    classifier: String,
    version: String,
}

impl Coordinates {
    pub fn new(
        group_id: &str,
        artifact_id: &str,
        extension: &str,
        classifier: &str,
        version: &str,
    ) -> Self {
        let extension = if extension.is_empty() {
            DEFAULT_EXTENSION
        } else {
            extension
        };

        Coordinates {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            extension: extension.to_string(),
            classifier: classifier.to_string(),
            version: version.to_string(),
        }
    }

    /// Parses GACEV notation. Positional meaning is disambiguated by segment
    /// count: `g:a`, `g:a:v`, `g:a:e:v`, `g:a:e:c:v`.
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(':').collect();

        let (group_id, artifact_id, extension, classifier, version) = match parts.as_slice() {
            [g, a] => (*g, *a, "", "", ""),
            [g, a, v] => (*g, *a, "", "", *v),
            [g, a, e, v] => (*g, *a, *e, "", *v),
            [g, a, e, c, v] => (*g, *a, *e, *c, *v),
            _ => {
                return Err(MvnlockError::CoordinateParse {
                    value: value.to_string(),
                    reason: format!("expected 2 to 5 colon-separated segments, found {}", parts.len()),
                });
            }
        };

        if group_id.is_empty() || artifact_id.is_empty() {
            return Err(MvnlockError::CoordinateParse {
                value: value.to_string(),
                reason: "group and artifact ids must not be empty".to_string(),
            });
        }

        Ok(Coordinates::new(group_id, artifact_id, extension, classifier, version))
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The version-free identity used for graph nodes and lock-file map keys:
    /// `group:artifact:extension[:classifier]`. The extension is always
    /// present (defaulted to `jar`); a `jar` classifier is treated as no
    /// classifier.
    pub fn as_key(&self) -> String {
        let mut key = format!("{}:{}:{}", self.group_id, self.artifact_id, self.extension);

        if !self.classifier.is_empty() && self.classifier != DEFAULT_EXTENSION {
            key.push(':');
            key.push_str(&self.classifier);
        }

        key
    }

    pub fn set_classifier(&self, classifier: &str) -> Self {
        Coordinates {
            classifier: classifier.to_string(),
            ..self.clone()
        }
    }

    pub fn set_extension(&self, extension: &str) -> Self {
        Coordinates::new(
            &self.group_id,
            &self.artifact_id,
            extension,
            &self.classifier,
            &self.version,
        )
    }
}

impl fmt::Display for Coordinates {
    /// Canonical form: a `jar` extension and a `jar`/empty classifier are
    /// omitted, as is an empty version, so `Display` round-trips through
    /// `parse`. When a classifier is present the extension is always written,
    /// otherwise the segments could not be positionally disambiguated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;

        if !self.classifier.is_empty() && self.classifier != DEFAULT_EXTENSION {
            write!(f, ":{}:{}", self.extension, self.classifier)?;
        } else if self.extension != DEFAULT_EXTENSION {
            write!(f, ":{}", self.extension)?;
        }
        if !self.version.is_empty() {
            write!(f, ":{}", self.version)?;
        }

        Ok(())
    }
}
