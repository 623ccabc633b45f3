use crate::repository::artifact_path;
use crate::{Coordinates, MvnlockError, Result};

/// Some resolution backends misreport an artifact's extension or classifier
/// relative to the file they actually downloaded (typically seen with non-jar
/// packaging such as `aar`). The lock file derives artifact storage paths from
/// coordinates, so the downloaded file's path is treated as ground truth and
/// the coordinates are rewritten to match it.
///
/// Group and artifact ids are assumed correct; if even those cannot be located
/// in the path, the coordinates cannot be trusted at all and the error aborts
/// the whole conversion.
pub fn reconcile(declared: &Coordinates, file: Option<&str>) -> Result<Coordinates> {
    // Nothing physical to check against, e.g. a pom-only node.
    let Some(file) = file else {
        return Ok(declared.clone());
    };

    // Paths may arrive URL encoded.
    let decoded = urlencoding::decode(file)
        .map_err(|_| error(declared, file, "path is not valid percent-encoded UTF-8"))?;
    let file: &str = &decoded;

    if file.ends_with(&artifact_path(declared)) {
        return Ok(declared.clone());
    }

    // The expected layout is
    // "[group]/[artifact]/[version]/[artifact]-[version](-[classifier])(.[extension])".
    let prefix = format!(
        "{}/{}/",
        declared.group_id().replace('.', "/"),
        declared.artifact_id()
    );

    let Some(index) = file.find(&prefix) else {
        return Err(error(declared, &file, "group and artifact ids not found in path"));
    };
    let rest = &file[index + prefix.len()..];

    // The next path segment is the version.
    let Some(slash) = rest.find('/') else {
        return Err(error(declared, &file, "no version segment after group and artifact ids"));
    };
    let version = &rest[..slash];
    let file_name = &rest[slash + 1..];

    // Knowing the version fixes the file name's base token. The classifier,
    // if any, is derived from whatever follows it.
    let base = format!("{}-{}", declared.artifact_id(), version);
    let Some(index) = file_name.find(&base) else {
        return Err(error(
            declared,
            &file,
            &format!("expected file name {:?} not found", base),
        ));
    };
    let suffix = &file_name[index + base.len()..];

    let (classifier, extension) = match suffix.as_bytes().first() {
        Some(b'-') => {
            let Some(dot) = suffix.rfind('.') else {
                return Err(error(declared, &file, "file has a classifier but no extension"));
            };
            (&suffix[1..dot], &suffix[dot + 1..])
        }
        Some(b'.') => ("", &suffix[1..]),
        Some(_) => {
            return Err(error(declared, &file, "cannot split classifier and extension from file name"));
        }
        None => {
            return Err(error(declared, &file, "file does not appear to have a suffix"));
        }
    };

    Ok(Coordinates::new(
        declared.group_id(),
        declared.artifact_id(),
        extension,
        classifier,
        version,
    ))
}

fn error(declared: &Coordinates, file: &str, reason: &str) -> MvnlockError {
    MvnlockError::Reconcile {
        coordinates: declared.to_string(),
        file: file.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_left_alone() {
        let declared = Coordinates::parse("com.example:parent:pom:1.0").unwrap();
        assert_eq!(reconcile(&declared, None).unwrap(), declared);
    }

    #[test]
    fn consistent_path_is_left_alone() {
        let declared = Coordinates::parse("com.example:thing:1.0").unwrap();
        let file = "/home/user/.cache/coursier/v1/https/repo1.maven.org/maven2/com/example/thing/1.0/thing-1.0.jar";

        assert_eq!(reconcile(&declared, Some(file)).unwrap(), declared);
    }

    #[test]
    fn misreported_extension_is_corrected() {
        let declared = Coordinates::parse("com.example:thing:aar:1.0").unwrap();
        let file = "/cache/com/example/thing/1.0/thing-1.0.jar";

        let corrected = reconcile(&declared, Some(file)).unwrap();
        assert_eq!(corrected, Coordinates::parse("com.example:thing:1.0").unwrap());
        assert_eq!(corrected.extension(), "jar");
        assert_eq!(corrected.classifier(), "");
    }

    #[test]
    fn classifier_is_derived_from_file_name() {
        let declared = Coordinates::parse("com.example:thing:1.0").unwrap();
        let file = "/cache/com/example/thing/1.0/thing-1.0-linux.so";

        let corrected = reconcile(&declared, Some(file)).unwrap();
        assert_eq!(
            corrected,
            Coordinates::parse("com.example:thing:so:linux:1.0").unwrap()
        );
    }

    #[test]
    fn version_is_taken_from_the_path() {
        let declared = Coordinates::parse("com.example:thing:1.0").unwrap();
        let file = "/cache/com/example/thing/2.0-SNAPSHOT/thing-2.0-SNAPSHOT.jar";

        let corrected = reconcile(&declared, Some(file)).unwrap();
        assert_eq!(corrected.version(), "2.0-SNAPSHOT");
    }

    #[test]
    fn percent_encoded_paths_are_decoded() {
        let declared = Coordinates::parse("com.example:thing:1.0 beta").unwrap();
        let file = "/cache/com/example/thing/1.0%20beta/thing-1.0%20beta.jar";

        assert_eq!(reconcile(&declared, Some(file)).unwrap(), declared);
    }

    #[test]
    fn unrelated_path_fails() {
        let declared = Coordinates::parse("com.example:thing:1.0").unwrap();
        let result = reconcile(&declared, Some("/cache/org/other/thing/1.0/thing-1.0.jar"));

        assert!(matches!(result, Err(MvnlockError::Reconcile { .. })));
    }

    #[test]
    fn missing_version_segment_fails() {
        let declared = Coordinates::parse("com.example:thing:1.0").unwrap();
        let result = reconcile(&declared, Some("/cache/com/example/thing"));

        assert!(result.is_err());
    }

    #[test]
    fn suffix_without_separator_fails() {
        let declared = Coordinates::parse("com.example:thing:1.0").unwrap();
        let result = reconcile(&declared, Some("/cache/com/example/thing/2.0/thing-2.0extra"));

        assert!(result.is_err());
    }

    #[test]
    fn missing_suffix_fails() {
        let declared = Coordinates::parse("com.example:thing:1.0").unwrap();
        let result = reconcile(&declared, Some("/cache/com/example/thing/2.0/thing-2.0"));

        assert!(result.is_err());
    }
}
