use crate::Coordinates;

/// The relative path an artifact occupies under the standard Maven repository
/// layout:
/// `group/as/path/artifact/version/artifact-version[-classifier].extension`.
pub fn artifact_path(coordinates: &Coordinates) -> String {
    let mut path = format!(
        "{}/{}/{}/{}-{}",
        coordinates.group_id().replace('.', "/"),
        coordinates.artifact_id(),
        coordinates.version(),
        coordinates.artifact_id(),
        coordinates.version(),
    );

    if !coordinates.classifier().is_empty() {
        path.push('-');
        path.push_str(coordinates.classifier());
    }

    path.push('.');
    path.push_str(coordinates.extension());

    path
}

/// Repository URLs are compared by prefix, so they must all carry a trailing
/// slash.
pub fn normalize_repository(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Normalizes a configured repository list, dropping duplicates while keeping
/// first-seen order (position encodes priority).
pub fn normalize_repositories(urls: &[String]) -> Vec<String> {
    let mut repositories: Vec<String> = Vec::new();

    for url in urls {
        let url = normalize_repository(url);
        if !repositories.contains(&url) {
            repositories.push(url);
        }
    }

    repositories
}
