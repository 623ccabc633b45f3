use crate::info::DependencyInfo;
use crate::{MvnlockError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

const M2LOCAL: &str = "m2local/";
pub(crate) const LOCK_FILE_VERSION: &str = "2";

/// Repository URL -> artifact keys. Unlike every other container in the lock
/// file this one preserves insertion order: the position of a repository
/// encodes its priority when attributing artifacts to URLs, so it must never
/// be alphabetized.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RepositoryMap(Vec<(String, BTreeSet<String>)>);

impl RepositoryMap {
    /// Seeds every configured repository with an empty member set, dropping
    /// duplicates while keeping first-seen order.
    pub fn seed(repositories: &[String]) -> Self {
        let mut entries: Vec<(String, BTreeSet<String>)> = Vec::new();
        for repository in repositories {
            if !entries.iter().any(|(url, _)| url == repository) {
                entries.push((repository.clone(), BTreeSet::new()));
            }
        }
        RepositoryMap(entries)
    }

    /// Records that `key` is served by `repository`. A no-op when the
    /// repository was never configured.
    pub fn attribute(&mut self, repository: &str, key: &str) {
        if let Some((_, members)) = self.0.iter_mut().find(|(url, _)| url == repository) {
            members.insert(key.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(url, members)| (url.as_str(), members))
    }
}

impl Serialize for RepositoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (url, members) in &self.0 {
            map.serialize_entry(url, members)?;
        }
        map.end()
    }
}

/// The rendered v2 lock file. Field order here is the field order in the
/// serialized document and is part of the format.
#[derive(Clone, Debug, Serialize)]
pub struct LockFile {
    pub artifacts: BTreeSet<String>,
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub skipped: BTreeSet<String>,
    pub packages: BTreeMap<String, BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m2local: Option<bool>,
    pub repositories: RepositoryMap,
    pub shasums: BTreeMap<String, BTreeMap<String, String>>,
    pub version: String,
    /// Transitional: where each artifact's file was originally reported.
    /// Only the legacy converter emits this; it goes away once nothing
    /// downstream reads it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<BTreeMap<String, String>>,
}

impl LockFile {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| MvnlockError::RenderJson { source })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let data = self.to_json()?;
        fs::write(path, data).map_err(|source| MvnlockError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The alternate, denser lock-file encoding: artifacts keyed by their short
/// key carrying version and shasums inline. The dependency and package
/// payloads are identical to [`LockFile`]'s.
#[derive(Clone, Debug, Serialize)]
pub struct NebulaLockFile {
    pub artifacts: BTreeMap<String, NebulaArtifact>,
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
    pub packages: BTreeMap<String, BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m2local: Option<bool>,
    pub repositories: RepositoryMap,
    pub version: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct NebulaArtifact {
    pub shasums: BTreeMap<String, String>,
    pub version: String,
}

impl NebulaLockFile {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| MvnlockError::RenderJson { source })
    }
}

/// Renders a set of per-artifact records into the current lock-file format.
/// Pure and idempotent: the same records produce byte-identical output no
/// matter what order they are visited in.
pub struct V2Format {
    repositories: Vec<String>,
}

impl V2Format {
    pub fn new(repositories: Vec<String>) -> Self {
        V2Format { repositories }
    }

    pub fn render(&self, infos: &BTreeSet<DependencyInfo>) -> LockFile {
        let mut artifacts = BTreeSet::new();
        let mut dependencies = BTreeMap::new();
        let mut packages = BTreeMap::new();
        let mut shasums: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

        for info in infos {
            let key = info.coordinates.as_key();

            artifacts.insert(info.coordinates.to_string());
            merge_shasums(&mut shasums, info);

            // Two records can share a key (the same artifact at two
            // versions); their entries union rather than replace.
            let keys = dependency_keys(info);
            if !keys.is_empty() {
                dependencies
                    .entry(key.clone())
                    .or_insert_with(BTreeSet::new)
                    .extend(keys);
            }
            if !info.packages.is_empty() {
                packages
                    .entry(key)
                    .or_insert_with(BTreeSet::new)
                    .extend(info.packages.iter().cloned());
            }
        }

        LockFile {
            artifacts,
            dependencies,
            skipped: BTreeSet::new(),
            packages,
            m2local: uses_m2local(&self.repositories),
            repositories: RepositoryMap::seed(&self.repositories),
            shasums,
            version: LOCK_FILE_VERSION.to_string(),
            files: None,
        }
    }
}

/// Same payload as [`V2Format`], different artifacts section shape.
pub struct NebulaFormat {
    repositories: Vec<String>,
}

impl NebulaFormat {
    pub fn new(repositories: Vec<String>) -> Self {
        NebulaFormat { repositories }
    }

    pub fn render(&self, infos: &BTreeSet<DependencyInfo>) -> NebulaLockFile {
        let mut artifacts: BTreeMap<String, NebulaArtifact> = BTreeMap::new();
        let mut dependencies = BTreeMap::new();
        let mut packages = BTreeMap::new();

        for info in infos {
            let key = info.coordinates.as_key();
            let short_key = info.coordinates.set_classifier("jar").as_key();

            let artifact = artifacts.entry(short_key).or_insert_with(|| NebulaArtifact {
                shasums: BTreeMap::new(),
                version: info.coordinates.version().to_string(),
            });
            artifact.version = info.coordinates.version().to_string();
            merge_classifier_shasums(&mut artifact.shasums, info);

            let keys = dependency_keys(info);
            if !keys.is_empty() {
                dependencies
                    .entry(key.clone())
                    .or_insert_with(BTreeSet::new)
                    .extend(keys);
            }
            if !info.packages.is_empty() {
                packages
                    .entry(key)
                    .or_insert_with(BTreeSet::new)
                    .extend(info.packages.iter().cloned());
            }
        }

        NebulaLockFile {
            artifacts,
            dependencies,
            packages,
            m2local: uses_m2local(&self.repositories),
            repositories: RepositoryMap::seed(&self.repositories),
            version: LOCK_FILE_VERSION.to_string(),
        }
    }
}

pub(crate) fn uses_m2local(repositories: &[String]) -> Option<bool> {
    repositories
        .iter()
        .any(|repository| repository.eq_ignore_ascii_case(M2LOCAL))
        .then_some(true)
}

fn dependency_keys(info: &DependencyInfo) -> BTreeSet<String> {
    info.dependencies
        .iter()
        .map(|coordinates| coordinates.as_key())
        .collect()
}

pub(crate) fn merge_shasums(
    shasums: &mut BTreeMap<String, BTreeMap<String, String>>,
    info: &DependencyInfo,
) {
    let short_key = info.coordinates.set_classifier("jar").as_key();
    merge_classifier_shasums(shasums.entry(short_key).or_default(), info);
}

fn merge_classifier_shasums(shasums: &mut BTreeMap<String, String>, info: &DependencyInfo) {
    let classifier = if info.coordinates.classifier().is_empty() {
        "jar"
    } else {
        info.coordinates.classifier()
    };

    if let Some(sha256) = &info.sha256 {
        shasums.insert(classifier.to_string(), sha256.clone());
    }
    if let Some(sha256) = &info.javadoc_sha256 {
        shasums.insert("javadoc".to_string(), sha256.clone());
    }
    if let Some(sha256) = &info.source_sha256 {
        shasums.insert("sources".to_string(), sha256.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinates;

    fn info(coord: &str, sha: &str) -> DependencyInfo {
        DependencyInfo::new(Coordinates::parse(coord).unwrap(), sha)
    }

    fn guava_set() -> BTreeSet<DependencyInfo> {
        let mut guava = info("com.google.guava:guava:31.1-jre", "aabb");
        guava.dependencies.insert(
            Coordinates::parse("com.google.guava:failureaccess:1.0.1").unwrap(),
        );
        guava.packages.insert("com.google.common.collect".to_string());

        let failureaccess = info("com.google.guava:failureaccess:1.0.1", "ccdd");

        BTreeSet::from([guava, failureaccess])
    }

    #[test]
    fn render_is_deterministic() {
        let repos = vec!["https://repo1.maven.org/maven2/".to_string()];
        let format = V2Format::new(repos.clone());

        let first = format.render(&guava_set()).to_json().unwrap();
        let second = V2Format::new(repos).render(&guava_set()).to_json().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_collections_are_dropped() {
        let lock = V2Format::new(Vec::new()).render(&guava_set());

        // failureaccess has no dependencies and no packages, so it appears in
        // neither map.
        assert!(!lock.dependencies.contains_key("com.google.guava:failureaccess:jar"));
        assert!(!lock.packages.contains_key("com.google.guava:failureaccess:jar"));
        assert_eq!(
            lock.dependencies["com.google.guava:guava:jar"],
            BTreeSet::from(["com.google.guava:failureaccess:jar".to_string()])
        );
    }

    #[test]
    fn skipped_and_files_are_omitted_when_absent() {
        let lock = V2Format::new(Vec::new()).render(&guava_set());
        let json = lock.to_json().unwrap();

        assert!(!json.contains("\"skipped\""));
        assert!(!json.contains("\"files\""));
        assert!(json.contains("\"version\": \"2\""));
    }

    #[test]
    fn default_classifier_shasum_is_jar() {
        let lock = V2Format::new(Vec::new()).render(&guava_set());

        assert_eq!(
            lock.shasums["com.google.guava:guava:jar"]["jar"],
            "aabb".to_string()
        );
    }

    #[test]
    fn classified_artifacts_share_a_short_key() {
        let mut linux = info("io.netty:netty:so:linux:4.1", "1111");
        linux.javadoc_sha256 = Some("2222".to_string());
        let set = BTreeSet::from([linux]);

        let lock = V2Format::new(Vec::new()).render(&set);
        let shas = &lock.shasums["io.netty:netty:so"];

        assert_eq!(shas["linux"], "1111");
        assert_eq!(shas["javadoc"], "2222");
    }

    #[test]
    fn m2local_flag_is_case_insensitive_and_absent_otherwise() {
        let with = V2Format::new(vec!["M2Local/".to_string()]).render(&BTreeSet::new());
        assert_eq!(with.m2local, Some(true));

        let without =
            V2Format::new(vec!["https://repo1.maven.org/maven2/".to_string()]).render(&BTreeSet::new());
        assert_eq!(without.m2local, None);
        assert!(!without.to_json().unwrap().contains("m2local"));
    }

    #[test]
    fn repository_order_is_preserved() {
        let repos = vec![
            "https://z.example.com/".to_string(),
            "https://a.example.com/".to_string(),
            "https://z.example.com/".to_string(),
        ];
        let lock = V2Format::new(repos).render(&BTreeSet::new());

        let urls: Vec<&str> = lock.repositories.iter().map(|(url, _)| url).collect();
        assert_eq!(urls, vec!["https://z.example.com/", "https://a.example.com/"]);

        let json = lock.to_json().unwrap();
        let z = json.find("https://z.example.com/").unwrap();
        let a = json.find("https://a.example.com/").unwrap();
        assert!(z < a);
    }

    #[test]
    fn nebula_payload_matches_v2() {
        let repos = vec!["https://repo1.maven.org/maven2/".to_string()];
        let v2 = V2Format::new(repos.clone()).render(&guava_set());
        let nebula = NebulaFormat::new(repos).render(&guava_set());

        assert_eq!(v2.dependencies, nebula.dependencies);
        assert_eq!(v2.packages, nebula.packages);
        assert_eq!(v2.version, nebula.version);
        assert_eq!(
            nebula.artifacts["com.google.guava:guava:jar"].version,
            "31.1-jre"
        );
        assert_eq!(
            nebula.artifacts["com.google.guava:guava:jar"].shasums,
            v2.shasums["com.google.guava:guava:jar"]
        );
    }

    #[test]
    fn same_key_records_union_dependencies_and_packages() {
        // The same artifact at two versions shares one lock-file key; the
        // second record must add to the first, not replace it.
        let mut one = info("g:a:1.0", "aa");
        one.dependencies.insert(Coordinates::parse("g:x:1.0").unwrap());
        one.packages.insert("g.a.one".to_string());

        let mut two = info("g:a:2.0", "bb");
        two.dependencies.insert(Coordinates::parse("g:y:1.0").unwrap());
        two.packages.insert("g.a.two".to_string());

        let set = BTreeSet::from([one, two]);

        let v2 = V2Format::new(Vec::new()).render(&set);
        assert_eq!(
            v2.dependencies["g:a:jar"],
            BTreeSet::from(["g:x:jar".to_string(), "g:y:jar".to_string()])
        );
        assert_eq!(
            v2.packages["g:a:jar"],
            BTreeSet::from(["g.a.one".to_string(), "g.a.two".to_string()])
        );

        let nebula = NebulaFormat::new(Vec::new()).render(&set);
        assert_eq!(nebula.dependencies, v2.dependencies);
        assert_eq!(nebula.packages, v2.packages);
    }

    #[test]
    fn assembled_graph_renders_without_skip_nodes() {
        use crate::graph::DependencyGraph;
        use crate::info::{assemble, ArtifactData};
        use crate::resolve::ResolutionResult;
        use std::collections::BTreeMap;

        let a = Coordinates::parse("g:a:1.0").unwrap();
        let skip = Coordinates::parse("g:skip:1.0").unwrap();
        let b = Coordinates::parse("g:b:1.0").unwrap();

        let mut graph = DependencyGraph::new();
        graph.add_edge(&a, &skip);
        graph.add_edge(&skip, &b);

        let mut data = BTreeMap::new();
        data.insert(
            a.clone(),
            ArtifactData {
                sha256: Some("aa".to_string()),
                file: Some("g/a/1.0/a-1.0.jar".to_string()),
                packages: BTreeSet::new(),
            },
        );
        data.insert(skip.clone(), ArtifactData::default());
        data.insert(
            b.clone(),
            ArtifactData {
                sha256: Some("bb".to_string()),
                file: Some("g/b/1.0/b-1.0.jar".to_string()),
                packages: BTreeSet::new(),
            },
        );

        let (infos, skipped) = assemble(&ResolutionResult::new(graph, BTreeSet::new()), &data);

        let mut lock = V2Format::new(Vec::new()).render(&infos);
        lock.skipped = skipped;

        assert_eq!(
            lock.artifacts,
            BTreeSet::from(["g:a:1.0".to_string(), "g:b:1.0".to_string()])
        );
        assert_eq!(
            lock.dependencies["g:a:jar"],
            BTreeSet::from(["g:b:jar".to_string()])
        );
        assert_eq!(lock.skipped, BTreeSet::from(["g:skip:1.0".to_string()]));
        assert!(lock.to_json().unwrap().contains("\"skipped\""));
    }

    #[test]
    fn nebula_merges_classifiers_under_one_artifact() {
        let plain = info("g:a:1.0", "aa");
        let linux = info("g:a:jar:linux:1.0", "bb");
        let set = BTreeSet::from([plain, linux]);

        let lock = NebulaFormat::new(Vec::new()).render(&set);

        assert_eq!(lock.artifacts.len(), 1);
        let artifact = &lock.artifacts["g:a:jar"];
        assert_eq!(artifact.shasums["jar"], "aa");
        assert_eq!(artifact.shasums["linux"], "bb");
    }
}
