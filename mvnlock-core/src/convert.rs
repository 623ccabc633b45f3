use crate::lockfile::{uses_m2local, LockFile, RepositoryMap, LOCK_FILE_VERSION};
use crate::reconcile::reconcile;
use crate::{Coordinates, MvnlockError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// One record of the raw dependency tree a resolution backend writes out: a
/// flat list, one entry per downloaded (or merely declared) artifact.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawDependency {
    pub coord: Option<String>,
    pub file: Option<String>,
    pub sha256: Option<String>,
    #[serde(default)]
    pub mirror_urls: Vec<String>,
    #[serde(default, rename = "directDependencies")]
    pub direct_dependencies: Vec<String>,
    #[serde(default)]
    pub packages: Vec<String>,
}

impl RawDependency {
    /// Backends like to include entries that have dependencies but no
    /// physical output. They stay in the graph so everything wires up, but
    /// they produce no artifact of their own.
    fn is_skip(&self) -> bool {
        self.coord.is_none()
            || self.sha256.is_none()
            || self.file.as_deref().unwrap_or("").is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDependencyTree {
    #[serde(default)]
    dependencies: Vec<RawDependency>,
}

/// Converts a backend's raw JSON dependency tree into the v2 lock file,
/// reconciling every declared coordinate against the file the backend
/// actually produced.
pub struct LockFileConverter {
    repositories: Vec<String>,
    tree: RawDependencyTree,
}

impl LockFileConverter {
    pub fn new(repositories: Vec<String>, path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| MvnlockError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(repositories, &data, path)
    }

    pub fn from_json(repositories: Vec<String>, json: &str, origin: &Path) -> Result<Self> {
        let tree = serde_json::from_str(json).map_err(|source| MvnlockError::ParseJson {
            path: PathBuf::from(origin),
            source,
        })?;

        Ok(LockFileConverter { repositories, tree })
    }

    pub fn convert(&self) -> Result<LockFile> {
        let mappings = self.derive_coordinate_mappings()?;
        let entries: HashMap<&str, &RawDependency> = self
            .tree
            .dependencies
            .iter()
            .filter_map(|entry| entry.coord.as_deref().map(|coord| (coord, entry)))
            .collect();

        let mut artifacts = BTreeSet::new();
        let mut dependencies = BTreeMap::new();
        let mut packages = BTreeMap::new();
        let mut shasums: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut skipped = BTreeSet::new();
        let mut files = BTreeMap::new();
        let mut repositories = RepositoryMap::seed(&self.repositories);

        for entry in &self.tree.dependencies {
            // No coordinate at all: nothing we could record, even as skipped.
            let Some(coord) = entry.coord.as_deref() else {
                continue;
            };

            if entry.is_skip() {
                skipped.insert(coord.to_string());
                continue;
            }

            let coords = &mappings[&Coordinates::parse(coord)?];
            let key = coords.as_key();
            let short_key = coords.set_classifier("jar").as_key();

            if let Some(file) = &entry.file {
                files.insert(coords.to_string(), file.clone());
            }

            let classifier = if coords.classifier().is_empty() {
                "jar"
            } else {
                coords.classifier()
            };
            if let Some(sha256) = &entry.sha256 {
                shasums
                    .entry(short_key)
                    .or_default()
                    .insert(classifier.to_string(), sha256.clone());
            }

            // Javadocs and sources only need their checksum recorded; keeping
            // them out of everything else keeps the lock file small.
            if matches!(coords.classifier(), "javadoc" | "sources") {
                continue;
            }

            artifacts.insert(coords.to_string());

            for mirror_url in &entry.mirror_urls {
                for repository in &self.repositories {
                    if mirror_url.starts_with(repository) {
                        repositories.attribute(repository, &key);
                    }
                }
            }

            // Entries can share a key (one artifact at two versions); union
            // rather than replace.
            let direct = self.expand_direct_dependencies(entry, &entries, &mappings)?;
            if !direct.is_empty() {
                dependencies
                    .entry(key.clone())
                    .or_insert_with(BTreeSet::new)
                    .extend(direct);
            }

            if !entry.packages.is_empty() {
                packages
                    .entry(key)
                    .or_insert_with(BTreeSet::new)
                    .extend(entry.packages.iter().cloned());
            }
        }

        Ok(LockFile {
            artifacts,
            dependencies,
            skipped,
            packages,
            m2local: uses_m2local(&self.repositories),
            repositories,
            shasums,
            version: LOCK_FILE_VERSION.to_string(),
            files: Some(files),
        })
    }

    /// Reconciles every declared coordinate against its downloaded file up
    /// front. Skip entries participate too; their corrected coordinates are
    /// still needed when other entries name them as dependencies.
    fn derive_coordinate_mappings(&self) -> Result<HashMap<Coordinates, Coordinates>> {
        let mut mappings = HashMap::new();

        for entry in &self.tree.dependencies {
            let Some(coord) = entry.coord.as_deref() else {
                continue;
            };
            let declared = Coordinates::parse(coord)?;
            let corrected = reconcile(&declared, entry.file.as_deref())?;
            mappings.insert(declared, corrected);
        }

        Ok(mappings)
    }

    /// An entry's direct dependency keys, with skip entries flattened into
    /// their own dependencies until only real artifacts remain. The visited
    /// set guards against skip cycles.
    fn expand_direct_dependencies(
        &self,
        entry: &RawDependency,
        entries: &HashMap<&str, &RawDependency>,
        mappings: &HashMap<Coordinates, Coordinates>,
    ) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        let mut stack: Vec<&str> = entry.direct_dependencies.iter().map(String::as_str).collect();
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(coord) = stack.pop() {
            if !visited.insert(coord) {
                continue;
            }

            if let Some(dep) = entries.get(coord)
                && dep.is_skip()
            {
                stack.extend(dep.direct_dependencies.iter().map(String::as_str));
                continue;
            }

            let declared = Coordinates::parse(coord)?;
            let coords = mappings.get(&declared).unwrap_or(&declared);
            keys.insert(coords.as_key());
        }

        Ok(keys)
    }
}
