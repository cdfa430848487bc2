// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem discovery of component manifests.
//!
//! [`ManifestDiscovery`] walks each configured root in order, visiting
//! entries sorted by file name, and parses every file whose name matches the
//! manifest file name. Only components of the scanned family are returned.

use std::path::{Path, PathBuf};

use tessera_core::{Candidate, Discovery, DiscoveryError, Family};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::manifest::parse_manifest;

/// Default manifest file name.
pub const DEFAULT_MANIFEST_FILE: &str = "component.toml";

/// Discovers components from manifest files below a list of root directories.
#[derive(Debug, Clone)]
pub struct ManifestDiscovery {
    roots: Vec<PathBuf>,
    file_name: String,
    follow_links: bool,
    max_depth: Option<usize>,
}

impl ManifestDiscovery {
    /// Create a discovery over `roots`, searched in the given order.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            file_name: DEFAULT_MANIFEST_FILE.to_string(),
            follow_links: false,
            max_depth: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// All manifest files below the configured roots, in scan order.
    pub fn manifest_paths(&self) -> Result<Vec<PathBuf>, DiscoveryError> {
        let mut paths = Vec::new();
        for root in &self.roots {
            let mut walker = WalkDir::new(root)
                .follow_links(self.follow_links)
                .sort_by_file_name();
            if let Some(depth) = self.max_depth {
                walker = walker.max_depth(depth);
            }

            for entry in walker {
                let entry = entry.map_err(|e| {
                    let candidate = e.path().unwrap_or(root.as_path()).display().to_string();
                    DiscoveryError::Unreadable {
                        candidate,
                        source: e.into(),
                    }
                })?;
                if entry.file_type().is_file() && entry.file_name() == self.file_name.as_str() {
                    paths.push(entry.into_path());
                }
            }
        }
        Ok(paths)
    }

    fn read_manifest(path: &Path) -> Result<Vec<Candidate>, DiscoveryError> {
        let source = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| DiscoveryError::Unreadable {
            candidate: source.clone(),
            source: e,
        })?;
        parse_manifest(&source, &content)
    }
}

impl Discovery for ManifestDiscovery {
    fn candidates(&self, family: &Family) -> Result<Vec<Candidate>, DiscoveryError> {
        let mut candidates = Vec::new();
        let paths = self.manifest_paths()?;
        for path in &paths {
            let parsed = Self::read_manifest(path)?;
            debug!(path = %path.display(), components = parsed.len(), "parsed component manifest");
            candidates.extend(
                parsed
                    .into_iter()
                    .filter(|c| &c.definition.family == family),
            );
        }

        info!(
            family = %family,
            manifests = paths.len(),
            count = candidates.len(),
            "manifest scan complete"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn component(id: &str, family: &str) -> String {
        format!("[[component]]\nid = \"{id}\"\nfamily = \"{family}\"\nhandle = \"h.{id}\"\n\n")
    }

    #[test]
    fn scan_filters_by_family_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b_mod/component.toml", &component("beta", "fetcher"));
        write(
            dir.path(),
            "a_mod/component.toml",
            &(component("alpha", "fetcher") + &component("proc", "processor")),
        );
        write(dir.path(), "a_mod/README.md", "not a manifest");

        let discovery = ManifestDiscovery::new([dir.path()]);
        let index = discovery.scan(&Family::new("fetcher").unwrap()).unwrap();
        let ids: Vec<&str> = index.ids().collect();
        assert_eq!(ids, vec!["alpha", "beta"]);

        let processors = discovery.scan(&Family::new("processor").unwrap()).unwrap();
        assert_eq!(processors.len(), 1);
    }

    #[test]
    fn roots_are_scanned_in_configured_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(first.path(), "component.toml", &component("zulu", "fetcher"));
        write(second.path(), "component.toml", &component("alpha", "fetcher"));

        let discovery = ManifestDiscovery::new([first.path(), second.path()]);
        let index = discovery.scan(&Family::new("fetcher").unwrap()).unwrap();
        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["zulu", "alpha"]);
    }

    #[test]
    fn duplicate_across_manifests_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one/component.toml", &component("same", "fetcher"));
        write(dir.path(), "two/component.toml", &component("same", "fetcher"));

        let discovery = ManifestDiscovery::new([dir.path()]);
        let err = discovery.scan(&Family::new("fetcher").unwrap()).unwrap_err();
        match err {
            DiscoveryError::DuplicateId { id, first, second, .. } => {
                assert_eq!(id, "same");
                assert!(first.contains("one"));
                assert!(second.contains("two"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn same_id_in_different_families_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "component.toml",
            &(component("default", "fetcher") + &component("default", "processor")),
        );
        let discovery = ManifestDiscovery::new([dir.path()]);
        assert!(discovery.scan(&Family::new("fetcher").unwrap()).is_ok());
    }

    #[test]
    fn missing_root_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let discovery = ManifestDiscovery::new([dir.path().join("nope")]);
        let err = discovery.scan(&Family::new("fetcher").unwrap()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Unreadable { .. }));
        assert!(err.candidate().ends_with("nope"));
    }

    #[test]
    fn custom_file_name_and_depth() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "plugins.toml", &component("top", "fetcher"));
        write(dir.path(), "deep/er/plugins.toml", &component("deep", "fetcher"));

        let discovery = ManifestDiscovery::new([dir.path()])
            .with_file_name("plugins.toml")
            .max_depth(Some(1));
        let index = discovery.scan(&Family::new("fetcher").unwrap()).unwrap();
        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["top"]);
    }

    #[test]
    fn malformed_manifest_fails_scan() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "component.toml", "[[component]\nid=");
        let discovery = ManifestDiscovery::new([dir.path()]);
        let err = discovery.scan(&Family::new("fetcher").unwrap()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Malformed { .. }));
    }
}
