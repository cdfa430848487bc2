// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary manifest trees.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tessera_discovery::{DEFAULT_MANIFEST_FILE, ManifestDiscovery};

/// A feed aggregator's components: two fetchers and a processor.
pub const AGGREGATOR_MANIFEST: &str = r#"
provider = "aggregator"

[[component]]
id = "default"
family = "fetcher"
handle = "aggregator.fetcher.http"
label = "HTTP fetcher"

[component.config]
keys = { url = { kind = "string", required = true }, timeout = { kind = "integer", required = true } }

[[component]]
id = "test"
family = "fetcher"
handle = "aggregator.fetcher.static"
label = "Static test fetcher"

[[component]]
id = "default"
family = "processor"
handle = "aggregator.processor.default"
label = "Default processor"
"#;

/// A temporary directory holding one manifest per subdirectory.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct ManifestFixture {
    dir: TempDir,
}

impl ManifestFixture {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Fixture pre-populated with [`AGGREGATOR_MANIFEST`] under `aggregator/`.
    pub fn aggregator() -> std::io::Result<Self> {
        let fixture = Self::new()?;
        fixture.write("aggregator", AGGREGATOR_MANIFEST)?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `<root>/<module>/component.toml`, replacing any
    /// existing manifest.
    pub fn write(&self, module: &str, content: &str) -> std::io::Result<PathBuf> {
        let dir = self.dir.path().join(module);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(DEFAULT_MANIFEST_FILE);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn remove(&self, module: &str) -> std::io::Result<()> {
        std::fs::remove_dir_all(self.dir.path().join(module))
    }

    /// Manifest discovery rooted at this fixture.
    pub fn discovery(&self) -> ManifestDiscovery {
        ManifestDiscovery::new(vec![self.root().to_path_buf()])
    }
}
