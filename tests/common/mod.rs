//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_definition("firefox.sls", definitions::FIREFOX);
//! let mut cmd = cargo_bin_cmd!("winrepo");
//! cmd.arg("--repo-root").arg(fixture.repo_root()).arg("genrepo").assert().success();
//! ```

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::definitions;
    pub use super::TestFixture;
}

/// Package definition documents used across tests.
pub mod definitions {
    pub const FIREFOX: &str = r#"
firefox:
  '115.0':
    full_name: Mozilla Firefox
    installer: https://example.com/firefox-115.0.exe
    install_flags: -ms
    uninstaller: '%ProgramFiles%\Mozilla Firefox\uninstall\helper.exe'
    uninstall_flags: -ms
    msiexec: false
    reboot: false
"#;

    pub const SEVENZIP: &str = r#"
7zip:
  9.20.00.0:
    full_name: 7-Zip 9.20 (x64 edition)
    installer: salt://win/repo/7zip/7z920-x64.msi
    msiexec: true
  16.04:
    full_name: 7-Zip 16.04 (x64 edition)
    installer: salt://win/repo/7zip/7z1604-x64.msi
    msiexec: true
"#;

    /// A float version key, canonicalized to "1.0".
    pub const FLOAT_KEY: &str = "pkgA:\n  1.0:\n    full_name: Pkg A\n";

    pub const NOT_A_MAPPING: &str = "pkgA:\n  '1.0': not-a-mapping\n";

    pub const BROKEN: &str = "npp:\n  '8.5':\n    full_name: [Notepad++\n";

    pub const COMMENTS_ONLY: &str = "# placeholder, definitions coming soon\n";
}

/// A temporary workspace with a definition tree under `repo/`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a definition document at `relative` inside the repository root.
    pub fn with_definition(self, relative: &str, content: &str) -> Self {
        self.temp_dir
            .child("repo")
            .child(relative)
            .write_str(content)
            .expect("Failed to write definition");
        self
    }

    /// Add a `winrepo.yaml` next to the repository root.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("winrepo.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    pub fn temp_dir(&self) -> &assert_fs::TempDir {
        &self.temp_dir
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn repo_root(&self) -> PathBuf {
        self.temp_dir.path().join("repo")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.temp_dir.path().join("git-cache")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.repo_root().join("winrepo.p")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
