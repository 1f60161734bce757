//! Stage 4: Writing the cache file
//!
//! The repository index is encoded as MessagePack with named fields, so the
//! file holds a map with the keys `repo` and `name_map`.
//!
//! In [`WriteMode::Atomic`] the bytes go to a temporary file in the target
//! directory that is then renamed over the target, so readers never see a
//! half-written cache. [`WriteMode::Direct`] truncates the target in place.
//! Write failures are returned as-is and never retried.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use super::RepositoryIndex;
use crate::config::WriteMode;
use crate::error::{Error, Result};

/// Where the cache went and how large it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Encodes an index to cache file bytes.
pub fn encode(index: &RepositoryIndex) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(index)?)
}

/// Decodes cache file bytes.
pub fn decode(bytes: &[u8]) -> Result<RepositoryIndex> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Writes `index` to `target`, creating or replacing it.
pub fn write(index: &RepositoryIndex, target: &Path, mode: WriteMode) -> Result<WriteSummary> {
    let bytes = encode(index)?;
    let cache_write = |source| Error::CacheWrite {
        path: target.to_path_buf(),
        source,
    };

    match mode {
        WriteMode::Direct => fs::write(target, &bytes).map_err(cache_write)?,
        WriteMode::Atomic => {
            let dir = match target.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut temp = NamedTempFile::new_in(dir).map_err(cache_write)?;
            temp.write_all(&bytes).map_err(cache_write)?;
            temp.as_file().sync_all().map_err(cache_write)?;
            temp.persist(target).map_err(|e| cache_write(e.error))?;

            // Temp files are created owner-only.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(target, fs::Permissions::from_mode(0o644))
                    .map_err(cache_write)?;
            }
        }
    }

    Ok(WriteSummary {
        path: target.to_path_buf(),
        bytes: bytes.len(),
    })
}

/// Reads a cache file back into an index.
pub fn read(path: &Path) -> Result<RepositoryIndex> {
    let bytes = fs::read(path).map_err(|e| Error::CacheRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    decode(&bytes).map_err(|e| Error::CacheRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genrepo::{PackageVersions, VersionRecord};
    use serde_yaml::Value;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_index() -> RepositoryIndex {
        let record: VersionRecord = serde_yaml::from_str(
            "full_name: Mozilla Firefox\ninstaller: https://example.com/ff.exe\ninstall_flags: -ms\nreboot: false\nlocale: en_US\nmsiexec: false\nsize: 52428800\nratio: 1.5\n",
        )
        .unwrap();
        let mut versions = PackageVersions::new();
        versions.insert("115.0".to_string(), record);

        let mut index = RepositoryIndex::new();
        index.repo.insert("firefox".to_string(), versions);
        index
            .name_map
            .insert("Mozilla Firefox".to_string(), "firefox".to_string());
        index
    }

    #[test]
    fn test_encoded_top_level_keys() {
        let bytes = encode(&sample_index()).unwrap();
        let generic: BTreeMap<String, serde::de::IgnoredAny> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(generic.keys().collect::<Vec<_>>(), ["name_map", "repo"]);
    }

    #[test]
    fn test_write_and_read_back_atomic() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("winrepo.p");
        let index = sample_index();

        let summary = write(&index, &target, WriteMode::Atomic).unwrap();

        assert_eq!(summary.path, target);
        assert_eq!(summary.bytes as u64, fs::metadata(&target).unwrap().len());
        assert_eq!(read(&target).unwrap(), index);
        // No temp files left behind
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_direct_truncates_existing() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("winrepo.p");
        fs::write(&target, vec![0xffu8; 4096]).unwrap();

        let summary = write(&RepositoryIndex::new(), &target, WriteMode::Direct).unwrap();

        assert_eq!(fs::metadata(&target).unwrap().len(), summary.bytes as u64);
        assert_eq!(read(&target).unwrap(), RepositoryIndex::new());
    }

    #[test]
    fn test_write_is_deterministic() {
        let index = sample_index();
        assert_eq!(encode(&index).unwrap(), encode(&index.clone()).unwrap());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("missing").join("winrepo.p");

        for mode in [WriteMode::Atomic, WriteMode::Direct] {
            let err = write(&sample_index(), &target, mode).unwrap_err();
            assert!(matches!(err, Error::CacheWrite { .. }), "mode {:?}", mode);
        }
    }

    #[test]
    fn test_read_garbage_is_cache_read_error() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("winrepo.p");
        fs::write(&target, b"definitely not msgpack").unwrap();

        assert!(matches!(read(&target), Err(Error::CacheRead { .. })));
    }

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = read(&temp.path().join("winrepo.p")).unwrap_err();
        assert!(err.to_string().contains("Failed to read cache file"));
    }

    #[test]
    fn test_round_trip_keeps_value_types() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("winrepo.p");
        write(&sample_index(), &target, WriteMode::Atomic).unwrap();

        let cached = read(&target).unwrap();
        let record = &cached.repo["firefox"]["115.0"];
        assert_eq!(record.get("reboot"), Some(&Value::Bool(false)));
        assert_eq!(record.get("size"), Some(&Value::Number(52428800.into())));
        assert_eq!(record.get("ratio"), Some(&Value::Number(1.5.into())));
    }
}
