// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin bundle packaging.
//!
//! A bundle is the plugin directory as a gzip'd tar plus the SHA-256 of
//! those bytes. Peers compare checksums to decide whether their installed
//! copy is stale, so the archive must depend only on the directory's
//! content: entries are written in sorted path order and header metadata
//! (timestamps, owners, permissions) is normalized. Symlinks are stored as
//! links and never followed.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use bulwark_core::{BulwarkError, PluginBundle};
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};

/// Archive `dir` and checksum the result.
pub fn package_plugin(dir: &Path) -> Result<PluginBundle, BulwarkError> {
    let data = archive_directory(dir)?;
    let checksum = sha256_hex(&data);
    tracing::debug!(
        plugin_dir = %dir.display(),
        bytes = data.len(),
        checksum = %checksum,
        "plugin packaged"
    );
    Ok(PluginBundle { data, checksum })
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// gzip'd tar of `dir`, rooted at the directory's own name.
pub fn archive_directory(dir: &Path) -> Result<Vec<u8>, BulwarkError> {
    let fail = |e: io::Error| {
        BulwarkError::plugin(format!("failed to package `{}`: {e}", dir.display()), e)
    };

    let root = dir.file_name().ok_or_else(|| BulwarkError::Plugin {
        message: format!("cannot package `{}`: path has no directory name", dir.display()),
        source: None,
    })?;

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    builder.mode(tar::HeaderMode::Deterministic);
    builder.follow_symlinks(false);
    builder.append_dir(root, dir).map_err(fail)?;
    append_tree(&mut builder, dir, Path::new(root)).map_err(fail)?;

    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(fail)
}

fn append_tree<W: Write>(
    builder: &mut tar::Builder<W>,
    dir: &Path,
    prefix: &Path,
) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = prefix.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            builder.append_dir(&name, &path)?;
            append_tree(builder, &path, &name)?;
        } else {
            builder.append_path_with_name(&path, &name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample_plugin(root: &Path) -> std::path::PathBuf {
        let dir = root.join("antibot");
        fs::create_dir_all(dir.join("ui")).unwrap();
        fs::write(dir.join("plugin.json"), r#"{"id": "antibot", "name": "Antibot"}"#).unwrap();
        fs::write(dir.join("antibot.lua"), "return {}\n").unwrap();
        fs::write(dir.join("ui").join("template.html"), "<p>antibot</p>").unwrap();
        dir
    }

    fn entry_names(data: &[u8]) -> Vec<String> {
        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(data));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                let path = e.unwrap().path().unwrap().display().to_string();
                path.trim_end_matches('/').to_string()
            })
            .collect()
    }

    #[test]
    fn checksum_is_stable_for_unchanged_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = sample_plugin(tmp.path());

        let first = package_plugin(&dir).unwrap();
        let second = package_plugin(&dir).unwrap();
        assert_eq!(first.checksum, second.checksum);
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn single_byte_change_changes_checksum() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = sample_plugin(tmp.path());
        let before = package_plugin(&dir).unwrap();

        fs::write(dir.join("antibot.lua"), "return {}\r").unwrap();
        let after = package_plugin(&dir).unwrap();
        assert_ne!(before.checksum, after.checksum);
    }

    #[test]
    fn checksum_matches_archive_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = sample_plugin(tmp.path());
        let bundle = package_plugin(&dir).unwrap();
        assert_eq!(bundle.checksum, sha256_hex(&bundle.data));
        assert_eq!(bundle.checksum.len(), 64);
    }

    #[test]
    fn archive_is_rooted_at_plugin_name_in_sorted_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = sample_plugin(tmp.path());
        let bundle = package_plugin(&dir).unwrap();

        let names = entry_names(&bundle.data);
        assert_eq!(
            names,
            vec![
                "antibot",
                "antibot/antibot.lua",
                "antibot/plugin.json",
                "antibot/ui",
                "antibot/ui/template.html",
            ]
        );
    }

    #[test]
    fn archived_file_content_is_preserved() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = sample_plugin(tmp.path());
        let bundle = package_plugin(&dir).unwrap();

        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(&bundle.data[..]));
        let mut found = None;
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            if entry.path().unwrap().ends_with("plugin.json") {
                let mut content = String::new();
                entry.read_to_string(&mut content).unwrap();
                found = Some(content);
            }
        }
        assert_eq!(found.as_deref(), Some(r#"{"id": "antibot", "name": "Antibot"}"#));
    }

    #[test]
    fn headers_carry_no_host_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = sample_plugin(tmp.path());
        let bundle = package_plugin(&dir).unwrap();

        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(&bundle.data[..]));
        let mut mtimes = Vec::new();
        for entry in archive.entries().unwrap() {
            let header = entry.unwrap().header().clone();
            assert_eq!(header.uid().unwrap(), 0);
            assert_eq!(header.gid().unwrap(), 0);
            mtimes.push(header.mtime().unwrap());
        }
        mtimes.dedup();
        assert_eq!(mtimes.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_archived_as_link() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = sample_plugin(tmp.path());
        std::os::unix::fs::symlink(".", dir.join("self")).unwrap();

        let bundle = package_plugin(&dir).unwrap();
        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(&bundle.data[..]));
        let link = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap())
            .find(|e| e.path().unwrap().ends_with("self"))
            .unwrap();
        assert_eq!(link.header().entry_type(), tar::EntryType::Symlink);
        assert_eq!(link.link_name().unwrap().unwrap(), Path::new("."));
        assert!(!entry_names(&bundle.data).iter().any(|n| n.contains("self/")));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_outside_plugin_does_not_copy_target() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = sample_plugin(tmp.path());
        fs::write(tmp.path().join("secret.txt"), "hunter2!\n").unwrap();
        std::os::unix::fs::symlink("../secret.txt", dir.join("link")).unwrap();

        let bundle = package_plugin(&dir).unwrap();
        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(&bundle.data[..]));
        let mut link = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap())
            .find(|e| e.path().unwrap().ends_with("link"))
            .unwrap();
        assert_eq!(link.header().entry_type(), tar::EntryType::Symlink);
        assert_eq!(link.header().size().unwrap(), 0);
        let mut content = String::new();
        link.read_to_string(&mut content).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = package_plugin(Path::new("/nonexistent/bulwark/plugin")).unwrap_err();
        assert!(matches!(err, BulwarkError::Plugin { .. }));
    }
}
