//! Filesystem assertions and helpers for installed JDK trees.

use std::path::{Path, PathBuf};

use super::error::{Error, ErrorExt, Result};

/// Every file of the JDK image exists in the install with the same size.
pub async fn assert_installed_files(image: &Path, installed: &Path) -> Result<()> {
    let image = image.to_path_buf();
    let installed = installed.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut checked = 0usize;
        for entry in walkdir::WalkDir::new(&image).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&image)
                .map_err(|e| Error::GenericError(e.to_string()))?;
            let inst = installed.join(rel);
            if !inst.is_file() {
                return Err(Error::assertion(
                    format!("installed file, path: [{}]", rel.display()),
                    "<present>",
                    "<absent>",
                ));
            }

            let expected = entry.metadata()?.len();
            let actual = std::fs::metadata(&inst)
                .fs_context("reading installed file metadata", &inst)?
                .len();
            if expected != actual {
                return Err(Error::assertion(
                    format!("files size must be the same, path: [{}]", rel.display()),
                    expected,
                    actual,
                ));
            }
            checked += 1;
        }
        log::debug!("Verified {} installed file(s) against {}", checked, image.display());
        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("installed files check panicked: {e}")))?
}

/// The vendor extension added by the example descriptor transforms.
pub async fn assert_vendor_installed_files(installed: &Path) -> Result<()> {
    let vendor_ext1 = installed.join("vendor_ext1");
    if !vendor_ext1.is_dir() {
        return Err(Error::assertion(
            format!("directory, path: [{}]", vendor_ext1.display()),
            "<present>",
            "<absent>",
        ));
    }
    for (name, expected) in [("file1.txt", "foo"), ("file2.txt", "bar")] {
        let file = vendor_ext1.join(name);
        let actual = tokio::fs::read_to_string(&file)
            .await
            .fs_context("reading vendor file", &file)?;
        if actual != expected {
            return Err(Error::assertion(format!("vendor_ext1/{name}"), expected, actual));
        }
    }
    Ok(())
}

/// Recursively copies `from` into `to`, creating directories as needed.
pub async fn copy_dir_recursive(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::NotFound(format!("{} is not a directory", from.display())));
    }
    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(&from)
                .map_err(|e| Error::GenericError(e.to_string()))?;
            let dest = to.join(rel);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest).fs_context("creating directory", &dest)?;
            } else {
                std::fs::copy(entry.path(), &dest).fs_context("copying file", &dest)?;
            }
        }
        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("directory copy task panicked: {e}")))?
}

/// A path under `dir` named `name`, suffixed `-1`, `-2`, ... until unused.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    (1..)
        .map(|i| match ext {
            Some(ext) => dir.join(format!("{stem}-{i}.{ext}")),
            None => dir.join(format!("{stem}-{i}")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
