//! Async filesystem helpers shared by the bundle stages.
//!
//! Destination parents are created on demand and every I/O error carries the
//! path it failed on.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    io,
    path::{Component, Path},
};
use tokio::fs;

/// Creates `path` and its parents. With `erase`, whatever was at `path` is removed first.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_path(path).await?;
    }

    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes a file, symlink, or directory tree. Missing paths are fine.
pub async fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).fs_context("inspecting", path),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };
    match removed {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing", path),
    }
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }
    fs::write(path, contents).await.fs_context("writing", path)
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir_sync(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir_sync(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file_sync(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file_sync(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Creates `dst` as a symbolic link to the directory `src`.
pub async fn symlink_dir(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }
    let (src, dst) = (src.to_path_buf(), dst.to_path_buf());
    tokio::task::spawn_blocking(move || symlink_dir_sync(&src, &dst).fs_context("linking", &dst))
        .await
        .map_err(|e| Error::GenericError(format!("Symlink task panicked: {e}")))?
}

/// Copies one regular file to `to`. Fails when `from` is missing or not a file.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{} does not exist", from.display())));
    }
    if !from.is_file() {
        return Err(Error::GenericError(format!("{} is not a file", from.display())));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying", from)?;
    Ok(())
}

/// Copies the directory tree `from` to `to`, recreating symlinks as symlinks.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{} does not exist", from.display())));
    }
    if !from.is_dir() {
        return Err(Error::GenericError(format!("{} is not a directory", from.display())));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry?;
            let dest_path = to.join(entry.path().strip_prefix(&from)?);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path()).fs_context("reading link", entry.path())?;
                if entry.path().is_dir() {
                    symlink_dir_sync(&target, &dest_path).fs_context("linking", &dest_path)?;
                } else {
                    symlink_file_sync(&target, &dest_path).fs_context("linking", &dest_path)?;
                }
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path).fs_context("copying", entry.path())?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {e}")))?
}

/// Renders a relative path as a URL path with `/` separators.
pub fn url_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
