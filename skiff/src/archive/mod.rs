//! Local packaging of the application source tree.
//!
//! The staging transfer streams exactly one file through an exec session, so
//! the gzipped source tarball is wrapped in a second, plain tar archive whose
//! extraction leaves the inner tarball on the staging volume.

mod error;

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use snafu::ResultExt;
use tokio::task::spawn_blocking;

pub use self::error::Error;

/// Resolves the inbound source payload to a directory.
///
/// A directory passes through untouched; a gzipped tarball is unpacked into
/// `scratch` first.
pub async fn resolve_source(payload: &Path, scratch: &Path) -> Result<PathBuf, Error> {
    if payload.is_dir() {
        return Ok(payload.to_path_buf());
    }

    let file_name = payload.file_name().and_then(OsStr::to_str).unwrap_or_default();
    if payload.is_file() && (file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz")) {
        let destination = scratch.join("source");
        unpack_archive(payload, &destination).await?;
        return Ok(destination);
    }

    error::UnsupportedSourcePayloadSnafu { path: payload.to_path_buf() }.fail()
}

/// Packs a directory tree into a gzipped tarball at `archive`.
pub async fn pack_directory(source_dir: &Path, archive: &Path) -> Result<(), Error> {
    let (source_dir, archive) = (source_dir.to_owned(), archive.to_owned());
    let context = error::PackDirectorySnafu { source_dir: source_dir.clone(), archive: archive.clone() };
    spawn_blocking(move || pack_directory_sync(&source_dir, &archive))
        .await
        .context(error::JoinArchiveTaskSnafu)?
        .context(context)
}

/// Wraps a single file in an uncompressed tar archive at `archive`.
pub async fn wrap_single_file(inner: &Path, archive: &Path) -> Result<(), Error> {
    let (inner, archive) = (inner.to_owned(), archive.to_owned());
    let context = error::WrapArchiveSnafu { inner: inner.clone(), archive: archive.clone() };
    spawn_blocking(move || wrap_single_file_sync(&inner, &archive))
        .await
        .context(error::JoinArchiveTaskSnafu)?
        .context(context)
}

/// Unpacks a gzipped tarball into `destination`, creating it when absent.
pub async fn unpack_archive(archive: &Path, destination: &Path) -> Result<(), Error> {
    let (archive, destination) = (archive.to_owned(), destination.to_owned());
    let context =
        error::UnpackArchiveSnafu { archive: archive.clone(), destination: destination.clone() };
    spawn_blocking(move || unpack_archive_sync(&archive, &destination))
        .await
        .context(error::JoinArchiveTaskSnafu)?
        .context(context)
}

fn pack_directory_sync(source_dir: &Path, archive: &Path) -> std::io::Result<()> {
    let file = std::fs::File::create(archive)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.append_dir_all("", source_dir)?;
    let encoder = builder.into_inner()?;
    let _file = encoder.finish()?;
    Ok(())
}

fn wrap_single_file_sync(inner: &Path, archive: &Path) -> std::io::Result<()> {
    let file = std::fs::File::create(archive)?;
    let mut builder = tar::Builder::new(file);
    let name = inner.file_name().unwrap_or_else(|| OsStr::new("payload.tar.gz"));
    builder.append_path_with_name(inner, name)?;
    let _file = builder.into_inner()?;
    Ok(())
}

fn unpack_archive_sync(archive: &Path, destination: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(destination)?;
    let file = std::fs::File::open(archive)?;
    let mut unpacker = tar::Archive::new(GzDecoder::new(file));
    unpacker.set_preserve_permissions(true);
    unpacker.unpack(destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sample_tree(root: &Path) {
        std::fs::create_dir_all(root.join("src")).expect("create dirs");
        std::fs::write(root.join("Dockerfile"), "FROM scratch\n").expect("write Dockerfile");
        std::fs::write(root.join("src").join("app.txt"), "hello").expect("write app.txt");
    }

    #[tokio::test]
    async fn test_pack_then_unpack_preserves_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("app");
        write_sample_tree(&source);

        let archive = dir.path().join("source.tar.gz");
        pack_directory(&source, &archive).await.expect("pack");

        let restored = dir.path().join("restored");
        unpack_archive(&archive, &restored).await.expect("unpack");

        let dockerfile = std::fs::read_to_string(restored.join("Dockerfile")).expect("read");
        assert_eq!(dockerfile, "FROM scratch\n");
        let app = std::fs::read_to_string(restored.join("src").join("app.txt")).expect("read");
        assert_eq!(app, "hello");
    }

    #[tokio::test]
    async fn test_wrap_single_file_keeps_inner_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inner = dir.path().join("source.tar.gz");
        std::fs::write(&inner, b"not really a tarball").expect("write inner");

        let wrapper = dir.path().join("transfer.tar");
        wrap_single_file(&inner, &wrapper).await.expect("wrap");

        let file = std::fs::File::open(&wrapper).expect("open wrapper");
        let mut unpacker = tar::Archive::new(file);
        let names: Vec<String> = unpacker
            .entries()
            .expect("entries")
            .map(|entry| {
                entry.expect("entry").path().expect("path").to_string_lossy().into_owned()
            })
            .collect();
        assert_eq!(names, vec!["source.tar.gz".to_string()]);
    }

    #[tokio::test]
    async fn test_resolve_source_passes_directories_through() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("app");
        write_sample_tree(&source);

        let scratch = dir.path().join("scratch");
        let resolved = resolve_source(&source, &scratch).await.expect("resolve");
        assert_eq!(resolved, source);
    }

    #[tokio::test]
    async fn test_resolve_source_unpacks_tarball_payloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("app");
        write_sample_tree(&source);
        let payload = dir.path().join("app.tar.gz");
        pack_directory(&source, &payload).await.expect("pack");

        let scratch = dir.path().join("scratch");
        std::fs::create_dir_all(&scratch).expect("scratch");
        let resolved = resolve_source(&payload, &scratch).await.expect("resolve");
        assert!(resolved.starts_with(&scratch));
        assert!(resolved.join("Dockerfile").is_file());
    }

    #[tokio::test]
    async fn test_resolve_source_rejects_other_payloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = dir.path().join("app.zip");
        std::fs::write(&payload, b"zip").expect("write payload");

        let result = resolve_source(&payload, dir.path()).await;
        assert!(matches!(result, Err(Error::UnsupportedSourcePayload { .. })));
    }
}
