// ABOUTME: Reads application manifests out of artifact archives.
// ABOUTME: Produces the artifact-name to manifest mapping consumed by the merger.

use serde::Deserialize;
use serde_yaml::Mapping;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::appstack::Manifests;
use crate::error::{Error, Result};

pub const MANIFEST_FILENAME: &str = "manifest.yml";

/// File name suffix of packed artifacts.
pub const ARTIFACT_EXTENSION: &str = ".zip";

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    applications: Vec<Mapping>,
}

/// Name of the project an artifact was built from.
///
/// Everything before the first `-` that is followed by a digit or by `v` and a
/// digit (`console-v1.2.zip` and `console-0.3.zip` both give `console`).
/// Names without a version suffix are cut at the first `.`.
pub fn artifact_name(file_name: &str) -> &str {
    let bytes = file_name.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'-' {
            continue;
        }
        let rest = &bytes[i + 1..];
        let digit_at = if rest.first() == Some(&b'v') { 1 } else { 0 };
        if rest.get(digit_at).is_some_and(u8::is_ascii_digit) {
            return &file_name[..i];
        }
    }
    file_name.split('.').next().unwrap_or(file_name)
}

/// Parse a manifest file; only the first application entry is used.
pub fn parse_manifest(content: &str, path: &Path) -> Result<Mapping> {
    let file: ManifestFile = serde_yaml::from_str(content)?;
    file.applications
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidManifest {
            path: path.to_path_buf(),
            reason: "no entries under \"applications\"".to_string(),
        })
}

/// Collect the manifests of every artifact in `dir`.
///
/// Artifacts are `.zip` archives with `manifest.yml` at their root, or
/// directories holding an unpacked artifact. Artifacts without a manifest are
/// skipped; other files are ignored.
pub fn read_manifests(dir: &Path) -> Result<Manifests> {
    if !dir.is_dir() {
        return Err(Error::ArtifactsNotFound(dir.to_path_buf()));
    }
    tracing::info!(dir = %dir.display(), "reading manifests from artifacts");

    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut manifests = Manifests::new();
    for entry in entries {
        let path = entry.path();
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        let content = if path.is_dir() {
            read_unpacked(&path)?
        } else if file_name.ends_with(ARTIFACT_EXTENSION) {
            read_zipped(&path)?
        } else {
            continue;
        };
        let Some(content) = content else {
            tracing::debug!(artifact = %path.display(), "doesn't contain {MANIFEST_FILENAME}, skipping");
            continue;
        };

        let name = artifact_name(&file_name).to_string();
        let manifest = parse_manifest(&content, &path.join(MANIFEST_FILENAME))?;

        tracing::debug!(artifact = %name, "got manifest");
        manifests.insert(name, manifest);
    }

    Ok(manifests)
}

fn read_unpacked(dir: &Path) -> Result<Option<String>> {
    let manifest_path = dir.join(MANIFEST_FILENAME);
    if !manifest_path.is_file() {
        return Ok(None);
    }
    Ok(Some(std::fs::read_to_string(manifest_path)?))
}

fn read_zipped(path: &Path) -> Result<Option<String>> {
    let archive_error = |source| Error::Archive {
        path: path.to_path_buf(),
        source,
    };

    let mut archive = ZipArchive::new(File::open(path)?).map_err(archive_error)?;
    let mut manifest = match archive.by_name(MANIFEST_FILENAME) {
        Ok(manifest) => manifest,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(archive_error(e)),
    };

    let mut content = String::new();
    manifest.read_to_string(&mut content)?;
    Ok(Some(content))
}
