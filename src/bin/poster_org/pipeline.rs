//! Poster source discovery and archive extraction.
//!
//! Scans the discovered poster root folders, categorizes their contents into
//! zip bundles, folders, and loose files, and provides the extraction and
//! archiving primitives the organizer drives per bundle.

use std::fs;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Name of the holding area for processed bundles under the poster root.
pub const ARCHIVE_DIR_NAME: &str = "Archives";

/// OS junk folders that never contain posters.
const JUNK_DIR_NAMES: &[&str] = &["__MACOSX"];

/// Matches a "<title> set by <creator>" prefix, used to trim trailing junk
/// from a bundle name once underscores have been replaced.
static RE_SET_BY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+\bset by \S+").expect("Invalid set by prefix regex"));

/// A poster zip bundle with the cleaned name used as its matching query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipBundle {
    /// Cleaned file stem, e.g. "Dune Part Two set by fan123".
    pub name: String,
    pub path: PathBuf,
}

/// Categorized contents of the discovered poster root folders.
#[derive(Debug, Default)]
pub struct Posters {
    pub bundles: Vec<ZipBundle>,
    pub folders: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Clean a bundle file name for matching.
///
/// Drops a double-underscore id suffix, replaces underscores with spaces,
/// and trims anything after a "set by <creator>" credit:
/// `Dune_Part_Two_set_by_fan123__98765.zip` cleans to
/// `Dune Part Two set by fan123.zip`.
#[must_use]
pub fn clean_bundle_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = poster_tools::path_to_file_stem_string(path);
    let extension = poster_tools::os_str_to_string(path.extension().unwrap_or_default());

    let stem = stem.split("__").next().unwrap_or(stem.as_str());
    let cleaned = stem.replace('_', " ");
    let trimmed = RE_SET_BY_PREFIX.find(&cleaned).map(|matched| matched.as_str().to_string());
    let cleaned = trimmed.unwrap_or(cleaned);
    let cleaned = cleaned.trim();

    if extension.is_empty() {
        cleaned.to_string()
    } else {
        format!("{cleaned}.{extension}")
    }
}

/// Scan the poster root folders and categorize their contents.
///
/// Zip bundles are renamed on disk to their cleaned names; in dry run the
/// rename is skipped but the cleaned name is still used for matching.
pub fn find_posters(poster_roots: &[PathBuf], dryrun: bool) -> Result<Posters> {
    let mut posters = Posters::default();

    for root in poster_roots {
        let mut entries: Vec<PathBuf> = fs::read_dir(root)
            .with_context(|| format!("Failed to read poster folder {}", root.display()))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect();
        entries.sort();

        for path in entries {
            let file_name = poster_tools::path_to_filename_string(&path);
            if poster_tools::is_hidden_name(&file_name) {
                continue;
            }
            if path.is_dir() {
                if !JUNK_DIR_NAMES.contains(&file_name.as_str()) {
                    posters.folders.push(path);
                }
            } else if is_zip_file(&path) {
                let cleaned = clean_bundle_file_name(&file_name);
                let bundle_path = if cleaned == file_name || dryrun {
                    path
                } else {
                    let new_path = root.join(&cleaned);
                    fs::rename(&path, &new_path)
                        .with_context(|| format!("Failed to rename bundle {}", path.display()))?;
                    new_path
                };
                posters.bundles.push(ZipBundle {
                    name: poster_tools::path_to_file_stem_string(Path::new(&cleaned)),
                    path: bundle_path,
                });
            } else {
                posters.files.push(path);
            }
        }
    }

    Ok(posters)
}

fn is_zip_file(path: &Path) -> bool {
    poster_tools::path_to_file_extension_string(path) == "zip"
}

/// Extract a zip archive into the destination directory.
///
/// Entries with unsafe paths are skipped. A failure aborts this bundle only;
/// already-written files are left in place for the caller to inspect.
pub fn extract_zip(archive_path: &Path, destination: &Path) -> Result<()> {
    let file = File::open(archive_path).with_context(|| format!("Failed to open {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("Failed to read zip archive")?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).context("Failed to read zip entry")?;
        let Some(relative_path) = entry.enclosed_name() else {
            continue;
        };

        let out_path = destination.join(relative_path);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).context("Failed to create directory from zip")?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).context("Failed to create directory from zip")?;
        }
        let mut out_file = File::create(&out_path).with_context(|| format!("Failed to create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out_file).context("Failed to extract zip entry")?;
    }

    Ok(())
}

/// Move a processed bundle into the archive holding area under the poster root.
///
/// Replaces a stale archived copy of the same name. Callers must write the
/// extracted destination files first so the original survives any failure.
pub fn archive_bundle(bundle_path: &Path, poster_dir: &Path) -> Result<PathBuf> {
    let archive_dir = poster_dir.join(ARCHIVE_DIR_NAME);
    fs::create_dir_all(&archive_dir).with_context(|| format!("Failed to create {}", archive_dir.display()))?;

    let target = archive_dir.join(poster_tools::path_to_filename_string(bundle_path));
    if target.is_file() {
        fs::remove_file(&target).with_context(|| format!("Failed to remove stale archive {}", target.display()))?;
    }
    fs::rename(bundle_path, &target)
        .with_context(|| format!("Failed to move {} to archive", bundle_path.display()))?;
    Ok(target)
}
