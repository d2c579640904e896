//! Suite discovery: enumerate suite files under a root and load them with bounded concurrency.

use std::path::{Component, Path, PathBuf};

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{RunError, RunResult};
use crate::models::LoadedSuite;
use crate::services::loader::{SuiteSource, load_suite};
use crate::services::resolver::resolve_run_status;

/// Marker a file stem must end with to be a suite file (`*.test.<ext>`).
const SUITE_STEM_SUFFIX: &str = ".test";

/// Returns true if the file name looks like `<name>.test.<ext>`.
pub fn is_suite_file(path: &Path) -> bool {
    path.extension().is_some()
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| {
                stem.len() > SUITE_STEM_SUFFIX.len() && stem.ends_with(SUITE_STEM_SUFFIX)
            })
}

/// Normalize a suite path and strip its final extension.
pub fn suite_identity(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    normalized.with_extension("")
}

/// Returns true if the file's final extension is one of `extensions`.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known == ext))
}

/// Recursively scans a directory for suite files.
///
/// With `extensions` set, only suite files the loader can read are returned.
pub fn walk_dir_for_suite_files(
    dir: &Path,
    extensions: Option<&[String]>,
) -> RunResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| RunError::Walk(e.to_string()))?;
        if !entry.file_type().is_file() || !is_suite_file(entry.path()) {
            continue;
        }
        if extensions.is_some_and(|known| !has_extension(entry.path(), known)) {
            debug!("Ignoring unloadable suite file {}", entry.path().display());
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

/// Suite identities under `dir`, sorted and de-duplicated.
pub fn gather_suites(dir: &Path, extensions: Option<&[String]>) -> RunResult<Vec<PathBuf>> {
    let mut suites: Vec<PathBuf> = walk_dir_for_suite_files(dir, extensions)?
        .iter()
        .map(|path| suite_identity(path))
        .collect();
    suites.sort();
    suites.dedup();
    Ok(suites)
}

/// Load a single suite file, or every suite under a directory.
///
/// A single file always runs: only/skip resolution applies to directory
/// batches. A directory batch is fully materialized before anything is
/// returned, and any load error fails the whole batch.
pub async fn load_dir_or_file<R, S>(
    source: &S,
    root: &Path,
    load_concurrent: usize,
) -> RunResult<Vec<LoadedSuite<R>>>
where
    S: SuiteSource<R> + ?Sized,
{
    let metadata = tokio::fs::metadata(root)
        .await
        .map_err(|source| RunError::Io {
            path: root.to_path_buf(),
            source,
        })?;

    if metadata.is_file() {
        debug!("Loading single suite file {}", root.display());
        return Ok(vec![load_suite(source, root).await?]);
    }

    let dir = root.to_path_buf();
    let extensions = source.extensions().map(<[String]>::to_vec);
    let paths = tokio::task::spawn_blocking(move || gather_suites(&dir, extensions.as_deref()))
        .await
        .map_err(|e| RunError::Walk(e.to_string()))??;

    info!(
        "Discovered {} suite files under {} (loading {} at a time)",
        paths.len(),
        root.display(),
        load_concurrent
    );

    let suites: Vec<LoadedSuite<R>> = stream::iter(paths)
        .map(|path| async move { load_suite(source, &path).await })
        .buffered(load_concurrent.max(1))
        .try_collect()
        .await?;

    Ok(resolve_run_status(suites))
}
