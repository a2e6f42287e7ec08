//! Reading and writing pipeline artifacts.

use crate::error::{ErdError, Result};
use crate::ingest::read_maybe_compressed;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};

/// Write `contents` to `path` atomically.
///
/// The text goes to a temporary file in the destination directory which is
/// then renamed over `path`. On failure `path` keeps its previous contents.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut set = ArtifactSet::new();
    set.stage(path, contents)?;
    set.commit()
}

/// Artifacts of one stage, written all together or not at all.
///
/// `stage` writes each text to a temporary file next to its target. Nothing
/// is visible at the targets until `commit`, which renames the files in
/// staging order. If a rename fails, targets already replaced are restored
/// from backups and targets that did not exist before are removed.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    staged: Vec<(PathBuf, NamedTempFile)>,
}

/// A committed target and the previous contents to restore on rollback.
struct Committed {
    path: PathBuf,
    backup: Option<TempPath>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Write `contents` to a temporary file beside `path`.
    pub fn stage(&mut self, path: &Path, contents: &str) -> Result<()> {
        let write_err = |source: io::Error| ErdError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = target_dir(path);
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        self.staged.push((path.to_path_buf(), tmp));
        Ok(())
    }

    /// Move every staged file onto its target.
    pub fn commit(self) -> Result<()> {
        let mut committed: Vec<Committed> = Vec::with_capacity(self.staged.len());

        for (path, tmp) in self.staged {
            let write_err = |source: io::Error| ErdError::Write {
                path: path.clone(),
                source,
            };

            let backup = match backup(&path) {
                Ok(backup) => backup,
                Err(source) => {
                    rollback(committed);
                    return Err(write_err(source));
                }
            };
            if let Err(e) = tmp.persist(&path) {
                rollback(committed);
                return Err(write_err(e.error));
            }

            tracing::debug!(path = %path.display(), "artifact written");
            committed.push(Committed { path, backup });
        }

        Ok(())
    }
}

fn target_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Copy an existing target aside so a later failure can put it back.
fn backup(path: &Path) -> io::Result<Option<TempPath>> {
    if !path.is_file() {
        return Ok(None);
    }
    let copy = NamedTempFile::new_in(target_dir(path))?.into_temp_path();
    fs::copy(path, &copy)?;
    Ok(Some(copy))
}

fn rollback(committed: Vec<Committed>) {
    for Committed { path, backup } in committed.into_iter().rev() {
        let restored = match backup {
            Some(backup) => backup.persist(&path).map_err(|e| e.error),
            None => fs::remove_file(&path),
        };
        match restored {
            Ok(()) => tracing::debug!(path = %path.display(), "artifact rolled back"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not roll back artifact"),
        }
    }
}

/// Read an artifact produced by an earlier stage.
///
/// An absent file is `MissingUpstreamArtifact` naming `stage`; other read
/// failures are `Connectivity`.
pub fn read_upstream(stage: &'static str, path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ErdError::MissingUpstreamArtifact {
            stage,
            path: path.to_path_buf(),
        });
    }

    read_maybe_compressed(path).map_err(|source| ErdError::Connectivity {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_atomic_creates_parent_and_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("erd_simple.mmd");

        write_atomic(&path, "erDiagram\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "erDiagram\n");
        assert_eq!(entries(&temp.path().join("out")), vec!["erd_simple.mmd"]);
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("schema.dbml");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_failure_keeps_previous_artifact() {
        let temp = TempDir::new().unwrap();
        // A directory in the target's place makes the rename fail
        let path = temp.path().join("erd_full.mmd");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = write_atomic(&path, "erDiagram\n").unwrap_err();
        assert!(matches!(err, ErdError::Write { .. }));
        assert_eq!(fs::read_to_string(path.join("keep")).unwrap(), "x");
        assert_eq!(entries(temp.path()), vec!["erd_full.mmd"]);
    }

    #[test]
    fn test_read_upstream_missing() {
        let temp = TempDir::new().unwrap();
        let err = read_upstream("filter", &temp.path().join("erd_simple.mmd")).unwrap_err();
        match err {
            ErdError::MissingUpstreamArtifact { stage, path } => {
                assert_eq!(stage, "filter");
                assert!(path.ends_with("erd_simple.mmd"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_upstream_present() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stats.csv");
        fs::write(&path, "schemaName\n").unwrap();
        assert_eq!(read_upstream("classify", &path).unwrap(), "schemaName\n");
    }

    #[test]
    fn test_artifact_set_writes_nothing_before_commit() {
        let temp = TempDir::new().unwrap();
        let full = temp.path().join("erd_full.mmd");
        let simple = temp.path().join("erd_simple.mmd");

        let mut set = ArtifactSet::new();
        set.stage(&full, "full").unwrap();
        set.stage(&simple, "simple").unwrap();
        assert_eq!(set.len(), 2);
        assert!(!full.exists());
        assert!(!simple.exists());

        set.commit().unwrap();
        assert_eq!(fs::read_to_string(&full).unwrap(), "full");
        assert_eq!(fs::read_to_string(&simple).unwrap(), "simple");
        assert_eq!(entries(temp.path()), vec!["erd_full.mmd", "erd_simple.mmd"]);
    }

    #[test]
    fn test_failed_commit_restores_earlier_targets() {
        let temp = TempDir::new().unwrap();
        let full = temp.path().join("erd_full.mmd");
        let simple = temp.path().join("erd_simple.mmd");
        let dbml = temp.path().join("schema.dbml");
        let model = temp.path().join("erd_model.json");
        fs::write(&full, "old full").unwrap();
        fs::create_dir(&dbml).unwrap();

        let mut set = ArtifactSet::new();
        set.stage(&full, "new full").unwrap();
        set.stage(&simple, "new simple").unwrap();
        set.stage(&dbml, "new dbml").unwrap();
        set.stage(&model, "{}").unwrap();

        let err = set.commit().unwrap_err();
        match err {
            ErdError::Write { path, .. } => assert!(path.ends_with("schema.dbml")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_to_string(&full).unwrap(), "old full");
        assert!(!simple.exists());
        assert!(!model.exists());
        assert_eq!(entries(temp.path()), vec!["erd_full.mmd", "schema.dbml"]);
    }
}
