//! Temporary segment and target path ownership.
//!
//! The store publishes merged output with a write-to-staging-then-rename
//! discipline, so an observer of the target path only ever sees the state
//! before a merge or the state after it.

use crate::{ContainerMerger, CoreError, CoreResult};

use std::{
    ffi::{OsStr, OsString},
    fs::{self, File},
    io,
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Resolves the temporary segment path and merges finalized segments onto
/// the target container.
pub struct SegmentStore {
    target_path: PathBuf,
    segment_path: PathBuf,
    merger: Arc<dyn ContainerMerger>,
}

/// Removes the staging file on drop unless it was renamed into place.
struct StagingFile {
    path: PathBuf,
    committed: bool,
}

impl StagingFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(staging = ?self.path, "Staging file removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(staging = ?self.path, error = ?e, "Failed to remove staging file"),
        }
    }
}

impl SegmentStore {
    /// Creates a store for one session.
    ///
    /// The segment path is `scratch_dir/segment-<session_id>.part`: fixed for
    /// the session's lifetime and distinct between sessions, so two sessions
    /// in one process never share scratch storage.
    pub fn new(
        target_path: impl Into<PathBuf>,
        scratch_dir: &Path,
        session_id: Uuid,
        merger: Arc<dyn ContainerMerger>,
    ) -> Self {
        Self {
            target_path: target_path.into(),
            segment_path: scratch_dir.join(format!("segment-{session_id}.part")),
            merger,
        }
    }

    /// Persistent target container every segment is merged into.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Scratch location the active capture writes to.
    pub fn temporary_segment_path(&self) -> &Path {
        &self.segment_path
    }

    /// Returns the segment path if a segment was left behind by an earlier
    /// failed or interrupted pause.
    pub fn orphaned_segment(&self) -> Option<&Path> {
        self.segment_path
            .is_file()
            .then_some(self.segment_path.as_path())
    }

    /// Deletes the segment file if one exists. Returns whether a file was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the file exists but cannot be removed.
    #[track_caller]
    pub fn discard_orphan(&self) -> CoreResult<bool> {
        match fs::remove_file(&self.segment_path) {
            Ok(()) => {
                debug!(segment = ?self.segment_path, "Segment discarded");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CoreError::Io {
                reason: format!("Failed to remove segment {}", self.segment_path.display()),
                source,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Makes the scratch directory exist and clears any previous segment so
    /// the next capture starts from an empty file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the directory cannot be created or a
    /// stale segment cannot be removed.
    #[track_caller]
    pub fn prepare_segment(&self) -> CoreResult<()> {
        if let Some(dir) = self.segment_path.parent() {
            fs::create_dir_all(dir).map_err(|source| CoreError::Io {
                reason: format!("Failed to create scratch directory {}", dir.display()),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        if self.discard_orphan()? {
            warn!(segment = ?self.segment_path, "Overwriting segment left by an earlier capture");
        }

        Ok(())
    }

    /// Appends the finalized segment at `segment_path` onto `target_path`.
    ///
    /// When the target does not exist yet the segment is copied into place.
    /// Either way the result is staged next to the target and renamed over
    /// it, so on failure the target is byte-identical to its prior state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Merge`] if the segment is missing or empty, the
    /// merger rejects the inputs, or the staged result cannot be published.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn merge_append(&self, target_path: &Path, segment_path: &Path) -> CoreResult<()> {
        let location = Location::caller();
        let merge_error = |reason: String| CoreError::Merge {
            reason,
            location: ErrorLocation::from(location),
        };

        let segment_len = match fs::metadata(segment_path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
            Ok(_) => {
                return Err(merge_error(format!(
                    "Segment {} is empty or not a file",
                    segment_path.display()
                )));
            }
            Err(e) => {
                return Err(merge_error(format!(
                    "Segment {} unavailable: {e}",
                    segment_path.display()
                )));
            }
        };

        let target_exists = match fs::metadata(target_path) {
            Ok(meta) if meta.is_file() => true,
            Ok(_) => {
                return Err(merge_error(format!(
                    "Target {} is not a file",
                    target_path.display()
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                return Err(merge_error(format!(
                    "Target {} unavailable: {e}",
                    target_path.display()
                )));
            }
        };

        if let Some(dir) = target_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                merge_error(format!("Failed to create {}: {e}", dir.display()))
            })?;
        }

        let mut staging = StagingFile::new(staging_path(target_path));

        if target_exists {
            self.merger.merge(target_path, segment_path, &staging.path)?;
        } else {
            fs::copy(segment_path, &staging.path).map_err(|e| {
                merge_error(format!("Failed to copy segment into staging: {e}"))
            })?;
        }

        let staged = File::open(&staging.path)
            .and_then(|f| {
                f.sync_all()?;
                f.metadata()
            })
            .map_err(|e| merge_error(format!("Failed to sync staging file: {e}")))?;

        if staged.len() < segment_len {
            return Err(merge_error(format!(
                "Merged output is {} bytes, shorter than the {segment_len} byte segment",
                staged.len()
            )));
        }

        fs::rename(&staging.path, target_path)
            .map_err(|e| merge_error(format!("Failed to publish merged target: {e}")))?;
        staging.committed = true;

        info!(
            target = ?target_path,
            target_bytes = staged.len(),
            segment_bytes = segment_len,
            first_segment = !target_exists,
            "Segment merged into target"
        );

        Ok(())
    }

    /// Merges this session's segment onto this session's target.
    ///
    /// # Errors
    ///
    /// See [`SegmentStore::merge_append`].
    #[track_caller]
    pub fn merge_segment(&self) -> CoreResult<()> {
        self.merge_append(&self.target_path, &self.segment_path)
    }
}

/// `dir/.name.merging`, in the target's directory so the rename stays on one
/// filesystem.
fn staging_path(target_path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target_path.file_name().unwrap_or_else(|| OsStr::new("target")));
    name.push(".merging");
    target_path.with_file_name(name)
}
