use crate::{
    AsyncTaskRunner, ByteConcatMerger, CaptureConfig, CaptureDriverFactory, ContainerMerger,
    CoreResult, SegmentStore, SessionController,
};

use std::{path::PathBuf, sync::Arc};

use uuid::Uuid;

/// Directory name used under the system temp dir when no scratch dir is given.
const DEFAULT_SCRATCH_DIR_NAME: &str = "segment-recorder";

/// Builds a [`SessionController`].
///
/// Only the target path is required. Everything else has a default:
/// [`CaptureConfig::DEFAULT`], a scratch dir under the system temp dir,
/// a fresh random session id, and [`ByteConcatMerger`].
pub struct SessionBuilder {
    target_path: PathBuf,
    config: CaptureConfig,
    scratch_dir: Option<PathBuf>,
    session_id: Option<Uuid>,
    merger: Option<Arc<dyn ContainerMerger>>,
}

impl SessionBuilder {
    pub(crate) fn new(target_path: PathBuf) -> Self {
        Self {
            target_path,
            config: CaptureConfig::DEFAULT,
            scratch_dir: None,
            session_id: None,
            merger: None,
        }
    }

    /// Capture parameters for every segment of the session.
    pub fn config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory holding the temporary segment.
    pub fn scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(scratch_dir.into());
        self
    }

    /// Reuse a session id, e.g. to locate a segment orphaned by an earlier
    /// process.
    pub fn session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Container merger used by pause.
    pub fn merger<M: ContainerMerger>(mut self, merger: M) -> Self {
        self.merger = Some(Arc::new(merger));
        self
    }

    /// Builds a session in the `Ready` state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Runtime`](crate::CoreError::Runtime) if called
    /// outside a tokio runtime.
    #[track_caller]
    pub fn build<F: CaptureDriverFactory>(self, factory: F) -> CoreResult<SessionController> {
        let runner = AsyncTaskRunner::new()?;

        let session_id = self.session_id.unwrap_or_else(Uuid::new_v4);
        let scratch_dir = self
            .scratch_dir
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_SCRATCH_DIR_NAME));
        let merger = self
            .merger
            .unwrap_or_else(|| Arc::new(ByteConcatMerger) as Arc<dyn ContainerMerger>);

        let store = SegmentStore::new(self.target_path, &scratch_dir, session_id, merger);

        Ok(SessionController::assemble(
            session_id,
            self.config,
            store,
            Arc::new(factory),
            runner,
        ))
    }
}
