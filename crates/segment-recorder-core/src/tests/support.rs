//! Scripted capture driver and mergers for exercising the session without a
//! real device.

use crate::{
    ByteConcatMerger, CaptureConfig, CaptureDriver, CaptureDriverFactory, ContainerMerger,
    CoreError, CoreResult,
};

use std::{
    collections::VecDeque,
    fs,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;

/// Behaviour of one fake capture, consumed in order by [`FakeFactory`].
#[derive(Debug, Clone, Default)]
pub(crate) struct Script {
    pub payload: Vec<u8>,
    pub fail_configure: bool,
    pub fail_prepare: bool,
    pub fail_stop: bool,
    pub prepare_delay: Duration,
}

impl Script {
    pub(crate) fn writes(payload: &[u8]) -> Self {
        Self {
            payload: payload.to_vec(),
            ..Self::default()
        }
    }
}

/// Counters shared between a factory and the test.
#[derive(Debug, Default)]
pub(crate) struct Probe {
    pub created: AtomicUsize,
    pub released: AtomicUsize,
}

pub(crate) struct FakeFactory {
    scripts: Mutex<VecDeque<Script>>,
    probe: Arc<Probe>,
}

impl FakeFactory {
    pub(crate) fn new(scripts: Vec<Script>) -> (Self, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let factory = Self {
            scripts: Mutex::new(scripts.into()),
            probe: Arc::clone(&probe),
        };
        (factory, probe)
    }
}

impl CaptureDriverFactory for FakeFactory {
    fn create(&self) -> CoreResult<Box<dyn CaptureDriver>> {
        let script = self
            .scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Script::writes(b"segment"));
        self.probe.created.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FakeDriver {
            script,
            output: None,
            probe: Arc::clone(&self.probe),
        }))
    }
}

struct FakeDriver {
    script: Script,
    output: Option<PathBuf>,
    probe: Arc<Probe>,
}

impl CaptureDriver for FakeDriver {
    #[track_caller]
    fn configure(&mut self, config: &CaptureConfig, output_path: &Path) -> CoreResult<()> {
        if self.script.fail_configure {
            return Err(CoreError::Configuration {
                reason: format!("Unsupported bit rate {}", config.bit_rate()),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.output = Some(output_path.to_path_buf());
        Ok(())
    }

    #[track_caller]
    fn prepare_and_begin(&mut self) -> CoreResult<()> {
        std::thread::sleep(self.script.prepare_delay);

        if self.script.fail_prepare {
            return Err(CoreError::Device {
                reason: "Encoder refused to start".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let Some(output) = self.output.as_ref() else {
            return Err(CoreError::Device {
                reason: "Not configured".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        fs::write(output, &self.script.payload).map_err(|source| CoreError::Io {
            reason: format!("Failed to open {}", output.display()),
            source,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn stop_and_release(&mut self) -> CoreResult<()> {
        self.probe.released.fetch_add(1, Ordering::SeqCst);

        if self.script.fail_stop {
            return Err(CoreError::Device {
                reason: "Stop failed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }
}

/// Concatenates bytes until armed, then writes partial output and fails.
#[derive(Clone, Default)]
pub(crate) struct SwitchableMerger {
    pub fail: Arc<AtomicBool>,
}

impl ContainerMerger for SwitchableMerger {
    #[track_caller]
    fn merge(&self, target: &Path, segment: &Path, output: &Path) -> CoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            let _ = fs::write(output, b"partial");
            return Err(CoreError::Merge {
                reason: "Simulated I/O fault".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        ByteConcatMerger.merge(target, segment, output)
    }
}
