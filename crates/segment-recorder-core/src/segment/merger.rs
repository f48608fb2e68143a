use crate::{CoreError, CoreResult};

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    panic::Location,
    path::Path,
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Physically concatenates two finalized containers into one.
///
/// Implementations write the merged result to `output` and must leave
/// `target` and `segment` untouched. Publishing `output` over the target is
/// the [`SegmentStore`](crate::SegmentStore)'s job.
pub trait ContainerMerger: Send + Sync + 'static {
    /// Write `target` followed by `segment` into a new container at `output`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Merge`] if either input is unreadable or not a
    /// valid finalized container.
    fn merge(&self, target: &Path, segment: &Path, output: &Path) -> CoreResult<()>;
}

/// Byte-level concatenation.
///
/// Correct for self-synchronizing stream formats (MPEG-TS, raw elementary
/// streams) where appending one file to another yields a playable stream.
/// Box-structured containers such as MP4 need a format-aware merger.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteConcatMerger;

impl ContainerMerger for ByteConcatMerger {
    #[track_caller]
    #[instrument(skip(self))]
    fn merge(&self, target: &Path, segment: &Path, output: &Path) -> CoreResult<()> {
        let location = Location::caller();
        let merge_error = |what: &str, e: io::Error| CoreError::Merge {
            reason: format!("{what}: {e}"),
            location: ErrorLocation::from(location),
        };

        let out = File::create(output).map_err(|e| merge_error("Failed to create output", e))?;
        let mut writer = BufWriter::new(out);

        let mut written = 0u64;
        for input in [target, segment] {
            let file = File::open(input)
                .map_err(|e| merge_error(&format!("Failed to open {}", input.display()), e))?;
            written += io::copy(&mut BufReader::new(file), &mut writer)
                .map_err(|e| merge_error(&format!("Failed to copy {}", input.display()), e))?;
        }

        writer
            .flush()
            .map_err(|e| merge_error("Failed to flush output", e))?;

        debug!(bytes = written, "Containers concatenated");

        Ok(())
    }
}
