//! Document-wide extraction loop.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::backend::{DocumentBackend, StreamObject};
use crate::error::{Error, Result};
use crate::model::{RunSummary, StreamReport};
use crate::options::ExtractOptions;
use crate::scan::render_dictionary;

use super::{ExtractionObserver, StreamExtractor};

/// Walks every object of a document and writes one artifact per stream.
#[derive(Debug, Clone, Default)]
pub struct ExtractionDriver {
    options: ExtractOptions,
    extractor: StreamExtractor,
}

impl ExtractionDriver {
    /// Create a driver.
    pub fn new(options: ExtractOptions) -> Self {
        let extractor = StreamExtractor::new(options.scan_limits);
        Self { options, extractor }
    }

    /// The options this driver runs with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract every stream of `backend` into `output_dir`.
    ///
    /// Objects are processed one at a time in the order the backend lists
    /// them; each artifact is closed before the next object is read. A
    /// failure to resolve an object or to write an artifact aborts the run.
    pub fn run<B: DocumentBackend>(
        &self,
        backend: &B,
        output_dir: &Path,
        observer: &mut dyn ExtractionObserver,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary {
            output_dir: output_dir.to_path_buf(),
            ..RunSummary::default()
        };

        for id in backend.object_ids() {
            summary.objects_seen += 1;
            let Some(stream) = backend.stream(id)? else {
                continue;
            };

            let dictionary = render_dictionary(stream.dictionary());
            log::debug!("Object {} {} has stream {}", id.0, id.1, dictionary);

            let result = self.extractor.extract(&stream);
            let artifact = output_dir.join(self.options.artifact_name(id.0));
            write_artifact(&artifact, &result.data)?;

            let report = StreamReport {
                object: id.0,
                generation: id.1,
                level: result.level,
                status: result.status,
                used_fallback: result.used_fallback(),
                bytes: result.data.len(),
                artifact,
                dictionary,
            };
            observer.on_stream(&report);
            summary.streams.push(report);
        }

        log::info!(
            "Extracted {} streams from {} objects ({} raw)",
            summary.stream_count(),
            summary.objects_seen,
            summary.fallback_count()
        );
        Ok(summary)
    }
}

/// Remove `dir` if it exists, then create it empty.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        fs::remove_dir_all(dir)?;
    } else if dir.exists() {
        fs::remove_file(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

fn write_artifact(path: &Path, data: &[u8]) -> Result<()> {
    let to_error = |source| Error::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(to_error)?;
    file.write_all(data).map_err(to_error)?;
    Ok(())
}
