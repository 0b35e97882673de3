//! Extraction options and configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::backend::filters::DEFAULT_MAX_DECODED_LEN;
use crate::scan::ScanLimits;

/// Options for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Appended to the input path to name the output directory
    pub output_suffix: String,

    /// Explicit output directory, overriding `output_suffix`
    pub output_dir: Option<PathBuf>,

    /// Artifact file name prefix
    pub artifact_prefix: String,

    /// Artifact file extension
    pub artifact_extension: String,

    /// Budget for each dictionary walk
    pub scan_limits: ScanLimits,

    /// Cap on decoded bytes per stream
    pub max_decoded_len: usize,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory suffix.
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    /// Write artifacts to an explicit directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the artifact file name prefix.
    pub fn with_artifact_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.artifact_prefix = prefix.into();
        self
    }

    /// Set the artifact file extension.
    pub fn with_artifact_extension(mut self, ext: impl Into<String>) -> Self {
        self.artifact_extension = ext.into();
        self
    }

    /// Set the scan budget.
    pub fn with_scan_limits(mut self, limits: ScanLimits) -> Self {
        self.scan_limits = limits;
        self
    }

    /// Cap decoded bytes per stream.
    pub fn with_max_decoded_len(mut self, len: usize) -> Self {
        self.max_decoded_len = len;
        self
    }

    /// Output directory for `input`: the explicit one, or `<input>.<suffix>`.
    pub fn output_dir_for(&self, input: &Path) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        let mut name = OsString::from(input.as_os_str());
        name.push(".");
        name.push(&self.output_suffix);
        PathBuf::from(name)
    }

    /// Artifact file name for an object number, e.g. `pdf_0007_0.dat`.
    ///
    /// The trailing `_0` is fixed whatever the object's generation.
    pub fn artifact_name(&self, object: u32) -> String {
        format!(
            "{}_{:04}_0.{}",
            self.artifact_prefix, object, self.artifact_extension
        )
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_suffix: "unstream_out".to_string(),
            output_dir: None,
            artifact_prefix: "pdf".to_string(),
            artifact_extension: "dat".to_string(),
            scan_limits: ScanLimits::default(),
            max_decoded_len: DEFAULT_MAX_DECODED_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_output_suffix("streams")
            .with_artifact_prefix("obj")
            .with_artifact_extension("bin")
            .with_scan_limits(ScanLimits::new().with_max_depth(4))
            .with_max_decoded_len(1024);

        assert_eq!(options.output_suffix, "streams");
        assert_eq!(options.artifact_prefix, "obj");
        assert_eq!(options.artifact_extension, "bin");
        assert_eq!(options.scan_limits.max_depth, 4);
        assert_eq!(options.max_decoded_len, 1024);
    }

    #[test]
    fn test_output_dir_for() {
        let options = ExtractOptions::default();
        assert_eq!(
            options.output_dir_for(Path::new("docs/report.pdf")),
            PathBuf::from("docs/report.pdf.unstream_out")
        );

        let options = options.with_output_dir("/tmp/out");
        assert_eq!(
            options.output_dir_for(Path::new("docs/report.pdf")),
            PathBuf::from("/tmp/out")
        );
    }

    #[test]
    fn test_artifact_name_padding() {
        let options = ExtractOptions::default();
        assert_eq!(options.artifact_name(7), "pdf_0007_0.dat");
        assert_eq!(options.artifact_name(1234), "pdf_1234_0.dat");
        assert_eq!(options.artifact_name(123456), "pdf_123456_0.dat");
    }
}
