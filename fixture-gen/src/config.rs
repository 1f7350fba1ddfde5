use std::path::{Path, PathBuf};

/// File name the fixture is written to, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "test_multi_size.pdf";

/// Where every label starts, in points from the bottom-left corner.
pub const DEFAULT_LABEL_ORIGIN: (f64, f64) = (100.0, 400.0);

/// Settings for one fixture run. The binary always uses the defaults;
/// tests and other callers adjust them through the setters.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureConfig {
    output: PathBuf,
    label_origin: (f64, f64),
    compress: bool,
    info: Vec<(String, String)>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        FixtureConfig {
            output: PathBuf::from(DEFAULT_OUTPUT),
            label_origin: DEFAULT_LABEL_ORIGIN,
            compress: false,
            info: vec![
                ("Producer".to_string(), "pdf-fixtures".to_string()),
                ("Title".to_string(), "Multi-size page fixture".to_string()),
            ],
        }
    }
}

impl FixtureConfig {
    pub fn set_output<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.output = path.into();
        self
    }

    pub fn set_label_origin(&mut self, x: f64, y: f64) -> &mut Self {
        self.label_origin = (x, y);
        self
    }

    pub fn set_compression(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }

    /// Add or replace a document info entry.
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        match self.info.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.info.push((key.to_string(), value.to_string())),
        }
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn label_origin(&self) -> (f64, f64) {
        self.label_origin
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn info(&self) -> &[(String, String)] {
        &self.info
    }
}
