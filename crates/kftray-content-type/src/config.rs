use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    Result,
};

use crate::formatters::TidyOptions;

pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

pub const DEFAULT_BODY_FILE_STEM: &str = "body";

#[derive(Debug, Clone)]
pub struct FormatConfig {
    body_dir: PathBuf,
    max_body_size: usize,
    tidy_options: TidyOptions,
}

impl FormatConfig {
    pub fn new(body_dir: PathBuf) -> Self {
        Self {
            body_dir,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            tidy_options: TidyOptions::default(),
        }
    }

    pub fn builder() -> FormatConfigBuilder {
        FormatConfigBuilder::new()
    }

    pub fn default_body_directory() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home_dir.join(".kftray").join("http_bodies"))
    }

    pub fn body_dir(&self) -> &Path {
        &self.body_dir
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    pub fn tidy_options(&self) -> &TidyOptions {
        &self.tidy_options
    }

    /// Path a captured body is saved under. An empty extension produces a
    /// file name without a dot.
    pub fn body_file_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.body_dir.join(body_file_name(stem, extension))
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        let body_dir = Self::default_body_directory()
            .unwrap_or_else(|_| std::env::temp_dir().join("kftray").join("http_bodies"));
        Self::new(body_dir)
    }
}

pub fn body_file_name(stem: &str, extension: &str) -> String {
    let stem = if stem.is_empty() {
        DEFAULT_BODY_FILE_STEM
    } else {
        stem
    };

    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

#[derive(Debug, Default)]
pub struct FormatConfigBuilder {
    body_dir: Option<PathBuf>,
    max_body_size: Option<usize>,
    tidy_options: Option<TidyOptions>,
}

impl FormatConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body_dir(mut self, body_dir: impl Into<PathBuf>) -> Self {
        self.body_dir = Some(body_dir.into());
        self
    }

    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = Some(max_body_size);
        self
    }

    pub fn tidy_options(mut self, tidy_options: TidyOptions) -> Self {
        self.tidy_options = Some(tidy_options);
        self
    }

    pub fn build(self) -> FormatConfig {
        let mut config = match self.body_dir {
            Some(body_dir) => FormatConfig::new(body_dir),
            None => FormatConfig::default(),
        };

        if let Some(max_body_size) = self.max_body_size {
            config.max_body_size = max_body_size;
        }
        if let Some(tidy_options) = self.tidy_options {
            config.tidy_options = tidy_options;
        }

        config
    }
}
