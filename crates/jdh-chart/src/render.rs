//! Chart rendering backends
//!
//! Rendering Vega-Lite needs a JavaScript runtime, so it is delegated to the
//! `vl-convert` command line tool rather than done in process.

use crate::error::{ChartError, Result};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default converter executable
pub const DEFAULT_CONVERTER: &str = "vl-convert";

/// Turns a Vega-Lite specification into image bytes
pub trait ChartRenderer {
    /// Render to SVG text
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render_svg(&self, spec: &Value) -> Result<String>;

    /// Render to PNG bytes, `scale` times the default resolution
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render_png(&self, spec: &Value, scale: f64) -> Result<Vec<u8>>;
}

/// Renderer backed by the `vl-convert` executable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VlConvert {
    program: PathBuf,
    vl_version: Option<String>,
}

impl Default for VlConvert {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER)
    }
}

impl VlConvert {
    /// Use `program` (a name on PATH or a full path) as the converter
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            vl_version: None,
        }
    }

    /// Pin the Vega-Lite version, e.g. `"5.16"`
    #[must_use]
    pub fn with_vl_version(mut self, version: impl Into<String>) -> Self {
        self.vl_version = Some(version.into());
        self
    }

    /// Converter executable
    #[inline]
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check that the converter can be started and return its version line
    ///
    /// # Errors
    ///
    /// Returns `ChartError::ConverterNotFound` if it cannot be run.
    pub fn check_available(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ChartError::ConverterNotFound(self.program.display().to_string()));
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("unknown")
            .to_string();
        Ok(version)
    }

    fn spawn_error(&self, err: io::Error) -> ChartError {
        if err.kind() == io::ErrorKind::NotFound {
            ChartError::ConverterNotFound(self.program.display().to_string())
        } else {
            ChartError::Io(err)
        }
    }

    /// Run one `vl2*` subcommand through a scratch directory and return the
    /// produced file
    fn convert(
        &self,
        subcommand: &str,
        spec: &Value,
        extension: &str,
        extra_args: &[String],
    ) -> Result<Vec<u8>> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("chart.vl.json");
        let output_path = scratch.path().join(format!("chart.{extension}"));
        fs::write(&input, serde_json::to_vec(spec)?)?;

        let mut command = Command::new(&self.program);
        command
            .arg(subcommand)
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&output_path)
            .args(extra_args);
        if let Some(version) = &self.vl_version {
            command.arg("--vl-version").arg(version);
        }

        log::debug!("Running {command:?}");
        let output = command.output().map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ChartError::ConversionFailed(format!(
                "{} {subcommand} exited with {}: {stderr}",
                self.program.display(),
                output.status
            )));
        }

        fs::read(&output_path).map_err(|e| {
            ChartError::ConversionFailed(format!(
                "{} {subcommand} produced no output file: {e}",
                self.program.display()
            ))
        })
    }
}

impl ChartRenderer for VlConvert {
    fn render_svg(&self, spec: &Value) -> Result<String> {
        let bytes = self.convert("vl2svg", spec, "svg", &[])?;
        String::from_utf8(bytes)
            .map_err(|e| ChartError::InvalidSvg(format!("output is not UTF-8: {e}")))
    }

    fn render_png(&self, spec: &Value, scale: f64) -> Result<Vec<u8>> {
        self.convert("vl2png", spec, "png", &["--scale".to_string(), scale.to_string()])
    }
}
