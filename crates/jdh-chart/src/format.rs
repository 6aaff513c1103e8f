//! Output formats supported by chart export

use crate::error::{ChartError, Result};
use std::path::Path;

/// Image format of an exported chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartFormat {
    /// Scalable vector graphics (text)
    Svg,
    /// Portable network graphics (raster)
    Png,
}

impl ChartFormat {
    /// Infer the format from a file name's extension
    ///
    /// # Errors
    ///
    /// Returns `ChartError::UnsupportedFormat` for any extension other than
    /// `svg` or `png`, or when there is no extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        extension.parse()
    }

    /// Canonical file extension
    #[inline]
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// True for raster formats, where the scale factor applies
    #[inline]
    #[must_use]
    pub const fn is_raster(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl std::fmt::Display for ChartFormat {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ChartFormat {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(ChartError::UnsupportedFormat(s.to_string())),
        }
    }
}
