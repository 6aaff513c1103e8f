//! Chart export to image files

use crate::error::{ChartError, Result};
use crate::format::ChartFormat;
use crate::render::ChartRenderer;
use crate::validate::{validate_png, validate_svg};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read a Vega-Lite specification from a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not JSON.
pub fn load_chart_spec<P: AsRef<Path>>(path: P) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Render `spec` and save it to `path`, picking SVG or PNG from the extension
///
/// `scale_factor` multiplies the raster resolution of PNG output and is
/// ignored for SVG. Nothing is written unless rendering succeeds and the
/// output passes validation.
///
/// # Errors
///
/// Returns an error if:
/// - The extension is not `svg` or `png` (`ChartError::UnsupportedFormat`)
/// - `scale_factor` is not a positive finite number (`ChartError::InvalidScale`)
/// - Rendering fails or yields an invalid image
/// - The file cannot be written
pub fn save_chart<R, P>(
    renderer: &R,
    spec: &Value,
    path: P,
    scale_factor: f64,
) -> Result<ChartFormat>
where
    R: ChartRenderer + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let format = ChartFormat::from_path(path)?;

    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(ChartError::InvalidScale(scale_factor));
    }

    match format {
        ChartFormat::Svg => {
            let svg = renderer.render_svg(spec)?;
            let summary = validate_svg(&svg)?;
            fs::write(path, svg)?;
            log::info!(
                "Saved SVG chart to {} ({} elements)",
                path.display(),
                summary.element_count
            );
        }
        ChartFormat::Png => {
            let png = renderer.render_png(spec, scale_factor)?;
            validate_png(&png)?;
            fs::write(path, &png)?;
            log::info!(
                "Saved PNG chart to {} ({} bytes, scale {scale_factor})",
                path.display(),
                png.len()
            );
        }
    }

    Ok(format)
}
