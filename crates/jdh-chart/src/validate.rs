//! Sanity checks on converter output before it is written to disk

use crate::error::{ChartError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Facts about a rendered SVG document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SvgSummary {
    /// `width` attribute of the root element
    pub width: Option<String>,
    /// `height` attribute of the root element
    pub height: Option<String>,
    /// `viewBox` attribute of the root element
    pub viewbox: Option<String>,
    /// Number of elements, root included
    pub element_count: usize,
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn open_element(
    e: &BytesStart<'_>,
    depth: usize,
    seen_root: &mut bool,
    summary: &mut SvgSummary,
) -> Result<()> {
    if depth == 0 {
        if *seen_root {
            return Err(ChartError::InvalidSvg("multiple root elements".to_string()));
        }
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
        if name != "svg" {
            return Err(ChartError::InvalidSvg(format!(
                "root element is <{name}>, expected <svg>"
            )));
        }
        *seen_root = true;
        summary.width = attribute(e, "width");
        summary.height = attribute(e, "height");
        summary.viewbox = attribute(e, "viewBox");
    }
    summary.element_count += 1;
    Ok(())
}

/// Check that `content` is well-formed XML whose root element is `<svg>`
///
/// # Errors
///
/// Returns `ChartError::InvalidSvg` for malformed XML, a non-`svg` root,
/// unclosed elements or an empty document.
pub fn validate_svg(content: &str) -> Result<SvgSummary> {
    let mut summary = SvgSummary::default();
    let mut depth = 0usize;
    let mut seen_root = false;

    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                open_element(&e, depth, &mut seen_root, &mut summary)?;
                depth += 1;
            }
            Ok(Event::Empty(e)) => open_element(&e, depth, &mut seen_root, &mut summary)?,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parse error in rendered SVG: {e}");
                return Err(ChartError::InvalidSvg(e.to_string()));
            }
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ChartError::InvalidSvg("no <svg> element".to_string()));
    }
    if depth != 0 {
        return Err(ChartError::InvalidSvg(format!("{depth} unclosed elements")));
    }
    Ok(summary)
}

/// Check that `bytes` starts with the PNG signature
///
/// # Errors
///
/// Returns `ChartError::InvalidPng` otherwise.
pub fn validate_png(bytes: &[u8]) -> Result<()> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        Ok(())
    } else {
        Err(ChartError::InvalidPng(format!(
            "missing PNG signature ({} bytes of output)",
            bytes.len()
        )))
    }
}
