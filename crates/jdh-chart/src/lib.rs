//! Chart export for journal article notebooks
//!
//! Saves a Vega-Lite chart specification (the dictionary form of an Altair
//! chart) as an SVG or PNG file. The format follows the file extension:
//!
//! ```rust,no_run
//! use jdh_chart::{load_chart_spec, save_chart, VlConvert};
//!
//! let spec = load_chart_spec("figures/tools.vl.json")?;
//! save_chart(&VlConvert::default(), &spec, "figures/tools.png", 2.0)?;
//! # Ok::<(), jdh_chart::ChartError>(())
//! ```
//!
//! Any other extension is rejected before anything is rendered or written.

pub mod error;
pub mod export;
pub mod format;
pub mod render;
pub mod validate;

// Re-export main types
pub use error::{ChartError, Result};
pub use export::{load_chart_spec, save_chart};
pub use format::ChartFormat;
pub use render::{ChartRenderer, VlConvert, DEFAULT_CONVERTER};
pub use validate::{validate_png, validate_svg, SvgSummary};
