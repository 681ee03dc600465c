// Library exports for catscatter

pub mod colormap;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod figure;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod region;
pub mod render;

pub use error::{PlotError, Result};

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Ok(OutputFormat::Png),
            Some("svg") => Ok(OutputFormat::Svg),
            _ => Err(PlotError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    /// Pixels per inch used to turn physical map and symbol sizes into pixels
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_dpi() -> u32 { 150 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            format: OutputFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("fig.PNG")).unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("out/fig.svg")).unwrap(), OutputFormat::Svg);
        assert!(OutputFormat::from_path(Path::new("fig")).is_err());
    }

    #[test]
    fn test_render_options_defaults_from_json() {
        let options: RenderOptions = serde_json::from_str("{\"type\": \"svg\"}").unwrap();
        assert_eq!(options.dpi, 150);
        assert_eq!(options.format, OutputFormat::Svg);
    }
}
