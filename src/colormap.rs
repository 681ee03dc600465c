//! Discrete colormaps built from named palettes.
//!
//! A colormap is an explicit value: build it with [`makecpt`] or
//! [`Colormap::for_categories`] and hand it to the plot call that uses it.

use crate::data::Categorical;
use crate::error::{PlotError, Result};
use colorgrad::Gradient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance, in units of the series step, for matching a value to a bin.
const BIN_TOLERANCE: f64 = 1e-9;

/// Largest number of bins a series may produce.
pub const MAX_BINS: usize = 65_536;

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.0, self.1, self.2)
    }
}

/// Whether values are looked up exactly (categories) or by interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    #[default]
    Categorical,
    Continuous,
}

/// `start/stop/step` description of the colormap's index range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Series {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    fn invalid(&self, message: &str) -> PlotError {
        PlotError::InvalidSeries {
            start: self.start,
            stop: self.stop,
            step: self.step,
            message: message.to_string(),
        }
    }

    /// Number of bins: `ceil((stop - start) / step)`
    pub fn bin_count(&self) -> Result<usize> {
        if ![self.start, self.stop, self.step].iter().all(|v| v.is_finite()) {
            return Err(self.invalid("values must be finite"));
        }
        if self.stop <= self.start {
            return Err(self.invalid("stop must be greater than start"));
        }
        if self.step <= 0.0 {
            return Err(self.invalid("step must be positive"));
        }
        let span = ((self.stop - self.start) / self.step - BIN_TOLERANCE).ceil().max(1.0);
        if span > MAX_BINS as f64 {
            return Err(self.invalid(&format!("more than {} bins", MAX_BINS)));
        }
        Ok(span as usize)
    }
}

/// One colormap entry covering `[lower, lower + step)`
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub color: Rgb,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    pub palette: String,
    pub model: ColorModel,
    pub series: Series,
    pub bins: Vec<Bin>,
}

/// Build a colormap with `ceil((stop - start) / step)` bins.
///
/// `palette` is a preset name (`inferno`, `viridis`, ...) or a comma-separated
/// list of colors (`red,#00ff00,steelblue`). Bin `i` takes the palette color
/// at `(i + 0.5) / n`.
pub fn makecpt(palette: &str, model: ColorModel, series: Series) -> Result<Colormap> {
    let n = series.bin_count()?;
    let gradient = palette_gradient(palette)?;

    let bins = (0..n)
        .map(|i| {
            let [r, g, b, _] = gradient.at((i as f64 + 0.5) / n as f64).to_rgba8();
            Bin {
                lower: series.start + i as f64 * series.step,
                color: Rgb(r, g, b),
                label: None,
            }
        })
        .collect();

    Ok(Colormap {
        palette: palette.to_string(),
        model,
        series,
        bins,
    })
}

fn palette_gradient(name: &str) -> Result<Gradient> {
    if name.contains(',') {
        let colors: Vec<&str> = name.split(',').map(str::trim).collect();
        return colorgrad::CustomGradient::new()
            .html_colors(&colors)
            .build()
            .map_err(|e| PlotError::UnknownPalette(format!("{}: {}", name, e)));
    }

    let gradient = match name.to_lowercase().as_str() {
        "viridis" => colorgrad::viridis(),
        "inferno" => colorgrad::inferno(),
        "magma" => colorgrad::magma(),
        "plasma" => colorgrad::plasma(),
        "cividis" => colorgrad::cividis(),
        "turbo" => colorgrad::turbo(),
        "warm" => colorgrad::warm(),
        "cool" => colorgrad::cool(),
        "rainbow" => colorgrad::rainbow(),
        "sinebow" => colorgrad::sinebow(),
        "spectral" => colorgrad::spectral(),
        "rdbu" => colorgrad::rd_bu(),
        "blues" => colorgrad::blues(),
        "greens" => colorgrad::greens(),
        "greys" | "grays" => colorgrad::greys(),
        "oranges" => colorgrad::oranges(),
        "purples" => colorgrad::purples(),
        "reds" => colorgrad::reds(),
        _ => return Err(PlotError::UnknownPalette(name.to_string())),
    };
    Ok(gradient)
}

impl Colormap {
    /// Categorical colormap with one labelled bin per category, series `0/N/1`.
    pub fn for_categories(palette: &str, categorical: &Categorical) -> Result<Self> {
        let series = Series::new(0.0, categorical.len() as f64, 1.0);
        let mut cmap = makecpt(palette, ColorModel::Categorical, series)?;
        cmap.set_labels(&categorical.categories)?;
        Ok(cmap)
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn set_labels(&mut self, labels: &[String]) -> Result<()> {
        if labels.len() != self.bins.len() {
            return Err(PlotError::CategoryDomain {
                bins: self.bins.len(),
                categories: labels.len(),
            });
        }
        for (bin, label) in self.bins.iter_mut().zip(labels) {
            bin.label = Some(label.clone());
        }
        Ok(())
    }

    /// Bin index for a value, following the color model.
    pub fn bin_index(&self, value: f64) -> Result<usize> {
        if !value.is_finite() {
            return Err(PlotError::UnmappedValue(value));
        }
        let n = self.bins.len();
        let position = (value - self.series.start) / self.series.step;

        match self.model {
            ColorModel::Categorical => {
                let idx = position.round();
                if (position - idx).abs() > BIN_TOLERANCE || idx < 0.0 || idx >= n as f64 {
                    return Err(PlotError::UnmappedValue(value));
                }
                Ok(idx as usize)
            }
            ColorModel::Continuous => {
                let idx = (position + BIN_TOLERANCE).floor().clamp(0.0, (n - 1) as f64);
                Ok(idx as usize)
            }
        }
    }

    pub fn color_for(&self, value: f64) -> Result<Rgb> {
        Ok(self.bins[self.bin_index(value)?].color)
    }

    /// Ensure every code of `categorical` has its own bin.
    pub fn check_domain(&self, categorical: &Categorical) -> Result<()> {
        let domain_err = PlotError::CategoryDomain {
            bins: self.bins.len(),
            categories: categorical.len(),
        };
        if self.model != ColorModel::Categorical || self.bins.len() < categorical.len() {
            return Err(domain_err);
        }
        for code in 0..categorical.len() {
            if self.bin_index(code as f64).ok() != Some(code) {
                return Err(domain_err);
            }
        }
        Ok(())
    }
}

/// CPT-style listing: one `lower<TAB>r/g/b[;label]` line per bin
impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} ({:?})", self.palette, self.model)?;
        for bin in &self.bins {
            write!(f, "{}\t{}", bin.lower, bin.color)?;
            if let Some(label) = &bin.label {
                write!(f, ";{}", label)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
