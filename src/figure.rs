// Figure session: accumulates drawing commands, then renders them once

use crate::colormap::{Colormap, Rgb};
use crate::error::{PlotError, Result};
use crate::parser::ast::{Frame, Length, Projection, Shape, SymbolStyle, Unit};
use crate::region::Region;
use crate::render;
use crate::{OutputFormat, RenderOptions};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Lifecycle of a figure. Dropping a finalized figure closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Accumulating,
    Finalized,
}

/// How symbols get their fill color
#[derive(Debug, Clone)]
pub enum SymbolColor {
    Fixed(Rgb),
    /// One value per point, looked up in the given colormap
    Mapped { values: Vec<f64>, cmap: Colormap },
}

/// Arguments of a single batched symbol plot
#[derive(Debug, Clone)]
pub struct PlotArgs {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Per-point size in the style's unit; the style's own size when absent
    pub sizes: Option<Vec<f64>>,
    pub color: SymbolColor,
    pub style: SymbolStyle,
    pub no_clip: bool,
    /// 0 (opaque) to 100 (invisible)
    pub transparency: f64,
}

impl PlotArgs {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            sizes: None,
            color: SymbolColor::Fixed(Rgb(0, 0, 0)),
            style: SymbolStyle {
                shape: Shape::Circle,
                size: Some(0.2),
                unit: Unit::Centimeter,
            },
            no_clip: false,
            transparency: 0.0,
        }
    }

    pub fn sizes(mut self, sizes: Vec<f64>) -> Self {
        self.sizes = Some(sizes);
        self
    }

    pub fn cmap(mut self, values: Vec<f64>, cmap: Colormap) -> Self {
        self.color = SymbolColor::Mapped { values, cmap };
        self
    }

    pub fn fill(mut self, color: Rgb) -> Self {
        self.color = SymbolColor::Fixed(color);
        self
    }

    pub fn style(mut self, style: SymbolStyle) -> Self {
        self.style = style;
        self
    }

    pub fn no_clip(mut self, no_clip: bool) -> Self {
        self.no_clip = no_clip;
        self
    }

    pub fn transparency(mut self, transparency: f64) -> Self {
        self.transparency = transparency;
        self
    }
}

/// A resolved symbol ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub x: f64,
    pub y: f64,
    pub size: Length,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Basemap {
        region: Region,
        projection: Projection,
        frame: Frame,
    },
    Symbols {
        region: Region,
        symbols: Vec<Symbol>,
        shape: Shape,
        no_clip: bool,
        alpha: f64,
    },
}

#[derive(Debug)]
pub struct Figure {
    options: RenderOptions,
    state: SessionState,
    region: Option<Region>,
    commands: Vec<DrawCommand>,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}

impl Figure {
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            options,
            state: SessionState::Created,
            region: None,
            commands: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == SessionState::Finalized {
            return Err(PlotError::SessionFinalized);
        }
        Ok(())
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
        self.state = SessionState::Accumulating;
    }

    /// Draw a frame around `region`. Sets the region used by later plots.
    pub fn basemap(&mut self, region: Region, projection: Projection, frame: Frame) -> Result<()> {
        self.ensure_open()?;
        debug!(%region, ?projection, title = ?frame.title, "basemap");

        self.region = Some(region);
        self.push(DrawCommand::Basemap {
            region,
            projection,
            frame,
        });
        Ok(())
    }

    /// Plot one batch of symbols. Nothing is appended if validation fails.
    pub fn plot(&mut self, args: PlotArgs) -> Result<()> {
        self.ensure_open()?;
        let region = self.region.ok_or(PlotError::NoRegion)?;

        let symbols = resolve_symbols(&args)?;
        debug!(
            requested = args.x.len(),
            drawn = symbols.len(),
            shape = ?args.style.shape,
            "plot"
        );

        self.push(DrawCommand::Symbols {
            region,
            symbols,
            shape: args.style.shape,
            no_clip: args.no_clip,
            alpha: 1.0 - args.transparency / 100.0,
        });
        Ok(())
    }

    /// Finalize and encode the figure
    pub fn render(&mut self, format: OutputFormat) -> Result<Vec<u8>> {
        self.ensure_open()?;
        if self.commands.is_empty() {
            return Err(PlotError::EmptyCanvas);
        }
        self.state = SessionState::Finalized;

        let bytes = render::render(&self.commands, self.options.dpi, format)?;
        info!(
            commands = self.commands.len(),
            bytes = bytes.len(),
            ?format,
            "Rendered figure"
        );
        Ok(bytes)
    }

    /// Finalize and write to `path`, picking the format from its extension
    pub fn savefig(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = OutputFormat::from_path(path)?;
        let bytes = self.render(format)?;
        fs::write(path, bytes)?;
        info!(path = %path.display(), "Saved figure");
        Ok(())
    }

    /// Finalize in the configured format and stream it to `out`
    pub fn show<W: Write>(&mut self, mut out: W) -> Result<()> {
        let bytes = self.render(self.options.format)?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }
}

/// Check the parallel inputs and turn them into drawable symbols.
///
/// Rows with a missing (NaN) coordinate, size or color value are skipped.
fn resolve_symbols(args: &PlotArgs) -> Result<Vec<Symbol>> {
    let n = args.x.len();
    let check = |name: &'static str, len: usize| {
        if len == n {
            Ok(())
        } else {
            Err(PlotError::ShapeMismatch {
                name,
                expected: n,
                actual: len,
            })
        }
    };

    check("y", args.y.len())?;
    if let Some(sizes) = &args.sizes {
        check("sizes", sizes.len())?;
        if let Some(bad) = sizes.iter().find(|s| **s < 0.0) {
            return Err(PlotError::invalid_argument(
                "sizes",
                format!("symbol size must not be negative, got {}", bad),
            ));
        }
    } else if args.style.size.is_none() {
        return Err(PlotError::invalid_argument(
            "style",
            "no symbol size in style and no sizes given",
        ));
    }
    if let SymbolColor::Mapped { values, .. } = &args.color {
        check("color", values.len())?;
    }
    if !(0.0..=100.0).contains(&args.transparency) {
        return Err(PlotError::invalid_argument(
            "transparency",
            format!("must be between 0 and 100, got {}", args.transparency),
        ));
    }

    let mut symbols = Vec::with_capacity(n);
    for i in 0..n {
        let (x, y) = (args.x[i], args.y[i]);
        let size = args.sizes.as_ref().map(|s| s[i]);
        if !x.is_finite() || !y.is_finite() || size.is_some_and(|s| !s.is_finite()) {
            continue;
        }

        let color = match &args.color {
            SymbolColor::Fixed(color) => *color,
            SymbolColor::Mapped { values, cmap } => {
                if values[i].is_nan() {
                    continue;
                }
                cmap.color_for(values[i])?
            }
        };

        if let Some(size) = args.style.length(size) {
            symbols.push(Symbol { x, y, size, color });
        }
    }
    Ok(symbols)
}
