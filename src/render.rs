use crate::error::{PlotError, Result};
use crate::figure::{DrawCommand, Symbol};
use crate::parser::ast::{Frame, Interval, Shape, SideMode};
use crate::region::Region;
use crate::OutputFormat;
use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

const MARGIN: u32 = 10;
const TITLE_FONT_SIZE: f64 = 20.0;
const TITLE_AREA: u32 = 40;
/// Label area for an annotated vertical side (W/E)
const Y_LABEL_AREA: u32 = 60;
/// Label area for an annotated horizontal side (S/N)
const X_LABEL_AREA: u32 = 45;
/// Largest map width or height, in pixels
const MAX_MAP_PIXELS: f64 = 16_384.0;
const AUTO_ANNOTATIONS: usize = 6;
const MAX_ANNOTATIONS: usize = 50;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Canvas geometry derived from the first basemap
#[derive(Debug, Clone, PartialEq)]
struct Layout {
    width: u32,
    height: u32,
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
    title: Option<String>,
}

impl Layout {
    fn from_commands(commands: &[DrawCommand], dpi: u32) -> Result<Self> {
        let (region, projection, frame) = commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Basemap {
                    region,
                    projection,
                    frame,
                } => Some((region, projection, frame)),
                _ => None,
            })
            .ok_or(PlotError::NoRegion)?;

        let (map_w, map_h) = projection.pixel_size(region, dpi);
        if !(map_w.is_finite() && map_h.is_finite()) || map_w < 1.0 || map_h < 1.0 {
            return Err(PlotError::invalid_argument(
                "projection",
                format!("map size {:.1}x{:.1} px is too small", map_w, map_h),
            ));
        }
        if map_w > MAX_MAP_PIXELS || map_h > MAX_MAP_PIXELS {
            return Err(PlotError::invalid_argument(
                "projection",
                format!(
                    "map size {:.0}x{:.0} px exceeds {} px per side",
                    map_w, map_h, MAX_MAP_PIXELS
                ),
            ));
        }

        let area = |mode: SideMode, size: u32| if mode == SideMode::Annotated { size } else { 0 };
        let left = area(frame.sides.west, Y_LABEL_AREA);
        let right = area(frame.sides.east, Y_LABEL_AREA);
        let top = area(frame.sides.north, X_LABEL_AREA);
        let bottom = area(frame.sides.south, X_LABEL_AREA);
        let title_area = if frame.title.is_some() { TITLE_AREA } else { 0 };

        Ok(Layout {
            width: map_w.round() as u32 + left + right + 2 * MARGIN,
            height: map_h.round() as u32 + top + bottom + 2 * MARGIN + title_area,
            left,
            right,
            top,
            bottom,
            title: frame.title.clone(),
        })
    }
}

/// Draw the accumulated commands and encode the result
pub fn render(commands: &[DrawCommand], dpi: u32, format: OutputFormat) -> Result<Vec<u8>> {
    let layout = Layout::from_commands(commands, dpi)?;

    match format {
        OutputFormat::Png => {
            let len = (layout.width as usize)
                .checked_mul(layout.height as usize)
                .and_then(|n| n.checked_mul(3))
                .ok_or_else(|| {
                    PlotError::invalid_argument("projection", "canvas is too large to allocate")
                })?;
            let mut buffer = vec![0u8; len];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (layout.width, layout.height))
                    .into_drawing_area();
                draw_commands(&root, commands, &layout, dpi)?;
            }

            let mut png_bytes = Vec::new();
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder.write_image(
                &buffer,
                layout.width,
                layout.height,
                image::ColorType::Rgb8,
            )?;
            Ok(png_bytes)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (layout.width, layout.height))
                    .into_drawing_area();
                draw_commands(&root, commands, &layout, dpi)?;
            }
            Ok(svg.into_bytes())
        }
    }
}

fn backend_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Backend(e.to_string())
}

fn draw_commands<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    commands: &[DrawCommand],
    layout: &Layout,
    dpi: u32,
) -> Result<()> {
    root.fill(&WHITE).map_err(backend_err)?;

    let body = draw_title(root, layout)?;

    for command in commands {
        match command {
            DrawCommand::Basemap { region, frame, .. } => {
                draw_frame(&body, region, frame, layout)?;
            }
            DrawCommand::Symbols {
                region,
                symbols,
                shape,
                no_clip,
                alpha,
            } => {
                let chart = build_chart(&body, region, layout)?;
                draw_symbols(root, &chart, region, symbols, *shape, *no_clip, *alpha, dpi)?;
            }
        }
    }

    root.present().map_err(backend_err)?;
    Ok(())
}

/// Draw the title into a fixed strip at the top; returns the area below it
fn draw_title<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &Layout,
) -> Result<DrawingArea<DB, Shift>> {
    let title = match &layout.title {
        Some(title) => title,
        None => return Ok(root.clone()),
    };

    let (strip, body) = root.split_vertically(TITLE_AREA);
    let style = TextStyle::from(FontDesc::new(
        FontFamily::SansSerif,
        TITLE_FONT_SIZE,
        FontStyle::Normal,
    ))
    .pos(Pos::new(HPos::Center, VPos::Center));
    strip
        .draw_text(
            title,
            &style,
            ((layout.width / 2) as i32, (TITLE_AREA / 2) as i32),
        )
        .map_err(backend_err)?;
    Ok(body)
}

fn axis_range(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        min..max
    }
}

fn build_chart<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    region: &Region,
    layout: &Layout,
) -> Result<Chart<'a, DB>> {
    ChartBuilder::on(area)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, layout.left)
        .set_label_area_size(LabelAreaPosition::Right, layout.right)
        .set_label_area_size(LabelAreaPosition::Top, layout.top)
        .set_label_area_size(LabelAreaPosition::Bottom, layout.bottom)
        .build_cartesian_2d(
            axis_range(region.xmin, region.xmax),
            axis_range(region.ymin, region.ymax),
        )
        .map_err(backend_err)
}

/// Number of annotations for an axis interval over `[min, max]`
fn annotation_count(interval: Option<Interval>, min: f64, max: f64) -> usize {
    match interval {
        None => 0,
        Some(Interval::Auto) => AUTO_ANNOTATIONS,
        Some(Interval::Every(step)) if step > 0.0 => {
            (((max - min) / step).floor() as usize + 1).clamp(2, MAX_ANNOTATIONS)
        }
        Some(Interval::Every(_)) => AUTO_ANNOTATIONS,
    }
}

fn draw_frame<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    region: &Region,
    frame: &Frame,
    layout: &Layout,
) -> Result<()> {
    let mut chart = build_chart(area, region, layout)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(annotation_count(frame.x.annotate, region.xmin, region.xmax))
            .y_labels(annotation_count(frame.y.annotate, region.ymin, region.ymax));

        if frame.x.grid.is_none() {
            mesh.disable_x_mesh();
        }
        if frame.y.grid.is_none() {
            mesh.disable_y_mesh();
        }
        if frame.x.tick.is_none() && frame.y.tick.is_none() {
            mesh.max_light_lines(0);
        }
        if let Some(label) = &frame.x.label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &frame.y.label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw().map_err(backend_err)?;
    }

    let x = axis_range(region.xmin, region.xmax);
    let y = axis_range(region.ymin, region.ymax);
    let sides = [
        (frame.sides.west, [(x.start, y.start), (x.start, y.end)]),
        (frame.sides.east, [(x.end, y.start), (x.end, y.end)]),
        (frame.sides.south, [(x.start, y.start), (x.end, y.start)]),
        (frame.sides.north, [(x.start, y.end), (x.end, y.end)]),
    ];
    let plotting_area = chart.plotting_area();
    for (mode, segment) in sides {
        if mode != SideMode::Hidden {
            plotting_area
                .draw(&PathElement::new(segment.to_vec(), BLACK.stroke_width(2)))
                .map_err(backend_err)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_symbols<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &Chart<'_, DB>,
    region: &Region,
    symbols: &[Symbol],
    shape: Shape,
    no_clip: bool,
    alpha: f64,
    dpi: u32,
) -> Result<()> {
    for symbol in symbols {
        // Clipping drops symbols centered outside the frame
        if !no_clip && !region.contains(symbol.x, symbol.y) {
            continue;
        }
        let center = chart.backend_coord(&(symbol.x, symbol.y));
        let radius = ((symbol.size.to_pixels(dpi) / 2.0).round() as i32).max(1);
        let color = RGBColor(symbol.color.0, symbol.color.1, symbol.color.2).mix(alpha);
        draw_marker(root, center, radius, shape, color)?;
    }
    Ok(())
}

/// Draw one marker in backend pixel coordinates
fn draw_marker<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    (x, y): (i32, i32),
    r: i32,
    shape: Shape,
    color: RGBAColor,
) -> Result<()> {
    let fill = color.filled();
    let stroke = color.stroke_width(2);

    let result = match shape {
        Shape::Circle => root.draw(&Circle::new((x, y), r, fill)),
        Shape::Square => root.draw(&Rectangle::new([(x - r, y - r), (x + r, y + r)], fill)),
        Shape::Triangle => root.draw(&Polygon::new(
            vec![(x, y - r), (x - r, y + r), (x + r, y + r)],
            fill,
        )),
        Shape::Diamond => root.draw(&Polygon::new(
            vec![(x, y - r), (x + r, y), (x, y + r), (x - r, y)],
            fill,
        )),
        Shape::Cross => root
            .draw(&PathElement::new(vec![(x - r, y - r), (x + r, y + r)], stroke))
            .and_then(|_| root.draw(&PathElement::new(vec![(x - r, y + r), (x + r, y - r)], stroke))),
        Shape::Plus => root
            .draw(&PathElement::new(vec![(x - r, y), (x + r, y)], stroke))
            .and_then(|_| root.draw(&PathElement::new(vec![(x, y - r), (x, y + r)], stroke))),
    };

    result.map_err(backend_err)
}
