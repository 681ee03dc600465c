// Parsed forms of the frame, projection and symbol style strings

use crate::region::Region;

pub const CM_PER_INCH: f64 = 2.54;
pub const POINTS_PER_INCH: f64 = 72.0;

/// Physical length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Centimeter,
    Inch,
    Point,
}

/// A physical length on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Unit,
}

impl Length {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn to_inches(self) -> f64 {
        match self.unit {
            Unit::Centimeter => self.value / CM_PER_INCH,
            Unit::Inch => self.value,
            Unit::Point => self.value / POINTS_PER_INCH,
        }
    }

    pub fn to_pixels(self, dpi: u32) -> f64 {
        self.to_inches() * dpi as f64
    }
}

/// Linear Cartesian projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// `X<width>[/<height>]`: fixed map size
    Size { width: Length, height: Length },
    /// `x<xscale>[/<yscale>]`: length per data unit
    Scale { x: Length, y: Length },
}

impl Projection {
    /// Map size in pixels for the given region
    pub fn pixel_size(&self, region: &Region, dpi: u32) -> (f64, f64) {
        match self {
            Projection::Size { width, height } => (width.to_pixels(dpi), height.to_pixels(dpi)),
            Projection::Scale { x, y } => (
                x.to_pixels(dpi) * (region.xmax - region.xmin),
                y.to_pixels(dpi) * (region.ymax - region.ymin),
            ),
        }
    }
}

/// Spacing of annotations, ticks or gridlines along an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interval {
    Auto,
    Every(f64),
}

/// Per-axis frame settings: `afg` intervals plus a `+l` label
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisSpec {
    pub annotate: Option<Interval>,
    pub tick: Option<Interval>,
    pub grid: Option<Interval>,
    pub label: Option<String>,
}

impl AxisSpec {
    fn merge(&mut self, other: &AxisSpec) {
        if other.annotate.is_some() {
            self.annotate = other.annotate;
        }
        if other.tick.is_some() {
            self.tick = other.tick;
        }
        if other.grid.is_some() {
            self.grid = other.grid;
        }
        if other.label.is_some() {
            self.label = other.label.clone();
        }
    }
}

/// How one side of the frame is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideMode {
    /// Upper-case letter: line, ticks and annotations
    Annotated,
    /// Lower-case letter: line and ticks only
    Ticked,
    /// Letter absent: not drawn
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sides {
    pub west: SideMode,
    pub south: SideMode,
    pub east: SideMode,
    pub north: SideMode,
}

impl Default for Sides {
    /// `WSen`
    fn default() -> Self {
        Self {
            west: SideMode::Annotated,
            south: SideMode::Annotated,
            east: SideMode::Ticked,
            north: SideMode::Ticked,
        }
    }
}

/// One comma-free element of a frame argument
#[derive(Debug, Clone, PartialEq)]
pub enum FrameElement {
    /// `None` axis means both x and y
    Axis(Option<AxisName>, AxisSpec),
    Sides(Option<Sides>, Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisName {
    X,
    Y,
}

/// Fully merged frame description
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub x: AxisSpec,
    pub y: AxisSpec,
    pub sides: Sides,
    pub title: Option<String>,
}

impl Frame {
    pub fn from_elements(elements: Vec<FrameElement>) -> Self {
        let mut frame = Frame::default();
        for element in elements {
            match element {
                FrameElement::Axis(Some(AxisName::X), spec) => frame.x.merge(&spec),
                FrameElement::Axis(Some(AxisName::Y), spec) => frame.y.merge(&spec),
                FrameElement::Axis(None, spec) => {
                    frame.x.merge(&spec);
                    frame.y.merge(&spec);
                }
                FrameElement::Sides(sides, title) => {
                    if let Some(sides) = sides {
                        frame.sides = sides;
                    }
                    if title.is_some() {
                        frame.title = title;
                    }
                }
            }
        }
        frame
    }
}

/// Symbol shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Diamond,
    Cross,
    Plus,
}

/// `cc`, `s0.2c`, `t4p`: shape, optional size, optional size unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolStyle {
    pub shape: Shape,
    pub size: Option<f64>,
    pub unit: Unit,
}

impl SymbolStyle {
    /// Physical size of a symbol given a per-point size (in the style's unit).
    pub fn length(&self, size: Option<f64>) -> Option<Length> {
        size.or(self.size).map(|v| Length::new(v, self.unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_to_pixels() {
        assert!((Length::new(2.54, Unit::Centimeter).to_pixels(100) - 100.0).abs() < 1e-9);
        assert_eq!(Length::new(1.0, Unit::Inch).to_pixels(300), 300.0);
        assert_eq!(Length::new(72.0, Unit::Point).to_pixels(96), 96.0);
    }

    #[test]
    fn test_projection_scale_size() {
        let region = Region::new(0.0, 10.0, 0.0, 5.0).unwrap();
        let proj = Projection::Scale {
            x: Length::new(0.1, Unit::Inch),
            y: Length::new(0.2, Unit::Inch),
        };
        let (w, h) = proj.pixel_size(&region, 100);
        assert!((w - 100.0).abs() < 1e-9);
        assert!((h - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_merge_both_axes_then_override() {
        let frame = Frame::from_elements(vec![
            FrameElement::Axis(None, AxisSpec { annotate: Some(Interval::Auto), ..Default::default() }),
            FrameElement::Axis(
                Some(AxisName::Y),
                AxisSpec { label: Some("depth".into()), ..Default::default() },
            ),
        ]);
        assert_eq!(frame.x.annotate, Some(Interval::Auto));
        assert_eq!(frame.y.annotate, Some(Interval::Auto));
        assert_eq!(frame.y.label.as_deref(), Some("depth"));
        assert_eq!(frame.x.label, None);
        assert_eq!(frame.sides, Sides::default());
    }
}
