// Parsers for the compact frame, projection and symbol style strings

pub mod ast;
pub mod frame;
pub mod lexer;
pub mod projection;
pub mod style;

pub use ast::{Frame, Projection, SymbolStyle};

use crate::error::{PlotError, Result};
use nom::combinator::all_consuming;
use nom::Finish;

/// Parse and merge a list of frame elements, e.g.
/// `["xafg+l\"Bill length\"", "WSen+t\"Title\""]`
pub fn parse_frame<S: AsRef<str>>(elements: &[S]) -> Result<Frame> {
    let parsed = elements
        .iter()
        .map(|e| {
            let e = e.as_ref().trim();
            all_consuming(frame::parse_frame_element)(e)
                .finish()
                .map(|(_, element)| element)
                .map_err(|_| PlotError::parse("frame", e))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Frame::from_elements(parsed))
}

pub fn parse_projection(input: &str) -> Result<Projection> {
    let input = input.trim();
    all_consuming(projection::parse_projection)(input)
        .finish()
        .map(|(_, p)| p)
        .map_err(|_| PlotError::parse("projection", input))
}

pub fn parse_style(input: &str) -> Result<SymbolStyle> {
    let input = input.trim();
    all_consuming(style::parse_style)(input)
        .finish()
        .map(|(_, s)| s)
        .map_err(|_| PlotError::parse("style", input))
}
