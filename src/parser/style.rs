// Symbol style parser: cc, c0.3c, s4p, d

use super::ast::{Shape, SymbolStyle};
use super::lexer::{number_literal, unit};
use nom::{
    character::complete::one_of,
    combinator::{map, opt},
    IResult,
};

fn shape(input: &str) -> IResult<&str, Shape> {
    map(one_of("cstdx+"), |c| match c {
        'c' => Shape::Circle,
        's' => Shape::Square,
        't' => Shape::Triangle,
        'd' => Shape::Diamond,
        'x' => Shape::Cross,
        _ => Shape::Plus,
    })(input)
}

/// Parse `<shape>[<size>][<unit>]`
pub fn parse_style(input: &str) -> IResult<&str, SymbolStyle> {
    let (input, shape) = shape(input)?;
    let (input, size) = opt(number_literal)(input)?;
    let (input, unit) = opt(unit)(input)?;

    Ok((
        input,
        SymbolStyle {
            shape,
            size,
            unit: unit.unwrap_or_default(),
        },
    ))
}
