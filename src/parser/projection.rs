// Projection parser: X10c/10c, X4i, x0.5c/1c

use super::ast::Projection;
use super::lexer::length;
use nom::{
    character::complete::{char, one_of},
    combinator::opt,
    sequence::preceded,
    IResult,
};

/// Parse a linear projection. A missing second length repeats the first.
pub fn parse_projection(input: &str) -> IResult<&str, Projection> {
    let (input, kind) = one_of("Xx")(input)?;
    let (input, first) = length(input)?;
    let (input, second) = opt(preceded(char('/'), length))(input)?;
    let second = second.unwrap_or(first);

    let projection = if kind == 'X' {
        Projection::Size {
            width: first,
            height: second,
        }
    } else {
        Projection::Scale {
            x: first,
            y: second,
        }
    };
    Ok((input, projection))
}
