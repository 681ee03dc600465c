// Frame parser: xafg+l"label", a, WSen+t"title"

use super::ast::{AxisName, AxisSpec, FrameElement, Interval, SideMode, Sides};
use super::lexer::{bare_text, number_literal, string_literal};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::one_of,
    combinator::{map, opt, verify},
    multi::{many0, many1},
    sequence::{pair, preceded},
    IResult,
};

/// Parse one frame element
pub fn parse_frame_element(input: &str) -> IResult<&str, FrameElement> {
    alt((parse_sides_element, parse_axis_element))(input)
}

/// `+l"text"` or `+ltext`
fn modifier<'a>(key: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    preceded(tag(key), alt((string_literal, bare_text)))
}

fn interval(input: &str) -> IResult<&str, (char, Interval)> {
    map(pair(one_of("afg"), opt(number_literal)), |(kind, step)| {
        (kind, step.map(Interval::Every).unwrap_or(Interval::Auto))
    })(input)
}

fn axis_name(input: &str) -> IResult<&str, AxisName> {
    map(one_of("xy"), |c| if c == 'x' { AxisName::X } else { AxisName::Y })(input)
}

fn parse_axis_element(input: &str) -> IResult<&str, FrameElement> {
    let (input, axis) = opt(axis_name)(input)?;
    let (input, intervals) = many0(interval)(input)?;
    let (input, label) = opt(modifier("+l"))(input)?;

    if intervals.is_empty() && label.is_none() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let mut spec = AxisSpec {
        label,
        ..Default::default()
    };
    for (kind, step) in intervals {
        match kind {
            'a' => spec.annotate = Some(step),
            'f' => spec.tick = Some(step),
            _ => spec.grid = Some(step),
        }
    }

    Ok((input, FrameElement::Axis(axis, spec)))
}

fn parse_sides_element(input: &str) -> IResult<&str, FrameElement> {
    alt((
        map(
            pair(many1(one_of("WSENwsen")), opt(modifier("+t"))),
            |(letters, title)| FrameElement::Sides(Some(sides_from_letters(&letters)), title),
        ),
        map(
            verify(modifier("+t"), |t: &String| !t.is_empty()),
            |title| FrameElement::Sides(None, Some(title)),
        ),
    ))(input)
}

fn sides_from_letters(letters: &[char]) -> Sides {
    let mode = |upper: char| {
        let lower = upper.to_ascii_lowercase();
        if letters.contains(&upper) {
            SideMode::Annotated
        } else if letters.contains(&lower) {
            SideMode::Ticked
        } else {
            SideMode::Hidden
        }
    };
    Sides {
        west: mode('W'),
        south: mode('S'),
        east: mode('E'),
        north: mode('N'),
    }
}
