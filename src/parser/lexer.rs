// Shared token parsers for the frame, projection and style strings

use super::ast::{Length, Unit};
use nom::{
    bytes::complete::{take_till, take_till1},
    character::complete::{char, multispace0, one_of},
    combinator::{map, map_res, opt},
    number::complete::recognize_float,
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser to skip surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Double-quoted string without escapes: "Bill depth (mm)"
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
        String::from,
    )(input)
}

/// Text running up to the next `+` modifier or the end of input
pub fn bare_text(input: &str) -> IResult<&str, String> {
    map(take_till1(|c| c == '+'), String::from)(input)
}

pub fn number_literal(input: &str) -> IResult<&str, f64> {
    map_res(recognize_float, str::parse::<f64>)(input)
}

pub fn unit(input: &str) -> IResult<&str, Unit> {
    map(one_of("cip"), |c| match c {
        'i' => Unit::Inch,
        'p' => Unit::Point,
        _ => Unit::Centimeter,
    })(input)
}

/// Number with an optional unit suffix, centimeters when omitted: 10c, 4i, 2.5
pub fn length(input: &str) -> IResult<&str, Length> {
    map(pair(number_literal, opt(unit)), |(value, unit)| Length {
        value,
        unit: unit.unwrap_or_default(),
    })(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal() {
        let (rest, s) = string_literal("\"Bill depth (mm)\"+x").unwrap();
        assert_eq!(s, "Bill depth (mm)");
        assert_eq!(rest, "+x");
    }

    #[test]
    fn test_string_literal_unclosed() {
        assert!(string_literal("\"open").is_err());
    }

    #[test]
    fn test_bare_text() {
        let (rest, s) = bare_text("Bill length+t").unwrap();
        assert_eq!(s, "Bill length");
        assert_eq!(rest, "+t");
    }

    #[test]
    fn test_length() {
        let (_, l) = length("10c").unwrap();
        assert_eq!(l, Length { value: 10.0, unit: Unit::Centimeter });
        let (_, l) = length("1.5i").unwrap();
        assert_eq!(l, Length { value: 1.5, unit: Unit::Inch });
        let (_, l) = length("3").unwrap();
        assert_eq!(l.unit, Unit::Centimeter);
    }
}
