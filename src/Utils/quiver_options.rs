//! Rendering options of quiver plots.
//!
//! Every option is optional so that a set of defaults can be overridden key by key with
//! [`QuiverOptions::merge`]. Options may also be read from a short document of `key: value` pairs
//! separated by commas, semicolons or new lines:
//!
//! ```
//! use RustedDETools::Utils::quiver_options::{Pivot, QuiverOptions};
//! let options: QuiverOptions = "color: red, pivot: middle\n head_width: 0".parse().unwrap();
//! assert_eq!(options.pivot, Some(Pivot::Middle));
//! assert_eq!(options.color, Some((255, 0, 0)));
//! ```
use crate::numerical::direction_fields::FieldError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0, one_of, space0},
    combinator::recognize,
    multi::{many0, separated_list0},
    sequence::{delimited, pair, separated_pair},
};
use std::str::FromStr;

/// which point of the arrow sits on the grid point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pivot {
    Tail,
    Middle,
    Tip,
}

impl FromStr for Pivot {
    type Err = FieldError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tail" => Ok(Pivot::Tail),
            "middle" | "mid" => Ok(Pivot::Middle),
            "tip" => Ok(Pivot::Tip),
            _ => Err(FieldError::InvalidOption(format!("pivot: {}", s))),
        }
    }
}

pub const DEFAULT_COLOR: (u8, u8, u8) = (0, 0, 0);
pub const DEFAULT_LINE_WIDTH: u32 = 1;
/// fraction of the smallest grid spacing used as arrow length
pub const DEFAULT_LENGTH_FRACTION: f64 = 0.8;
pub const DEFAULT_HEAD_WIDTH: f64 = 0.25;
pub const DEFAULT_HEAD_LENGTH: f64 = 0.3;
pub const DEFAULT_HEAD_AXIS_LENGTH: f64 = 0.25;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuiverOptions {
    /// rgb colour of shafts and heads
    pub color: Option<(u8, u8, u8)>,
    /// shaft width in pixels
    pub line_width: Option<u32>,
    /// arrow length in data units; 0.8 of the grid spacing when unset
    pub length: Option<f64>,
    /// head width as a fraction of the arrow length; 0 removes the head
    pub head_width: Option<f64>,
    /// head length as a fraction of the arrow length
    pub head_length: Option<f64>,
    /// distance from the tip to where the head meets the shaft, as a fraction of the arrow length
    pub head_axis_length: Option<f64>,
    pub pivot: Option<Pivot>,
}

impl QuiverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// plain centred segments without heads, used for slope fields
    pub fn slope_defaults() -> Self {
        QuiverOptions {
            head_width: Some(0.0),
            head_length: Some(0.001),
            head_axis_length: Some(0.0),
            pivot: Some(Pivot::Middle),
            ..Default::default()
        }
    }

    /// options of `self` overridden by every option set in `overrides`
    pub fn merge(&self, overrides: &QuiverOptions) -> QuiverOptions {
        QuiverOptions {
            color: overrides.color.or(self.color),
            line_width: overrides.line_width.or(self.line_width),
            length: overrides.length.or(self.length),
            head_width: overrides.head_width.or(self.head_width),
            head_length: overrides.head_length.or(self.head_length),
            head_axis_length: overrides.head_axis_length.or(self.head_axis_length),
            pivot: overrides.pivot.or(self.pivot),
        }
    }

    pub fn color(mut self, rgb: (u8, u8, u8)) -> Self {
        self.color = Some(rgb);
        self
    }
    pub fn line_width(mut self, width: u32) -> Self {
        self.line_width = Some(width);
        self
    }
    pub fn length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }
    pub fn pivot(mut self, pivot: Pivot) -> Self {
        self.pivot = Some(pivot);
        self
    }
    pub fn head(mut self, width: f64, length: f64, axis_length: f64) -> Self {
        self.head_width = Some(width);
        self.head_length = Some(length);
        self.head_axis_length = Some(axis_length);
        self
    }

    /// set one option from its textual form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        let invalid = || FieldError::InvalidOption(format!("{}: {}", key, value));
        let number = || value.parse::<f64>().map_err(|_| invalid());
        match key {
            "color" | "colour" => self.color = Some(parse_color(value).ok_or_else(invalid)?),
            "line_width" | "linewidth" => {
                self.line_width = Some(value.parse::<u32>().map_err(|_| invalid())?)
            }
            "length" | "scale" => self.length = Some(number()?),
            "head_width" | "headwidth" => self.head_width = Some(number()?),
            "head_length" | "headlength" => self.head_length = Some(number()?),
            "head_axis_length" | "headaxislength" => self.head_axis_length = Some(number()?),
            "pivot" => self.pivot = Some(value.parse()?),
            _ => return Err(FieldError::InvalidOption(format!("unknown option {}", key))),
        }
        Ok(())
    }
}

/// named colour or `#rrggbb`
pub fn parse_color(value: &str) -> Option<(u8, u8, u8)> {
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }
    match value.to_lowercase().as_str() {
        "black" | "k" => Some((0, 0, 0)),
        "white" | "w" => Some((255, 255, 255)),
        "red" | "r" => Some((255, 0, 0)),
        "green" | "g" => Some((0, 128, 0)),
        "blue" | "b" => Some((0, 0, 255)),
        "cyan" | "c" => Some((0, 255, 255)),
        "magenta" | "m" => Some((255, 0, 255)),
        "yellow" | "y" => Some((255, 255, 0)),
        "gray" | "grey" => Some((128, 128, 128)),
        "orange" => Some((255, 165, 0)),
        _ => None,
    }
}

/// Parses a key (word characters without spaces)
fn parse_key(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Parses a value: everything up to the next separator
fn parse_value(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ',' && c != ';' && c != '\n').parse(input)
}

/// Parses `key: value`
fn parse_entry(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        delimited(multispace0, parse_key, space0),
        char(':'),
        delimited(space0, parse_value, space0),
    )
    .parse(input)
}

fn parse_entries(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    separated_list0(one_of(",;\n"), parse_entry).parse(input)
}

impl FromStr for QuiverOptions {
    type Err = FieldError;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (rest, entries) = parse_entries(input)
            .map_err(|e| FieldError::InvalidOption(format!("cannot parse options: {:?}", e)))?;
        let rest = rest.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
        if !rest.is_empty() {
            return Err(FieldError::InvalidOption(format!(
                "unexpected input: {}",
                rest
            )));
        }
        let mut options = QuiverOptions::default();
        for (key, value) in entries {
            options.set(key, value.trim())?;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_document() {
        let doc = "color: #1f77b4, line_width: 2; length: 0.15\npivot: tip\n";
        let options: QuiverOptions = doc.parse().unwrap();
        assert_eq!(options.color, Some((0x1f, 0x77, 0xb4)));
        assert_eq!(options.line_width, Some(2));
        assert_eq!(options.length, Some(0.15));
        assert_eq!(options.pivot, Some(Pivot::Tip));
        assert_eq!(options.head_width, None);
    }

    #[test]
    fn test_parse_matplotlib_style_keys() {
        let doc = "headwidth: 0, headlength: 0.001, headaxislength: 0, pivot: mid";
        let options: QuiverOptions = doc.parse().unwrap();
        assert_eq!(options, QuiverOptions::slope_defaults());
    }

    #[test]
    fn test_parse_empty_document() {
        let options: QuiverOptions = "  ".parse().unwrap();
        assert_eq!(options, QuiverOptions::default());
    }

    #[test]
    fn test_parse_errors() {
        assert!("arrowstyle: fancy".parse::<QuiverOptions>().is_err());
        assert!("pivot: left".parse::<QuiverOptions>().is_err());
        assert!("color: #12".parse::<QuiverOptions>().is_err());
        assert!("length: long".parse::<QuiverOptions>().is_err());
        assert!("color red".parse::<QuiverOptions>().is_err());
    }

    #[test]
    fn test_merge_overrides_key_by_key() {
        let user = QuiverOptions::new().color((255, 0, 0)).pivot(Pivot::Tail);
        let merged = QuiverOptions::slope_defaults().merge(&user);
        assert_eq!(merged.color, Some((255, 0, 0)));
        assert_eq!(merged.pivot, Some(Pivot::Tail));
        assert_eq!(merged.head_width, Some(0.0));
        assert_eq!(merged.head_length, Some(0.001));
    }
}
