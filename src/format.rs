//! printf format strings
//!
//! [`parse`] splits a (lexer-decoded) format string into literal text and
//! conversion directives; [`render`] produces the exact bytes C's `printf`
//! would for the supported conversions:
//!
//! - `%d` / `%i` (and `%ld`): decimal integer
//! - `%f` (and `%lf`): fixed point, 6 digits after the point by default
//! - `%%`: a literal percent sign
//!
//! Flags `-`, `+`, space and `0`, a field width and a precision are accepted
//! on both conversions. Anything else is rejected at check time, as is a
//! width or precision above [`MAX_FIELD_WIDTH`].

use crate::memory::value::Value;
use crate::parser::ast::Type;
use std::fmt;

/// Largest accepted field width or precision
pub const MAX_FIELD_WIDTH: usize = 4096;

/// Conversion selected by a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `%d`, `%i`
    Int,
    /// `%f`
    Float,
}

impl Conversion {
    /// The argument type this conversion expects.
    pub fn expected_type(self) -> Type {
        match self {
            Conversion::Int => Type::Int,
            Conversion::Float => Type::Float,
        }
    }
}

/// A single `%...` directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub conversion: Conversion,
    /// Conversion letter as written (`d`, `i` or `f`)
    pub letter: char,
    /// `l` length modifier; accepted and ignored
    pub long: bool,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub left_align: bool,
    pub zero_pad: bool,
    pub plus_sign: bool,
    pub space_sign: bool,
}

impl Directive {
    fn new(conversion: Conversion) -> Self {
        Directive {
            conversion,
            letter: match conversion {
                Conversion::Int => 'd',
                Conversion::Float => 'f',
            },
            long: false,
            width: None,
            precision: None,
            left_align: false,
            zero_pad: false,
            plus_sign: false,
            space_sign: false,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%")?;
        if self.left_align {
            write!(f, "-")?;
        }
        if self.plus_sign {
            write!(f, "+")?;
        }
        if self.space_sign {
            write!(f, " ")?;
        }
        if self.zero_pad {
            write!(f, "0")?;
        }
        if let Some(width) = self.width {
            write!(f, "{}", width)?;
        }
        if let Some(precision) = self.precision {
            write!(f, ".{}", precision)?;
        }
        if self.long {
            write!(f, "l")?;
        }
        write!(f, "{}", self.letter)
    }
}

/// A piece of a parsed format string
#[derive(Debug, Clone, PartialEq)]
pub enum FormatPiece {
    Literal(String),
    Directive(Directive),
}

/// Why a format string was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// `%` followed by a conversion the subset does not implement
    UnsupportedConversion(String),
    /// `%` at the very end of the string
    Dangling,
    /// Width or precision above [`MAX_FIELD_WIDTH`]
    FieldTooWide(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnsupportedConversion(written) => {
                write!(f, "unsupported conversion '{}' (only %d, %i, %f and %% are supported)", written)
            }
            FormatError::Dangling => write!(f, "format string ends with a lone '%'"),
            FormatError::FieldTooWide(written) => write!(
                f,
                "width or precision in '{}' exceeds {}",
                written, MAX_FIELD_WIDTH
            ),
        }
    }
}

/// Split a format string into literal text and directives.
pub fn parse(format: &str) -> Result<Vec<FormatPiece>, FormatError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            literal.push(ch);
            continue;
        }

        if chars.peek() == Some(&'%') {
            chars.next();
            literal.push('%');
            continue;
        }

        let mut written = String::from("%");
        let mut directive = Directive::new(Conversion::Int);

        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => directive.left_align = true,
                '+' => directive.plus_sign = true,
                ' ' => directive.space_sign = true,
                '0' => directive.zero_pad = true,
                _ => break,
            }
            written.push(flag);
            chars.next();
        }

        directive.width = take_number(&mut chars, &mut written)?;
        if chars.peek() == Some(&'.') {
            written.push('.');
            chars.next();
            directive.precision = Some(take_number(&mut chars, &mut written)?.unwrap_or(0));
        }

        if chars.peek() == Some(&'l') {
            written.push('l');
            chars.next();
            directive.long = true;
        }

        let conversion = match chars.next() {
            Some(letter @ ('d' | 'i')) => {
                directive.letter = letter;
                Conversion::Int
            }
            Some('f') => {
                directive.letter = 'f';
                Conversion::Float
            }
            Some(other) => {
                written.push(other);
                return Err(FormatError::UnsupportedConversion(written));
            }
            None if written == "%" => return Err(FormatError::Dangling),
            None => return Err(FormatError::UnsupportedConversion(written)),
        };
        directive.conversion = conversion;

        if !literal.is_empty() {
            pieces.push(FormatPiece::Literal(std::mem::take(&mut literal)));
        }
        pieces.push(FormatPiece::Directive(directive));
    }

    if !literal.is_empty() {
        pieces.push(FormatPiece::Literal(literal));
    }

    Ok(pieces)
}

/// Read a run of digits; `None` when there are none.
fn take_number(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    written: &mut String,
) -> Result<Option<usize>, FormatError> {
    let mut value: Option<usize> = None;
    let mut too_wide = false;
    while let Some(&d) = chars.peek() {
        let Some(digit) = d.to_digit(10) else {
            break;
        };
        written.push(d);
        chars.next();

        let next = value.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize);
        too_wide |= next > MAX_FIELD_WIDTH;
        value = Some(next.min(MAX_FIELD_WIDTH + 1));
    }

    if too_wide {
        // Keep the rest of the directive in the message
        while let Some(&c) = chars.peek() {
            written.push(c);
            chars.next();
            if c.is_ascii_alphabetic() && c != 'l' {
                break;
            }
        }
        return Err(FormatError::FieldTooWide(std::mem::take(written)));
    }
    Ok(value)
}

/// Directives in order, skipping literal text.
pub fn directives(pieces: &[FormatPiece]) -> impl Iterator<Item = &Directive> {
    pieces.iter().filter_map(|piece| match piece {
        FormatPiece::Directive(d) => Some(d),
        FormatPiece::Literal(_) => None,
    })
}

/// Render parsed pieces with their arguments.
///
/// Argument count and types are validated by the semantic checker; a
/// `%d` given a float prints it truncated, a `%f` given an int prints it
/// widened. Directives without an argument render nothing.
pub fn render(pieces: &[FormatPiece], args: &[Value]) -> String {
    let mut output = String::new();
    let mut args = args.iter();

    for piece in pieces {
        match piece {
            FormatPiece::Literal(text) => output.push_str(text),
            FormatPiece::Directive(directive) => {
                if let Some(value) = args.next() {
                    output.push_str(&render_directive(directive, *value));
                }
            }
        }
    }

    output
}

/// Render one directive the way glibc does.
pub fn render_directive(directive: &Directive, value: Value) -> String {
    let (negative, body, finite) = match directive.conversion {
        Conversion::Int => {
            let n = value.as_int();
            let mut digits = n.unsigned_abs().to_string();
            if let Some(precision) = directive.precision {
                if precision == 0 && n == 0 {
                    digits.clear();
                } else if digits.len() < precision {
                    digits = format!("{}{}", "0".repeat(precision - digits.len()), digits);
                }
            }
            (n < 0, digits, true)
        }
        Conversion::Float => {
            let x = value.as_float();
            let precision = directive.precision.unwrap_or(6);
            let body = if x.is_nan() {
                "nan".to_string()
            } else if x.is_infinite() {
                "inf".to_string()
            } else {
                format!("{:.*}", precision, x.abs())
            };
            (x.is_sign_negative(), body, x.is_finite())
        }
    };

    let sign = if negative {
        "-"
    } else if directive.plus_sign {
        "+"
    } else if directive.space_sign {
        " "
    } else {
        ""
    };

    let width = directive.width.unwrap_or(0);
    let len = sign.len() + body.len();
    if len >= width {
        return format!("{}{}", sign, body);
    }

    let padding = width - len;
    // C ignores '0' with '-', for non-finite floats, and for %d with a precision
    let zero_pad = directive.zero_pad
        && !directive.left_align
        && finite
        && !(directive.conversion == Conversion::Int && directive.precision.is_some());

    if directive.left_align {
        format!("{}{}{}", sign, body, " ".repeat(padding))
    } else if zero_pad {
        format!("{}{}{}", sign, "0".repeat(padding), body)
    } else {
        format!("{}{}{}", " ".repeat(padding), sign, body)
    }
}
