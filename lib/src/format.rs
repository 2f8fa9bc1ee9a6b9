use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A printf-style float format: `%e`, `%E`, `%f` or `%g` with an optional
/// precision, e.g. `%.6e` or `%.2f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatFormat {
    style: Style,
    precision: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Exp,
    UpperExp,
    Fixed,
    General,
}

impl Default for FloatFormat {
    fn default() -> Self {
        FloatFormat {
            style: Style::Exp,
            precision: Some(6),
        }
    }
}

impl FloatFormat {
    pub fn parse(s: &str) -> Result<Self> {
        let bad = || Error::Format(s.to_string());
        let spec = s.strip_prefix('%').ok_or_else(bad)?;
        let conv = spec.chars().last().ok_or_else(bad)?;
        let body = &spec[..spec.len() - conv.len_utf8()];
        let style = match conv {
            'e' => Style::Exp,
            'E' => Style::UpperExp,
            'f' | 'F' => Style::Fixed,
            'g' | 'G' => Style::General,
            _ => return Err(bad()),
        };
        let precision = match body {
            "" => None,
            _ => {
                let digits = body.strip_prefix('.').ok_or_else(bad)?;
                if digits.is_empty() {
                    Some(0)
                } else {
                    Some(digits.parse().map_err(|_| bad())?)
                }
            }
        };
        Ok(FloatFormat { style, precision })
    }

    pub fn render(&self, v: f64) -> String {
        if !v.is_finite() {
            return v.to_string();
        }
        match self.style {
            Style::Exp => exp(v, self.precision.unwrap_or(6)),
            Style::UpperExp => exp(v, self.precision.unwrap_or(6)).to_uppercase(),
            Style::Fixed => format!("{:.*}", self.precision.unwrap_or(6), v),
            Style::General => general(v, self.precision),
        }
    }
}

impl FromStr for FloatFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FloatFormat::parse(s)
    }
}

impl fmt::Display for FloatFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let conv = match self.style {
            Style::Exp => 'e',
            Style::UpperExp => 'E',
            Style::Fixed => 'f',
            Style::General => 'g',
        };
        match self.precision {
            Some(p) => write!(f, "%.{}{}", p, conv),
            None => write!(f, "%{}", conv),
        }
    }
}

// Rust prints exponents as e-1; printf pads to a signed two-digit e-01.
fn exp(v: f64, precision: usize) -> String {
    let s = format!("{:.*e}", precision, v);
    match split_exponent(&s) {
        Some((mantissa, e)) => with_exponent(mantissa, e),
        None => s,
    }
}

fn split_exponent(s: &str) -> Option<(&str, i32)> {
    let (mantissa, e) = s.split_once('e')?;
    Some((mantissa, e.parse().ok()?))
}

fn with_exponent(mantissa: &str, e: i32) -> String {
    let sign = if e < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, e.unsigned_abs())
}

// %g: the style is picked from the exponent after rounding to the
// significant digits, so 999.7 at three digits is 1e+03. Without a precision
// the shortest representation is used and exponents from 6 up switch to
// scientific notation.
fn general(v: f64, precision: Option<usize>) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let (sci, limit) = match precision {
        Some(p) => (format!("{:.*e}", p.max(1) - 1, v), p.max(1) as i32),
        None => (format!("{:e}", v), 6),
    };
    let Some((mantissa, e)) = split_exponent(&sci) else {
        return sci;
    };
    if e < -4 || e >= limit {
        return with_exponent(trim_zeros(mantissa), e);
    }
    match precision {
        Some(_) => {
            let decimals = (limit - 1 - e).max(0) as usize;
            trim_zeros(&format!("{:.*}", decimals, v)).to_string()
        }
        None => v.to_string(),
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
