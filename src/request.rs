//! Wire-level draw requests and their validation.
//!
//! Requests arrive as a JSON array of objects with `x`, `y`, `width`,
//! `height`, `fill` and `outline`. Symbols are single characters; the literal
//! `"none"` (or an empty string) means the symbol is not painted.

use serde::{Deserialize, Serialize};

use crate::canvas::{RectSpec, Symbol};
use crate::{Error, Result};

/// Symbol text that stands for "no symbol" on the wire.
pub const NONE_SYMBOL: &str = "none";

/// One rectangle as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawRequest {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub outline: String,
    pub fill: String,
}

/// An ordered batch of requests; order is paint order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawRequests(pub Vec<DrawRequest>);

/// Response returned after a drawing has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResponse {
    pub id: String,
    pub canvas: String,
}

fn is_unset(symbol: &str) -> bool {
    symbol.is_empty() || symbol == NONE_SYMBOL
}

/// Check a fill or outline symbol.
///
/// # Errors
///
/// [`Error::InvalidSymbol`] for anything but a single printable character
/// (ASCII only when `ascii_only` is set).
pub fn validate_symbol(symbol: &str, ascii_only: bool) -> Result<()> {
    if is_unset(symbol) {
        return Ok(());
    }
    let mut chars = symbol.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(Error::InvalidSymbol(format!("'{symbol}' must be a single character")));
    };
    if c.is_control() {
        return Err(Error::InvalidSymbol(format!("{:?} is not printable", c)));
    }
    if ascii_only && !c.is_ascii() {
        return Err(Error::InvalidSymbol(format!(
            "'{symbol}' is not a valid ASCII character"
        )));
    }
    Ok(())
}

fn to_symbol(symbol: &str) -> Option<Symbol> {
    if is_unset(symbol) {
        None
    } else {
        Symbol::new(symbol)
    }
}

impl DrawRequest {
    pub fn has_fill(&self) -> bool {
        !is_unset(&self.fill)
    }

    pub fn has_outline(&self) -> bool {
        !is_unset(&self.outline)
    }

    /// Validate a single request; the first problem found is returned.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSpec`] or [`Error::InvalidSymbol`].
    pub fn validate(&self, ascii_only: bool) -> Result<()> {
        if !self.has_fill() && !self.has_outline() {
            return Err(Error::InvalidSpec(
                "at least one value must be informed to fill or outline".to_string(),
            ));
        }
        validate_symbol(&self.fill, ascii_only)?;
        validate_symbol(&self.outline, ascii_only)?;
        if self.x < 0 || self.y < 0 {
            return Err(Error::InvalidSpec(
                "coordinates must be equal or greater than zero".to_string(),
            ));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidSpec(
                "width and height must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert into an engine spec. Negative numbers are clamped to zero, so
    /// an unvalidated request degrades into an empty rectangle.
    pub fn to_spec(&self) -> RectSpec {
        let clamp = |v: i64| usize::try_from(v).unwrap_or(0);
        RectSpec {
            x: clamp(self.x),
            y: clamp(self.y),
            width: clamp(self.width),
            height: clamp(self.height),
            fill: to_symbol(&self.fill),
            outline: to_symbol(&self.outline),
        }
    }
}

impl DrawRequests {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Errors
    ///
    /// [`Error::EmptyInput`] for an empty batch, otherwise the first request
    /// error.
    pub fn validate(&self, ascii_only: bool) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::EmptyInput);
        }
        self.0.iter().try_for_each(|r| r.validate(ascii_only))
    }

    pub fn to_specs(&self) -> Vec<RectSpec> {
        self.0.iter().map(DrawRequest::to_spec).collect()
    }

    /// Parse a JSON array of requests.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] when the body is not a valid request array.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

impl From<Vec<DrawRequest>> for DrawRequests {
    fn from(requests: Vec<DrawRequest>) -> Self {
        DrawRequests(requests)
    }
}
