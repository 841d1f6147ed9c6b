//! Theme value types.
//!
//! A [`ThemeValue`] is the typed payload of a theme modification. Each schema
//! property declares the [`ValueKind`] it accepts.
//!
//! # Example
//!
//! ```
//! use horizon_topbar_style::types::{Color, ThemeValue, ValueKind};
//!
//! let value = ThemeValue::from(Color::from_hex("#FF8800").unwrap());
//! assert_eq!(value.kind(), ValueKind::Color);
//!
//! let size: ThemeValue = 16.0.into();
//! assert_eq!(size.as_number(), Some(16.0));
//! ```

use std::fmt;

/// An RGBA color, non-premultiplied, components in the 0.0-1.0 range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a color from RGBA components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB components.
    #[inline]
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from 8-bit RGB components (0-255 range).
    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Create a color from a hex string (e.g., "#FF0000" or "#FF0000FF").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let len = hex.len();

        if (len != 6 && len != 8) || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        let a = if len == 8 {
            u8::from_str_radix(&hex[6..8], 16).ok()?
        } else {
            255
        };

        Some(Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ))
    }

    /// Convert to 8-bit RGBA components.
    pub fn to_rgba8(self) -> [u8; 4] {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }

    // Common colors
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::from_rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::from_rgb(1.0, 0.0, 0.0);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "#{r:02X}{g:02X}{b:02X}{a:02X}")
    }
}

/// A reference to an image asset.
///
/// Accepted forms are a bare numeric asset id (`"6031075938"`), a URI with a
/// scheme (`"rbxassetid://6031075938"`, `"file://icons/bell.png"`), or the
/// empty string meaning "no image". Anything else is rejected when the value
/// is applied to a theme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap a reference string. Validation happens when the value is applied.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// A numeric asset id reference.
    pub fn asset(id: u64) -> Self {
        Self(format!("rbxassetid://{id}"))
    }

    /// The "no image" reference.
    pub fn none() -> Self {
        Self(String::new())
    }

    /// The raw reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the "no image" reference.
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the reference against the accepted forms.
    pub fn is_valid(&self) -> bool {
        let reference = self.0.as_str();
        if reference.is_empty() || reference.bytes().all(|b| b.is_ascii_digit()) {
            return true;
        }
        match reference.split_once("://") {
            Some((scheme, path)) => {
                !scheme.is_empty()
                    && scheme.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-')
                    && !path.is_empty()
                    && !path.chars().any(char::is_whitespace)
            }
            None => false,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to a font family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontRef(String);

impl FontRef {
    /// Wrap a family name. Validation happens when the value is applied.
    pub fn new(family: impl Into<String>) -> Self {
        Self(family.into())
    }

    /// The family name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A family name must be non-empty, not padded, and free of control characters.
    pub fn is_valid(&self) -> bool {
        let family = self.0.as_str();
        !family.is_empty() && family.trim() == family && !family.chars().any(char::is_control)
    }
}

impl fmt::Display for FontRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The type of a theme value, used by the schema to validate modifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Number,
    Text,
    Color,
    Image,
    Font,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Text => "text",
            Self::Color => "color",
            Self::Image => "image",
            Self::Font => "font",
        };
        f.write_str(name)
    }
}

/// A typed theme value.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeValue {
    Bool(bool),
    Number(f32),
    Text(String),
    Color(Color),
    Image(ImageRef),
    Font(FontRef),
}

impl ThemeValue {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
            Self::Color(_) => ValueKind::Color,
            Self::Image(_) => ValueKind::Image,
            Self::Font(_) => ValueKind::Font,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageRef> {
        match self {
            Self::Image(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_font(&self) -> Option<&FontRef> {
        match self {
            Self::Font(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ThemeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Color(v) => write!(f, "{v}"),
            Self::Image(v) => write!(f, "image({v})"),
            Self::Font(v) => write!(f, "font({v})"),
        }
    }
}

impl From<bool> for ThemeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for ThemeValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for ThemeValue {
    fn from(value: f64) -> Self {
        Self::Number(value as f32)
    }
}

impl From<i32> for ThemeValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f32)
    }
}

impl From<&str> for ThemeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ThemeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Color> for ThemeValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<ImageRef> for ThemeValue {
    fn from(value: ImageRef) -> Self {
        Self::Image(value)
    }
}

impl From<FontRef> for ThemeValue {
    fn from(value: FontRef) -> Self {
        Self::Font(value)
    }
}
