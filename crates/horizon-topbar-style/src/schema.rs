//! Static schema: which properties each element supports, their value kinds
//! and built-in defaults.
//!
//! The built-in default is the last step of theme resolution, so every
//! supported (element, property) pair has one.

use horizon_topbar_core::IconState;

use crate::element::{ThemeElement, ThemeProperty};
use crate::error::{Error, Result};
use crate::modification::Modification;
use crate::table::ThemeTable;
use crate::types::{Color, FontRef, ImageRef, ThemeValue, ValueKind};

/// A `const`-friendly default value.
#[derive(Debug, Clone, Copy)]
enum BuiltinValue {
    Bool(bool),
    Number(f32),
    Text(&'static str),
    Color(Color),
    Image(&'static str),
    Font(&'static str),
}

impl BuiltinValue {
    fn to_value(self) -> ThemeValue {
        match self {
            Self::Bool(v) => ThemeValue::Bool(v),
            Self::Number(v) => ThemeValue::Number(v),
            Self::Text(v) => ThemeValue::Text(v.to_string()),
            Self::Color(v) => ThemeValue::Color(v),
            Self::Image(v) => ThemeValue::Image(ImageRef::new(v)),
            Self::Font(v) => ThemeValue::Font(FontRef::new(v)),
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
            Self::Color(_) => ValueKind::Color,
            Self::Image(_) => ValueKind::Image,
            Self::Font(_) => ValueKind::Font,
        }
    }
}

const DEFAULT_FONT: &str = "Source Sans Pro";

use ThemeElement as E;
use ThemeProperty as P;

/// Every supported (element, property) pair with its built-in default.
const SCHEMA: &[(ThemeElement, ThemeProperty, BuiltinValue)] = &[
    // Widget
    (E::Widget, P::Visible, BuiltinValue::Bool(true)),
    (E::Widget, P::MinimumWidth, BuiltinValue::Number(44.0)),
    (E::Widget, P::MinimumHeight, BuiltinValue::Number(44.0)),
    (E::Widget, P::ZIndex, BuiltinValue::Number(20.0)),
    // IconButton
    (E::IconButton, P::Visible, BuiltinValue::Bool(true)),
    (E::IconButton, P::BackgroundColor, BuiltinValue::Color(Color::from_rgb8(0, 0, 0))),
    (E::IconButton, P::BackgroundTransparency, BuiltinValue::Number(0.3)),
    // IconImage
    (E::IconImage, P::Visible, BuiltinValue::Bool(true)),
    (E::IconImage, P::Image, BuiltinValue::Image("")),
    (E::IconImage, P::ImageColor, BuiltinValue::Color(Color::WHITE)),
    (E::IconImage, P::ImageTransparency, BuiltinValue::Number(0.0)),
    // IconLabel
    (E::IconLabel, P::Visible, BuiltinValue::Bool(true)),
    (E::IconLabel, P::Text, BuiltinValue::Text("")),
    (E::IconLabel, P::TextColor, BuiltinValue::Color(Color::WHITE)),
    (E::IconLabel, P::TextSize, BuiltinValue::Number(16.0)),
    (E::IconLabel, P::Font, BuiltinValue::Font(DEFAULT_FONT)),
    // IconCorners
    (E::IconCorners, P::CornerRadius, BuiltinValue::Number(0.25)),
    // IconOverlay
    (E::IconOverlay, P::Visible, BuiltinValue::Bool(false)),
    (E::IconOverlay, P::BackgroundColor, BuiltinValue::Color(Color::WHITE)),
    (E::IconOverlay, P::BackgroundTransparency, BuiltinValue::Number(0.925)),
    // IconSpot
    (E::IconSpot, P::BackgroundColor, BuiltinValue::Color(Color::from_rgb8(225, 225, 225))),
    (E::IconSpot, P::BackgroundTransparency, BuiltinValue::Number(0.9)),
    // Notice
    (E::Notice, P::Visible, BuiltinValue::Bool(true)),
    (E::Notice, P::BackgroundColor, BuiltinValue::Color(Color::from_rgb8(255, 50, 50))),
    (E::Notice, P::ImageColor, BuiltinValue::Color(Color::from_rgb8(255, 50, 50))),
    // NoticeLabel
    (E::NoticeLabel, P::TextColor, BuiltinValue::Color(Color::WHITE)),
    (E::NoticeLabel, P::TextSize, BuiltinValue::Number(12.0)),
    (E::NoticeLabel, P::Font, BuiltinValue::Font(DEFAULT_FONT)),
    // Dropdown
    (E::Dropdown, P::MaxIcons, BuiltinValue::Number(4.0)),
    (E::Dropdown, P::Padding, BuiltinValue::Number(3.0)),
    (E::Dropdown, P::BackgroundColor, BuiltinValue::Color(Color::from_rgb8(0, 0, 0))),
    (E::Dropdown, P::BackgroundTransparency, BuiltinValue::Number(0.3)),
    // Menu
    (E::Menu, P::MaxIcons, BuiltinValue::Number(4.0)),
    (E::Menu, P::Padding, BuiltinValue::Number(3.0)),
    // Caption
    (E::Caption, P::Visible, BuiltinValue::Bool(true)),
    (E::Caption, P::Text, BuiltinValue::Text("")),
    (E::Caption, P::TextColor, BuiltinValue::Color(Color::WHITE)),
    (E::Caption, P::Font, BuiltinValue::Font(DEFAULT_FONT)),
];

fn lookup(element: ThemeElement, property: ThemeProperty) -> Option<BuiltinValue> {
    SCHEMA
        .iter()
        .find(|(e, p, _)| *e == element && *p == property)
        .map(|(_, _, default)| *default)
}

/// Whether `element` supports `property`.
pub fn supports(element: ThemeElement, property: ThemeProperty) -> bool {
    lookup(element, property).is_some()
}

/// The value kind `element.property` accepts.
pub fn value_kind(element: ThemeElement, property: ThemeProperty) -> Option<ValueKind> {
    lookup(element, property).map(BuiltinValue::kind)
}

/// The built-in default for `element.property`.
pub fn builtin_default(element: ThemeElement, property: ThemeProperty) -> Option<ThemeValue> {
    lookup(element, property).map(BuiltinValue::to_value)
}

/// The properties `element` supports, in schema order.
pub fn properties(element: ThemeElement) -> impl Iterator<Item = ThemeProperty> {
    SCHEMA
        .iter()
        .filter(move |(e, _, _)| *e == element)
        .map(|(_, p, _)| *p)
}

/// Every supported (element, property) pair, in schema order.
pub fn entries() -> impl Iterator<Item = (ThemeElement, ThemeProperty)> {
    SCHEMA.iter().map(|(e, p, _)| (*e, *p))
}

/// Validate a single modification against the schema.
///
/// Checks the element supports the property, the value has the declared
/// kind, and image/font references are well formed.
pub fn validate(modification: &Modification) -> Result<()> {
    let Modification {
        element,
        property,
        value,
        ..
    } = modification;

    let expected = value_kind(*element, *property).ok_or(Error::UnsupportedProperty {
        element: *element,
        property: *property,
    })?;
    if value.kind() != expected {
        return Err(Error::TypeMismatch {
            element: *element,
            property: *property,
            expected,
            got: value.kind(),
        });
    }

    match value {
        ThemeValue::Image(image) if !image.is_valid() => {
            Err(Error::InvalidImage(image.as_str().to_string()))
        }
        ThemeValue::Font(font) if !font.is_valid() => {
            Err(Error::InvalidFont(font.as_str().to_string()))
        }
        _ => Ok(()),
    }
}

/// The process-wide base theme every context starts from.
///
/// On top of the built-in defaults it inverts the button while selected.
pub fn default_base_theme() -> ThemeTable {
    let mut table = ThemeTable::new();
    let selected = [
        Modification::new(E::IconButton, P::BackgroundColor, Color::WHITE),
        Modification::new(E::IconButton, P::BackgroundTransparency, 0.1),
        Modification::new(E::IconImage, P::ImageColor, Color::from_rgb8(57, 60, 65)),
        Modification::new(E::IconLabel, P::TextColor, Color::from_rgb8(57, 60, 65)),
    ];
    for modification in selected {
        table.insert(modification.in_state(IconState::Selected));
    }
    table
}
