//! The closed set of themable icon sub-elements and their properties.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant, )+];

            /// The canonical name used in modifications and logs.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            /// Parse a canonical name. Matching is exact (case-sensitive).
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == s)
                    .ok_or_else(|| Error::$error(s.to_string()))
            }
        }
    };
}

named_enum! {
    /// A named sub-element of an icon that theme modifications can target.
    ThemeElement, UnknownElement {
        /// The outer frame holding the whole icon.
        Widget,
        /// The clickable button area.
        IconButton,
        /// The icon's image.
        IconImage,
        /// The icon's text label.
        IconLabel,
        /// Corner rounding applied to the button.
        IconCorners,
        /// Highlight overlay drawn while pressed or hovered.
        IconOverlay,
        /// Background spot behind the image and label.
        IconSpot,
        /// The notice badge.
        Notice,
        /// The count text inside the notice badge.
        NoticeLabel,
        /// The vertical dropdown container.
        Dropdown,
        /// The horizontal menu strip.
        Menu,
        /// The hover caption.
        Caption,
    }
}

named_enum! {
    /// A property of a [`ThemeElement`].
    ThemeProperty, UnknownProperty {
        Visible,
        BackgroundColor,
        BackgroundTransparency,
        Image,
        ImageColor,
        ImageTransparency,
        Text,
        TextColor,
        TextSize,
        Font,
        CornerRadius,
        MinimumWidth,
        MinimumHeight,
        Padding,
        MaxIcons,
        ZIndex,
    }
}
