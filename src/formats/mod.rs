//! Schemas of the document families the codec is used for.
//!
//! - [`paths`]: path graphs (`*.cfg` path files)
//! - [`cabin`]: passenger cabin layouts
//! - [`model`]: model configuration files
//! - [`scenery`]: scenery objects and crossings (`*.sco`, `*.cti`) and the
//!   commands they share with vehicles
//! - [`vehicle`]: road vehicle definitions, which embed a scenery object and
//!   reference the other document families
//!
//! The types here are plain serde structs. Inline value types such as
//! vectors and colours implement [`Aggregate`] and occupy one line per member.

use crate::{Aggregate, FieldKind, ScalarField};
use serde::{Deserialize, Serialize};

/// Declares an integer-coded enumeration.
///
/// The type is a transparent newtype, so values without a named constant
/// decode and re-encode unchanged.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ty, default $default:ident {
            $($(#[$value_meta:meta])* $value:ident = $code:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub $repr);

        impl $name {
            $($(#[$value_meta])* pub const $value: $name = $name($code);)*

            /// Whether the value is one of the named constants.
            pub fn is_known(self) -> bool {
                [$($name::$value),*].contains(&self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }
    };
}

/// Declares a set of bit flags stored as one integer line.
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ty {
            $($(#[$flag_meta:meta])* $flag:ident = $bit:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub $repr);

        impl $name {
            $($(#[$flag_meta])* pub const $flag: $name = $name($bit);)*

            pub const fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

/// Declares a command that consists of its tag line only.
macro_rules! marker_command {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub comments: Option<String>,
        }

        impl $crate::Command for $name {
            fn describe(cmd: &mut $crate::CommandBuilder) {
                cmd.tag($tag).comments("comments");
            }
        }
    };
}

/// Declares a command whose fields follow the tag line in declaration order.
macro_rules! simple_command {
    (
        $(#[$meta:meta])*
        $name:ident, $tag:literal {
            $($(#[$field_meta:meta])* $field:ident: $ty:ty = $kind:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            $($(#[$field_meta])* pub $field: $ty,)*
            pub comments: Option<String>,
        }

        impl $crate::Command for $name {
            fn describe(cmd: &mut $crate::CommandBuilder) {
                cmd.tag($tag)
                    $(.field(stringify!($field), $kind))*
                    .comments("comments");
            }
        }
    };
}

pub mod cabin;
pub mod model;
pub mod paths;
pub mod scenery;
pub mod vehicle;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// An 8-bit colour written in red, green, blue order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RgbColour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// An 8-bit colour with alpha, written in blue, green, red, alpha order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BgraColour {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vector2 { x, y }
    }
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3 { x, y, z }
    }
}

impl RgbColour {
    /// Channels scaled to `0.0..=1.0`.
    pub fn to_unit(self) -> Vector3 {
        let scale = |c: u8| f32::from(c) / 255.0;
        Vector3::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

fn members(names: &[&'static str], kind: FieldKind) -> Vec<ScalarField> {
    names
        .iter()
        .map(|&name| ScalarField::new(name, kind.clone()))
        .collect()
}

impl Aggregate for Vector2 {
    fn fields() -> Vec<ScalarField> {
        members(&["x", "y"], FieldKind::F32)
    }
}

impl Aggregate for Vector3 {
    fn fields() -> Vec<ScalarField> {
        members(&["x", "y", "z"], FieldKind::F32)
    }
}

impl Aggregate for Vector4 {
    fn fields() -> Vec<ScalarField> {
        members(&["x", "y", "z", "w"], FieldKind::F32)
    }
}

impl Aggregate for RgbColour {
    fn fields() -> Vec<ScalarField> {
        members(&["r", "g", "b"], FieldKind::U8)
    }
}

impl Aggregate for BgraColour {
    fn fields() -> Vec<ScalarField> {
        members(&["b", "g", "r", "a"], FieldKind::U8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_line_counts() {
        assert_eq!(FieldKind::aggregate::<Vector2>().line_count(), Some(2));
        assert_eq!(FieldKind::aggregate::<Vector4>().line_count(), Some(4));
        assert_eq!(FieldKind::aggregate::<BgraColour>().line_count(), Some(4));
    }

    #[test]
    fn test_bgra_member_order() {
        let names: Vec<_> = BgraColour::fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["b", "g", "r", "a"]);
    }

    #[test]
    fn test_colour_to_unit() {
        let yellow = RgbColour { r: 255, g: 255, b: 0 }.to_unit();
        assert_eq!(yellow, Vector3::new(1.0, 1.0, 0.0));
    }
}
