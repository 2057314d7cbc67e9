//! # serde_omsi
//!
//! A schema-driven Serde codec for the line-oriented configuration formats of
//! the OMSI bus simulator: model files, path files, passenger cabin files and
//! vehicle files.
//!
//! ## The format
//!
//! A document is a flat sequence of lines. A command starts with a tag line,
//! usually `[tag]`, followed by one line per scalar field. There are no block
//! delimiters: which commands nest inside which is known only from the
//! schema. Everything that is not a recognized tag or a field line is a
//! comment.
//!
//! ```text
//! [LOD]
//! 0.5
//!
//! This line is a comment.
//! [mesh]
//! body.o3d
//!
//! [matl]
//! body.bmp
//! 0
//! ```
//!
//! ## Key Features
//!
//! - **Implicit hierarchy**: nesting is reconstructed from the schema, see [Hierarchy](#hierarchy)
//! - **Serde compatible**: command types are plain `#[derive(Serialize, Deserialize)]` structs
//! - **Comment fidelity**: unmatched lines survive a round trip byte for byte
//! - **Format evolution**: older commands decode into their successors through derived variants
//! - **Sub-files**: referenced documents can be decoded in place, with cycle and depth guards
//! - **Encodings**: UTF-16 and UTF-32 byte order marks are detected; any `encoding_rs` encoding may be configured
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_omsi::{from_str, to_string_with_options, Command, CommandBuilder, EncodeOptions, FieldKind, LineEnding};
//!
//! #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
//! struct Mesh {
//!     path: String,
//!     comments: Option<String>,
//! }
//!
//! impl Command for Mesh {
//!     fn describe(cmd: &mut CommandBuilder) {
//!         cmd.tag("mesh").field("path", FieldKind::Str).comments("comments");
//!     }
//! }
//!
//! #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
//! struct Model {
//!     meshes: Vec<Mesh>,
//! }
//!
//! impl Command for Model {
//!     fn describe(cmd: &mut CommandBuilder) {
//!         cmd.children::<Mesh>("meshes");
//!     }
//! }
//!
//! let text = "[mesh]\nbody.o3d\n\nwheels:\n[mesh]\nwheel.o3d\n";
//! let model: Model = from_str(text).unwrap();
//! assert_eq!(model.meshes[1].path, "wheel.o3d");
//! assert_eq!(model.meshes[1].comments.as_deref(), Some("\nwheels:\n"));
//!
//! let options = EncodeOptions::new().with_line_ending(LineEnding::Lf);
//! assert_eq!(to_string_with_options(&model, &options).unwrap(), text);
//! ```
//!
//! ## Hierarchy
//!
//! Each tag line is looked up among the children of the innermost open
//! command, then among the children of every enclosing command in turn. A
//! match found `n` levels up closes `n` commands first. Commands registered
//! with [`CommandBuilder::children`] accumulate into a sequence in file
//! order.
//!
//! ## Schemas
//!
//! Ready-made schemas for the simulator's own files live in [`formats`].
//!
//! ## Dynamic Values with the ini! Macro
//!
//! ```rust
//! use serde_omsi::{ini, Value};
//!
//! let mesh = ini!({ "path": "body.o3d", "matls": [] });
//! assert_eq!(mesh.get("path").and_then(Value::as_str), Some("body.o3d"));
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Schema trees are shared between threads through a synchronized cache
//! - Proper error propagation with `Result` types

pub mod codec;
pub mod de;
pub mod error;
mod field;
pub mod formats;
pub mod macros;
pub mod map;
pub mod options;
mod reader;
mod resolver;
pub mod schema;
pub mod ser;
pub mod value;
mod writer;

pub use de::ValueDeserializer;
pub use error::{Error, Result};
pub use field::{Aggregate, AggregateKind, FieldKind, ScalarField};
pub use map::IniMap;
pub use options::{DecodeOptions, EncodeOptions, LineEnding};
pub use reader::LineReader;
pub use resolver::{Diagnostics, SubFileFailure, DISABLE_SENTINEL, ENABLE_SENTINEL};
pub use schema::{
    schema_of, Command, CommandBuilder, NodeId, SchemaNode, SchemaTree, Skip, MAX_RECURSION_DEPTH,
};
pub use ser::ValueSerializer;
pub use value::{Number, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Serialize a command tree to document text with CRLF line endings.
///
/// # Examples
///
/// ```rust
/// use serde_omsi::formats::paths::{PathPoint, Paths};
/// use serde_omsi::formats::Vector3;
/// use serde_omsi::to_string;
///
/// let paths = Paths {
///     points: vec![PathPoint { position: Vector3::new(1.0, 0.0, 2.5), comments: None }],
///     ..Paths::default()
/// };
/// assert_eq!(to_string(&paths).unwrap(), "[pathpnt]\r\n1\r\n0\r\n2.5\r\n");
/// ```
///
/// # Errors
///
/// Returns an error if the schema of `T` is malformed or a field value does
/// not fit its declared kind.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T: Command>(value: &T) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::default())
}

/// Serialize a command tree to document text with custom options.
///
/// The encoding in `options` only applies to the byte-producing functions;
/// the returned string is always UTF-8.
///
/// # Errors
///
/// Returns an error if the schema of `T` is malformed or a field value does
/// not fit its declared kind.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T: Command>(value: &T, options: &EncodeOptions) -> Result<String> {
    let tree = schema_of::<T>()?;
    let value = to_value(value)?;
    writer::encode_document(&tree, &value, options)
}

/// Serialize a command tree to bytes in the configured encoding.
///
/// # Examples
///
/// ```rust
/// use serde_omsi::formats::paths::Paths;
/// use serde_omsi::{to_vec, EncodeOptions};
///
/// let options = EncodeOptions::new().with_encoding(encoding_rs::UTF_16LE).with_bom(true);
/// let bytes = to_vec(&Paths::default(), &options).unwrap();
/// assert_eq!(bytes, [0xFF, 0xFE]);
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T: Command>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>> {
    let text = to_string_with_options(value, options)?;
    Ok(writer::encode_text(&text, options))
}

/// Serialize a command tree to a writer with default options.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: Command,
{
    to_writer_with_options(writer, value, &EncodeOptions::default())
}

/// Serialize a command tree to a writer with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: &EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: Command,
{
    let bytes = to_vec(value, options)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_omsi::formats::Vector2;
/// use serde_omsi::to_value;
///
/// let value = to_value(&Vector2 { x: 1.0, y: 2.0 }).unwrap();
/// assert_eq!(value.get("y").and_then(|v| v.as_f64()), Some(2.0));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    ser::to_value(value)
}

/// Convert a [`Value`] into any `T: DeserializeOwned`.
///
/// # Errors
///
/// Returns an error if the value does not have the shape of `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    de::from_value(value)
}

/// Deserialize a command tree from document text.
///
/// # Examples
///
/// ```rust
/// use serde_omsi::formats::paths::Paths;
/// use serde_omsi::from_str;
///
/// let paths: Paths = from_str("[pathpnt]\n0\n1\n2\n").unwrap();
/// assert_eq!(paths.points[0].position.z, 2.0);
/// ```
///
/// # Errors
///
/// Returns an error if the stream ends inside a command, a field line does
/// not parse as its declared kind, or the schema of `T` is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T: Command>(text: &str) -> Result<T> {
    from_reader(text.as_bytes())
}

/// Deserialize a command tree from document bytes.
///
/// The encoding is taken from a byte order mark, else UTF-8 is assumed.
///
/// # Errors
///
/// See [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T: Command>(bytes: &[u8]) -> Result<T> {
    from_reader(bytes)
}

/// Deserialize a command tree from an I/O stream with default options.
///
/// # Errors
///
/// Returns an error if reading fails or the document does not decode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: Command,
{
    from_reader_with_options(reader, &DecodeOptions::default())
}

/// Deserialize a command tree from an I/O stream with custom options.
///
/// A stream has no location, so sub-file references are kept as written even
/// if `options.recursive` is set. Use [`from_path`] to expand them.
///
/// # Errors
///
/// Returns an error if reading fails or the document does not decode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R, T>(reader: R, options: &DecodeOptions) -> Result<T>
where
    R: io::Read,
    T: Command,
{
    let mut diagnostics = Diagnostics::new();
    decode_reader(reader, options, &mut diagnostics)
}

/// Deserialize a command tree from a file.
///
/// With `options.recursive`, sub-file references are resolved relative to
/// the directory of `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not decode. In strict
/// mode a failing sub-file is reported as [`Error::SubFile`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path<T, P>(path: P, options: &DecodeOptions) -> Result<T>
where
    T: Command,
    P: AsRef<Path>,
{
    let mut diagnostics = Diagnostics::new();
    decode_path(path, options, &mut diagnostics)
}

/// Deserialize a command tree from a stream, collecting diagnostics.
///
/// Unmatched tags are recorded in `diagnostics`; they never fail the decode.
///
/// # Errors
///
/// Returns an error if reading fails or the document does not decode. A
/// resolved value that does not fit its Rust field is reported as
/// [`Error::Conversion`] naming the declaring type and field.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_reader<R, T>(reader: R, options: &DecodeOptions, diagnostics: &mut Diagnostics) -> Result<T>
where
    R: io::Read,
    T: Command,
{
    let tree = schema_of::<T>()?;
    let object = resolver::decode_document(&tree, reader, options, None, &[], diagnostics)?;
    de::from_document(Value::Object(object), field::short_type_name::<T>())
}

/// Deserialize a command tree from a file, collecting diagnostics.
///
/// In permissive mode, sub-files that fail to decode are recorded in
/// `diagnostics` and their commands keep the locally parsed fields.
///
/// # Examples
///
/// ```rust,no_run
/// use serde_omsi::formats::vehicle::Vehicle;
/// use serde_omsi::{decode_path, DecodeOptions, Diagnostics};
///
/// let options = DecodeOptions::new()
///     .with_encoding(encoding_rs::WINDOWS_1252)
///     .with_recursive(true)
///     .with_permissive(true);
/// let mut diagnostics = Diagnostics::new();
/// let bus: Vehicle = decode_path("Vehicles/MAN_NL202/MAN_NL202.bus", &options, &mut diagnostics)?;
/// for failure in diagnostics.sub_file_failures() {
///     eprintln!("{}: {}", failure.path.display(), failure.message);
/// }
/// # Ok::<(), serde_omsi::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not decode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_path<T, P>(path: P, options: &DecodeOptions, diagnostics: &mut Diagnostics) -> Result<T>
where
    T: Command,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tree = schema_of::<T>()?;
    let file = File::open(path)?;
    let chain: Vec<PathBuf> = vec![path.canonicalize()?];
    log::debug!("decoding {}", path.display());
    let object = resolver::decode_document(&tree, file, options, Some(path), &chain, diagnostics)?;
    de::from_document(Value::Object(object), field::short_type_name::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    struct Light {
        colour: Vec<f32>,
        comments: Option<String>,
    }

    impl Command for Light {
        fn describe(cmd: &mut CommandBuilder) {
            cmd.tag("light")
                .field("colour", FieldKind::list(FieldKind::F32))
                .comments("comments");
        }
    }

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    struct Scene {
        lights: Vec<Light>,
        post_comments: Option<String>,
    }

    impl Command for Scene {
        fn describe(cmd: &mut CommandBuilder) {
            cmd.children::<Light>("lights").trailing_comments("post_comments");
        }
    }

    fn scene() -> Scene {
        Scene {
            lights: vec![
                Light {
                    colour: vec![1.0, 0.5],
                    comments: Some("front\r\n".to_string()),
                },
                Light::default(),
            ],
            post_comments: Some("end".to_string()),
        }
    }

    #[test]
    fn test_to_string_uses_crlf() {
        let text = to_string(&scene()).unwrap();
        assert_eq!(text, "front\r\n[light]\r\n2\r\n1\r\n0.5\r\n[light]\r\n0\r\nend");
    }

    #[test]
    fn test_string_round_trip() {
        let text = to_string(&scene()).unwrap();
        let back: Scene = from_str(&text).unwrap();
        assert_eq!(back, scene());
    }

    #[test]
    fn test_writer_and_slice() {
        let options = EncodeOptions::new()
            .with_encoding(encoding_rs::UTF_16BE)
            .with_bom(true);
        let mut buffer = Vec::new();
        to_writer_with_options(&mut buffer, &scene(), &options).unwrap();
        assert_eq!(&buffer[..2], &[0xFE, 0xFF]);

        let back: Scene = from_slice(&buffer).unwrap();
        assert_eq!(back, scene());
    }

    #[test]
    fn test_value_conversion() {
        let value = to_value(&scene()).unwrap();
        let lights = value.get("lights").and_then(Value::as_array).map(Vec::len);
        assert_eq!(lights, Some(2));
        let back: Scene = from_value(value).unwrap();
        assert_eq!(back, scene());
    }

    #[test]
    fn test_decode_reader_collects_unmatched() {
        let mut diagnostics = Diagnostics::new();
        let text = "[light]\n0\n[spot]\n";
        let scene: Scene = decode_reader(text.as_bytes(), &DecodeOptions::new(), &mut diagnostics).unwrap();
        assert_eq!(scene.post_comments.as_deref(), Some("[spot]\n"));
        assert_eq!(diagnostics.unmatched().collect::<Vec<_>>(), [("light", "spot")]);
    }
}
