//! Line plumbing and hand-written per-command codecs.
//!
//! Most commands are fully described by their scalar field list. A few are
//! not: free text blocks terminated by a sentinel line, or directives whose
//! value silently applies to every following sibling. Such commands register
//! a [`CommandCodec`], which replaces the scalar field loop for that command
//! and gets direct access to the line stream and to the parent command.
//!
//! ```rust
//! use serde_omsi::codec::{CommandCodec, DecodeContext, EncodeContext};
//! use serde_omsi::{FieldKind, IniMap, Result, Value};
//!
//! /// Reads a value that is stored negated on disk.
//! struct Negated;
//!
//! impl CommandCodec for Negated {
//!     fn decode(&self, cx: &mut DecodeContext<'_>, command: &mut IniMap) -> Result<()> {
//!         let raw = cx.read_field("value", &FieldKind::I32)?;
//!         let value = raw.as_i64().unwrap_or_default();
//!         command.insert("value".into(), Value::from(-value));
//!         Ok(())
//!     }
//!
//!     fn encode(&self, cx: &mut EncodeContext<'_>, command: &IniMap) -> Result<()> {
//!         let value = command.get("value").and_then(Value::as_i64).unwrap_or_default();
//!         cx.write_line(cx.tag_line())?;
//!         cx.write_line(&(-value).to_string())
//!     }
//! }
//! ```

use crate::field::{decode_kind, encode_kind, FieldKind};
use crate::{IniMap, Result, Value};

/// Source of document lines with a running line counter.
pub trait LineSource {
    /// Returns the next line without its terminator, or `None` at the end.
    fn next_line(&mut self) -> Result<Option<String>>;

    /// Number of lines consumed so far.
    fn line_number(&self) -> usize;

    /// Longest accepted field line, in characters.
    fn line_limit(&self) -> Option<usize> {
        None
    }
}

/// Destination for emitted lines.
pub trait LineSink {
    /// Writes `line` followed by the configured line terminator.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Writes `text` unchanged. Used for preserved comments.
    fn write_raw(&mut self, text: &str) -> Result<()>;
}

/// Custom decoding and encoding of one command type.
///
/// Registered with [`CommandBuilder::codec`](crate::CommandBuilder::codec).
/// The codec only replaces the command's own lines: child commands, comments
/// and sub-file expansion are still handled by the resolver and the writer.
pub trait CommandCodec: Send + Sync {
    /// Fills `command`, which starts out as the command's default value.
    fn decode(&self, cx: &mut DecodeContext<'_>, command: &mut IniMap) -> Result<()>;

    /// Writes the tag line and every field line of `command`.
    fn encode(&self, cx: &mut EncodeContext<'_>, command: &IniMap) -> Result<()>;
}

/// What a [`CommandCodec`] sees while decoding.
pub struct DecodeContext<'a> {
    lines: &'a mut dyn LineSource,
    parent: &'a mut IniMap,
    tag: &'a str,
    owner: &'a str,
}

impl<'a> DecodeContext<'a> {
    pub(crate) fn new(
        lines: &'a mut dyn LineSource,
        parent: &'a mut IniMap,
        tag: &'a str,
        owner: &'a str,
    ) -> Self {
        DecodeContext {
            lines,
            parent,
            tag,
            owner,
        }
    }

    /// The tag that opened this command, without brackets.
    pub fn tag(&self) -> &str {
        self.tag
    }

    /// The enclosing command, as decoded so far.
    pub fn parent(&self) -> &IniMap {
        &*self.parent
    }

    pub fn parent_mut(&mut self) -> &mut IniMap {
        &mut *self.parent
    }

    pub fn line_number(&self) -> usize {
        self.lines.line_number()
    }

    /// Reads a raw line. `None` at the end of the stream.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.lines.next_line()
    }

    /// Reads one field of shape `kind`. Errors name `field` and this command.
    pub fn read_field(&mut self, field: &str, kind: &FieldKind) -> Result<Value> {
        decode_kind(&mut *self.lines, kind, field, self.owner, None)
    }
}

/// What a [`CommandCodec`] sees while encoding.
pub struct EncodeContext<'a> {
    out: &'a mut dyn LineSink,
    tag_line: &'a str,
    parent: Option<&'a IniMap>,
    state: &'a mut IniMap,
}

impl<'a> EncodeContext<'a> {
    pub(crate) fn new(
        out: &'a mut dyn LineSink,
        tag_line: &'a str,
        parent: Option<&'a IniMap>,
        state: &'a mut IniMap,
    ) -> Self {
        EncodeContext {
            out,
            tag_line,
            parent,
            state,
        }
    }

    /// The tag line to emit, brackets included for bracketed commands.
    pub fn tag_line(&self) -> &'a str {
        self.tag_line
    }

    pub fn parent(&self) -> Option<&'a IniMap> {
        self.parent
    }

    /// Scratch space shared by all commands emitted under the same parent.
    ///
    /// Starts out empty for every parent and is dropped once the parent's
    /// children have been written.
    pub fn state(&mut self) -> &mut IniMap {
        &mut *self.state
    }

    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.out.write_line(line)
    }

    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.out.write_raw(text)
    }

    /// Writes `value` as a field of shape `kind`.
    pub fn write_field(&mut self, kind: &FieldKind, value: &Value) -> Result<()> {
        encode_kind(&mut *self.out, kind, value)
    }
}
