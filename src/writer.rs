//! Emission of a value tree as document text.
//!
//! The writer walks the schema depth-first. For every command it writes the
//! preserved leading comments, the tag line, the scalar field lines and then
//! the children in registration order. Absent children (null or empty
//! sequences) produce no output. Commands that reference a sub-file write
//! only their own lines: their contents belong in the referenced document.

use crate::codec::{EncodeContext, LineSink};
use crate::field::encode_kind;
use crate::options::{EncodeOptions, LineEnding};
use crate::schema::{NodeId, Role, SchemaTree};
use crate::{IniMap, Result, Value};
use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};

/// Line sink collecting text in memory.
pub(crate) struct TextSink {
    text: String,
    ending: LineEnding,
}

impl TextSink {
    pub(crate) fn new(ending: LineEnding) -> Self {
        TextSink {
            text: String::with_capacity(4096),
            ending,
        }
    }

    pub(crate) fn into_string(self) -> String {
        self.text
    }
}

impl LineSink for TextSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.text.push_str(line);
        self.text.push_str(self.ending.as_str());
        Ok(())
    }

    fn write_raw(&mut self, text: &str) -> Result<()> {
        self.text.push_str(text);
        Ok(())
    }
}

/// Writes `value`, the serialized root command, as document text.
pub(crate) fn encode_document(
    tree: &SchemaTree,
    value: &Value,
    options: &EncodeOptions,
) -> Result<String> {
    let mut sink = TextSink::new(options.line_ending);
    let mut state = IniMap::new();
    let mut emitter = Emitter {
        tree,
        out: &mut sink,
    };
    emitter.emit(tree.root(), value, None, &mut state)?;
    Ok(sink.into_string())
}

struct Emitter<'a> {
    tree: &'a SchemaTree,
    out: &'a mut TextSink,
}

impl Emitter<'_> {
    fn emit(
        &mut self,
        storage: NodeId,
        value: &Value,
        parent: Option<&IniMap>,
        state: &mut IniMap,
    ) -> Result<()> {
        let Value::Object(object) = value else {
            return Ok(());
        };
        let tree = self.tree;
        let (id, object) = match tree.resolve_variant(storage, object) {
            Some((id, Value::Object(inner))) => (id, inner),
            Some((id, _)) => {
                log::debug!("variant of {} carries no fields", tree.node(id).type_name);
                return Ok(());
            }
            None => {
                let node = tree.node(storage);
                if node.tag.is_none() && node.is_polymorphic() {
                    log::debug!("no registered variant of {} matches, writing fields only", node.type_name);
                }
                (storage, object)
            }
        };
        let node = tree.node(id);
        let is_root = node.parent.is_none();

        if let Some(text) = node.comments.and_then(|field| object.get(field)).and_then(Value::as_str) {
            self.out.write_raw(text)?;
        }
        if node.skips_encode() {
            return Ok(());
        }

        if !is_root {
            let tag_line = node.tag_line();
            match &node.codec {
                Some(codec) => {
                    let mut cx = EncodeContext::new(
                        &mut *self.out,
                        tag_line.as_deref().unwrap_or_default(),
                        parent,
                        state,
                    );
                    codec.encode(&mut cx, object)?;
                }
                None => {
                    if let Some(line) = &tag_line {
                        self.out.write_line(line)?;
                    }
                    for field in &node.scalars {
                        let member = object.get(field.name).unwrap_or(&Value::Null);
                        encode_kind(&mut *self.out, &field.kind, member)?;
                    }
                }
            }
        }

        if is_root || node.file_reference.is_none() {
            let mut child_state = IniMap::new();
            for &child in &node.children {
                let child_node = tree.node(child);
                if child_node.role != Role::Storage {
                    continue;
                }
                let Some(member) = child_node.field.and_then(|field| object.get(field)) else {
                    continue;
                };
                if member.is_absent() {
                    continue;
                }
                match member {
                    Value::Array(items) if child_node.is_array => {
                        for item in items {
                            self.emit(child, item, Some(object), &mut child_state)?;
                        }
                    }
                    single => self.emit(child, single, Some(object), &mut child_state)?,
                }
            }
        }

        if let Some(text) = node
            .trailing_comments
            .and_then(|field| object.get(field))
            .and_then(Value::as_str)
        {
            self.out.write_raw(text)?;
        }
        Ok(())
    }
}

/// Encodes document text into bytes, with an optional byte order mark.
///
/// A BOM is only written for UTF-8 and UTF-16. Characters the target
/// encoding cannot represent are replaced with numeric character references.
pub(crate) fn encode_text(text: &str, options: &EncodeOptions) -> Vec<u8> {
    let encoding = options.encoding;
    let mut bytes = Vec::with_capacity(text.len() + 3);

    if encoding == UTF_16LE || encoding == UTF_16BE {
        let big_endian = encoding == UTF_16BE;
        if options.write_bom {
            bytes.extend_from_slice(if big_endian { &[0xFE, 0xFF] } else { &[0xFF, 0xFE] });
        }
        for unit in text.encode_utf16() {
            let pair = if big_endian {
                unit.to_be_bytes()
            } else {
                unit.to_le_bytes()
            };
            bytes.extend_from_slice(&pair);
        }
        return bytes;
    }

    if options.write_bom && encoding == UTF_8 {
        bytes.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    }
    let (encoded, _, unmappable) = encoding.encode(text);
    if unmappable {
        log::warn!("some characters are not representable in {}", encoding.name());
    }
    bytes.extend_from_slice(&encoded);
    bytes
}
