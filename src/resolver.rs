//! Reconstruction of the implicit command hierarchy while decoding.
//!
//! Documents have no block delimiters. Nesting is recovered from the schema:
//! every tag line is looked up among the children of the innermost open
//! command first, then among the children of each enclosing command in turn.
//! A match `n` levels up closes `n` open commands before the new one opens.
//!
//! ```text
//! [LOD]          open LOD
//! [mesh]         open mesh under LOD
//! [mesh]         close mesh, open mesh under LOD
//! [LOD]          close mesh and LOD, open LOD under the root
//! ```
//!
//! Lines that match nothing, and everything between a `-<DISABLED>-` line and
//! the next `-<ENABLED>-` line, are kept as comments. Pending comments are
//! attached to the next command that has a comment field, or to the root's
//! trailing comment field at the end of the document.

use crate::codec::{DecodeContext, LineSource};
use crate::field::{decode_field, Outcome};
use crate::options::{DecodeOptions, LineEnding};
use crate::reader::LineReader;
use crate::schema::{NodeId, Role, SchemaNode, SchemaTree};
use crate::{Error, IniMap, Result, Value};
use indexmap::{IndexMap, IndexSet};
use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::{Path, PathBuf};

/// Lines starting with this suspend tag matching.
pub const DISABLE_SENTINEL: &str = "-<DISABLED>-";
/// Lines starting with this resume tag matching.
pub const ENABLE_SENTINEL: &str = "-<ENABLED>-";

/// A referenced document that could not be decoded in permissive mode.
#[derive(Clone, Debug, PartialEq)]
pub struct SubFileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Information collected while decoding, for tooling.
///
/// # Examples
///
/// ```rust
/// use serde_omsi::formats::paths::Paths;
/// use serde_omsi::{decode_reader, DecodeOptions, Diagnostics};
///
/// let mut diagnostics = Diagnostics::new();
/// let text = "[pathpnt]\n0\n0\n0\n[mystery]\n";
/// let _paths: Paths = decode_reader(text.as_bytes(), &DecodeOptions::new(), &mut diagnostics).unwrap();
///
/// let unmatched: Vec<_> = diagnostics.unmatched().collect();
/// assert_eq!(unmatched, vec![("pathpnt", "mystery")]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    unmatched: IndexSet<(String, String)>,
    sub_file_failures: Vec<SubFileFailure>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unmatched tags as `(innermost open command, tag)` pairs, first seen first.
    ///
    /// The innermost open command is reported as `ROOT` at the top level.
    pub fn unmatched(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.unmatched
            .iter()
            .map(|(parent, tag)| (parent.as_str(), tag.as_str()))
    }

    pub fn sub_file_failures(&self) -> &[SubFileFailure] {
        &self.sub_file_failures
    }

    pub fn is_empty(&self) -> bool {
        self.unmatched.is_empty() && self.sub_file_failures.is_empty()
    }

    fn record_unmatched(&mut self, parent: &str, tag: &str) {
        self.unmatched.insert((parent.to_string(), tag.to_string()));
    }
}

struct Cursor<R> {
    reader: LineReader<R>,
    line: usize,
    limit: Option<usize>,
}

impl<R: Read> Cursor<R> {
    fn read_raw(&mut self) -> Result<Option<(String, LineEnding)>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line)? {
            Some(_) => {
                self.line += 1;
                Ok(Some((line, self.reader.last_line_ending())))
            }
            None => Ok(None),
        }
    }
}

impl<R: Read> LineSource for Cursor<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.read_raw()?.map(|(line, _)| line))
    }

    fn line_number(&self) -> usize {
        self.line
    }

    fn line_limit(&self) -> Option<usize> {
        self.limit
    }
}

/// An open command on the resolver stack.
struct Frame {
    node: NodeId,
    object: IniMap,
    /// Elements of repeated child commands, collected per field until close.
    pending: IndexMap<&'static str, Vec<Value>>,
    /// Parsed only to consume its lines; dropped when closed.
    discard: bool,
}

impl Frame {
    fn into_object(self) -> IniMap {
        let mut object = self.object;
        for (field, items) in self.pending {
            object.insert(field.to_string(), Value::Array(items));
        }
        object
    }
}

struct Resolver<'a, R> {
    tree: &'a SchemaTree,
    cursor: Cursor<R>,
    stack: Vec<Frame>,
    comments: String,
    enabled: bool,
    options: &'a DecodeOptions,
    path: Option<&'a Path>,
    chain: &'a [PathBuf],
    diagnostics: &'a mut Diagnostics,
}

/// Decodes one document against `tree` into the root command's object.
///
/// `path` is the document's own location, used to resolve sub-file
/// references. `chain` lists the canonical paths of the documents currently
/// being decoded, outermost first.
pub(crate) fn decode_document<R: Read>(
    tree: &SchemaTree,
    reader: R,
    options: &DecodeOptions,
    path: Option<&Path>,
    chain: &[PathBuf],
    diagnostics: &mut Diagnostics,
) -> Result<IniMap> {
    let root = tree.root();
    let object = tree.node(root).default_object()?;
    let resolver = Resolver {
        tree,
        cursor: Cursor {
            reader: LineReader::with_encoding(reader, options.encoding, options.detect_bom),
            line: 0,
            limit: options.max_line_length,
        },
        stack: vec![Frame {
            node: root,
            object,
            pending: IndexMap::new(),
            discard: false,
        }],
        comments: String::new(),
        enabled: true,
        options,
        path,
        chain,
        diagnostics,
    };
    resolver.run()
}

impl<'a, R: Read> Resolver<'a, R> {
    fn run(mut self) -> Result<IniMap> {
        while let Some((id, level)) = self.next_command()? {
            self.close(level)?;
            self.open(id)?;
        }
        self.close(self.stack.len().saturating_sub(1))?;

        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::custom("the root command was closed"))?;
        let mut root = frame.into_object();
        if !self.comments.is_empty() {
            match self.tree.node(self.tree.root()).trailing_comments {
                Some(field) => {
                    root.insert(field.to_string(), Value::String(mem::take(&mut self.comments)));
                }
                None => log::debug!("dropping {} bytes of trailing comments", self.comments.len()),
            }
        }
        Ok(root)
    }

    /// Reads lines until one matches a command. Returns the matched node and
    /// the number of open commands it closes.
    fn next_command(&mut self) -> Result<Option<(NodeId, usize)>> {
        while let Some((line, ending)) = self.cursor.read_raw()? {
            if self.enabled {
                if line.starts_with(DISABLE_SENTINEL) {
                    self.enabled = false;
                } else if let Some(hit) = self.match_line(&line) {
                    return Ok(Some(hit));
                }
            } else if line.starts_with(ENABLE_SENTINEL) {
                self.enabled = true;
            }
            self.comments.push_str(&line);
            self.comments.push_str(ending.as_str());
        }
        Ok(None)
    }

    fn match_line(&mut self, line: &str) -> Option<(NodeId, usize)> {
        let tree = self.tree;
        let mut key = None;
        for (level, frame) in self.stack.iter().rev().enumerate() {
            key = if tree.node(frame.node).children_verbatim {
                Some(line)
            } else {
                bracket_inner(line)
            };
            // Plain text below a bracketed level can never be a command.
            let candidate = key?;
            if let Some(id) = tree.lookup(frame.node, candidate) {
                return Some((id, level));
            }
        }

        let candidate = key?;
        let parent = self
            .stack
            .last()
            .map(|frame| tree.node(frame.node))
            .filter(|node| node.parent.is_some())
            .and_then(|node| node.tag)
            .unwrap_or("ROOT");
        log::debug!("unmatched command {:?} under {}, kept as comment", candidate, parent);
        self.diagnostics.record_unmatched(parent, candidate);
        None
    }

    /// Closes `level` open commands, storing each in its parent.
    fn close(&mut self, level: usize) -> Result<()> {
        let tree = self.tree;
        for _ in 0..level {
            if self.stack.len() <= 1 {
                break;
            }
            let Some(frame) = self.stack.pop() else {
                break;
            };
            let node = tree.node(frame.node);
            let discard = frame.discard;
            let object = frame.into_object();
            log::trace!("closing {} at line {}", node.type_name, self.cursor.line);
            if discard {
                continue;
            }

            let value = match node.role {
                Role::Storage => Value::Object(object),
                Role::Derived { storage } => Value::Object(convert(object, tree.node(storage))?),
                Role::Variant { name } => {
                    let mut wrapper = IniMap::with_capacity(1);
                    wrapper.insert(name.to_string(), Value::Object(object));
                    Value::Object(wrapper)
                }
            };

            let (Some(field), Some(parent)) = (node.field, self.stack.last_mut()) else {
                continue;
            };
            if node.is_array {
                parent.pending.entry(field).or_default().push(value);
            } else {
                parent.object.insert(field.to_string(), value);
            }
        }
        Ok(())
    }

    /// Opens a command: reads its lines and pushes it onto the stack.
    fn open(&mut self, id: NodeId) -> Result<()> {
        let tree = self.tree;
        let node = tree.node(id);
        let mut object = node.default_object()?;
        log::trace!("opening {} at line {}", node.type_name, self.cursor.line);

        if let Some(codec) = &node.codec {
            let Resolver { cursor, stack, .. } = &mut *self;
            let parent = stack
                .last_mut()
                .ok_or_else(|| Error::custom("the root command was closed"))?;
            let mut cx = DecodeContext::new(
                cursor,
                &mut parent.object,
                node.tag.unwrap_or_default(),
                node.type_name,
            );
            codec.decode(&mut cx, &mut object)?;
        } else {
            for field in &node.scalars {
                let current = object.get(field.name).cloned();
                let outcome = decode_field(&mut self.cursor, field, node.type_name, current.as_ref())?;
                let fell_back = matches!(outcome, Outcome::Fallback(_));
                let (Outcome::Value(value) | Outcome::Fallback(value)) = outcome;
                object.insert(field.name.to_string(), value);
                if fell_back {
                    break;
                }
                if node.file_reference == Some(field.name) {
                    self.expand(node, field.name, &mut object)?;
                }
            }
        }

        if let Some(field) = node.comments {
            if !self.comments.is_empty() {
                object.insert(field.to_string(), Value::String(mem::take(&mut self.comments)));
            }
        }

        self.stack.push(Frame {
            node: id,
            object,
            pending: IndexMap::new(),
            discard: node.skips_decode(),
        });
        Ok(())
    }

    /// Replaces `object` with the decoded contents of the document it references.
    fn expand(&mut self, node: &SchemaNode, field: &str, object: &mut IniMap) -> Result<()> {
        if !self.options.recursive {
            return Ok(());
        }
        let Some(document) = self.path else {
            return Ok(());
        };
        let Some(reference) = object.get(field).and_then(Value::as_str).map(str::to_string) else {
            return Ok(());
        };

        let target = resolve_reference(document, &reference);
        match self.decode_sub_file(node, &target) {
            Ok(mut expanded) => {
                expanded.insert(field.to_string(), Value::String(reference));
                *object = expanded;
                Ok(())
            }
            Err(err) if self.options.permissive => {
                log::warn!("ignoring referenced file {}: {}", target.display(), err);
                self.diagnostics.sub_file_failures.push(SubFileFailure {
                    path: target,
                    message: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(Error::SubFile {
                path: target,
                source: Box::new(err),
            }),
        }
    }

    fn decode_sub_file(&mut self, node: &SchemaNode, target: &Path) -> Result<IniMap> {
        let limit = self.options.max_include_depth;
        if self.chain.len() > limit {
            return Err(Error::IncludeDepth {
                path: target.to_path_buf(),
                limit,
            });
        }
        let canonical = target.canonicalize()?;
        if self.chain.contains(&canonical) {
            return Err(Error::IncludeCycle {
                path: target.to_path_buf(),
            });
        }

        let tree = (node.subtree)()?;
        let file = File::open(target)?;
        let mut chain = self.chain.to_vec();
        chain.push(canonical);
        log::trace!("expanding {}", target.display());
        decode_document(
            &tree,
            file,
            self.options,
            Some(target),
            &chain,
            &mut *self.diagnostics,
        )
    }
}

/// Copies the members of a derived command that its storage type also has.
fn convert(object: IniMap, storage: &SchemaNode) -> Result<IniMap> {
    let mut converted = storage.default_object()?;
    for (key, value) in object {
        if let Some(slot) = converted.get_mut(&key) {
            *slot = value;
        }
    }
    Ok(converted)
}

fn bracket_inner(line: &str) -> Option<&str> {
    if line.len() > 2 && line.starts_with('[') && line.ends_with(']') {
        Some(&line[1..line.len() - 1])
    } else {
        None
    }
}

/// Resolves a sub-file reference against the referencing document's directory.
///
/// References use either `\` or `/` as separator.
pub(crate) fn resolve_reference(document: &Path, reference: &str) -> PathBuf {
    let mut path = document.parent().map(Path::to_path_buf).unwrap_or_default();
    for part in reference
        .split(|c| c == '\\' || c == '/')
        .filter(|part| !part.is_empty())
    {
        path.push(part);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema_of;
    use crate::{Command, CommandBuilder, FieldKind, Skip};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct Note {
        text: String,
    }

    impl Command for Note {
        fn describe(cmd: &mut CommandBuilder) {
            cmd.tag("note").field("text", FieldKind::Str);
        }
    }

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct Group {
        size: u8,
        notes: Vec<Note>,
        comments: Option<String>,
    }

    impl Command for Group {
        fn describe(cmd: &mut CommandBuilder) {
            cmd.tag("group")
                .field("size", FieldKind::U8)
                .children::<Note>("notes")
                .comments("comments");
        }
    }

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct Scratch {
        notes: Vec<Note>,
    }

    impl Command for Scratch {
        fn describe(cmd: &mut CommandBuilder) {
            cmd.tag("scratch").children::<Note>("notes");
        }
    }

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct Book {
        groups: Vec<Group>,
        scratch: Option<Scratch>,
        tail: Option<String>,
    }

    impl Command for Book {
        fn describe(cmd: &mut CommandBuilder) {
            cmd.children::<Group>("groups")
                .child::<Scratch>("scratch")
                .skip("scratch", Skip::Decode)
                .trailing_comments("tail");
        }
    }

    fn decode(text: &str) -> (IniMap, Diagnostics) {
        let tree = schema_of::<Book>().unwrap();
        let mut diagnostics = Diagnostics::new();
        let map = decode_document(
            &tree,
            text.as_bytes(),
            &DecodeOptions::new(),
            None,
            &[],
            &mut diagnostics,
        )
        .unwrap();
        (map, diagnostics)
    }

    fn groups(map: &IniMap) -> &Vec<Value> {
        map.get("groups").and_then(Value::as_array).unwrap()
    }

    #[test]
    fn test_closes_the_right_number_of_levels() {
        let (map, _) = decode("[group]\n1\n[note]\na\n[note]\nb\n[group]\n2\n[note]\nc\n");
        let groups = groups(&map);
        assert_eq!(groups.len(), 2);
        let notes = |i: usize| groups[i].get("notes").and_then(Value::as_array).map(Vec::len);
        assert_eq!(notes(0), Some(2));
        assert_eq!(notes(1), Some(1));
    }

    #[test]
    fn test_comments_keep_their_terminators() {
        let (map, _) = decode("; header\r\n\r\n[group]\n3\nfree text\r[note]\nx\n; end");
        let group = &groups(&map)[0];
        assert_eq!(
            group.get("comments").and_then(Value::as_str),
            Some("; header\r\n\r\n")
        );
        assert_eq!(map.get("tail").and_then(Value::as_str), Some("free text\r; end"));
    }

    #[test]
    fn test_unmatched_tags_are_recorded() {
        let (map, diagnostics) = decode("[bogus]\n[group]\n1\n[bogus]\n[bogus]\n");
        let unmatched: Vec<_> = diagnostics.unmatched().collect();
        assert_eq!(unmatched, vec![("ROOT", "bogus"), ("group", "bogus")]);
        assert_eq!(map.get("tail").and_then(Value::as_str), Some("[bogus]\n[bogus]\n"));
    }

    #[test]
    fn test_disabled_block_is_not_matched() {
        let (map, _) = decode("-<DISABLED>-\n[group]\n9\n-<ENABLED>-\n[group]\n1\n");
        let groups = groups(&map);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].get("comments").and_then(Value::as_str),
            Some("-<DISABLED>-\n[group]\n9\n-<ENABLED>-\n")
        );
    }

    #[test]
    fn test_skipped_child_consumes_its_subtree() {
        let (map, _) = decode("[scratch]\n[note]\nlost\n[group]\n1\n[note]\nkept\n");
        assert_eq!(map.get("scratch"), Some(&Value::Null));
        let notes = groups(&map)[0].get("notes").and_then(Value::as_array).cloned();
        assert_eq!(notes.map(|n| n.len()), Some(1));
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let tree = schema_of::<Book>().unwrap();
        let err = decode_document(
            &tree,
            "[group]\n".as_bytes(),
            &DecodeOptions::new(),
            None,
            &[],
            &mut Diagnostics::new(),
        )
        .unwrap_err();
        match err {
            Error::UnexpectedEof { field, owner, .. } => {
                assert_eq!(field, "size");
                assert_eq!(owner, "Group");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bracket_inner() {
        assert_eq!(bracket_inner("[mesh]"), Some("mesh"));
        assert_eq!(bracket_inner("[]"), None);
        assert_eq!(bracket_inner("mesh"), None);
        assert_eq!(bracket_inner("[mesh"), None);
    }

    #[test]
    fn test_resolve_reference_accepts_both_separators() {
        let base = Path::new("vehicles").join("bus").join("bus.bus");
        let resolved = resolve_reference(&base, "model\\main.cfg");
        assert_eq!(
            resolved,
            Path::new("vehicles").join("bus").join("model").join("main.cfg")
        );
        let resolved = resolve_reference(&base, "../shared/paths.cfg");
        assert_eq!(
            resolved,
            Path::new("vehicles").join("bus").join("..").join("shared").join("paths.cfg")
        );
    }
}
