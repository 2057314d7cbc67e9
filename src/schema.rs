//! Schema registration and the compiled schema tree.
//!
//! A command type describes its on-disk shape once, through
//! [`Command::describe`]. [`schema_of`] compiles that description, and the
//! descriptions of every reachable child type, into an immutable
//! [`SchemaTree`]. Trees are cached per root type for the lifetime of the
//! process.
//!
//! ## Registration
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_omsi::{schema_of, Command, CommandBuilder, FieldKind};
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct Mesh {
//!     path: String,
//! }
//!
//! impl Command for Mesh {
//!     fn describe(cmd: &mut CommandBuilder) {
//!         cmd.tag("mesh").field("path", FieldKind::Str);
//!     }
//! }
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct Lod {
//!     radius: f32,
//!     meshes: Vec<Mesh>,
//! }
//!
//! impl Command for Lod {
//!     fn describe(cmd: &mut CommandBuilder) {
//!         cmd.tag("LOD")
//!             .field("radius", FieldKind::F32)
//!             .children::<Mesh>("meshes");
//!     }
//! }
//!
//! let tree = schema_of::<Lod>().unwrap();
//! let root = tree.root();
//! let mesh = tree.lookup(root, "mesh").unwrap();
//! assert!(tree.node(mesh).is_array());
//! ```
//!
//! ## Tree layout
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Each child
//! field contributes one *storage* node, typed like the field, plus one node
//! per derived type or enum variant registered on the storage type. Those
//! extra nodes are matched under their own tags and converted into the
//! storage shape when their command closes.
//!
//! Lookup keys are the bare tag text. Under a parent whose children are
//! matched verbatim, bracketed children are keyed as `[tag]` instead.

use crate::codec::CommandCodec;
use crate::field::{short_type_name, FieldKind, ScalarField};
use crate::{to_value, Error, IniMap, Result, Value};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// How many times one type may appear along a chain of nested commands.
///
/// Self-referential schemas are cut off here: a node at the limit keeps its
/// scalar fields but has no children.
pub const MAX_RECURSION_DEPTH: usize = 4;

/// A type that maps to a command of the text format.
///
/// Field names given to the [`CommandBuilder`] are the names the type
/// serializes with, so they must match the serde field names.
pub trait Command: Serialize + DeserializeOwned + Default + 'static {
    fn describe(cmd: &mut CommandBuilder);
}

/// Directions in which a child command is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    /// Read from documents but never written back.
    Encode,
    /// Parsed (so its lines are consumed) but never stored.
    Decode,
    Both,
}

impl Skip {
    fn skips_encode(self) -> bool {
        matches!(self, Skip::Encode | Skip::Both)
    }

    fn skips_decode(self) -> bool {
        matches!(self, Skip::Decode | Skip::Both)
    }
}

/// Type-erased handle to a [`Command`] implementation.
#[derive(Clone, Copy)]
pub(crate) struct CommandType {
    type_id: TypeId,
    name: &'static str,
    describe: fn(&mut CommandBuilder),
    construct: fn() -> Result<Value>,
    tree: fn() -> Result<Arc<SchemaTree>>,
}

fn construct<C: Command>() -> Result<Value> {
    to_value(&C::default())
}

impl CommandType {
    pub(crate) fn of<C: Command>() -> Self {
        CommandType {
            type_id: TypeId::of::<C>(),
            name: short_type_name::<C>(),
            describe: C::describe,
            construct: construct::<C>,
            tree: schema_of::<C>,
        }
    }

    fn definition(&self) -> CommandBuilder {
        let mut builder = CommandBuilder::new(self.name);
        (self.describe)(&mut builder);
        builder
    }
}

#[derive(Clone)]
struct ChildDef {
    field: &'static str,
    ty: CommandType,
    array: bool,
}

#[derive(Clone)]
enum VariantRole {
    Derived,
    Variant { name: &'static str, tag: &'static str },
}

#[derive(Clone)]
struct VariantDef {
    ty: CommandType,
    role: VariantRole,
}

/// Collects the description of one command type.
///
/// Every method returns the builder so registrations can be chained.
#[derive(Clone)]
pub struct CommandBuilder {
    type_name: &'static str,
    tag: Option<&'static str>,
    verbatim: bool,
    scalars: Vec<ScalarField>,
    children: Vec<ChildDef>,
    variants: Vec<VariantDef>,
    comments: Option<&'static str>,
    trailing_comments: Option<&'static str>,
    file_reference: Option<&'static str>,
    skips: Vec<(&'static str, Skip)>,
    codec: Option<Arc<dyn CommandCodec>>,
}

impl CommandBuilder {
    fn new(type_name: &'static str) -> Self {
        CommandBuilder {
            type_name,
            tag: None,
            verbatim: false,
            scalars: Vec::new(),
            children: Vec::new(),
            variants: Vec::new(),
            comments: None,
            trailing_comments: None,
            file_reference: None,
            skips: Vec::new(),
            codec: None,
        }
    }

    /// Sets the identifier that opens this command, without brackets.
    pub fn tag(&mut self, tag: &'static str) -> &mut Self {
        self.tag = Some(tag);
        self
    }

    /// Matches the tag as a bare line instead of `[tag]`.
    ///
    /// Children of a command that has verbatim children are matched verbatim
    /// as well, all the way down.
    pub fn verbatim(&mut self) -> &mut Self {
        self.verbatim = true;
        self
    }

    /// Appends a scalar field, read from the lines following the tag.
    ///
    /// A name that is already registered is ignored.
    pub fn field(&mut self, name: &'static str, kind: FieldKind) -> &mut Self {
        self.push_scalar(ScalarField::new(name, kind))
    }

    /// Appends a scalar field that falls back to `default` when unreadable.
    pub fn optional(
        &mut self,
        name: &'static str,
        kind: FieldKind,
        default: impl Into<Value>,
    ) -> &mut Self {
        self.push_scalar(ScalarField::optional(name, kind, default))
    }

    /// Appends an optional scalar field that defaults to null.
    pub fn nullable(&mut self, name: &'static str, kind: FieldKind) -> &mut Self {
        self.push_scalar(ScalarField::optional(name, kind, Value::Null))
    }

    /// Appends a string field holding the path of a document of this type.
    ///
    /// With recursive decoding enabled, the referenced document is decoded
    /// in place of this command.
    pub fn file_reference(&mut self, name: &'static str) -> &mut Self {
        self.file_reference = Some(name);
        self.push_scalar(ScalarField::new(name, FieldKind::Str))
    }

    /// Registers a singular child command stored in `field`.
    pub fn child<C: Command>(&mut self, field: &'static str) -> &mut Self {
        self.children.push(ChildDef {
            field,
            ty: CommandType::of::<C>(),
            array: false,
        });
        self
    }

    /// Registers a repeated child command collected into the sequence `field`.
    pub fn children<C: Command>(&mut self, field: &'static str) -> &mut Self {
        self.children.push(ChildDef {
            field,
            ty: CommandType::of::<C>(),
            array: true,
        });
        self
    }

    /// Accepts the older command `V` wherever this command is expected.
    ///
    /// `V` is matched under its own tag and converted into this type field
    /// by field; fields this type adds keep their defaults.
    pub fn derived<V: Command>(&mut self) -> &mut Self {
        self.variants.push(VariantDef {
            ty: CommandType::of::<V>(),
            role: VariantRole::Derived,
        });
        self
    }

    /// Registers `V` as the payload of the enum variant `name`, matched
    /// under `tag`.
    ///
    /// Used on enum types whose variants each wrap a command.
    pub fn variant<V: Command>(&mut self, name: &'static str, tag: &'static str) -> &mut Self {
        self.variants.push(VariantDef {
            ty: CommandType::of::<V>(),
            role: VariantRole::Variant { name, tag },
        });
        self
    }

    /// Designates the string field receiving unmatched lines before this command.
    pub fn comments(&mut self, field: &'static str) -> &mut Self {
        self.comments = Some(field);
        self
    }

    /// Designates the string field receiving unmatched lines at the end of a document.
    pub fn trailing_comments(&mut self, field: &'static str) -> &mut Self {
        self.trailing_comments = Some(field);
        self
    }

    /// Ignores the child command `field` in the given direction.
    pub fn skip(&mut self, field: &'static str, skip: Skip) -> &mut Self {
        self.skips.push((field, skip));
        self
    }

    /// Replaces the scalar field loop with a hand-written codec.
    pub fn codec(&mut self, codec: impl CommandCodec + 'static) -> &mut Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    fn push_scalar(&mut self, field: ScalarField) -> &mut Self {
        if !self.scalars.iter().any(|f| f.name == field.name) {
            self.scalars.push(field);
        }
        self
    }
}

/// Index of a node in a [`SchemaTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// How a node's decoded object reaches its parent field.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Role {
    /// Stored as is.
    Storage,
    /// Converted field by field into the storage node's type.
    Derived { storage: NodeId },
    /// Wrapped as the enum variant `name`.
    Variant { name: &'static str },
}

/// Compiled description of one command.
pub struct SchemaNode {
    pub(crate) tag: Option<&'static str>,
    pub(crate) verbatim: bool,
    pub(crate) children_verbatim: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) field: Option<&'static str>,
    pub(crate) type_name: &'static str,
    type_id: TypeId,
    pub(crate) children: Vec<NodeId>,
    lookup: HashMap<String, NodeId>,
    pub(crate) scalars: Vec<ScalarField>,
    pub(crate) is_array: bool,
    pub(crate) role: Role,
    pub(crate) variants: Vec<NodeId>,
    pub(crate) skip: Option<Skip>,
    pub(crate) codec: Option<Arc<dyn CommandCodec>>,
    pub(crate) file_reference: Option<&'static str>,
    pub(crate) comments: Option<&'static str>,
    pub(crate) trailing_comments: Option<&'static str>,
    pub(crate) construct: fn() -> Result<Value>,
    pub(crate) subtree: fn() -> Result<Arc<SchemaTree>>,
}

impl SchemaNode {
    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The parent field this command is stored in. `None` for the root.
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn scalar_fields(&self) -> &[ScalarField] {
        &self.scalars
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    pub fn children_are_verbatim(&self) -> bool {
        self.children_verbatim
    }

    /// Whether the stored value may be any of several registered variants.
    pub fn is_polymorphic(&self) -> bool {
        !self.variants.is_empty()
    }

    /// The tag line as written to a document, if this command has a tag.
    pub fn tag_line(&self) -> Option<String> {
        self.tag.map(|tag| {
            if self.verbatim {
                tag.to_string()
            } else {
                format!("[{}]", tag)
            }
        })
    }

    pub(crate) fn skips_encode(&self) -> bool {
        self.skip.map_or(false, Skip::skips_encode)
    }

    pub(crate) fn skips_decode(&self) -> bool {
        self.skip.map_or(false, Skip::skips_decode)
    }

    pub(crate) fn default_object(&self) -> Result<IniMap> {
        expect_object((self.construct)()?, self.type_name)
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaNode")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .field("field", &self.field)
            .field("is_array", &self.is_array)
            .field("role", &self.role)
            .field("children", &self.children.len())
            .finish()
    }
}

pub(crate) fn expect_object(value: Value, type_name: &str) -> Result<IniMap> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(Error::schema(
            type_name,
            "",
            format!("a command must serialize as a struct, found {:?}", other),
        )),
    }
}

/// Immutable schema of a root command type and everything reachable from it.
#[derive(Debug)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
}

impl SchemaTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the child of `parent` registered under the lookup key `key`.
    pub fn lookup(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.node(parent).lookup.get(key).copied()
    }

    /// Resolves the node for a value stored in a polymorphic slot.
    ///
    /// Enum values are one-entry objects keyed by variant name.
    pub(crate) fn resolve_variant<'v>(
        &self,
        storage: NodeId,
        value: &'v IniMap,
    ) -> Option<(NodeId, &'v Value)> {
        if value.len() != 1 {
            return None;
        }
        let (name, inner) = value.iter().next()?;
        self.node(storage)
            .variants
            .iter()
            .copied()
            .find(|&id| matches!(self.node(id).role, Role::Variant { name: n } if n == name.as_str()))
            .map(|id| (id, inner))
    }
}

struct TreeBuilder {
    nodes: Vec<SchemaNode>,
}

struct NodeSpec {
    ty: CommandType,
    def: CommandBuilder,
    tag: Option<&'static str>,
    parent: Option<NodeId>,
    field: Option<&'static str>,
    is_array: bool,
    role: Role,
    skip: Option<Skip>,
    inherited_verbatim: bool,
}

impl TreeBuilder {
    fn same_type_ancestors(&self, mut parent: Option<NodeId>, type_id: TypeId) -> usize {
        let mut count = 0;
        while let Some(id) = parent {
            let node = &self.nodes[id.0];
            if node.type_id == type_id {
                count += 1;
            }
            parent = node.parent;
        }
        count
    }

    fn build(&mut self, spec: NodeSpec) -> Result<NodeId> {
        let NodeSpec {
            ty,
            def,
            tag,
            parent,
            field,
            is_array,
            role,
            skip,
            inherited_verbatim,
        } = spec;
        let id = NodeId(self.nodes.len());
        let capped = self.same_type_ancestors(parent, ty.type_id) >= MAX_RECURSION_DEPTH;

        // Sub-file contents are decoded against the referenced type's own tree.
        let external = parent.is_some() && def.file_reference.is_some();

        let plans = if capped {
            log::trace!("recursion limit reached for {} at {:?}", ty.name, field);
            Vec::new()
        } else if external {
            Vec::new()
        } else {
            def.children
                .iter()
                .map(|child| ChildPlan::new(child, &def))
                .collect::<Result<Vec<_>>>()?
        };
        let children_verbatim = inherited_verbatim || plans.iter().any(ChildPlan::has_verbatim);

        validate_fields(&ty, &def)?;

        self.nodes.push(SchemaNode {
            tag,
            verbatim: def.verbatim,
            children_verbatim,
            parent,
            field,
            type_name: ty.name,
            type_id: ty.type_id,
            children: Vec::new(),
            lookup: HashMap::new(),
            scalars: def.scalars.clone(),
            is_array,
            role,
            variants: Vec::new(),
            skip,
            codec: def.codec.clone(),
            file_reference: def.file_reference,
            comments: def.comments,
            trailing_comments: def.trailing_comments,
            construct: ty.construct,
            subtree: ty.tree,
        });

        for plan in plans {
            self.attach(id, plan, children_verbatim, &def)?;
        }
        Ok(id)
    }

    fn attach(
        &mut self,
        parent: NodeId,
        plan: ChildPlan,
        children_verbatim: bool,
        owner: &CommandBuilder,
    ) -> Result<()> {
        let ChildPlan { child, def, skip } = plan;
        let key_for = |tag: &str, verbatim: bool| {
            if children_verbatim && !verbatim {
                format!("[{}]", tag)
            } else {
                tag.to_string()
            }
        };

        let storage_tag = def.tag;
        let storage_verbatim = def.verbatim;
        let variants = def.variants.clone();
        let storage = self.build(NodeSpec {
            ty: child.ty,
            def,
            tag: storage_tag,
            parent: Some(parent),
            field: Some(child.field),
            is_array: child.array,
            role: Role::Storage,
            skip,
            inherited_verbatim: children_verbatim,
        })?;
        self.nodes[parent.0].children.push(storage);
        if let Some(tag) = storage_tag {
            self.insert_key(parent, key_for(tag, storage_verbatim), storage, owner, child.field)?;
        }

        for variant in variants {
            let variant_def = variant.ty.definition();
            let (tag, role) = match variant.role {
                VariantRole::Derived => {
                    let tag = variant_def.tag.ok_or_else(|| {
                        Error::schema(
                            owner.type_name,
                            child.field,
                            format!(
                                "derived command {} has no command identifier",
                                variant.ty.name
                            ),
                        )
                    })?;
                    (tag, Role::Derived { storage })
                }
                VariantRole::Variant { name, tag } => (tag, Role::Variant { name }),
            };
            let verbatim = variant_def.verbatim;
            let id = self.build(NodeSpec {
                ty: variant.ty,
                def: variant_def,
                tag: Some(tag),
                parent: Some(parent),
                field: Some(child.field),
                is_array: child.array,
                role,
                skip,
                inherited_verbatim: children_verbatim,
            })?;
            self.nodes[parent.0].children.push(id);
            self.nodes[storage.0].variants.push(id);
            self.insert_key(parent, key_for(tag, verbatim), id, owner, child.field)?;
        }
        Ok(())
    }

    fn insert_key(
        &mut self,
        parent: NodeId,
        key: String,
        id: NodeId,
        owner: &CommandBuilder,
        field: &str,
    ) -> Result<()> {
        let lookup = &mut self.nodes[parent.0].lookup;
        if lookup.contains_key(&key) {
            return Err(Error::schema(
                owner.type_name,
                field,
                format!("command identifier {} is registered twice", key),
            ));
        }
        lookup.insert(key, id);
        Ok(())
    }
}

struct ChildPlan {
    child: ChildDef,
    def: CommandBuilder,
    skip: Option<Skip>,
}

impl ChildPlan {
    fn new(child: &ChildDef, owner: &CommandBuilder) -> Result<Self> {
        let def = child.ty.definition();
        if def.tag.is_none() && def.variants.is_empty() {
            return Err(Error::schema(
                owner.type_name,
                child.field,
                format!("{} has no command identifier", child.ty.name),
            ));
        }
        let skip = owner
            .skips
            .iter()
            .find(|(field, _)| *field == child.field)
            .map(|(_, skip)| *skip);
        Ok(ChildPlan {
            child: child.clone(),
            def,
            skip,
        })
    }

    fn has_verbatim(&self) -> bool {
        self.def.verbatim
            || self
                .def
                .variants
                .iter()
                .any(|variant| variant.ty.definition().verbatim)
    }
}

/// Checks that every registered field name exists on the serialized type.
fn validate_fields(ty: &CommandType, def: &CommandBuilder) -> Result<()> {
    let object = expect_object((ty.construct)()?, ty.name)?;
    let names = def
        .scalars
        .iter()
        .map(|f| f.name)
        .chain(def.children.iter().map(|c| c.field))
        .chain(def.comments)
        .chain(def.trailing_comments);
    for name in names {
        if !object.contains_key(name) {
            return Err(Error::schema(
                ty.name,
                name,
                "no such field in the serialized command",
            ));
        }
    }
    for (name, _) in &def.skips {
        if !def.children.iter().any(|c| c.field == *name) {
            return Err(Error::schema(ty.name, name, "skip applies to child commands only"));
        }
    }
    Ok(())
}

fn compile(ty: CommandType) -> Result<SchemaTree> {
    let def = ty.definition();
    let mut builder = TreeBuilder { nodes: Vec::new() };
    builder.build(NodeSpec {
        ty,
        tag: def.tag,
        def,
        parent: None,
        field: None,
        is_array: false,
        role: Role::Storage,
        skip: None,
        inherited_verbatim: false,
    })?;
    Ok(SchemaTree {
        nodes: builder.nodes,
    })
}

type SchemaCache = RwLock<HashMap<TypeId, Arc<SchemaTree>>>;

fn cache() -> &'static SchemaCache {
    static CACHE: OnceLock<SchemaCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the compiled schema of `C`, building it on first use.
///
/// Concurrent first uses may both build the tree; the first one published
/// wins and every caller receives that instance.
///
/// # Errors
///
/// Returns [`Error::Schema`] if the registration of `C` or of any reachable
/// child type is malformed.
pub fn schema_of<C: Command>() -> Result<Arc<SchemaTree>> {
    let key = TypeId::of::<C>();
    if let Some(tree) = cache().read().get(&key) {
        return Ok(Arc::clone(tree));
    }

    let tree = Arc::new(compile(CommandType::of::<C>())?);
    log::trace!(
        "compiled schema for {} ({} nodes)",
        short_type_name::<C>(),
        tree.len()
    );
    Ok(Arc::clone(cache().write().entry(key).or_insert(tree)))
}
