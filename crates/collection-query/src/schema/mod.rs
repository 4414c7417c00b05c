//! Field introspection for filterable types.
//!
//! A filter names fields by their filter-facing names; this module maps those
//! names onto typed accessors for a concrete Rust type. Each type implements
//! [`Filterable`] and declares its fields once through a [`SchemaBuilder`].
//! The resulting [`Schema`] is built on first use and cached for the life of
//! the process (see [`describe`]).
//!
//! # Example
//!
//! ```
//! use collection_query_rs::schema::{describe, Filterable, SchemaBuilder};
//!
//! struct Account {
//!     display_name: String,
//!     balance: i64,
//!     closed_at: Option<u64>,
//! }
//!
//! impl Filterable for Account {
//!     fn fields(schema: &mut SchemaBuilder<Self>) {
//!         schema.string("display_name", |a| a.display_name.as_str()).wire_name("name");
//!         schema.integer("balance", |a| a.balance);
//!         schema.boxed_unsigned("closed_at", |a| a.closed_at);
//!     }
//! }
//!
//! let schema = describe::<Account>();
//! assert!(schema.resolve("name").is_some());
//! assert!(schema.resolve("display_name").is_none());
//! assert!(schema.resolve("closed_at").unwrap().nullable());
//! ```

mod registry;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strsim::levenshtein;

pub use registry::describe;

/// Maximum Levenshtein distance to consider a field name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A type whose fields can be filtered.
///
/// `fields` is called once per type, under the registry's write lock, so it
/// must not call [`describe`] itself. Use [`SchemaBuilder::embed`] to pull in
/// the fields of a composed type.
pub trait Filterable: Sized + 'static {
    /// Declares the filterable fields of `Self`.
    fn fields(schema: &mut SchemaBuilder<Self>);
}

/// A value read from an object at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// An unset boxed scalar or nested message.
    Null,
    /// A string.
    Str(&'a str),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A set nested message; only its presence is observable.
    Message,
}

impl Value<'_> {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(i) => Some(i as f64),
            Value::Uint(u) => Some(u as f64),
            Value::Float(f) => Some(f),
            _ => None,
        }
    }
}

/// Comparable type of a scalar field or of the value inside a boxed scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 text.
    String,
    /// Signed integer of any width.
    Integer,
    /// Unsigned integer of any width.
    UnsignedInteger,
    /// Floating-point number.
    Float,
    /// Boolean.
    Bool,
}

impl ScalarType {
    /// Returns true for the three numeric types.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ScalarType::Integer | ScalarType::UnsignedInteger | ScalarType::Float
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::UnsignedInteger => "unsigned integer",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
        })
    }
}

/// What a nullable field holds when it is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullableKind {
    /// An optional wrapper around exactly one scalar.
    BoxedScalar(ScalarType),
    /// A nested structured value, comparable only against `null`.
    Message,
}

/// The filter engine's classification of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// A plain scalar that is always present.
    Scalar(ScalarType),
    /// A field that may be absent.
    Nullable(NullableKind),
}

impl SemanticType {
    /// Returns true if the field can be compared with `null`.
    pub fn is_nullable(self) -> bool {
        matches!(self, SemanticType::Nullable(_))
    }

    /// Returns the type non-null literals are compared against, if any.
    ///
    /// Boxed scalars compare through their inner value; messages have none.
    pub fn comparable(self) -> Option<ScalarType> {
        match self {
            SemanticType::Scalar(scalar)
            | SemanticType::Nullable(NullableKind::BoxedScalar(scalar)) => Some(scalar),
            SemanticType::Nullable(NullableKind::Message) => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Scalar(scalar) => write!(f, "{}", scalar),
            SemanticType::Nullable(NullableKind::BoxedScalar(scalar)) => {
                write!(f, "nullable {}", scalar)
            }
            SemanticType::Nullable(NullableKind::Message) => f.write_str("message"),
        }
    }
}

type Reader<T> = Box<dyn for<'a> Fn(&'a T) -> Value<'a> + Send + Sync>;

fn reader<T, F>(f: F) -> Reader<T>
where
    T: 'static,
    F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
{
    Box::new(f)
}

/// One filterable field of `T`.
pub struct FieldDescriptor<T> {
    name: String,
    ident: &'static str,
    semantic_type: SemanticType,
    depth: usize,
    reader: Reader<T>,
}

impl<T> FieldDescriptor<T> {
    /// The filter-facing name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identifier the field was declared with.
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// The field's semantic type.
    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    /// Returns true if the field may be absent.
    pub fn nullable(&self) -> bool {
        self.semantic_type.is_nullable()
    }

    /// Reads the field from `item`.
    pub fn read<'a>(&self, item: &'a T) -> Value<'a> {
        (self.reader)(item)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ident", &self.ident)
            .field("semantic_type", &self.semantic_type)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// The field map of one filterable type.
pub struct Schema<T> {
    type_name: &'static str,
    fields: HashMap<String, FieldDescriptor<T>>,
}

impl<T: Filterable> Schema<T> {
    /// Runs `T::fields` and resolves names into a lookup table.
    ///
    /// Callers normally go through [`describe`], which caches the result.
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new(0);
        T::fields(&mut builder);

        let mut fields: HashMap<String, FieldDescriptor<T>> = HashMap::new();
        for def in builder.fields {
            let name = def.resolved_name().to_string();
            // Shallower declarations shadow embedded ones; at equal depth the
            // first declaration wins.
            if fields.get(&name).is_some_and(|existing| existing.depth <= def.depth) {
                continue;
            }
            fields.insert(
                name.clone(),
                FieldDescriptor {
                    name,
                    ident: def.ident,
                    semantic_type: def.semantic_type,
                    depth: def.depth,
                    reader: def.reader,
                },
            );
        }

        Self {
            type_name: std::any::type_name::<T>(),
            fields,
        }
    }
}

impl<T> Schema<T> {
    /// Looks up a field by its filter-facing name.
    pub fn resolve(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.get(name)
    }

    /// Name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of filterable fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the type has no filterable fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Filter-facing field names, sorted.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Finds the closest field name to an unknown `name`, if one is close enough.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        let query_lower = name.to_lowercase();

        let (best_match, best_distance) = self
            .field_names()
            .into_iter()
            .map(|candidate| (candidate, levenshtein(&query_lower, &candidate.to_lowercase())))
            .min_by_key(|(_, d)| *d)?;

        if best_match != name && best_distance <= MAX_SUGGESTION_DISTANCE {
            Some(best_match)
        } else {
            None
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("fields", &self.field_names())
            .finish()
    }
}

/// A field as declared, before name resolution.
pub struct FieldDef<T> {
    ident: &'static str,
    wire_name: Option<String>,
    display_name: Option<String>,
    semantic_type: SemanticType,
    depth: usize,
    reader: Reader<T>,
}

impl<T> FieldDef<T> {
    /// Sets the wire name, which takes precedence over every other name.
    pub fn wire_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.wire_name = Some(name.into());
        self
    }

    /// Sets a display name, used when no wire name is set.
    pub fn display_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.display_name = Some(name.into());
        self
    }

    /// Wire name, else display name, else identifier.
    fn resolved_name(&self) -> &str {
        self.wire_name
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or(self.ident)
    }
}

/// Collects field declarations for a [`Filterable`] type.
///
/// Each declaration method returns the new [`FieldDef`] so names can be
/// attached: `schema.string("Str", |m| m.str.as_str()).wire_name("str");`
pub struct SchemaBuilder<T> {
    fields: Vec<FieldDef<T>>,
    depth: usize,
}

impl<T: 'static> SchemaBuilder<T> {
    fn new(depth: usize) -> Self {
        Self {
            fields: Vec::new(),
            depth,
        }
    }

    fn push(
        &mut self,
        ident: &'static str,
        semantic_type: SemanticType,
        reader: Reader<T>,
    ) -> &mut FieldDef<T> {
        self.fields.push(FieldDef {
            ident,
            wire_name: None,
            display_name: None,
            semantic_type,
            depth: self.depth,
            reader,
        });
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    // ==================== Scalars ====================

    /// Declares a string field.
    pub fn string<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: for<'a> Fn(&'a T) -> &'a str + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| Value::Str(get(item)));
        self.push(ident, SemanticType::Scalar(ScalarType::String), read)
    }

    /// Declares a signed integer field (enums with integer values included).
    pub fn integer<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: Fn(&T) -> i64 + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| Value::Int(get(item)));
        self.push(ident, SemanticType::Scalar(ScalarType::Integer), read)
    }

    /// Declares an unsigned integer field.
    pub fn unsigned<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: Fn(&T) -> u64 + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| Value::Uint(get(item)));
        self.push(ident, SemanticType::Scalar(ScalarType::UnsignedInteger), read)
    }

    /// Declares a floating-point field.
    pub fn float<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| Value::Float(get(item)));
        self.push(ident, SemanticType::Scalar(ScalarType::Float), read)
    }

    /// Declares a boolean field.
    pub fn boolean<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| Value::Bool(get(item)));
        self.push(ident, SemanticType::Scalar(ScalarType::Bool), read)
    }

    // ==================== Boxed Scalars ====================

    /// Declares an optional string wrapper.
    pub fn boxed_string<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: for<'a> Fn(&'a T) -> Option<&'a str> + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| get(item).map_or(Value::Null, Value::Str));
        self.push(ident, boxed(ScalarType::String), read)
    }

    /// Declares an optional signed integer wrapper.
    pub fn boxed_integer<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: Fn(&T) -> Option<i64> + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| get(item).map_or(Value::Null, Value::Int));
        self.push(ident, boxed(ScalarType::Integer), read)
    }

    /// Declares an optional unsigned integer wrapper.
    pub fn boxed_unsigned<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: Fn(&T) -> Option<u64> + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| get(item).map_or(Value::Null, Value::Uint));
        self.push(ident, boxed(ScalarType::UnsignedInteger), read)
    }

    /// Declares an optional floating-point wrapper.
    pub fn boxed_float<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| get(item).map_or(Value::Null, Value::Float));
        self.push(ident, boxed(ScalarType::Float), read)
    }

    /// Declares an optional boolean wrapper.
    pub fn boxed_boolean<F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        F: Fn(&T) -> Option<bool> + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| get(item).map_or(Value::Null, Value::Bool));
        self.push(ident, boxed(ScalarType::Bool), read)
    }

    // ==================== Composition ====================

    /// Declares a nested message. Only its presence can be filtered on.
    pub fn message<M, F>(&mut self, ident: &'static str, get: F) -> &mut FieldDef<T>
    where
        M: 'static,
        F: for<'a> Fn(&'a T) -> Option<&'a M> + Send + Sync + 'static,
    {
        let read = reader(move |item: &T| {
            if get(item).is_some() {
                Value::Message
            } else {
                Value::Null
            }
        });
        self.push(
            ident,
            SemanticType::Nullable(NullableKind::Message),
            read,
        )
    }

    /// Flattens the fields of an embedded [`Filterable`] into this namespace.
    ///
    /// Fields declared directly on `T` shadow embedded fields of the same name.
    pub fn embed<E, F>(&mut self, get: F) -> &mut Self
    where
        E: Filterable,
        F: for<'a> Fn(&'a T) -> &'a E + Send + Sync + 'static,
    {
        let mut inner = SchemaBuilder::<E>::new(self.depth + 1);
        E::fields(&mut inner);

        let get = Arc::new(get);
        for def in inner.fields {
            let get = Arc::clone(&get);
            let inner_read = def.reader;
            self.fields.push(FieldDef {
                ident: def.ident,
                wire_name: def.wire_name,
                display_name: def.display_name,
                semantic_type: def.semantic_type,
                depth: def.depth,
                reader: reader(move |item: &T| inner_read((*get)(item))),
            });
        }
        self
    }
}

fn boxed(scalar: ScalarType) -> SemanticType {
    SemanticType::Nullable(NullableKind::BoxedScalar(scalar))
}
