//! Cache keys for loader calls.
//!
//! Every argument of a [`LoadCall`] is reduced to a 64-bit hash by trying an ordered list of
//! [`HashStrategy`]s. A strategy either produces a hash or declines; the first success wins.
//! Tables are always hashed by content so that two structurally identical tables collide.
//!
//! The per-argument hashes are folded into a 128-bit key. Positional arguments are folded in
//! call order, so permuting them changes the key. Keyword arguments are folded name-then-value
//! in lexicographic order of their names, so the caller's keyword order never matters.

use crate::errors::{ModelError, ModelResult};
use crate::series::{canonical_bits, AnnualRegionalSeries};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Rotation applied to the accumulator before each fold.
///
/// Coprime with 128 so that every argument position lands on a distinct rotation.
const FOLD_ROTATION: u32 = 67;

/// An argument value that only the caller knows how to describe
///
/// Both methods default to declining, in which case the value is unhashable.
pub trait OpaqueArg: fmt::Debug + Send + Sync {
    /// A stable string form of the value
    fn display(&self) -> Option<String> {
        None
    }

    /// The value viewed as a sequence of hashable elements
    fn elements(&self) -> Option<Vec<Arg>> {
        None
    }
}

/// A heterogeneous argument to a loader call
#[derive(Debug, Clone)]
pub enum Arg {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    List(Vec<Arg>),
    Map(BTreeMap<String, Arg>),
    Table(AnnualRegionalSeries),
    Opaque(Arc<dyn OpaqueArg>),
}

impl Arg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            Arg::Path(p) => p.to_str(),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Arg::None => "none",
            Arg::Bool(_) => "bool",
            Arg::Int(_) => "int",
            Arg::Float(_) => "float",
            Arg::Str(_) => "str",
            Arg::Path(_) => "path",
            Arg::List(_) => "list",
            Arg::Map(_) => "map",
            Arg::Table(_) => "table",
            Arg::Opaque(_) => "opaque",
        }
    }
}

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Arg::None => serializer.serialize_unit(),
            Arg::Bool(b) => serializer.serialize_bool(*b),
            Arg::Int(i) => serializer.serialize_i64(*i),
            Arg::Float(f) => serializer.serialize_f64(*f),
            Arg::Str(s) => serializer.serialize_str(s),
            Arg::Path(p) => match p.to_str() {
                Some(s) => serializer.serialize_str(s),
                None => Err(S::Error::custom("path is not valid UTF-8")),
            },
            Arg::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Arg::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Arg::Table(table) => serializer.serialize_u64(table.content_hash()),
            Arg::Opaque(_) => Err(S::Error::custom("opaque values have no canonical form")),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<&Path> for Arg {
    fn from(p: &Path) -> Self {
        Arg::Path(p.to_path_buf())
    }
}

impl From<PathBuf> for Arg {
    fn from(p: PathBuf) -> Self {
        Arg::Path(p)
    }
}

impl From<i64> for Arg {
    fn from(i: i64) -> Self {
        Arg::Int(i)
    }
}

impl From<i32> for Arg {
    fn from(i: i32) -> Self {
        Arg::Int(i as i64)
    }
}

impl From<f64> for Arg {
    fn from(f: f64) -> Self {
        Arg::Float(f)
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(items: Vec<Arg>) -> Self {
        Arg::List(items)
    }
}

impl From<AnnualRegionalSeries> for Arg {
    fn from(table: AnnualRegionalSeries) -> Self {
        Arg::Table(table)
    }
}

/// A call signature: the source reference plus the reader's own options
#[derive(Debug, Clone)]
pub struct LoadCall {
    source: Arg,
    args: Vec<Arg>,
    kwargs: Vec<(String, Arg)>,
}

impl LoadCall {
    pub fn new(source: impl Into<Arg>) -> Self {
        Self {
            source: source.into(),
            args: vec![],
            kwargs: vec![],
        }
    }

    pub fn arg(mut self, value: impl Into<Arg>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: &str, value: impl Into<Arg>) -> Self {
        self.kwargs.push((name.to_string(), value.into()));
        self
    }

    pub fn source(&self) -> &Arg {
        &self.source
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn kwargs(&self) -> &[(String, Arg)] {
        &self.kwargs
    }

    pub fn kwarg_value(&self, name: &str) -> Option<&Arg> {
        self.kwargs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

/// One way of hashing an argument
pub trait HashStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Hash `arg`, or return `None` if this strategy does not apply
    fn try_hash(&self, arg: &Arg, chain: &HashChain) -> Option<u64>;
}

fn hash_one<H: Hash + ?Sized>(tag: &str, value: &H) -> u64 {
    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    value.hash(&mut hasher);
    hasher.finish()
}

/// Tables hash by their contents, never their identity
pub struct TableContent;

impl HashStrategy for TableContent {
    fn name(&self) -> &'static str {
        "table-content"
    }

    fn try_hash(&self, arg: &Arg, _chain: &HashChain) -> Option<u64> {
        match arg {
            Arg::Table(table) => Some(hash_one("table", &table.content_hash())),
            _ => None,
        }
    }
}

/// Immutable scalar values hash directly
pub struct NativeHash;

impl HashStrategy for NativeHash {
    fn name(&self) -> &'static str {
        "native"
    }

    fn try_hash(&self, arg: &Arg, _chain: &HashChain) -> Option<u64> {
        let kind = arg.kind();
        match arg {
            Arg::None => Some(hash_one(kind, &())),
            Arg::Bool(b) => Some(hash_one(kind, b)),
            Arg::Int(i) => Some(hash_one(kind, i)),
            Arg::Float(f) => Some(hash_one(kind, &canonical_bits(*f))),
            Arg::Str(s) => Some(hash_one(kind, s)),
            Arg::Path(p) => Some(hash_one(kind, p)),
            _ => None,
        }
    }
}

/// Compact JSON serialisation, for containers of serialisable values
pub struct CanonicalSerialization;

impl HashStrategy for CanonicalSerialization {
    fn name(&self) -> &'static str {
        "canonical-serialization"
    }

    fn try_hash(&self, arg: &Arg, _chain: &HashChain) -> Option<u64> {
        serde_json::to_string(arg)
            .ok()
            .map(|json| hash_one("json", &json))
    }
}

/// The string form an opaque value gives of itself
pub struct StringForm;

impl HashStrategy for StringForm {
    fn name(&self) -> &'static str {
        "string-form"
    }

    fn try_hash(&self, arg: &Arg, _chain: &HashChain) -> Option<u64> {
        match arg {
            Arg::Opaque(value) => value.display().map(|s| hash_one("display", &s)),
            _ => None,
        }
    }
}

/// A container viewed as a sequence, each element hashed through the full chain
///
/// Covers opaque values that list their elements, and lists or maps holding values that
/// canonical serialisation rejects. Map entries are hashed key then value, in key order.
pub struct ElementSequence;

impl HashStrategy for ElementSequence {
    fn name(&self) -> &'static str {
        "element-sequence"
    }

    fn try_hash(&self, arg: &Arg, chain: &HashChain) -> Option<u64> {
        let mut hasher = DefaultHasher::new();
        match arg {
            Arg::Opaque(value) => {
                "sequence".hash(&mut hasher);
                for element in &value.elements()? {
                    chain.hash(element)?.hash(&mut hasher);
                }
            }
            Arg::List(items) => {
                "list".hash(&mut hasher);
                for item in items {
                    chain.hash(item)?.hash(&mut hasher);
                }
            }
            Arg::Map(entries) => {
                "map".hash(&mut hasher);
                for (name, value) in entries {
                    name.hash(&mut hasher);
                    chain.hash(value)?.hash(&mut hasher);
                }
            }
            _ => return None,
        }
        Some(hasher.finish())
    }
}

/// An ordered list of hashing strategies
pub struct HashChain {
    strategies: Vec<Box<dyn HashStrategy>>,
}

impl Default for HashChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(TableContent),
            Box::new(NativeHash),
            Box::new(CanonicalSerialization),
            Box::new(StringForm),
            Box::new(ElementSequence),
        ])
    }
}

impl fmt::Debug for HashChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

impl HashChain {
    pub fn new(strategies: Vec<Box<dyn HashStrategy>>) -> Self {
        Self { strategies }
    }

    /// Hash with the first strategy that accepts `arg`
    pub fn hash(&self, arg: &Arg) -> Option<u64> {
        self.strategies.iter().find_map(|s| s.try_hash(arg, self))
    }

    fn hash_at(&self, arg: &Arg, position: impl FnOnce() -> String) -> ModelResult<u64> {
        self.hash(arg).ok_or_else(|| ModelError::UnhashableArgument {
            position: position(),
        })
    }

    /// Composite key for a full call signature
    pub fn key(&self, call: &LoadCall) -> ModelResult<CacheKey> {
        let mut key = CacheKey(self.hash_at(&call.source, || "source".to_string())? as u128);
        for (i, arg) in call.args.iter().enumerate() {
            key.fold(self.hash_at(arg, || format!("argument {}", i + 1))?);
        }

        let mut kwargs: Vec<&(String, Arg)> = call.kwargs.iter().collect();
        kwargs.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in kwargs {
            key.fold(hash_one("str", name));
            key.fold(self.hash_at(value, || format!("keyword '{}'", name))?);
        }
        Ok(key)
    }
}

/// Accumulated hash of a call signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u128);

impl CacheKey {
    fn fold(&mut self, hash: u64) {
        self.0 = self.0.rotate_left(FOLD_ROTATION) ^ hash as u128;
    }
}
