//! Grouping records by a composite key
//!
//! Records are partitioned by the value found at a key path (for example the
//! query template, or the sequence name). Groups keep first-seen order, and
//! members keep their relative input order, so the position of a run within
//! its group is meaningful: it is the "N-th run of this template" that the
//! cross-file consistency filter and the deviation analysis align on.
//!
//! # Examples
//!
//! ```
//! use benchagg_analysis::{
//!     group::{GroupKey, group_projected},
//!     record::{FieldPath, Record},
//! };
//! use serde_json::json;
//!
//! let records = [
//!     json!({"t": "a", "v": 1}),
//!     json!({"t": "b", "v": 2}),
//!     json!({"t": "a", "v": 3}),
//! ]
//! .into_iter()
//! .map(Record::try_from)
//! .collect::<Result<Vec<_>, _>>()
//! .unwrap();
//!
//! let groups = group_projected(&records, &FieldPath::new(["t"]), &FieldPath::new(["v"])).unwrap();
//! let keys = groups.keys().map(ToString::to_string).collect::<Vec<_>>();
//! assert_eq!(keys, ["a", "b"]);
//! assert_eq!(groups.get(&GroupKey::from("a")).unwrap(), &[json!(1), json!(3)]);
//! ```

use std::{collections::HashMap, fmt};

use serde::{Serialize, Serializer, ser::SerializeMap as _};
use serde_json::{Number, Value};

use crate::{
    error::{AnalysisError, value_kind},
    record::{FieldPath, Record},
};

/// A hashable value found at a grouping key path.
///
/// Only JSON scalars can be group keys. Numbers are kept in textual form;
/// an integral float is written as the integer it equals, so `1` and `1.0`
/// fall into the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Null,
    Bool(bool),
    Number(String),
    String(String),
}

impl GroupKey {
    /// Builds a key from the value resolved at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnhashableKey`] for arrays and objects.
    pub fn from_value(path: &FieldPath, value: &Value) -> Result<Self, AnalysisError> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => Ok(Self::Number(number_key(n))),
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(AnalysisError::UnhashableKey {
                path: path.to_string(),
                found: value_kind(value),
            }),
        }
    }

    /// Resolves `path` in `record` and builds a key from it.
    pub fn from_record(record: &Record, path: &FieldPath) -> Result<Self, AnalysisError> {
        Self::from_value(path, record.resolve(path.segments())?)
    }
}

/// Largest magnitude below which every integral `f64` is an exact `i64`.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

#[expect(clippy::cast_possible_truncation)]
fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < EXACT_INTEGER_LIMIT => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for GroupKey {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Null => f.write_str("null"),
            GroupKey::Bool(b) => write!(f, "{b}"),
            GroupKey::Number(n) | GroupKey::String(n) => f.write_str(n),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// An insertion-ordered map from [`GroupKey`] to `V`.
///
/// Used for groups of records, for the summaries reduced from them, and for
/// error masks. Iteration follows first-insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMap<V> {
    entries: Vec<(GroupKey, V)>,
    index: HashMap<GroupKey, usize>,
}

impl<V> Default for GroupMap<V> {
    fn default() -> Self {
        Self {
            entries: vec![],
            index: HashMap::new(),
        }
    }
}

impl<V> GroupMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    #[must_use]
    pub fn contains_key(&self, key: &GroupKey) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts a value, keeping the original position if the key exists.
    pub fn insert(&mut self, key: GroupKey, value: V) -> Option<V> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Returns the value for `key`, appending `default()` if it is new.
    pub fn get_or_insert_with<F>(&mut self, key: GroupKey, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(key.clone(), i);
                self.entries.push((key, default()));
                i
            }
        };
        &mut self.entries[i].1
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Builds a new map with the same keys, in the same order.
    pub fn map_values<U, F>(&self, mut f: F) -> GroupMap<U>
    where
        F: FnMut(&GroupKey, &V) -> U,
    {
        self.iter().map(|(k, v)| (k.clone(), f(k, v))).collect()
    }

    /// Fallible [`GroupMap::map_values`]; stops at the first error.
    pub fn try_map_values<U, E, F>(&self, mut f: F) -> Result<GroupMap<U>, E>
    where
        F: FnMut(&GroupKey, &V) -> Result<U, E>,
    {
        self.iter().map(|(k, v)| Ok((k.clone(), f(k, v)?))).collect()
    }
}

impl<V> FromIterator<(GroupKey, V)> for GroupMap<V> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (GroupKey, V)>,
    {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'a, V> IntoIterator for &'a GroupMap<V> {
    type Item = (&'a GroupKey, &'a V);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (GroupKey, V)>,
        fn(&'a (GroupKey, V)) -> (&'a GroupKey, &'a V),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let split: fn(&'a (GroupKey, V)) -> (&'a GroupKey, &'a V) = |(k, v)| (k, v);
        self.entries.iter().map(split)
    }
}

impl<V> Serialize for GroupMap<V>
where
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Groups whole records by the value at `key_path`.
///
/// # Errors
///
/// Fails if `key_path` is missing in any record, or resolves to an array or
/// object.
pub fn group_records(
    records: &[Record],
    key_path: &FieldPath,
) -> Result<GroupMap<Vec<Record>>, AnalysisError> {
    let mut groups = GroupMap::new();
    for record in records {
        let key = GroupKey::from_record(record, key_path)?;
        groups.get_or_insert_with(key, Vec::new).push(record.clone());
    }
    tracing::debug!(
        key = %key_path,
        records = records.len(),
        groups = groups.len(),
        "grouped records"
    );
    Ok(groups)
}

/// Groups the sub-values at `projection_path` by the value at `key_path`.
///
/// Stores only the projected value of each record instead of the whole
/// record.
///
/// # Errors
///
/// Fails like [`group_records`], and additionally if `projection_path` is
/// missing in any record.
pub fn group_projected(
    records: &[Record],
    key_path: &FieldPath,
    projection_path: &FieldPath,
) -> Result<GroupMap<Vec<Value>>, AnalysisError> {
    let mut groups = GroupMap::new();
    for record in records {
        let key = GroupKey::from_record(record, key_path)?;
        let projected = record.resolve(projection_path.segments())?.clone();
        groups.get_or_insert_with(key, Vec::new).push(projected);
    }
    tracing::debug!(
        key = %key_path,
        projection = %projection_path,
        records = records.len(),
        groups = groups.len(),
        "grouped projected values"
    );
    Ok(groups)
}
