use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

use super::set::HandlerSet;
use crate::error::{Error, Result};

/// Name → [`HandlerSet`] mapping that keeps insertion order and rejects
/// duplicate names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerTable {
    label: &'static str,
    entries: Vec<(String, HandlerSet)>,
}

impl HandlerTable {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, set: HandlerSet) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(Error::DuplicateKey {
                table: self.label,
                key: name,
            });
        }
        self.entries.push((name, set));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&HandlerSet> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, set)| set)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HandlerSet)> {
        self.entries.iter().map(|(name, set)| (name.as_str(), set))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Serialize for HandlerTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, set) in &self.entries {
            map.serialize_entry(name, set)?;
        }
        map.end()
    }
}

/// Raw object entries in document order, duplicates included
#[derive(Debug, Default)]
pub(crate) struct OrderedEntries<T>(pub Vec<(String, T)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = OrderedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(OrderedEntries(Vec::new()))
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_any(EntriesVisitor(PhantomData))
    }
}

impl HandlerTable {
    pub(crate) fn from_entries(
        label: &'static str,
        entries: OrderedEntries<HandlerSet>,
    ) -> Result<Self> {
        let mut table = Self::new(label);
        for (name, set) in entries.0 {
            table.insert(name, set)?;
        }
        Ok(table)
    }
}
