use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

pub type ItemId = i64;
/// Position of an item inside a [`Corpus`]; the join key for every derived structure.
pub type Position = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Never null once loaded: absent or null descriptions become "".
    pub description: String,
}

impl Item {
    pub fn new(id: ItemId, description: impl Into<String>) -> Self {
        Self { id, description: description.into() }
    }
}

/// Ordered item collection for a single call.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    items: Vec<Item>,
}

impl Corpus {
    pub fn new(items: Vec<Item>) -> Self { Self { items } }

    /// Parse a JSON array of `{id, description}` records.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> Result<Self> {
        let records = value
            .as_array()
            .ok_or_else(|| RecommendError::Parse("expected a JSON array of items".into()))?;
        let items = records
            .iter()
            .enumerate()
            .map(|(pos, record)| parse_record(pos, record))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(num_items = items.len(), "loaded corpus");
        Ok(Self { items })
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn items(&self) -> &[Item] { &self.items }

    pub fn get(&self, pos: Position) -> Option<&Item> { self.items.get(pos) }

    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.description.as_str())
    }

    /// Build the id → position map, keeping the first position seen for each id.
    pub fn index_map(&self) -> IndexMap {
        let mut positions = HashMap::with_capacity(self.items.len());
        for (pos, item) in self.items.iter().enumerate() {
            match positions.entry(item.id) {
                Entry::Vacant(slot) => { slot.insert(pos); }
                Entry::Occupied(first) => {
                    tracing::warn!(id = item.id, first = *first.get(), shadowed = pos, "duplicate item id");
                }
            }
        }
        IndexMap { positions }
    }
}

fn parse_record(pos: Position, record: &Value) -> Result<Item> {
    let obj = record
        .as_object()
        .ok_or_else(|| RecommendError::Parse(format!("item at position {pos} is not an object")))?;
    let id = match obj.get("id") {
        None | Some(Value::Null) => {
            return Err(RecommendError::Parse(format!("item at position {pos} has no id")));
        }
        Some(v) => v
            .as_i64()
            .ok_or_else(|| RecommendError::Parse(format!("item at position {pos} has a non-integer id: {v}")))?,
    };
    let description = match obj.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(RecommendError::Parse(format!(
                "item {id} at position {pos} has a non-text description: {other}"
            )));
        }
    };
    Ok(Item { id, description })
}

/// Lookup from external id to corpus position.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    positions: HashMap<ItemId, Position>,
}

impl IndexMap {
    pub fn position(&self, id: ItemId) -> Option<Position> { self.positions.get(&id).copied() }

    pub fn len(&self) -> usize { self.positions.len() }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }
}
