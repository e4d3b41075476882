//! Named, ordered collection of typed slots.
//!
//! Every node owns three of these: parameters, inputs and outputs. Slots are
//! declared once with a type and accessed thereafter through typed getters
//! that hand out references into the container's own storage, so a write
//! through [`Tendrils::get_mut`] in one process call is still there on the
//! next one.

use super::error::{NodeError, SlotResult};
use super::slot::{Slot, SlotInfo, SlotValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A slot container. Iteration order is by slot name.
#[derive(Debug, Default)]
pub struct Tendrils {
    slots: BTreeMap<String, Slot>,
}

impl Tendrils {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a slot with no default. Reading it before a write fails.
    pub fn declare<T: SlotValue>(&mut self, name: &str, doc: &str) -> SlotResult<()> {
        self.declare_slot::<T>(name, doc, None)
    }

    pub fn declare_with_default<T: SlotValue>(
        &mut self,
        name: &str,
        doc: &str,
        default: T,
    ) -> SlotResult<()> {
        self.declare_slot(name, doc, Some(default))
    }

    fn declare_slot<T: SlotValue>(
        &mut self,
        name: &str,
        doc: &str,
        default: Option<T>,
    ) -> SlotResult<()> {
        match self.slots.get_mut(name) {
            Some(existing) if existing.is::<T>() => {
                existing.redeclare(doc, default);
                Ok(())
            }
            Some(existing) => Err(NodeError::DuplicateSlot {
                name: name.to_string(),
                existing: existing.type_name(),
                requested: std::any::type_name::<T>(),
            }),
            None => {
                self.slots.insert(name.to_string(), Slot::new(doc, default));
                Ok(())
            }
        }
    }

    fn slot(&self, name: &str) -> SlotResult<&Slot> {
        self.slots.get(name).ok_or_else(|| NodeError::UnknownSlot {
            name: name.to_string(),
        })
    }

    fn slot_mut(&mut self, name: &str) -> SlotResult<&mut Slot> {
        self.slots.get_mut(name).ok_or_else(|| NodeError::UnknownSlot {
            name: name.to_string(),
        })
    }

    pub fn get<T: SlotValue>(&self, name: &str) -> SlotResult<&T> {
        self.slot(name)?.get(name)
    }

    /// Live mutable reference into the slot's storage.
    pub fn get_mut<T: SlotValue>(&mut self, name: &str) -> SlotResult<&mut T> {
        self.slot_mut(name)?.get_mut(name)
    }

    pub fn set<T: SlotValue>(&mut self, name: &str, value: T) -> SlotResult<()> {
        self.slot_mut(name)?.set(name, value)
    }

    /// Write a value given as JSON; it must deserialize to the declared type.
    pub fn set_json(&mut self, name: &str, value: &Value) -> SlotResult<()> {
        self.slot_mut(name)?.set_json(name, value)
    }

    /// Apply every key of a JSON object as with [`Tendrils::set_json`].
    ///
    /// All keys are checked before any is written: an unknown slot or a
    /// badly typed value leaves the container unchanged.
    pub fn load_json(&mut self, values: &Value) -> SlotResult<()> {
        let object = values.as_object().ok_or_else(|| {
            NodeError::InvalidData(format!("expected a JSON object, got {values}"))
        })?;

        let mut staged = Vec::with_capacity(object.len());
        for (name, value) in object {
            staged.push((name, self.slot(name)?.parse_json(name, value)?));
        }
        for (name, parsed) in staged {
            self.slot_mut(name)?.store(parsed);
        }
        Ok(())
    }

    /// Reset a slot so that reads see its default again.
    pub fn clear(&mut self, name: &str) -> SlotResult<()> {
        self.slot_mut(name)?.clear();
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// True if the slot was written (or had its default materialised).
    pub fn is_set(&self, name: &str) -> SlotResult<bool> {
        Ok(self.slot(name)?.has_value())
    }

    /// Slots without a default are required.
    pub fn is_required(&self, name: &str) -> SlotResult<bool> {
        Ok(!self.slot(name)?.has_default())
    }

    /// Required slots that currently have nothing to read.
    pub fn missing_required(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|(_, slot)| !slot.is_readable())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = SlotInfo> + '_ {
        self.slots.iter().map(|(name, slot)| slot.info(name))
    }

    /// Snapshot of every readable slot.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .slots
            .iter()
            .filter_map(|(name, slot)| slot.to_json().map(|v| (name.clone(), v)))
            .collect();
        Value::Object(map)
    }
}

impl fmt::Display for Tendrils {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, slot) in &self.slots {
            write!(f, " - {} [{}]", name, slot.type_name())?;
            if !slot.doc().is_empty() {
                write!(f, " {}", slot.doc())?;
            }
            match slot.info(name).default {
                Some(default) => writeln!(f, " (default: {})", default)?,
                None => writeln!(f, " (required)")?,
            }
        }
        Ok(())
    }
}
