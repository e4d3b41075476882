use super::error::{NodeError, SlotResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::fmt;

/// Types that can live in a slot.
///
/// Blanket-implemented; the serde bounds let hosts feed parameter values
/// from JSON and let the registry report defaults.
pub trait SlotValue: Any + Send + Clone + fmt::Debug + Serialize + DeserializeOwned {}

impl<T> SlotValue for T where T: Any + Send + Clone + fmt::Debug + Serialize + DeserializeOwned {}

/// Object-safe view of a stored value.
trait ErasedValue: Send + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedValue>;
    fn to_json(&self) -> serde_json::Result<Value>;
}

impl<T: SlotValue> ErasedValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValue> {
        Box::new(self.clone())
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

type ParseFn = fn(&Value) -> serde_json::Result<Box<dyn ErasedValue>>;

fn parse_value<T: SlotValue>(json: &Value) -> serde_json::Result<Box<dyn ErasedValue>> {
    let value: T = serde_json::from_value(json.clone())?;
    Ok(Box::new(value))
}

/// A value already checked against a slot's declared type, waiting to be
/// stored.
pub(crate) struct ParsedValue(Box<dyn ErasedValue>);

/// A single named cell. The type tag is fixed at declaration.
pub struct Slot {
    type_id: TypeId,
    type_name: &'static str,
    doc: String,
    default: Option<Box<dyn ErasedValue>>,
    value: Option<Box<dyn ErasedValue>>,
    parse: ParseFn,
}

impl Slot {
    pub(crate) fn new<T: SlotValue>(doc: impl Into<String>, default: Option<T>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            doc: doc.into(),
            default: default.map(|d| Box::new(d) as Box<dyn ErasedValue>),
            value: None,
            parse: parse_value::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn is<T: SlotValue>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// True once a value has been written or a default materialised.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Readable means either a value or a default is present.
    pub fn is_readable(&self) -> bool {
        self.value.is_some() || self.default.is_some()
    }

    /// Same-type redeclaration: new doc and default, current value kept.
    pub(crate) fn redeclare<T: SlotValue>(&mut self, doc: impl Into<String>, default: Option<T>) {
        self.doc = doc.into();
        self.default = default.map(|d| Box::new(d) as Box<dyn ErasedValue>);
    }

    fn check<T: SlotValue>(&self, name: &str) -> SlotResult<()> {
        if self.is::<T>() {
            Ok(())
        } else {
            Err(self.mismatch::<T>(name))
        }
    }

    fn mismatch<T>(&self, name: &str) -> NodeError {
        NodeError::TypeMismatch {
            name: name.to_string(),
            expected: self.type_name,
            actual: std::any::type_name::<T>(),
        }
    }

    pub(crate) fn get<T: SlotValue>(&self, name: &str) -> SlotResult<&T> {
        self.check::<T>(name)?;
        let cell = self
            .value
            .as_ref()
            .or(self.default.as_ref())
            .ok_or_else(|| NodeError::UninitializedSlot {
                name: name.to_string(),
            })?;
        cell.as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| self.mismatch::<T>(name))
    }

    /// Mutable access. An unset slot with a default gets a copy of the
    /// default written into it first, so later mutations persist.
    pub(crate) fn get_mut<T: SlotValue>(&mut self, name: &str) -> SlotResult<&mut T> {
        self.check::<T>(name)?;
        if self.value.is_none() {
            let default = self
                .default
                .as_ref()
                .ok_or_else(|| NodeError::UninitializedSlot {
                    name: name.to_string(),
                })?;
            self.value = Some(default.clone_boxed());
        }

        let expected = self.type_name;
        self.value
            .as_mut()
            .and_then(|cell| cell.as_any_mut().downcast_mut::<T>())
            .ok_or_else(|| NodeError::TypeMismatch {
                name: name.to_string(),
                expected,
                actual: std::any::type_name::<T>(),
            })
    }

    pub(crate) fn set<T: SlotValue>(&mut self, name: &str, value: T) -> SlotResult<()> {
        self.check::<T>(name)?;
        self.value = Some(Box::new(value));
        Ok(())
    }

    pub(crate) fn set_json(&mut self, name: &str, json: &Value) -> SlotResult<()> {
        let parsed = self.parse_json(name, json)?;
        self.store(parsed);
        Ok(())
    }

    /// Parse `json` as the declared type without touching the slot.
    pub(crate) fn parse_json(&self, name: &str, json: &Value) -> SlotResult<ParsedValue> {
        (self.parse)(json)
            .map(ParsedValue)
            .map_err(|source| NodeError::InvalidValue {
                name: name.to_string(),
                expected: self.type_name,
                source,
            })
    }

    /// Write a value produced by this slot's own [`Slot::parse_json`].
    pub(crate) fn store(&mut self, parsed: ParsedValue) {
        self.value = Some(parsed.0);
    }

    /// Drop the current value; reads fall back to the default again.
    pub(crate) fn clear(&mut self) {
        self.value = None;
    }

    /// JSON view of the readable value, if any.
    pub fn to_json(&self) -> Option<Value> {
        self.value
            .as_ref()
            .or(self.default.as_ref())
            .and_then(|cell| cell.to_json().ok())
    }

    pub fn info(&self, name: &str) -> SlotInfo {
        SlotInfo {
            name: name.to_string(),
            type_name: self.type_name.to_string(),
            doc: self.doc.clone(),
            required: self.default.is_none(),
            has_value: self.value.is_some(),
            default: self.default.as_ref().and_then(|d| d.to_json().ok()),
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("type", &self.type_name)
            .field("doc", &self.doc)
            .field("default", &self.default)
            .field("value", &self.value)
            .finish()
    }
}

/// Serializable description of a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub doc: String,
    pub required: bool,
    pub has_value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}
