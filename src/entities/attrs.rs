//! Generic attribute storage shared by strips and scenes.
//!
//! Typed wrappers (`Strip`, `Scene`) keep their persistent state here and
//! expose accessors on top. Every `set()` that actually changes a value marks
//! the container dirty; the sync updater reads the dirty flag of the master
//! timeline to know that cached resolutions are stale.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Generic attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Bool(bool),
    Str(String),
    Int(i32),
    Float(f32),
}

/// Attribute container: string key -> typed value, with change tracking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attrs {
    #[serde(default)]
    map: HashMap<String, AttrValue>,
    /// Runtime only. Loaded containers start clean.
    #[serde(skip)]
    dirty: bool,
}

impl Attrs {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            dirty: false,
        }
    }

    /// Set a value. Marks dirty only if the stored value changed.
    pub fn set(&mut self, key: impl Into<String>, value: AttrValue) {
        let key = key.into();
        if self.map.get(&key) == Some(&value) {
            return;
        }
        self.map.insert(key, value);
        self.dirty = true;
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.map.get(key) {
            Some(AttrValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        match self.map.get(key) {
            Some(AttrValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.map.get(key) {
            Some(AttrValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.map.get(key) {
            Some(AttrValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get i32 value with default fallback of 0
    pub fn get_i32_or_zero(&self, key: &str) -> i32 {
        self.get_i32(key).unwrap_or(0)
    }

    pub fn get_i32_or(&self, key: &str, default: i32) -> i32 {
        self.get_i32(key).unwrap_or(default)
    }

    pub fn get_float_or(&self, key: &str, default: f32) -> f32 {
        self.get_float(key).unwrap_or(default)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    // UUIDs are stored as strings so saved sessions stay readable.

    pub fn set_uuid(&mut self, key: impl Into<String>, uuid: Uuid) {
        self.set(key, AttrValue::Str(uuid.to_string()));
    }

    pub fn get_uuid(&self, key: &str) -> Option<Uuid> {
        self.get_str(key).and_then(|s| Uuid::parse_str(s).ok())
    }

    /// Store an optional reference. `None` removes the key.
    pub fn set_opt_uuid(&mut self, key: &str, uuid: Option<Uuid>) {
        match uuid {
            Some(uuid) => self.set_uuid(key, uuid),
            None => {
                if self.map.remove(key).is_some() {
                    self.dirty = true;
                }
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
