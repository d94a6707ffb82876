// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed key/value configuration with a flat text encoding.
//!
//! A [`ConfigStore`] holds typed values (string, float, int, bool) under
//! string keys and encodes to one `key = value` per line. Getters take a
//! default; with auto-create enabled a miss inserts the default, so saving
//! the store after first use writes out every key the application touched.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// UTF-8 text, quoted in the file encoding.
    String(String),
    /// 32-bit float; always encoded with a decimal point so it re-parses as
    /// a float.
    Float(f32),
    /// 64-bit signed integer.
    Int(i64),
    /// `true` / `false`.
    Bool(bool),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => write!(f, "\"{s}\""),
            ConfigValue::Float(v) if v.fract() == 0.0 => write!(f, "{v:.1}"),
            ConfigValue::Float(v) => write!(f, "{v}"),
            ConfigValue::Int(v) => write!(f, "{v}"),
            ConfigValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Thread-safe store of typed configuration values.
#[derive(Debug)]
pub struct ConfigStore {
    name: String,
    auto_create: AtomicBool,
    values: Mutex<BTreeMap<String, ConfigValue>>,
}

impl ConfigStore {
    /// An empty store with auto-create disabled.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_create: AtomicBool::new(false),
            values: Mutex::new(BTreeMap::new()),
        }
    }

    /// The store's name (usually the file it was loaded from).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Makes getters insert their default under the key on a miss.
    pub fn enable_auto_create(&self) {
        self.auto_create.store(true, Ordering::SeqCst);
    }

    /// Whether auto-create is enabled.
    pub fn auto_create(&self) -> bool {
        self.auto_create.load(Ordering::SeqCst)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: ConfigValue) {
        self.values.lock().unwrap().insert(key.into(), value);
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().unwrap().contains_key(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.lock().unwrap().is_empty()
    }

    fn get_with<T>(
        &self,
        key: &str,
        default: T,
        extract: impl Fn(&ConfigValue) -> Option<T>,
        wrap: impl Fn(&T) -> ConfigValue,
    ) -> T {
        let mut values = self.values.lock().unwrap();
        match values.get(key) {
            Some(value) => match extract(value) {
                Some(typed) => typed,
                // Present but the wrong type: hand back the default without
                // clobbering what is stored.
                None => default,
            },
            None => {
                if self.auto_create.load(Ordering::SeqCst) {
                    values.insert(key.to_string(), wrap(&default));
                }
                default
            }
        }
    }

    /// String value under `key`, or `default`.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_with(
            key,
            default.to_string(),
            |v| match v {
                ConfigValue::String(s) => Some(s.clone()),
                _ => None,
            },
            |d| ConfigValue::String(d.clone()),
        )
    }

    /// Float value under `key`, or `default`.
    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get_with(
            key,
            default,
            |v| match v {
                ConfigValue::Float(f) => Some(*f),
                _ => None,
            },
            |d| ConfigValue::Float(*d),
        )
    }

    /// Integer value under `key`, or `default`.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_with(
            key,
            default,
            |v| match v {
                ConfigValue::Int(i) => Some(*i),
                _ => None,
            },
            |d| ConfigValue::Int(*d),
        )
    }

    /// Boolean value under `key`, or `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_with(
            key,
            default,
            |v| match v {
                ConfigValue::Bool(b) => Some(*b),
                _ => None,
            },
            |d| ConfigValue::Bool(*d),
        )
    }

    /// Encodes the store as flat `key = value` text, keys sorted.
    pub fn to_text(&self) -> String {
        let values = self.values.lock().unwrap();
        let mut out = String::new();
        for (key, value) in values.iter() {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(&value.to_string());
            out.push('\n');
        }
        out
    }

    /// Parses flat `key = value` text into a store.
    ///
    /// Blank lines and `#` comments are skipped. Value types are inferred:
    /// quoted → string, `true`/`false` → bool, integral → int, numeric with
    /// a decimal point → float, anything else → unquoted string.
    pub fn from_text(name: impl Into<String>, text: &str) -> Result<Self, &'static str> {
        let store = Self::new(name);
        {
            let mut values = store.values.lock().unwrap();
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let (key, raw) = line
                    .split_once('=')
                    .ok_or("config line is not of the form key = value")?;
                let key = key.trim();
                if key.is_empty() {
                    return Err("config line has an empty key");
                }
                values.insert(key.to_string(), parse_value(raw.trim()));
            }
        }
        Ok(store)
    }
}

fn parse_value(raw: &str) -> ConfigValue {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return ConfigValue::String(raw[1..raw.len() - 1].to_string());
    }
    match raw {
        "true" => return ConfigValue::Bool(true),
        "false" => return ConfigValue::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return ConfigValue::Int(i);
    }
    if let Ok(f) = raw.parse::<f32>() {
        return ConfigValue::Float(f);
    }
    ConfigValue::String(raw.to_string())
}
