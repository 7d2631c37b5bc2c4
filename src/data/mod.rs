//! Test data generation and cross-step data handoff.

use std::collections::HashMap;
use std::sync::Mutex;

use fake::faker::address::en::CityName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::reporting;

/// Generate one mock value by kind.
///
/// `format` is only consulted for `number`, where it carries a `min-max`
/// range (default 0-100). Unknown kinds produce a fresh UUID so a typo in a
/// scenario still yields usable, unique data.
pub fn generate(kind: &str, format: Option<&str>) -> String {
    match kind.to_lowercase().as_str() {
        "uuid" => Uuid::new_v4().to_string(),
        "email" | "safeemail" => SafeEmail().fake(),
        "name" | "fullname" => Name().fake(),
        "firstname" => FirstName().fake(),
        "phone" | "phonenumber" => PhoneNumber().fake(),
        "city" | "address" => CityName().fake(),
        "number" => {
            let (min, max) = number_range(format);
            rand::thread_rng().gen_range(min..=max).to_string()
        }
        other => {
            reporting::warn(format!("unknown data kind '{other}', generating a uuid"));
            Uuid::new_v4().to_string()
        }
    }
}

fn number_range(format: Option<&str>) -> (i64, i64) {
    let parsed = format.and_then(|range| {
        let (min, max) = range.split_once('-')?;
        Some((min.trim().parse().ok()?, max.trim().parse().ok()?))
    });
    match parsed {
        Some((min, max)) if min <= max => (min, max),
        _ => (0, 100),
    }
}

/// A generated customer, ready to serialize into an API payload.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRecord {
    pub first_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub reference: String,
}

impl CustomerRecord {
    /// A fresh record with a unique reference for correlating steps.
    pub fn generate() -> Self {
        let record = Self {
            first_name: FirstName().fake(),
            full_name: Name().fake(),
            email: SafeEmail().fake(),
            phone: PhoneNumber().fake(),
            city: CityName().fake(),
            reference: Uuid::new_v4().to_string(),
        };
        reporting::info(format!("generated customer record {}", record.reference));
        record
    }
}

/// Multi-value store for handing data between steps of one worker.
///
/// Keys accumulate values in insertion order; readers usually want the most
/// recent one.
#[derive(Debug, Default)]
pub struct DataStore {
    values: Mutex<HashMap<String, Vec<String>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`.
    pub fn record(&self, key: &str, value: impl Into<String>) {
        self.lock()
            .entry(key.to_string())
            .or_default()
            .push(value.into());
    }

    /// Every value recorded under `key`, oldest first.
    pub fn values(&self, key: &str) -> Vec<String> {
        self.lock().get(key).cloned().unwrap_or_default()
    }

    /// The most recently recorded value under `key`.
    pub fn latest(&self, key: &str) -> Option<String> {
        self.lock().get(key).and_then(|v| v.last().cloned())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<String>>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}
