// Form field keys and the per-form value store
//
// Each form declares its fields as an enum, so an unknown field name cannot be
// constructed from code. Names arriving as strings go through `FromStr`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A fixed set of field names known when the form is designed.
pub trait FieldKey: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Every declared key, in display order.
    const ALL: &'static [Self];

    /// Wire name, as used in submission payloads.
    fn name(self) -> &'static str;

    /// Human label shown next to the input.
    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field name '{0}'")]
pub struct UnknownField(pub String);

fn parse_key<K: FieldKey>(s: &str) -> Result<K, UnknownField> {
    K::ALL
        .iter()
        .copied()
        .find(|k| k.name() == s)
        .ok_or_else(|| UnknownField(s.to_string()))
}

// =========================
// Contact form
// =========================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Message,
}

impl FieldKey for ContactField {
    const ALL: &'static [Self] = &[Self::Name, Self::Email, Self::Phone, Self::Message];

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Message => "message",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Message => "Message",
        }
    }
}

impl FromStr for ContactField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s)
    }
}

// =========================
// Quote wizard
// =========================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteField {
    // Basic information
    Name,
    Email,
    Phone,
    // Property details
    Address,
    PropertyType,
    RoofType,
    MonthlyBill,
    // System preferences
    SystemType,
    BatteryStorage,
    Budget,
    Notes,
}

impl FieldKey for QuoteField {
    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::PropertyType,
        Self::RoofType,
        Self::MonthlyBill,
        Self::SystemType,
        Self::BatteryStorage,
        Self::Budget,
        Self::Notes,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::PropertyType => "propertyType",
            Self::RoofType => "roofType",
            Self::MonthlyBill => "monthlyBill",
            Self::SystemType => "systemType",
            Self::BatteryStorage => "batteryStorage",
            Self::Budget => "budget",
            Self::Notes => "notes",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Full Name",
            Self::Email => "Email Address",
            Self::Phone => "Phone Number",
            Self::Address => "Property Address",
            Self::PropertyType => "Property Type",
            Self::RoofType => "Roof Type",
            Self::MonthlyBill => "Average Monthly Electricity Bill",
            Self::SystemType => "System Type",
            Self::BatteryStorage => "Battery Storage",
            Self::Budget => "Budget Range",
            Self::Notes => "Additional Notes",
        }
    }
}

impl QuoteField {
    /// Every field except the free-form notes is marked required on the form.
    pub fn is_required(self) -> bool {
        !matches!(self, Self::Notes)
    }
}

impl FromStr for QuoteField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s)
    }
}

// =========================
// Value store
// =========================

/// Current value of every declared field of one form.
///
/// Always holds all keys of `K`; a value may be the empty string but a key is
/// never missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues<K: FieldKey> {
    values: BTreeMap<K, String>,
}

impl<K: FieldKey> FieldValues<K> {
    pub fn new() -> Self {
        Self {
            values: K::ALL.iter().map(|k| (*k, String::new())).collect(),
        }
    }

    /// Replace the value of a single field.
    pub fn set(&mut self, key: K, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: K) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or("")
    }

    /// The full mapping (review display and submission payload).
    pub fn all(&self) -> &BTreeMap<K, String> {
        &self.values
    }

    /// Restore every field to the empty string in one step.
    pub fn reset(&mut self) {
        for v in self.values.values_mut() {
            v.clear();
        }
    }

    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.is_empty())
    }

    /// Flat `wire name -> value` mapping handed to the backend.
    pub fn to_wire(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(k, v)| (k.name().to_string(), v.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl<K: FieldKey> Default for FieldValues<K> {
    fn default() -> Self {
        Self::new()
    }
}
