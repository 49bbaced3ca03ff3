use serde::Serialize;
use std::collections::BTreeMap;

/// One extracted value before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Single-valued field; `None` when no rule matched
    Text(Option<String>),
    /// Multi-valued field in document order
    List(Vec<String>),
}

/// Field name to raw value, as produced by a field extractor for one page
///
/// Always carries `url`. Lives only for the duration of one fetch task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    /// Creates a record holding only the page URL
    pub fn new(url: &str) -> Self {
        let mut record = Self::default();
        record.set_text("url", Some(url.to_string()));
        record
    }

    pub fn set_text(&mut self, field: &str, value: Option<String>) {
        self.fields.insert(field.to_string(), RawValue::Text(value));
    }

    pub fn set_list(&mut self, field: &str, values: Vec<String>) {
        self.fields.insert(field.to_string(), RawValue::List(values));
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    /// Returns the text of a single-valued field, if present
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(RawValue::Text(Some(value))) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Field names in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A listing after normalization
///
/// Text fields are whitespace-collapsed and trimmed, or `None`; they are
/// serialized as `null` when absent. Derived numeric fields are only present
/// when they could be parsed and are omitted from the serialized form
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub mark: Option<String>,
    pub model: Option<String>,
    pub model_version: Option<String>,
    pub location: Option<String>,
    pub dealer_name: Option<String>,
    pub dealer_ratings: Option<String>,
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub milage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage_km: Option<u64>,
    pub gearbox: Option<String>,
    pub first_registration: Option<String>,
    pub fuel_type: Option<String>,
    pub power: Option<String>,
    #[serde(rename = "powerKW", skip_serializing_if = "Option::is_none")]
    pub power_kw: Option<u64>,
    #[serde(rename = "powerHP", skip_serializing_if = "Option::is_none")]
    pub power_hp: Option<u64>,
    pub seller: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub body_type: Option<String>,
    pub drivetrain: Option<String>,
    pub seats: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats_num: Option<u64>,
    pub engine_size: Option<String>,
    #[serde(rename = "engineSizeCC", skip_serializing_if = "Option::is_none")]
    pub engine_size_cc: Option<u64>,
    pub gears: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gears_num: Option<u64>,
    pub emission_class: Option<String>,
    pub comfort: Vec<String>,
    pub media: Vec<String>,
    pub safety: Vec<String>,
    pub extras: Vec<String>,
    pub colour: Option<String>,
    pub manufacturer_colour: Option<String>,
    pub production_date: Option<String>,
    pub images: Vec<String>,
}

impl NormalizedRecord {
    /// The record as a JSON object, keys in declaration order
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            // A struct of strings, integers and string lists always maps to an object
            _ => serde_json::Map::new(),
        }
    }
}
