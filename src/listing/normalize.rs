//! Normalization from [`RawRecord`] to [`NormalizedRecord`].
//!
//! Everything here is pure: no I/O, and equal inputs give equal outputs.
//! Derived numeric fields are left as `None` when their source text does not
//! parse; nothing defaults to zero.

use crate::listing::record::{NormalizedRecord, RawRecord, RawValue};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Normalizes one extracted listing
///
/// # Example
///
/// ```
/// use autoscout_scraper::listing::{normalize, RawRecord};
///
/// let mut raw = RawRecord::new("https://www.autoscout24.com/offers/bmw-x5-1");
/// raw.set_text("price", Some("€ 31,980".to_string()));
/// raw.set_text("power", Some("240 kW (326 hp)".to_string()));
///
/// let record = normalize(&raw);
/// assert_eq!(record.raw_price, Some(31980));
/// assert_eq!(record.currency.as_deref(), Some("EUR"));
/// assert_eq!(record.power_kw, Some(240));
/// assert_eq!(record.power_hp, Some(326));
/// ```
pub fn normalize(raw: &RawRecord) -> NormalizedRecord {
    let text = |field: &str| field_text(raw, field);

    let price = text("price");
    let (raw_price, currency) = parse_price(price.as_deref());

    let milage = text("milage");
    let mileage_km = extract_number(milage.as_deref());

    let power = text("power");
    let (power_kw, power_hp) = parse_power(power.as_deref());

    let seats = text("seats");
    let engine_size = text("engineSize");
    let gears = text("gears");

    NormalizedRecord {
        title: text("title"),
        url: text("url"),
        mark: text("mark"),
        model: text("model"),
        model_version: text("modelVersion"),
        location: text("location"),
        dealer_name: text("dealerName"),
        dealer_ratings: text("dealerRatings"),
        raw_price,
        currency: currency.map(str::to_string),
        price,
        mileage_km,
        milage,
        gearbox: text("gearbox"),
        first_registration: text("firstRegistration"),
        fuel_type: text("fuelType"),
        power_kw,
        power_hp,
        power,
        seller: text("seller"),
        contact_name: text("contactName"),
        contact_phone: text("contactPhone"),
        body_type: text("bodyType"),
        drivetrain: text("drivetrain"),
        seats_num: extract_number(seats.as_deref()),
        seats,
        engine_size_cc: extract_number(engine_size.as_deref()),
        engine_size,
        gears_num: extract_number(gears.as_deref()),
        gears,
        emission_class: text("emissionClass"),
        comfort: normalize_list(raw.get("comfort")),
        media: normalize_list(raw.get("media")),
        safety: normalize_list(raw.get("safety")),
        extras: normalize_list(raw.get("extras")),
        colour: text("colour"),
        manufacturer_colour: text("manufacturerColour"),
        production_date: text("productionDate"),
        images: normalize_images(raw.get("images")),
    }
}

/// Collapses whitespace runs to one space and trims; empty becomes `None`
pub fn clean_text(value: &str) -> Option<String> {
    let cleaned = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Cleaned text of a single-valued field; a list is read as its joined items
fn field_text(raw: &RawRecord, field: &str) -> Option<String> {
    match raw.get(field)? {
        RawValue::Text(value) => value.as_deref().and_then(clean_text),
        RawValue::List(items) => clean_text(&items.join(", ")),
    }
}

/// Splits a price string into an integer amount and a currency code
///
/// Currency is detected by precedence: `€`/`EUR`, then `$`/`USD`, then
/// `CHF`. The amount is every digit in the string concatenated. When the
/// digits do not fit an integer the amount is `None` but the currency stays.
pub fn parse_price(value: Option<&str>) -> (Option<u64>, Option<&'static str>) {
    let Some(text) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return (None, None);
    };

    let upper = text.to_uppercase();
    let currency = if text.contains('€') || upper.contains("EUR") {
        Some("EUR")
    } else if text.contains('$') || upper.contains("USD") {
        Some("USD")
    } else if upper.contains("CHF") {
        Some("CHF")
    } else {
        None
    };

    (extract_number(Some(text)), currency)
}

/// Keeps only the ASCII digits and parses them as an integer
///
/// Returns `None` for absent input, input without digits, or overflow.
pub fn extract_number(value: Option<&str>) -> Option<u64> {
    let digits: String = value?.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

static KW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*kW").expect("valid kW regex"));

static HP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*hp").expect("valid hp regex"));

/// Reads kW and hp figures from one power string
///
/// The two patterns are matched independently; `kW` is case-sensitive,
/// `hp` is not.
pub fn parse_power(value: Option<&str>) -> (Option<u64>, Option<u64>) {
    let Some(text) = value.filter(|s| !s.is_empty()) else {
        return (None, None);
    };

    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    };

    (capture(&KW_RE), capture(&HP_RE))
}

/// Canonicalizes a feature list field
///
/// Lists are cleaned item by item, strings are split on `;` or `,`. Empty
/// items are dropped; duplicates are kept.
pub fn normalize_list(value: Option<&RawValue>) -> Vec<String> {
    match value {
        Some(RawValue::List(items)) => items.iter().filter_map(|s| clean_text(s)).collect(),
        Some(RawValue::Text(Some(text))) => text
            .split(|c| c == ';' || c == ',')
            .filter_map(clean_text)
            .collect(),
        Some(RawValue::Text(None)) | None => Vec::new(),
    }
}

/// Canonicalizes image URLs: cleaned, non-empty, first occurrence kept
pub fn normalize_images(value: Option<&RawValue>) -> Vec<String> {
    let items: Vec<&str> = match value {
        Some(RawValue::List(items)) => items.iter().map(String::as_str).collect(),
        Some(RawValue::Text(Some(text))) => vec![text.as_str()],
        Some(RawValue::Text(None)) | None => Vec::new(),
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(clean_text)
        .filter(|img| seen.insert(img.clone()))
        .collect()
}
