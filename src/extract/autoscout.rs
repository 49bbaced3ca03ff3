//! AutoScout24 detail-page rule table
//!
//! `data-testid` selectors of the current markup come first, older class
//! based layouts follow as fallbacks.

use crate::extract::rules::FieldRule;
use crate::extract::{ExtractionError, FieldExtractor};
use crate::listing::RawRecord;
use scraper::Html;

type TextRule = (&'static str, &'static [&'static str]);

const TEXT_FIELDS: &[TextRule] = &[
    ("title", &[r#"h1[data-testid="heading"]"#, "h1", r#"h2[data-item-name="car-title"]"#]),
    ("price", &[r#"[data-testid="price-label"]"#, "div.price-block span", "span[data-item-name=price]"]),
    ("location", &[r#"[data-testid="seller-address"]"#, "div.seller-address", "span[itemprop=address]"]),
    ("dealerName", &[r#"[data-testid="seller-name"]"#, "div.dealer-info h2", ".cldt-vendor-contact-box h2"]),
    ("dealerRatings", &[r#"[data-testid="rating-count"]"#, "span.dealer-rating-count"]),
    ("mark", &[r#"[data-testid="makeLabel"]"#, "span[itemprop=brand]"]),
    ("model", &[r#"[data-testid="modelLabel"]"#, "span[itemprop=model]"]),
    ("modelVersion", &[r#"[data-testid="versionLabel"]"#, "span.model-version"]),
    ("milage", &[r#"[data-testid="mileage-label"]"#, "span.mileage", "dl[data-item-name=vehicle-details] dd:nth-of-type(1)"]),
    ("gearbox", &[r#"[data-testid="transmission-label"]"#, "span.gearbox"]),
    ("firstRegistration", &[r#"[data-testid="first-registration-label"]"#, "span.first-registration"]),
    ("fuelType", &[r#"[data-testid="fuel-label"]"#, "span.fuel"]),
    ("power", &[r#"[data-testid="power-label"]"#, "span.power"]),
    ("seller", &[r#"[data-testid="seller-type-label"]"#, "span.seller-type"]),
    ("contactName", &[r#"[data-testid="seller-contact-name"]"#, ".cldt-vendor-contact-box span"]),
    ("contactPhone", &[r#"[data-testid="seller-phone"]"#, "a[href^='tel:']"]),
    ("bodyType", &[r#"[data-testid="body-type-label"]"#, "span.body-type"]),
    ("drivetrain", &[r#"[data-testid="drive-type-label"]"#, "span.drivetrain"]),
    ("seats", &[r#"[data-testid="num-seats-label"]"#, "span.seats"]),
    ("engineSize", &[r#"[data-testid="cubic-capacity-label"]"#, "span.engine-size"]),
    ("gears", &[r#"[data-testid="gears-label"]"#, "span.gears"]),
    ("emissionClass", &[r#"[data-testid="emission-class-label"]"#, "span.emission-class"]),
    ("colour", &[r#"[data-testid="exterior-color-label"]"#, "span.exterior-color"]),
    ("manufacturerColour", &[r#"[data-testid="manufacturer-color-label"]"#, "span.manufacturer-color"]),
    ("productionDate", &[r#"[data-testid="production-date-label"]"#, "span.production-date"]),
];

const LIST_FIELDS: &[TextRule] = &[
    ("comfort", &[r#"[data-testid="comfort-features"] li"#, "ul.comfort-features li"]),
    ("media", &[r#"[data-testid="media-features"] li"#, "ul.media-features li"]),
    ("safety", &[r#"[data-testid="safety-features"] li"#, "ul.safety-features li"]),
    ("extras", &[r#"[data-testid="other-features"] li"#, "ul.extra-features li"]),
];

const IMAGE_SELECTORS: &[&str] = &["figure img, [data-testid='gallery'] img, .image-gallery img"];

const IMAGE_ATTRS: &[&str] = &["src", "data-src"];

/// Field extractor for AutoScout24 listing pages
#[derive(Debug, Clone)]
pub struct AutoScoutExtractor {
    rules: Vec<FieldRule>,
}

impl AutoScoutExtractor {
    /// Compiles the selector table
    pub fn new() -> Result<Self, ExtractionError> {
        let mut rules = Vec::with_capacity(TEXT_FIELDS.len() + LIST_FIELDS.len() + 1);

        for &(field, selectors) in TEXT_FIELDS {
            rules.push(FieldRule::text(field, selectors)?);
        }
        for &(field, selectors) in LIST_FIELDS {
            rules.push(FieldRule::list(field, selectors)?);
        }
        rules.push(FieldRule::attr("images", IMAGE_SELECTORS, IMAGE_ATTRS)?);

        Ok(Self { rules })
    }

    /// Names of every field this extractor fills, besides `url`
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(FieldRule::field)
    }
}

impl FieldExtractor for AutoScoutExtractor {
    fn extract(&self, html: &str, url: &str) -> Result<RawRecord, ExtractionError> {
        let document = Html::parse_document(html);
        let mut record = RawRecord::new(url);

        for rule in &self.rules {
            rule.apply(&document, &mut record);
        }

        Ok(record)
    }
}
