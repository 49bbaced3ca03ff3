//! XML and RSS 2.0 export
//!
//! Both formats are written event by event with `quick_xml::Writer`, which
//! escapes text content.

use crate::listing::NormalizedRecord;
use crate::output::{into_utf8, record_maps, render_value, ExportError};
use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const FEED_TITLE: &str = "Autoscout24 Scraper Feed";
const FEED_LINK: &str = "https://www.autoscout24.com";
const FEED_DESCRIPTION: &str = "Vehicle listings collected by autoscout-scraper";
const DEFAULT_ITEM_TITLE: &str = "Car listing";

fn new_writer() -> Result<Writer<Vec<u8>>, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), ExportError> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Renders records as `<listings><listing><field>value</field>...`
///
/// Fields keep record key order; lists are joined with `"; "`.
pub fn format_xml(records: &[NormalizedRecord]) -> Result<String, ExportError> {
    let mut writer = new_writer()?;
    writer.write_event(Event::Start(BytesStart::new("listings")))?;

    for row in record_maps(records) {
        writer.write_event(Event::Start(BytesStart::new("listing")))?;
        for (key, value) in &row {
            write_text_element(&mut writer, key, &render_value(value))?;
        }
        writer.write_event(Event::End(BytesEnd::new("listing")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("listings")))?;
    into_utf8(writer.into_inner())
}

/// Renders records as an RSS 2.0 feed, one item per record
pub fn format_rss(records: &[NormalizedRecord]) -> Result<String, ExportError> {
    let mut writer = new_writer()?;
    writer.write_event(Event::Start(
        BytesStart::new("rss").with_attributes([("version", "2.0")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", FEED_TITLE)?;
    write_text_element(&mut writer, "link", FEED_LINK)?;
    write_text_element(&mut writer, "description", FEED_DESCRIPTION)?;
    write_text_element(&mut writer, "lastBuildDate", &Utc::now().to_rfc2822())?;

    for record in records {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(
            &mut writer,
            "title",
            record.title.as_deref().unwrap_or(DEFAULT_ITEM_TITLE),
        )?;
        write_text_element(&mut writer, "link", record.url.as_deref().unwrap_or_default())?;
        write_text_element(
            &mut writer,
            "description",
            record.dealer_name.as_deref().unwrap_or_default(),
        )?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;
    into_utf8(writer.into_inner())
}
