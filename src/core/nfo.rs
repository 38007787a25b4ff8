//! Kodi-style `<movie>` NFO documents.
//!
//! Field order and presence follow what Kodi and Jellyfin scrapers expect:
//!
//! ```text
//! title, plot, runtime, dateadded, aired, source, [premiered], uniqueid, actor
//! ```
//!
//! Season and episode are folded into the title because movie NFOs have
//! no fields for them.

use std::fmt::{Display, Write};

use chrono::{NaiveDate, TimeZone};

use crate::domain::{CastMember, CatalogRecord};

/// Value of the `<source>` element
pub const SOURCE_LABEL: &str = "MythTV";

/// `type` attribute of the `<uniqueid>` element
pub const UNIQUE_ID_TYPE: &str = "mythtv";

/// Extension of metadata files
pub const NFO_EXTENSION: &str = "nfo";

/// Everything written into one NFO file
#[derive(Debug, Clone, PartialEq)]
pub struct NfoDocument {
    pub title: String,
    pub plot: String,
    pub runtime_minutes: i64,
    pub date_added: String,
    pub aired: String,
    pub premiered: Option<String>,
    pub unique_id: String,
    pub cast: Vec<CastMember>,
}

impl NfoDocument {
    /// Build the document for a record, rendering dates in `tz`
    pub fn from_record<Tz>(record: &CatalogRecord, title: &str, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let start = record.start_time.with_timezone(tz);

        Self {
            title: title.to_string(),
            plot: record.description.clone().unwrap_or_default(),
            runtime_minutes: record.runtime_minutes(),
            date_added: start.format("%Y-%m-%d %H:%M:%S").to_string(),
            aired: start.format("%Y-%m-%d").to_string(),
            premiered: record.premiere_date.map(format_date),
            unique_id: record.file_name.clone(),
            cast: record.cast.clone(),
        }
    }

    /// Serialize as an indented, standalone UTF-8 XML document
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version='1.0' encoding='UTF-8' standalone='yes'?>\n");
        out.push_str("<movie>\n");

        text_element(&mut out, 1, "title", &self.title);
        text_element(&mut out, 1, "plot", &self.plot);
        text_element(&mut out, 1, "runtime", &self.runtime_minutes.to_string());
        text_element(&mut out, 1, "dateadded", &self.date_added);
        text_element(&mut out, 1, "aired", &self.aired);
        text_element(&mut out, 1, "source", SOURCE_LABEL);
        if let Some(premiered) = &self.premiered {
            text_element(&mut out, 1, "premiered", premiered);
        }

        let _ = writeln!(
            out,
            "  <uniqueid type=\"{}\" default=\"true\">{}</uniqueid>",
            UNIQUE_ID_TYPE,
            escape(&self.unique_id)
        );

        if self.cast.is_empty() {
            out.push_str("  <actor/>\n");
        } else {
            out.push_str("  <actor>\n");
            for member in &self.cast {
                text_element(&mut out, 2, "name", &member.name);
                text_element(&mut out, 2, "role", &member.role);
            }
            out.push_str("  </actor>\n");
        }

        out.push_str("</movie>\n");
        out
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn text_element(out: &mut String, depth: usize, name: &str, text: &str) {
    let indent = "  ".repeat(depth);
    if text.is_empty() {
        let _ = writeln!(out, "{indent}<{name}/>");
    } else {
        let _ = writeln!(out, "{indent}<{name}>{}</{name}>", escape(text));
    }
}

/// Escape text content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            // XML 1.0 forbids most control characters outright
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> CatalogRecord {
        CatalogRecord::new(
            "Nature Show",
            "Default",
            "rec1.ts",
            Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 20, 45, 0).unwrap(),
        )
        .with_description("Water & <stone>")
    }

    #[test]
    fn test_document_fields() {
        let doc = NfoDocument::from_record(&record(), "Nature Show - S02E05 - Rivers", &Utc);

        assert_eq!(doc.runtime_minutes, 45);
        assert_eq!(doc.date_added, "2024-01-01 20:00:00");
        assert_eq!(doc.aired, "2024-01-01");
        assert_eq!(doc.premiered, None);
        assert_eq!(doc.unique_id, "rec1.ts");
    }

    #[test]
    fn test_render_order_and_escaping() {
        let mut rec = record().with_cast_member("Ann", "Host");
        rec.premiere_date = NaiveDate::from_ymd_opt(1999, 3, 4);
        let xml = NfoDocument::from_record(&rec, "Nature Show", &Utc).render();

        let expected = "\
<?xml version='1.0' encoding='UTF-8' standalone='yes'?>
<movie>
  <title>Nature Show</title>
  <plot>Water &amp; &lt;stone&gt;</plot>
  <runtime>45</runtime>
  <dateadded>2024-01-01 20:00:00</dateadded>
  <aired>2024-01-01</aired>
  <source>MythTV</source>
  <premiered>1999-03-04</premiered>
  <uniqueid type=\"mythtv\" default=\"true\">rec1.ts</uniqueid>
  <actor>
    <name>Ann</name>
    <role>Host</role>
  </actor>
</movie>
";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_render_without_cast_or_premiere() {
        let xml = NfoDocument::from_record(&record(), "Nature Show", &Utc).render();

        assert!(!xml.contains("<premiered>"));
        assert!(xml.contains("  <actor/>\n"));
    }

    #[test]
    fn test_all_cast_members_in_one_actor_block() {
        let rec = record()
            .with_cast_member("Ann", "Host")
            .with_cast_member("Bob", "");
        let xml = NfoDocument::from_record(&rec, "Nature Show", &Utc).render();

        assert_eq!(xml.matches("<actor>").count(), 1);
        assert!(xml.contains("    <name>Bob</name>\n    <role/>\n"));
    }

    #[test]
    fn test_escape_strips_control_characters() {
        assert_eq!(escape("a\u{1}b\tc"), "ab\tc");
        assert_eq!(escape("\"q\""), "&quot;q&quot;");
    }
}
