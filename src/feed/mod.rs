//! # Feed Document Writer
//!
//! Turns harvested vacancies into the XML feed consumed by job-board
//! integrations and writes it to `<output-dir>/nordsee.xml`.
//!
//! ## Layout
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <vacancies>
//!   <position>
//!     <link>https://karriere.nordsee.com/de/Koch-mw-j1234.html</link>
//!     <identifier>1234</identifier>
//!     <title>Koch (m/w)</title>
//!     <start_date/>
//!     <kind/>
//!     <description><![CDATA[...]]></description>
//!     <top_location>Berlin</top_location>
//!     <locations>
//!       <location>Berlin</location>
//!     </locations>
//!     <images/>
//!     <company>
//!       <name>NORDSEE GmbH</name>
//!       <address>
//!         <street/>
//!         <zip/>
//!         <city>Berlin</city>
//!       </address>
//!     </company>
//!     <contact_email>fallback@jobufo.com</contact_email>
//!   </position>
//! </vacancies>
//! ```
//!
//! Fields the site does not provide are written as empty elements rather than
//! omitted, and a vacancy without identifier gets `<identifier/>`.
//!
//! The same records always render to the same bytes.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::config::{FEED_FILENAME, SUMMARY_FILENAME};
use crate::models::{RunSummary, VacancyRecord};

pub const COMPANY_NAME: &str = "NORDSEE GmbH";
pub const CONTACT_EMAIL: &str = "fallback@jobufo.com";

const INDENT: &str = "  ";

/// Writes feed documents into a fixed output directory
#[derive(Debug, Clone)]
pub struct FeedWriter {
    output_dir: PathBuf,
}

impl FeedWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Renders `records` and replaces the feed file, creating the directory if needed.
    ///
    /// Returns the absolute path of the written file.
    pub async fn write(&self, records: &[VacancyRecord]) -> Result<PathBuf> {
        let document = render(records)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let path = self.output_dir.join(FEED_FILENAME);
        tokio::fs::write(&path, document)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let path = tokio::fs::canonicalize(&path).await?;
        info!("Wrote {} vacancies to {}", records.len(), path.display());
        Ok(path)
    }

    /// Stores the run summary as pretty JSON next to the feed
    pub async fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let path = self.output_dir.join(SUMMARY_FILENAME);
        let json = serde_json::to_vec_pretty(summary)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Serializes `records` into the feed document
pub fn render(records: &[VacancyRecord]) -> Result<Vec<u8>> {
    let mut doc = FeedDocument::new(Vec::new());

    doc.writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    if records.is_empty() {
        doc.line()?;
        doc.writer.write_event(Event::Empty(BytesStart::new("vacancies")))?;
    } else {
        doc.open("vacancies")?;
        for record in records {
            write_record(&mut doc, record)?;
        }
        doc.close("vacancies")?;
    }
    doc.writer.get_mut().write_all(b"\n")?;

    Ok(doc.writer.into_inner())
}

fn write_record<W: Write>(doc: &mut FeedDocument<W>, record: &VacancyRecord) -> Result<()> {
    doc.open("position")?;
    doc.leaf("link", &record.url)?;
    doc.leaf("identifier", record.identifier.as_deref().unwrap_or_default())?;
    doc.leaf("title", &record.title)?;
    doc.leaf("start_date", "")?;
    doc.leaf("kind", "")?;
    doc.cdata_leaf("description", &record.description)?;
    doc.leaf("top_location", &record.location)?;

    doc.open("locations")?;
    doc.leaf("location", &record.location)?;
    doc.close("locations")?;

    doc.leaf("images", "")?;

    doc.open("company")?;
    doc.leaf("name", COMPANY_NAME)?;
    doc.open("address")?;
    doc.leaf("street", "")?;
    doc.leaf("zip", "")?;
    doc.leaf("city", &record.location)?;
    doc.close("address")?;
    doc.close("company")?;

    doc.leaf("contact_email", CONTACT_EMAIL)?;
    doc.close("position")
}

/// Event writer that lays out one element per line
struct FeedDocument<W: Write> {
    writer: Writer<W>,
    depth: usize,
}

impl<W: Write> FeedDocument<W> {
    fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
            depth: 0,
        }
    }

    fn line(&mut self) -> Result<()> {
        let whitespace = format!("\n{}", INDENT.repeat(self.depth));
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(whitespace)))?;
        Ok(())
    }

    fn open(&mut self, name: &str) -> Result<()> {
        self.line()?;
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.depth -= 1;
        self.line()?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<()> {
        self.line()?;
        let text = xml_chars(text);
        if text.is_empty() {
            self.writer.write_event(Event::Empty(BytesStart::new(name)))?;
        } else {
            self.writer.write_event(Event::Start(BytesStart::new(name)))?;
            self.writer.write_event(Event::Text(BytesText::new(&text)))?;
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Ok(())
    }

    /// Element whose text is wrapped in CDATA, even when empty
    fn cdata_leaf(&mut self, name: &str, text: &str) -> Result<()> {
        self.line()?;
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        for section in cdata_sections(&xml_chars(text)) {
            self.writer.write_event(Event::CData(BytesCData::new(section)))?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

/// Splits text so that no section contains the CDATA terminator `]]>`
fn cdata_sections(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;

    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut section = String::with_capacity(part.len() + 3);
            if i > 0 {
                section.push('>');
            }
            section.push_str(part);
            if i < last {
                section.push_str("]]");
            }
            section
        })
        .collect()
}

/// Drops characters XML 1.0 cannot represent (control characters other than tab and newlines)
fn xml_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || !c.is_control() || c as u32 >= 0x80)
        .filter(|&c| !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: Option<&str>, description: &str) -> VacancyRecord {
        let suffix = id.map(|id| format!("-j{id}")).unwrap_or_default();
        VacancyRecord {
            url: format!("https://karriere.nordsee.com/de/Koch-mw{suffix}.html"),
            identifier: id.map(str::to_string),
            title: "Koch (m/w)".to_string(),
            location: "Berlin".to_string(),
            position: "Vollzeit".to_string(),
            description: description.to_string(),
        }
    }

    fn rendered(records: &[VacancyRecord]) -> String {
        String::from_utf8(render(records).unwrap()).unwrap()
    }

    #[test]
    fn test_document_layout() {
        let xml = rendered(&[record(Some("1234"), "Intro & mehr")]);
        let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<vacancies>
  <position>
    <link>https://karriere.nordsee.com/de/Koch-mw-j1234.html</link>
    <identifier>1234</identifier>
    <title>Koch (m/w)</title>
    <start_date/>
    <kind/>
    <description><![CDATA[Intro & mehr]]></description>
    <top_location>Berlin</top_location>
    <locations>
      <location>Berlin</location>
    </locations>
    <images/>
    <company>
      <name>NORDSEE GmbH</name>
      <address>
        <street/>
        <zip/>
        <city>Berlin</city>
      </address>
    </company>
    <contact_email>fallback@jobufo.com</contact_email>
  </position>
</vacancies>
"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_one_position_per_record_and_identifiers_verbatim() {
        let records = vec![
            record(Some("1"), "a"),
            record(None, "b"),
            record(Some("0042"), "c"),
        ];
        let xml = rendered(&records);

        assert_eq!(xml.matches("<position>").count(), 3);
        assert_eq!(xml.matches("</position>").count(), 3);

        let identifiers: Vec<&str> = xml
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("<identifier"))
            .collect();
        assert_eq!(
            identifiers,
            vec!["<identifier>1</identifier>", "<identifier/>", "<identifier>0042</identifier>"]
        );
    }

    #[test]
    fn test_empty_description_keeps_cdata() {
        let xml = rendered(&[record(Some("1"), "")]);
        assert!(xml.contains("<description><![CDATA[]]></description>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut r = record(Some("1"), "x");
        r.title = "Koch <Frühschicht> & Spätschicht".to_string();
        let xml = rendered(&[r]);
        assert!(xml.contains("<title>Koch &lt;Frühschicht&gt; &amp; Spätschicht</title>"));
    }

    #[test]
    fn test_cdata_terminator_is_split() {
        let xml = rendered(&[record(Some("1"), "a]]>b")]);
        assert!(xml.contains("<description><![CDATA[a]]]]><![CDATA[>b]]></description>"));
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let xml = rendered(&[record(Some("1"), "a\u{0}b\u{1b}c\td")]);
        assert!(xml.contains("<![CDATA[abc\td]]>"));
    }

    #[test]
    fn test_no_records_renders_empty_root() {
        assert_eq!(
            rendered(&[]),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<vacancies/>\n"
        );
    }

    #[tokio::test]
    async fn test_write_creates_directory_and_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("parsed_xml").join("nested");
        let writer = FeedWriter::new(&dir);
        let records = vec![record(Some("1"), "a"), record(None, "b")];

        let first = writer.write(&records).await.unwrap();
        let first_bytes = std::fs::read(&first).unwrap();
        let second = writer.write(&records).await.unwrap();
        let second_bytes = std::fs::read(&second).unwrap();

        assert!(first.is_absolute());
        assert!(first.ends_with("nordsee.xml"));
        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_feed() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = FeedWriter::new(tmp.path());

        writer
            .write(&[record(Some("1"), "a"), record(Some("2"), "b")])
            .await
            .unwrap();
        let path = writer.write(&[record(Some("3"), "c")]).await.unwrap();

        let xml = std::fs::read_to_string(path).unwrap();
        assert_eq!(xml.matches("<position>").count(), 1);
        assert!(xml.contains("<identifier>3</identifier>"));
    }

    #[tokio::test]
    async fn test_summary_is_written_as_json() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = FeedWriter::new(tmp.path());
        let mut summary = RunSummary::start();
        summary.pages_skipped.push(2);

        let path = writer.write_summary(&summary).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["pages_skipped"], serde_json::json!([2]));
    }
}
