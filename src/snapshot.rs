//! Resolution of `-SNAPSHOT` versions from a version-level `maven-metadata.xml`.

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Debug, Default)]
struct SnapshotVersion {
    classifier: Option<String>,
    extension: Option<String>,
    value: Option<String>,
}

impl SnapshotVersion {
    fn sources_jar_value(self) -> Option<String> {
        let is_sources_jar = self.classifier.as_deref() == Some("sources")
            && self.extension.as_deref() == Some("jar");
        if is_sources_jar { self.value } else { None }
    }
}

/// Returns the timestamped version of the sources JAR.
///
/// Prefers the `<snapshotVersion>` entry with classifier `sources` and
/// extension `jar`. Without one, falls back to `<timestamp>` and
/// `<buildNumber>` appended to `base_version` (the version without its
/// `-SNAPSHOT` suffix).
pub fn parse_snapshot_version(xml: &str, base_version: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current: Option<SnapshotVersion> = None;
    let mut element = String::new();
    let mut timestamp: Option<String> = None;
    let mut build_number: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("Malformed metadata XML at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "snapshotVersion" {
                    current = Some(SnapshotVersion::default());
                }
                element = name;
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .context("Invalid text in metadata XML")?
                    .trim()
                    .to_string();
                match (element.as_str(), current.as_mut()) {
                    ("classifier", Some(sv)) => sv.classifier = Some(text),
                    ("extension", Some(sv)) => sv.extension = Some(text),
                    ("value", Some(sv)) => sv.value = Some(text),
                    ("timestamp", _) => timestamp = Some(text),
                    ("buildNumber", _) => build_number = Some(text),
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"snapshotVersion"
                    && let Some(value) = current.take().and_then(SnapshotVersion::sources_jar_value)
                {
                    return Ok(value);
                }
                element.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (timestamp, build_number) {
        (Some(ts), Some(build)) => Ok(format!("{base_version}-{ts}-{build}")),
        _ => bail!("No sources jar version found in snapshot metadata"),
    }
}
