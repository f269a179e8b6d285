use std::fs;
use std::io;
use std::path::Path;

use organizer_core::FeedReference;
use organizer_logging::organizer_debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpmlError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("input is not an OPML document (no <opml> element)")]
    NotOpml,
    #[error("malformed OPML at byte {position}: {message}")]
    Xml { position: u64, message: String },
}

/// Extract every RSS subscription, in document order and at any depth.
///
/// The whole document must be well-formed XML with an `<opml>` root; a
/// truncated or broken file is an error rather than a shorter list.
pub fn parse_opml(text: &str) -> Result<Vec<FeedReference>, OpmlError> {
    let mut reader = Reader::from_str(text);
    let mut open: Vec<String> = Vec::new();
    let mut seen_root = false;
    let mut references = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| malformed(&reader, err))?;
        let (element, opens) = match event {
            Event::Start(element) => (element, true),
            Event::Empty(element) => (element, false),
            Event::End(_) => {
                open.pop();
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        if !seen_root {
            if name != "opml" {
                return Err(OpmlError::NotOpml);
            }
            seen_root = true;
        }
        if name == "outline" {
            if let Some(reference) = feed_reference(&element).map_err(|err| malformed(&reader, err))? {
                references.push(reference);
            }
        }
        if opens {
            open.push(name);
        }
    }

    if !seen_root {
        return Err(OpmlError::NotOpml);
    }
    if let Some(unclosed) = open.last() {
        return Err(OpmlError::Xml {
            position: reader.buffer_position() as u64,
            message: format!("document ends inside <{unclosed}>"),
        });
    }

    organizer_debug!("OPML lists {} RSS feeds", references.len());
    Ok(references)
}

/// Read and parse an OPML file, keeping the first `limit` feeds when
/// `limit` is a positive number.
pub fn parse_opml_file(path: &Path, limit: Option<usize>) -> Result<Vec<FeedReference>, OpmlError> {
    let text = fs::read_to_string(path).map_err(|source| OpmlError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut references = parse_opml(&text)?;
    if let Some(limit) = limit.filter(|&n| n > 0) {
        references.truncate(limit);
    }
    Ok(references)
}

fn malformed(reader: &Reader<&[u8]>, err: impl Into<quick_xml::Error>) -> OpmlError {
    OpmlError::Xml {
        position: reader.buffer_position() as u64,
        message: err.into().to_string(),
    }
}

#[derive(Default)]
struct OutlineAttrs {
    kind: Option<String>,
    xml_url: Option<String>,
    text: Option<String>,
    title: Option<String>,
}

/// `None` for outlines that are not RSS subscriptions or carry no feed URL.
fn feed_reference(element: &BytesStart<'_>) -> Result<Option<FeedReference>, quick_xml::Error> {
    let mut attrs = OutlineAttrs::default();
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        let key = attr.key.as_ref();
        if key.eq_ignore_ascii_case(b"type") {
            attrs.kind = Some(value);
        } else if key.eq_ignore_ascii_case(b"xmlUrl") {
            attrs.xml_url = Some(value);
        } else if key == b"text" {
            attrs.text = Some(value);
        } else if key == b"title" {
            attrs.title = Some(value);
        }
    }

    if !attrs
        .kind
        .as_deref()
        .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("rss"))
    {
        return Ok(None);
    }
    let Some(feed_url) = attrs.xml_url.as_deref().map(str::trim).filter(|url| !url.is_empty()) else {
        return Ok(None);
    };

    let title = match attrs.title.as_deref() {
        Some(title) if !title.is_empty() => title,
        _ => attrs.text.as_deref().unwrap_or_default(),
    };
    Ok(Some(FeedReference::new(percent_decode(title), feed_url)))
}

/// Malformed escapes are kept literally and invalid UTF-8 is replaced.
fn percent_decode(title: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(title.as_bytes())).into_owned()
}
