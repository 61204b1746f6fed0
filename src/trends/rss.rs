//! Minimal RSS 2.0 item extraction for news-search feeds.
//!
//! Google-News-style search feeds put the publisher either in a `<source>`
//! element or appended to the title as `"Headline - Publisher"`. Both forms
//! are handled here.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::SourceError;
use crate::models::NewsHeadline;
use crate::utils::normalize_ws;

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Title,
    Link,
    Source,
}

/// Parse the `<item>` entries of an RSS document into headlines.
///
/// Items without a title are dropped. Returns an error only when the XML
/// itself is unreadable; missing optional fields are fine.
pub fn parse_headlines(xml: &str) -> Result<Vec<NewsHeadline>, SourceError> {
    let mut reader = Reader::from_str(xml);

    let mut headlines = Vec::new();
    let mut in_item = false;
    let mut field = Field::None;
    let mut title = String::new();
    let mut link = String::new();
    let mut source = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" => {
                    in_item = true;
                    title.clear();
                    link.clear();
                    source.clear();
                }
                b"title" if in_item => field = Field::Title,
                b"link" if in_item => field = Field::Link,
                b"source" if in_item => field = Field::Source,
                _ => field = Field::None,
            },
            Ok(Event::Text(t)) => {
                if in_item && field != Field::None {
                    let text = t
                        .unescape()
                        .map_err(|e| SourceError::Payload(format!("rss text decode failed: {e}")))?;
                    push_field(field, &text, &mut title, &mut link, &mut source);
                }
            }
            Ok(Event::CData(t)) => {
                if in_item && field != Field::None {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    push_field(field, &text, &mut title, &mut link, &mut source);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"item" => {
                    in_item = false;
                    if let Some(headline) = finish_item(&title, &link, &source) {
                        headlines.push(headline);
                    }
                }
                b"title" | b"link" | b"source" => field = Field::None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SourceError::Payload(format!(
                    "rss parse failed at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(headlines)
}

fn push_field(field: Field, text: &str, title: &mut String, link: &mut String, source: &mut String) {
    let target = match field {
        Field::Title => title,
        Field::Link => link,
        Field::Source => source,
        Field::None => return,
    };
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

fn finish_item(title: &str, link: &str, source: &str) -> Option<NewsHeadline> {
    let mut title = normalize_ws(title);
    let mut source = normalize_ws(source);
    if title.is_empty() {
        return None;
    }

    // "Headline - Publisher" fallback when no <source> element was present.
    if source.is_empty() {
        if let Some(pos) = title.rfind(" - ") {
            source = title[pos + 3..].trim().to_string();
            title = title[..pos].trim().to_string();
        }
    }

    let link = normalize_ws(link);
    Some(NewsHeadline {
        title,
        source: (!source.is_empty()).then_some(source),
        url: (!link.is_empty()).then_some(link),
    })
}
