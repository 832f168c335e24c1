//! Response body renderers, one per [`Format`].

use std::fmt::Write;

use entities::{Event, User};
use serde::Serialize;

use crate::types::{
    display_tags, CompactEvent, CreatedEnvelope, EventObject, EventsEnvelope, UserBody,
    VersionBody,
};
use crate::xml::XmlWriter;
use crate::{Format, ProtocolResult};

/// Renders response bodies in one wire format.
pub trait Renderer: Send + Sync {
    /// The format this renderer produces.
    fn format(&self) -> Format;

    /// Renders an event listing. `tags` is `None` when tags were not requested.
    fn events(&self, events: &[Event], tags: Option<&[String]>) -> ProtocolResult<String>;

    /// Renders a newly created (or matched) event together with its tags.
    fn created(&self, event: &Event) -> ProtocolResult<String>;

    fn version(&self, version: &str) -> ProtocolResult<String>;

    /// Renders the guid of a newly registered user.
    fn user(&self, user: &User) -> ProtocolResult<String>;
}

/// Serializes `value` to JSON that is safe to embed in an HTML `<script>`.
///
/// `<`, `>` and `&` only occur inside JSON strings, so they are replaced with
/// their `\uXXXX` escapes after serialization.
pub fn to_safe_json<T: Serialize + ?Sized>(value: &T) -> ProtocolResult<String> {
    let json = serde_json::to_string(value)?;
    let mut safe = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => safe.push_str("\\u003c"),
            '>' => safe.push_str("\\u003e"),
            '&' => safe.push_str("\\u0026"),
            _ => safe.push(c),
        }
    }
    Ok(safe)
}

// ============================================================================
// JSON
// ============================================================================

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn format(&self) -> Format {
        Format::Json
    }

    fn events(&self, events: &[Event], tags: Option<&[String]>) -> ProtocolResult<String> {
        to_safe_json(&EventsEnvelope {
            events: events.iter().map(EventObject::from).collect(),
            tags: tags.map(display_tags),
        })
    }

    fn created(&self, event: &Event) -> ProtocolResult<String> {
        to_safe_json(&CreatedEnvelope {
            event: EventObject::from(event),
            tags: display_tags(&event.tags),
        })
    }

    fn version(&self, version: &str) -> ProtocolResult<String> {
        to_safe_json(&VersionBody {
            version: version.to_string(),
        })
    }

    fn user(&self, user: &User) -> ProtocolResult<String> {
        to_safe_json(&UserBody {
            guid: user.guid.clone(),
        })
    }
}

// ============================================================================
// Compact JSON
// ============================================================================

pub struct CompactRenderer;

fn compact(event: &Event) -> CompactEvent {
    EventObject::from(event).into_compact()
}

impl Renderer for CompactRenderer {
    fn format(&self) -> Format {
        Format::Compact
    }

    fn events(&self, events: &[Event], tags: Option<&[String]>) -> ProtocolResult<String> {
        to_safe_json(&EventsEnvelope {
            events: events.iter().map(compact).collect(),
            tags: tags.map(display_tags),
        })
    }

    fn created(&self, event: &Event) -> ProtocolResult<String> {
        to_safe_json(&CreatedEnvelope {
            event: compact(event),
            tags: display_tags(&event.tags),
        })
    }

    fn version(&self, version: &str) -> ProtocolResult<String> {
        JsonRenderer.version(version)
    }

    fn user(&self, user: &User) -> ProtocolResult<String> {
        JsonRenderer.user(user)
    }
}

// ============================================================================
// XML
// ============================================================================

pub struct XmlRenderer;

fn write_xml_event(writer: &mut XmlWriter, event: &Event) -> std::fmt::Result {
    let object = EventObject::from(event);
    writer.open("event")?;
    writer.element("title", &object.title)?;
    writer.element("id", &object.id)?;
    writer.element("start", object.start)?;
    writer.element("end", object.end)?;
    writer.element("allDay", object.all_day)?;
    if let Some(url) = &object.external_url {
        writer.element("external_url", url)?;
    }
    if let Some(description) = &object.description {
        writer.element("description", description)?;
    }
    writer.close("event")
}

fn write_xml_tags(writer: &mut XmlWriter, tags: &[String]) -> std::fmt::Result {
    writer.open("tags")?;
    for tag in display_tags(tags) {
        writer.element("tag", tag)?;
    }
    writer.close("tags")
}

impl Renderer for XmlRenderer {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn events(&self, events: &[Event], tags: Option<&[String]>) -> ProtocolResult<String> {
        let mut writer = XmlWriter::new();
        writer.open("response")?;
        writer.open("events")?;
        for event in events {
            write_xml_event(&mut writer, event)?;
        }
        writer.close("events")?;
        if let Some(tags) = tags {
            write_xml_tags(&mut writer, tags)?;
        }
        writer.close("response")?;
        Ok(writer.finish())
    }

    fn created(&self, event: &Event) -> ProtocolResult<String> {
        let mut writer = XmlWriter::new();
        writer.open("response")?;
        write_xml_event(&mut writer, event)?;
        write_xml_tags(&mut writer, &event.tags)?;
        writer.close("response")?;
        Ok(writer.finish())
    }

    fn version(&self, version: &str) -> ProtocolResult<String> {
        let mut writer = XmlWriter::new();
        writer.open("response")?;
        writer.element("version", version)?;
        writer.close("response")?;
        Ok(writer.finish())
    }

    fn user(&self, user: &User) -> ProtocolResult<String> {
        let mut writer = XmlWriter::new();
        writer.open("response")?;
        writer.element("guid", &user.guid)?;
        writer.close("response")?;
        Ok(writer.finish())
    }
}

// ============================================================================
// Plain text
// ============================================================================

pub struct TextRenderer;

const DAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn write_text_event(out: &mut String, event: &Event) -> std::fmt::Result {
    writeln!(out, "{}", event.title)?;
    if !event.all_day {
        writeln!(
            out,
            "  {} - {}",
            event.start.format(TIME_FORMAT),
            event.end.format(TIME_FORMAT)
        )?;
    } else if event.start.date_naive() == event.end.date_naive() {
        writeln!(out, "  {} (all day)", event.start.format(DAY_FORMAT))?;
    } else {
        writeln!(
            out,
            "  {} - {} (all day)",
            event.start.format(DAY_FORMAT),
            event.end.format(DAY_FORMAT)
        )?;
    }
    if let Some(url) = &event.external_url {
        writeln!(out, "  {url}")?;
    }
    if let Some(description) = &event.description {
        writeln!(out, "  {description}")?;
    }
    Ok(())
}

fn write_text_tags(out: &mut String, tags: &[String]) -> std::fmt::Result {
    writeln!(out, "\nTAGS")?;
    for tag in display_tags(tags) {
        writeln!(out, "{tag}")?;
    }
    Ok(())
}

impl Renderer for TextRenderer {
    fn format(&self) -> Format {
        Format::Text
    }

    fn events(&self, events: &[Event], tags: Option<&[String]>) -> ProtocolResult<String> {
        let mut out = String::from("ENTRIES\n");
        for event in events {
            write_text_event(&mut out, event)?;
        }
        if let Some(tags) = tags {
            write_text_tags(&mut out, tags)?;
        }
        Ok(out)
    }

    fn created(&self, event: &Event) -> ProtocolResult<String> {
        let mut out = String::from("ENTRIES\n");
        write_text_event(&mut out, event)?;
        write_text_tags(&mut out, &event.tags)?;
        Ok(out)
    }

    fn version(&self, version: &str) -> ProtocolResult<String> {
        Ok(format!("{version}\n"))
    }

    fn user(&self, user: &User) -> ProtocolResult<String> {
        Ok(format!("{}\n", user.guid))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use entities::NewEvent;
    use uuid::Uuid;

    use super::*;

    fn all_day_event() -> Event {
        let day = Utc.with_ymd_and_hms(2011, 1, 29, 0, 0, 0).unwrap();
        Event::from_new(
            Uuid::new_v4(),
            NewEvent::all_day("Test1", day)
                .with_external_url("http://www.peterbe.com")
                .with_description("A longer description"),
        )
    }

    fn timed_event() -> Event {
        let start = Utc.with_ymd_and_hms(2011, 2, 15, 13, 0, 0).unwrap();
        Event::from_new(
            Uuid::new_v4(),
            NewEvent::timed("Test2", start, start + Duration::hours(1)),
        )
        .with_tags(["Tag"])
    }

    #[test]
    fn test_json_events_without_tags() {
        let event = all_day_event();
        let body = JsonRenderer.events(&[event.clone()], None).unwrap();

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["events"][0]["title"], "Test1");
        assert_eq!(json["events"][0]["id"], event.id.to_string());
        assert_eq!(json["events"][0]["allDay"], true);
        assert_eq!(json["events"][0]["external_url"], "http://www.peterbe.com");
        assert_eq!(json["events"][0]["description"], "A longer description");
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn test_json_events_with_tags() {
        let tags = vec!["tag".to_string()];
        let body = JsonRenderer.events(&[timed_event()], Some(&tags)).unwrap();

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["tags"], serde_json::json!(["@tag"]));
        assert!(json["events"][0].get("description").is_none());
    }

    #[test]
    fn test_json_never_contains_closing_script() {
        let start = Utc.with_ymd_and_hms(2011, 1, 29, 0, 0, 0).unwrap();
        let event = Event::from_new(
            Uuid::new_v4(),
            NewEvent::all_day("</script><script>alert('xss')</script> & co", start),
        );

        let body = JsonRenderer.created(&event).unwrap();
        assert!(!body.contains("</script>"));
        assert!(body.contains("\\u003c/script\\u003e"));
        assert!(body.contains("\\u0026"));

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["event"]["title"], event.title);
    }

    #[test]
    fn test_compact_events() {
        let event = all_day_event();
        let body = CompactRenderer.events(&[event.clone()], None).unwrap();

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let list = &json["events"][0];
        assert_eq!(list[0], "Test1");
        assert_eq!(list[1], event.start.timestamp());
        assert_eq!(list[2], event.end.timestamp());
        assert_eq!(list[3], true);
        assert_eq!(list[4], event.id.to_string());
        assert_eq!(list[5], "http://www.peterbe.com");
        assert_eq!(list[6], "A longer description");
    }

    #[test]
    fn test_created_always_has_tags() {
        let start = Utc.with_ymd_and_hms(2011, 1, 29, 0, 0, 0).unwrap();
        let event = Event::from_new(Uuid::new_v4(), NewEvent::all_day("Plain", start));

        let json: serde_json::Value =
            serde_json::from_str(&JsonRenderer.created(&event).unwrap()).unwrap();
        assert_eq!(json["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_xml_events() {
        let event = timed_event();
        let body = XmlRenderer.events(&[event], None).unwrap();

        roxmltree::Document::parse(&body).unwrap();
        assert!(body.contains("<allDay>false</allDay>"));
        assert!(!body.contains("external_url"));
        assert!(!body.contains("description"));
        assert!(!body.contains("<tag>"));

        let tags = vec!["Tag".to_string()];
        let body = XmlRenderer.events(&[timed_event()], Some(&tags)).unwrap();
        assert!(body.contains("<tag>@Tag</tag>"));
    }

    #[test]
    fn test_xml_escapes_text() {
        let start = Utc.with_ymd_and_hms(2011, 1, 29, 0, 0, 0).unwrap();
        let event = Event::from_new(Uuid::new_v4(), NewEvent::all_day("Tom & <Jerry>", start));

        let body = XmlRenderer.created(&event).unwrap();
        let doc = roxmltree::Document::parse(&body).unwrap();
        let title = doc
            .descendants()
            .find(|n| n.has_tag_name("title"))
            .and_then(|n| n.text());
        assert_eq!(title, Some("Tom & <Jerry>"));
    }

    #[test]
    fn test_xml_stays_well_formed_with_control_characters() {
        let start = Utc.with_ymd_and_hms(2011, 1, 29, 0, 0, 0).unwrap();
        let event = Event::from_new(Uuid::new_v4(), NewEvent::all_day("bell\u{1}", start));

        let body = XmlRenderer.events(std::slice::from_ref(&event), None).unwrap();
        let doc = roxmltree::Document::parse(&body).unwrap();
        let title = doc
            .descendants()
            .find(|n| n.has_tag_name("title"))
            .and_then(|n| n.text());
        assert_eq!(title, Some("bell\u{FFFD}"));
    }

    #[test]
    fn test_xml_version() {
        let body = XmlRenderer.version("1.0").unwrap();
        assert!(body.contains("<version>1.0</version>"));
        roxmltree::Document::parse(&body).unwrap();
    }

    #[test]
    fn test_text_sections() {
        let events = [all_day_event(), timed_event()];

        let body = TextRenderer.events(&events, None).unwrap();
        assert!(body.starts_with("ENTRIES\n"));
        assert!(body.contains("Test1\n  2011-01-29 (all day)\n"));
        assert!(body.contains("  2011-02-15 13:00 - 2011-02-15 14:00\n"));
        assert!(!body.contains("TAGS"));

        let tags = vec!["tag".to_string()];
        let body = TextRenderer.events(&events, Some(&tags)).unwrap();
        assert!(body.contains("ENTRIES"));
        assert!(body.contains("TAGS\n@tag\n"));
    }

    #[test]
    fn test_user_bodies() {
        let user = User::new();
        for format in [Format::Json, Format::Compact] {
            let json: serde_json::Value =
                serde_json::from_str(&format.renderer().user(&user).unwrap()).unwrap();
            assert_eq!(json["guid"], user.guid);
        }
        assert!(XmlRenderer.user(&user).unwrap().contains(&user.guid));
        assert_eq!(TextRenderer.user(&user).unwrap(), format!("{}\n", user.guid));
    }
}
