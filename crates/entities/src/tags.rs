//! Hashtag-style tag extraction.
//!
//! A tag is an `@` followed by one or more word characters, where the `@` does
//! not directly follow a word character. That keeps e-mail addresses such as
//! `mail@gmail.com` out of the tag set.

use std::sync::LazyLock;

use regex::Regex;

use crate::Event;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B@(\w+)").expect("Invalid regex"));

/// Extracts lower-cased tags from `text`, without the leading `@`, in
/// first-seen order and without duplicates.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for captures in TAG_PATTERN.captures_iter(text) {
        push_unique(&mut tags, captures[1].to_lowercase());
    }
    tags
}

/// Extracts the tags of an event's title and description.
pub fn event_tags(title: &str, description: Option<&str>) -> Vec<String> {
    let mut tags = extract_tags(title);
    if let Some(description) = description {
        for tag in extract_tags(description) {
            push_unique(&mut tags, tag);
        }
    }
    tags
}

/// Unions the tags of a result set, in event order.
pub fn collect_tags<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<String> {
    let mut tags = Vec::new();
    for event in events {
        for tag in &event.tags {
            push_unique(&mut tags, tag.clone());
        }
    }
    tags
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::NewEvent;

    #[test]
    fn test_extract_tags() {
        let tags = extract_tags("<script>alert('xss')</script> @tagged but not mail@gmail.com");
        assert_eq!(tags, vec!["tagged"]);
    }

    #[test]
    fn test_extract_tags_is_case_insensitive() {
        assert_eq!(extract_tags("@Tagged"), vec!["tagged"]);
        assert_eq!(extract_tags("@tagged"), vec!["tagged"]);
        assert_eq!(extract_tags("@Tagged and @TAGGED again"), vec!["tagged"]);
    }

    #[test]
    fn test_extract_tags_keeps_first_seen_order() {
        let tags = extract_tags("@work meeting with @Bob about @work");
        assert_eq!(tags, vec!["work", "bob"]);
    }

    #[test]
    fn test_extract_tags_ignores_bare_at() {
        assert!(extract_tags("meet @ noon").is_empty());
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn test_event_tags_unions_title_and_description() {
        let tags = event_tags("Lunch @food", Some("with @friends and more @Food"));
        assert_eq!(tags, vec!["food", "friends"]);

        assert_eq!(event_tags("Lunch @food", None), vec!["food"]);
    }

    #[test]
    fn test_collect_tags() {
        let start = Utc.with_ymd_and_hms(2011, 1, 29, 0, 0, 0).unwrap();
        let owner = Uuid::new_v4();
        let first = Event::from_new(owner, NewEvent::all_day("One @a @b", start));
        let second = Event::from_new(owner, NewEvent::all_day("Two @b @c", start));

        assert_eq!(collect_tags([&first, &second]), vec!["a", "b", "c"]);
        assert!(collect_tags(std::iter::empty::<&Event>()).is_empty());
    }
}
