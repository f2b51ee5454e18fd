use std::fmt::Write;

use crate::{
    missing_start_error::MissingStartError,
    text_manipulators::{escape_quoted, halve_region, strip_line_breaks},
};

/// A conference listing as recovered from the archive.
///
/// Built from a month listing with `tags` empty, enriched from the event's
/// own page, cleaned once, then written once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    pub title: String,
    /// The conference's own website, never a mirror url once enriched.
    pub url: Option<String>,
    pub location: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub tags: Vec<String>,
    pub twitter: Option<String>,
    pub hashtag: Option<String>,
}

impl Event {
    pub fn clean(&mut self) {
        self.location = halve_region(&strip_line_breaks(&self.location));
        for tag in &mut self.tags {
            *tag = strip_line_breaks(tag);
        }
    }

    /// Renders the front-matter document for this event.
    pub fn front_matter(&self) -> Result<String, MissingStartError> {
        let Some(start) = self.start.as_deref() else {
            return Err(MissingStartError {
                title: self.title.clone(),
            });
        };

        // Writing into a String never fails.
        let mut doc = String::from("---\n");
        doc.push_str("fromLanyrd: true\n");
        let _ = writeln!(doc, "title: \"{}\"", escape_quoted(&self.title));
        let _ = writeln!(doc, "location: \"{}\"", self.location);
        let _ = writeln!(doc, "start: {start}");
        if let Some(end) = &self.end {
            let _ = writeln!(doc, "end: {end}");
        }
        if !self.tags.is_empty() {
            let _ = writeln!(doc, "tags: {}", self.tags.join(", "));
        }
        if let Some(twitter) = &self.twitter {
            let _ = writeln!(doc, "twitter: \"{twitter}\"");
        }
        if let Some(hashtag) = &self.hashtag {
            let _ = writeln!(doc, "hashtag: \"{hashtag}\"");
        }
        doc.push_str("---\n");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devconf() -> Event {
        Event {
            title: "DevConf".to_string(),
            location: "AA, Berlin, Germany".to_string(),
            start: Some("2015-01-10".to_string()),
            ..Event::default()
        }
    }

    #[test]
    fn clean_halves_region_and_strips_breaks() {
        let mut event = devconf();
        event.location = "\n\tAA, Berlin, Germany\n".to_string();
        event.tags = vec!["\n\trust\n".to_string(), "web\t".to_string()];
        event.clean();
        assert_eq!(event.location, "A, Berlin, Germany");
        assert_eq!(event.tags, vec!["rust", "web"]);
    }

    #[test]
    fn minimal_front_matter() {
        let mut event = devconf();
        event.clean();
        assert_eq!(
            event.front_matter().unwrap(),
            "---\nfromLanyrd: true\ntitle: \"DevConf\"\nlocation: \"A, Berlin, Germany\"\nstart: 2015-01-10\n---\n"
        );
    }

    #[test]
    fn optional_fields_are_written_in_order() {
        let event = Event {
            title: r#"He said "hi""#.to_string(),
            url: Some("http://hi.example/".to_string()),
            location: "Paris, France".to_string(),
            start: Some("2014-05-01".to_string()),
            end: Some("2014-05-02".to_string()),
            tags: vec!["rust".to_string(), "rust".to_string(), "web".to_string()],
            twitter: Some("@hiconf".to_string()),
            hashtag: Some("#hi".to_string()),
        };
        assert_eq!(
            event.front_matter().unwrap(),
            concat!(
                "---\n",
                "fromLanyrd: true\n",
                "title: \"He said \\\"hi\\\"\"\n",
                "location: \"Paris, France\"\n",
                "start: 2014-05-01\n",
                "end: 2014-05-02\n",
                "tags: rust, rust, web\n",
                "twitter: \"@hiconf\"\n",
                "hashtag: \"#hi\"\n",
                "---\n",
            )
        );
    }

    #[test]
    fn no_start_no_document() {
        let event = Event {
            start: None,
            ..devconf()
        };
        assert!(event.front_matter().is_err());
    }
}
