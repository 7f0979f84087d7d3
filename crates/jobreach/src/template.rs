//! Outreach message templates.
//!
//! Templates substitute `{name}` and `{company}`. A template carrying a
//! placeholder the renderer does not know falls back to the raw content
//! instead of failing the batch; the dispatcher logs the fallback as a
//! warning.

use regex::Regex;

use crate::db::{template_repo, Database, DatabaseError};
use crate::names;

/// Default message template seeded on first startup.
pub const DEFAULT_TEMPLATE_NAME: &str = "Introduction";
pub const DEFAULT_TEMPLATE_CONTENT: &str =
    "Hi {name}, I saw an opening at {company} and would love to hear about your experience there!";

/// Note attached to connection requests. LinkedIn caps notes at 300
/// characters; the dispatcher truncates after rendering.
pub const CONNECTION_NOTE_CONTENT: &str =
    "Hi {name}, I noticed you work at {company}. I'd love to connect!";

/// A rendered message and whether the raw-content fallback was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    pub used_fallback: bool,
}

/// Renders template content with the recipient's first name and the
/// resolved company. Unknown placeholders trigger the raw fallback.
pub fn render(content: &str, name: &str, company: &str) -> RenderedMessage {
    let placeholder = Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid");

    let has_unknown = placeholder
        .captures_iter(content)
        .any(|c| !matches!(&c[1], "name" | "company"));

    if has_unknown {
        return RenderedMessage {
            text: content.to_string(),
            used_fallback: true,
        };
    }

    RenderedMessage {
        text: content.replace("{name}", name).replace("{company}", company),
        used_fallback: false,
    }
}

/// Whether a template written in Hebrew requires the recipient name in
/// Hebrew script.
pub fn requires_hebrew_names(content: &str) -> bool {
    names::is_hebrew_text(content)
}

/// Seeds the default template when the store is empty. Returns true if
/// a template was created.
pub fn seed_default(db: &Database) -> Result<bool, DatabaseError> {
    let now = crate::db::now_str();
    db.with_conn(|conn| {
        if template_repo::count(conn)? > 0 {
            return Ok(false);
        }
        template_repo::insert(
            conn,
            DEFAULT_TEMPLATE_NAME,
            DEFAULT_TEMPLATE_CONTENT,
            true,
            &now,
        )?;
        log::info!("Seeded default message template");
        Ok(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_both_placeholders() {
        let rendered = render("Hi {name}, you work at {company}!", "Ada", "Acme Corp");
        assert_eq!(rendered.text, "Hi Ada, you work at Acme Corp!");
        assert!(!rendered.used_fallback);
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let rendered = render("{name} {name}", "Ada", "Acme");
        assert_eq!(rendered.text, "Ada Ada");
    }

    #[test]
    fn test_render_without_placeholders() {
        let rendered = render("Hello there!", "Ada", "Acme");
        assert_eq!(rendered.text, "Hello there!");
        assert!(!rendered.used_fallback);
    }

    #[test]
    fn test_unknown_placeholder_falls_back_to_raw() {
        let content = "Hi {first}, greetings from {company}";
        let rendered = render(content, "Ada", "Acme");
        assert_eq!(rendered.text, content);
        assert!(rendered.used_fallback);
    }

    #[test]
    fn test_hebrew_placeholder_falls_back_to_raw() {
        let content = "היי {שם}, ראיתי שאתה עובד ב-{חברה}";
        let rendered = render(content, "תומר", "אקמי");
        assert_eq!(rendered.text, content);
        assert!(rendered.used_fallback);
    }

    #[test]
    fn test_requires_hebrew_names() {
        assert!(requires_hebrew_names("היי {name}, מה שלומך?"));
        assert!(!requires_hebrew_names(DEFAULT_TEMPLATE_CONTENT));
    }

    #[test]
    fn test_seed_default_once() {
        let db = Database::open_in_memory().unwrap();
        assert!(seed_default(&db).unwrap());
        assert!(!seed_default(&db).unwrap());

        db.with_conn(|conn| {
            let template = crate::db::template_repo::find_default(conn)?.unwrap();
            assert_eq!(template.name, DEFAULT_TEMPLATE_NAME);
            assert!(template.is_default);
            Ok(())
        })
        .unwrap();
    }
}
