//! Per-request page builder

use serde_json::Value;

use crate::layout::engine::{PageChrome, RenderedPage, TemplateEngine};
use crate::layout::error::TemplateError;
use crate::layout::payload::ContentPayload;

/// A page being assembled for one request
///
/// Content stays loosely typed JSON until [`Page::show`] validates it.
/// Showing consumes the page, so nothing can touch it after rendering.
#[derive(Debug, Clone)]
pub struct Page {
    chrome: PageChrome,
    content: Value,
    template_set: Option<String>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            chrome: PageChrome::default(),
            content: Value::Array(Vec::new()),
            template_set: None,
        }
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.chrome.title = title.into();
        self
    }

    pub fn head(mut self, head: impl Into<String>) -> Self {
        self.chrome.head = head.into();
        self
    }

    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.chrome.greeting = greeting.into();
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.chrome.header = header.into();
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.chrome.footer = footer.into();
        self
    }

    /// Render with the named template set instead of the default one
    pub fn template_set(mut self, name: impl Into<String>) -> Self {
        self.template_set = Some(name.into());
        self
    }

    /// Replace the whole content payload
    pub fn content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    /// Append a `(title, body)` section
    ///
    /// Content that is not a list is replaced by a new list.
    pub fn push_section(&mut self, title: impl Into<String>, body: impl Into<String>) {
        let entry = Value::Array(vec![
            Value::String(title.into()),
            Value::String(body.into()),
        ]);
        match &mut self.content {
            Value::Array(items) => items.push(entry),
            other => *other = Value::Array(vec![entry]),
        }
    }

    pub fn chrome(&self) -> &PageChrome {
        &self.chrome
    }

    pub fn content_value(&self) -> &Value {
        &self.content
    }

    pub fn template_set_override(&self) -> Option<&str> {
        self.template_set.as_deref()
    }

    /// Validate the content and render the page
    ///
    /// With `custom_template` each content row fills one copy of that
    /// template; otherwise each entry is a section.
    pub fn show(
        self,
        engine: &TemplateEngine,
        custom_template: Option<&str>,
    ) -> Result<RenderedPage, TemplateError> {
        let payload = ContentPayload::from_value(&self.content, custom_template)?;
        engine.render(&payload, &self.chrome, self.template_set.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_section_builds_pairs() {
        let mut page = Page::new().title("Home");
        page.push_section("Welcome", "Hello");
        page.push_section("News", "None");

        assert_eq!(page.chrome().title, "Home");
        assert_eq!(
            page.content_value(),
            &json!([["Welcome", "Hello"], ["News", "None"]])
        );
    }

    #[test]
    fn test_push_section_replaces_non_list_content() {
        let mut page = Page::new().content(json!("stray"));
        page.push_section("A", "B");
        assert_eq!(page.content_value(), &json!([["A", "B"]]));
    }

    #[test]
    fn test_show_rejects_scalar_content_before_reading_templates() {
        let engine = TemplateEngine::new("/nonexistent", "http://localhost/");
        let err = Page::new()
            .content(json!(7))
            .show(&engine, None)
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::InvalidPayloadShape { found: "number", .. }
        ));
    }
}
