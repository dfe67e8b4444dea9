//! Parsed document snapshot and element handles

use crate::errors::DomError;
use scraper::{ElementRef, Html, Selector};

/// Immutable snapshot of a document
///
/// Parsing is total: malformed markup is repaired by the HTML5 tree builder
/// rather than rejected. All scans yield elements in document order.
pub struct DocumentSnapshot {
    html: Html,
}

impl DocumentSnapshot {
    /// Parse an HTML string into a snapshot
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Run a CSS selector query, returning matches in document order
    pub fn select(&self, selector: &str) -> Result<Vec<ElementHandle<'_>>, DomError> {
        let parsed =
            Selector::parse(selector).map_err(|err| DomError::selector(selector, err))?;
        Ok(self
            .html
            .select(&parsed)
            .map(ElementHandle::new)
            .collect())
    }

    /// Count the elements matching a CSS selector
    pub fn match_count(&self, selector: &str) -> Result<usize, DomError> {
        let parsed =
            Selector::parse(selector).map_err(|err| DomError::selector(selector, err))?;
        Ok(self.html.select(&parsed).count())
    }

    /// All elements carrying the given attribute, in document order
    pub fn elements_with_attribute(&self, name: &str) -> Vec<ElementHandle<'_>> {
        self.all_elements()
            .into_iter()
            .filter(|el| el.attr(name).is_some())
            .collect()
    }

    /// All elements whose tag name is in the given set, in document order
    pub fn elements_with_tag_in(&self, tags: &[&str]) -> Vec<ElementHandle<'_>> {
        self.all_elements()
            .into_iter()
            .filter(|el| tags.contains(&el.tag_name()))
            .collect()
    }

    /// Serialize the root element, truncated to at most `max_chars` bytes
    /// on a char boundary
    pub fn root_html_bounded(&self, max_chars: usize) -> String {
        let mut serialized = self.html.root_element().html();
        if serialized.len() > max_chars {
            let mut end = max_chars;
            while end > 0 && !serialized.is_char_boundary(end) {
                end -= 1;
            }
            serialized.truncate(end);
        }
        serialized
    }

    fn all_elements(&self) -> Vec<ElementHandle<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(ElementHandle::new)
            .collect()
    }
}

/// Borrowed handle to one element in a snapshot
#[derive(Debug, Clone, Copy)]
pub struct ElementHandle<'a> {
    element: ElementRef<'a>,
}

impl<'a> ElementHandle<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Lowercase tag name
    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// Attribute value, if present
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Concatenated descendant text, untrimmed
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Whitespace-separated class tokens
    pub fn class_tokens(&self) -> Vec<&'a str> {
        self.attr("class")
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default()
    }
}
