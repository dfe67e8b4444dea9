//! Heuristic rule matchers
//!
//! Each matcher scans an immutable document snapshot and either proposes a
//! candidate selector or reports nothing. Matchers never validate their
//! own candidates; the resolver re-queries the document afterwards.

use crate::config::HeuristicsConfig;
use crate::errors::EngineError;
use crate::escape::{escape_attribute_value, escape_identifier, escape_text};
use crate::exclude::ExclusionFilter;
use selmend_core::RuleName;
use selmend_dom::{DocumentSnapshot, ElementHandle};

/// Element kinds considered by the text rule
const TEXT_BEARING_TAGS: &[&str] = &[
    "button", "a", "h1", "h2", "h3", "h4", "h5", "h6", "p", "div", "span",
];

/// Roles that get refined with their visible text
const TEXT_REFINED_ROLES: &[&str] = &["button", "link"];

/// Dispatch a named rule against the document
pub(crate) fn apply_rule(
    rule: RuleName,
    doc: &DocumentSnapshot,
    opts: &HeuristicsConfig,
    filter: &ExclusionFilter,
) -> Result<Option<String>, EngineError> {
    match rule {
        // Both names run the one shared test-attribute matcher.
        RuleName::DataCy | RuleName::DataTestId => match_test_attribute(doc),
        RuleName::AriaLabel => Ok(match_aria_label(doc, filter)),
        RuleName::Role => Ok(match_role(doc, opts, filter)),
        RuleName::Label => Ok(match_label(doc, filter)),
        RuleName::Text => Ok(match_text(doc, opts, filter)),
        RuleName::Class => match_class(doc, filter),
        RuleName::Id => Ok(match_id(doc, filter)),
    }
}

/// First element carrying `data-cy` or `data-testid`; `data-cy` wins when
/// both are present on the element.
fn match_test_attribute(doc: &DocumentSnapshot) -> Result<Option<String>, EngineError> {
    let hits = doc.select("[data-cy], [data-testid]")?;
    let Some(element) = hits.first() else {
        return Ok(None);
    };
    for attribute in ["data-cy", "data-testid"] {
        if let Some(value) = element.attr(attribute) {
            return Ok(Some(format!(
                "[{attribute}=\"{}\"]",
                escape_attribute_value(value)
            )));
        }
    }
    Ok(None)
}

/// First `aria-label` whose value is not excluded
fn match_aria_label(doc: &DocumentSnapshot, filter: &ExclusionFilter) -> Option<String> {
    for element in doc.elements_with_attribute("aria-label") {
        let value = element.attr("aria-label")?;
        if value.is_empty() || filter.is_excluded(value) {
            continue;
        }
        return Some(format!("[aria-label=\"{}\"]", escape_attribute_value(value)));
    }
    None
}

/// First `role` whose value is not excluded; button and link roles are
/// refined with bounded visible text when available
fn match_role(
    doc: &DocumentSnapshot,
    opts: &HeuristicsConfig,
    filter: &ExclusionFilter,
) -> Option<String> {
    for element in doc.elements_with_attribute("role") {
        let role = element.attr("role")?;
        if role.is_empty() || filter.is_excluded(role) {
            continue;
        }
        let base = format!("[role=\"{}\"]", escape_attribute_value(role));
        if TEXT_REFINED_ROLES.contains(&role) {
            let text = element.text();
            let trimmed = text.trim();
            if !trimmed.is_empty() && within_text_bounds(trimmed, opts) {
                return Some(format!("{base}:contains(\"{}\")", escape_text(trimmed)));
            }
        }
        return Some(base);
    }
    None
}

/// First `<label for="...">` whose target id is not excluded
fn match_label(doc: &DocumentSnapshot, filter: &ExclusionFilter) -> Option<String> {
    for element in doc.elements_with_tag_in(&["label"]) {
        let Some(target) = element.attr("for") else {
            continue;
        };
        if target.is_empty() || filter.is_excluded(target) {
            continue;
        }
        return Some(format!("#{}", escape_identifier(target)));
    }
    None
}

/// First text-bearing element with bounded, non-excluded trimmed text.
/// Buttons and links get a tag-qualified candidate, everything else a
/// tag-agnostic one.
fn match_text(
    doc: &DocumentSnapshot,
    opts: &HeuristicsConfig,
    filter: &ExclusionFilter,
) -> Option<String> {
    for element in doc.elements_with_tag_in(TEXT_BEARING_TAGS) {
        let text = element.text();
        let trimmed = text.trim();
        if trimmed.is_empty() || !within_text_bounds(trimmed, opts) {
            continue;
        }
        if filter.is_text_excluded(trimmed) {
            continue;
        }
        let escaped = escape_text(trimmed);
        let tag = element.tag_name();
        return Some(if tag == "button" || tag == "a" {
            format!("{tag}:contains(\"{escaped}\")")
        } else {
            format!(":contains(\"{escaped}\")")
        });
    }
    None
}

/// First class token of the first classed element that is not excluded;
/// bare when unique in the document, tag-qualified otherwise
fn match_class(
    doc: &DocumentSnapshot,
    filter: &ExclusionFilter,
) -> Result<Option<String>, EngineError> {
    let classed = doc.elements_with_attribute("class");
    let Some(element) = classed.first() else {
        return Ok(None);
    };
    for token in element.class_tokens() {
        if filter.is_excluded(token) {
            continue;
        }
        let bare = format!(".{}", escape_identifier(token));
        let count = doc.match_count(&bare)?;
        return Ok(Some(if count == 1 {
            bare
        } else {
            format!("{}{bare}", element.tag_name())
        }));
    }
    Ok(None)
}

/// First `id` whose value is not excluded
fn match_id(doc: &DocumentSnapshot, filter: &ExclusionFilter) -> Option<String> {
    for element in doc.elements_with_attribute("id") {
        let value = element.attr("id")?;
        if value.is_empty() || filter.is_excluded(value) {
            continue;
        }
        return Some(format!("#{}", escape_identifier(value)));
    }
    None
}

/// Forward direction: best stable selector for an already-known element,
/// independent of the failure-healing path
pub(crate) fn selector_for_element(
    element: &ElementHandle<'_>,
    opts: &HeuristicsConfig,
    filter: &ExclusionFilter,
) -> Option<String> {
    for attribute in ["data-cy", "data-testid"] {
        if let Some(value) = element.attr(attribute) {
            if !value.is_empty() {
                return Some(format!(
                    "[{attribute}=\"{}\"]",
                    escape_attribute_value(value)
                ));
            }
        }
    }
    if let Some(id) = element.attr("id") {
        if !id.is_empty() && !filter.is_excluded(id) {
            return Some(format!("#{}", escape_identifier(id)));
        }
    }
    if let Some(label) = element.attr("aria-label") {
        if !label.is_empty() && !filter.is_excluded(label) {
            return Some(format!("[aria-label=\"{}\"]", escape_attribute_value(label)));
        }
    }
    for token in element.class_tokens() {
        if !filter.is_excluded(token) {
            return Some(format!("{}.{}", element.tag_name(), escape_identifier(token)));
        }
    }
    let tag = element.tag_name();
    if tag == "button" || tag == "a" {
        let text = element.text();
        let trimmed = text.trim();
        if !trimmed.is_empty()
            && within_text_bounds(trimmed, opts)
            && !filter.is_text_excluded(trimmed)
        {
            return Some(format!("{tag}:contains(\"{}\")", escape_text(trimmed)));
        }
    }
    None
}

fn within_text_bounds(text: &str, opts: &HeuristicsConfig) -> bool {
    let length = text.chars().count();
    length >= opts.min_text_length && length <= opts.max_text_length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> HeuristicsConfig {
        HeuristicsConfig::default()
    }

    fn filter(patterns: &[&str]) -> ExclusionFilter {
        let owned: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        ExclusionFilter::new(&owned)
    }

    #[test]
    fn test_test_attribute_prefers_data_cy() {
        let doc = DocumentSnapshot::parse(
            r#"<button data-cy="login" data-testid="login-btn">Log in</button>"#,
        );
        let candidate = match_test_attribute(&doc).unwrap();
        assert_eq!(candidate, Some(r#"[data-cy="login"]"#.to_string()));
    }

    #[test]
    fn test_test_attribute_falls_back_to_testid() {
        let doc = DocumentSnapshot::parse(r#"<button data-testid="save">Save</button>"#);
        let candidate = match_test_attribute(&doc).unwrap();
        assert_eq!(candidate, Some(r#"[data-testid="save"]"#.to_string()));
    }

    #[test]
    fn test_test_attribute_escapes_value() {
        let doc = DocumentSnapshot::parse(r#"<div data-cy='say "hi"'>x</div>"#);
        let candidate = match_test_attribute(&doc).unwrap();
        assert_eq!(candidate, Some(r#"[data-cy="say \"hi\""]"#.to_string()));
    }

    #[test]
    fn test_aria_label_skips_excluded() {
        let doc = DocumentSnapshot::parse(
            r#"<div aria-label="123">a</div><div aria-label="Close">x</div>"#,
        );
        let candidate = match_aria_label(&doc, &filter(&["^[0-9]+$"]));
        assert_eq!(candidate, Some(r#"[aria-label="Close"]"#.to_string()));
    }

    #[test]
    fn test_role_plain() {
        let doc = DocumentSnapshot::parse(r#"<nav role="navigation">menu</nav>"#);
        let candidate = match_role(&doc, &opts(), &filter(&[]));
        assert_eq!(candidate, Some(r#"[role="navigation"]"#.to_string()));
    }

    #[test]
    fn test_role_button_refined_with_text() {
        let doc = DocumentSnapshot::parse(r#"<div role="button">Submit</div>"#);
        let candidate = match_role(&doc, &opts(), &filter(&[]));
        assert_eq!(
            candidate,
            Some(r#"[role="button"]:contains("Submit")"#.to_string())
        );
    }

    #[test]
    fn test_role_button_without_text_stays_bare() {
        let doc = DocumentSnapshot::parse(r#"<div role="button"></div>"#);
        let candidate = match_role(&doc, &opts(), &filter(&[]));
        assert_eq!(candidate, Some(r#"[role="button"]"#.to_string()));
    }

    #[test]
    fn test_role_text_over_bound_stays_bare() {
        let long = "x".repeat(80);
        let doc =
            DocumentSnapshot::parse(&format!(r#"<div role="link">{long}</div>"#));
        let candidate = match_role(&doc, &opts(), &filter(&[]));
        assert_eq!(candidate, Some(r#"[role="link"]"#.to_string()));
    }

    #[test]
    fn test_label_targets_id() {
        let doc = DocumentSnapshot::parse(
            r#"<label for="user.name">Name</label><input id="user.name">"#,
        );
        let candidate = match_label(&doc, &filter(&[]));
        assert_eq!(candidate, Some(r"#user\.name".to_string()));
    }

    #[test]
    fn test_text_button_tag_qualified() {
        let doc = DocumentSnapshot::parse(r#"<button>Submit Now</button>"#);
        let candidate = match_text(&doc, &opts(), &filter(&[]));
        assert_eq!(
            candidate,
            Some(r#"button:contains("Submit Now")"#.to_string())
        );
    }

    #[test]
    fn test_text_generic_container_tag_agnostic() {
        let doc = DocumentSnapshot::parse(r#"<body><p>Short note</p></body>"#);
        let candidate = match_text(&doc, &opts(), &filter(&[]));
        assert_eq!(candidate, Some(r#":contains("Short note")"#.to_string()));
    }

    #[test]
    fn test_text_respects_substring_exclusion() {
        let doc = DocumentSnapshot::parse(
            r#"<body><p>loading spinner</p><p>Checkout</p></body>"#,
        );
        let candidate = match_text(&doc, &opts(), &filter(&["^loading$"]));
        assert_eq!(candidate, Some(r#":contains("Checkout")"#.to_string()));
    }

    #[test]
    fn test_text_length_bounds() {
        let mut bounded = opts();
        bounded.min_text_length = 3;
        bounded.max_text_length = 10;
        let doc = DocumentSnapshot::parse(
            r#"<body><span>ab</span><span>just right</span></body>"#,
        );
        let candidate = match_text(&doc, &bounded, &filter(&[]));
        assert_eq!(candidate, Some(r#":contains("just right")"#.to_string()));
    }

    #[test]
    fn test_class_unique_token_bare() {
        let doc = DocumentSnapshot::parse(
            r#"<body><button class="stable-btn">Go</button></body>"#,
        );
        let candidate = match_class(&doc, &filter(&[])).unwrap();
        assert_eq!(candidate, Some(".stable-btn".to_string()));
    }

    #[test]
    fn test_class_shared_token_tag_qualified() {
        let doc = DocumentSnapshot::parse(
            r#"<body><button class="btn">Go</button><span class="btn">x</span></body>"#,
        );
        let candidate = match_class(&doc, &filter(&[])).unwrap();
        assert_eq!(candidate, Some("button.btn".to_string()));
    }

    #[test]
    fn test_class_skips_excluded_token() {
        let doc = DocumentSnapshot::parse(
            r#"<body><button class="temp-abc stable-btn">Go</button></body>"#,
        );
        let candidate = match_class(&doc, &filter(&["^temp-"])).unwrap();
        assert_eq!(candidate, Some(".stable-btn".to_string()));
    }

    #[test]
    fn test_id_skips_excluded_and_falls_through() {
        let doc = DocumentSnapshot::parse(
            r#"<body><div id="42">a</div><div id="sidebar">b</div></body>"#,
        );
        let candidate = match_id(&doc, &filter(&["^[0-9]+$"]));
        assert_eq!(candidate, Some("#sidebar".to_string()));
    }

    #[test]
    fn test_selector_for_element_prefers_test_attribute() {
        let doc = DocumentSnapshot::parse(
            r#"<button data-cy="save" id="save-btn" class="btn">Save</button>"#,
        );
        let elements = doc.select("button").unwrap();
        let selector = selector_for_element(&elements[0], &opts(), &filter(&[]));
        assert_eq!(selector, Some(r#"[data-cy="save"]"#.to_string()));
    }

    #[test]
    fn test_selector_for_element_falls_back_to_text() {
        let doc = DocumentSnapshot::parse(r#"<button class="temp-1">Buy now</button>"#);
        let elements = doc.select("button").unwrap();
        let selector = selector_for_element(&elements[0], &opts(), &filter(&["^temp-"]));
        assert_eq!(selector, Some(r#"button:contains("Buy now")"#.to_string()));
    }

    #[test]
    fn test_selector_for_element_nothing_stable() {
        let doc = DocumentSnapshot::parse(r#"<body><div></div></body>"#);
        let elements = doc.select("div").unwrap();
        let selector = selector_for_element(&elements[0], &opts(), &filter(&[]));
        assert_eq!(selector, None);
    }
}
