use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

use crate::core::error::ExtractionError;

/// Tags whose contents never reach rendered text.
const HIDDEN_TAGS: [&str; 9] = [
    "script", "style", "noscript", "template", "head", "select", "option", "textarea", "svg",
];

/// Tags that start a new line in rendered text.
const BLOCK_TAGS: [&str; 28] = [
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "section", "table", "ul",
];

/// A parsed page snapshot plus the URL it was captured from.
///
/// Read-only during capture. `scraper::Html` is not `Send`, so neither is this.
pub struct PageDocument {
    html: Html,
    url: Option<Url>,
}

impl PageDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            url: None,
        }
    }

    /// Parse with the page URL. An unparseable URL is logged and dropped;
    /// hostname signals then simply never fire.
    pub fn parse_with_url(html: &str, page_url: &str) -> Self {
        let url = match Url::parse(page_url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Ignoring invalid page URL {}: {}", page_url, e);
                None
            }
        };
        Self {
            html: Html::parse_document(html),
            url,
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn url_string(&self) -> String {
        self.url.as_ref().map(|u| u.to_string()).unwrap_or_default()
    }

    /// Lowercased hostname, empty when the page URL is unknown.
    pub fn hostname(&self) -> String {
        self.url
            .as_ref()
            .and_then(|u| u.host_str())
            .map(|h| h.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// All elements matching `selector` in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, ExtractionError> {
        let parsed = Selector::parse(selector).map_err(|_| ExtractionError::InvalidSelector {
            selector: selector.to_string(),
        })?;
        Ok(self.html.select(&parsed).collect())
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>, ExtractionError> {
        let parsed = Selector::parse(selector).map_err(|_| ExtractionError::InvalidSelector {
            selector: selector.to_string(),
        })?;
        Ok(self.html.select(&parsed).next())
    }

    /// Match count; an invalid selector counts as zero.
    pub fn count(&self, selector: &str) -> usize {
        if let Ok(parsed) = Selector::parse(selector) {
            self.html.select(&parsed).count()
        } else {
            0
        }
    }

    pub fn exists(&self, selector: &str) -> bool {
        self.count(selector) > 0
    }

    pub fn title(&self) -> String {
        if let Ok(selector) = Selector::parse("title") {
            if let Some(title) = self.html.select(&selector).next() {
                return element_text(&title);
            }
        }
        String::new()
    }

    /// Approximates `document.body.innerText`: block elements and `<br>` break
    /// lines, table cells are tab-separated, hidden content is skipped.
    pub fn body_text(&self) -> String {
        let mut raw = String::new();
        let root = Selector::parse("body")
            .ok()
            .and_then(|sel| self.html.select(&sel).next())
            .unwrap_or_else(|| self.html.root_element());
        render_text(&root, &mut raw);

        raw.lines()
            .map(|line| {
                line.split('\t')
                    .map(|cell| cell.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" "))
                    .filter(|cell| !cell.is_empty())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_text(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let tag = child_element.value().name();
            if HIDDEN_TAGS.contains(&tag) {
                continue;
            }
            if tag == "br" {
                out.push('\n');
                continue;
            }
            let block = BLOCK_TAGS.contains(&tag) || tag == "tr";
            if block {
                out.push('\n');
            }
            render_text(&child_element, out);
            if block {
                out.push('\n');
            } else if tag == "td" || tag == "th" {
                out.push('\t');
            }
        } else if let Some(text_node) = child.value().as_text() {
            out.extend(
                text_node
                    .text
                    .chars()
                    .map(|c| if c.is_whitespace() && c != '\u{a0}' { ' ' } else { c }),
            );
        }
    }
}

/// Element text with whitespace collapsed.
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The current value of a form control, as a browser would report it.
///
/// Radio buttons and checkboxes only report when checked. A `<select>`
/// reports its selected option, or the first option when none is marked.
/// Returns `None` for non-controls and empty values.
pub fn control_value(element: &ElementRef) -> Option<String> {
    let value = match element.value().name() {
        "input" => {
            let kind = element
                .value()
                .attr("type")
                .unwrap_or("text")
                .to_ascii_lowercase();
            match kind.as_str() {
                "radio" | "checkbox" => {
                    if element.value().attr("checked").is_none() {
                        return None;
                    }
                    element.value().attr("value").unwrap_or("on").to_string()
                }
                "submit" | "button" | "reset" | "image" | "password" => return None,
                _ => element.value().attr("value").unwrap_or("").to_string(),
            }
        }
        "textarea" => element.text().collect::<String>(),
        "select" => selected_option(element)?,
        _ => return None,
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn selected_option(select: &ElementRef) -> Option<String> {
    let selector = Selector::parse("option").ok()?;
    let options: Vec<ElementRef> = select.select(&selector).collect();
    let chosen = options
        .iter()
        .find(|o| o.value().attr("selected").is_some())
        .or_else(|| options.first())?;
    Some(option_value(chosen))
}

/// `<option value>` or, when absent, its text.
pub fn option_value(option: &ElementRef) -> String {
    match option.value().attr("value") {
        Some(v) => v.to_string(),
        None => element_text(option),
    }
}

/// The next element sibling, skipping text and comments.
pub fn next_element_sibling<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_and_title() {
        let doc = PageDocument::parse_with_url(
            "<html><head><title> Patient  Chart </title></head><body></body></html>",
            "https://Portal.AthenaHealth.com/chart?id=7",
        );
        assert_eq!(doc.hostname(), "portal.athenahealth.com");
        assert_eq!(doc.title(), "Patient Chart");

        let no_url = PageDocument::parse_with_url("<p>x</p>", "not a url");
        assert_eq!(no_url.hostname(), "");
        assert!(no_url.url().is_none());
    }

    #[test]
    fn test_body_text_layout() {
        let doc = PageDocument::parse(
            r#"<body>
                <div>First <b>Name</b>: Lisa</div>
                <script>var x = "First Name: Bob";</script>
                <table><tr><td>DOB</td><td>03/15/1970</td></tr></table>
                <span>Phone</span><br><span>555-789-0123</span>
            </body>"#,
        );
        let text = doc.body_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["First Name: Lisa", "DOB\t03/15/1970", "Phone", "555-789-0123"]);
    }

    #[test]
    fn test_control_values() {
        let doc = PageDocument::parse(
            r#"<form>
                <input id="a" value=" Lisa ">
                <input id="b" type="checkbox" value="yes">
                <input id="c" type="radio" value="F" checked>
                <select id="d"><option value="">Choose</option><option value="M" selected>Male</option></select>
                <select id="e"><option>Self</option><option>Spouse</option></select>
                <textarea id="f">notes</textarea>
                <div id="g">text</div>
            </form>"#,
        );
        let value = |id: &str| {
            let el = doc.select_first(&format!("#{id}")).unwrap().unwrap();
            control_value(&el)
        };
        assert_eq!(value("a").as_deref(), Some("Lisa"));
        assert_eq!(value("b"), None);
        assert_eq!(value("c").as_deref(), Some("F"));
        assert_eq!(value("d").as_deref(), Some("M"));
        assert_eq!(value("e").as_deref(), Some("Self"));
        assert_eq!(value("f").as_deref(), Some("notes"));
        assert_eq!(value("g"), None);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let doc = PageDocument::parse("<p>x</p>");
        assert!(matches!(
            doc.select("[[["),
            Err(ExtractionError::InvalidSelector { .. })
        ));
        assert_eq!(doc.count("[[["), 0);
    }
}
