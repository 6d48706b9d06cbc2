use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::scraping::document::{control_value, element_text, option_value};

const CONTROLS: &str = "input, select, textarea";

/// Synthetic DOM events the filler fires so the target page's own
/// listeners and validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormEvent {
    Input,
    Change,
    Blur,
}

/// Opaque reference to a control found on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldHandle(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// The page being filled. Single-threaded: implementations may wrap
/// non-`Send` DOM handles.
#[async_trait(?Send)]
pub trait FormTarget {
    /// First form control matching the CSS selector group, in document order.
    async fn find_control(&self, selector: &str) -> Option<FieldHandle>;

    /// Options of a `<select>`; empty for other controls.
    async fn options(&self, handle: FieldHandle) -> Vec<SelectOption>;

    async fn value(&self, handle: FieldHandle) -> String;

    async fn set_value(&mut self, handle: FieldHandle, value: &str);

    async fn dispatch(&mut self, handle: FieldHandle, event: FormEvent);
}

#[derive(Debug, Clone)]
struct ControlState {
    value: String,
    options: Vec<SelectOption>,
    events: Vec<FormEvent>,
}

impl ControlState {
    fn from_element(element: &ElementRef) -> Self {
        let options = match Selector::parse("option") {
            Ok(selector) if element.value().name() == "select" => element
                .select(&selector)
                .map(|o| SelectOption {
                    value: option_value(&o),
                    label: element_text(&o),
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            value: control_value(element).unwrap_or_default(),
            options,
            events: Vec::new(),
        }
    }
}

/// In-memory target over an HTML snapshot. Records every value write and
/// dispatched event so callers can inspect what a fill did.
pub struct HtmlFormTarget {
    html: Html,
    controls: Vec<ControlState>,
}

impl HtmlFormTarget {
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);
        let controls = match Selector::parse(CONTROLS) {
            Ok(selector) => html
                .select(&selector)
                .map(|el| ControlState::from_element(&el))
                .collect(),
            Err(_) => Vec::new(),
        };
        Self { html, controls }
    }

    fn locate(&self, selector: &str) -> Option<usize> {
        let wanted = Selector::parse(selector).ok()?;
        let all = Selector::parse(CONTROLS).ok()?;
        let target = self
            .html
            .select(&wanted)
            .find(|el| matches!(el.value().name(), "input" | "select" | "textarea"))?;
        self.html.select(&all).position(|el| el.id() == target.id())
    }

    /// Current value of the first control matching `selector`.
    pub fn value_of(&self, selector: &str) -> Option<&str> {
        let index = self.locate(selector)?;
        self.controls.get(index).map(|c| c.value.as_str())
    }

    /// Events dispatched so far on the first control matching `selector`.
    pub fn events_of(&self, selector: &str) -> Option<&[FormEvent]> {
        let index = self.locate(selector)?;
        self.controls.get(index).map(|c| c.events.as_slice())
    }
}

#[async_trait(?Send)]
impl FormTarget for HtmlFormTarget {
    async fn find_control(&self, selector: &str) -> Option<FieldHandle> {
        self.locate(selector).map(FieldHandle)
    }

    async fn options(&self, handle: FieldHandle) -> Vec<SelectOption> {
        self.controls
            .get(handle.0)
            .map(|c| c.options.clone())
            .unwrap_or_default()
    }

    async fn value(&self, handle: FieldHandle) -> String {
        self.controls
            .get(handle.0)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    async fn set_value(&mut self, handle: FieldHandle, value: &str) {
        if let Some(control) = self.controls.get_mut(handle.0) {
            control.value = value.to_string();
        }
    }

    async fn dispatch(&mut self, handle: FieldHandle, event: FormEvent) {
        if let Some(control) = self.controls.get_mut(handle.0) {
            control.events.push(event);
        }
    }
}
