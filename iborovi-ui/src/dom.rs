//! DOM chat view
//!
//! Draws the chat panel into the page's existing widget markup. Each part of
//! the widget is looked up by id once; a missing part only disables what
//! depends on it.

use gloo_timers::callback::Timeout;
use iborovi::chat::{ChatView, RenderedMessage};
use std::time::Duration;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

pub const WIDGET_ID: &str = "messenger-widget";
pub const MESSAGES_ID: &str = "messengerMessages";
pub const INPUT_ID: &str = "messengerInput";
pub const SEND_ID: &str = "messengerSend";
pub const TOGGLE_ID: &str = "messengerToggle";

/// Delay before scrolling, so the new element has been laid out
const SCROLL_DELAY_MS: u32 = 100;
/// Tallest the input grows while typing
const INPUT_MAX_HEIGHT_PX: i32 = 100;

pub fn html_element_by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

/// Current text of an `<input>` or `<textarea>`
pub fn input_value(input: &HtmlElement) -> String {
    if let Some(area) = input.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else if let Some(field) = input.dyn_ref::<HtmlInputElement>() {
        field.value()
    } else {
        input.text_content().unwrap_or_default()
    }
}

fn set_input_value(input: &HtmlElement, value: &str) {
    if let Some(area) = input.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value(value);
    } else if let Some(field) = input.dyn_ref::<HtmlInputElement>() {
        field.set_value(value);
    }
}

/// Grow the input with its content, up to a fixed height
pub fn adjust_input_height(input: &HtmlElement) {
    let style = input.style();
    let _ = style.set_property("height", "auto");
    let height = input.scroll_height().min(INPUT_MAX_HEIGHT_PX);
    let _ = style.set_property("height", &format!("{}px", height));
}

/// The widget's DOM parts
#[derive(Clone)]
pub struct DomView {
    document: Document,
    pub widget: Option<HtmlElement>,
    pub messages: Option<HtmlElement>,
    pub input: Option<HtmlElement>,
    pub send_button: Option<HtmlElement>,
    pub toggle_button: Option<HtmlElement>,
}

impl DomView {
    pub fn locate(document: &Document) -> Self {
        Self {
            document: document.clone(),
            widget: html_element_by_id(document, WIDGET_ID),
            messages: html_element_by_id(document, MESSAGES_ID),
            input: html_element_by_id(document, INPUT_ID),
            send_button: html_element_by_id(document, SEND_ID),
            toggle_button: html_element_by_id(document, TOGGLE_ID),
        }
    }

    /// Whether any part of the widget is on the page
    pub fn is_present(&self) -> bool {
        self.widget.is_some() || self.messages.is_some() || self.input.is_some()
    }

    pub fn input_text(&self) -> String {
        self.input.as_ref().map(input_value).unwrap_or_default()
    }

    fn create_message_element(&self, message: &RenderedMessage) -> Option<Element> {
        let element = self.document.create_element("div").ok()?;
        element.set_class_name(&message.class_name());
        element.set_inner_html(&message.inner_html());
        Some(element)
    }
}

impl ChatView for DomView {
    fn append_message(&mut self, message: &RenderedMessage) {
        let Some(container) = &self.messages else {
            return;
        };
        if let Some(element) = self.create_message_element(message) {
            let _ = container.append_child(&element);
        }
    }

    fn clear_messages(&mut self) {
        if let Some(container) = &self.messages {
            container.set_inner_html("");
        }
    }

    fn scroll_to_end(&mut self) {
        let Some(container) = self.messages.clone() else {
            return;
        };
        Timeout::new(SCROLL_DELAY_MS, move || {
            container.set_scroll_top(container.scroll_height());
        })
        .forget();
    }

    fn clear_input(&mut self) {
        if let Some(input) = &self.input {
            set_input_value(input, "");
            adjust_input_height(input);
            let _ = input.focus();
        }
    }

    fn set_collapsed(&mut self, collapsed: bool) {
        if let Some(widget) = &self.widget {
            let _ = widget
                .class_list()
                .toggle_with_force("collapsed", collapsed);
        }

        let icon = self
            .toggle_button
            .as_ref()
            .and_then(|button| button.query_selector(".toggle-icon").ok().flatten());
        if let Some(icon) = icon {
            icon.set_text_content(Some(if collapsed { "+" } else { "−" }));
        }
    }

    fn focus_input(&mut self, after: Duration) {
        let Some(input) = self.input.clone() else {
            return;
        };
        let millis = u32::try_from(after.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            let _ = input.focus();
        })
        .forget();
    }
}
