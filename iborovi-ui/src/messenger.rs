//! Chat widget mounting
//!
//! Builds a `ChatController` over the page's widget markup and local storage,
//! wires the widget's own events and the page-wide shortcuts, and hands the
//! page script a `Messenger` handle exposing the public chat calls.

use gloo_timers::callback::Timeout;
use iborovi::chat::{ChatConfig, ChatController, ScheduledReply, Sender};
use iborovi::shortcuts::{KeyChord, Shortcut, ShortcutHandle, ShortcutRegistry, CLEAR_CONFIRM_PROMPT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent};

use crate::dom::{adjust_input_height, DomView};
use crate::listeners::EventListener;
use crate::storage::LocalStorage;

type Controller = ChatController<LocalStorage, DomView, StdRng>;
type SharedController = Rc<RefCell<Controller>>;

/// Handle to a mounted chat widget
///
/// Dropping it (`free()` from JS) detaches every listener it added. Replies
/// already scheduled still arrive.
#[wasm_bindgen]
pub struct Messenger {
    controller: SharedController,
    _listeners: Vec<EventListener>,
    _shortcut: ShortcutHandle,
}

/// Mount the chat widget found on the page
///
/// Returns `undefined` when neither the widget nor its parts are present.
#[wasm_bindgen(js_name = mountMessenger)]
pub fn mount_messenger() -> Option<Messenger> {
    let window = web_sys::window()?;
    let document = window.document()?;

    let view = DomView::locate(&document);
    if !view.is_present() {
        return None;
    }

    let controller = Rc::new(RefCell::new(ChatController::new(
        ChatConfig::default(),
        LocalStorage::open(),
        view.clone(),
        StdRng::from_entropy(),
    )));

    let mut listeners = Vec::new();

    if let Some(send) = &view.send_button {
        let controller = Rc::clone(&controller);
        listeners.extend(EventListener::new(send, "click", move |_| submit(&controller)));
    }

    if let Some(input) = &view.input {
        let on_enter = Rc::clone(&controller);
        listeners.extend(EventListener::new(input, "keypress", move |event: Event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if key.key() == "Enter" && !key.shift_key() {
                event.prevent_default();
                submit(&on_enter);
            }
        }));

        let resized = input.clone();
        listeners.extend(EventListener::new(input, "input", move |_| {
            adjust_input_height(&resized);
        }));
    }

    if let Some(toggle) = &view.toggle_button {
        let controller = Rc::clone(&controller);
        listeners.extend(EventListener::new(toggle, "click", move |_| {
            controller.borrow_mut().toggle_collapse();
        }));
    }

    if let (Some(widget), Some(input)) = (&view.widget, &view.input) {
        let input = input.clone();
        listeners.extend(EventListener::new(widget, "click", move |event: Event| {
            let on_toggle = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(".messenger-toggle").ok().flatten())
                .is_some();
            if !on_toggle {
                let _ = input.focus();
            }
        }));
    }

    let shortcuts = ShortcutRegistry::new();
    let shortcut = {
        let controller = Rc::clone(&controller);
        let window = window.clone();
        shortcuts.register(move |shortcut| match shortcut {
            Shortcut::ToggleMessenger => {
                controller.borrow_mut().toggle_collapse();
            }
            Shortcut::ClearChat => {
                if window.confirm_with_message(CLEAR_CONFIRM_PROMPT).unwrap_or(false) {
                    controller.borrow_mut().clear();
                }
            }
        })
    };

    listeners.extend(EventListener::new(&document, "keydown", move |event: Event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let chord = KeyChord {
            key: key.key(),
            ctrl: key.ctrl_key(),
            meta: key.meta_key(),
            shift: key.shift_key(),
            alt: key.alt_key(),
        };
        if shortcuts.dispatch(&chord).is_some() {
            event.prevent_default();
        }
    }));

    Some(Messenger {
        controller,
        _listeners: listeners,
        _shortcut: shortcut,
    })
}

fn submit(controller: &SharedController) {
    let text = controller.borrow().view().input_text();
    let reply = controller.borrow_mut().submit(&text);
    if let Some(reply) = reply {
        schedule(controller, reply);
    }
}

/// Deliver `reply` once its delay has passed
fn schedule(controller: &SharedController, reply: ScheduledReply) {
    let controller = Rc::clone(controller);
    let millis = u32::try_from(reply.delay.as_millis()).unwrap_or(u32::MAX);
    Timeout::new(millis, move || {
        controller.borrow_mut().deliver_reply(reply);
    })
    .forget();
}

#[wasm_bindgen]
impl Messenger {
    /// Name used for the visitor's next messages
    #[wasm_bindgen(js_name = setUsername)]
    pub fn set_username(&self, username: &str) {
        self.controller.borrow_mut().set_username(username);
    }

    /// Append a message without a reply; `sender` is "user" (default) or "system"
    #[wasm_bindgen(js_name = addCustomMessage)]
    pub fn add_custom_message(&self, text: &str, sender: Option<String>) {
        let sender = match sender.as_deref().map(str::parse::<Sender>) {
            None => Sender::User,
            Some(Ok(sender)) => sender,
            Some(Err(e)) => {
                crate::warn(&format!("{}, posting as user", e));
                Sender::User
            }
        };
        self.controller.borrow_mut().add_custom_message(text, sender);
    }

    /// Drop the log and show the welcome messages again
    #[wasm_bindgen(js_name = clearMessages)]
    pub fn clear_messages(&self) {
        self.controller.borrow_mut().clear();
    }

    /// Collapse or expand the panel; returns whether it is now collapsed
    #[wasm_bindgen(js_name = toggleCollapse)]
    pub fn toggle_collapse(&self) -> bool {
        self.controller.borrow_mut().toggle_collapse()
    }

    #[wasm_bindgen(js_name = messageCount)]
    pub fn message_count(&self) -> usize {
        self.controller.borrow().messages().len()
    }
}
