//! Live status counters
//!
//! Polls the decapi endpoints from the browser and updates the live badge,
//! viewer and follower counters, stream links and the stream card. Helix is
//! not polled from the page since it would expose an access token.

use gloo_net::http::Request;
use gloo_timers::callback::Interval;
use iborovi::status::{StatusConfig, StatusError, StreamStatus};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::dom::html_element_by_id;

/// Handle to the running status poll; `free()` stops it
#[wasm_bindgen]
pub struct StatusPolling {
    _interval: Interval,
}

/// Poll now and then every `poll_interval_secs`
#[wasm_bindgen(js_name = startStatusPolling)]
pub fn start_status_polling(channel: Option<String>) -> StatusPolling {
    let mut config = StatusConfig::default();
    if let Some(channel) = channel.filter(|c| !c.is_empty()) {
        config.channel = channel;
    }
    let config = Rc::new(config);

    spawn_poll(Rc::clone(&config));

    let millis = u32::try_from(config.poll_interval().as_millis()).unwrap_or(u32::MAX);
    let interval = Interval::new(millis, move || spawn_poll(Rc::clone(&config)));

    StatusPolling {
        _interval: interval,
    }
}

fn spawn_poll(config: Rc<StatusConfig>) {
    wasm_bindgen_futures::spawn_local(async move {
        let status = match fetch_status(&config).await {
            Ok(status) => status,
            Err(e) => {
                crate::warn(&format!("Could not fetch stream status: {}", e));
                StreamStatus::offline(config.static_followers)
            }
        };

        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            apply_status(&document, &status, &config.channel);
        }
    });
}

async fn get_text(url: &str) -> Result<String, StatusError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| StatusError::Request(e.to_string()))?;

    if !response.ok() {
        return Err(StatusError::Api {
            status: response.status(),
            message: response.text().await.unwrap_or_default(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| StatusError::Parse(e.to_string()))
}

async fn fetch_status(config: &StatusConfig) -> Result<StreamStatus, StatusError> {
    let uptime = get_text(&config.decapi_uptime_url()).await?;

    let viewers = if iborovi::status::uptime_indicates_live(&uptime) {
        match get_text(&config.decapi_viewers_url()).await {
            Ok(body) => Some(body),
            Err(e) => {
                crate::warn(&format!("Could not fetch viewer count: {}", e));
                None
            }
        }
    } else {
        None
    };

    Ok(StreamStatus::from_decapi(
        &uptime,
        viewers.as_deref(),
        config.static_followers,
    ))
}

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(element) = document.get_element_by_id(id) {
        element.set_text_content(Some(text));
    }
}

fn set_display(document: &Document, id: &str, visible: bool) {
    if let Some(element) = html_element_by_id(document, id) {
        let _ = element
            .style()
            .set_property("display", if visible { "block" } else { "none" });
    }
}

/// Write `status` into every counter present on the page
pub fn apply_status(document: &Document, status: &StreamStatus, channel: &str) {
    let followers = status.follower_text();
    set_text(document, "realtime-followers", &followers);
    set_text(document, "footer-realtime-followers", &followers);

    if let Some(avatar) = document.get_element_by_id("avatar-status") {
        let dot = avatar
            .query_selector(".status-dot")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(dot) = dot {
            let _ = dot.style().set_property("background", status.dot_color());
        }
        if let Ok(Some(label)) = avatar.query_selector("span") {
            label.set_text_content(Some(status.live_label()));
        }
    }

    set_display(document, "stream-link", status.show_stream_links());
    set_display(document, "nav-stream-link", status.show_stream_links());

    if status.live {
        let viewers = status.viewer_text();
        set_text(document, "nav-viewers", &viewers);
        set_text(document, "viewer-count", &viewers);
    }

    if let Ok(counters) = document.query_selector_all(".stat-value") {
        for (index, text) in status.stat_values().iter().enumerate() {
            if let Some(counter) = u32::try_from(index).ok().and_then(|i| counters.get(i)) {
                counter.set_text_content(Some(text));
            }
        }
    }

    if let Ok(Some(pill)) = document.query_selector(".status-pill") {
        pill.set_text_content(Some(&status.pill_text(channel)));
        pill.set_class_name(status.pill_class());
    }

    if let Ok(Some(card)) = document.query_selector(".stream-card") {
        card.set_class_name(if status.live {
            "stream-card online"
        } else {
            "stream-card offline"
        });
    }
}
