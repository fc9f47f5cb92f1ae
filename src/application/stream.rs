//! Helpers for building server-driven datastar SSE responses.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, ExecuteScript, PatchElements};

/// Builder for composing datastar-compatible SSE responses.
pub struct StreamBuilder {
    events: Vec<Event>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an element patch targeting the supplied selector.
    pub fn push_patch(
        &mut self,
        html: String,
        selector: &str,
        mode: ElementPatchMode,
    ) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Queue an inline script for execution on the client.
    pub fn push_script(&mut self, script: String) -> &mut Self {
        let event = ExecuteScript::new(script).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Drop every element matching `selector`.
    pub fn push_removal(&mut self, selector: &str) -> &mut Self {
        self.push_script(format!(
            "document.querySelectorAll({}).forEach((el) => el.remove());",
            js_string(selector)
        ))
    }

    /// Send the browser to `location`. Used when the session ends mid-stream.
    pub fn push_redirect(&mut self, location: &str) -> &mut Self {
        self.push_script(format!("window.location.assign({});", js_string(location)))
    }

    pub fn into_response(self) -> Response {
        let stream = stream! {
            for event in self.events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string(r#"[data-post-id="7"]"#), r#""[data-post-id=\"7\"]""#);
    }

    #[test]
    fn builder_tracks_queued_events() {
        let mut stream = StreamBuilder::new();
        assert!(stream.events.is_empty());
        stream.push_redirect("/a1p4ca/login").push_removal("#post-1");
        assert_eq!(stream.events.len(), 2);
    }
}
