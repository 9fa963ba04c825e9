use serde::Deserialize;
use wasm_bindgen::prelude::*;

use threadmark_core::dto::{block_views, segment_views};
use threadmark_core::{HtmlEmitOptions, UserDirectory};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOptions {
    mention_prefix: Option<String>,
    open_links_in_new_tab: Option<bool>,
}

#[wasm_bindgen(js_name = formatInline)]
pub fn format_inline(text: &str, users: JsValue) -> Result<JsValue, JsValue> {
    let users = users_from_js(users)?;
    let inlines = threadmark_core::format_inline(text, users.as_ref());
    to_js(&segment_views(&inlines))
}

#[wasm_bindgen(js_name = formatMessage)]
pub fn format_message(text: &str, users: JsValue) -> Result<JsValue, JsValue> {
    let users = users_from_js(users)?;
    let blocks = threadmark_core::format_message(text, users.as_ref());
    to_js(&block_views(&blocks))
}

/// Formats a message and returns sanitized HTML.
#[wasm_bindgen(js_name = renderHtml)]
pub fn render_html(text: &str, users: JsValue, options: JsValue) -> Result<String, JsValue> {
    let users = users_from_js(users)?;
    let options = options_from_js(options)?;
    let blocks = threadmark_core::format_message(text, users.as_ref());
    Ok(threadmark_core::emit_html_sanitized_with_options(
        &blocks, &options,
    ))
}

/// Caching formatter for views that re-render the same messages.
#[wasm_bindgen]
pub struct MessageFormatter {
    inner: threadmark_core::MessageFormatter,
}

#[wasm_bindgen]
impl MessageFormatter {
    #[wasm_bindgen(constructor)]
    pub fn new(capacity: usize, users: JsValue) -> Result<MessageFormatter, JsValue> {
        let users = users_from_js(users)?.unwrap_or_default();
        Ok(MessageFormatter {
            inner: threadmark_core::MessageFormatter::with_users(capacity, users),
        })
    }

    #[wasm_bindgen(js_name = setUsers)]
    pub fn set_users(&mut self, users: JsValue) -> Result<(), JsValue> {
        let users = users_from_js(users)?.unwrap_or_default();
        self.inner.set_users(users);
        Ok(())
    }

    pub fn format(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let blocks = self.inner.format(text);
        to_js(&block_views(&blocks))
    }

    #[wasm_bindgen(js_name = renderHtml)]
    pub fn render_html(&mut self, text: &str, options: JsValue) -> Result<String, JsValue> {
        let options = options_from_js(options)?;
        let blocks = self.inner.format(text);
        Ok(threadmark_core::emit_html_sanitized_with_options(
            &blocks, &options,
        ))
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.len()
    }
}

fn users_from_js(value: JsValue) -> Result<Option<UserDirectory>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    let users: UserDirectory =
        serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))?;
    tracing::debug!(users = users.len(), "loaded user directory");
    Ok(Some(users))
}

fn options_from_js(value: JsValue) -> Result<HtmlEmitOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(HtmlEmitOptions::default());
    }
    let parsed: RenderOptions =
        serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let mut out = HtmlEmitOptions::default();
    if let Some(mention_prefix) = parsed.mention_prefix {
        out.mention_prefix = mention_prefix;
    }
    if let Some(open_links_in_new_tab) = parsed.open_links_in_new_tab {
        out.open_links_in_new_tab = open_links_in_new_tab;
    }
    Ok(out)
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}
