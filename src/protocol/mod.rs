use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::{json, Value};

use crate::host::WebPartHost;
use crate::model::properties::WebPartProperties;
use crate::services::pages::PagesProps;
use crate::services::theme::Theme;

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(|v| v.as_str())
}

pub fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

pub fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn to_payload<T: serde::Serialize>(id: Value, value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(v) => ok(id, v),
        Err(e) => err(id, format!("failed to serialize response: {e}")),
    }
}

/// Request id of a raw line, or null when the line is not a JSON object with one.
pub fn request_id(input: &str) -> Value {
    serde_json::from_str::<Value>(input)
        .map(|req| get_id(&req))
        .unwrap_or(Value::Null)
}

/// Runs a handler, turning a panic into an error response for request `id`.
pub async fn respond<F>(id: Value, handler: F) -> String
where
    F: Future<Output = String>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(resp) => resp,
        Err(_) => err(id, "internal core error"),
    }
}

pub async fn handle(host: &WebPartHost, input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "id": Value::Null,
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    tracing::debug!(cmd = cmd_str, "request");

    match Command::from(cmd_str) {
        Command::Ping => ok(id, json!({ "message": "tkb-core alive" })),

        Command::Init => {
            let site_url = get_str(payload, "site_url");
            let access_token = get_str(payload, "access_token");

            if let Some(props) = payload.get("properties").filter(|v| !v.is_null()) {
                match serde_json::from_value::<WebPartProperties>(props.clone()) {
                    Ok(p) => host.set_properties(p),
                    Err(e) => return err(id, format!("invalid payload.properties: {e}")),
                }
            }

            match host.init(site_url, access_token).await {
                Ok(()) => ok(id, json!({ "properties": host.properties() })),
                Err(e) => err(id, e),
            }
        }

        Command::PropertiesSet => {
            let props = match payload.get("properties") {
                Some(v) if !v.is_null() => v.clone(),
                _ => return err(id, "payload.properties is required"),
            };
            match serde_json::from_value::<WebPartProperties>(props) {
                Ok(p) => {
                    host.set_properties(p);
                    ok(id, json!({ "properties": host.properties() }))
                }
                Err(e) => err(id, format!("invalid payload.properties: {e}")),
            }
        }

        Command::Render => match host.render().await {
            Ok(outcome) => to_payload(id, &outcome),
            Err(e) => err(id, e),
        },

        Command::Dispose => {
            host.dispose();
            ok(id, json!({ "disposed": true }))
        }

        Command::ThemeChanged => {
            let theme = match payload.get("theme") {
                Some(v) if !v.is_null() => match serde_json::from_value::<Theme>(v.clone()) {
                    Ok(t) => Some(t),
                    Err(e) => return err(id, format!("invalid payload.theme: {e}")),
                },
                _ => None,
            };
            let vars = host.theme_changed(theme.as_ref());
            ok(id, json!({ "css_variables": vars }))
        }

        Command::PaneStart => match host.pane_start().await {
            Ok(cfg) => ok(id, json!({ "configuration": cfg })),
            Err(e) => err(id, e),
        },

        Command::PaneFieldChanged => {
            let path = get_str(payload, "property_path").unwrap_or("");
            if path.is_empty() {
                return err(id, "payload.property_path is required");
            }
            let new_value = payload.get("new_value").cloned().unwrap_or(Value::Null);

            match host.pane_field_changed(path, &new_value).await {
                Ok(cfg) => ok(
                    id,
                    json!({ "configuration": cfg, "properties": host.properties() }),
                ),
                Err(e) => err(id, e),
            }
        }

        Command::PaneConfig => ok(id, json!({ "configuration": host.pane_config() })),

        Command::TermClick => {
            let term_id = get_str(payload, "term_id").unwrap_or("");
            if term_id.is_empty() {
                return err(id, "payload.term_id is required");
            }
            match host.click(term_id) {
                Ok(outcome) => to_payload(id, &outcome),
                Err(e) => err(id, e),
            }
        }

        Command::PagesRender => {
            let props = if payload.is_null() {
                PagesProps::default()
            } else {
                match serde_json::from_value::<PagesProps>(payload.clone()) {
                    Ok(p) => p,
                    Err(e) => return err(id, format!("invalid pages payload: {e}")),
                }
            };
            to_payload(id, &host.pages().render(props))
        }

        Command::Unknown => err(id, "unknown command"),
    }
}
