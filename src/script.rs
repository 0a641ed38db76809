//! JSON-lines command scripts.
//!
//! One command per line:
//! `{"op": "createPanel", "args": [...], "as": "menu"}` or
//! `{"op": "show", "target": "menu"}`. Listener arguments are written
//! `{"$listener": "name"}`, panel arguments `{"$panel": "label"}` and an
//! explicitly missing argument `{"$undefined": true}`.

use crate::event_bus::{self, ListenerCall};
use log::{debug, warn};
use sel_panel::bridge::{self, Reply};
use sel_panel::{
    Arg, EventInfo, Listener, Panel, PanelHandle, SelectionError, SelectionInfo, SelectionManager,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tokio::sync::broadcast::Receiver;

type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Deserialize)]
pub struct Command {
    pub op: String,
    #[serde(default)]
    pub args: Vec<Value>,
    /// Label to bind a created panel to.
    #[serde(default, rename = "as")]
    pub label: Option<String>,
    /// Panel the operation applies to; manager when absent.
    #[serde(default)]
    pub target: Option<String>,
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

pub struct Runner {
    manager: SelectionManager,
    panels: HashMap<String, Panel>,
    labels: HashMap<PanelHandle, String>,
    listeners: HashMap<String, Listener>,
}

impl Runner {
    pub fn new(manager: SelectionManager) -> Self {
        Self {
            manager,
            panels: HashMap::new(),
            labels: HashMap::new(),
            listeners: HashMap::new(),
        }
    }

    /// Parse and execute one line, returning the result record.
    pub async fn run_line(&mut self, line: &str) -> Value {
        let cmd: Command = match serde_json::from_str(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("Skipping malformed command: {}", e);
                return json!({"time": timestamp(), "ok": false, "error": e.to_string()});
            }
        };

        match self.execute(&cmd).await {
            Ok(result) => json!({"time": timestamp(), "op": cmd.op, "ok": true, "result": result}),
            Err(e) => {
                debug!("{} failed: {}", cmd.op, e);
                json!({
                    "time": timestamp(),
                    "op": cmd.op,
                    "ok": false,
                    "code": e.code().as_i32(),
                    "message": e.to_string(),
                })
            }
        }
    }

    pub async fn execute(&mut self, cmd: &Command) -> Result<Value> {
        let args = cmd
            .args
            .iter()
            .map(|value| self.to_arg(value))
            .collect::<Result<Vec<_>>>()?;
        let target = match cmd.target.as_deref() {
            Some(label) => Some(self.panel(label)?.clone()),
            None => None,
        };

        match cmd.op.as_str() {
            "notifySelection" => {
                let raw = cmd.args.first().cloned().unwrap_or_else(|| json!({}));
                let info: SelectionInfo = serde_json::from_value(raw)
                    .map_err(|e| SelectionError::param(format!("selection info: {}", e)))?;
                self.manager.notify_selection(info);
                Ok(Value::Null)
            }
            "dispose" => {
                self.manager.dispose().await;
                Ok(Value::Null)
            }
            "setSelectionActive" => match args.first() {
                Some(Arg::Bool(active)) => {
                    self.manager.session().set_selection_active(*active);
                    Ok(Value::Null)
                }
                _ => Err(SelectionError::param("setSelectionActive takes a boolean")),
            },
            "flush" => {
                self.manager.flush().await;
                Ok(Value::Null)
            }
            op => match bridge::call(&self.manager, target.as_ref(), op, &args).await? {
                Reply::Unit => Ok(Value::Null),
                Reply::Text(text) => Ok(Value::String(text)),
                Reply::Panel(panel) => {
                    let label = cmd
                        .label
                        .clone()
                        .unwrap_or_else(|| panel.handle().to_string());
                    self.labels.insert(panel.handle(), label.clone());
                    self.panels.insert(label.clone(), panel);
                    Ok(json!({"panel": label}))
                }
            },
        }
    }

    /// Release the session's listeners once the script is done.
    pub fn close(&self) {
        self.manager.close();
    }

    /// Wait for queued events, then describe every listener call since the
    /// last settle.
    pub async fn settle(&self, rx: &mut Receiver<ListenerCall>) -> Vec<Value> {
        self.manager.flush().await;
        event_bus::drain(rx)
            .into_iter()
            .map(|call| self.describe(&call))
            .collect()
    }

    fn describe(&self, call: &ListenerCall) -> Value {
        match &call.info {
            EventInfo::Selection(info) => json!({
                "time": timestamp(),
                "listener": call.listener,
                "event": call.info.event().name(),
                "info": serde_json::to_value(info).unwrap_or(Value::Null),
            }),
            EventInfo::Panel(info) => json!({
                "time": timestamp(),
                "listener": call.listener,
                "event": info.event.name(),
                "panel": self.label(info.panel),
            }),
        }
    }

    fn label(&self, handle: PanelHandle) -> String {
        self.labels
            .get(&handle)
            .cloned()
            .unwrap_or_else(|| handle.to_string())
    }

    fn panel(&self, label: &str) -> Result<&Panel> {
        self.panels
            .get(label)
            .ok_or_else(|| SelectionError::param(format!("no panel labelled '{}'", label)))
    }

    /// Same name, same listener, so `off` can find what `on` registered.
    fn listener(&mut self, name: &str) -> Listener {
        self.listeners
            .entry(name.to_string())
            .or_insert_with(|| {
                let name = name.to_string();
                Listener::new(move |info| {
                    event_bus::send(ListenerCall {
                        listener: name.clone(),
                        info: info.clone(),
                    })
                })
            })
            .clone()
    }

    fn to_arg(&mut self, value: &Value) -> Result<Arg> {
        let Some(map) = single_key(value) else {
            return Ok(value.clone().into());
        };
        match map.iter().next() {
            Some((key, Value::String(name))) if key == "$listener" => {
                Ok(Arg::Function(self.listener(name)))
            }
            Some((key, Value::String(label))) if key == "$panel" => {
                Ok(Arg::Panel(self.panel(label)?.clone()))
            }
            Some((key, _)) if key == "$undefined" => Ok(Arg::Undefined),
            _ => Ok(value.clone().into()),
        }
    }
}

fn single_key(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object().filter(|map| map.len() == 1)
}
