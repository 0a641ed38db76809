//! Host-facing entry points taking loosely typed arguments.
//!
//! Each function decodes its arguments with the validator and forwards to
//! the typed API. Decoding happens before any state is looked at, so a bad
//! argument is always a parameter error.

use crate::args::{nth, Arg};
use crate::error::{Result, SelectionError};
use crate::manager::SelectionManager;
use crate::panel::Panel;
use crate::types::Scope;
use crate::validator;
use log::trace;

/// What a host call resolves to.
#[derive(Debug)]
pub enum Reply {
    Unit,
    Panel(Panel),
    Text(String),
}

// ============ Manager ============

/// `on(type, callback)`
pub fn on(manager: &SelectionManager, args: &[Arg]) -> Result<()> {
    let event = validator::arg_event(Scope::Manager, nth(args, 0))?;
    let listener = validator::arg_listener(nth(args, 1))?;
    manager.on(event.name(), listener)
}

/// `off(type, callback?)`
pub fn off(manager: &SelectionManager, args: &[Arg]) -> Result<()> {
    let event = validator::arg_event(Scope::Manager, nth(args, 0))?;
    let listener = validator::arg_optional_listener(nth(args, 1))?;
    manager.off(event.name(), listener.as_ref())
}

/// `createPanel(ctx, info)`
pub async fn create_panel(manager: &SelectionManager, args: &[Arg]) -> Result<Panel> {
    let ctx = validator::arg_context(nth(args, 0))?;
    let info = validator::arg_panel_info(nth(args, 1))?;
    manager.create_panel(&ctx, &info).await
}

/// `destroyPanel(panel)`
pub async fn destroy_panel(manager: &SelectionManager, args: &[Arg]) -> Result<()> {
    let panel = validator::arg_panel(nth(args, 0))?;
    manager.destroy_panel(panel).await
}

/// `getSelectionContent()`
pub async fn get_selection_content(manager: &SelectionManager) -> Result<String> {
    manager.get_selection_content().await
}

// ============ Panel ============

/// `panel.on(type, callback)`
pub fn panel_on(panel: &Panel, args: &[Arg]) -> Result<()> {
    let event = validator::arg_event(Scope::Panel, nth(args, 0))?;
    let listener = validator::arg_listener(nth(args, 1))?;
    panel.on(event.name(), listener)
}

/// `panel.off(type, callback?)`
pub fn panel_off(panel: &Panel, args: &[Arg]) -> Result<()> {
    let event = validator::arg_event(Scope::Panel, nth(args, 0))?;
    let listener = validator::arg_optional_listener(nth(args, 1))?;
    panel.off(event.name(), listener.as_ref())
}

/// `panel.moveTo(x, y)`
pub async fn move_to(panel: &Panel, args: &[Arg]) -> Result<()> {
    let x = validator::arg_i32(nth(args, 0), "x")?;
    let y = validator::arg_i32(nth(args, 1), "y")?;
    panel.move_to(x, y).await
}

/// `panel.setUiContent(path)`
pub async fn set_ui_content(panel: &Panel, args: &[Arg]) -> Result<()> {
    let route = validator::arg_str(nth(args, 0), "path")?;
    panel.set_ui_content(route).await
}

/// Route a named call. Panel methods need `target`; manager methods ignore it.
pub async fn call(
    manager: &SelectionManager,
    target: Option<&Panel>,
    op: &str,
    args: &[Arg],
) -> Result<Reply> {
    trace!("call {} with {} arg(s)", op, args.len());
    let panel = || target.ok_or_else(|| SelectionError::param(format!("{} needs a panel", op)));

    match op {
        "on" => {
            match target {
                Some(panel) => panel_on(panel, args)?,
                None => on(manager, args)?,
            }
            Ok(Reply::Unit)
        }
        "off" => {
            match target {
                Some(panel) => panel_off(panel, args)?,
                None => off(manager, args)?,
            }
            Ok(Reply::Unit)
        }
        "createPanel" => create_panel(manager, args).await.map(Reply::Panel),
        "destroyPanel" => destroy_panel(manager, args).await.map(|_| Reply::Unit),
        "getSelectionContent" => get_selection_content(manager).await.map(Reply::Text),
        "moveTo" => move_to(panel()?, args).await.map(|_| Reply::Unit),
        "show" => panel()?.show().await.map(|_| Reply::Unit),
        "hide" => panel()?.hide().await.map(|_| Reply::Unit),
        "setUiContent" => set_ui_content(panel()?, args).await.map(|_| Reply::Unit),
        "startMoving" => panel()?.start_moving().await.map(|_| Reply::Unit),
        other => Err(SelectionError::param(format!("unknown method '{}'", other))),
    }
}
