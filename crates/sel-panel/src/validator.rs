//! Argument validation.
//!
//! Nothing in here looks at panel state; every check is decided by the
//! arguments alone and fails with a parameter error.

use crate::args::Arg;
use crate::error::{Result, SelectionError};
use crate::events::Listener;
use crate::panel::Panel;
use crate::types::{EventType, PanelInfo, PanelType, Scope, StageContext};
use serde_json::{Map, Value};

pub fn event(scope: Scope, name: &str) -> Result<EventType> {
    EventType::parse(scope, name)
        .ok_or_else(|| SelectionError::param(format!("unknown event type '{}'", name)))
}

pub fn context(ctx: &StageContext) -> Result<()> {
    if ctx.stage_mode {
        return Err(SelectionError::param("stage mode context is not supported"));
    }
    Ok(())
}

pub fn panel_info(info: &PanelInfo) -> Result<()> {
    for (name, value) in [
        ("x", info.x),
        ("y", info.y),
        ("width", info.width),
        ("height", info.height),
    ] {
        non_negative(name, value)?;
    }
    Ok(())
}

pub fn position(x: i32, y: i32) -> Result<()> {
    non_negative("x", x)?;
    non_negative("y", y)
}

pub fn route(route: &str) -> Result<()> {
    if route.is_empty() {
        return Err(SelectionError::param("path must be a non-empty string"));
    }
    Ok(())
}

fn non_negative(name: &str, value: i32) -> Result<()> {
    if value < 0 {
        return Err(SelectionError::param(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

// ============ Host-call arguments ============

fn mistyped(name: &str, expected: &str, arg: &Arg) -> SelectionError {
    SelectionError::param(format!(
        "{} must be {}, got {}",
        name,
        expected,
        arg.type_name()
    ))
}

pub fn arg_event(scope: Scope, arg: &Arg) -> Result<EventType> {
    match arg {
        Arg::String(name) => event(scope, name),
        other => Err(mistyped("type", "a string", other)),
    }
}

/// A listener that must be present.
pub fn arg_listener(arg: &Arg) -> Result<Listener> {
    match arg {
        Arg::Function(listener) => Ok(listener.clone()),
        other => Err(mistyped("callback", "a function", other)),
    }
}

/// A listener that may be omitted; null and undefined both mean "none".
pub fn arg_optional_listener(arg: &Arg) -> Result<Option<Listener>> {
    match arg {
        Arg::Undefined | Arg::Null => Ok(None),
        other => arg_listener(other).map(Some),
    }
}

pub fn arg_i32(arg: &Arg, name: &str) -> Result<i32> {
    match arg {
        Arg::Number(value) => integer(*value, name),
        other => Err(mistyped(name, "a number", other)),
    }
}

pub fn arg_str<'a>(arg: &'a Arg, name: &str) -> Result<&'a str> {
    match arg {
        Arg::String(value) => Ok(value),
        other => Err(mistyped(name, "a string", other)),
    }
}

pub fn arg_panel(arg: &Arg) -> Result<&Panel> {
    match arg {
        Arg::Panel(panel) => Ok(panel),
        other => Err(mistyped("panel", "a panel", other)),
    }
}

/// `{stageMode: boolean}`
pub fn arg_context(arg: &Arg) -> Result<StageContext> {
    let Arg::Object(map) = arg else {
        return Err(mistyped("ctx", "an object", arg));
    };
    match map.get("stageMode") {
        Some(Value::Bool(stage_mode)) => Ok(StageContext {
            stage_mode: *stage_mode,
        }),
        _ => Err(SelectionError::param("ctx.stageMode must be a boolean")),
    }
}

/// `{panelType, x, y, width, height}`
pub fn arg_panel_info(arg: &Arg) -> Result<PanelInfo> {
    let Arg::Object(map) = arg else {
        return Err(mistyped("info", "an object", arg));
    };
    let code = field_i32(map, "panelType")?;
    let panel_type = PanelType::from_code(code.into())
        .ok_or_else(|| SelectionError::param(format!("unknown panelType {}", code)))?;
    Ok(PanelInfo::new(
        panel_type,
        field_i32(map, "x")?,
        field_i32(map, "y")?,
        field_i32(map, "width")?,
        field_i32(map, "height")?,
    ))
}

fn field_i32(map: &Map<String, Value>, name: &str) -> Result<i32> {
    match map.get(name).and_then(Value::as_f64) {
        Some(value) => integer(value, name),
        None => Err(SelectionError::param(format!("info.{} must be a number", name))),
    }
}

fn integer(value: f64, name: &str) -> Result<i32> {
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    if !value.is_finite() || value.fract() != 0.0 || !in_range {
        return Err(SelectionError::param(format!(
            "{} must be an integer in range, got {}",
            name, value
        )));
    }
    Ok(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn code<T: std::fmt::Debug>(result: Result<T>) -> i32 {
        result.unwrap_err().code().as_i32()
    }

    #[test]
    fn test_geometry_checks() {
        let info = PanelInfo::new(PanelType::MenuPanel, 0, 0, 100, 100);
        assert!(panel_info(&info).is_ok());
        assert_eq!(code(panel_info(&PanelInfo { x: -1, ..info })), 401);
        assert_eq!(code(panel_info(&PanelInfo { height: -100, ..info })), 401);
        assert_eq!(code(position(0, -1)), 401);
    }

    #[test]
    fn test_context_rejects_stage_mode() {
        assert!(context(&StageContext { stage_mode: false }).is_ok());
        assert_eq!(code(context(&StageContext { stage_mode: true })), 401);
    }

    #[test]
    fn test_arg_context_shape() {
        assert_eq!(
            arg_context(&json!({"stageMode": false}).into()).unwrap(),
            StageContext { stage_mode: false }
        );
        assert_eq!(code(arg_context(&json!({}).into())), 401);
        assert_eq!(code(arg_context(&json!({"stageMode": "no"}).into())), 401);
        assert_eq!(code(arg_context(&Arg::Null)), 401);
        assert_eq!(code(arg_context(&Arg::Undefined)), 401);
    }

    #[test]
    fn test_arg_panel_info_shape() {
        let info = arg_panel_info(
            &json!({"panelType": 2, "x": 10, "y": 20, "width": 300, "height": 40}).into(),
        )
        .unwrap();
        assert_eq!(info, PanelInfo::new(PanelType::MainPanel, 10, 20, 300, 40));

        for bad in [
            json!({"panelType": 1, "x": 0, "y": 0, "width": 100}),
            json!({"panelType": 3, "x": 0, "y": 0, "width": 100, "height": 100}),
            json!({"panelType": 1, "x": "0", "y": 0, "width": 100, "height": 100}),
            json!({"panelType": 1, "x": 0.5, "y": 0, "width": 100, "height": 100}),
            json!({"panelType": 1, "x": 1e12, "y": 0, "width": 100, "height": 100}),
            json!([1, 0, 0, 100, 100]),
        ] {
            assert_eq!(code(arg_panel_info(&bad.into())), 401);
        }
    }

    #[test]
    fn test_arg_listener_presence() {
        let listener = Listener::new(|_| {});
        assert!(arg_listener(&Arg::Function(listener.clone())).is_ok());
        assert_eq!(code(arg_listener(&Arg::Undefined)), 401);
        assert_eq!(code(arg_listener(&Arg::Null)), 401);
        assert_eq!(code(arg_listener(&"hidden".into())), 401);

        assert!(arg_optional_listener(&Arg::Null).unwrap().is_none());
        assert!(arg_optional_listener(&Arg::Undefined).unwrap().is_none());
        assert!(arg_optional_listener(&listener.into()).unwrap().is_some());
        assert_eq!(code(arg_optional_listener(&Arg::Number(1.0))), 401);
    }

    #[test]
    fn test_arg_event_requires_known_string() {
        assert_eq!(
            arg_event(Scope::Panel, &"destroyed".into()).unwrap(),
            EventType::Destroyed
        );
        assert_eq!(code(arg_event(Scope::Panel, &"destroyedTest".into())), 401);
        assert_eq!(code(arg_event(Scope::Manager, &Arg::Undefined)), 401);
        assert_eq!(code(arg_event(Scope::Manager, &Arg::Null)), 401);
        assert_eq!(
            code(arg_event(Scope::Panel, &Listener::new(|_| {}).into())),
            401
        );
    }

    #[test]
    fn test_arg_numbers_and_strings() {
        assert_eq!(arg_i32(&Arg::from(20_i32), "x").unwrap(), 20);
        assert_eq!(code(arg_i32(&Arg::Null, "x")), 401);
        assert_eq!(code(arg_i32(&"20".into(), "x")), 401);
        assert_eq!(arg_str(&"pages/a".into(), "path").unwrap(), "pages/a");
        assert_eq!(code(arg_str(&Arg::Undefined, "path")), 401);
    }
}
