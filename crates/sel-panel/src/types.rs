//! Core types for sel-panel

use crate::registry::PanelHandle;
use sel_backend::{SurfaceKind, SurfaceRect};
use serde::{Deserialize, Serialize};

/// Capability that gates the whole selection panel feature.
pub const SYSCAP_SELECTION: &str = "SystemCapability.SelectionInput.Selection";

/// Panel flavour, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelType {
    MenuPanel = 1,
    MainPanel = 2,
}

impl PanelType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(PanelType::MenuPanel),
            2 => Some(PanelType::MainPanel),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub(crate) fn surface_kind(self) -> SurfaceKind {
        match self {
            PanelType::MenuPanel => SurfaceKind::Menu,
            PanelType::MainPanel => SurfaceKind::Main,
        }
    }
}

/// Position and size of a panel in display coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    /// Only meaningful once the geometry has been validated as non-negative.
    pub(crate) fn to_rect(self) -> SurfaceRect {
        SurfaceRect {
            x: self.x,
            y: self.y,
            width: self.width.max(0) as u32,
            height: self.height.max(0) as u32,
        }
    }
}

/// Creation request for a panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelInfo {
    pub panel_type: PanelType,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PanelInfo {
    pub fn new(panel_type: PanelType, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            panel_type,
            x,
            y,
            width,
            height,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Hosting context of the caller. Only the non-stage model is supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageContext {
    pub stage_mode: bool,
}

/// Lifecycle state of a panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Created,
    Shown,
    Hidden,
    Destroyed,
}

/// How the selection was made.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SelectionType {
    #[default]
    MoveSelection = 1,
    DoubleClickedSelection = 2,
    TripleClickedSelection = 3,
}

impl From<SelectionType> for u8 {
    fn from(value: SelectionType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for SelectionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SelectionType::MoveSelection),
            2 => Ok(SelectionType::DoubleClickedSelection),
            3 => Ok(SelectionType::TripleClickedSelection),
            other => Err(format!("unknown selection type {}", other)),
        }
    }
}

/// Payload of `selectionCompleted`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionInfo {
    pub selection_type: SelectionType,
    pub text: String,
    pub start_display_x: i32,
    pub start_display_y: i32,
    pub end_display_x: i32,
    pub end_display_y: i32,
    pub start_window_x: i32,
    pub start_window_y: i32,
    pub end_window_x: i32,
    pub end_window_y: i32,
    pub display_id: u32,
    pub window_id: u32,
    pub bundle_name: String,
}

/// Subscription namespace an event name belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Manager,
    Panel,
}

/// The fixed set of subscribable events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    SelectionCompleted,
    Destroyed,
    Hidden,
}

impl EventType {
    pub fn name(self) -> &'static str {
        match self {
            EventType::SelectionCompleted => "selectionCompleted",
            EventType::Destroyed => "destroyed",
            EventType::Hidden => "hidden",
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            EventType::SelectionCompleted => Scope::Manager,
            EventType::Destroyed | EventType::Hidden => Scope::Panel,
        }
    }

    /// Resolve `name` within `scope`. Names from the other scope are rejected.
    pub fn parse(scope: Scope, name: &str) -> Option<Self> {
        let event = match name {
            "selectionCompleted" => EventType::SelectionCompleted,
            "destroyed" => EventType::Destroyed,
            "hidden" => EventType::Hidden,
            _ => return None,
        };
        (event.scope() == scope).then_some(event)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of panel-scoped events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelEventInfo {
    pub panel: PanelHandle,
    pub event: EventType,
}

/// What a listener receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventInfo {
    Selection(SelectionInfo),
    Panel(PanelEventInfo),
}

impl EventInfo {
    pub fn event(&self) -> EventType {
        match self {
            EventInfo::Selection(_) => EventType::SelectionCompleted,
            EventInfo::Panel(info) => info.event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_scoped() {
        assert_eq!(
            EventType::parse(Scope::Manager, "selectionCompleted"),
            Some(EventType::SelectionCompleted)
        );
        assert_eq!(EventType::parse(Scope::Panel, "selectionCompleted"), None);
        assert_eq!(
            EventType::parse(Scope::Panel, "hidden"),
            Some(EventType::Hidden)
        );
        assert_eq!(EventType::parse(Scope::Manager, "destroyed"), None);
        assert_eq!(EventType::parse(Scope::Panel, "hiddenTest"), None);
        assert_eq!(EventType::parse(Scope::Manager, ""), None);
    }

    #[test]
    fn test_panel_type_codes() {
        assert_eq!(PanelType::from_code(1), Some(PanelType::MenuPanel));
        assert_eq!(PanelType::from_code(2), Some(PanelType::MainPanel));
        assert_eq!(PanelType::from_code(0), None);
        assert_eq!(PanelType::MainPanel.code(), 2);
    }

    #[test]
    fn test_selection_info_json_shape() {
        let info: SelectionInfo = serde_json::from_str(
            r#"{"selectionType": 2, "text": "hello", "startDisplayX": 4, "bundleName": "com.example.notes"}"#,
        )
        .unwrap();
        assert_eq!(info.selection_type, SelectionType::DoubleClickedSelection);
        assert_eq!(info.text, "hello");
        assert_eq!(info.start_display_x, 4);
        assert_eq!(info.end_display_x, 0);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["selectionType"], 2);
        assert_eq!(json["bundleName"], "com.example.notes");

        assert!(serde_json::from_str::<SelectionInfo>(r#"{"selectionType": 9}"#).is_err());
    }
}
