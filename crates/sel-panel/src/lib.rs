//! sel-panel - Selection panel manager
//!
//! Features:
//! - Menu and main panels with a created/shown/hidden/destroyed lifecycle
//! - Generation-checked handles, so stale panels are always detected
//! - Manager and per-panel subscriptions dispatched off the caller's thread
//! - Host-call layer for loosely typed arguments

pub mod args;
pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod panel;
pub mod registry;
pub mod session;
pub mod types;
pub mod validator;

pub use args::Arg;
pub use bridge::Reply;
pub use config::SessionConfig;
pub use error::{ErrorCode, SelectionError};
pub use events::{EventHub, Listener, ScopeKey};
pub use manager::SelectionManager;
pub use panel::{Panel, PanelSnapshot};
pub use registry::{PanelHandle, PanelRegistry};
pub use session::{Session, SessionBuilder};
pub use types::{
    EventInfo, EventType, Geometry, PanelEventInfo, PanelInfo, PanelState, PanelType, Scope,
    SelectionInfo, SelectionType, StageContext, SYSCAP_SELECTION,
};
