pub mod action;
pub mod element;
pub mod protocol;

pub use action::{Action, ActionKind, ActionLog};
pub use element::{DomElement, DomEvent, ElementError, ElementSnapshot};
pub use protocol::{ControlRequest, ControlResponse};
