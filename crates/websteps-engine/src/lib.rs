pub mod api;
pub mod capture;
pub mod config;
pub mod consolidate;
pub mod export;
pub mod formatter;
pub mod recorder;
pub mod replay;
pub mod scheduler;
pub mod selector;
pub mod storage;
pub mod upload;

pub use websteps_common::action;
pub use websteps_common::element;
pub use websteps_common::protocol;
