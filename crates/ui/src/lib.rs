#![forbid(unsafe_code)]

pub mod context;
pub mod host;
pub mod routes;
pub mod views;
pub mod vm;

pub use context::{AppContext, UiApp, build_app_context};
pub use host::{GameHost, HostEvent, HostHandle};
pub use routes::{Navigator, Route, noop_navigator};
