#![cfg_attr(doc, doc = include_str!("../README.md"))]
#![cfg_attr(rustfmt, rustfmt_skip)]

#[cfg(feature = "cfg")]
#[doc(inline)]
pub use vchanrpc_cfg as cfg;

#[cfg(feature = "core")]
#[doc(inline)]
pub use vchanrpc_core as core;

#[cfg(feature = "dispatch")]
#[doc(inline)]
pub use vchanrpc_dispatch as dispatch;

#[cfg(feature = "rpc")]
#[doc(inline)]
pub use vchanrpc_rpc as rpc;

#[cfg(feature = "logging")]
mod logging;

#[cfg(feature = "logging")]
pub use logging::{setup_logging, LOG_ENV_VAR};
