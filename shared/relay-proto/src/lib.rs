//! IRC Bot Host Plugin Protocol
//!
//! Protobuf messages and gRPC client stubs for the `rpc.IRCPlugin` and
//! `rpc.HTTPPlugin` services (see `proto/plugin.proto`).

pub mod http_plugin;
pub mod irc_plugin;
pub mod messages;
pub mod metadata;

pub use http_plugin::HttpPluginClient;
pub use irc_plugin::IrcPluginClient;
pub use messages::*;
