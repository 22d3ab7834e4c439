//! Protobuf message types for the `rpc` package.

use std::collections::HashMap;

/// Placeholder for calls without arguments or results.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Empty {}

/// Reply of `SendChannelMessage`. An empty `message` means success.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Error {
    #[prost(string, tag = "1")]
    pub message: String,
}

/// A message destined for an IRC channel.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ChannelMessage {
    #[prost(string, tag = "1")]
    pub channel: String,
    #[prost(string, tag = "2")]
    pub message: String,
}

impl ChannelMessage {
    pub fn new(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

/// An HTTP request received by the bot host and forwarded to a plugin.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct HttpRequest {
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(bytes = "vec", tag = "2")]
    pub body: Vec<u8>,
    #[prost(map = "string, string", tag = "3")]
    pub header: HashMap<String, String>,
    #[prost(string, tag = "4")]
    pub method: String,
}

/// The plugin's answer to an [`HttpRequest`].
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct HttpResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub body: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub status: i32,
    #[prost(map = "string, string", tag = "3")]
    pub header: HashMap<String, String>,
}

impl HttpResponse {
    /// Build a response with no extra headers.
    pub fn new(status: i32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            status,
            header: HashMap::new(),
        }
    }
}
