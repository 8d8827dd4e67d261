//! API module for HTTP, WebSocket and SSE endpoints
//!
//! This module provides the REST query service and the live-update streams.

pub mod http;
pub mod rest;
pub mod sse;
pub mod websocket;
