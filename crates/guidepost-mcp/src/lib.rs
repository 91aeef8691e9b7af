//! MCP-style stdio server exposing semantic guideline search as a tool.
//!
//! The binary reads newline-delimited JSON-RPC 2.0 requests on stdin and
//! writes responses on stdout; logs go to stderr so the protocol stream
//! stays clean.

pub mod protocol;
pub mod server;
pub mod transport;
