/// Handles Server - ATProto handle resolution
///
/// Answers HTTPS handle verification for the AT Protocol: the request
/// hostname is the handle, and the server either returns its DID from
/// `/.well-known/atproto-did` or redirects the visitor elsewhere.

pub mod api;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod identity;
pub mod server;
pub mod template;

pub use config::ServerConfig;
pub use context::AppContext;
pub use error::{HandlesError, HandlesResult};
