//! cirrus-provider: the concrete provider layer on top of cirrus-core.
//!
//! Supplies the reqwest-backed transport, provider-level configuration
//! (base URL, project/region defaults, credentials), the file-backed
//! state store, and the resource schemas the provider manages.

pub mod client;
pub mod config;
pub mod resources;
pub mod statefile;

pub use client::HttpTransport;
pub use config::ProviderConfig;
pub use statefile::FileStateStore;
