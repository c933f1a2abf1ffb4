//! Testing infrastructure
//!
//! This module provides:
//! - [`RecordingGateway`], an in-memory [`RequestGateway`](crate::RequestGateway)
//!   that records every call and can be scripted to fail
//! - [`CallLog`] and [`GatewayCall`] for asserting on what reached the gateway
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use docquery::testing::RecordingGateway;
//! use docquery::Client;
//!
//! let gateway = RecordingGateway::new();
//! let mut client = Client::new(gateway.clone())?;
//! client.table("users")?.where_("name", "alice")?.get().await?;
//!
//! assert_eq!(gateway.log().calls_named("search").len(), 1);
//! ```

pub mod events;
pub mod gateway;
pub mod history;

pub use events::GatewayCall;
pub use gateway::RecordingGateway;
pub use history::CallLog;
