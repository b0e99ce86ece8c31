//! Discovery and normalization of Monobook widget payloads.
//!
//! A widget mounts inside an unknown host and has to find its data wherever
//! the host put it: a bootstrap element, a query parameter, a late-bound
//! bridge object, or a cross-frame message. [`session::mount`] runs those
//! sources in order and settles on the first payload the [`Extractor`]
//! recognizes.

pub mod bootstrap;
pub mod bridge;
pub mod coerce;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod poll;
pub mod relay;
pub mod render;
pub mod schema;
pub mod session;

pub use bootstrap::BootstrapSources;
pub use bridge::{BridgeFixture, BridgeSlot, FixtureBridge, HostBridge};
pub use coerce::{coerce_record, Record};
pub use error::{BridgeError, RelayError, WidgetError};
pub use extract::Extractor;
pub use normalize::{normalize, DisplayPayload};
pub use poll::BridgePoller;
pub use relay::{ActionRelay, ActionSink};
pub use render::{render, CardAction, View};
pub use schema::PayloadSchema;
pub use session::{mount, LoadState, MountSources, PayloadSource, WidgetConfig, WidgetHandle};
