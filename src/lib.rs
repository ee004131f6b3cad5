//! # lifx_lan_rs
//!
//! An async Rust client for the LIFX LAN protocol.
//!
//! This crate provides a **runtime-agnostic** async API to discover, query and
//! command LIFX lights on your local network. It contains a bit-exact codec
//! for the binary protocol frame and a message router that shares one UDP
//! socket between discovery and many concurrent request/response exchanges.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lifx_lan_rs::{ColorArgs, DeviceSet, MessageRouter, Operation, RouterConfig};
//!
//! async fn paint_it_blue() -> Result<(), lifx_lan_rs::Error> {
//!     let router = Arc::new(MessageRouter::bind(RouterConfig::default()).await?);
//!
//!     // Discovery needs the socket to itself
//!     let devices = DeviceSet::discover(&router, Duration::from_secs(2)).await?;
//!
//!     // Replies are collected by the receive loop from now on
//!     router.set_receiving(true).await?;
//!     let receiver = router.spawn_receiver();
//!
//!     let blue = ColorArgs { hue: 240.0, ..ColorArgs::default() };
//!     devices.all_do(&Operation::SetColor(blue)).await;
//!
//!     router.set_receiving(false).await?;
//!     receiver.await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Runtime Agnostic**: Works with tokio, async-std, or smol async runtimes
//! - **Codec**: Encode with [`Encoder`] / [`encode_message`], decode with [`decode`]
//! - **Discovery**: Find devices with [`MessageRouter::discover`] or [`DeviceSet::discover`]
//! - **Per-device ordering**: Requests to one device never interleave
//! - **Device Control**: Power and color through [`Device`]
//! - **Batch Operations**: Fan out to many devices with [`DeviceSet`]
//! - **Named Calls**: Address operations by name and JSON arguments with [`Device::call`]
//! - **External Control**: Follow a target hue published through a [`HueSource`]
//!
//! ## Communication
//!
//! Devices listen on UDP port 56700. Discovery broadcasts to
//! `255.255.255.255:56700` by default; see [`RouterConfig`].
//!
//! ## Runtime Selection
//!
//! This library is runtime-agnostic. Select your preferred runtime using feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! lifx-lan-rs = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! lifx-lan-rs = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! lifx-lan-rs = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod config;
mod decoder;
mod device;
mod device_set;
mod encoder;
mod errors;
mod intent;
mod message;
mod operation;
mod response;
mod router;
pub mod runtime;
mod types;
pub mod wire;

#[cfg(test)]
mod testing;

// Re-export public API
pub use config::RouterConfig;
pub use decoder::{ParsedMessage, decode};
pub use device::Device;
pub use device_set::DeviceSet;
pub use encoder::{BuildOptions, Encoder, Request, SequenceCounter, Target, encode_message};
pub use errors::Error;
pub use intent::{HueSource, Intent, TargetHue};
pub use message::Message;
pub use operation::{Call, ColorArgs, Operation, OperationName, Property};
pub use response::{DeviceInfo, LightState, Reply};
pub use router::MessageRouter;
pub use types::{Fraction, Hsbk, Kelvin, Mac, PowerLevel, hue_to_wire, normalize_hue};
pub use wire::{MessageKind, Service};
