//! Core library for Sample Relay.
//!
//! The crate provides the two containers at the heart of the project: a
//! height-balanced ordered set ([`OrderedSet`]) and a mutex-guarded ring
//! buffer ([`RingBuffer`]) for single-producer/single-consumer sample
//! handoff, together with the thin stream and registry surfaces built on
//! top of them. The two containers are independent leaves; neither calls
//! the other.

pub mod config;
pub mod error;
pub mod ordered_set;
pub mod registry;
pub mod ring;
pub mod stream;

pub use config::{AppConfig, PipelineConfig};
pub use error::{Result, SampleRelayError};
pub use ordered_set::OrderedSet;
pub use registry::{ChannelId, ChannelRegistry};
pub use ring::RingBuffer;
pub use stream::{SampleStream, StreamReader, StreamWriter};
