// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! # Pipegraph - Pipeline Graph Manager
//!
//! Safe, idiomatic management of GStreamer element graphs: describe a
//! directed graph of processing stages, link everything that is known at
//! build time, defer the links whose input shape is only discovered at
//! runtime, fan a stream out across on-demand branches, and tear the whole
//! graph down in a fixed, leak-free order.
//!
//! ## Overview
//!
//! The framework owns the hard parts — buffering, format negotiation, clock
//! synchronisation, the streaming threads. This crate owns the graph: which
//! stages exist, how they connect, when the deferred connections complete,
//! and the lifecycle of the whole aggregate from construction to Null.
//!
//! ### Key Concepts
//!
//! - **Stage**: one processing unit (source, filter, converter, sink or
//!   junction), wrapped with its registered name ([`Stage`])
//! - **Port**: a typed connection point on a stage, input or output,
//!   exactly-one or on-demand ([`Port`])
//! - **StaticTopology**: the aggregate pipeline plus a flat name registry of
//!   stages; performs every build-time link ([`StaticTopology`])
//! - **DynamicLinker**: completes links for ports that appear at
//!   stream-discovery time, classified by shape prefix ([`DynamicLinker`])
//! - **FanoutJunction**: replicates one input across independently revocable
//!   branches ([`FanoutJunction`])
//! - **PipelineController**: drives state transitions, pumps the event
//!   source, and tears everything down through one path
//!   ([`PipelineController`])
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ PipelineController │  (owns the aggregate, drives the run)
//! └─────────┬──────────┘
//!           │
//!           ├─► StaticTopology ──► Stage / Port   (build-time links)
//!           │
//!           ├─► DynamicLinker                     (stream-discovery links)
//!           │
//!           └─► FanoutJunction ──► Branch         (on-demand fan-out)
//! ```
//!
//! ## Examples
//!
//! ### Demuxed playback with deferred audio linking
//!
//! ```no_run
//! use pipegraph::{DynamicLinker, PipelineController, Stage, StageKind, StaticTopology};
//!
//! # fn main() -> Result<(), pipegraph::Error> {
//! gstreamer::init()?;
//!
//! // Build the stages. The decoder's output ports are unknown until the
//! // stream is inspected, so the source stays unlinked for now.
//! let mut topology = StaticTopology::new("playback");
//! let source = topology.add_stage(Stage::new(StageKind::Source, "uridecodebin", "source")?)?;
//! let convert = topology.add_stage(Stage::new(StageKind::Converter, "audioconvert", "convert")?)?;
//! let resample = topology.add_stage(Stage::new(StageKind::Converter, "audioresample", "resample")?)?;
//! let sink = topology.add_stage(Stage::new(StageKind::Sink, "autoaudiosink", "sink")?)?;
//! topology.link_chain(&[convert, resample, sink])?;
//! topology.stage(source).set_property("uri", "https://example.com/clip.webm")?;
//!
//! // Audio sub-streams discovered at runtime complete the missing link.
//! let linker = DynamicLinker::new();
//! linker.add_route(&topology, "audio/x-raw", convert)?;
//! linker.attach(&topology, source);
//!
//! // Play and block until error or end-of-stream.
//! let mut controller = PipelineController::new(topology);
//! controller.start()?;
//! controller.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Fanning one stream out to several sinks
//!
//! ```no_run
//! use pipegraph::{FanoutJunction, PipelineController, Stage, StageKind, StaticTopology};
//!
//! # fn main() -> Result<(), pipegraph::Error> {
//! gstreamer::init()?;
//!
//! let mut topology = StaticTopology::new("fanout");
//! let source = topology.add_stage(Stage::new(StageKind::Source, "audiotestsrc", "source")?)?;
//! let tee = topology.add_stage(Stage::new(StageKind::Junction, "tee", "tee")?)?;
//! let queue_a = topology.add_stage(Stage::new(StageKind::Filter, "queue", "queue_a")?)?;
//! let sink_a = topology.add_stage(Stage::new(StageKind::Sink, "autoaudiosink", "sink_a")?)?;
//! topology.link(source, tee)?;
//! topology.link(queue_a, sink_a)?;
//!
//! // Branch ports are acquired on demand and must be revoked on teardown;
//! // the controller takes care of that once the junction is registered.
//! let junction = FanoutJunction::from_stage(&topology, tee)?;
//! let branch = junction.acquire_branch()?;
//! junction.link_branch(&topology, &branch, queue_a)?;
//!
//! let mut controller = PipelineController::new(topology);
//! controller.add_junction(junction);
//! controller.start()?;
//! controller.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! The controller and its event loop belong to one controlling thread. The
//! framework delivers port-discovery notifications from its own streaming
//! threads; [`DynamicLinker`] serialises all shared state behind a single
//! mutex, so those callbacks are safe while the controlling thread polls.
//! [`StopHandle`] may be used from any thread.
//!
//! ## Lifecycle
//!
//! Stages and static links are created once at startup; during playback the
//! graph only changes through dynamic link completions and junction branch
//! management; everything is destroyed together through the controller's
//! single teardown path — branch ports first, then the aggregate to Null.

mod controller;
mod dynamic;
mod error;
mod fanout;
mod stage;
mod topology;

pub mod config;

pub use controller::{Phase, PipelineController, StopHandle, StopReason};
pub use dynamic::{DynamicLinkOutcome, DynamicLinker};
pub use error::{Error, Result};
pub use fanout::{Branch, FanoutJunction};
pub use stage::{
    is_video_effect, Port, PortCardinality, PortDirection, Stage, StageKind, VIDEO_EFFECTS,
};
pub use topology::{StageId, StaticTopology};
