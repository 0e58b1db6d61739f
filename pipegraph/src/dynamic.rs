// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Dynamic linking: completing deferred links at stream-discovery time.
//!
//! Demuxing stages cannot announce their output ports until they have seen
//! enough data to know which sub-streams the container carries. The
//! [`DynamicLinker`] holds the routes that are waiting for such ports: an
//! ordered table of (shape prefix, target stage) pairs configured before the
//! pipeline starts. When the framework announces a new port, the linker
//! classifies its negotiated shape against the table and completes the
//! matching link.
//!
//! The discovery callback runs on a framework streaming thread while the
//! controlling thread may concurrently be polling the event source, so all
//! route state sits behind a single mutex. Call frequency is one
//! notification per negotiated sub-stream (typically one or two per run),
//! so one coarse lock is plenty.

use std::sync::{Arc, Mutex};

use gst::prelude::*;
use gstreamer as gst;
use tracing::{info, warn};

use crate::{Result, StageId, StaticTopology};

/// What happened to one discovered port.
///
/// Only `Failed` is abnormal, and even that is non-fatal: a failed dynamic
/// link is logged and the stream keeps running with the branches that did
/// link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicLinkOutcome {
    /// The port matched a route and the link was completed.
    Linked,
    /// The matching route's sink is already linked; duplicate notifications
    /// are expected and harmless.
    AlreadyLinked,
    /// No route matched the port's shape; the sub-stream is ignored.
    Unmatched,
    /// The port has no negotiated shape yet; nothing can be classified.
    NoShape,
    /// A route matched but the framework refused the link.
    Failed,
}

struct Route {
    prefix: String,
    stage: String,
    target: gst::Element,
    completed: bool,
}

/// Completes pending links once an upstream stage announces a new port.
///
/// Cloning is cheap and shares the route table; the clone captured by the
/// discovery callback and the one held by the caller observe the same
/// state.
#[derive(Clone)]
pub struct DynamicLinker {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl DynamicLinker {
    /// Creates a linker with an empty route table.
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Registers a route: ports whose shape starts with `prefix` link to
    /// `target`'s default input.
    ///
    /// Routes are matched in registration order; the first matching prefix
    /// wins.
    ///
    /// # Errors
    ///
    /// [`Error::MissingPort`](crate::Error::MissingPort) if the target stage
    /// has no fixed `"sink"` port — that is detected here, at configuration
    /// time, not in the discovery callback.
    pub fn add_route(
        &self,
        topology: &StaticTopology,
        prefix: &str,
        target: StageId,
    ) -> Result<()> {
        let stage = topology.stage(target);
        stage.default_input()?;
        self.routes.lock().unwrap().push(Route {
            prefix: prefix.to_string(),
            stage: stage.name().to_string(),
            target: stage.element().clone(),
            completed: false,
        });
        Ok(())
    }

    /// Connects this linker to a stage's port-discovery notifications.
    ///
    /// From this point on the framework invokes
    /// [`on_port_discovered`](Self::on_port_discovered) from its own thread
    /// context whenever `source` exposes a new output port.
    pub fn attach(&self, topology: &StaticTopology, source: StageId) {
        let linker = self.clone();
        topology
            .stage(source)
            .element()
            .connect_pad_added(move |stage, pad| {
                linker.on_port_discovered(stage, pad);
            });
    }

    /// Classifies a newly discovered port and completes the matching link.
    ///
    /// Safe to invoke multiple times for the same port and from framework
    /// notification context; it never blocks beyond the route-table lock.
    pub fn on_port_discovered(
        &self,
        stage: &gst::Element,
        pad: &gst::Pad,
    ) -> DynamicLinkOutcome {
        info!(port = %pad.name(), stage = %stage.name(), "received new port");

        let Some(caps) = pad.current_caps() else {
            warn!(port = %pad.name(), "port has no negotiated shape yet, ignoring");
            return DynamicLinkOutcome::NoShape;
        };
        let Some(structure) = caps.structure(0) else {
            warn!(port = %pad.name(), "port shape carries no structure, ignoring");
            return DynamicLinkOutcome::NoShape;
        };
        let shape = structure.name().as_str().to_string();
        self.dispatch(pad, &shape)
    }

    /// The single dispatch point: matches `shape` against the route table
    /// and links `pad` to the winning route's sink.
    ///
    /// An unmatched shape is an expected "ignore this sub-stream" outcome,
    /// and a target that is already linked is skipped without error so that
    /// duplicate notifications stay harmless.
    pub fn dispatch(&self, pad: &gst::Pad, shape: &str) -> DynamicLinkOutcome {
        let mut routes = self.routes.lock().unwrap();
        let Some(route) = routes.iter_mut().find(|r| shape.starts_with(&r.prefix)) else {
            info!(shape, "shape matches no route, ignoring");
            return DynamicLinkOutcome::Unmatched;
        };

        let Some(sink_pad) = route.target.static_pad("sink") else {
            // Verified in add_route; only reachable if the element mutated
            // its fixed pads since.
            warn!(stage = %route.stage, "route target lost its sink port");
            return DynamicLinkOutcome::Failed;
        };
        if sink_pad.is_linked() {
            info!(shape, stage = %route.stage, "target already linked, ignoring");
            return DynamicLinkOutcome::AlreadyLinked;
        }

        match pad.link(&sink_pad) {
            Ok(_) => {
                route.completed = true;
                info!(shape, stage = %route.stage, "dynamic link completed");
                DynamicLinkOutcome::Linked
            }
            Err(err) => {
                warn!(shape, stage = %route.stage, error = %err, "dynamic link failed");
                DynamicLinkOutcome::Failed
            }
        }
    }

    /// Prefixes of the routes whose link has been completed.
    pub fn completed(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.completed)
            .map(|r| r.prefix.clone())
            .collect()
    }

    /// Number of routes still waiting for a port.
    pub fn pending(&self) -> usize {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.completed)
            .count()
    }
}

impl Default for DynamicLinker {
    fn default() -> Self {
        Self::new()
    }
}
