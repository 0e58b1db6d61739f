// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Fan-out junctions: one input replicated across on-demand branches.
//!
//! A [`FanoutJunction`] wraps a junction stage (a `tee`) and tracks every
//! branch port acquired from it. Branch ports are framework resources: each
//! one acquired must be released exactly once before the junction's element
//! is torn down, or the framework leaks it. The junction therefore keeps the
//! authoritative set of live branches, releases any survivors on drop, and
//! rejects a second release of the same branch.

use std::sync::Mutex;

use gst::prelude::*;
use gstreamer as gst;
use tracing::{debug, warn};

use crate::{Error, Port, PortCardinality, PortDirection, Result, StageId, StageKind, StaticTopology};

/// Handle for one acquired branch port.
///
/// The handle stays valid for linking until the branch is released; after
/// release it is stale and only good for error messages.
#[derive(Debug, Clone)]
pub struct Branch {
    junction: String,
    pad: gst::Pad,
}

impl Branch {
    /// The branch's port (on-demand output).
    pub fn port(&self) -> Port {
        Port::from_pad(
            self.pad.clone(),
            PortDirection::Output,
            PortCardinality::OnDemand,
        )
    }

    /// The branch port's name.
    pub fn name(&self) -> String {
        self.pad.name().to_string()
    }
}

/// A junction stage with a dynamically growing set of output branches.
pub struct FanoutJunction {
    name: String,
    element: gst::Element,
    branches: Mutex<Vec<gst::Pad>>,
}

impl FanoutJunction {
    /// Wraps a registered junction stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage's kind is not [`StageKind::Junction`].
    pub fn from_stage(topology: &StaticTopology, id: StageId) -> Result<Self> {
        let stage = topology.stage(id);
        if stage.kind() != StageKind::Junction {
            return Err(Error::Other(format!(
                "Stage \"{}\" is a {:?}, not a junction",
                stage.name(),
                stage.kind()
            )));
        }
        Ok(Self {
            name: stage.name().to_string(),
            element: stage.element().clone(),
            branches: Mutex::new(Vec::new()),
        })
    }

    /// The junction stage's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allocates a new on-demand branch port.
    ///
    /// Every call yields a distinct port. No upper bound is enforced here;
    /// the framework may impose its own.
    ///
    /// # Errors
    ///
    /// [`Error::BranchRefused`] if the framework declines to allocate a pad.
    pub fn acquire_branch(&self) -> Result<Branch> {
        let pad = self
            .element
            .request_pad_simple("src_%u")
            .ok_or_else(|| Error::BranchRefused {
                junction: self.name.clone(),
            })?;
        debug!(junction = %self.name, branch = %pad.name(), "acquired branch");
        self.branches.lock().unwrap().push(pad.clone());
        Ok(Branch {
            junction: self.name.clone(),
            pad,
        })
    }

    /// Links a branch to a downstream stage's default input.
    pub fn link_branch(
        &self,
        topology: &StaticTopology,
        branch: &Branch,
        sink: StageId,
    ) -> Result<()> {
        let sink_port = topology.stage(sink).default_input()?;
        topology.link_ports(&branch.port(), &sink_port)
    }

    /// Releases an acquired branch, exactly once.
    ///
    /// # Errors
    ///
    /// [`Error::DoubleRelease`] if this branch was already released; that is
    /// a programming error in the caller, not a tolerated duplicate.
    pub fn release_branch(&self, branch: &Branch) -> Result<()> {
        let mut branches = self.branches.lock().unwrap();
        let Some(index) = branches.iter().position(|pad| *pad == branch.pad) else {
            return Err(Error::DoubleRelease {
                junction: branch.junction.clone(),
                branch: branch.name(),
            });
        };
        let pad = branches.remove(index);
        drop(branches);
        self.element.release_request_pad(&pad);
        debug!(junction = %self.name, branch = %pad.name(), "released branch");
        Ok(())
    }

    /// Releases every branch still held.
    ///
    /// This is the teardown path: it must run before the junction's element
    /// is destroyed so that no branch port outlives the aggregate.
    pub fn release_all(&self) {
        let drained: Vec<gst::Pad> = std::mem::take(&mut *self.branches.lock().unwrap());
        for pad in drained {
            self.element.release_request_pad(&pad);
            debug!(junction = %self.name, branch = %pad.name(), "released branch");
        }
    }

    /// Number of branches currently acquired and not yet released.
    pub fn live_branches(&self) -> usize {
        self.branches.lock().unwrap().len()
    }
}

impl Drop for FanoutJunction {
    fn drop(&mut self) {
        if self.live_branches() > 0 {
            warn!(junction = %self.name, "junction dropped with live branches, releasing them");
            self.release_all();
        }
    }
}
