// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Static topology: the build-time-known part of the graph.
//!
//! [`StaticTopology`] owns the framework pipeline (the aggregate) and a flat
//! registry of stages keyed by name. Every link whose ports are known at
//! build time is made here; links that depend on runtime-negotiated shapes
//! are deferred to [`crate::DynamicLinker`].
//!
//! Stages are addressed by [`StageId`], a small copyable handle handed out
//! by [`StaticTopology::add_stage`]. There is no string-path lookup and no
//! reflection; `find` resolves a registered name to its id, nothing more.

use std::collections::HashMap;

use gst::prelude::*;
use gstreamer as gst;
use tracing::debug;

use crate::{Error, Port, Result, Stage};

/// Stable handle for a stage registered in a [`StaticTopology`].
///
/// Ids are only meaningful for the topology that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId(usize);

/// The fixed set of stages and build-time links.
///
/// The topology is mutated in two phases: stages and static links are added
/// before the aggregate starts playing; once playing, only the dynamic
/// linker completes the deferred links and fan-out junctions grow or shrink
/// their branch ports.
pub struct StaticTopology {
    pipeline: gst::Pipeline,
    stages: Vec<Stage>,
    names: HashMap<String, usize>,
}

impl StaticTopology {
    /// Creates an empty topology with a named aggregate pipeline.
    pub fn new(name: &str) -> Self {
        Self {
            pipeline: gst::Pipeline::builder().name(name).build(),
            stages: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Registers a stage and adds its element to the aggregate.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateStage`] if a stage with the same name is already
    /// registered.
    pub fn add_stage(&mut self, stage: Stage) -> Result<StageId> {
        if self.names.contains_key(stage.name()) {
            return Err(Error::DuplicateStage(stage.name().to_string()));
        }
        self.pipeline.add(stage.element())?;
        let id = self.stages.len();
        debug!(stage = stage.name(), kind = ?stage.kind(), "registered stage");
        self.names.insert(stage.name().to_string(), id);
        self.stages.push(stage);
        Ok(StageId(id))
    }

    /// Returns the stage behind an id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different topology and is out of
    /// range here.
    pub fn stage(&self, id: StageId) -> &Stage {
        &self.stages[id.0]
    }

    /// Resolves a registered stage name to its id.
    pub fn find(&self, name: &str) -> Option<StageId> {
        self.names.get(name).copied().map(StageId)
    }

    /// All registered stages, in registration order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    /// The aggregate pipeline object.
    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    /// Links two stages through their default ports (`"src"` -> `"sink"`).
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyLinked`] if the sink's exactly-one input already has
    /// a peer (a second link is an error, not a silent skip), or any of the
    /// mapped framework refusals ([`Error::Hierarchy`],
    /// [`Error::IncompatibleShape`], ...).
    pub fn link(&self, src: StageId, sink: StageId) -> Result<()> {
        let src_port = self.stage(src).default_output()?;
        let sink_port = self.stage(sink).default_input()?;
        self.link_ports(&src_port, &sink_port)
    }

    /// Links two explicit ports.
    ///
    /// The sink side is checked for an existing peer before the framework is
    /// asked, so a duplicate link on an exactly-one port always surfaces as
    /// [`Error::AlreadyLinked`].
    pub fn link_ports(&self, src: &Port, sink: &Port) -> Result<()> {
        let description = format!("{} -> {}", src.name(), sink.name());
        if sink.is_linked() {
            return Err(Error::AlreadyLinked(description));
        }
        src.pad()
            .link(sink.pad())
            .map_err(|err| Error::from_pad_link(err, description.clone()))?;
        debug!(link = %description, "linked ports");
        Ok(())
    }

    /// Links each consecutive pair of stages through their default ports.
    ///
    /// Fails fast on the first pair the framework refuses. Links made before
    /// the failing pair are left in place: a chain failure is fatal for the
    /// whole run in practice, so no rollback is attempted.
    pub fn link_chain(&self, ids: &[StageId]) -> Result<()> {
        for pair in ids.windows(2) {
            self.link(pair[0], pair[1])?;
        }
        Ok(())
    }
}
