// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Top-level pipeline lifecycle: state transitions, the event loop and
//! teardown.
//!
//! [`PipelineController`] owns the assembled [`StaticTopology`] and every
//! [`FanoutJunction`] built on it, and drives the run through its phases:
//!
//! ```text
//! Assembled ──start()──► Playing ──terminal event──► Draining ──► Stopped
//! ```
//!
//! A controller is only obtainable from a fully-constructed topology, so the
//! "all stages valid, all static links made" precondition holds by
//! construction. [`run`](PipelineController::run) is the single blocking
//! point in the crate: it waits on the aggregate's event source with no
//! timeout and ends only on a terminal event (stream error, end-of-stream)
//! or an explicit [`StopHandle`] request. The stop handle is the one
//! concession to external control; without it the loop cannot be
//! interrupted from outside at all.
//!
//! Teardown always runs through one path, in a fixed order: junction
//! branches are revoked first, then the aggregate transitions to Null. The
//! controller does this on every exit, including error exits and drop.

use gst::prelude::*;
use gstreamer as gst;
use tracing::{error, info, warn};

use crate::{Error, FanoutJunction, Result, StaticTopology};

/// Structure name of the application event posted by [`StopHandle`].
const STOP_SIGNAL: &str = "pipegraph-stop";

/// Lifecycle phase of a [`PipelineController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Stages constructed and statically linked; not yet playing.
    Assembled,
    /// The aggregate is playing and the event loop may run.
    Playing,
    /// A terminal event arrived; teardown is in progress.
    Draining,
    /// All resources released, aggregate at Null.
    Stopped,
}

/// Why the event loop ended without a stream error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stream signalled end-of-stream.
    EndOfStream,
    /// A [`StopHandle`] requested the stop.
    Cancelled,
}

/// Requests an orderly stop of a running controller.
///
/// Obtained from [`PipelineController::stop_handle`]; cheap to clone and
/// safe to use from any thread. The request is delivered through the
/// aggregate's own event source, so the event loop observes it like any
/// other terminal event.
#[derive(Clone)]
pub struct StopHandle {
    bus: gst::Bus,
}

impl StopHandle {
    /// Asks the event loop to drain and stop.
    ///
    /// Harmless if the loop has already ended.
    pub fn request_stop(&self) {
        let structure = gst::Structure::builder(STOP_SIGNAL).build();
        if let Err(err) = self.bus.post(gst::message::Application::new(structure)) {
            warn!(error = %err, "stop request could not be posted");
        }
    }
}

/// Orchestrates one pipeline run from assembly to stopped.
pub struct PipelineController {
    topology: StaticTopology,
    junctions: Vec<FanoutJunction>,
    phase: Phase,
}

impl PipelineController {
    /// Takes ownership of an assembled topology.
    pub fn new(topology: StaticTopology) -> Self {
        Self {
            topology,
            junctions: Vec::new(),
            phase: Phase::Assembled,
        }
    }

    /// Registers a junction whose branches the controller must revoke
    /// during teardown.
    pub fn add_junction(&mut self, junction: FanoutJunction) {
        self.junctions.push(junction);
    }

    /// The owned topology.
    pub fn topology(&self) -> &StaticTopology {
        &self.topology
    }

    /// The registered junctions.
    pub fn junctions(&self) -> &[FanoutJunction] {
        &self.junctions
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns a handle that can stop a running event loop.
    ///
    /// # Errors
    ///
    /// Fails if the aggregate exposes no event source.
    pub fn stop_handle(&self) -> Result<StopHandle> {
        let bus = self
            .topology
            .pipeline()
            .bus()
            .ok_or_else(|| Error::Other("aggregate has no event source".to_string()))?;
        Ok(StopHandle { bus })
    }

    /// Requests the playing state on the aggregate.
    ///
    /// An asynchronous transition is accepted; its completion is observed on
    /// the event source. A refused transition is fatal: resources are
    /// released through the normal teardown path and the error is returned,
    /// and the event loop must not be entered.
    ///
    /// # Errors
    ///
    /// [`Error::StateTransition`] if the framework refuses the transition.
    pub fn start(&mut self) -> Result<()> {
        if self.phase != Phase::Assembled {
            return Err(Error::Other(format!(
                "start requires the assembled phase, current phase is {:?}",
                self.phase
            )));
        }
        match self.topology.pipeline().set_state(gst::State::Playing) {
            Ok(success) => {
                info!(result = ?success, "requested playing state");
                self.phase = Phase::Playing;
                Ok(())
            }
            Err(_) => {
                let err = Error::StateTransition {
                    target: gst::State::Playing,
                };
                error!(error = %err, "startup aborted");
                if let Err(teardown_err) = self.teardown() {
                    warn!(error = %teardown_err, "teardown after failed startup also failed");
                }
                Err(err)
            }
        }
    }

    /// Pumps the aggregate's event source until a terminal event.
    ///
    /// This is the only place the crate blocks. Each event is dispatched by
    /// kind: a stream error records its detail and drains; end-of-stream
    /// drains; state-change events are logged only when they originate from
    /// the aggregate itself (child stages change state far more often); a
    /// stop request drains; anything else is logged as unexpected and
    /// ignored.
    ///
    /// On every return path teardown has already run and the phase is
    /// [`Phase::Stopped`].
    ///
    /// # Errors
    ///
    /// [`Error::Stream`] with the originating stage, message and debug
    /// detail if the stream reported an error.
    pub fn run(&mut self) -> Result<StopReason> {
        if self.phase != Phase::Playing {
            return Err(Error::Other(format!(
                "event loop requires the playing phase, current phase is {:?}",
                self.phase
            )));
        }
        let bus = self
            .topology
            .pipeline()
            .bus()
            .ok_or_else(|| Error::Other("aggregate has no event source".to_string()))?;

        loop {
            let Some(message) = bus.timed_pop_filtered(
                gst::ClockTime::NONE,
                &[
                    gst::MessageType::Error,
                    gst::MessageType::Eos,
                    gst::MessageType::StateChanged,
                    gst::MessageType::Application,
                ],
            ) else {
                // An indefinite wait only comes back empty if the event
                // source was flushed away beneath us; treat it as terminal.
                warn!("event source drained without a terminal event");
                self.drain()?;
                return Ok(StopReason::EndOfStream);
            };

            use gst::MessageView;
            match message.view() {
                MessageView::Error(err) => {
                    let stream_error = Error::Stream {
                        source: err
                            .src()
                            .map(|s| s.path_string().to_string())
                            .unwrap_or_else(|| "unknown".to_string()),
                        message: err.error().to_string(),
                        debug: err.debug().map(|d| d.to_string()),
                    };
                    error!(error = %stream_error, "stream error, draining");
                    if let Err(teardown_err) = self.drain() {
                        warn!(error = %teardown_err, "teardown after stream error failed");
                    }
                    return Err(stream_error);
                }
                MessageView::Eos(..) => {
                    info!("end of stream, draining");
                    self.drain()?;
                    return Ok(StopReason::EndOfStream);
                }
                MessageView::StateChanged(changed) => {
                    let from_aggregate = changed
                        .src()
                        .map(|s| s == self.topology.pipeline().upcast_ref::<gst::Object>())
                        .unwrap_or(false);
                    if from_aggregate {
                        info!(
                            old = ?changed.old(),
                            new = ?changed.current(),
                            "aggregate state changed"
                        );
                    }
                }
                MessageView::Application(app) => {
                    let stop = app
                        .structure()
                        .map(|s| s.name().as_str() == STOP_SIGNAL)
                        .unwrap_or(false);
                    if stop {
                        info!("stop requested, draining");
                        self.drain()?;
                        return Ok(StopReason::Cancelled);
                    }
                    warn!("unexpected application event, ignoring");
                }
                _ => {
                    warn!(kind = ?message.type_(), "unexpected event kind, ignoring");
                }
            }
        }
    }

    /// Releases everything in the fixed order: junction branches first,
    /// then the aggregate down to Null.
    ///
    /// Idempotent; a second call after reaching [`Phase::Stopped`] is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`Error::StateTransition`] if the aggregate refuses the Null
    /// transition. Branches are released even in that case.
    pub fn teardown(&mut self) -> Result<()> {
        if self.phase == Phase::Stopped {
            return Ok(());
        }
        for junction in &self.junctions {
            junction.release_all();
        }
        self.topology
            .pipeline()
            .set_state(gst::State::Null)
            .map_err(|_| Error::StateTransition {
                target: gst::State::Null,
            })?;
        self.phase = Phase::Stopped;
        info!("pipeline stopped");
        Ok(())
    }

    /// Marks the drain phase and runs teardown.
    fn drain(&mut self) -> Result<()> {
        self.phase = Phase::Draining;
        self.teardown()
    }
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        if self.phase != Phase::Stopped
            && let Err(err) = self.teardown()
        {
            error!(error = %err, "failed to tear down pipeline on drop");
        }
    }
}
