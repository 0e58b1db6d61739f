// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for pipeline graph operations.
//!
//! This module defines the error types returned by graph manager calls,
//! mapping framework-level link and state results to idiomatic Rust error
//! enums.

use gstreamer as gst;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when building or running a pipeline graph.
///
/// Link-related variants map the framework's pad link outcomes one-to-one;
/// the remaining variants cover registry bookkeeping, lifecycle misuse and
/// errors reported by the running stream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A stage's underlying element could not be created.
    ///
    /// Construction failures are fatal: startup must abort before any
    /// linking is attempted.
    #[error("Could not create stage \"{name}\" from factory \"{factory}\"")]
    StageConstruction {
        /// Name of the element factory that was requested.
        factory: String,
        /// Name the stage would have been registered under.
        name: String,
    },

    /// A stage with the same name is already registered in the topology.
    #[error("Stage name already registered: \"{0}\"")]
    DuplicateStage(String),

    /// A stage does not expose the requested fixed port.
    #[error("Stage \"{stage}\" has no port \"{port}\"")]
    MissingPort {
        /// Stage that was inspected.
        stage: String,
        /// Port name that was requested.
        port: String,
    },

    /// The sink side of the link accepts exactly one connection and is
    /// already linked.
    #[error("Sink port is already linked: {0}")]
    AlreadyLinked(String),

    /// The two ports do not share a common containing topology.
    #[error("Ports have no common ancestor: {0}")]
    Hierarchy(String),

    /// The ports' directions do not form an output-to-input pair.
    #[error("Ports have the wrong direction: {0}")]
    WrongDirection(String),

    /// The ports' data-shape families have no common format.
    #[error("Ports have no common data shape: {0}")]
    IncompatibleShape(String),

    /// The ports cannot cooperate in scheduling.
    #[error("Ports cannot cooperate in scheduling: {0}")]
    SchedulingConflict(String),

    /// The framework refused the link for an unspecified reason.
    #[error("Link refused: {0}")]
    LinkRefused(String),

    /// The stage does not expose the named configuration property.
    #[error("Stage \"{stage}\" has no property \"{property}\"")]
    UnknownProperty {
        /// Stage that was configured.
        stage: String,
        /// Property name that was rejected.
        property: String,
    },

    /// The requested video effect is not part of the supported catalog.
    #[error("Unknown video effect: \"{0}\"")]
    UnknownEffect(String),

    /// The aggregate refused a requested state transition.
    ///
    /// Fatal during startup; during a run it triggers teardown.
    #[error("State transition to {target:?} was refused")]
    StateTransition {
        /// The state that was requested.
        target: gst::State,
    },

    /// A fan-out junction refused to allocate a new branch port.
    #[error("Junction \"{junction}\" refused a new branch")]
    BranchRefused {
        /// Junction that was asked for a branch.
        junction: String,
    },

    /// A fan-out branch was released more than once.
    #[error("Branch \"{branch}\" of junction \"{junction}\" was already released")]
    DoubleRelease {
        /// Junction owning the branch.
        junction: String,
        /// Name of the branch port.
        branch: String,
    },

    /// An error reported by the running stream via the event source.
    ///
    /// Carries the originating stage path, the error message and the
    /// optional debug detail so the operator sees the full context.
    #[error("Stream error from {source}: {message}")]
    Stream {
        /// Path of the element that reported the error.
        source: String,
        /// Human-readable error message.
        message: String,
        /// Additional debugging information, if the framework provided any.
        debug: Option<String>,
    },

    /// A generic error for failures not covered by the variants above
    /// (e.g., lifecycle misuse, missing event source).
    #[error("Other error: {0}")]
    Other(String),

    /// A framework call failed with a boolean error.
    #[error("Framework call failed: {0}")]
    Framework(#[from] glib::BoolError),

    /// Framework initialisation failed.
    #[error("Framework initialisation failed: {0}")]
    Init(#[from] glib::Error),
}

impl Error {
    /// Converts a framework pad link failure to a typed [`Error`].
    ///
    /// `link` describes the attempted connection (`"src-pad -> sink-pad"`)
    /// and is carried verbatim in the resulting variant.
    pub(crate) fn from_pad_link(err: gst::PadLinkError, link: String) -> Error {
        match err {
            gst::PadLinkError::WrongHierarchy => Error::Hierarchy(link),
            gst::PadLinkError::WasLinked => Error::AlreadyLinked(link),
            gst::PadLinkError::WrongDirection => Error::WrongDirection(link),
            gst::PadLinkError::Noformat => Error::IncompatibleShape(link),
            gst::PadLinkError::Nosched => Error::SchedulingConflict(link),
            gst::PadLinkError::Refused => Error::LinkRefused(link),
            _ => Error::LinkRefused(link),
        }
    }
}
