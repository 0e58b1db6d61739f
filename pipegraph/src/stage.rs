// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Stages and ports: the leaf building blocks of a pipeline graph.
//!
//! A [`Stage`] wraps one framework element together with its registered name
//! and [`StageKind`]. A [`Port`] wraps one connection point (pad) of a stage
//! with its direction and cardinality. Neither type owns the underlying
//! framework resources exclusively; the framework keeps its own reference
//! counts, and handles are cheap to clone.

use gst::prelude::*;
use gstreamer as gst;

use crate::{Error, Result};

/// Video effect element names accepted by [`Stage::effect`].
///
/// These are the classic `effectv` filters; each expects raw video on both
/// sides, so effect stages are normally sandwiched between two converters.
pub const VIDEO_EFFECTS: [&str; 12] = [
    "agingtv",
    "dicetv",
    "edgetv",
    "optv",
    "quarktv",
    "radioactv",
    "revtv",
    "rippletv",
    "shagadelictv",
    "streaktv",
    "vertigotv",
    "warptv",
];

/// Returns true if `name` is one of the supported video effects.
pub fn is_video_effect(name: &str) -> bool {
    VIDEO_EFFECTS.contains(&name)
}

/// Role of a stage within the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Produces data (test source, URI decoder, capture device).
    Source,
    /// Transforms data in place (effects, encoders).
    Filter,
    /// Adapts formats or sample rates between neighbours.
    Converter,
    /// Consumes data (renderers, file writers).
    Sink,
    /// Replicates one input across many on-demand output branches.
    Junction,
}

/// Direction of a [`Port`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// Data enters the stage through this port.
    Input,
    /// Data exits the stage through this port.
    Output,
}

/// Cardinality of a [`Port`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortCardinality {
    /// A fixed port that accepts at most one link.
    ExactlyOne,
    /// An on-demand port allocated and revoked at runtime.
    OnDemand,
}

/// One processing unit in the graph.
///
/// A `Stage` exists only if its underlying element was created successfully;
/// there is no separate validity flag to check. Stages are created
/// individually and then handed to
/// [`StaticTopology::add_stage`](crate::StaticTopology::add_stage), which
/// registers them under their name.
#[derive(Debug, Clone)]
pub struct Stage {
    name: String,
    kind: StageKind,
    element: gst::Element,
}

impl Stage {
    /// Creates a stage of the given kind from an element factory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StageConstruction`] if the factory does not exist or
    /// refuses to create an element. This is fatal for startup: callers must
    /// not attempt any linking afterwards.
    pub fn new(kind: StageKind, factory: &str, name: &str) -> Result<Self> {
        let element = gst::ElementFactory::make(factory)
            .name(name)
            .build()
            .map_err(|_| Error::StageConstruction {
                factory: factory.to_string(),
                name: name.to_string(),
            })?;
        Ok(Self {
            name: name.to_string(),
            kind,
            element,
        })
    }

    /// Creates a filter stage from one of the supported video effects.
    ///
    /// The effect name is validated against [`VIDEO_EFFECTS`] before any
    /// element is constructed, so an unknown effect is rejected without
    /// touching the framework.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEffect`] for a name outside the catalog,
    /// [`Error::StageConstruction`] if the element cannot be created.
    pub fn effect(effect: &str, name: &str) -> Result<Self> {
        if !is_video_effect(effect) {
            return Err(Error::UnknownEffect(effect.to_string()));
        }
        Self::new(StageKind::Filter, effect, name)
    }

    /// The name this stage registers under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared role of this stage.
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// The underlying framework element.
    pub fn element(&self) -> &gst::Element {
        &self.element
    }

    /// Sets an opaque configuration property on the stage.
    ///
    /// Values are passed through to the framework unchanged (a source's
    /// origin URI, a sink's output path, a test source's frequency).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProperty`] if the stage does not expose the
    /// property.
    ///
    /// # Panics
    ///
    /// Panics if the value's type does not match the property's declared
    /// type; this mirrors the framework's own property contract.
    pub fn set_property(&self, property: &str, value: impl Into<glib::Value>) -> Result<()> {
        if self.element.find_property(property).is_none() {
            return Err(Error::UnknownProperty {
                stage: self.name.clone(),
                property: property.to_string(),
            });
        }
        self.element.set_property_from_value(property, &value.into());
        Ok(())
    }

    /// Sets a property from its string representation.
    ///
    /// Useful for enum-valued properties (e.g. a visualiser's shader mode)
    /// where the string form is the natural spelling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProperty`] if the stage does not expose the
    /// property.
    pub fn set_property_from_str(&self, property: &str, value: &str) -> Result<()> {
        if self.element.find_property(property).is_none() {
            return Err(Error::UnknownProperty {
                stage: self.name.clone(),
                property: property.to_string(),
            });
        }
        self.element.set_property_from_str(property, value);
        Ok(())
    }

    /// Looks up a fixed input port by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPort`] if the stage has no such fixed port.
    pub fn input_port(&self, name: &str) -> Result<Port> {
        let pad = self
            .element
            .static_pad(name)
            .ok_or_else(|| Error::MissingPort {
                stage: self.name.clone(),
                port: name.to_string(),
            })?;
        Ok(Port::from_pad(
            pad,
            PortDirection::Input,
            PortCardinality::ExactlyOne,
        ))
    }

    /// Looks up a fixed output port by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPort`] if the stage has no such fixed port.
    pub fn output_port(&self, name: &str) -> Result<Port> {
        let pad = self
            .element
            .static_pad(name)
            .ok_or_else(|| Error::MissingPort {
                stage: self.name.clone(),
                port: name.to_string(),
            })?;
        Ok(Port::from_pad(
            pad,
            PortDirection::Output,
            PortCardinality::ExactlyOne,
        ))
    }

    /// The conventional default input port (`"sink"`).
    pub fn default_input(&self) -> Result<Port> {
        self.input_port("sink")
    }

    /// The conventional default output port (`"src"`).
    pub fn default_output(&self) -> Result<Port> {
        self.output_port("src")
    }
}

/// One typed connection point on a stage.
#[derive(Debug, Clone)]
pub struct Port {
    pad: gst::Pad,
    direction: PortDirection,
    cardinality: PortCardinality,
}

impl Port {
    pub(crate) fn from_pad(
        pad: gst::Pad,
        direction: PortDirection,
        cardinality: PortCardinality,
    ) -> Self {
        Self {
            pad,
            direction,
            cardinality,
        }
    }

    /// The underlying framework pad.
    pub fn pad(&self) -> &gst::Pad {
        &self.pad
    }

    /// The port's name as reported by the framework.
    pub fn name(&self) -> String {
        self.pad.name().to_string()
    }

    /// The port's direction.
    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// The port's cardinality.
    pub fn cardinality(&self) -> PortCardinality {
        self.cardinality
    }

    /// True if the port is currently linked to a peer.
    pub fn is_linked(&self) -> bool {
        self.pad.is_linked()
    }

    /// The negotiated data shape, if one is known yet.
    ///
    /// Demuxed output ports have no shape until the upstream stage has seen
    /// enough data; this returns `None` until then.
    pub fn shape(&self) -> Option<String> {
        let caps = self.pad.current_caps()?;
        let structure = caps.structure(0)?;
        Some(structure.name().as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_catalog_contains_the_classics() {
        assert!(is_video_effect("warptv"));
        assert!(is_video_effect("agingtv"));
        assert!(!is_video_effect("videoconvert"));
        assert!(!is_video_effect(""));
    }

    #[test]
    fn unknown_effect_is_rejected_before_construction() {
        // No framework initialisation here: the catalog check must fire first.
        match Stage::effect("sepiatv", "filter") {
            Err(Error::UnknownEffect(name)) => assert_eq!(name, "sepiatv"),
            other => panic!("expected UnknownEffect, got {other:?}"),
        }
    }
}
