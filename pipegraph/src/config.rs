// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Environment-derived defaults for examples and tests.
//!
//! The library itself takes no configuration; these helpers only resolve the
//! inputs the demo topologies need (a media URI to play, a path to capture
//! into) so every example honours the same environment variables.

use std::path::PathBuf;

/// Default media URI played by the demos when `PIPEGRAPH_URI` is unset.
pub const DEFAULT_MEDIA_URI: &str =
    "https://gstreamer.freedesktop.org/data/media/sintel_trailer-480p.webm";

/// Returns the media URI to play.
///
/// Reads `PIPEGRAPH_URI`, falling back to [`DEFAULT_MEDIA_URI`].
pub fn media_uri() -> String {
    std::env::var("PIPEGRAPH_URI").unwrap_or_else(|_| DEFAULT_MEDIA_URI.to_string())
}

/// Returns the path the capture demo writes its audio file to.
///
/// Reads `PIPEGRAPH_CAPTURE`, falling back to `pipegraph-capture.wav` in the
/// system temporary directory.
pub fn capture_path() -> PathBuf {
    std::env::var("PIPEGRAPH_CAPTURE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("pipegraph-capture.wav"))
}
