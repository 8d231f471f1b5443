// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding source scans and writing redacted output.

pub mod source;

pub use source::{SourceImage, save_dynamic};
