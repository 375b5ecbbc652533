/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod context;
mod segment;

pub use context::Context;
pub use segment::Segment;
