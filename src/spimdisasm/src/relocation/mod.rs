/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod relocation_info;
mod relocation_type;

pub use relocation_info::RelocationInfo;
pub use relocation_type::RelocationType;
