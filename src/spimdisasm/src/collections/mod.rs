/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod ordered_address_set;

pub use ordered_address_set::OrderedAddressSet;
