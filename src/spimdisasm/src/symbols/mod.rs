/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod function_symbol;

pub use function_symbol::FunctionSymbol;
