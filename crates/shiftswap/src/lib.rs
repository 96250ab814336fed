// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shift-exchange negotiation and messaging client.
//!
//! This crate is the composition root: it wires configuration, transport,
//! domain clients, the persisted token store, and every observable state
//! store into one [`ExchangeRuntime`] that owns them all. Consumers (the
//! CLI here, a rendering layer elsewhere) receive the runtime by reference
//! -- there are no global singletons.

pub mod runtime;

pub use runtime::ExchangeRuntime;
