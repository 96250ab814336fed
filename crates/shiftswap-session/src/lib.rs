// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session token persistence and the auth session store.
//!
//! The persisted token is the only durable state the exchange client
//! keeps; everything else is re-fetched after a restart.

pub mod store;
pub mod token_file;

pub use store::{AuthState, AuthStore};
pub use token_file::{FileTokenStore, MemoryTokenStore};
