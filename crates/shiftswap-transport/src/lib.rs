// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport for the shiftswap exchange API.
//!
//! Provides [`Transport`], the single authenticated JSON request executor
//! every domain client goes through. Handles URL resolution, header
//! injection, timeout with cooperative cancellation, and the mapping of
//! HTTP failures onto the stable error taxonomy.

pub mod client;

pub use client::{ApiCall, DEPOT_HEADER, Transport};
