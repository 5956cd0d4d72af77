// SPDX-License-Identifier: MIT

//! Middleware for the HTTP layer.

pub mod security;
