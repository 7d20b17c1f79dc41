// Copyright 2026 Sitelens Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sitelens — bounded headless-browser page-metadata service.
//!
//! Exposes one HTTP endpoint that drives a headless Chromium to a target
//! URL and extracts the page title, meta description, and first heading,
//! behind a fixed-latency contract: a per-attempt navigation timeout, a
//! fixed retry budget, and a global wall-clock deadline that cancels
//! abandoned work.

pub mod config;
pub mod engine;
pub mod error;
pub mod rest;
pub mod scrape;
