// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the axum request wrapper and the scripted LLM provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
pub mod mock_llm;
