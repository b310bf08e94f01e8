// ABOUTME: Helper modules for wavy-cli
// ABOUTME: Terminal output formatting and confirmation prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

pub mod display;
