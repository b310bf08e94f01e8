// ABOUTME: Command modules for wavy-cli
// ABOUTME: One module per API area: patients, plans, and procurement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

pub mod patients;
pub mod plans;
pub mod procurement;
