// ABOUTME: Core types and constants for the WAVY nutrition planner
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

#![deny(unsafe_code)]

//! # WAVY Core
//!
//! Foundation crate providing shared types for the nutrition planner. It
//! changes rarely, so the server crate gets incremental compilation benefits.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Patients, weekly plans, procurement and recipe catalogue types

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models
pub mod models;
