//! Utils module - Shared utilities and helpers
//!
//! This module provides utility functions and helpers that are used across
//! multiple layers of the application architecture.

/// Tracing setup and verbose console output
pub mod logging;

/// Text width handling and value formatting
pub mod text;

/// Input validation and sanitization utilities
pub mod validation;
