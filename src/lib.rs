//! # neacbuild - NEAC Build Orchestrator
//!
//! neacbuild compiles the NEAC codec projects with any GCC-compatible C
//! compiler and links the `neac` executable and the `libneacdll` shared
//! library.
//!
//! ## Features
//!
//! - **Dependency Ordering**: Projects form a small DAG built wave by wave
//! - **Parallel Builds**: Independent projects and source files share one bounded worker pool
//! - **No Shell**: Tools are spawned with argument vectors, so any path is safe
//! - **Honest Exit Status**: Failures are reported per step and fail the run
//! - **Cross-Platform Naming**: `neac` / `neac.exe`, `.so` / `.dll`
//!
//! ## Quick Start
//!
//! ```bash
//! # From the directory holding libneac/, libwavefile/, neac/, libneacdll/
//! neacbuild build
//!
//! # Sequential, continue past failures, using clang
//! neacbuild build -j 1 --keep-going --compiler clang
//! ```
//!
//! ## Module Organization
//!
//! - [`build`] - Compile/link steps and the orchestrator
//! - [`config`] - Layered configuration (`neacbuild.toml`)
//! - [`layout`] - Source, object and binary directories
//! - [`platform`] - Host detection and artifact naming
//! - [`toolchain`] - Compiler selection and probing
//! - [`commands`] - CLI command handlers

/// Compile, link and orchestration.
pub mod build;

/// CLI command handlers extracted from main.
pub mod commands;

/// Configuration file parsing (`neacbuild.toml`).
pub mod config;

/// Directory layout derivation.
pub mod layout;

/// Host OS detection and artifact naming.
pub mod platform;

/// Toolchain selection and probing.
pub mod toolchain;

/// Terminal UI utilities (console, tables).
pub mod ui;
