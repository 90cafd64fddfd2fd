//! funcpack library.
//!
//! This crate provides the core functionality for building deployable
//! archives for a function-execution runtime: dependency resolution,
//! artifact acquisition, staging-tree assembly, and archive delivery. It is
//! used by the `funcpack` CLI binary and can be consumed programmatically
//! for testing or custom packaging workflows.
//!
//! # Modules
//!
//! - [`acquire`] - Ordered acquisition strategies for dependency artifacts
//! - [`archive`] - Deterministic zip archive creation
//! - [`cli`] - Command-line argument definitions
//! - [`compile`] - Bytecode compilation over the staging tree
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Semantic error types for the packaging pipeline
//! - [`extract`] - Archive extraction with path-traversal protection
//! - [`ignore`] - Path patterns excluded from every copy and extraction
//! - [`index`] - Package index lookup of installed distributions
//! - [`output`] - Progress and success message formatting
//! - [`packager`] - End-to-end packaging pipeline
//! - [`registry`] - Release metadata and artifact downloads
//! - [`resolver`] - Transitive dependency-closure resolution
//! - [`runtime`] - Target runtime identification
//! - [`sink`] - Delivery of the finished archive to its destination
//! - [`staging`] - Staging-tree assembly, pruning, and shim injection
//! - [`store`] - Bundled, version-pinned artifact store
//! - [`unpack`] - Local distribution unpacking into the staging tree
//! - [`wheels`] - Wheel naming and cache scanning

pub mod acquire;
pub mod archive;
pub mod cli;
pub mod compile;
pub mod dirs;
pub mod error;
pub mod extract;
pub mod ignore;
pub mod index;
pub mod output;
pub mod packager;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod sink;
pub mod staging;
pub mod store;
pub mod unpack;
pub mod wheels;

#[cfg(test)]
pub(crate) mod test_utils;
