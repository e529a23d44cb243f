//! # mvn-docs
//!
//! Extracts documentation comments and the declarations they describe from
//! Java sources, producing (origin, doc comment, signature) triples for LLM
//! processing.
//!
//! ## Architecture
//!
//! - **classify**: Stateless per-line predicates (doc openers/closers, body brace detection)
//! - **machine**: Line-driven state machine pairing doc comments with declarations
//! - **record**: The emitted `PairedRecord` and its printable form
//! - **extract**: Drivers for lines, files, ZIP/JAR archives and directories
//! - **scan**: Local discovery of `.java`, `.jar` and `.zip` inputs
//! - **coordinate**: Maven coordinates and repository layout
//! - **snapshot**: Snapshot version resolution from `maven-metadata.xml`
//! - **fetch**: HTTP download of sources JARs with proxy support
//! - **cache**: Downloaded JARs indexed in LMDB via heed
//! - **config**: Cache home and default resolution
//! - **logger**: `tracing` subscriber setup

pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod coordinate;
pub mod extract;
pub mod fetch;
pub mod logger;
pub mod machine;
pub mod record;
pub mod scan;
pub mod snapshot;
