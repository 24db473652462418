// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]

//! # dillscope
//!
//! A cross-platform framework for parsing and analyzing Dart kernel (`.dill`)
//! binary components. Built in pure Rust, `dillscope` decodes the compact,
//! offset-indexed kernel encoding of a typed program (libraries, classes,
//! members, statements, expressions, types, constants) into a mutually
//! referential in-memory graph, without requiring the Dart SDK or VM.
//!
//! ## Features
//!
//! - **📦 Efficient input handling** - Memory-mapped file access and shared
//!   buffers that lazy completions keep alive
//! - **🔗 Canonical-name linking** - Stable dotted-path identities with
//!   forward-reference-safe resolution, shared across separately compiled files
//! - **💤 Lazy materialization** - Class members and function bodies can be
//!   deferred and forced independently, long after the initial decode
//! - **🧩 Multi-file merging** - Concatenated sub-files merge into one program
//!   with conflict-checked compilation modes and source tables
//! - **🛡️ Memory safe** - Bounds-checked decoding with comprehensive,
//!   offset-carrying error reporting
//!
//! ## Quick Start
//!
//! Add `dillscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! dillscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use dillscope::prelude::*;
//!
//! let component = Component::from_file("app.dill".as_ref())?;
//! println!("Found {} libraries", component.libraries().len());
//! # Ok::<(), dillscope::Error>(())
//! ```
//!
//! ### Configured Loading
//!
//! ```rust,no_run
//! use dillscope::{Buffer, ComponentLoader, LoadOptions};
//! use std::sync::Arc;
//!
//! let buffer = Arc::new(Buffer::from_file("app.dill".as_ref())?);
//! let component = ComponentLoader::new()
//!     .with_options(LoadOptions {
//!         eager: true,
//!         ..LoadOptions::default()
//!     })
//!     .load(&buffer)?;
//!
//! for library in component.libraries() {
//!     let library = library.read().expect("Failed to acquire read lock");
//!     println!("{:?}: {} classes", library.file_uri, library.classes.len());
//! }
//! # Ok::<(), dillscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `dillscope` is organized into three key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`file`] - Buffer backends and the primitive decoding cursor
//! - [`ir`] - The in-memory node hierarchy components decode into
//! - [`binary`] - The deserializer: tables, entity readers, lazy completions,
//!   metadata overlay, and merge rules
//!
//! The decode core is single-threaded and synchronous: one decoder instance
//! owns all mutable decode state, "laziness" is deferred invocation rather
//! than asynchronous scheduling, and fatal errors abort the whole decode with
//! no partial-success return value.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

pub mod binary;
pub mod file;
pub mod ir;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use dillscope::prelude::*;
///
/// let component = Component::from_file("app.dill".as_ref())?;
/// # Ok::<(), dillscope::Error>(())
/// ```
pub mod prelude;

pub use crate::binary::{ComponentLoader, LoadOptions};
pub use crate::error::Error;
pub use crate::file::{parser::Parser, Buffer};
pub use crate::ir::Component;

/// The result type used throughout this library.
pub type Result<T> = std::result::Result<T, Error>;
