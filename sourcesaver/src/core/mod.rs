//! Core domain model types.
//!
//! This module contains the fundamental types used throughout the crate:
//! - The decoded JSON tree
//! - Link and block records emitted by the extractor
//! - Stage kinds

mod block;
mod node;
mod status;

pub use block::{dedup_links, Block, LinkEntry};
pub use node::{Children, ChildrenMut, JsonNode};
pub use status::StageKind;
