//! # configtree
//!
//! Insertion-ordered configuration trees with a typed, layered deep merge.
//!
//! A [`ConfigNode`] is a map from string keys to [`ConfigValue`]s, where a
//! value is a scalar (boolean, integer, string), a list, or a nested node.
//! Trees are built once from defaults and then refined by override layers:
//!
//! ```
//! use configtree::{ConfigNode, resolve};
//!
//! let base = ConfigNode::new()
//!     .with("storage", ConfigNode::new().with("engine", "memory"))
//!     .with("http", ConfigNode::new().with("listen", ":8080"));
//!
//! let production = ConfigNode::new()
//!     .with("storage", ConfigNode::new().with("engine", "cassandra"));
//!
//! let effective = resolve(&base, &[production]).unwrap();
//! assert_eq!(effective.get_path("storage.engine").and_then(|v| v.as_str()), Some("cassandra"));
//! assert_eq!(effective.get_path("http.listen").and_then(|v| v.as_str()), Some(":8080"));
//! ```
//!
//! ## Merge rules
//!
//! - Nested maps merge key by key.
//! - Scalars and lists are replaced wholesale; lists never concatenate.
//! - Keys keep their position from the base tree; keys first introduced by
//!   an override are appended where they first appear.
//! - Replacing a value with one of a different [`Kind`] is rejected with
//!   [`Error::SchemaViolation`].

pub mod error;
pub mod node;
pub mod resolve;

pub use error::{Error, Result};
pub use node::{ConfigNode, ConfigValue, Kind};
pub use resolve::{merge_into, resolve};
