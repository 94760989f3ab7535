//! commitgen - offline git history generator
//!
//! builds a linear chain of git commits and writes the objects straight into a
//! loose object store, without a working tree, an index, or refs.
//!
//! # Core concepts
//!
//! - **Blob**: file content, stored unmodified
//! - **Tree**: entries of `<mode> <name>\0<20-byte id>`, joined by `\n` in insertion order
//! - **Commit**: tree, optional parent, author, committer, optional signature, message
//!
//! # Object format
//!
//! object id = SHA1(`<kind> <payload length>\0<payload>`)
//!
//! the same frame is zlib-compressed and stored at `objects/<id[..2]>/<id[2..]>`.
//!
//! # Example usage
//!
//! ```no_run
//! use commitgen::{ops, Config, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::init(Path::new(".git")).unwrap();
//! let plan = ops::ChainPlan::from_config(&Config::default()).unwrap();
//! let report = ops::generate(&repo, &plan, |_, _| {}).unwrap();
//! println!("{:?}", report.head);
//! ```

mod config;
mod error;
mod hash;
mod repo;

pub mod object;
pub mod ops;
pub mod types;

pub use config::{Config, GenerationConfig, IdentityConfig};
pub use error::{Error, Result};
pub use hash::{hash_frame, Hash, HASH_LEN};
pub use object::{
    encode_blob, encode_commit, encode_object, encode_tree, read_blob, read_commit, read_tree,
    write_blob, write_commit, write_tree, EncodedObject, ObjectKind,
};
pub use repo::{create_dir_if_absent, Repo};
pub use types::{Blob, Commit, Identity, Tree, TreeEntry};
