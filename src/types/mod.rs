mod blob;
mod commit;
mod identity;
mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use identity::Identity;
pub use tree::{Tree, TreeEntry, MODE_REGULAR, MODE_TREE};
