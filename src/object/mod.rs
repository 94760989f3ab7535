pub mod blob;
pub mod commit;
pub mod frame;
pub mod tree;

pub use blob::{blob_exists, blob_path, encode_blob, read_blob, write_blob};
pub use commit::{
    commit_exists, commit_path, commit_payload, encode_commit, parse_commit, read_commit,
    write_commit,
};
pub use frame::{decode_object, encode_object, frame, inflate, split_frame, EncodedObject, ObjectKind};
pub use tree::{encode_tree, parse_tree, read_tree, tree_exists, tree_path, tree_payload, write_tree};
