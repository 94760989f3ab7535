use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::hash::{Hash, HASH_LEN};
use crate::object::{encode_object, EncodedObject, ObjectKind};
use crate::repo::Repo;
use crate::types::{Tree, TreeEntry};

/// canonical tree payload
///
/// each entry is `<mode> <name>\0<20 raw hash bytes>`. entries are joined by a
/// single `\n` and kept in insertion order. an empty tree is an empty payload.
pub fn tree_payload(tree: &Tree) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, entry) in tree.entries().iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        encode_entry(entry, &mut out);
    }
    out
}

fn encode_entry(entry: &TreeEntry, out: &mut Vec<u8>) {
    out.extend_from_slice(format!("{} {}\0", entry.mode, entry.name).as_bytes());
    out.extend_from_slice(entry.hash.as_bytes());
}

/// encode a tree into a storable object
pub fn encode_tree(tree: &Tree) -> Result<EncodedObject> {
    encode_object(ObjectKind::Tree, &tree_payload(tree))
}

/// parse a tree payload produced by [`tree_payload`]
pub fn parse_tree(payload: &[u8]) -> Result<Tree> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while pos < payload.len() {
        if !entries.is_empty() {
            if payload[pos] != b'\n' {
                return Err(corrupt(format!("missing entry separator at byte {pos}")));
            }
            pos += 1;
        }

        let nul = payload[pos..]
            .iter()
            .position(|&b| b == 0)
            .map(|i| pos + i)
            .ok_or_else(|| corrupt(format!("unterminated entry header at byte {pos}")))?;
        let header = std::str::from_utf8(&payload[pos..nul])
            .map_err(|_| corrupt("entry header is not utf-8".to_string()))?;
        let (mode, name) = header
            .split_once(' ')
            .ok_or_else(|| corrupt(format!("malformed entry header: {header}")))?;
        let mode: u32 = mode
            .parse()
            .map_err(|_| corrupt(format!("bad entry mode: {mode}")))?;

        let hash_end = nul + 1 + HASH_LEN;
        let hash = payload
            .get(nul + 1..hash_end)
            .and_then(Hash::from_slice)
            .ok_or_else(|| corrupt(format!("truncated hash for entry {name}")))?;

        entries.push(TreeEntry::new(mode, name, hash));
        pos = hash_end;
    }

    Ok(Tree::new(entries))
}

fn corrupt(message: String) -> Error {
    Error::CorruptObjectMessage(format!("tree: {message}"))
}

/// write a tree to the object store
pub fn write_tree(repo: &Repo, tree: &Tree) -> Result<Hash> {
    repo.write_object(&encode_tree(tree)?)
}

/// read a tree from the object store
pub fn read_tree(repo: &Repo, hash: &Hash) -> Result<Tree> {
    let (kind, payload) = repo.read_object(hash)?;
    if kind != ObjectKind::Tree {
        return Err(Error::InvalidObjectType(format!("{hash} is a {kind}, not a tree")));
    }
    parse_tree(&payload)
}

/// get the filesystem path to a tree object
pub fn tree_path(repo: &Repo, hash: &Hash) -> PathBuf {
    repo.object_path(hash)
}

/// check if a tree exists in the object store
pub fn tree_exists(repo: &Repo, hash: &Hash) -> bool {
    repo.object_exists(hash)
}
