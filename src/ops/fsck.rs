use std::collections::{HashMap, HashSet};
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{decode_object, parse_commit, parse_tree, ObjectKind};
use crate::repo::Repo;

/// fsck report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects checked
    pub objects_checked: usize,
    /// objects that fail to inflate, parse, or hash to their name
    pub corrupt_objects: Vec<CorruptObject>,
    /// objects referenced from a head but absent from the store
    pub missing_objects: Vec<MissingObject>,
    /// references that resolve to an object of the wrong kind
    pub mismatched_objects: Vec<MismatchedObject>,
    /// stored objects not reachable from any given head
    pub dangling_objects: Vec<Hash>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt_objects.is_empty()
            && self.missing_objects.is_empty()
            && self.mismatched_objects.is_empty()
    }
}

#[derive(Debug)]
pub struct CorruptObject {
    pub hash: Hash,
    pub message: String,
}

#[derive(Debug)]
pub struct MissingObject {
    pub hash: Hash,
    pub object_type: ObjectKind,
    pub referenced_by: String,
}

#[derive(Debug)]
pub struct MismatchedObject {
    pub hash: Hash,
    pub expected: ObjectKind,
    pub found: ObjectKind,
    pub referenced_by: String,
}

/// verify every stored object, and reachability from `heads` when any are given
pub fn fsck(repo: &Repo, heads: &[Hash]) -> Result<FsckReport> {
    let mut report = FsckReport::default();
    let mut kinds = HashMap::new();

    for hash in list_objects(&repo.objects_path())? {
        report.objects_checked += 1;
        let checked = repo
            .read_raw(&hash)
            .map_err(|e| e.to_string())
            .and_then(|compressed| check_object(&hash, &compressed));
        match checked {
            Ok(kind) => {
                kinds.insert(hash, kind);
            }
            Err(message) => {
                tracing::warn!(%hash, %message, "corrupt object");
                report.corrupt_objects.push(CorruptObject { hash, message });
            }
        }
    }

    if heads.is_empty() {
        return Ok(report);
    }

    let mut reachable = HashSet::new();
    for head in heads {
        walk_chain(repo, head, &kinds, &mut reachable, &mut report)?;
    }

    let mut dangling: Vec<Hash> = kinds
        .keys()
        .filter(|hash| !reachable.contains(*hash))
        .copied()
        .collect();
    dangling.sort();
    report.dangling_objects = dangling;

    Ok(report)
}

/// decode one object fully, returning its kind or a description of the damage
fn check_object(hash: &Hash, compressed: &[u8]) -> std::result::Result<ObjectKind, String> {
    let (kind, payload) = decode_object(hash, compressed).map_err(|e| match e {
        Error::CorruptObject(_) => "hash mismatch".to_string(),
        other => other.to_string(),
    })?;
    match kind {
        ObjectKind::Blob => {}
        ObjectKind::Tree => {
            parse_tree(&payload).map_err(|e| e.to_string())?;
        }
        ObjectKind::Commit => {
            parse_commit(&payload).map_err(|e| e.to_string())?;
        }
    }
    Ok(kind)
}

fn walk_chain(
    repo: &Repo,
    head: &Hash,
    kinds: &HashMap<Hash, ObjectKind>,
    reachable: &mut HashSet<Hash>,
    report: &mut FsckReport,
) -> Result<()> {
    let mut next = Some((*head, "head".to_string()));

    // iterative: generated chains are far too long to recurse over
    while let Some((hash, referenced_by)) = next.take() {
        if !reachable.insert(hash) {
            break;
        }
        if !expect_kind(repo, hash, ObjectKind::Commit, referenced_by, kinds, report) {
            continue;
        }

        let (_, payload) = repo.read_object(&hash)?;
        let commit = parse_commit(&payload)?;
        walk_tree(repo, &commit.tree, format!("commit {hash}"), kinds, reachable, report)?;
        next = commit.parent.map(|parent| (parent, format!("commit {hash}")));
    }

    Ok(())
}

fn walk_tree(
    repo: &Repo,
    tree_hash: &Hash,
    referenced_by: String,
    kinds: &HashMap<Hash, ObjectKind>,
    reachable: &mut HashSet<Hash>,
    report: &mut FsckReport,
) -> Result<()> {
    if !reachable.insert(*tree_hash) {
        return Ok(());
    }
    if !expect_kind(repo, *tree_hash, ObjectKind::Tree, referenced_by, kinds, report) {
        return Ok(());
    }

    let (_, payload) = repo.read_object(tree_hash)?;
    for entry in parse_tree(&payload)?.into_entries() {
        let referenced_by = format!("tree {} entry {}", tree_hash, entry.name);
        if entry.is_tree() {
            walk_tree(repo, &entry.hash, referenced_by, kinds, reachable, report)?;
        } else {
            reachable.insert(entry.hash);
            expect_kind(repo, entry.hash, ObjectKind::Blob, referenced_by, kinds, report);
        }
    }
    Ok(())
}

/// check that a referenced object is stored with the expected kind
///
/// returns true when it is. absent and wrong-kind objects are recorded;
/// corrupt ones were already reported by the scan.
fn expect_kind(
    repo: &Repo,
    hash: Hash,
    expected: ObjectKind,
    referenced_by: String,
    kinds: &HashMap<Hash, ObjectKind>,
    report: &mut FsckReport,
) -> bool {
    match kinds.get(&hash) {
        Some(found) if *found == expected => return true,
        Some(found) => report.mismatched_objects.push(MismatchedObject {
            hash,
            expected,
            found: *found,
            referenced_by,
        }),
        None if !repo.object_exists(&hash) => report.missing_objects.push(MissingObject {
            hash,
            object_type: expected,
            referenced_by,
        }),
        None => {}
    }
    false
}

fn list_objects(dir: &Path) -> Result<Vec<Hash>> {
    let mut hashes = Vec::new();

    if !dir.exists() {
        return Ok(hashes);
    }

    for entry in WalkDir::new(dir).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| Error::Io {
            path: dir.to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walkdir error")),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let parent_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");

        // temp files and anything else not named by a hash are skipped
        let hex = format!("{}{}", parent_name, file_name);
        // the name must round-trip exactly, so uppercase variants are skipped too
        if let Ok(hash) = Hash::from_hex(&hex) {
            if hash.to_hex() == hex {
                hashes.push(hash);
            }
        }
    }

    hashes.sort();
    Ok(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationConfig, IdentityConfig};
    use crate::object::{encode_object, read_commit};
    use crate::ops::{generate, ChainPlan};
    use std::fs;
    use tempfile::tempdir;

    fn chain(commits: i64) -> (tempfile::TempDir, Repo, Hash) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join(".git")).unwrap();
        let generation = GenerationConfig {
            start: 0,
            end: commits,
            step: 1,
            ..GenerationConfig::default()
        };
        let plan = ChainPlan::new(IdentityConfig::default(), generation).unwrap();
        let head = generate(&repo, &plan, |_, _| {}).unwrap().head.unwrap();
        (dir, repo, head)
    }

    #[test]
    fn test_fsck_healthy_chain() {
        let (_dir, repo, head) = chain(3);
        let report = fsck(&repo, &[head]).unwrap();

        assert!(report.is_ok());
        assert_eq!(report.objects_checked, 9);
        assert!(report.dangling_objects.is_empty());
    }

    #[test]
    fn test_fsck_without_heads() {
        let (_dir, repo, _head) = chain(2);
        let report = fsck(&repo, &[]).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.objects_checked, 6);
        assert!(report.dangling_objects.is_empty());
    }

    #[test]
    fn test_fsck_detects_corruption() {
        let (_dir, repo, head) = chain(2);
        let bogus = encode_object(ObjectKind::Blob, b"something else").unwrap();
        fs::write(repo.object_path(&head), &bogus.compressed).unwrap();

        let report = fsck(&repo, &[]).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.corrupt_objects.len(), 1);
        assert_eq!(report.corrupt_objects[0].hash, head);
        assert_eq!(report.corrupt_objects[0].message, "hash mismatch");
    }

    #[test]
    fn test_fsck_detects_missing_blob() {
        let (_dir, repo, head) = chain(2);
        let commit = read_commit(&repo, &head).unwrap();
        let tree = crate::object::read_tree(&repo, &commit.tree).unwrap();
        let blob = tree.entries()[0].hash;
        fs::remove_file(repo.object_path(&blob)).unwrap();

        let report = fsck(&repo, &[head]).unwrap();
        assert_eq!(report.missing_objects.len(), 1);
        assert_eq!(report.missing_objects[0].hash, blob);
        assert_eq!(report.missing_objects[0].object_type, ObjectKind::Blob);
    }

    #[test]
    fn test_fsck_dangling_from_middle_head() {
        let (_dir, repo, head) = chain(3);
        let parent = read_commit(&repo, &head).unwrap().parent.unwrap();

        let report = fsck(&repo, &[parent]).unwrap();
        assert!(report.is_ok());
        // the newest commit, its tree and its blob
        assert_eq!(report.dangling_objects.len(), 3);
        assert!(report.dangling_objects.contains(&head));
    }

    #[test]
    fn test_fsck_ignores_temp_files() {
        let (_dir, repo, head) = chain(1);
        let dir = repo.object_path(&head).parent().unwrap().to_path_buf();
        fs::write(dir.join("tmp_obj_leftover"), b"partial").unwrap();

        let report = fsck(&repo, &[head]).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.objects_checked, 3);
    }

    #[test]
    fn test_fsck_skips_uppercase_names() {
        let (_dir, repo, head) = chain(1);
        let stray_dir = repo.objects_path().join("AB");
        fs::create_dir_all(&stray_dir).unwrap();
        fs::write(stray_dir.join("CDEF0123456789ABCDEF0123456789ABCDEF01"), b"junk").unwrap();

        let report = fsck(&repo, &[head]).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.objects_checked, 3);
    }

    #[test]
    fn test_fsck_flags_non_commit_head() {
        let (_dir, repo, head) = chain(1);
        let tree = read_commit(&repo, &head).unwrap().tree;

        let report = fsck(&repo, &[tree]).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.mismatched_objects.len(), 1);

        let mismatch = &report.mismatched_objects[0];
        assert_eq!(mismatch.hash, tree);
        assert_eq!(mismatch.expected, ObjectKind::Commit);
        assert_eq!(mismatch.found, ObjectKind::Tree);
        assert_eq!(mismatch.referenced_by, "head");
    }
}
