use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{encode_object, EncodedObject, ObjectKind};
use crate::repo::Repo;
use crate::types::{Commit, Identity};

const SIGNATURE_BEGIN: &str = "-----BEGIN PGP SIGNATURE-----";
const SIGNATURE_END: &str = " -----END PGP SIGNATURE-----";

/// one header line of a commit payload
#[derive(Debug, PartialEq, Eq)]
enum HeaderLine<'a> {
    Tree(&'a Hash),
    Parent(&'a Hash),
    Author(&'a Identity),
    Committer(&'a Identity),
    Signature(&'a str),
}

impl HeaderLine<'_> {
    fn render(&self, out: &mut String) {
        match self {
            HeaderLine::Tree(hash) => out.push_str(&format!("tree {hash}")),
            HeaderLine::Parent(hash) => out.push_str(&format!("parent {hash}")),
            HeaderLine::Author(id) => out.push_str(&format!("author {id}")),
            HeaderLine::Committer(id) => out.push_str(&format!("committer {id}")),
            HeaderLine::Signature(body) => {
                out.push_str("gpgsig ");
                out.push_str(SIGNATURE_BEGIN);
                out.push_str("\n\n");
                // continuation lines carry exactly one leading space
                out.push_str(&body.replace('\n', "\n "));
                out.push('\n');
                out.push_str(SIGNATURE_END);
            }
        }
    }
}

/// header lines in emission order, with absent fields left out
fn header_lines(commit: &Commit) -> Vec<HeaderLine<'_>> {
    let mut lines = vec![HeaderLine::Tree(&commit.tree)];
    if let Some(parent) = &commit.parent {
        lines.push(HeaderLine::Parent(parent));
    }
    lines.push(HeaderLine::Author(&commit.author));
    lines.push(HeaderLine::Committer(&commit.committer));
    if let Some(signature) = commit.signature.as_deref().filter(|s| !s.is_empty()) {
        lines.push(HeaderLine::Signature(signature));
    }
    lines
}

/// canonical commit payload: header lines, a blank line, then the message verbatim
pub fn commit_payload(commit: &Commit) -> String {
    let mut out = String::new();
    for (i, line) in header_lines(commit).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        line.render(&mut out);
    }
    out.push_str("\n\n");
    out.push_str(&commit.message);
    out
}

/// encode a commit into a storable object
pub fn encode_commit(commit: &Commit) -> Result<EncodedObject> {
    encode_object(ObjectKind::Commit, commit_payload(commit).as_bytes())
}

/// parse a commit payload produced by [`commit_payload`]
///
/// only single-parent history is understood; unknown header lines are skipped.
pub fn parse_commit(payload: &[u8]) -> Result<Commit> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| corrupt("payload is not utf-8".to_string()))?;

    let mut tree = None;
    let mut parent = None;
    let mut author = None;
    let mut committer = None;
    let mut signature = None;
    let mut message = None;

    let mut consumed = 0;
    let mut lines = text.split_inclusive('\n').peekable();
    while let Some(raw) = lines.next() {
        consumed += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);

        if line.is_empty() {
            message = Some(text[consumed..].to_string());
            break;
        }

        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        match key {
            "tree" => tree = Some(Hash::from_hex(value)?),
            "parent" => {
                if parent.is_some() {
                    return Err(corrupt("more than one parent".to_string()));
                }
                parent = Some(Hash::from_hex(value)?);
            }
            "author" => author = Some(value.parse::<Identity>()?),
            "committer" => committer = Some(value.parse::<Identity>()?),
            "gpgsig" => {
                let mut body: Vec<&str> = Vec::new();
                let mut closed = false;
                while let Some(raw) = lines.next() {
                    consumed += raw.len();
                    let line = raw.strip_suffix('\n').unwrap_or(raw);
                    // continuation lines are never empty, so only the real footer
                    // is followed directly by the message separator
                    if line == SIGNATURE_END && lines.peek().is_some_and(|next| *next == "\n") {
                        closed = true;
                        break;
                    }
                    body.push(line);
                }
                if !closed || body.first() != Some(&"") {
                    return Err(corrupt("malformed signature block".to_string()));
                }
                let restored: Vec<&str> = body[1..]
                    .iter()
                    .enumerate()
                    .map(|(i, l)| if i == 0 { *l } else { l.strip_prefix(' ').unwrap_or(*l) })
                    .collect();
                signature = Some(restored.join("\n"));
            }
            _ => {}
        }
    }

    let missing = |field: &str| corrupt(format!("missing {field}"));
    Ok(Commit {
        tree: tree.ok_or_else(|| missing("tree"))?,
        parent,
        author: author.ok_or_else(|| missing("author"))?,
        committer: committer.ok_or_else(|| missing("committer"))?,
        message: message.ok_or_else(|| missing("message separator"))?,
        signature,
    })
}

fn corrupt(message: String) -> Error {
    Error::CorruptObjectMessage(format!("commit: {message}"))
}

/// write a commit to the object store
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    repo.write_object(&encode_commit(commit)?)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    let (kind, payload) = repo.read_object(hash)?;
    if kind != ObjectKind::Commit {
        return Err(Error::InvalidObjectType(format!("{hash} is a {kind}, not a commit")));
    }
    parse_commit(&payload)
}

/// get the filesystem path to a commit object
pub fn commit_path(repo: &Repo, hash: &Hash) -> PathBuf {
    repo.object_path(hash)
}

/// check if a commit exists in the object store
pub fn commit_exists(repo: &Repo, hash: &Hash) -> bool {
    repo.object_exists(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_frame;
    use crate::object::{frame, inflate, split_frame};
    use tempfile::tempdir;

    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    fn tree() -> Hash {
        Hash::from_hex(TREE).unwrap()
    }

    fn ident() -> Identity {
        Identity::new("A", "a@x.com", 0, 0)
    }

    fn decoded(encoded: &EncodedObject) -> String {
        let framed = inflate(&encoded.compressed).unwrap();
        let (kind, payload) = split_frame(&framed).unwrap();
        assert_eq!(kind, ObjectKind::Commit);
        String::from_utf8(payload.to_vec()).unwrap()
    }

    #[test]
    fn test_root_commit_payload() {
        let commit = Commit::new(tree(), None, ident(), ident(), "hello");
        let encoded = encode_commit(&commit).unwrap();
        let payload = decoded(&encoded);

        assert_eq!(
            payload,
            format!("tree {TREE}\nauthor A <a@x.com> 0 +0000\ncommitter A <a@x.com> 0 +0000\n\nhello")
        );
        assert!(!payload.contains("parent "));
    }

    #[test]
    fn test_header_line_order() {
        let parent = Hash::from_bytes([9; 20]);
        let commit = Commit::new(tree(), Some(parent), ident(), ident(), "m").with_signature("s");
        let lines = header_lines(&commit);
        assert_eq!(
            lines,
            vec![
                HeaderLine::Tree(&commit.tree),
                HeaderLine::Parent(&parent),
                HeaderLine::Author(&commit.author),
                HeaderLine::Committer(&commit.committer),
                HeaderLine::Signature("s"),
            ]
        );
    }

    #[test]
    fn test_empty_signature_is_omitted() {
        let commit = Commit::new(tree(), None, ident(), ident(), "m").with_signature("");
        assert!(!commit_payload(&commit).contains("gpgsig"));
    }

    #[test]
    fn test_signature_continuation_lines() {
        let commit = Commit::new(tree(), None, ident(), ident(), "signed")
            .with_signature("iQEzBAABCAAdFiEE\nline two\nline three");
        let payload = decoded(&encode_commit(&commit).unwrap());
        let lines: Vec<&str> = payload.split('\n').collect();

        let start = lines
            .iter()
            .position(|l| *l == "gpgsig -----BEGIN PGP SIGNATURE-----")
            .unwrap();
        assert_eq!(lines[start + 1], "");
        assert_eq!(lines[start + 2], "iQEzBAABCAAdFiEE");
        assert_eq!(lines[start + 3], " line two");
        assert_eq!(lines[start + 4], " line three");
        assert_eq!(lines[start + 5], " -----END PGP SIGNATURE-----");
        assert_eq!(lines[start + 6], "");
        assert_eq!(lines[start + 7], "signed");

        for line in &lines[start + 3..=start + 5] {
            assert!(line.starts_with(' ') && !line.starts_with("  "));
        }
    }

    #[test]
    fn test_message_is_verbatim() {
        let commit = Commit::new(tree(), None, ident(), ident(), "");
        assert!(commit_payload(&commit).ends_with("+0000\n\n"));

        let commit = Commit::new(tree(), None, ident(), ident(), "two\nlines\n");
        assert!(commit_payload(&commit).ends_with("\n\ntwo\nlines\n"));
    }

    #[test]
    fn test_parent_links_to_previous_commit() {
        let first = Commit::new(tree(), None, ident(), ident(), "one");
        let first_encoded = encode_commit(&first).unwrap();

        let second = Commit::new(tree(), Some(first_encoded.hash), ident(), ident(), "two");
        let payload = decoded(&encode_commit(&second).unwrap());

        let parent_hex = payload
            .lines()
            .find_map(|l| l.strip_prefix("parent "))
            .unwrap();
        let independent = hash_frame(&frame(ObjectKind::Commit, commit_payload(&first).as_bytes()));
        assert_eq!(parent_hex, independent.to_hex());
    }

    #[test]
    fn test_parse_commit() {
        let commit = Commit::new(
            tree(),
            Some(Hash::from_bytes([1; 20])),
            Identity::new("Author", "author@example.com", 1700000000, 100),
            Identity::new("Committer", "committer@example.com", 1700000500, -800),
            "subject\n\nbody with\n\nblank lines",
        )
        .with_signature("first\nsecond\n\nfourth");

        let parsed = parse_commit(commit_payload(&commit).as_bytes()).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn test_parse_commit_signature_containing_footer() {
        let signature = "outer\n-----END PGP SIGNATURE-----\n-----BEGIN PGP SIGNATURE-----\n\ninner";
        let commit = Commit::new(tree(), None, ident(), ident(), "message\n -----END PGP SIGNATURE-----\n")
            .with_signature(signature);

        let parsed = parse_commit(commit_payload(&commit).as_bytes()).unwrap();
        assert_eq!(parsed.signature.as_deref(), Some(signature));
        assert_eq!(parsed, commit);

        let trailing = commit.clone().with_signature("body\n-----END PGP SIGNATURE-----");
        let parsed = parse_commit(commit_payload(&trailing).as_bytes()).unwrap();
        assert_eq!(parsed, trailing);
    }

    #[test]
    fn test_parse_commit_rejects_unterminated_signature() {
        let payload = format!(
            "tree {TREE}\nauthor A <a@x.com> 0 +0000\ncommitter A <a@x.com> 0 +0000\n\
             gpgsig {SIGNATURE_BEGIN}\n\nbody\n{SIGNATURE_END}"
        );
        assert!(parse_commit(payload.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_commit_rejects_missing_fields() {
        assert!(parse_commit(b"author A <a@x.com> 0 +0000\n\nmsg").is_err());
        let no_separator = format!("tree {TREE}\nauthor A <a@x.com> 0 +0000\ncommitter A <a@x.com> 0 +0000");
        assert!(parse_commit(no_separator.as_bytes()).is_err());
    }

    #[test]
    fn test_write_and_read_commit() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join(".git")).unwrap();

        let commit = Commit::new(tree(), None, ident(), ident(), "stored");
        let hash = write_commit(&repo, &commit).unwrap();
        assert!(commit_exists(&repo, &hash));
        assert!(commit_path(&repo, &hash).is_file());
        assert_eq!(read_commit(&repo, &hash).unwrap(), commit);
    }
}
