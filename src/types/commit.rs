use crate::hash::Hash;
use crate::types::Identity;

/// a commit object pointing to a tree and at most one parent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// root tree hash
    pub tree: Hash,
    /// parent commit (none for the root of a chain)
    pub parent: Option<Hash>,
    pub author: Identity,
    pub committer: Identity,
    /// commit message, stored verbatim
    pub message: String,
    /// pre-computed armored signature body, without the BEGIN/END lines
    pub signature: Option<String>,
}

impl Commit {
    /// create a new unsigned commit
    pub fn new(
        tree: Hash,
        parent: Option<Hash>,
        author: Identity,
        committer: Identity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parent,
            author,
            committer,
            message: message.into(),
            signature: None,
        }
    }

    /// attach a signature block
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// is this the first commit of a chain
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
