use crate::hash::Hash;

/// mode of a regular file, written as decimal digits
pub const MODE_REGULAR: u32 = 100644;
/// mode of a subtree
pub const MODE_TREE: u32 = 40000;

/// a directory tree - collection of entries in insertion order
///
/// entries are never sorted. the encoded bytes (and therefore the hash) depend
/// on the order entries were added in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// create a tree from entries, keeping their order
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// create an empty tree
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// append an entry
    pub fn push(&mut self, entry: TreeEntry) {
        self.entries.push(entry);
    }

    /// append a file entry
    pub fn add_blob(&mut self, name: impl Into<String>, mode: u32, hash: Hash) {
        self.push(TreeEntry::new(mode, name, hash));
    }

    /// append a subtree entry
    pub fn add_tree(&mut self, name: impl Into<String>, hash: Hash) {
        self.push(TreeEntry::new(MODE_TREE, name, hash));
    }

    /// get entries slice
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// consume and return entries
    pub fn into_entries(self) -> Vec<TreeEntry> {
        self.entries
    }

    /// look up the first entry with this name
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is tree empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: u32,
    pub name: String,
    pub hash: Hash,
}

impl TreeEntry {
    pub fn new(mode: u32, name: impl Into<String>, hash: Hash) -> Self {
        Self {
            mode,
            name: name.into(),
            hash,
        }
    }

    /// object type the mode points at
    pub fn type_name(&self) -> &'static str {
        if self.mode == MODE_TREE {
            "tree"
        } else {
            "blob"
        }
    }

    pub fn is_tree(&self) -> bool {
        self.mode == MODE_TREE
    }
}
