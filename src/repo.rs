use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::object::{decode_object, EncodedObject, ObjectKind};

/// a loose object store: `<path>/objects/<2 hex>/<38 hex>`
#[derive(Clone, Debug)]
pub struct Repo {
    path: PathBuf,
}

impl Repo {
    /// prepare a store at the given path, creating `objects/` if needed
    ///
    /// an existing store is reused as-is.
    pub fn init(path: &Path) -> Result<Self> {
        let repo = Self {
            path: path.to_path_buf(),
        };
        create_dir_if_absent(&repo.objects_path())?;
        Ok(repo)
    }

    /// open an existing store
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Self {
            path: path.to_path_buf(),
        };
        if !repo.objects_path().is_dir() {
            return Err(Error::NoRepo(path.to_path_buf()));
        }
        Ok(repo)
    }

    /// store root path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.path.join("objects")
    }

    /// get the filesystem path of an object
    pub fn object_path(&self, hash: &Hash) -> PathBuf {
        let (dir, file) = hash.to_path_components();
        self.objects_path().join(dir).join(file)
    }

    /// check if an object exists in the store
    pub fn object_exists(&self, hash: &Hash) -> bool {
        self.object_path(hash).exists()
    }

    /// write an encoded object under its hash
    ///
    /// an existing file at that path is replaced. equal hashes mean equal
    /// content, so the last writer winning is harmless.
    pub fn write_object(&self, object: &EncodedObject) -> Result<Hash> {
        let (dir, file) = object.hash.to_path_components();
        let object_dir = self.objects_path().join(&dir);
        let object_path = object_dir.join(&file);

        create_dir_if_absent(&object_dir)?;

        // write to a temp file in the same directory, then rename over the target
        let tmp_path = object_dir.join(format!("tmp_obj_{}", uuid::Uuid::new_v4()));
        {
            let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
            tmp_file.write_all(&object.compressed).with_path(&tmp_path)?;
        }
        fs::rename(&tmp_path, &object_path).with_path(&object_path)?;

        tracing::debug!(kind = %object.kind, hash = %object.hash, "wrote object");
        Ok(object.hash)
    }

    /// read the compressed bytes of an object
    pub fn read_raw(&self, hash: &Hash) -> Result<Vec<u8>> {
        let path = self.object_path(hash);
        fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ObjectNotFound(*hash)
            } else {
                Error::Io {
                    path: path.clone(),
                    source: e,
                }
            }
        })
    }

    /// read, verify and unframe an object
    pub fn read_object(&self, hash: &Hash) -> Result<(ObjectKind, Vec<u8>)> {
        let compressed = self.read_raw(hash)?;
        decode_object(hash, &compressed)
    }
}

/// create a directory (and parents) unless it already exists
///
/// any failure other than the directory already being there is returned.
pub fn create_dir_if_absent(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(Error::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{encode_object, inflate};
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join(".git")).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_repo_init_creates_objects_dir() {
        let (_dir, repo) = test_repo();
        assert!(repo.objects_path().is_dir());
    }

    #[test]
    fn test_repo_init_is_idempotent() {
        let (_dir, repo) = test_repo();
        let again = Repo::init(repo.path()).unwrap();
        assert_eq!(again.path(), repo.path());
    }

    #[test]
    fn test_repo_open_missing() {
        let dir = tempdir().unwrap();
        let result = Repo::open(&dir.path().join("nothing"));
        assert!(matches!(result, Err(Error::NoRepo(_))));
    }

    #[test]
    fn test_object_path_split() {
        let (_dir, repo) = test_repo();
        let hash = Hash::from_hex("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        let path = repo.object_path(&hash);
        assert_eq!(
            path,
            repo.objects_path()
                .join("ab")
                .join("cdef0123456789abcdef0123456789abcdef01")
        );
    }

    #[test]
    fn test_write_and_read_object() {
        let (_dir, repo) = test_repo();
        let encoded = encode_object(ObjectKind::Blob, b"hello").unwrap();

        let hash = repo.write_object(&encoded).unwrap();
        assert_eq!(hash, encoded.hash);
        assert!(repo.object_exists(&hash));

        let stored = fs::read(repo.object_path(&hash)).unwrap();
        assert_eq!(inflate(&stored).unwrap(), b"blob 5\0hello".to_vec());

        let (kind, payload) = repo.read_object(&hash).unwrap();
        assert_eq!(kind, ObjectKind::Blob);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let (_dir, repo) = test_repo();
        let encoded = encode_object(ObjectKind::Blob, b"hello").unwrap();
        let path = repo.object_path(&encoded.hash);

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"stale").unwrap();

        repo.write_object(&encoded).unwrap();
        assert_eq!(fs::read(&path).unwrap(), encoded.compressed);
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let (_dir, repo) = test_repo();
        let encoded = encode_object(ObjectKind::Blob, b"x").unwrap();
        repo.write_object(&encoded).unwrap();
        repo.write_object(&encoded).unwrap();

        let dir = repo.object_path(&encoded.hash).parent().unwrap().to_path_buf();
        let names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(!names[0].starts_with("tmp_obj_"));
    }

    #[test]
    fn test_read_nonexistent_object() {
        let (_dir, repo) = test_repo();
        let result = repo.read_object(&Hash::ZERO);
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_read_detects_corruption() {
        let (_dir, repo) = test_repo();
        let good = encode_object(ObjectKind::Blob, b"good").unwrap();
        let bad = encode_object(ObjectKind::Blob, b"bad").unwrap();
        repo.write_object(&good).unwrap();
        fs::write(repo.object_path(&good.hash), &bad.compressed).unwrap();

        let result = repo.read_object(&good.hash);
        assert!(matches!(result, Err(Error::CorruptObject(_))));
    }

    #[test]
    fn test_create_dir_if_absent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b");
        create_dir_if_absent(&target).unwrap();
        create_dir_if_absent(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_create_dir_if_absent_rejects_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("file");
        fs::write(&target, b"").unwrap();
        assert!(create_dir_if_absent(&target).is_err());
    }
}
