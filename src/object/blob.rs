use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{encode_object, EncodedObject, ObjectKind};
use crate::repo::Repo;
use crate::types::Blob;

/// encode a blob: the payload is the content bytes, untouched
pub fn encode_blob(blob: &Blob) -> Result<EncodedObject> {
    encode_object(ObjectKind::Blob, blob.content.as_bytes())
}

/// write a blob to the object store
pub fn write_blob(repo: &Repo, blob: &Blob) -> Result<Hash> {
    repo.write_object(&encode_blob(blob)?)
}

/// read blob content from the object store
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    let (kind, payload) = repo.read_object(hash)?;
    if kind != ObjectKind::Blob {
        return Err(Error::InvalidObjectType(format!("{hash} is a {kind}, not a blob")));
    }
    Ok(payload)
}

/// get the filesystem path to a blob object
pub fn blob_path(repo: &Repo, hash: &Hash) -> std::path::PathBuf {
    repo.object_path(hash)
}

/// check if a blob exists in the object store
pub fn blob_exists(repo: &Repo, hash: &Hash) -> bool {
    repo.object_exists(hash)
}
