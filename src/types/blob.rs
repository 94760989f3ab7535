/// file content, stored as-is
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blob {
    pub content: String,
}

impl Blob {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}
