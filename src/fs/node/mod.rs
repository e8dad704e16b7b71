pub mod dir;
pub mod file;

use std::{fmt, sync::Arc};

use dir::Dir;
use file::File;

use super::error::*;

/// How long a directory entry name can be.
pub const NAME_MAX_LEN: usize = 255;

/// Filetypes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileType {
    #[default]
    File,
    Dir,
}

impl FileType {
    /// The error reported when a node of this type is found where the other type was requested.
    pub fn mismatch(self) -> Error {
        match self {
            Self::File => Error::NotDir,
            Self::Dir => Error::IsDir,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("FILE"),
            Self::Dir => f.write_str("DIR"),
        }
    }
}

/// Represents the name of a directory entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Box<str>);

impl Name {
    /// The root directory's name.
    pub(crate) fn root() -> Self {
        Self("".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'a> TryFrom<&'a str> for Name {
    type Error = Error;

    fn try_from(name: &'a str) -> Result<Self> {
        if name.is_empty() || name.len() > NAME_MAX_LEN {
            return Err(Error::InvalidName);
        }

        if name.contains('\0') || name.contains('/') {
            return Err(Error::InvalidName);
        }

        if name == "." || name == ".." {
            return Err(Error::InvalidName);
        }

        Ok(Self(name.into()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A filesystem object.
///
/// Nodes are shared handles: cloning one clones the reference, not the contents.
#[derive(Clone)]
pub enum Node {
    Dir(Arc<Dir>),
    File(Arc<File>),
}

impl Node {
    /// Constructs an empty node of given filetype.
    pub fn new(filetype: FileType, name: Name) -> Self {
        match filetype {
            FileType::Dir => Self::Dir(Arc::new(Dir::new(name))),
            FileType::File => Self::File(Arc::new(File::new(name))),
        }
    }

    pub fn name(&self) -> &Name {
        match self {
            Self::Dir(dir) => dir.name(),
            Self::File(file) => file.name(),
        }
    }

    pub fn filetype(&self) -> FileType {
        match self {
            Self::Dir(_) => FileType::Dir,
            Self::File(_) => FileType::File,
        }
    }

    /// Byte size of the node. Directories have none.
    pub fn size(&self) -> u64 {
        match self {
            Self::Dir(_) => 0,
            Self::File(file) => file.size(),
        }
    }

    pub fn into_dir(self) -> Result<Arc<Dir>> {
        match self {
            Self::Dir(dir) => Ok(dir),
            Self::File(_) => Err(Error::NotDir),
        }
    }

    pub fn into_file(self) -> Result<Arc<File>> {
        match self {
            Self::File(file) => Ok(file),
            Self::Dir(_) => Err(Error::IsDir),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", self.name())
            .field("filetype", &self.filetype())
            .field("size", &self.size())
            .finish()
    }
}
