use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Descriptor pool
    NoDescriptors,
    BadDescriptor,

    // Path
    InvalidName,
    NotFound,

    // Node
    AlreadyExists,
    IsDir,
    NotDir,

    // File
    FileTooLarge,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoDescriptors => "no free file descriptors",
            Self::BadDescriptor => "bad file descriptor",
            Self::InvalidName => "invalid name",
            Self::NotFound => "no such file or directory",
            Self::AlreadyExists => "already exists",
            Self::IsDir => "is a directory",
            Self::NotDir => "not a directory",
            Self::FileTooLarge => "file too large",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}

impl From<Error> for libc::c_int {
    fn from(err: Error) -> Self {
        match err {
            Error::NoDescriptors => libc::EMFILE,
            Error::BadDescriptor => libc::EBADF,
            Error::InvalidName => libc::EINVAL,
            Error::NotFound => libc::ENOENT,
            Error::AlreadyExists => libc::EEXIST,
            Error::IsDir => libc::EISDIR,
            Error::NotDir => libc::ENOTDIR,
            Error::FileTooLarge => libc::EFBIG,
        }
    }
}
