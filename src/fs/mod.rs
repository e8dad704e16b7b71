pub mod config;
pub mod error;
pub mod node;
pub mod path;


use std::{fmt, sync::Arc};

use log::{debug, warn};

use crate::fd::{DescriptorPool, Fd, FileDescription};
use config::Config;
use error::*;
use node::{
    FileType,
    dir::{Dir, DirEntry},
};

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Cursor at the start, contents kept.
    Read,
    /// Cursor at the start, contents truncated.
    Write,
    /// Cursor at the end, contents kept.
    Append,
}

/// Attributes of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub filetype: FileType,
    pub size: u64,
}

/// An in-memory hierarchical filesystem.
///
/// Holds the root directory and the descriptor pool. All operations take `&self` and may be
/// called from many threads at once.
pub struct Filesystem {
    root: Arc<Dir>,
    pool: DescriptorPool,
}

impl Filesystem {
    /// Constructs an empty filesystem with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Constructs an empty filesystem.
    pub fn with_config(config: Config) -> Self {
        debug!(
            "initializing filesystem with {} descriptors",
            config.max_descriptors
        );
        Self {
            root: Arc::new(Dir::root()),
            pool: DescriptorPool::new(config.max_descriptors),
        }
    }

    /// Creates a directory at `path`.
    /// The parent must already exist; intermediate directories are not created.
    pub fn mkdir(&self, path: &str) -> Result<()> {
        path::resolve(&self.root, path, FileType::Dir, true)
            .and_then(|resolved| {
                if resolved.created {
                    Ok(())
                } else {
                    Err(Error::AlreadyExists)
                }
            })
            .inspect_err(|err| warn!("mkdir '{path}': {err}"))
    }

    /// Opens the file at `path`, creating an empty one if it is missing.
    ///
    /// [Mode::Write] truncates the file; [Mode::Append] places the cursor at its end.
    pub fn open(&self, path: &str, mode: Mode) -> Result<Fd> {
        let fd = self
            .pool
            .acquire()
            .inspect_err(|err| warn!("open '{path}': {err}"))?;

        let file = match path::resolve(&self.root, path, FileType::File, true)
            .and_then(|resolved| resolved.node.into_file())
        {
            Ok(file) => file,
            Err(err) => {
                warn!("unable to open file '{path}': {err}");
                self.pool.release(fd)?;
                return Err(err);
            }
        };

        let offset = match mode {
            Mode::Read | Mode::Write => 0,
            Mode::Append => file.size(),
        };
        if mode == Mode::Write {
            file.clear();
        }

        self.pool.bind(fd, FileDescription::new(file, offset))?;
        debug!("opened '{path}' as {mode:?} on descriptor {}", fd.index());
        Ok(fd)
    }

    /// Returns the descriptor to the pool.
    pub fn close(&self, fd: Fd) -> Result<()> {
        self.pool
            .unbind(fd)
            .and_then(|_| self.pool.release(fd))
            .inspect_err(|err| warn!("close {}: {err}", fd.index()))
    }

    /// Reads up to `buf.len()` bytes at the cursor and advances it by the count read.
    ///
    /// Callers sharing one descriptor share its cursor; each read sees the cursor the previous
    /// one left.
    pub fn read(&self, fd: Fd, buf: &mut [u8]) -> Result<usize> {
        Ok(self.description(fd)?.read(buf))
    }

    /// Writes all of `buf` at the cursor, growing the file as needed, and advances the cursor.
    ///
    /// Fails with [Error::FileTooLarge] if the file would grow past
    /// [FILE_SIZE_MAX](node::file::FILE_SIZE_MAX).
    pub fn write(&self, fd: Fd, buf: &[u8]) -> Result<usize> {
        self.description(fd)?
            .write(buf)
            .inspect_err(|err| warn!("write {}: {err}", fd.index()))
    }

    /// Moves the cursor. It may be placed past the end of the file.
    pub fn seek(&self, fd: Fd, offset: u64) -> Result<()> {
        self.description(fd)?.seek(offset);
        Ok(())
    }

    /// Writes a listing of the directory at `path` to `out`: a header line, then one
    /// `name (TYPE)` line per entry in creation order.
    pub fn readdir(&self, path: &str, out: &mut impl fmt::Write) -> Result<()> {
        let dir = self.dir(path)?;

        // Diagnostic output is best-effort.
        let _ = writeln!(out, "{path}: files list:");
        dir.visit(|node| {
            let _ = writeln!(out, "{} ({})", node.name(), node.filetype());
        });
        Ok(())
    }

    /// Returns the entries of the directory at `path` in creation order.
    pub fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        Ok(self.dir(path)?.list())
    }

    pub fn stat(&self, path: &str) -> Result<Metadata> {
        let node =
            path::lookup(&self.root, path).inspect_err(|err| warn!("stat '{path}': {err}"))?;
        Ok(Metadata {
            filetype: node.filetype(),
            size: node.size(),
        })
    }

    pub fn fstat(&self, fd: Fd) -> Result<Metadata> {
        let desc = self.description(fd)?;
        Ok(Metadata {
            filetype: FileType::File,
            size: desc.file().size(),
        })
    }

    /// Returns the number of descriptors that can still be opened.
    pub fn available_descriptors(&self) -> usize {
        self.pool.available()
    }

    /// Returns the total number of descriptor slots.
    pub fn descriptor_capacity(&self) -> usize {
        self.pool.capacity()
    }

    fn dir(&self, path: &str) -> Result<Arc<Dir>> {
        path::resolve(&self.root, path, FileType::Dir, false)
            .and_then(|resolved| resolved.node.into_dir())
            .inspect_err(|err| warn!("directory '{path}' doesn't exist: {err}"))
    }

    fn description(&self, fd: Fd) -> Result<Arc<FileDescription>> {
        self.pool
            .get(fd)
            .inspect_err(|err| warn!("descriptor {}: {err}", fd.index()))
    }
}

impl Default for Filesystem {
    fn default() -> Self {
        Self::new()
    }
}
