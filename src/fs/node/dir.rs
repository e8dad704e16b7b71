use log::debug;
use spin::Mutex;

use super::*;

/// Represents a directory entry as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: Name,
    pub filetype: FileType,
}

/// A directory. Owns its children in insertion order.
pub struct Dir {
    name: Name,
    entries: Mutex<Vec<Node>>,
}

/// Result of [Dir::lookup].
pub struct Lookup {
    pub node: Node,
    pub created: bool,
}

impl Dir {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Constructs the nameless root directory.
    pub fn root() -> Self {
        Self::new(Name::root())
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the child called `name`, if any.
    pub fn find(&self, name: &Name) -> Option<Node> {
        let entries = self.entries.lock();
        entries.iter().find(|node| node.name() == name).cloned()
    }

    /// Finds the child called `name` and checks that it is of `filetype`.
    /// If no such child exists and `create` is set, appends a new empty one.
    ///
    /// The search and the insertion happen under a single acquisition of the directory lock,
    /// so two racing creators agree on one node.
    pub fn lookup(&self, name: &Name, filetype: FileType, create: bool) -> Result<Lookup> {
        let mut entries = self.entries.lock();

        if let Some(node) = entries.iter().find(|node| node.name() == name) {
            if node.filetype() != filetype {
                return Err(node.filetype().mismatch());
            }
            return Ok(Lookup {
                node: node.clone(),
                created: false,
            });
        }

        if !create {
            return Err(Error::NotFound);
        }

        let node = Node::new(filetype, name.clone());
        entries.push(node.clone());
        debug!("created {filetype} '{name}' in '{}'", self.name);

        Ok(Lookup {
            node,
            created: true,
        })
    }

    /// Calls `f` on every child in insertion order while holding the directory lock.
    pub fn visit(&self, f: impl FnMut(&Node)) {
        let entries = self.entries.lock();
        entries.iter().for_each(f);
    }

    pub fn list(&self) -> Vec<DirEntry> {
        let mut list = Vec::new();
        self.visit(|node| {
            list.push(DirEntry {
                name: node.name().clone(),
                filetype: node.filetype(),
            })
        });
        list
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
