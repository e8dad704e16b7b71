use std::sync::Arc;

use log::trace;

use super::{
    error::*,
    node::{FileType, Name, Node, dir::Dir},
};

/// Splits `path` into validated segment names.
/// A single leading `/` is ignored; `""` and `"/"` both yield no segments (the root).
pub fn segments(path: &str) -> Result<Vec<Name>> {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split('/').map(Name::try_from).collect()
}

/// A node produced by [resolve].
pub struct Resolved {
    pub node: Node,
    /// Whether the terminal segment was created by this call.
    pub created: bool,
}

/// Maps `path` to a node of `filetype`, starting at `root`.
///
/// Intermediate segments must name existing directories; only the terminal segment is created,
/// and only when `create` is set. At most one directory lock is held at a time: each level is
/// released before descending into the next.
pub fn resolve(root: &Arc<Dir>, path: &str, filetype: FileType, create: bool) -> Result<Resolved> {
    let names = segments(path)?;

    let Some((last, parents)) = names.split_last() else {
        return match filetype {
            FileType::Dir => Ok(Resolved {
                node: Node::Dir(root.clone()),
                created: false,
            }),
            FileType::File => Err(Error::IsDir),
        };
    };

    let dir = walk(root, parents)?;
    trace!("resolving terminal '{last}' in '{}'", dir.name());
    let lookup = dir.lookup(last, filetype, create)?;
    Ok(Resolved {
        node: lookup.node,
        created: lookup.created,
    })
}

/// Maps `path` to an existing node of any type.
pub fn lookup(root: &Arc<Dir>, path: &str) -> Result<Node> {
    let names = segments(path)?;

    let Some((last, parents)) = names.split_last() else {
        return Ok(Node::Dir(root.clone()));
    };

    walk(root, parents)?.find(last).ok_or(Error::NotFound)
}

/// Descends from `root` through existing directories called `names`.
fn walk(root: &Arc<Dir>, names: &[Name]) -> Result<Arc<Dir>> {
    let mut dir = root.clone();
    for name in names {
        trace!("resolving '{name}' in '{}'", dir.name());
        dir = match dir.find(name) {
            Some(Node::Dir(next)) => next,
            Some(Node::File(_)) | None => return Err(Error::NotFound),
        };
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Arc<Dir> {
        Arc::new(Dir::root())
    }

    fn names(path: &str) -> Vec<String> {
        segments(path)
            .unwrap()
            .iter()
            .map(|n| n.as_str().to_string())
            .collect()
    }

    #[test]
    fn segments_root() {
        assert!(names("").is_empty());
        assert!(names("/").is_empty());
    }

    #[test]
    fn segments_split() {
        assert_eq!(names("a/b/c"), ["a", "b", "c"]);
        assert_eq!(names("/a/b"), ["a", "b"]);
    }

    #[test]
    fn segments_invalid() {
        for path in ["a//b", "a/", "//", "a/./b", "a/../b"] {
            assert_eq!(segments(path).err(), Some(Error::InvalidName), "{path:?}");
        }
    }

    #[test]
    fn resolve_root() {
        let root = root();
        let res = resolve(&root, "/", FileType::Dir, false).unwrap();
        assert!(!res.created);
        assert!(Arc::ptr_eq(&res.node.into_dir().unwrap(), &root));

        let res = resolve(&root, "/", FileType::File, true);
        assert_eq!(res.err(), Some(Error::IsDir));
        assert!(root.is_empty());
    }

    #[test]
    fn resolve_create_terminal() {
        let root = root();
        let res = resolve(&root, "a", FileType::Dir, true).unwrap();
        assert!(res.created);

        let res = resolve(&root, "a/b.txt", FileType::File, true).unwrap();
        assert!(res.created);
        assert_eq!(res.node.name().as_str(), "b.txt");

        let res = resolve(&root, "/a/b.txt", FileType::File, false).unwrap();
        assert!(!res.created);
    }

    #[test]
    fn resolve_missing_intermediate() {
        let root = root();
        let res = resolve(&root, "a/b", FileType::Dir, true);
        assert_eq!(res.err(), Some(Error::NotFound));
        assert!(root.is_empty());
    }

    #[test]
    fn resolve_file_intermediate() {
        let root = root();
        resolve(&root, "a", FileType::File, true).unwrap();
        let res = resolve(&root, "a/b", FileType::File, true);
        assert_eq!(res.err(), Some(Error::NotFound));
    }

    #[test]
    fn resolve_case_sensitive() {
        let root = root();
        resolve(&root, "Doc", FileType::File, true).unwrap();
        let res = resolve(&root, "doc", FileType::File, false);
        assert_eq!(res.err(), Some(Error::NotFound));
    }

    #[test]
    fn lookup_any_type() {
        let root = root();
        resolve(&root, "a", FileType::Dir, true).unwrap();
        resolve(&root, "a/b", FileType::File, true).unwrap();

        assert_eq!(lookup(&root, "a").unwrap().filetype(), FileType::Dir);
        assert_eq!(lookup(&root, "a/b").unwrap().filetype(), FileType::File);
        assert_eq!(lookup(&root, "").unwrap().filetype(), FileType::Dir);
        assert_eq!(lookup(&root, "a/c").err(), Some(Error::NotFound));
        assert_eq!(lookup(&root, "a/b/c").err(), Some(Error::NotFound));
    }

    #[test]
    fn resolve_invalid_does_not_mutate() {
        let root = root();
        resolve(&root, "a", FileType::Dir, true).unwrap();
        let res = resolve(&root, "a//b", FileType::File, true);
        assert_eq!(res.err(), Some(Error::InvalidName));
        assert!(root.find(&Name::try_from("a").unwrap()).is_some());
        assert_eq!(root.len(), 1);
    }
}
