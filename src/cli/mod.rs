//! Support code for the `mibwalk` command-line tool.

pub mod args;

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::mib::{MibObjectDef, MibTree, MibTreeBuilder};

/// Why [`load_tree`] could not produce a tree.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The definitions parsed but do not form a tree.
    #[error(transparent)]
    Tree(#[from] Box<Error>),
}

/// Build the tree for a walk: the standard registration arcs plus the
/// definitions in `path`, a JSON array of [`MibObjectDef`].
pub fn load_tree(path: Option<&Path>) -> Result<MibTree, LoadError> {
    let mut builder = MibTreeBuilder::with_standard_roots();
    if let Some(path) = path {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let defs = parse_definitions(&text).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for def in defs {
            builder.define(def);
        }
    }
    Ok(builder.build()?)
}

fn parse_definitions(text: &str) -> serde_json::Result<Vec<MibObjectDef>> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeErrorKind;
    use crate::oid;

    #[test]
    fn definitions_extend_standard_roots() {
        let defs = parse_definitions(
            r#"[
                {"parent": "mib-2", "name": "system", "id": 1},
                {"parent": "system", "name": "sysDescr", "id": 1, "access": "read-only",
                 "syntax": {"type": "DisplayString"}, "mib": "RFC1213-MIB"}
            ]"#,
        )
        .unwrap();
        let mut builder = MibTreeBuilder::with_standard_roots();
        for def in defs {
            builder.define(def);
        }
        let tree = builder.build().unwrap();
        assert_eq!(
            tree.resolve_oid("sysDescr.0").unwrap(),
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
        );
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mibwalk-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_tree(Some(Path::new("/nonexistent/mibwalk-tree.json"))).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }), "{:?}", err);
        assert!(err.to_string().starts_with("cannot read /nonexistent/mibwalk-tree.json"), "{}", err);
    }

    #[test]
    fn bad_json_is_reported_with_path() {
        let path = write_temp("bad.json", "[{\"parent\": \"mib-2\"");
        let err = load_tree(Some(&path)).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, LoadError::Parse { .. }), "{:?}", err);
        assert!(err.to_string().starts_with(&path.display().to_string()), "{}", err);
    }

    #[test]
    fn orphans_fail_the_load() {
        let path = write_temp(
            "orphan.json",
            r#"[{"parent": "nowhere", "name": "lost", "id": 1}]"#,
        );
        let err = load_tree(Some(&path)).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        match err {
            LoadError::Tree(e) => assert!(
                matches!(*e, Error::Tree(TreeErrorKind::UnresolvedParents(_))),
                "{:?}",
                e
            ),
            other => panic!("expected Tree, got {:?}", other),
        }
    }

    #[test]
    fn no_file_gives_standard_roots() {
        let tree = load_tree(None).unwrap();
        assert!(tree.find_by_name("enterprises").is_some());
    }
}
