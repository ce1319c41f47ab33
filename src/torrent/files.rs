use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::bencode::{Dictionary, Value};

/// Collect lowercase leaf file names from an `info` dictionary.
///
/// Single-file, multi-file and v2 file tree layouts are all checked and the results combined.
/// Entries with an unexpected shape are skipped.
#[must_use]
pub fn file_names(info: &Value) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let Some(info) = info.as_dictionary() else {
        return names;
    };

    if info.contains_key(b"length".as_slice())
        && let Some(name) = info.get(b"name".as_slice()).and_then(Value::as_text_ignoring_invalid)
    {
        insert_leaf(&mut names, leaf_name(Path::new(&name)));
    }

    if let Some(files) = info.get(b"files".as_slice()).and_then(Value::as_list) {
        for path in files.iter().filter_map(|file| file.get(b"path")) {
            insert_leaf(&mut names, multi_file_leaf(path));
        }
    }

    if let Some(tree) = info.get(b"file tree".as_slice()).and_then(Value::as_dictionary) {
        collect_tree_leaves(tree, &mut names);
    }

    names
}

/// Leaf name for a multi-file entry whose path is a segment list or a single string.
fn multi_file_leaf(path: &Value) -> Option<String> {
    match path {
        Value::List(segments) => {
            let joined: PathBuf = segments.iter().filter_map(Value::as_text_ignoring_invalid).collect();
            leaf_name(&joined)
        }
        Value::Bytes(_) => path.as_text_ignoring_invalid().and_then(|text| leaf_name(Path::new(&text))),
        _ => None,
    }
}

/// A key whose value holds an empty key is a file, any other dictionary is a directory.
fn collect_tree_leaves(tree: &Dictionary, names: &mut BTreeSet<String>) {
    for (key, node) in tree {
        let Some(node) = node.as_dictionary() else {
            continue;
        };
        if node.contains_key(b"".as_slice()) {
            insert_leaf(names, Some(String::from_utf8_lossy(key).replace('\u{FFFD}', "")));
        } else {
            collect_tree_leaves(node, names);
        }
    }
}

fn leaf_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().to_string())
}

fn insert_leaf(names: &mut BTreeSet<String>, name: Option<String>) {
    if let Some(name) = name.filter(|name| !name.is_empty()) {
        names.insert(name.to_lowercase());
    }
}
