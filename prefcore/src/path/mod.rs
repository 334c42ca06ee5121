//! Dotted-path access into nested settings, e.g. `Filtering.Copy.enable`.
//!
//! Segments are split on `.`; the empty path is the root itself. Objects are addressed
//! by key and arrays by canonical decimal index (`rules.0.pattern`). Reads never fail,
//! they report absence. [`set`] always succeeds: missing intermediates are created and
//! scalar intermediates are replaced by objects, so a fallback can always be written.

use serde_json::{Map, Value};

fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

/// `"0"`, `"12"`; not `"012"`, `"+1"` or `"-1"`.
fn array_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => array_index(segment).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => array_index(segment).and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Reads the value at `path`, or `None` when any segment is missing.
#[must_use]
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path)
        .into_iter()
        .try_fold(root, |node, segment| child(node, segment))
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    segments(path)
        .into_iter()
        .try_fold(root, |node, segment| child_mut(node, segment))
}

/// Whether `path` resolves. A key holding `null` is present.
#[must_use]
pub fn has(root: &Value, path: &str) -> bool {
    get(root, path).is_some()
}

/// Writes `value` at `path`, creating or overwriting intermediates as needed.
pub fn set(root: &mut Value, path: &str, value: Value) {
    set_in(root, &segments(path), value);
}

fn set_in(node: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if let Value::Array(items) = node {
        match array_index(first) {
            Some(i) if i < items.len() => return set_in(&mut items[i], rest, value),
            Some(i) if i == items.len() => {
                items.push(Value::Null);
                return set_in(&mut items[i], rest, value);
            }
            _ => {}
        }
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let next = map.entry((*first).to_string()).or_insert(Value::Null);
        set_in(next, rest, value);
    }
}

/// Removes and returns the value at `path`. The root itself cannot be removed.
pub fn remove(root: &mut Value, path: &str) -> Option<Value> {
    let (parent_path, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (parent, last),
        None if path.is_empty() => return None,
        None => ("", path),
    };

    match get_mut(root, parent_path)? {
        Value::Object(map) => map.remove(last),
        Value::Array(items) => {
            let i = array_index(last).filter(|i| *i < items.len())?;
            Some(items.remove(i))
        }
        _ => None,
    }
}
