//! Python literal syntax for the lookup tables.
//!
//! Output matches CPython's `repr` for the value shapes used here: strings,
//! non-negative integers, lists and insertion-ordered dicts with string keys.

use std::fmt::Write;

/// A value that can be written as a Python literal.
pub trait PyRepr {
    /// Appends the literal to `out`.
    fn py_repr(&self, out: &mut String);

    /// The literal as a new string.
    fn to_py_repr(&self) -> String {
        let mut out = String::new();
        self.py_repr(&mut out);
        out
    }
}

impl PyRepr for str {
    fn py_repr(&self, out: &mut String) {
        // CPython switches to double quotes for strings holding only a single quote
        let quote = if self.contains('\'') && !self.contains('"') {
            '"'
        } else {
            '\''
        };
        out.push(quote);
        for c in self.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(quote);
    }
}

impl PyRepr for String {
    fn py_repr(&self, out: &mut String) {
        self.as_str().py_repr(out);
    }
}

impl PyRepr for u32 {
    fn py_repr(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }
}

impl PyRepr for usize {
    fn py_repr(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }
}

impl PyRepr for bool {
    fn py_repr(&self, out: &mut String) {
        out.push_str(if *self { "True" } else { "False" });
    }
}

impl<T: PyRepr> PyRepr for [T] {
    fn py_repr(&self, out: &mut String) {
        out.push('[');
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            item.py_repr(out);
        }
        out.push(']');
    }
}

impl<T: PyRepr> PyRepr for Vec<T> {
    fn py_repr(&self, out: &mut String) {
        self.as_slice().py_repr(out);
    }
}

/// A dict literal that keeps insertion order, like a Python 3.7+ `dict`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PyDict<V> {
    entries: Vec<(String, V)>,
}

impl<V> PyDict<V> {
    /// An empty dict.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dict has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: PyRepr> PyRepr for PyDict<V> {
    fn py_repr(&self, out: &mut String) {
        out.push('{');
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            key.py_repr(out);
            out.push_str(": ");
            value.py_repr(out);
        }
        out.push('}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(7u32.to_py_repr(), "7");
        assert_eq!(true.to_py_repr(), "True");
        assert_eq!(false.to_py_repr(), "False");
        assert_eq!("gg".to_py_repr(), "'gg'");
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!("it's".to_py_repr(), "\"it's\"");
        assert_eq!("a'b\"c".to_py_repr(), "'a\\'b\"c'");
        assert_eq!("back\\slash".to_py_repr(), "'back\\\\slash'");
    }

    #[test]
    fn test_lists() {
        let empty: Vec<u32> = vec![];
        assert_eq!(empty.to_py_repr(), "[]");
        assert_eq!(vec!["0".to_string(), "1".to_string()].to_py_repr(), "['0', '1']");
        assert_eq!(vec![4u32, 4, 4].to_py_repr(), "[4, 4, 4]");
    }

    #[test]
    fn test_dict_keeps_insertion_order() {
        let mut dict = PyDict::new();
        dict.insert("vv", 1u32);
        dict.insert("gg", 2u32);
        dict.insert("vv", 3u32);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("vv"), Some(&3));
        assert_eq!(dict.to_py_repr(), "{'vv': 3, 'gg': 2}");
        assert_eq!(PyDict::<u32>::new().to_py_repr(), "{}");
    }
}
