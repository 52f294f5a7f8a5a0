use crate::error::{PatchError, PathError};
use serde_json::{Map, Value};
use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

/// How far past the end of an array a write may land before it is refused.
/// Gaps are filled with `null`.
pub const MAX_INDEX_GAP: usize = 10_000;

/// One step of a patch locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object key, from `a.key` or `a["key"]`.
    Key(String),
    /// An array position, from `a.0` or `a[0]`.
    Index(usize),
}

impl PathSegment {
    /// The segment as an object key. Indices addressing an object use their decimal form.
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(index) => index.to_string(),
        }
    }

    /// Classifies a bare token: canonical non-negative integers become indices.
    fn classify(token: &str) -> Self {
        let canonical = token == "0" || (!token.starts_with('0') && !token.is_empty());
        if canonical && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = token.parse() {
                return PathSegment::Index(index);
            }
        }
        PathSegment::Key(token.to_string())
    }

    /// The empty container a missing value becomes when this segment indexes into it.
    fn empty_container(&self) -> Value {
        match self {
            PathSegment::Key(_) => Value::Object(Map::new()),
            PathSegment::Index(_) => Value::Array(Vec::new()),
        }
    }
}

/// A parsed dot/bracket locator into a JSON document, e.g. `nodes[2].parameters["x.y"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl PatchPath {
    /// Parses a locator. Dots separate keys, brackets hold indices or quoted keys.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        // After a closing bracket only '.', '[' or the end of input may follow.
        let mut after_bracket = false;
        let mut chars = raw.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() && !after_bracket {
                        return Err(PathError::EmptySegment {
                            path: raw.to_string(),
                            offset,
                        });
                    }
                    if !current.is_empty() {
                        segments.push(PathSegment::classify(&std::mem::take(&mut current)));
                    }
                    if chars.peek().is_none() {
                        return Err(PathError::EmptySegment {
                            path: raw.to_string(),
                            offset: offset + 1,
                        });
                    }
                    after_bracket = false;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::classify(&std::mem::take(&mut current)));
                    }
                    segments.push(Self::parse_bracket(raw, offset, &mut chars)?);
                    after_bracket = true;
                }
                found if after_bracket => {
                    return Err(PathError::UnexpectedCharacter {
                        path: raw.to_string(),
                        offset,
                        found,
                    });
                }
                _ => current.push(c),
            }
        }

        if !current.is_empty() {
            segments.push(PathSegment::classify(&current));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Consumes everything up to and including the `]` matching the `[` at `open`.
    fn parse_bracket(
        raw: &str,
        open: usize,
        chars: &mut Peekable<CharIndices<'_>>,
    ) -> Result<PathSegment, PathError> {
        match chars.peek().map(|&(_, c)| c) {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped)) => key.push(escaped),
                            None => break,
                        },
                        Some((_, c)) if c == quote => {
                            return match chars.next() {
                                Some((_, ']')) => Ok(PathSegment::Key(key)),
                                Some((offset, found)) => Err(PathError::UnexpectedCharacter {
                                    path: raw.to_string(),
                                    offset,
                                    found,
                                }),
                                None => Err(PathError::UnterminatedBracket {
                                    path: raw.to_string(),
                                    offset: open,
                                }),
                            };
                        }
                        Some((_, c)) => key.push(c),
                        None => break,
                    }
                }
                Err(PathError::UnterminatedQuote {
                    path: raw.to_string(),
                    offset: open,
                })
            }
            _ => {
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some((_, ']')) => break,
                        Some((_, c)) => inner.push(c),
                        None => {
                            return Err(PathError::UnterminatedBracket {
                                path: raw.to_string(),
                                offset: open,
                            });
                        }
                    }
                }
                let token = inner.trim();
                if token.is_empty() {
                    return Err(PathError::EmptySegment {
                        path: raw.to_string(),
                        offset: open,
                    });
                }
                Ok(PathSegment::classify(token))
            }
        }
    }

    /// The locator exactly as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Reads the value at this path without creating anything.
    pub fn get<'v>(&self, document: &'v Value) -> Option<&'v Value> {
        self.segments
            .iter()
            .try_fold(document, |current, segment| step(current, segment))
    }

    /// Writes `value` at this path, creating missing containers along the way.
    ///
    /// A missing or scalar intermediate is replaced by an array when the next
    /// segment is an index and by an object otherwise. Existing objects accept
    /// index segments as decimal keys. Writing a key into an existing array fails.
    /// The document is left untouched when the write fails.
    pub fn set(&self, document: &mut Value, value: Value) -> Result<(), PatchError> {
        self.check_writable(document)?;
        let mut slot = document;
        for segment in &self.segments {
            slot = self.child_slot(slot, segment)?;
        }
        *slot = value;
        Ok(())
    }

    /// Walks the existing part of the path and rejects writes that cannot land.
    fn check_writable(&self, document: &Value) -> Result<(), PatchError> {
        let mut current = Some(document);
        for segment in &self.segments {
            match (current, segment) {
                (Some(Value::Object(_)), _) => {}
                (Some(Value::Array(_)), PathSegment::Key(key)) => {
                    return Err(PatchError::KeyOnArray {
                        path: self.raw.clone(),
                        key: key.clone(),
                    });
                }
                (Some(Value::Array(items)), PathSegment::Index(index)) => {
                    self.check_gap(*index, items.len())?
                }
                // Anything else is replaced by a fresh, empty container.
                (_, PathSegment::Index(index)) => self.check_gap(*index, 0)?,
                (_, PathSegment::Key(_)) => {}
            }
            current = current.and_then(|value| step(value, segment));
        }
        Ok(())
    }

    fn check_gap(&self, index: usize, len: usize) -> Result<(), PatchError> {
        if index >= len + MAX_INDEX_GAP {
            Err(PatchError::IndexTooLarge {
                path: self.raw.clone(),
                index,
                len,
            })
        } else {
            Ok(())
        }
    }

    fn child_slot<'v>(
        &self,
        slot: &'v mut Value,
        segment: &PathSegment,
    ) -> Result<&'v mut Value, PatchError> {
        match slot {
            Value::Object(map) => Ok(map.entry(segment.as_key()).or_insert(Value::Null)),
            Value::Array(items) => match segment {
                PathSegment::Index(index) => {
                    self.check_gap(*index, items.len())?;
                    if *index >= items.len() {
                        items.resize(index + 1, Value::Null);
                    }
                    Ok(&mut items[*index])
                }
                PathSegment::Key(key) => Err(PatchError::KeyOnArray {
                    path: self.raw.clone(),
                    key: key.clone(),
                }),
            },
            other => {
                *other = segment.empty_container();
                self.child_slot(other, segment)
            }
        }
    }
}

impl FromStr for PatchPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PatchPath {
    /// Renders the canonical form: plain keys dotted, indices and unusual keys bracketed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Key(key) if is_plain_key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Key(key) => {
                    write!(f, "[\"{}\"]", key.replace('\\', "\\\\").replace('"', "\\\""))?
                }
            }
        }
        Ok(())
    }
}

/// One read-only step down the document.
fn step<'v>(value: &'v Value, segment: &PathSegment) -> Option<&'v Value> {
    match (value, segment) {
        (Value::Object(map), segment) => map.get(&segment.as_key()),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    }
}

/// Keys that survive a round trip through dotted notation unchanged.
fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && !matches!(PathSegment::classify(key), PathSegment::Index(_))
        && key
            .chars()
            .all(|c| !matches!(c, '.' | '[' | ']' | '"' | '\'' | '\\'))
}
