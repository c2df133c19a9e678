//! Element path expressions
//!
//! Supports the ElementTree subset both dialect extractors rely on:
//!
//! - an optional leading `.` (the context element)
//! - `/` child steps and `//` descendant steps
//! - `*` to match any tag
//! - one `[@attr]` or `[@attr="value"]` predicate per step
//!
//! ```
//! use ncbiutils::xml::ElementPath;
//!
//! let path: ElementPath = r#".//front/article-meta/article-id[@pub-id-type="pmid"]"#
//!     .parse()
//!     .unwrap();
//! assert_eq!(path.len(), 3);
//! ```

use std::str::FromStr;

use super::Element;
use crate::error::{NcbiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate {
    attribute: String,
    value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    /// `None` matches any tag
    tag: Option<String>,
    predicate: Option<Predicate>,
}

impl Step {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.name() != tag {
                return false;
            }
        }
        match &self.predicate {
            None => true,
            Some(Predicate {
                attribute,
                value: None,
            }) => element.get(attribute).is_some(),
            Some(Predicate {
                attribute,
                value: Some(expected),
            }) => element.get(attribute) == Some(expected.as_str()),
        }
    }
}

/// A compiled path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    steps: Vec<Step>,
}

impl ElementPath {
    /// Compile a path expression
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |message: &str| NcbiError::InvalidPath {
            path: path.to_string(),
            message: message.to_string(),
        };

        let mut rest = path.trim();
        if rest.is_empty() {
            return Err(invalid("empty path"));
        }

        let mut steps = Vec::new();
        let relative_to_self = rest.starts_with('.') && !rest.starts_with("..");
        if relative_to_self {
            rest = &rest[1..];
        }

        let mut first = true;
        while !rest.is_empty() {
            let axis = if let Some(stripped) = rest.strip_prefix("//") {
                rest = stripped;
                Axis::Descendant
            } else if let Some(stripped) = rest.strip_prefix('/') {
                rest = stripped;
                Axis::Child
            } else if first && !relative_to_self {
                Axis::Child
            } else {
                return Err(invalid("expected '/' or '//' between steps"));
            };
            first = false;

            let end = step_end(rest).ok_or_else(|| invalid("unterminated predicate"))?;
            let (token, remainder) = rest.split_at(end);
            steps.push(parse_step(axis, token).map_err(|message| invalid(&message))?);
            rest = remainder;
        }

        Ok(Self { steps })
    }

    /// Number of steps in the expression
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the expression selects the context element itself
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Evaluate the expression against `context`, in document order
    pub fn select<'a>(&self, context: &'a Element) -> Vec<&'a Element> {
        let mut current: Vec<&'a Element> = vec![context];

        for step in &self.steps {
            let mut next: Vec<&'a Element> = Vec::new();
            let check_duplicates = current.len() > 1;

            for &node in &current {
                let candidates: Box<dyn Iterator<Item = &'a Element>> = match step.axis {
                    Axis::Child => Box::new(node.children()),
                    Axis::Descendant => Box::new(node.descendants()),
                };
                for candidate in candidates.filter(|c| step.matches(c)) {
                    if check_duplicates && next.iter().any(|seen| std::ptr::eq(*seen, candidate)) {
                        continue;
                    }
                    next.push(candidate);
                }
            }

            if next.is_empty() {
                return next;
            }
            current = next;
        }

        current
    }

    /// First match in document order
    pub fn select_first<'a>(&self, context: &'a Element) -> Option<&'a Element> {
        self.select(context).into_iter().next()
    }
}

impl FromStr for ElementPath {
    type Err = NcbiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Byte offset of the next step separator, ignoring slashes inside predicates
fn step_end(rest: &str) -> Option<usize> {
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for (index, ch) in rest.char_indices() {
        match (ch, quote) {
            (c, Some(q)) if c == q => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) if in_brackets => quote = Some(ch),
            ('[', None) => in_brackets = true,
            (']', None) => in_brackets = false,
            ('/', None) if !in_brackets => return Some(index),
            _ => {}
        }
    }

    if in_brackets || quote.is_some() {
        None
    } else {
        Some(rest.len())
    }
}

fn parse_step(axis: Axis, token: &str) -> std::result::Result<Step, String> {
    let (tag, predicate) = match token.find('[') {
        Some(open) => (&token[..open], Some(&token[open..])),
        None => (token, None),
    };

    let tag = tag.trim();
    if tag.is_empty() {
        return Err("step is missing a tag name".to_string());
    }
    if tag.contains(|c: char| c.is_whitespace() || c == ']' || c == '@') {
        return Err(format!("invalid tag name {tag:?}"));
    }

    let predicate = predicate.map(parse_predicate).transpose()?;

    Ok(Step {
        axis,
        tag: (tag != "*").then(|| tag.to_string()),
        predicate,
    })
}

fn parse_predicate(raw: &str) -> std::result::Result<Predicate, String> {
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| format!("malformed predicate {raw:?}"))?
        .trim();

    let inner = inner
        .strip_prefix('@')
        .ok_or_else(|| "only attribute predicates are supported".to_string())?;

    match inner.split_once('=') {
        None => {
            let attribute = inner.trim();
            if attribute.is_empty() {
                return Err("predicate is missing an attribute name".to_string());
            }
            Ok(Predicate {
                attribute: attribute.to_string(),
                value: None,
            })
        }
        Some((attribute, value)) => {
            let attribute = attribute.trim();
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .ok_or_else(|| format!("predicate value {value:?} must be quoted"))?;
            if attribute.is_empty() {
                return Err("predicate is missing an attribute name".to_string());
            }
            Ok(Predicate {
                attribute: attribute.to_string(),
                value: Some(unquoted.to_string()),
            })
        }
    }
}
