//! Attribute sets for grants and permissions
//!
//! Grants scope a resource's fields using glob notation:
//! - `*` covers every attribute
//! - `name` allows a single attribute
//! - `!name` denies a single attribute, even when `*` is present
//!
//! An omitted attribute list means `["*"]`.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Wildcard token covering every attribute
pub const WILDCARD: &str = "*";

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

/// Check that a name is a plain attribute identifier
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// A set of attribute names, possibly unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "attributes", rename_all = "snake_case")]
pub enum AttributeSet {
    /// Every attribute
    All,
    /// Only the listed attributes
    Only(BTreeSet<String>),
    /// Every attribute except the listed ones (never empty, see [`AttributeSet::except`])
    Except(BTreeSet<String>),
}

impl AttributeSet {
    /// The empty set
    pub fn none() -> Self {
        AttributeSet::Only(BTreeSet::new())
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeSet::Only(names.into_iter().map(Into::into).collect())
    }

    /// Every attribute except `names`; normalises to `All` when nothing is excluded
    pub fn except<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excluded: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if excluded.is_empty() {
            AttributeSet::All
        } else {
            AttributeSet::Except(excluded)
        }
    }

    /// Parse grant notation (`["*", "!secret"]`, `["title", "description"]`).
    ///
    /// Returns the offending token if one is not `*`, an identifier or `!identifier`.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, String> {
        if tokens.is_empty() {
            return Ok(AttributeSet::All);
        }

        let mut wildcard = false;
        let mut allowed = BTreeSet::new();
        let mut denied = BTreeSet::new();

        for token in tokens {
            let token = token.as_ref().trim();
            if token == WILDCARD {
                wildcard = true;
            } else if let Some(name) = token.strip_prefix('!') {
                if !is_identifier(name) {
                    return Err(token.to_string());
                }
                denied.insert(name.to_string());
            } else if is_identifier(token) {
                allowed.insert(token.to_string());
            } else {
                return Err(token.to_string());
            }
        }

        if wildcard {
            Ok(AttributeSet::except(denied))
        } else {
            Ok(AttributeSet::Only(
                allowed.difference(&denied).cloned().collect(),
            ))
        }
    }

    /// True if the set places no restriction on attributes
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, AttributeSet::All)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AttributeSet::Only(names) if names.is_empty())
    }

    pub fn contains(&self, attribute: &str) -> bool {
        match self {
            AttributeSet::All => true,
            AttributeSet::Only(names) => names.contains(attribute),
            AttributeSet::Except(names) => !names.contains(attribute),
        }
    }

    /// Set union. Commutative, associative and never narrows either operand.
    pub fn union(&self, other: &AttributeSet) -> AttributeSet {
        use AttributeSet::*;
        match (self, other) {
            (All, _) | (_, All) => All,
            (Only(a), Only(b)) => Only(a.union(b).cloned().collect()),
            (Except(a), Only(b)) | (Only(b), Except(a)) => {
                AttributeSet::except(a.difference(b).cloned())
            }
            (Except(a), Except(b)) => AttributeSet::except(a.intersection(b).cloned()),
        }
    }

    /// True if every attribute in `self` is also in `other`
    pub fn is_subset(&self, other: &AttributeSet) -> bool {
        use AttributeSet::*;
        match (self, other) {
            (_, All) => true,
            (All, _) => false,
            (Only(a), Only(b)) => a.is_subset(b),
            (Only(a), Except(b)) => a.is_disjoint(b),
            (Except(_), Only(_)) => false,
            (Except(a), Except(b)) => b.is_subset(a),
        }
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        AttributeSet::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wildcard() {
        assert_eq!(AttributeSet::parse(&["*"]).unwrap(), AttributeSet::All);
        let empty: [&str; 0] = [];
        assert_eq!(AttributeSet::parse(&empty).unwrap(), AttributeSet::All);
    }

    #[test]
    fn test_parse_wildcard_with_negation() {
        let set = AttributeSet::parse(&["*", "!secret"]).unwrap();
        assert_eq!(set, AttributeSet::except(["secret"]));
        assert!(set.contains("title"));
        assert!(!set.contains("secret"));
    }

    #[test]
    fn test_parse_allow_list() {
        let set = AttributeSet::parse(&["title", "description", "!description"]).unwrap();
        assert_eq!(set, AttributeSet::only(["title"]));
    }

    #[test]
    fn test_parse_invalid_token() {
        assert_eq!(
            AttributeSet::parse(&["title", "owner.id"]).unwrap_err(),
            "owner.id"
        );
        assert_eq!(AttributeSet::parse(&["!"]).unwrap_err(), "!");
    }

    #[test]
    fn test_union_with_all_is_all() {
        let only = AttributeSet::only(["a"]);
        assert_eq!(only.union(&AttributeSet::All), AttributeSet::All);
        assert_eq!(AttributeSet::All.union(&only), AttributeSet::All);
    }

    #[test]
    fn test_union_only_only() {
        let set = AttributeSet::only(["a"]).union(&AttributeSet::only(["b"]));
        assert_eq!(set, AttributeSet::only(["a", "b"]));
    }

    #[test]
    fn test_union_except_only() {
        let set = AttributeSet::except(["a", "b"]).union(&AttributeSet::only(["a"]));
        assert_eq!(set, AttributeSet::except(["b"]));

        let set = AttributeSet::except(["a"]).union(&AttributeSet::only(["a"]));
        assert_eq!(set, AttributeSet::All);
    }

    #[test]
    fn test_union_except_except() {
        let set = AttributeSet::except(["a", "b"]).union(&AttributeSet::except(["b", "c"]));
        assert_eq!(set, AttributeSet::except(["b"]));
    }

    #[test]
    fn test_subset() {
        assert!(AttributeSet::none().is_subset(&AttributeSet::only(["a"])));
        assert!(AttributeSet::only(["a"]).is_subset(&AttributeSet::except(["b"])));
        assert!(!AttributeSet::only(["b"]).is_subset(&AttributeSet::except(["b"])));
        assert!(AttributeSet::except(["a", "b"]).is_subset(&AttributeSet::except(["a"])));
        assert!(!AttributeSet::All.is_subset(&AttributeSet::except(["a"])));
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("ownerId"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
    }
}
