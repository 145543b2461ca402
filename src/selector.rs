/* src/selector.rs */

use std::collections::HashMap;

use serde::Serialize;

/// Post meta attribute carrying the EU visibility flag.
pub const EU_META_KEY: &str = "is_eu";

/// Post meta as seen by the query engine: attribute name to raw value.
pub type PostMeta = HashMap<String, String>;

/// How the clauses of a filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    And,
    Or,
}

/// Comparison applied to one meta attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "compare", content = "value")]
pub enum MetaCompare {
    #[serde(rename = "=")]
    Equals(String),
    #[serde(rename = "NOT EXISTS")]
    NotExists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaClause {
    pub key: String,
    #[serde(flatten)]
    pub compare: MetaCompare,
}

impl MetaClause {
    pub fn equals(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            compare: MetaCompare::Equals(value.to_string()),
        }
    }

    pub fn not_exists(key: &str) -> Self {
        Self {
            key: key.to_string(),
            compare: MetaCompare::NotExists,
        }
    }

    pub fn matches(&self, meta: &PostMeta) -> bool {
        match &self.compare {
            MetaCompare::Equals(value) => meta.get(&self.key).is_some_and(|v| v == value),
            MetaCompare::NotExists => !meta.contains_key(&self.key),
        }
    }
}

/// Query predicate restricting which posts a visitor may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostVisibilityFilter {
    pub post_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
    pub clauses: Vec<MetaClause>,
}

impl PostVisibilityFilter {
    /// Evaluate the meta predicate against one post's attributes.
    ///
    /// Clauses combine with AND unless the relation is `Or`.
    pub fn matches(&self, meta: &PostMeta) -> bool {
        match self.relation {
            Some(Relation::Or) => self.clauses.iter().any(|c| c.matches(meta)),
            _ => self.clauses.iter().all(|c| c.matches(meta)),
        }
    }
}

/// Select the post filter for a visitor.
///
/// EU visitors see posts flagged `is_eu = 1` and posts without the flag;
/// everyone else sees only posts without the flag.
pub fn select_query_filter(is_eu: bool) -> PostVisibilityFilter {
    if is_eu {
        PostVisibilityFilter {
            post_status: "publish".to_string(),
            relation: Some(Relation::Or),
            clauses: vec![
                MetaClause::equals(EU_META_KEY, "1"),
                MetaClause::not_exists(EU_META_KEY),
            ],
        }
    } else {
        PostVisibilityFilter {
            post_status: "publish".to_string(),
            relation: None,
            clauses: vec![MetaClause::not_exists(EU_META_KEY)],
        }
    }
}
