//! Entity selection predicates applied before ranking.

use serde::{Deserialize, Serialize};

use crate::data::Entity;
use crate::ids::EntityId;

/// Category filter for a race. Value filtering (`> 0`) is applied separately by the ranker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    /// Entities carrying this tag (e.g. a conference).
    Category(String),
    /// Entities carrying at least one of these tags.
    AnyCategory(Vec<String>),
    /// An explicit id allow-list.
    Entities(Vec<EntityId>),
}

impl Filter {
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(tag) => entity.has_tag(tag),
            Filter::AnyCategory(tags) => tags.iter().any(|t| entity.has_tag(t)),
            Filter::Entities(ids) => ids.contains(&entity.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: &str, tags: &[&str]) -> Entity {
        Entity::new(id, id).with_tags(tags.iter().copied())
    }

    #[test]
    fn category_filters() {
        let a = team("A", &["AFC", "East"]);
        let b = team("B", &["NFC"]);
        assert!(Filter::All.matches(&a));
        assert!(Filter::Category("AFC".into()).matches(&a));
        assert!(!Filter::Category("AFC".into()).matches(&b));
        let any = Filter::AnyCategory(vec!["West".into(), "NFC".into()]);
        assert!(any.matches(&b));
        assert!(!any.matches(&a));
        let ids = Filter::Entities(vec![EntityId::new("B")]);
        assert!(ids.matches(&b));
        assert!(!ids.matches(&a));
    }

    #[test]
    fn filter_json_shape() {
        let f: Filter = serde_json::from_str(r#"{ "kind": "category", "value": "SEC" }"#).unwrap();
        assert_eq!(f, Filter::Category("SEC".into()));
        let all: Filter = serde_json::from_str(r#"{ "kind": "all" }"#).unwrap();
        assert_eq!(all, Filter::All);
    }
}
