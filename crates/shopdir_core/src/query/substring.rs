//! Case-insensitive substring predicate over shop name and address.
//!
//! # Responsibility
//! - Build `lower(name) CONTAINS lower(term) OR lower(address) CONTAINS
//!   lower(term)` (or a single-field variant) as SQL plus bind values.
//!
//! # Invariants
//! - Case folding is ASCII-only on both sides, matching SQLite's built-in
//!   `lower()`, so results do not depend on locale.
//! - An empty term yields no predicate and therefore matches every row.

use rusqlite::types::Value;

/// Columns a substring query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    Name,
    Address,
    #[default]
    NameOrAddress,
}

impl SearchScope {
    fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Name => &["name"],
            Self::Address => &["address"],
            Self::NameOrAddress => &["name", "address"],
        }
    }
}

/// SQL fragment produced by the query builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Boolean SQL expression using positional `?` placeholders, or `None`
    /// when every row matches.
    pub clause: Option<String>,
    /// Values for the placeholders in `clause`, in order.
    pub binds: Vec<Value>,
}

/// Literal, case-insensitive substring search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringQuery {
    term: String,
    scope: SearchScope,
}

impl SubstringQuery {
    /// Matches `term` against name or address.
    pub fn new(term: impl Into<String>) -> Self {
        Self::scoped(term, SearchScope::NameOrAddress)
    }

    pub fn scoped(term: impl Into<String>, scope: SearchScope) -> Self {
        Self {
            term: term.into(),
            scope,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    /// Builds the SQL predicate for this query.
    pub fn to_predicate(&self) -> Predicate {
        if self.term.is_empty() {
            return Predicate {
                clause: None,
                binds: Vec::new(),
            };
        }

        let folded = self.term.to_ascii_lowercase();
        let columns = self.scope.columns();
        let clause = columns
            .iter()
            .map(|column| format!("instr(lower({column}), ?) > 0"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let binds = columns
            .iter()
            .map(|_| Value::Text(folded.clone()))
            .collect();

        Predicate {
            clause: Some(format!("({clause})")),
            binds,
        }
    }

    /// In-process reference for the SQL predicate.
    #[cfg(test)]
    pub(crate) fn matches(&self, name: &str, address: &str) -> bool {
        let folded = self.term.to_ascii_lowercase();
        let contains = |value: &str| value.to_ascii_lowercase().contains(folded.as_str());
        match self.scope {
            SearchScope::Name => contains(name),
            SearchScope::Address => contains(address),
            SearchScope::NameOrAddress => contains(name) || contains(address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchScope, SubstringQuery};
    use crate::db::open_db_in_memory;
    use crate::model::shop::ShopDraft;
    use crate::repo::shop_repo::{ShopRepository, SqliteShopRepository};
    use rusqlite::types::Value;

    #[test]
    fn empty_term_has_no_clause_and_matches_everything() {
        let query = SubstringQuery::new("");
        let predicate = query.to_predicate();
        assert!(predicate.clause.is_none());
        assert!(predicate.binds.is_empty());
        assert!(query.matches("anything", "anywhere"));
    }

    #[test]
    fn default_scope_ors_name_and_address_with_folded_binds() {
        let predicate = SubstringQuery::new("CaFe").to_predicate();
        assert_eq!(
            predicate.clause.as_deref(),
            Some("(instr(lower(name), ?) > 0 OR instr(lower(address), ?) > 0)")
        );
        assert_eq!(
            predicate.binds,
            vec![Value::Text("cafe".to_string()), Value::Text("cafe".to_string())]
        );
    }

    #[test]
    fn single_field_scope_binds_once() {
        let predicate = SubstringQuery::scoped("main", SearchScope::Address).to_predicate();
        assert_eq!(
            predicate.clause.as_deref(),
            Some("(instr(lower(address), ?) > 0)")
        );
        assert_eq!(predicate.binds.len(), 1);
    }

    #[test]
    fn matches_is_case_insensitive_and_literal() {
        let query = SubstringQuery::new("cafe");
        assert!(query.matches("Tech World", "12 Cafe Street"));
        assert!(!query.matches("Tech World", "123 Main St"));

        let wildcard = SubstringQuery::new("%");
        assert!(!wildcard.matches("Tech World", "123 Main St"));
        assert!(wildcard.matches("100% Organic", "1 Farm Rd"));
    }

    #[test]
    fn scope_restricts_matched_columns() {
        let by_name = SubstringQuery::scoped("main", SearchScope::Name);
        assert!(!by_name.matches("Tech World", "123 Main St"));
        assert!(by_name.matches("Main Street Deli", "9 Side Rd"));
    }

    #[test]
    fn sql_predicate_agrees_with_in_process_matching() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteShopRepository::try_new(&conn).unwrap();
        let rows = [
            ("Tech World", "12 Cafe Street"),
            ("CAFÉ Noir", "4 Rue Haute"),
            ("100% Organic", "1 Farm_Rd"),
            ("Main Street Deli", "9 Side Rd"),
            ("Null\0Byte Books", "5 main st"),
        ];
        for (name, address) in rows {
            repo.insert(&ShopDraft::new(name, address)).unwrap();
        }

        let terms = ["", "cafe", "CAF", "é", "%", "_", "main", "byte", "zzz"];
        let scopes = [
            SearchScope::Name,
            SearchScope::Address,
            SearchScope::NameOrAddress,
        ];
        for term in terms {
            for scope in scopes {
                let query = SubstringQuery::scoped(term, scope);
                let from_sql: Vec<String> = repo
                    .find_by_substring(&query)
                    .unwrap()
                    .into_iter()
                    .map(|shop| shop.name)
                    .collect();
                let expected: Vec<String> = rows
                    .iter()
                    .filter(|(name, address)| query.matches(name, address))
                    .map(|(name, _)| name.to_string())
                    .collect();
                assert_eq!(from_sql, expected, "term {term:?} scope {scope:?}");
            }
        }
    }
}
