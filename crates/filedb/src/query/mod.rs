//! # Selector Matching
//!
//! `find` filters records with a small Mongo-flavoured selector language:
//!
//! ```json
//! { "text": "Hello World" }                          // equality
//! { "address.city": "Lisbon" }                       // dotted path
//! { "text": { "$exists": true } }                    // truthy / absent-or-falsy
//! { "text": { "$in": ["Hello World", "Other"] } }    // membership
//! { "$or": [ { "text": "nope" }, { "n": 1 } ] }      // disjunction
//! ```
//!
//! Every top-level key must hold (AND). A `$or` clause holds when at least
//! one branch has all of its pairs loosely equal to the record; operators
//! inside `$or` branches are not interpreted, only compared as literals.
//!
//! | Operator  | Operand | Holds when                                          |
//! |-----------|---------|-----------------------------------------------------|
//! | `$exists` | any     | operand truthy: value truthy; else absent or falsy  |
//! | `$in`     | array   | value loosely equals one of the elements            |
//! | other     | any     | never                                               |
//!
//! Equality is loose; see [`value`] for the coercion rules. Matching never
//! fails: anything that cannot be resolved is a non-match.

pub mod selector;
pub mod value;

pub use selector::{Clause, Condition, Selector};

use serde_json::Value;

/// What a read targets: one id, or every indexed record passing a selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Id(String),
    Selector(Selector),
}

impl From<Selector> for Query {
    fn from(selector: Selector) -> Self {
        Query::Selector(selector)
    }
}

impl Selector {
    /// Check a record (as raw JSON) against every clause.
    pub fn matches(&self, record: &Value) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

impl Clause {
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Clause::Field { path, condition } => condition.holds(value::resolve(record, path)),
            Clause::Or(branches) => branches.iter().any(|branch| {
                branch
                    .iter()
                    .all(|(path, literal)| value::loose_eq(value::resolve(record, path), literal))
            }),
            Clause::UnknownOperator(_) => false,
        }
    }
}

impl Condition {
    fn holds(&self, resolved: Option<&Value>) -> bool {
        match self {
            Condition::Eq(literal) => value::loose_eq(resolved, literal),
            Condition::Exists(true) => value::is_truthy(resolved),
            Condition::Exists(false) => !value::is_truthy(resolved),
            Condition::In(values) => values
                .iter()
                .any(|candidate| value::loose_eq(resolved, candidate)),
            Condition::Unsupported(_) => false,
        }
    }
}
