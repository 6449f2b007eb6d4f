//! RDF triple

use crate::error::{GraphError, Result};
use crate::Term;
use serde::{Deserialize, Serialize};

/// An RDF triple (subject, predicate, object)
///
/// Fields are private so that every triple in circulation has passed the
/// position checks in [`Triple::new`]: the subject is an IRI or blank node and
/// the predicate is an IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "TripleParts")]
pub struct Triple {
    s: Term,
    p: Term,
    o: Term,
}

/// Unchecked wire form; deserialization goes through [`Triple::new`]
#[derive(Deserialize)]
struct TripleParts {
    s: Term,
    p: Term,
    o: Term,
}

impl TryFrom<TripleParts> for Triple {
    type Error = GraphError;

    fn try_from(parts: TripleParts) -> Result<Self> {
        Triple::new(parts.s, parts.p, parts.o)
    }
}

impl Triple {
    /// Build a triple, rejecting literal subjects and non-IRI predicates
    pub fn new(s: Term, p: Term, o: Term) -> Result<Self> {
        if s.is_literal() {
            return Err(GraphError::LiteralSubject(s));
        }
        if !p.is_iri() {
            return Err(GraphError::NonIriPredicate(p));
        }
        Ok(Self { s, p, o })
    }

    /// Subject
    pub fn subject(&self) -> &Term {
        &self.s
    }

    /// Predicate (always an IRI)
    pub fn predicate(&self) -> &Term {
        &self.p
    }

    /// Predicate IRI
    pub fn predicate_iri(&self) -> &str {
        self.p.as_iri().unwrap_or_default()
    }

    /// Object
    pub fn object(&self) -> &Term {
        &self.o
    }

    /// Split into (subject, predicate, object)
    pub fn into_parts(self) -> (Term, Term, Term) {
        (self.s, self.p, self.o)
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}
