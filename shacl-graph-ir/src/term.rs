//! RDF term types: IRI, blank node, and literal
//!
//! Terms are the building blocks of triples. A term can be:
//! - An IRI (always expanded, never prefixed)
//! - A blank node (with stable identifier)
//! - A literal (lexical form + explicit datatype + optional language tag)

use crate::datatype::iri;
use crate::Datatype;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use shacl_vocab::xsd;
use std::cmp::Ordering;
use std::sync::Arc;

/// Blank node identifier
///
/// Blank node IDs are stable within a graph but have no global meaning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Create a blank node ID from a label
    ///
    /// The label should NOT include the `_:` prefix.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Get the label (without `_:` prefix)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// An RDF literal
///
/// Identity is RDF term identity: two literals are equal only when their
/// lexical forms, datatypes and language tags are all equal. `"05"^^xsd:integer`
/// and `"5"^^xsd:integer` are different terms even though they denote the same
/// number; use [`Literal::value`] for value-space comparisons.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    lexical: Arc<str>,
    datatype: Datatype,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<Arc<str>>,
}

impl Literal {
    /// Create a typed literal from its lexical form
    pub fn new(lexical: impl AsRef<str>, datatype: Datatype) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype,
            language: None,
        }
    }

    /// Create a language-tagged string (rdf:langString)
    pub fn lang_string(lexical: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Datatype::rdf_lang_string(),
            language: Some(Arc::from(lang.as_ref())),
        }
    }

    /// The lexical form
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// The datatype (always present)
    pub fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    /// The language tag, if this is a language-tagged string
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Map the lexical form into the value space of its datatype
    ///
    /// Returns `None` when the datatype has no ordered value space known to
    /// this crate, or when the lexical form is ill-typed.
    pub fn value(&self) -> Option<LiteralValue> {
        let dt = self.datatype.as_iri();
        let lex = self.lexical.trim();

        if xsd::is_integer_family(dt) {
            let n: i128 = lex.parse().ok()?;
            if let Some((min, max)) = xsd::integer_bounds(dt) {
                if n < min || n > max {
                    return None;
                }
            }
            return Some(LiteralValue::Integer(n));
        }

        match dt {
            iri::XSD_DECIMAL => parse_decimal(lex).map(LiteralValue::Decimal),
            iri::XSD_DOUBLE | iri::XSD_FLOAT => parse_double(lex).map(LiteralValue::Double),
            iri::XSD_BOOLEAN => match lex {
                "true" | "1" => Some(LiteralValue::Boolean(true)),
                "false" | "0" => Some(LiteralValue::Boolean(false)),
                _ => None,
            },
            iri::XSD_DATE_TIME => parse_date_time(lex).map(LiteralValue::DateTime),
            iri::XSD_DATE => parse_date(lex).map(LiteralValue::Date),
            iri::XSD_STRING | iri::RDF_LANG_STRING => {
                Some(LiteralValue::String(self.lexical.clone()))
            }
            _ => None,
        }
    }

    /// Check whether the lexical form is valid for the datatype
    ///
    /// Datatypes without a known lexical space are always considered well formed.
    pub fn is_well_formed(&self) -> bool {
        let dt = self.datatype.as_iri();
        if self.datatype.is_lang_string() {
            return self.language.as_deref().is_some_and(|l| !l.is_empty());
        }
        if xsd::is_numeric_datatype(dt)
            || xsd::is_temporal(dt)
            || dt == iri::XSD_BOOLEAN
        {
            return self.value().is_some();
        }
        true
    }
}

impl PartialOrd for Literal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Literal {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.datatype, &self.language, &self.lexical).cmp(&(
            &other.datatype,
            &other.language,
            &other.lexical,
        ))
    }
}

fn parse_decimal(lex: &str) -> Option<f64> {
    let digits = lex.strip_prefix(&['+', '-'][..]).unwrap_or(lex);
    let valid = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits != ".";
    if valid {
        lex.parse().ok()
    } else {
        None
    }
}

fn parse_double(lex: &str) -> Option<f64> {
    match lex {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => {
            // Rust accepts "inf"/"infinity"/"nan" spellings that XSD does not
            if lex.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
                return None;
            }
            lex.parse().ok()
        }
    }
}

fn parse_date_time(lex: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(lex) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(lex, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn parse_date(lex: &str) -> Option<NaiveDate> {
    if !lex.is_ascii() {
        return None;
    }
    let (date, tz) = lex.split_at(lex.len().min(10));
    let tz_ok = tz.is_empty()
        || tz == "Z"
        || (tz.len() == 6 && (tz.starts_with('+') || tz.starts_with('-')) && &tz[3..4] == ":");
    if !tz_ok {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Value-space view of a literal, used for ordering comparisons
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    /// Any integer-family datatype
    Integer(i128),
    /// xsd:decimal
    Decimal(f64),
    /// xsd:double / xsd:float
    Double(f64),
    /// xsd:boolean
    Boolean(bool),
    /// xsd:dateTime, normalized to UTC (naive values are taken as UTC)
    DateTime(NaiveDateTime),
    /// xsd:date
    Date(NaiveDate),
    /// xsd:string / rdf:langString
    String(Arc<str>),
}

impl LiteralValue {
    /// Check if this is a numeric value
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LiteralValue::Integer(_) | LiteralValue::Decimal(_) | LiteralValue::Double(_)
        )
    }

    /// Try to get as double
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LiteralValue::Integer(i) => Some(*i as f64),
            LiteralValue::Decimal(d) | LiteralValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Compare two values
    ///
    /// Returns None if values are not comparable (different value spaces, or NaN).
    pub fn compare(&self, other: &LiteralValue) -> Option<Ordering> {
        match (self, other) {
            (LiteralValue::Integer(a), LiteralValue::Integer(b)) => Some(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64()?.partial_cmp(&b.as_f64()?),
            (LiteralValue::Boolean(a), LiteralValue::Boolean(b)) => Some(a.cmp(b)),
            (LiteralValue::DateTime(a), LiteralValue::DateTime(b)) => Some(a.cmp(b)),
            (LiteralValue::Date(a), LiteralValue::Date(b)) => Some(a.cmp(b)),
            (LiteralValue::String(a), LiteralValue::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// An RDF term (subject, predicate, or object position)
///
/// # Invariants
///
/// - `Term::Iri` always contains an **expanded** IRI, never a prefixed form.
/// - The predicate position of a triple can only be `Term::Iri`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Term {
    /// Full expanded IRI (e.g., "http://schema.org/Person")
    Iri(Arc<str>),

    /// Blank node with stable identifier
    #[serde(rename = "bnode")]
    BlankNode(BlankId),

    /// Literal value with explicit datatype
    Literal(Literal),
}

impl Term {
    /// Create an IRI term from an expanded IRI string
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a blank node term
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankId::new(label))
    }

    /// Create a plain string literal (xsd:string)
    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Literal(Literal::new(value, Datatype::xsd_string()))
    }

    /// Create a boolean literal (xsd:boolean)
    pub fn boolean(value: bool) -> Self {
        Term::Literal(Literal::new(value.to_string(), Datatype::xsd_boolean()))
    }

    /// Create an integer literal (xsd:integer)
    pub fn integer(value: i64) -> Self {
        Term::Literal(Literal::new(value.to_string(), Datatype::xsd_integer()))
    }

    /// Create a decimal literal (xsd:decimal) from its lexical form
    pub fn decimal(lexical: impl AsRef<str>) -> Self {
        Term::Literal(Literal::new(lexical, Datatype::xsd_decimal()))
    }

    /// Create a double literal (xsd:double)
    pub fn double(value: f64) -> Self {
        let lexical = if value.is_nan() {
            "NaN".to_string()
        } else if value.is_infinite() {
            if value.is_sign_positive() { "INF" } else { "-INF" }.to_string()
        } else {
            format!("{:?}", value)
        };
        Term::Literal(Literal::new(lexical, Datatype::xsd_double()))
    }

    /// Create a language-tagged string literal (rdf:langString)
    pub fn lang_string(value: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal(Literal::lang_string(value, lang))
    }

    /// Create a typed literal with a custom datatype
    pub fn typed(value: impl AsRef<str>, datatype: Datatype) -> Self {
        Term::Literal(Literal::new(value, datatype))
    }

    /// Check if this is an IRI term
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Check if this is a blank node
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// IRI or blank node (valid in subject position)
    pub fn is_resource(&self) -> bool {
        !self.is_literal()
    }

    /// Try to get as IRI string
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Try to get as blank node ID
    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::BlankNode(id) => Some(id),
            _ => None,
        }
    }

    /// Try to get as literal
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// The string form used by string-based constraints
    ///
    /// Lexical form for literals, the IRI for IRIs; blank nodes have none.
    pub fn string_form(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal(lit) => Some(lit.lexical()),
            Term::BlankNode(_) => None,
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        // Type ordering: BlankNode < Iri < Literal
        let type_ord = |t: &Term| -> u8 {
            match t {
                Term::BlankNode(_) => 0,
                Term::Iri(_) => 1,
                Term::Literal(_) => 2,
            }
        };

        match type_ord(self).cmp(&type_ord(other)) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self, other) {
            (Term::Iri(a), Term::Iri(b)) => a.cmp(b),
            (Term::BlankNode(a), Term::BlankNode(b)) => a.cmp(b),
            (Term::Literal(a), Term::Literal(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "{}", id),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", lit.lexical().escape_default())?;
                if let Some(lang) = lit.language() {
                    write!(f, "@{}", lang)
                } else if !lit.datatype().is_xsd_string() {
                    write!(f, "^^<{}>", lit.datatype().as_iri())
                } else {
                    Ok(())
                }
            }
        }
    }
}
