//! RDF Vocabulary Constants for SHACL validation
//!
//! This crate provides a centralized location for the vocabulary IRIs used by
//! the graph model, the shape loader and the report builder.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `shacl` - SHACL vocabulary (http://www.w3.org/ns/shacl#)
//! - `prefixes` - Well-known prefix bindings used when compacting IRIs

/// RDF vocabulary constants
pub mod rdf {
    /// RDF namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// RDFS namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// rdfs:Class IRI
    pub const CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";

    /// rdfs:subClassOf IRI
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
}

/// XSD vocabulary constants
pub mod xsd {
    /// XSD namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:long IRI
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

    /// xsd:int IRI
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";

    /// xsd:short IRI
    pub const SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";

    /// xsd:byte IRI
    pub const BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";

    /// xsd:unsignedLong IRI
    pub const UNSIGNED_LONG: &str = "http://www.w3.org/2001/XMLSchema#unsignedLong";

    /// xsd:unsignedInt IRI
    pub const UNSIGNED_INT: &str = "http://www.w3.org/2001/XMLSchema#unsignedInt";

    /// xsd:unsignedShort IRI
    pub const UNSIGNED_SHORT: &str = "http://www.w3.org/2001/XMLSchema#unsignedShort";

    /// xsd:unsignedByte IRI
    pub const UNSIGNED_BYTE: &str = "http://www.w3.org/2001/XMLSchema#unsignedByte";

    /// xsd:nonNegativeInteger IRI
    pub const NON_NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";

    /// xsd:positiveInteger IRI
    pub const POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#positiveInteger";

    /// xsd:nonPositiveInteger IRI
    pub const NON_POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonPositiveInteger";

    /// xsd:negativeInteger IRI
    pub const NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#negativeInteger";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:float IRI
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

    /// Check if a datatype IRI is an integer-family type
    #[inline]
    pub fn is_integer_family(datatype_iri: &str) -> bool {
        matches!(
            datatype_iri,
            INTEGER
                | LONG
                | INT
                | SHORT
                | BYTE
                | UNSIGNED_LONG
                | UNSIGNED_INT
                | UNSIGNED_SHORT
                | UNSIGNED_BYTE
                | NON_NEGATIVE_INTEGER
                | POSITIVE_INTEGER
                | NON_POSITIVE_INTEGER
                | NEGATIVE_INTEGER
        )
    }

    /// Check if a datatype IRI is a numeric type
    #[inline]
    pub fn is_numeric_datatype(datatype_iri: &str) -> bool {
        is_integer_family(datatype_iri) || matches!(datatype_iri, DECIMAL | FLOAT | DOUBLE)
    }

    /// Check if a datatype IRI is a temporal type
    #[inline]
    pub fn is_temporal(datatype_iri: &str) -> bool {
        matches!(datatype_iri, DATE_TIME | DATE)
    }

    /// Get the valid range bounds for an integer subtype as (min, max) inclusive.
    ///
    /// Returns `None` for unbounded types (xsd:integer) or non-integer types.
    /// Sign-constrained types are bounded to the i128 range.
    #[inline]
    pub fn integer_bounds(datatype_iri: &str) -> Option<(i128, i128)> {
        match datatype_iri {
            BYTE => Some((i8::MIN as i128, i8::MAX as i128)),
            SHORT => Some((i16::MIN as i128, i16::MAX as i128)),
            INT => Some((i32::MIN as i128, i32::MAX as i128)),
            LONG => Some((i64::MIN as i128, i64::MAX as i128)),
            UNSIGNED_BYTE => Some((0, u8::MAX as i128)),
            UNSIGNED_SHORT => Some((0, u16::MAX as i128)),
            UNSIGNED_INT => Some((0, u32::MAX as i128)),
            UNSIGNED_LONG => Some((0, u64::MAX as i128)),
            POSITIVE_INTEGER => Some((1, i128::MAX)),
            NON_NEGATIVE_INTEGER => Some((0, i128::MAX)),
            NEGATIVE_INTEGER => Some((i128::MIN, -1)),
            NON_POSITIVE_INTEGER => Some((i128::MIN, 0)),
            _ => None,
        }
    }
}

/// SHACL vocabulary constants
pub mod shacl {
    /// SHACL namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/shacl#";

    // ========================================================================
    // Shape Classes
    // ========================================================================

    /// sh:NodeShape IRI
    pub const NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";

    /// sh:PropertyShape IRI
    pub const PROPERTY_SHAPE: &str = "http://www.w3.org/ns/shacl#PropertyShape";

    // ========================================================================
    // Targeting
    // ========================================================================

    /// sh:targetClass IRI
    pub const TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";

    /// sh:targetNode IRI
    pub const TARGET_NODE: &str = "http://www.w3.org/ns/shacl#targetNode";

    /// sh:targetSubjectsOf IRI
    pub const TARGET_SUBJECTS_OF: &str = "http://www.w3.org/ns/shacl#targetSubjectsOf";

    /// sh:targetObjectsOf IRI
    pub const TARGET_OBJECTS_OF: &str = "http://www.w3.org/ns/shacl#targetObjectsOf";

    // ========================================================================
    // Property Shape and Paths
    // ========================================================================

    /// sh:property IRI
    pub const PROPERTY: &str = "http://www.w3.org/ns/shacl#property";

    /// sh:path IRI
    pub const PATH: &str = "http://www.w3.org/ns/shacl#path";

    /// sh:inversePath IRI
    pub const INVERSE_PATH: &str = "http://www.w3.org/ns/shacl#inversePath";

    /// sh:alternativePath IRI
    pub const ALTERNATIVE_PATH: &str = "http://www.w3.org/ns/shacl#alternativePath";

    /// sh:zeroOrMorePath IRI
    pub const ZERO_OR_MORE_PATH: &str = "http://www.w3.org/ns/shacl#zeroOrMorePath";

    /// sh:oneOrMorePath IRI
    pub const ONE_OR_MORE_PATH: &str = "http://www.w3.org/ns/shacl#oneOrMorePath";

    /// sh:zeroOrOnePath IRI
    pub const ZERO_OR_ONE_PATH: &str = "http://www.w3.org/ns/shacl#zeroOrOnePath";

    // ========================================================================
    // Cardinality Constraints
    // ========================================================================

    /// sh:minCount IRI
    pub const MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";

    /// sh:maxCount IRI
    pub const MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";

    // ========================================================================
    // Value Type Constraints
    // ========================================================================

    /// sh:datatype IRI
    pub const DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";

    /// sh:nodeKind IRI
    pub const NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";

    /// sh:class IRI
    pub const CLASS: &str = "http://www.w3.org/ns/shacl#class";

    // ========================================================================
    // Value Range Constraints
    // ========================================================================

    /// sh:minInclusive IRI
    pub const MIN_INCLUSIVE: &str = "http://www.w3.org/ns/shacl#minInclusive";

    /// sh:maxInclusive IRI
    pub const MAX_INCLUSIVE: &str = "http://www.w3.org/ns/shacl#maxInclusive";

    /// sh:minExclusive IRI
    pub const MIN_EXCLUSIVE: &str = "http://www.w3.org/ns/shacl#minExclusive";

    /// sh:maxExclusive IRI
    pub const MAX_EXCLUSIVE: &str = "http://www.w3.org/ns/shacl#maxExclusive";

    // ========================================================================
    // String Constraints
    // ========================================================================

    /// sh:pattern IRI
    pub const PATTERN: &str = "http://www.w3.org/ns/shacl#pattern";

    /// sh:flags IRI
    pub const FLAGS: &str = "http://www.w3.org/ns/shacl#flags";

    /// sh:minLength IRI
    pub const MIN_LENGTH: &str = "http://www.w3.org/ns/shacl#minLength";

    /// sh:maxLength IRI
    pub const MAX_LENGTH: &str = "http://www.w3.org/ns/shacl#maxLength";

    /// sh:languageIn IRI
    pub const LANGUAGE_IN: &str = "http://www.w3.org/ns/shacl#languageIn";

    /// sh:uniqueLang IRI
    pub const UNIQUE_LANG: &str = "http://www.w3.org/ns/shacl#uniqueLang";

    // ========================================================================
    // Value Constraints
    // ========================================================================

    /// sh:hasValue IRI
    pub const HAS_VALUE: &str = "http://www.w3.org/ns/shacl#hasValue";

    /// sh:in IRI
    pub const IN: &str = "http://www.w3.org/ns/shacl#in";

    // ========================================================================
    // Pair Constraints
    // ========================================================================

    /// sh:equals IRI
    pub const EQUALS: &str = "http://www.w3.org/ns/shacl#equals";

    /// sh:disjoint IRI
    pub const DISJOINT: &str = "http://www.w3.org/ns/shacl#disjoint";

    /// sh:lessThan IRI
    pub const LESS_THAN: &str = "http://www.w3.org/ns/shacl#lessThan";

    /// sh:lessThanOrEquals IRI
    pub const LESS_THAN_OR_EQUALS: &str = "http://www.w3.org/ns/shacl#lessThanOrEquals";

    // ========================================================================
    // Shape-based and Logical Constraints
    // ========================================================================

    /// sh:node IRI
    pub const NODE: &str = "http://www.w3.org/ns/shacl#node";

    /// sh:not IRI
    pub const NOT: &str = "http://www.w3.org/ns/shacl#not";

    /// sh:and IRI
    pub const AND: &str = "http://www.w3.org/ns/shacl#and";

    /// sh:or IRI
    pub const OR: &str = "http://www.w3.org/ns/shacl#or";

    /// sh:xone IRI
    pub const XONE: &str = "http://www.w3.org/ns/shacl#xone";

    /// sh:qualifiedValueShape IRI
    pub const QUALIFIED_VALUE_SHAPE: &str = "http://www.w3.org/ns/shacl#qualifiedValueShape";

    /// sh:qualifiedMinCount IRI
    pub const QUALIFIED_MIN_COUNT: &str = "http://www.w3.org/ns/shacl#qualifiedMinCount";

    /// sh:qualifiedMaxCount IRI
    pub const QUALIFIED_MAX_COUNT: &str = "http://www.w3.org/ns/shacl#qualifiedMaxCount";

    // ========================================================================
    // Closed Shape Constraints
    // ========================================================================

    /// sh:closed IRI
    pub const CLOSED: &str = "http://www.w3.org/ns/shacl#closed";

    /// sh:ignoredProperties IRI
    pub const IGNORED_PROPERTIES: &str = "http://www.w3.org/ns/shacl#ignoredProperties";

    // ========================================================================
    // Node Kind Values
    // ========================================================================

    /// sh:BlankNode IRI
    pub const BLANK_NODE: &str = "http://www.w3.org/ns/shacl#BlankNode";

    /// sh:IRI IRI
    pub const IRI: &str = "http://www.w3.org/ns/shacl#IRI";

    /// sh:Literal IRI
    pub const LITERAL: &str = "http://www.w3.org/ns/shacl#Literal";

    /// sh:BlankNodeOrIRI IRI
    pub const BLANK_NODE_OR_IRI: &str = "http://www.w3.org/ns/shacl#BlankNodeOrIRI";

    /// sh:BlankNodeOrLiteral IRI
    pub const BLANK_NODE_OR_LITERAL: &str = "http://www.w3.org/ns/shacl#BlankNodeOrLiteral";

    /// sh:IRIOrLiteral IRI
    pub const IRI_OR_LITERAL: &str = "http://www.w3.org/ns/shacl#IRIOrLiteral";

    // ========================================================================
    // Severity Levels and Shape Metadata
    // ========================================================================

    /// sh:severity IRI
    pub const SEVERITY: &str = "http://www.w3.org/ns/shacl#severity";

    /// sh:Violation IRI
    pub const VIOLATION: &str = "http://www.w3.org/ns/shacl#Violation";

    /// sh:Warning IRI
    pub const WARNING: &str = "http://www.w3.org/ns/shacl#Warning";

    /// sh:Info IRI
    pub const INFO: &str = "http://www.w3.org/ns/shacl#Info";

    /// sh:deactivated IRI
    pub const DEACTIVATED: &str = "http://www.w3.org/ns/shacl#deactivated";

    /// sh:message IRI
    pub const MESSAGE: &str = "http://www.w3.org/ns/shacl#message";

    /// sh:name IRI
    pub const NAME: &str = "http://www.w3.org/ns/shacl#name";

    /// sh:description IRI
    pub const DESCRIPTION: &str = "http://www.w3.org/ns/shacl#description";

    /// sh:order IRI
    pub const ORDER: &str = "http://www.w3.org/ns/shacl#order";

    /// sh:group IRI
    pub const GROUP: &str = "http://www.w3.org/ns/shacl#group";

    // ========================================================================
    // Validation Report
    // ========================================================================

    /// sh:ValidationReport IRI
    pub const VALIDATION_REPORT: &str = "http://www.w3.org/ns/shacl#ValidationReport";

    /// sh:ValidationResult IRI
    pub const VALIDATION_RESULT: &str = "http://www.w3.org/ns/shacl#ValidationResult";

    /// sh:conforms IRI
    pub const CONFORMS: &str = "http://www.w3.org/ns/shacl#conforms";

    /// sh:result IRI
    pub const RESULT: &str = "http://www.w3.org/ns/shacl#result";

    /// sh:focusNode IRI
    pub const FOCUS_NODE: &str = "http://www.w3.org/ns/shacl#focusNode";

    /// sh:resultPath IRI
    pub const RESULT_PATH: &str = "http://www.w3.org/ns/shacl#resultPath";

    /// sh:value IRI
    pub const VALUE: &str = "http://www.w3.org/ns/shacl#value";

    /// sh:sourceShape IRI
    pub const SOURCE_SHAPE: &str = "http://www.w3.org/ns/shacl#sourceShape";

    /// sh:sourceConstraintComponent IRI
    pub const SOURCE_CONSTRAINT_COMPONENT: &str =
        "http://www.w3.org/ns/shacl#sourceConstraintComponent";

    /// sh:resultSeverity IRI
    pub const RESULT_SEVERITY: &str = "http://www.w3.org/ns/shacl#resultSeverity";

    /// sh:resultMessage IRI
    pub const RESULT_MESSAGE: &str = "http://www.w3.org/ns/shacl#resultMessage";

    /// Returns true if the IRI lives in the SHACL namespace
    #[inline]
    pub fn is_shacl_iri(iri: &str) -> bool {
        iri.starts_with(NS)
    }
}

/// SHACL constraint component IRIs (values of `sh:sourceConstraintComponent`)
pub mod components {
    pub const CLASS: &str = "http://www.w3.org/ns/shacl#ClassConstraintComponent";
    pub const DATATYPE: &str = "http://www.w3.org/ns/shacl#DatatypeConstraintComponent";
    pub const NODE_KIND: &str = "http://www.w3.org/ns/shacl#NodeKindConstraintComponent";
    pub const MIN_COUNT: &str = "http://www.w3.org/ns/shacl#MinCountConstraintComponent";
    pub const MAX_COUNT: &str = "http://www.w3.org/ns/shacl#MaxCountConstraintComponent";
    pub const MIN_LENGTH: &str = "http://www.w3.org/ns/shacl#MinLengthConstraintComponent";
    pub const MAX_LENGTH: &str = "http://www.w3.org/ns/shacl#MaxLengthConstraintComponent";
    pub const PATTERN: &str = "http://www.w3.org/ns/shacl#PatternConstraintComponent";
    pub const LANGUAGE_IN: &str = "http://www.w3.org/ns/shacl#LanguageInConstraintComponent";
    pub const UNIQUE_LANG: &str = "http://www.w3.org/ns/shacl#UniqueLangConstraintComponent";
    pub const MIN_INCLUSIVE: &str = "http://www.w3.org/ns/shacl#MinInclusiveConstraintComponent";
    pub const MAX_INCLUSIVE: &str = "http://www.w3.org/ns/shacl#MaxInclusiveConstraintComponent";
    pub const MIN_EXCLUSIVE: &str = "http://www.w3.org/ns/shacl#MinExclusiveConstraintComponent";
    pub const MAX_EXCLUSIVE: &str = "http://www.w3.org/ns/shacl#MaxExclusiveConstraintComponent";
    pub const IN: &str = "http://www.w3.org/ns/shacl#InConstraintComponent";
    pub const HAS_VALUE: &str = "http://www.w3.org/ns/shacl#HasValueConstraintComponent";
    pub const EQUALS: &str = "http://www.w3.org/ns/shacl#EqualsConstraintComponent";
    pub const DISJOINT: &str = "http://www.w3.org/ns/shacl#DisjointConstraintComponent";
    pub const LESS_THAN: &str = "http://www.w3.org/ns/shacl#LessThanConstraintComponent";
    pub const LESS_THAN_OR_EQUALS: &str =
        "http://www.w3.org/ns/shacl#LessThanOrEqualsConstraintComponent";
    pub const NODE: &str = "http://www.w3.org/ns/shacl#NodeConstraintComponent";
    pub const PROPERTY: &str = "http://www.w3.org/ns/shacl#PropertyConstraintComponent";
    pub const AND: &str = "http://www.w3.org/ns/shacl#AndConstraintComponent";
    pub const OR: &str = "http://www.w3.org/ns/shacl#OrConstraintComponent";
    pub const NOT: &str = "http://www.w3.org/ns/shacl#NotConstraintComponent";
    pub const XONE: &str = "http://www.w3.org/ns/shacl#XoneConstraintComponent";
    pub const QUALIFIED_MIN_COUNT: &str =
        "http://www.w3.org/ns/shacl#QualifiedMinCountConstraintComponent";
    pub const QUALIFIED_MAX_COUNT: &str =
        "http://www.w3.org/ns/shacl#QualifiedMaxCountConstraintComponent";
    pub const CLOSED: &str = "http://www.w3.org/ns/shacl#ClosedConstraintComponent";
}

/// Well-known prefix bindings
///
/// Used as a fallback when compacting IRIs for human-readable output.
pub mod prefixes {
    /// (prefix, namespace) pairs, in the order they are tried
    pub const WELL_KNOWN: &[(&str, &str)] = &[
        ("rdf", super::rdf::NS),
        ("rdfs", super::rdfs::NS),
        ("xsd", super::xsd::NS),
        ("sh", super::shacl::NS),
    ];
}
