//! SPARQL query results

use crate::error::{StoreError, StoreResult};
use crate::rdf::{BlankNode, Literal, NamedNode, RdfFormat, RdfObject, RdfPredicate, RdfSerializer, Triple};
use comfy_table::{presets::ASCII_FULL, Table};
use oxrdf::{Term as OxTerm, Variable};
use sparesults::{QueryResultsFormat, QueryResultsSerializer};
use std::collections::HashMap;
use std::io::Write;

/// Vocabulary for result sets expressed as RDF
const RS: &str = "http://www.w3.org/2001/sw/DataAccess/tests/result-set#";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Output format for SELECT results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFormat {
    /// SPARQL XML results
    Xml,
    /// SPARQL JSON results
    Json,
    /// SPARQL CSV results
    Csv,
    /// ASCII table
    Text,
    /// Result-set vocabulary as RDF/XML
    RdfXml,
    /// Result-set vocabulary as N3
    N3,
}

/// Recognized format symbols, matched case-insensitively
const SELECT_FORMATS: &[(&str, ResultFormat)] = &[
    ("RS_XML", ResultFormat::Xml),
    ("XML", ResultFormat::Xml),
    ("RS_JSON", ResultFormat::Json),
    ("JSON", ResultFormat::Json),
    ("RS_CSV", ResultFormat::Csv),
    ("CSV", ResultFormat::Csv),
    ("RS_TEXT", ResultFormat::Text),
    ("TEXT", ResultFormat::Text),
    ("RS_RDF/XML", ResultFormat::RdfXml),
    ("RS_RDF", ResultFormat::RdfXml),
    ("RDF/XML", ResultFormat::RdfXml),
    ("RS_RDF/N3", ResultFormat::N3),
    ("N3", ResultFormat::N3),
];

impl ResultFormat {
    /// Resolve a format symbol; unknown or missing symbols fall back to text
    pub fn lookup(symbol: Option<&str>) -> Self {
        symbol
            .map(str::trim)
            .and_then(|symbol| {
                SELECT_FORMATS
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(symbol))
                    .map(|(_, format)| *format)
            })
            .unwrap_or(ResultFormat::Text)
    }
}

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings
    pub bindings: HashMap<String, RdfObject>,
}

impl QuerySolution {
    /// Create a new query solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding
    pub fn get(&self, variable: &str) -> Option<&RdfObject> {
        self.bindings.get(variable)
    }

    /// Add a binding
    pub fn bind(&mut self, variable: impl Into<String>, term: RdfObject) {
        self.bindings.insert(variable.into(), term);
    }
}

/// Result of a SELECT query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectResults {
    /// Projected variables, in query order
    pub variables: Vec<String>,
    /// Solutions, in evaluation order
    pub solutions: Vec<QuerySolution>,
}

impl SelectResults {
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Write the result set in the given format
    pub fn write<W: Write>(&self, out: &mut W, format: ResultFormat) -> StoreResult<()> {
        match format {
            ResultFormat::Xml => self.write_sparesults(out, QueryResultsFormat::Xml),
            ResultFormat::Json => self.write_sparesults(out, QueryResultsFormat::Json),
            ResultFormat::Csv => self.write_sparesults(out, QueryResultsFormat::Csv),
            ResultFormat::Text => self.write_table(out),
            ResultFormat::RdfXml => self.write_rdf(out, RdfFormat::RdfXml),
            ResultFormat::N3 => self.write_rdf(out, RdfFormat::N3),
        }
    }

    /// Render into a string
    pub fn to_string_as(&self, format: ResultFormat) -> StoreResult<String> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, format)?;
        String::from_utf8(buffer)
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    fn write_sparesults<W: Write>(&self, out: &mut W, format: QueryResultsFormat) -> StoreResult<()> {
        let variables = self
            .variables
            .iter()
            .map(|name| Variable::new(name.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Evaluation(e.to_string()))?;

        let mut writer = QueryResultsSerializer::from_format(format)
            .serialize_solutions_to_writer(&mut *out, variables.clone())?;
        for solution in &self.solutions {
            let terms: Vec<Option<OxTerm>> = variables
                .iter()
                .map(|v| solution.get(v.as_str()).cloned().map(OxTerm::from))
                .collect();
            writer.serialize(
                variables
                    .iter()
                    .zip(&terms)
                    .filter_map(|(v, t)| t.as_ref().map(|t| (v.as_ref(), t.as_ref()))),
            )?;
        }
        writer.finish()?;
        out.flush()?;
        Ok(())
    }

    fn write_table<W: Write>(&self, out: &mut W) -> StoreResult<()> {
        let mut table = Table::new();
        table.load_preset(ASCII_FULL);
        table.set_header(self.variables.iter());
        for solution in &self.solutions {
            table.add_row(self.variables.iter().map(|v| {
                solution.get(v).map(|t| t.to_string()).unwrap_or_default()
            }));
        }
        writeln!(out, "{table}")?;
        out.flush()?;
        Ok(())
    }

    fn write_rdf<W: Write>(&self, out: &mut W, format: RdfFormat) -> StoreResult<()> {
        let triples = self.to_rdf()?;
        RdfSerializer::serialize(&triples, &mut *out, format)?;
        Ok(())
    }

    /// Express the result set with the result-set vocabulary
    pub fn to_rdf(&self) -> StoreResult<Vec<Triple>> {
        let rs = |local: &str| RdfPredicate::new(&format!("{RS}{local}"));
        let result_set = BlankNode::new();
        let mut triples = vec![Triple::new(
            result_set.clone().into(),
            RdfPredicate::new(RDF_TYPE)?,
            NamedNode::new(&format!("{RS}ResultSet"))?.into(),
        )];

        for variable in &self.variables {
            triples.push(Triple::new(
                result_set.clone().into(),
                rs("resultVariable")?,
                Literal::new_simple_literal(variable.as_str()).into(),
            ));
        }

        for solution in &self.solutions {
            let row = BlankNode::new();
            triples.push(Triple::new(result_set.clone().into(), rs("solution")?, row.clone().into()));
            for variable in &self.variables {
                let Some(value) = solution.get(variable) else {
                    continue;
                };
                let binding = BlankNode::new();
                triples.push(Triple::new(row.clone().into(), rs("binding")?, binding.clone().into()));
                triples.push(Triple::new(
                    binding.clone().into(),
                    rs("variable")?,
                    Literal::new_simple_literal(variable.as_str()).into(),
                ));
                triples.push(Triple::new(binding.into(), rs("value")?, value.clone()));
            }
        }
        Ok(triples)
    }
}

/// SPARQL query results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SparqlResults {
    /// Bindings from SELECT query
    Bindings(SelectResults),

    /// Boolean result from ASK query
    Boolean(bool),

    /// Graph from CONSTRUCT/DESCRIBE query
    Graph(Vec<Triple>),
}
