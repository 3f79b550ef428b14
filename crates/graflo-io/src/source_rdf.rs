//! Local RDF file data source (C7), grounded on `RdfFileDataSource` in
//! `graflo/data_source/rdf.py`. Parses the file into an in-memory `oxigraph` store, then
//! flattens triples into one `Record` per subject (optionally filtered by `rdf:type`).

use crate::rdf_common::{insert_multi, local_name};
use async_trait::async_trait;
use graflo_core::{DataSource, Record, Value};
use oxigraph::io::RdfFormat;
use oxigraph::model::{vocab::rdf, NamedNode, Subject, Term, TermRef};
use oxigraph::store::Store;
use std::collections::HashSet;
use std::path::Path;

fn format_from_extension(path: &Path) -> anyhow::Result<RdfFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    Ok(match ext.as_str() {
        "ttl" | "turtle" => RdfFormat::Turtle,
        "rdf" | "xml" => RdfFormat::RdfXml,
        "n3" => RdfFormat::N3,
        "nt" => RdfFormat::NTriples,
        "nq" => RdfFormat::NQuads,
        "trig" => RdfFormat::TriG,
        other => anyhow::bail!("cannot determine RDF format for extension '{other}'"),
    })
}

/// Reads one local RDF file and yields one `Record` per subject, grouped the same way
/// `_triples_to_docs` groups triples: `_uri`/`_key` plus one field per predicate local name
/// (multi-valued predicates become lists).
pub struct RdfFileDataSource {
    name: String,
    docs: Vec<Record>,
    cursor: usize,
}

impl RdfFileDataSource {
    pub fn open(path: impl AsRef<Path>, rdf_class: Option<&str>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let format = format_from_extension(path)?;
        let store = Store::new()?;
        let file = std::fs::File::open(path)?;
        store.load_from_reader(format, file)?;

        let docs = triples_to_docs(&store, rdf_class)?;
        Ok(Self {
            name: path.display().to_string(),
            docs,
            cursor: 0,
        })
    }
}

fn triples_to_docs(store: &Store, rdf_class: Option<&str>) -> anyhow::Result<Vec<Record>> {
    let subjects: Vec<Subject> = match rdf_class {
        Some(class) => {
            let class_node = NamedNode::new(class)?;
            store
                .quads_for_pattern(None, Some(rdf::TYPE), Some(TermRef::NamedNode(class_node.as_ref())), None)
                .map(|q| q.map(|quad| quad.subject))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for quad in store.iter() {
                let quad = quad?;
                if seen.insert(quad.subject.clone()) {
                    out.push(quad.subject);
                }
            }
            out
        }
    };

    let mut docs = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let uri = match &subject {
            Subject::NamedNode(n) => n.as_str().to_string(),
            Subject::BlankNode(b) => b.to_string(),
            #[allow(unreachable_patterns)]
            _ => subject.to_string(),
        };

        let mut record = Record::new();
        record.insert("_uri".to_string(), Value::String(uri.clone()));
        record.insert("_key".to_string(), Value::String(local_name(&uri)));

        for quad in store.quads_for_pattern(Some(subject.as_ref()), None, None, None) {
            let quad = quad?;
            let pred_name = local_name(quad.predicate.as_str());
            if pred_name == "type" {
                continue;
            }
            insert_multi(&mut record, &pred_name, term_to_value(&quad.object));
        }
        docs.push(record);
    }
    Ok(docs)
}

fn term_to_value(term: &Term) -> Value {
    match term {
        Term::NamedNode(n) => Value::String(n.as_str().to_string()),
        Term::BlankNode(b) => Value::String(b.to_string()),
        Term::Literal(l) => {
            let datatype = l.datatype().as_str();
            if datatype.ends_with("integer") || datatype.ends_with("int") || datatype.ends_with("long") {
                l.value().parse::<i64>().map(Value::Int).unwrap_or_else(|_| Value::String(l.value().to_string()))
            } else if datatype.ends_with("double") || datatype.ends_with("float") || datatype.ends_with("decimal") {
                l.value().parse::<f64>().map(Value::Float).unwrap_or_else(|_| Value::String(l.value().to_string()))
            } else if datatype.ends_with("boolean") {
                Value::Bool(l.value() == "true" || l.value() == "1")
            } else {
                Value::String(l.value().to_string())
            }
        }
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

#[async_trait]
impl DataSource for RdfFileDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_batch(&mut self, batch_size: usize) -> anyhow::Result<Option<Vec<Record>>> {
        if self.cursor >= self.docs.len() {
            return Ok(None);
        }
        let end = (self.cursor + batch_size).min(self.docs.len());
        let batch = self.docs[self.cursor..end].to_vec();
        self.cursor = end;
        Ok(Some(batch))
    }
}
