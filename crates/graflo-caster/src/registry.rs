//! Registry builder (C9 supplement, spec §11): turns `Patterns` + `Schema` into the set
//! of `(resource name, DataSource)` pairs the caster drives, dispatching on resource type
//! and invoking the auto-join planner before a SQL table's query is built. Ported from
//! `graflo/hq/registry_builder.py`'s `RegistryBuilder`.

use graflo_core::{DataSource, IngestionParams, Schema};
use graflo_io::{FileDataSource, FileFormat, RdfFileDataSource, SparqlEndpointDataSource, SparqlSourceConfig, SqlDataSource};
use graflo_patterns::{datetime_range_where_sql, enrich_edge_pattern_with_joins, PatternRef, Patterns, ResourceType};
use std::path::PathBuf;

/// One registered data source, bound to the resource name it feeds.
pub struct RegistryEntry {
    pub resource_name: String,
    pub source: Box<dyn DataSource + Send>,
}

/// Builds a registry of data sources from `Patterns`, dispatching by `ResourceType` the
/// way `RegistryBuilder.build` does in the original.
pub struct RegistryBuilder<'a> {
    schema: &'a Schema,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Iterates every resource in the schema, looks up its pattern and resource type, and
    /// delegates to the matching registration helper. A resource that fails to register
    /// (missing pattern, bad connection config, unreadable file) is logged and skipped;
    /// it never aborts the whole build.
    pub async fn build(&self, patterns: &Patterns, params: &IngestionParams) -> anyhow::Result<Vec<RegistryEntry>> {
        let mut entries = Vec::new();

        for resource in &self.schema.resources {
            let name = resource.name.clone();
            match patterns.get_resource_type(&name) {
                Some(ResourceType::File) => {
                    if let Err(err) = self.register_file(&name, patterns, params, &mut entries) {
                        tracing::error!(resource = name.as_str(), error = %err, "failed to register file sources");
                    }
                }
                Some(ResourceType::SqlTable) => {
                    if let Err(err) = self.register_sql_table(&name, patterns, params, &mut entries).await {
                        tracing::error!(resource = name.as_str(), error = %err, "failed to create data source for SQL table");
                    }
                }
                Some(ResourceType::Sparql) => {
                    if let Err(err) = self.register_sparql(&name, patterns, params, &mut entries) {
                        tracing::error!(resource = name.as_str(), error = %err, "failed to create data source for SPARQL resource");
                    }
                }
                None => {
                    tracing::warn!(resource = name.as_str(), "no resource type found for resource, skipping");
                }
            }
        }

        Ok(entries)
    }

    fn register_file(
        &self,
        name: &str,
        patterns: &Patterns,
        params: &IngestionParams,
        entries: &mut Vec<RegistryEntry>,
    ) -> anyhow::Result<()> {
        let Some(pattern) = patterns.file_patterns.get(name) else {
            anyhow::bail!("no FilePattern for resource '{name}'");
        };
        let Some(sub_path) = &pattern.sub_path else {
            tracing::warn!(resource = name, "FilePattern has no sub_path, skipping");
            return Ok(());
        };

        let mut files: Vec<PathBuf> = std::fs::read_dir(sub_path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| pattern.matches(n))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        if let Some(limit) = params.limit_files {
            files.truncate(limit);
        }
        tracing::info!(resource = name, count = files.len(), "discovered files for resource");

        for file in files {
            let format = FileFormat::from_extension(&file);
            match FileDataSource::open(&file, format) {
                Ok(source) => entries.push(RegistryEntry {
                    resource_name: name.to_string(),
                    source: Box::new(source),
                }),
                Err(err) => {
                    tracing::error!(resource = name, file = %file.display(), error = %err, "failed to open file data source");
                }
            }
        }
        Ok(())
    }

    async fn register_sql_table(
        &self,
        name: &str,
        patterns: &Patterns,
        params: &IngestionParams,
        entries: &mut Vec<RegistryEntry>,
    ) -> anyhow::Result<()> {
        let Some(PatternRef::Table(pattern)) = patterns.pattern(name) else {
            anyhow::bail!("pattern for resource '{name}' is not a TablePattern");
        };
        let mut pattern = pattern.clone();

        let postgres_config = patterns
            .get_postgres_config(name)
            .ok_or_else(|| anyhow::anyhow!("PostgreSQL table '{name}' has no connection config"))?;
        let table_info = patterns
            .get_table_info(name)
            .ok_or_else(|| anyhow::anyhow!("could not get table info for resource '{name}'"))?;
        let effective_schema = table_info
            .schema_name
            .clone()
            .or_else(|| postgres_config.schema_name.clone())
            .unwrap_or_else(|| "public".to_string());

        let resource = self
            .schema
            .fetch_resource(name)
            .ok_or_else(|| anyhow::anyhow!("schema has no resource named '{name}'"))?;
        if pattern.joins.is_empty() {
            enrich_edge_pattern_with_joins(resource, &mut pattern, patterns, self.schema);
        }

        let mut query = pattern.build_query(&effective_schema);
        if pattern.date_field.is_none() {
            if let Some(dt_where) = datetime_range_where_sql(params) {
                if query.contains(" WHERE ") {
                    query.push_str(" AND ");
                } else {
                    query.push_str(" WHERE ");
                }
                query.push_str(&dt_where);
            }
        }

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&postgres_config.connection_string)
            .await?;
        let source = SqlDataSource::new(name.to_string(), pool, query);
        entries.push(RegistryEntry {
            resource_name: name.to_string(),
            source: Box::new(source),
        });

        tracing::info!(
            resource = name,
            schema = effective_schema.as_str(),
            table = table_info.table_name.as_str(),
            batch_size = params.batch_size,
            "created SQL data source"
        );
        Ok(())
    }

    fn register_sparql(
        &self,
        name: &str,
        patterns: &Patterns,
        params: &IngestionParams,
        entries: &mut Vec<RegistryEntry>,
    ) -> anyhow::Result<()> {
        let Some(pattern) = patterns.sparql_patterns.get(name) else {
            anyhow::bail!("no SparqlPattern for resource '{name}'");
        };

        if let Some(endpoint_url) = &pattern.endpoint_url {
            let config = SparqlSourceConfig {
                endpoint_url: endpoint_url.clone(),
                rdf_class: Some(pattern.rdf_class.clone()),
                graph_uri: pattern.graph_uri.clone(),
                sparql_query: pattern.sparql_query.clone(),
                page_size: params.batch_size,
            };
            let source = SparqlEndpointDataSource::new(name.to_string(), config);
            entries.push(RegistryEntry {
                resource_name: name.to_string(),
                source: Box::new(source),
            });
            tracing::info!(resource = name, endpoint = endpoint_url.as_str(), class = pattern.rdf_class.as_str(), "created SPARQL endpoint data source");
        } else if let Some(rdf_file) = &pattern.rdf_file {
            let source = RdfFileDataSource::open(rdf_file, Some(pattern.rdf_class.as_str()))?;
            entries.push(RegistryEntry {
                resource_name: name.to_string(),
                source: Box::new(source),
            });
            tracing::info!(resource = name, file = %rdf_file.display(), class = pattern.rdf_class.as_str(), "created RDF file data source");
        } else {
            tracing::warn!(resource = name, "SparqlPattern has neither endpoint_url nor rdf_file, skipping");
        }
        Ok(())
    }
}
