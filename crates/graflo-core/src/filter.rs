//! Filter expression algebra (C1): a tree of leaf comparisons and logical connectives that
//! renders to SQL, AQL, Cypher, GSQL, or evaluates directly against a record.
//!
//! `FilterExpression` is a discriminated union rather than a trait hierarchy (see Design
//! Notes in the governing spec): a leaf variant holds only leaf fields, a composite variant
//! holds only `operator`/`deps`, and the enum itself makes the "leaf must not carry
//! `operator`/`deps`" invariant structural rather than a runtime check.

use crate::error::GrafloError;
use crate::value::{Record, Value};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Leaf comparison operators. `IS_NULL`/`IS_NOT_NULL` carry no `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "EQ")]
    Eq,
    #[serde(rename = "NEQ")]
    Neq,
    #[serde(rename = "GT")]
    Gt,
    #[serde(rename = "LT")]
    Lt,
    #[serde(rename = "GE")]
    Ge,
    #[serde(rename = "LE")]
    Le,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "IS_NULL")]
    IsNull,
    #[serde(rename = "IS_NOT_NULL")]
    IsNotNull,
}

impl ComparisonOperator {
    fn from_token(token: &str) -> Option<Self> {
        use ComparisonOperator::*;
        Some(match token {
            "EQ" => Eq,
            "NEQ" => Neq,
            "GT" => Gt,
            "LT" => Lt,
            "GE" => Ge,
            "LE" => Le,
            "IN" => In,
            "IS_NULL" => IsNull,
            "IS_NOT_NULL" => IsNotNull,
            _ => return None,
        })
    }

    fn is_nullary(self) -> bool {
        matches!(self, ComparisonOperator::IsNull | ComparisonOperator::IsNotNull)
    }
}

/// Logical connectives joining composite children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "NOT")]
    Not,
    #[serde(rename = "IF_THEN")]
    IfThen,
}

impl LogicalOperator {
    fn from_token(token: &str) -> Option<Self> {
        use LogicalOperator::*;
        Some(match token {
            "AND" => And,
            "OR" => Or,
            "NOT" => Not,
            "IF_THEN" => IfThen,
            _ => return None,
        })
    }

    fn token(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
            LogicalOperator::IfThen => "IF_THEN",
        }
    }
}

/// The filter expression tree. Leaves compare one field; composites connect sub-expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Leaf {
        field: String,
        cmp_operator: ComparisonOperator,
        /// Normalized: always a list, even for a single value. Empty for IS_NULL/IS_NOT_NULL.
        value: Vec<Value>,
        /// When set, in-process evaluation dispatches this as a named predicate on the
        /// field's value instead of evaluating `cmp_operator` directly.
        unary_op: Option<String>,
    },
    Composite {
        operator: LogicalOperator,
        deps: Vec<FilterExpression>,
    },
}

impl FilterExpression {
    /// Build a leaf, normalizing `value` per spec: a bare absent value becomes `[]`, a
    /// single value becomes a one-element list, an explicit null becomes `[Value::Null]`
    /// (kept distinct from `IS_NULL`, see Open Question #2).
    pub fn leaf(
        field: impl Into<String>,
        cmp_operator: ComparisonOperator,
        value: Vec<Value>,
        unary_op: Option<String>,
    ) -> Result<Self, GrafloError> {
        if cmp_operator.is_nullary() && !value.is_empty() {
            return Err(GrafloError::Invariant(format!(
                "{cmp_operator:?} leaf must carry an empty value list"
            )));
        }
        Ok(FilterExpression::Leaf {
            field: field.into(),
            cmp_operator,
            value,
            unary_op,
        })
    }

    /// Build a composite, enforcing the NOT=1/IF_THEN=2/AND,OR>=1 fan-in invariant.
    pub fn composite(
        operator: LogicalOperator,
        deps: Vec<FilterExpression>,
    ) -> Result<Self, GrafloError> {
        let n = deps.len();
        let ok = match operator {
            LogicalOperator::Not => n == 1,
            LogicalOperator::IfThen => n == 2,
            LogicalOperator::And | LogicalOperator::Or => n >= 1,
        };
        if !ok {
            return Err(GrafloError::Invariant(format!(
                "{operator:?} composite has invalid fan-in {n}"
            )));
        }
        Ok(FilterExpression::Composite { operator, deps })
    }

    /// Parse either the list form `[cmp_operator, value, field?, unary_op?]` /
    /// `[logical_operator, [subexpr, ...]]`, or the dict form, from a generic JSON value
    /// (used for both JSON and YAML input, since `serde_yaml` deserializes into
    /// `serde_json::Value` just as readily as any other `Deserializer` target).
    pub fn from_json(v: &serde_json::Value) -> Result<Self, GrafloError> {
        match v {
            serde_json::Value::Array(items) => Self::from_list(items),
            serde_json::Value::Object(map) => Self::from_dict(map),
            other => Err(GrafloError::Config(format!(
                "filter expression must be a list or object, got {other}"
            ))),
        }
    }

    fn from_list(items: &[serde_json::Value]) -> Result<Self, GrafloError> {
        let head = items
            .first()
            .and_then(|v| v.as_str())
            .ok_or_else(|| GrafloError::Config("filter list form missing operator token".into()))?;

        if let Some(logical) = LogicalOperator::from_token(head) {
            let subexprs = items
                .get(1)
                .and_then(|v| v.as_array())
                .ok_or_else(|| GrafloError::Config("composite list form missing deps list".into()))?;
            let deps = subexprs
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()?;
            return Self::composite(logical, deps);
        }

        let cmp = ComparisonOperator::from_token(head)
            .ok_or_else(|| GrafloError::Config(format!("unknown filter operator token {head}")))?;
        let raw_value = items.get(1).cloned().unwrap_or(serde_json::Value::Null);
        let field = items
            .get(2)
            .and_then(|v| v.as_str())
            .ok_or_else(|| GrafloError::Config("leaf list form missing field".into()))?
            .to_string();
        let unary_op = items.get(3).and_then(|v| v.as_str()).map(|s| s.to_string());
        Self::leaf(field, cmp, normalize_value(&raw_value, cmp), unary_op)
    }

    fn from_dict(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self, GrafloError> {
        if map.contains_key("field") || map.contains_key("cmp_operator") {
            let field = map
                .get("field")
                .and_then(|v| v.as_str())
                .ok_or_else(|| GrafloError::Config("leaf dict form missing field".into()))?
                .to_string();
            let cmp_token = map
                .get("cmp_operator")
                .and_then(|v| v.as_str())
                .ok_or_else(|| GrafloError::Config("leaf dict form missing cmp_operator".into()))?;
            let cmp = ComparisonOperator::from_token(cmp_token)
                .ok_or_else(|| GrafloError::Config(format!("unknown cmp_operator {cmp_token}")))?;
            let raw_value = map.get("value").cloned().unwrap_or(serde_json::Value::Null);
            // "operator" in the dict DSL maps to internal unary_op, distinct from the
            // logical-operator key used by the composite single-key form.
            let unary_op = map.get("operator").and_then(|v| v.as_str()).map(|s| s.to_string());
            return Self::leaf(field, cmp, normalize_value(&raw_value, cmp), unary_op);
        }

        if map.len() != 1 {
            return Err(GrafloError::Config(
                "composite dict form must be a single-key mapping".into(),
            ));
        }
        let (key, val) = map.iter().next().unwrap();
        let logical = LogicalOperator::from_token(key)
            .ok_or_else(|| GrafloError::Config(format!("unknown logical operator {key}")))?;
        let subexprs = val
            .as_array()
            .ok_or_else(|| GrafloError::Config("composite dict form value must be a list".into()))?;
        let deps = subexprs
            .iter()
            .map(Self::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        Self::composite(logical, deps)
    }

    /// Evaluate this expression in-process against a record.
    pub fn evaluate(&self, record: &Record) -> bool {
        match self {
            FilterExpression::Leaf {
                field,
                cmp_operator,
                value,
                unary_op,
            } => {
                let field_val = record.get(field);
                if let Some(op_name) = unary_op {
                    return dispatch_unary(op_name, field_val, value.first());
                }
                eval_cmp(*cmp_operator, field_val, value)
            }
            FilterExpression::Composite { operator, deps } => match operator {
                LogicalOperator::And => deps.iter().all(|d| d.evaluate(record)),
                LogicalOperator::Or => deps.iter().any(|d| d.evaluate(record)),
                LogicalOperator::Not => !deps[0].evaluate(record),
                LogicalOperator::IfThen => !deps[0].evaluate(record) || deps[1].evaluate(record),
            },
        }
    }

    /// Render to one of the string-producing query flavors.
    pub fn render(&self, flavor: Flavor, doc_name: &str) -> String {
        self.render_with_types(flavor, doc_name, None)
    }

    pub fn render_with_types(
        &self,
        flavor: Flavor,
        doc_name: &str,
        field_types: Option<&HashMap<String, FieldKind>>,
    ) -> String {
        match self {
            FilterExpression::Leaf {
                field,
                cmp_operator,
                value,
                ..
            } => render_leaf(flavor, doc_name, field, *cmp_operator, value, field_types),
            FilterExpression::Composite { operator, deps } => {
                render_composite(flavor, doc_name, *operator, deps, field_types)
            }
        }
    }
}

/// Single-value-or-list normalization described in spec §3: a bare value becomes a
/// one-element list; JSON `null` becomes `[Value::Null]`, not `[]` — that collapse is
/// reserved for the nullary comparison operators.
fn normalize_value(raw: &serde_json::Value, cmp: ComparisonOperator) -> Vec<Value> {
    if cmp.is_nullary() {
        return Vec::new();
    }
    match raw {
        serde_json::Value::Null => vec![Value::Null],
        serde_json::Value::Array(items) => items.iter().map(json_to_value).collect(),
        other => vec![json_to_value(other)],
    }
}

fn json_to_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(_) => Value::Null,
    }
}

fn dispatch_unary(op_name: &str, field_val: Option<&Value>, arg: Option<&Value>) -> bool {
    let field_val = match field_val {
        Some(v) => v,
        None => return false,
    };
    match op_name {
        "contains" => match (field_val, arg) {
            (Value::String(s), Some(Value::String(needle))) => s.contains(needle.as_str()),
            (Value::List(items), Some(needle)) => items.contains(needle),
            _ => false,
        },
        "starts_with" => match (field_val, arg) {
            (Value::String(s), Some(Value::String(prefix))) => s.starts_with(prefix.as_str()),
            _ => false,
        },
        "ends_with" => match (field_val, arg) {
            (Value::String(s), Some(Value::String(suffix))) => s.ends_with(suffix.as_str()),
            _ => false,
        },
        _ => false,
    }
}

fn eval_cmp(cmp: ComparisonOperator, field_val: Option<&Value>, value: &[Value]) -> bool {
    use ComparisonOperator::*;
    match cmp {
        IsNull => field_val.is_none() || field_val.map(Value::is_null).unwrap_or(false),
        IsNotNull => !(field_val.is_none() || field_val.map(Value::is_null).unwrap_or(false)),
        In => match field_val {
            Some(v) => value.contains(v),
            None => false,
        },
        Eq | Neq | Gt | Lt | Ge | Le => {
            let target = match value.first() {
                Some(v) => v,
                None => return false,
            };
            let field_val = match field_val {
                Some(v) => v,
                None => return false,
            };
            match cmp {
                Eq => field_val == target,
                Neq => field_val != target,
                Gt => field_val
                    .partial_cmp_value(target)
                    .map(|o| o.is_gt())
                    .unwrap_or(false),
                Lt => field_val
                    .partial_cmp_value(target)
                    .map(|o| o.is_lt())
                    .unwrap_or(false),
                Ge => field_val
                    .partial_cmp_value(target)
                    .map(|o| o.is_ge())
                    .unwrap_or(false),
                Le => field_val
                    .partial_cmp_value(target)
                    .map(|o| o.is_le())
                    .unwrap_or(false),
                _ => unreachable!(),
            }
        }
    }
}

/// A hint used by the GSQL REST++ flavor to decide string-vs-numeric literal quoting
/// when the expression tree alone doesn't carry that information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Numeric,
    Boolean,
}

/// Target query dialect for `FilterExpression::render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Sql,
    Aql,
    Cypher,
    /// `doc_name` empty triggers TigerGraph's REST++ key=value mode.
    Gsql,
}

fn render_leaf(
    flavor: Flavor,
    doc_name: &str,
    field: &str,
    cmp: ComparisonOperator,
    value: &[Value],
    field_types: Option<&HashMap<String, FieldKind>>,
) -> String {
    match flavor {
        Flavor::Sql => render_leaf_sql(field, cmp, value),
        Flavor::Aql => render_leaf_doc_style(doc_name, field, cmp, value, DocStyle::Aql),
        Flavor::Cypher => render_leaf_doc_style(doc_name, field, cmp, value, DocStyle::Cypher),
        Flavor::Gsql => {
            if doc_name.is_empty() {
                render_leaf_restpp(field, cmp, value, field_types)
            } else {
                render_leaf_doc_style(doc_name, field, cmp, value, DocStyle::Cypher)
            }
        }
    }
}

fn sql_field(field: &str) -> String {
    match field.split_once('.') {
        Some((alias, col)) => format!("{alias}.\"{col}\""),
        None => format!("\"{field}\""),
    }
}

fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(x) => x.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''")),
        Value::List(items) => items.iter().map(sql_literal).collect::<Vec<_>>().join(", "),
    }
}

fn render_leaf_sql(field: &str, cmp: ComparisonOperator, value: &[Value]) -> String {
    use ComparisonOperator::*;
    let f = sql_field(field);
    match cmp {
        IsNull => format!("{f} IS NULL"),
        IsNotNull => format!("{f} IS NOT NULL"),
        In => {
            let list = value.iter().map(sql_literal).collect::<Vec<_>>().join(", ");
            format!("{f} IN ({list})")
        }
        Eq => format!("{f} = {}", sql_literal(first_or_null(value))),
        Neq => format!("{f} != {}", sql_literal(first_or_null(value))),
        Gt => format!("{f} > {}", sql_literal(first_or_null(value))),
        Lt => format!("{f} < {}", sql_literal(first_or_null(value))),
        Ge => format!("{f} >= {}", sql_literal(first_or_null(value))),
        Le => format!("{f} <= {}", sql_literal(first_or_null(value))),
    }
}

fn first_or_null(value: &[Value]) -> &Value {
    value.first().unwrap_or(&Value::Null)
}

enum DocStyle {
    Aql,
    Cypher,
}

fn cast_value_doc_style(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(x) => x.to_string(),
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::List(items) => format!(
            "[{}]",
            items.iter().map(cast_value_doc_style).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn render_leaf_doc_style(
    doc_name: &str,
    field: &str,
    cmp: ComparisonOperator,
    value: &[Value],
    style: DocStyle,
) -> String {
    use ComparisonOperator::*;
    let field_ref = match style {
        DocStyle::Aql => format!("{doc_name}[\"{field}\"]"),
        DocStyle::Cypher => format!("{doc_name}.{field}"),
    };
    match cmp {
        IsNull => match style {
            DocStyle::Aql => format!("{field_ref} == null"),
            DocStyle::Cypher => format!("{field_ref} IS NULL"),
        },
        IsNotNull => match style {
            DocStyle::Aql => format!("{field_ref} != null"),
            DocStyle::Cypher => format!("{field_ref} IS NOT NULL"),
        },
        In => {
            let list = value
                .iter()
                .map(cast_value_doc_style)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{field_ref} IN [{list}]")
        }
        _ => {
            let op = match (cmp, &style) {
                (Eq, DocStyle::Aql) => "==",
                (Eq, DocStyle::Cypher) => "=",
                (Neq, _) => "!=",
                (Gt, _) => ">",
                (Lt, _) => "<",
                (Ge, _) => ">=",
                (Le, _) => "<=",
                _ => unreachable!(),
            };
            format!("{field_ref} {op} {}", cast_value_doc_style(first_or_null(value)))
        }
    }
}

fn render_leaf_restpp(
    field: &str,
    cmp: ComparisonOperator,
    value: &[Value],
    field_types: Option<&HashMap<String, FieldKind>>,
) -> String {
    use ComparisonOperator::*;
    match cmp {
        IsNull => format!("{field}=\"\""),
        IsNotNull => format!("{field}!=\"\""),
        _ => {
            let op = match cmp {
                Eq => "=",
                Neq => "!=",
                Gt => ">",
                Lt => "<",
                Ge => ">=",
                Le => "<=",
                In => "=", // REST++ has no native IN; callers should avoid IN in this flavor.
                _ => unreachable!(),
            };
            let v = first_or_null(value);
            let is_string = match field_types.and_then(|m| m.get(field)) {
                Some(FieldKind::String) => true,
                Some(_) => false,
                None => matches!(v, Value::String(_)),
            };
            let rendered = if is_string {
                format!("\"{}\"", v.to_string().replace('\\', "\\\\").replace('"', "\\\""))
            } else {
                format!("{v}")
            };
            format!("{field}{op}{rendered}")
        }
    }
}

fn render_composite(
    flavor: Flavor,
    doc_name: &str,
    operator: LogicalOperator,
    deps: &[FilterExpression],
    field_types: Option<&HashMap<String, FieldKind>>,
) -> String {
    let is_restpp = flavor == Flavor::Gsql && doc_name.is_empty();
    let token = match (operator, is_restpp) {
        (LogicalOperator::And, true) => "&&",
        (LogicalOperator::Or, true) => "||",
        _ => operator.token(),
    };

    let rendered: Vec<String> = deps
        .iter()
        .map(|d| d.render_with_types(flavor, doc_name, field_types))
        .collect();

    if operator == LogicalOperator::Not {
        return format!("{token} {}", rendered[0]);
    }
    rendered.join(&format!(" {token} "))
}

impl Serialize for FilterExpression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        match self {
            FilterExpression::Leaf {
                field,
                cmp_operator,
                value,
                unary_op,
            } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("field", field)?;
                map.serialize_entry("cmp_operator", cmp_operator)?;
                map.serialize_entry("value", value)?;
                if let Some(op) = unary_op {
                    map.serialize_entry("operator", op)?;
                }
                map.end()
            }
            FilterExpression::Composite { operator, deps } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(operator.token(), deps)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FilterExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;
        FilterExpression::from_json(&v).map_err(|e| DeError::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(field: &str, cmp: ComparisonOperator, value: Vec<Value>) -> FilterExpression {
        FilterExpression::leaf(field, cmp, value, None).unwrap()
    }

    #[test]
    fn is_null_normalizes_to_empty_value() {
        let e = leaf("name", ComparisonOperator::IsNull, vec![]);
        match e {
            FilterExpression::Leaf { value, .. } => assert!(value.is_empty()),
            _ => panic!(),
        }
    }

    #[test]
    fn not_requires_exactly_one_dep() {
        let a = leaf("a", ComparisonOperator::Eq, vec![Value::Int(1)]);
        let b = leaf("b", ComparisonOperator::Eq, vec![Value::Int(2)]);
        assert!(FilterExpression::composite(LogicalOperator::Not, vec![a.clone()]).is_ok());
        assert!(FilterExpression::composite(LogicalOperator::Not, vec![a, b]).is_err());
    }

    #[test]
    fn filter_flavor_round_trip() {
        let e = leaf("name", ComparisonOperator::Eq, vec![Value::String("Alice".into())]);
        assert_eq!(e.render(Flavor::Aql, "doc"), r#"doc["name"] == "Alice""#);
        assert_eq!(e.render(Flavor::Cypher, "doc"), r#"doc.name = "Alice""#);
        assert_eq!(e.render(Flavor::Sql, "doc"), "\"name\" = 'Alice'");
    }

    #[test]
    fn is_not_null_and_composite_sql() {
        let s = leaf("s.id", ComparisonOperator::IsNotNull, vec![]);
        let t = leaf("t.id", ComparisonOperator::IsNotNull, vec![]);
        let and = FilterExpression::composite(LogicalOperator::And, vec![s, t]).unwrap();
        let rendered = and.render(Flavor::Sql, "doc");
        assert!(rendered.contains("s.\"id\" IS NOT NULL"));
        assert!(rendered.contains("t.\"id\" IS NOT NULL"));
        assert!(rendered.contains(" AND "));
    }

    #[test]
    fn evaluate_if_then_implication() {
        let mut r: Record = Record::new();
        r.insert("a".into(), Value::Bool(false));
        r.insert("b".into(), Value::Bool(false));
        let a = leaf("a", ComparisonOperator::Eq, vec![Value::Bool(true)]);
        let b = leaf("b", ComparisonOperator::Eq, vec![Value::Bool(true)]);
        let if_then = FilterExpression::composite(LogicalOperator::IfThen, vec![a, b]).unwrap();
        // a is false, so a -> b holds regardless of b.
        assert!(if_then.evaluate(&r));
    }

    #[test]
    fn list_form_parses_leaf_and_composite() {
        let json: serde_json::Value = serde_json::json!(["EQ", "Alice", "name"]);
        let e = FilterExpression::from_json(&json).unwrap();
        matches!(e, FilterExpression::Leaf { .. });

        let json: serde_json::Value = serde_json::json!(["AND", [["EQ", "Alice", "name"]]]);
        let e = FilterExpression::from_json(&json).unwrap();
        matches!(e, FilterExpression::Composite { .. });
    }

    #[test]
    fn dict_form_parses_leaf_and_composite() {
        let json: serde_json::Value = serde_json::json!({
            "field": "name", "cmp_operator": "EQ", "value": "Alice"
        });
        let e = FilterExpression::from_json(&json).unwrap();
        matches!(e, FilterExpression::Leaf { .. });

        let json: serde_json::Value = serde_json::json!({
            "AND": [{"field": "name", "cmp_operator": "EQ", "value": "Alice"}]
        });
        let e = FilterExpression::from_json(&json).unwrap();
        matches!(e, FilterExpression::Composite { .. });
    }
}
