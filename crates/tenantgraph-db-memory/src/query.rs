use std::cmp::Ordering;

use serde_json::Value;
use tenantgraph_storage::{Filter, QueryOptions, Record, StorageError};

/// Comparison operators understood by the in-memory executor.
///
/// These mirror the operators of the generated `*_Filter` input types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    In,
    Nin,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOp {
    /// Parses an operator name as it appears in a `where` input.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "in" => Self::In,
            "nin" => Self::Nin,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            _ => return None,
        })
    }
}

/// A single column condition, e.g. `total > 5`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub column: String,
    pub op: FilterOp,
    pub operand: Value,
}

impl QueryFilter {
    /// Flattens a `where` mapping into a list of AND-ed conditions.
    ///
    /// A column mapped directly to a scalar is shorthand for `eq`.
    pub fn parse_all(filter: &Filter) -> Result<Vec<QueryFilter>, StorageError> {
        let mut conditions = Vec::new();
        for (column, ops) in filter {
            match ops {
                Value::Object(ops) => {
                    for (name, operand) in ops {
                        let op = FilterOp::parse(name).ok_or_else(|| {
                            StorageError::invalid_record(format!(
                                "unknown filter operator '{name}' on column '{column}'"
                            ))
                        })?;
                        conditions.push(QueryFilter {
                            column: column.clone(),
                            op,
                            operand: operand.clone(),
                        });
                    }
                }
                Value::Null => {}
                scalar => conditions.push(QueryFilter {
                    column: column.clone(),
                    op: FilterOp::Eq,
                    operand: scalar.clone(),
                }),
            }
        }
        Ok(conditions)
    }

    /// Check if a record matches this condition.
    pub fn matches(&self, record: &Record) -> bool {
        let field = record.get(&self.column).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq => loose_eq(field, &self.operand),
            FilterOp::Ne => !loose_eq(field, &self.operand),
            FilterOp::In => self.list_operand().iter().any(|v| loose_eq(field, v)),
            FilterOp::Nin => !self.list_operand().iter().any(|v| loose_eq(field, v)),
            FilterOp::Gt => compare(field, &self.operand) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                compare(field, &self.operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => compare(field, &self.operand) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                compare(field, &self.operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Contains => self.match_text(field, |s, v| s.contains(v)),
            FilterOp::StartsWith => self.match_text(field, |s, v| s.starts_with(v)),
            FilterOp::EndsWith => self.match_text(field, |s, v| s.ends_with(v)),
        }
    }

    fn list_operand(&self) -> &[Value] {
        match &self.operand {
            Value::Array(values) => values,
            other => std::slice::from_ref(other),
        }
    }

    fn match_text<F>(&self, field: &Value, matcher: F) -> bool
    where
        F: Fn(&str, &str) -> bool,
    {
        match (as_text(field), as_text(&self.operand)) {
            (Some(s), Some(v)) => matcher(&s.to_lowercase(), &v.to_lowercase()),
            _ => false,
        }
    }
}

/// Equality that treats `1`, `1.0` and `"1"` as equal (ID inputs arrive as
/// either strings or integers).
fn loose_eq(field: &Value, operand: &Value) -> bool {
    match (field, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        (a, b) => a == b,
    }
}

fn compare(field: &Value, operand: &Value) -> Option<Ordering> {
    match (field, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Applies conditions, then offset and limit, preserving input order.
pub fn execute<'a>(
    rows: impl IntoIterator<Item = &'a Record>,
    conditions: &[QueryFilter],
    options: &QueryOptions,
) -> Vec<Record> {
    let offset = options.offset.unwrap_or(0) as usize;
    let limit = options.limit.map_or(usize::MAX, |l| l as usize);

    rows.into_iter()
        .filter(|row| conditions.iter().all(|c| c.matches(row)))
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(value: Value) -> Filter {
        match value {
            Value::Object(map) => map,
            _ => panic!("filter must be an object"),
        }
    }

    fn rows() -> Vec<Record> {
        vec![
            json!({"id": 1, "name": "Alice", "total": 10.5}),
            json!({"id": 2, "name": "Bob", "total": 3}),
            json!({"id": 3, "name": "Alina", "total": 7}),
        ]
    }

    fn ids(result: &[Record]) -> Vec<i64> {
        result.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[test]
    fn test_parse_operators() {
        let conditions =
            QueryFilter::parse_all(&filter(json!({"total": {"gt": 5, "lte": 10}}))).unwrap();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].op, FilterOp::Gt);
        assert_eq!(conditions[1].op, FilterOp::Lte);
    }

    #[test]
    fn test_parse_rejects_unknown_operator() {
        let result = QueryFilter::parse_all(&filter(json!({"total": {"between": [1, 2]}})));
        assert!(result.is_err());
    }

    #[test]
    fn test_scalar_shorthand_is_eq() {
        let conditions = QueryFilter::parse_all(&filter(json!({"name": "Bob"}))).unwrap();
        assert_eq!(conditions[0].op, FilterOp::Eq);
        assert_eq!(ids(&execute(&rows(), &conditions, &QueryOptions::new())), vec![2]);
    }

    #[test]
    fn test_numeric_comparisons() {
        let data = rows();
        let gt = QueryFilter::parse_all(&filter(json!({"total": {"gt": 5}}))).unwrap();
        assert_eq!(ids(&execute(&data, &gt, &QueryOptions::new())), vec![1, 3]);

        let lte = QueryFilter::parse_all(&filter(json!({"total": {"lte": 7}}))).unwrap();
        assert_eq!(ids(&execute(&data, &lte, &QueryOptions::new())), vec![2, 3]);
    }

    #[test]
    fn test_membership() {
        let data = rows();
        let within = QueryFilter::parse_all(&filter(json!({"id": {"in": [1, 3]}}))).unwrap();
        assert_eq!(ids(&execute(&data, &within, &QueryOptions::new())), vec![1, 3]);

        let outside = QueryFilter::parse_all(&filter(json!({"id": {"nin": ["1"]}}))).unwrap();
        assert_eq!(ids(&execute(&data, &outside, &QueryOptions::new())), vec![2, 3]);
    }

    #[test]
    fn test_text_operators() {
        let data = rows();
        let prefix = QueryFilter::parse_all(&filter(json!({"name": {"startsWith": "al"}}))).unwrap();
        assert_eq!(ids(&execute(&data, &prefix, &QueryOptions::new())), vec![1, 3]);

        let suffix = QueryFilter::parse_all(&filter(json!({"name": {"endsWith": "ob"}}))).unwrap();
        assert_eq!(ids(&execute(&data, &suffix, &QueryOptions::new())), vec![2]);

        let infix = QueryFilter::parse_all(&filter(json!({"name": {"contains": "LIN"}}))).unwrap();
        assert_eq!(ids(&execute(&data, &infix, &QueryOptions::new())), vec![3]);
    }

    #[test]
    fn test_ne_matches_missing_columns() {
        let data = vec![json!({"id": 1}), json!({"id": 2, "name": "Bob"})];
        let ne = QueryFilter::parse_all(&filter(json!({"name": {"ne": "Bob"}}))).unwrap();
        assert_eq!(ids(&execute(&data, &ne, &QueryOptions::new())), vec![1]);
    }

    #[test]
    fn test_pagination() {
        let data = rows();
        let opts = QueryOptions::new().with_offset(1).with_limit(1);
        assert_eq!(ids(&execute(&data, &[], &opts)), vec![2]);

        let opts = QueryOptions::new().with_offset(5);
        assert!(execute(&data, &[], &opts).is_empty());
    }
}
