//! Per-column filter input types.
//!
//! For a column `total` of table `Invoice` in tenant `acme`:
//!
//! ```graphql
//! input Tenant_acme_Invoice_WhereInput_total_Filter {
//!   eq: Float
//!   ne: Float
//!   in: [Float]
//!   nin: [Float]
//!   gt: Float
//!   gte: Float
//!   lt: Float
//!   lte: Float
//! }
//! ```

use async_graphql::dynamic::{InputObject, InputValue, TypeRef};
use tracing::trace;

use super::naming::filter_type_name;
use super::scalars::ScalarKind;

/// Operators accepted by every filter.
const BASE_OPERATORS: [&str; 4] = ["eq", "ne", "in", "nin"];

/// Range operators for numeric kinds.
const RANGE_OPERATORS: [&str; 4] = ["gt", "gte", "lt", "lte"];

/// Text operators for identifier and text kinds. Always typed `String`.
const TEXT_OPERATORS: [&str; 3] = ["contains", "startsWith", "endsWith"];

/// Builds the filter input type of a single column.
pub struct FilterTypeBuilder;

impl FilterTypeBuilder {
    /// Returns the operator names legal for a scalar kind, in declaration order.
    pub fn operators(kind: ScalarKind) -> Vec<&'static str> {
        let extra: &[&str] = if kind.is_numeric() {
            &RANGE_OPERATORS
        } else {
            &TEXT_OPERATORS
        };
        BASE_OPERATORS.iter().chain(extra).copied().collect()
    }

    /// Returns the generated type name for a column under `name_prefix`.
    pub fn type_name(column_name: &str, name_prefix: &str) -> String {
        filter_type_name(name_prefix, column_name)
    }

    /// Builds the filter input type for a column.
    ///
    /// `name_prefix` is the table's `where` input name, which is unique per
    /// table within a tenant.
    pub fn build(column_name: &str, storage_type: &str, name_prefix: &str) -> InputObject {
        let kind = ScalarKind::from_column(column_name, storage_type);
        let type_name = Self::type_name(column_name, name_prefix);
        let base = kind.type_name();

        trace!(column = column_name, kind = ?kind, type_name = %type_name, "Building filter type");

        let mut input = InputObject::new(&type_name)
            .description(format!("Filter operators for column '{column_name}'"));

        for op in Self::operators(kind) {
            let type_ref = match op {
                "in" | "nin" => TypeRef::named_list(base),
                "contains" | "startsWith" | "endsWith" => TypeRef::named(TypeRef::STRING),
                _ => TypeRef::named(base),
            };
            input = input.field(InputValue::new(op, type_ref));
        }
        input
    }
}
