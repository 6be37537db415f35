//! SQL backend: typed model descriptors, literal coercion and lowering of
//! [`Expr`](crate::dsl::Expr) trees into renderable predicates.

mod coerce;
mod lower;
mod predicate;
mod schema;

pub use coerce::{coerce, is_null};
pub use lower::{Lowerable, filter};
pub use predicate::{BitOp, BoundSql, CompareOp, Operand, Predicate, SqlValue};
pub use schema::{
    ColumnDescriptor, Field, FieldResolver, FieldType, ModelDescriptor, ScalarType, SchemaResolver,
};
