//! SQL generation module.
//!
//! A type-safe SELECT builder that renders SQLite SQL for the report
//! planner and the paginator:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation

pub mod expr;
pub mod query;
pub mod token;


pub use expr::{
    col, count_star, lit_int, lit_str, table_col, BinaryOperator, Expr, ExprExt, Literal,
};
pub use query::{FromSource, Join, LimitOffset, OrderByExpr, Query, SelectExpr, TableRef};
pub use token::{Token, TokenStream};
