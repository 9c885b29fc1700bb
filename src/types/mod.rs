mod args;
mod row;
mod sql_value;

pub use args::Args;
pub use row::{RawQueryResult, ResultSet, Row};
pub use sql_value::SqlValue;
