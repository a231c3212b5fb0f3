use std::fmt;

use crate::ast::SortDirection;
use crate::catalog::Column;

/// One entry of a parsed order-by expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SortInfo {
    pub column: Column,
    pub direction: SortDirection,
}

impl fmt::Display for SortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column.name, self.direction)
    }
}
