use std::fmt;

/// Operation of a criteria clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// `eq`, `=`, `==`
    Equals,
    /// `ne`, `!=`, `<>`
    NotEquals,
    /// `gt`, `>`
    GreaterThan,
    /// `ge`, `>=`
    GreaterOrEqual,
    /// `lt`, `<`
    LessThan,
    /// `le`, `<=`
    LessOrEqual,
    /// `contains`, case-insensitive
    Contains,
    /// `startswith`, case-insensitive
    StartsWith,
    /// `endswith`, case-insensitive
    EndsWith,
    /// `is null`
    IsNull,
    /// `is not null`
    IsNotNull,
}

impl OperationType {
    /// Operations that only make sense on text.
    pub fn is_text_search(&self) -> bool {
        matches!(
            self,
            OperationType::Contains | OperationType::StartsWith | OperationType::EndsWith
        )
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            OperationType::Equals => "eq",
            OperationType::NotEquals => "ne",
            OperationType::GreaterThan => "gt",
            OperationType::GreaterOrEqual => "ge",
            OperationType::LessThan => "lt",
            OperationType::LessOrEqual => "le",
            OperationType::Contains => "contains",
            OperationType::StartsWith => "startswith",
            OperationType::EndsWith => "endswith",
            OperationType::IsNull => "is null",
            OperationType::IsNotNull => "is not null",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// How a clause combines with the next sibling in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Conjunction {
    And,
    Or,
    /// Last clause of a sequence.
    #[default]
    None,
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conjunction::And => f.write_str("and"),
            Conjunction::Or => f.write_str("or"),
            Conjunction::None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}
