//! Query state evaluated by the filter engine

/// Sentinel meaning "no filter" for type and location
pub const ALL_FILTER: &str = "all";

/// Exact-match filter on a single field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldFilter {
    /// Accept every value
    #[default]
    All,
    /// Accept only this exact value (case-sensitive)
    Exact(String),
}

impl FieldFilter {
    /// Parse a filter value where [`ALL_FILTER`] means no filter
    pub fn parse(value: &str) -> Self {
        if value == ALL_FILTER {
            FieldFilter::All
        } else {
            FieldFilter::Exact(value.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            FieldFilter::All => true,
            FieldFilter::Exact(expected) => expected == value,
        }
    }

    /// The filter value as shown in a dropdown
    pub fn as_str(&self) -> &str {
        match self {
            FieldFilter::All => ALL_FILTER,
            FieldFilter::Exact(value) => value,
        }
    }
}

impl From<&str> for FieldFilter {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Text plus structured filters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub text: String,
    pub type_filter: FieldFilter,
    pub location_filter: FieldFilter,
}

impl SearchQuery {
    /// Query with free text only
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, filter: impl Into<FieldFilter>) -> Self {
        self.type_filter = filter.into();
        self
    }

    pub fn with_location(mut self, filter: impl Into<FieldFilter>) -> Self {
        self.location_filter = filter.into();
        self
    }

    /// Whether the free-text part is empty
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}
