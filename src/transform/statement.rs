//! SQL `INSERT` statement assembly.

/// Literal emitted for empty values.
pub const NULL_LITERAL: &str = "NULL";

/// Accumulates one record as a column list and a value list.
///
/// ```
/// use zipset::transform::statement::StatementBuilder;
///
/// let mut builder = StatementBuilder::new();
/// builder.begin("Customer");
/// builder.push_field("name", "Alice");
/// builder.push_field("city", "\n   ");
/// assert_eq!(
///     builder.finish(),
///     "INSERT INTO Customer (name, city) VALUES ( 'Alice', NULL ); "
/// );
/// ```
#[derive(Debug, Default, Clone)]
pub struct StatementBuilder {
    header: String,
    body: String,
    fields: usize,
}

impl StatementBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new record for `table`, discarding anything accumulated.
    pub fn begin(&mut self, table: &str) {
        self.clear();
        self.header.push_str("INSERT INTO ");
        self.header.push_str(table);
        self.header.push_str(" (");
        self.body.push_str("VALUES ( ");
    }

    /// Appends one column and its rendered value.
    pub fn push_field(&mut self, column: &str, raw_value: &str) {
        if self.fields > 0 {
            self.header.push_str(", ");
            self.body.push_str(", ");
        }
        self.header.push_str(column);
        self.body.push_str(&render_value(raw_value));
        self.fields += 1;
    }

    /// Number of columns in the current record.
    pub fn field_count(&self) -> usize {
        self.fields
    }

    /// Closes the record and returns the statement. The builder is left empty.
    pub fn finish(&mut self) -> String {
        self.header.push_str(") ");
        self.body.push_str(" ); ");
        let mut statement = std::mem::take(&mut self.header);
        statement.push_str(&self.body);
        self.clear();
        statement
    }

    /// Drops the current record.
    pub fn clear(&mut self) {
        self.header.clear();
        self.body.clear();
        self.fields = 0;
    }
}

/// Renders a raw field value as an SQL literal.
///
/// Values that are blank or contain a newline lose every whitespace
/// character and are emitted bare (`NULL` when nothing is left). Anything else
/// is wrapped in single quotes as-is; embedded quotes are not escaped.
pub fn render_value(raw: &str) -> String {
    if raw.contains('\n') || raw.trim().is_empty() {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            NULL_LITERAL.to_string()
        } else {
            compact
        }
    } else {
        format!("'{}'", raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_value() {
        assert_eq!(render_value("Alice"), "'Alice'");
        assert_eq!(render_value(" padded "), "' padded '");
        assert_eq!(render_value(""), "NULL");
        assert_eq!(render_value(" \t "), "NULL");
        assert_eq!(render_value("\n  42\n"), "42");
        assert_eq!(render_value("a b\nc"), "abc");
        assert_eq!(render_value("O'Brien"), "'O'Brien'");
    }

    #[test]
    fn test_single_field_shape() {
        let mut builder = StatementBuilder::new();
        builder.begin("Customer");
        builder.push_field("name", "Alice");
        assert_eq!(
            builder.finish(),
            "INSERT INTO Customer (name) VALUES ( 'Alice' ); "
        );
        assert_eq!(builder.field_count(), 0);
    }

    #[test]
    fn test_begin_resets() {
        let mut builder = StatementBuilder::new();
        builder.begin("T");
        builder.push_field("a", "1");
        builder.begin("T");
        builder.push_field("b", "2");
        assert_eq!(builder.finish(), "INSERT INTO T (b) VALUES ( '2' ); ");
    }

    #[test]
    fn test_empty_record() {
        let mut builder = StatementBuilder::new();
        builder.begin("T");
        assert_eq!(builder.finish(), "INSERT INTO T () VALUES (  ); ");
    }
}
