//! Pure SQL fragment builders shared by the batch operations.
//!
//! Table and column names are caller-trusted and interpolated verbatim;
//! identifier quoting and escaping are out of scope.

use super::Combinator;

/// Builds the INSERT prefix: `INSERT INTO <table>(<c1,...,cn>) VALUES`
pub(crate) fn insert_prefix(table: &str, columns: &[&str]) -> String {
    format!("INSERT INTO {}({}) VALUES", table, columns.join(","))
}

/// Builds one parenthesized value group: `(?,...,?)` with a placeholder per
/// column.
pub(crate) fn insert_row_group(column_count: usize) -> String {
    format!("({})", vec!["?"; column_count].join(","))
}

/// Builds the UPDATE prefix: `UPDATE <table> SET <c1>=?,...,<ck>=? WHERE `
pub(crate) fn update_prefix(table: &str, update_columns: &[&str]) -> String {
    let assignments =
        update_columns.iter().map(|col| format!("{}=?", col)).collect::<Vec<_>>().join(",");
    format!("UPDATE {} SET {} WHERE ", table, assignments)
}

/// Builds the DELETE prefix: `DELETE FROM <table> WHERE `
pub(crate) fn delete_prefix(table: &str) -> String {
    format!("DELETE FROM {} WHERE ", table)
}

/// Builds one row's condition group, pairing every condition column with a
/// placeholder: `<c1>=? <AND|OR> <c2>=? ...`
pub(crate) fn condition_group<S: AsRef<str>>(columns: &[S], combinator: Combinator) -> String {
    columns
        .iter()
        .map(|col| format!("{}=?", col.as_ref()))
        .collect::<Vec<_>>()
        .join(&format!(" {} ", combinator.as_sql()))
}
