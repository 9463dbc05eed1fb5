//! Tab-separated rendering of category listings and contingency tables.

use crate::aggregate::AggregateTable;
use crate::categories::CategoryReporter;
use crate::contingency::ContingencyResult;
use std::io::{self, Write};

/// Writes `marker_a marker_b`, the column header and one line per row category.
///
/// The header starts with a tab and every column category is followed by a
/// tab. The block ends with an empty line.
pub fn write_two_way<W: Write>(
    out: &mut W,
    marker_a: &str,
    marker_b: &str,
    result: &ContingencyResult,
) -> io::Result<()> {
    writeln!(out, "{} {}", marker_a, marker_b)?;
    let mut header = String::from("\t");
    for category in result.column_categories() {
        header.push_str(category);
        header.push('\t');
    }
    writeln!(out, "{}", header)?;

    for (i, category) in result.row_categories().iter().enumerate() {
        let mut line = category.clone();
        for count in result.counts().row(i) {
            line.push('\t');
            line.push_str(&count.to_string());
        }
        writeln!(out, "{}", line)?;
    }
    writeln!(out)
}

/// Same as `write_two_way`, preceded by the `marker = category` condition.
pub fn write_three_way<W: Write>(
    out: &mut W,
    condition_marker: &str,
    condition_category: &str,
    marker_a: &str,
    marker_b: &str,
    result: &ContingencyResult,
) -> io::Result<()> {
    writeln!(out, "{} = {}", condition_marker, condition_category)?;
    write_two_way(out, marker_a, marker_b, result)
}

/// One `marker: category, category` line per joined marker.
pub fn write_categories<W: Write>(out: &mut W, table: &AggregateTable) -> io::Result<()> {
    for (marker, categories) in table.all_categories() {
        let categories: Vec<&str> = categories.into_iter().collect();
        writeln!(out, "{}: {}", marker, categories.join(", "))?;
    }
    writeln!(out)
}
