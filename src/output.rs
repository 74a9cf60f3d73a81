//! Console output for the command line.
//!
//! Everything the binary prints goes through [`OutputFormatter`]. The library
//! modules return values and errors and never print themselves.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashMap};

/// Styled console messages, the run progress bar and the end-of-run summary.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Green check mark followed by `message`.
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Sorted 12 entries");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Red cross followed by `message`, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Bold heading preceded by a blank line.
    pub fn header(title: &str) {
        println!("\n{}", title.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{} {}", "[DRY RUN]".yellow().bold(), message.yellow());
    }

    /// Progress bar counting sorted entries. The message slot shows the
    /// entry currently being moved.
    pub fn create_progress_bar(total_entries: u64) -> ProgressBar {
        let style = ProgressStyle::with_template(
            "{spinner:.green} sorting [{bar:30.green/white}] {pos}/{len} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        ProgressBar::new(total_entries).with_style(style)
    }

    /// Prints how many entries went into each destination folder.
    ///
    /// Nested destinations such as `Images/jpg` are listed under their
    /// top-level folder, which carries the subtotal.
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let counts = HashMap::from([
    ///     ("Images/jpg".to_string(), 8),
    ///     ("Images/png".to_string(), 2),
    ///     ("Text/txt".to_string(), 3),
    /// ]);
    /// OutputFormatter::summary_table(&counts, 13);
    /// ```
    pub fn summary_table(destination_counts: &HashMap<String, usize>, total_entries: usize) {
        Self::header("SUMMARY");

        let rows = summary_rows(destination_counts);
        let width = rows
            .iter()
            .map(|row| row.label.chars().count() + 2 * row.depth)
            .max()
            .unwrap_or(0)
            .max("Total".len());

        for row in &rows {
            let label = format!("{}{}", "  ".repeat(row.depth), row.label);
            if row.depth == 0 {
                println!("{:<width$}  {}", label.bold(), row.count.to_string().green());
            } else {
                println!("{:<width$}  {}", label, row.count.to_string().dimmed());
            }
        }

        println!("{}", "─".repeat(width + 8));
        println!(
            "{:<width$}  {} {}",
            "Total".bold(),
            total_entries.to_string().green().bold(),
            if total_entries == 1 { "entry" } else { "entries" }
        );
    }
}

/// One line of the summary table.
#[derive(Debug, PartialEq, Eq)]
struct SummaryRow {
    label: String,
    depth: usize,
    count: usize,
}

/// Groups `Top/rest` destination labels under `Top`, sorted by name.
///
/// A top-level folder gets no child rows when all of its entries went
/// straight into it.
fn summary_rows(destination_counts: &HashMap<String, usize>) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for (label, count) in destination_counts {
        let (top, rest) = label.split_once('/').unwrap_or((label.as_str(), ""));
        *groups.entry(top).or_default().entry(rest).or_insert(0) += count;
    }

    let mut rows = Vec::new();
    for (top, children) in groups {
        rows.push(SummaryRow {
            label: top.to_string(),
            depth: 0,
            count: children.values().sum(),
        });
        if children.len() == 1 && children.contains_key("") {
            continue;
        }
        for (rest, count) in children {
            rows.push(SummaryRow {
                label: if rest.is_empty() { ".".to_string() } else { rest.to_string() },
                depth: 1,
                count,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, depth: usize, count: usize) -> SummaryRow {
        SummaryRow {
            label: label.to_string(),
            depth,
            count,
        }
    }

    #[test]
    fn test_summary_rows_flat_labels() {
        let counts = HashMap::from([("txt".to_string(), 2), ("pdf".to_string(), 1)]);
        assert_eq!(summary_rows(&counts), vec![row("pdf", 0, 1), row("txt", 0, 2)]);
    }

    #[test]
    fn test_summary_rows_groups_nested_labels() {
        let counts = HashMap::from([
            ("Images/png".to_string(), 1),
            ("Text/txt".to_string(), 3),
            ("Images/jpg".to_string(), 2),
            ("Images/jpg/March 2024".to_string(), 4),
        ]);
        assert_eq!(
            summary_rows(&counts),
            vec![
                row("Images", 0, 7),
                row("jpg", 1, 2),
                row("jpg/March 2024", 1, 4),
                row("png", 1, 1),
                row("Text", 0, 3),
                row("txt", 1, 3),
            ]
        );
    }

    #[test]
    fn test_summary_rows_mixed_depths() {
        let counts = HashMap::from([("Other".to_string(), 1), ("Other/zip".to_string(), 2)]);
        assert_eq!(
            summary_rows(&counts),
            vec![row("Other", 0, 3), row(".", 1, 1), row("zip", 1, 2)]
        );
    }
}
