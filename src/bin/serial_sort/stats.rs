use std::collections::BTreeMap;
use std::time::Instant;

use crate::category::Category;

/// Counters accumulated over one batch run.
/// Created at run start, updated once per file, read once at summary time.
#[derive(Debug)]
pub struct RunStats {
    start: Instant,
    pub processed: usize,
    pub moved: usize,
    pub skipped: usize,
    prefix_counts: BTreeMap<String, usize>,
    category_counts: BTreeMap<Category, usize>,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            processed: 0,
            moved: 0,
            skipped: 0,
            prefix_counts: BTreeMap::new(),
            category_counts: BTreeMap::new(),
        }
    }

    pub fn record_prefix(&mut self, prefix: &str) {
        *self.prefix_counts.entry(prefix.to_string()).or_insert(0) += 1;
    }

    pub fn record_category(&mut self, category: Category) {
        *self.category_counts.entry(category).or_insert(0) += 1;
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Average seconds per file; zero when no files were processed.
    pub fn average_seconds(&self) -> f64 {
        if self.processed > 0 {
            self.elapsed_seconds() / self.processed as f64
        } else {
            0.0
        }
    }

    /// Fixed-format summary block, one line per entry, without timestamps.
    /// `destination` adds the single-category line for explicit-destination runs.
    /// `breakdown` adds the per-prefix and per-category tables.
    pub fn summary_lines(&self, destination: Option<Category>, breakdown: bool) -> Vec<String> {
        let ruler = "=".repeat(40);
        let elapsed = self.elapsed_seconds() as u64;
        let (minutes, seconds) = (elapsed / 60, elapsed % 60);

        let mut lines = vec![
            ruler.clone(),
            format!("Total files processed: {}", self.processed),
            format!("Total files moved: {}", self.moved),
            format!("Total files skipped: {}", self.skipped),
            format!("Total time taken: {minutes} minute(s) {seconds} second(s)"),
            format!("Average time per file: {:.2} second(s)", self.average_seconds()),
            ruler.clone(),
        ];

        if let Some(category) = destination {
            lines.push(format!("All files were moved to: {}", category.folder_name()));
            lines.push(ruler.clone());
        }

        if breakdown {
            if !self.prefix_counts.is_empty() {
                lines.push("Files by prefix:".to_string());
                lines.extend(
                    self.prefix_counts
                        .iter()
                        .map(|(prefix, count)| format!("  {prefix}: {count} file(s)")),
                );
            }
            if !self.category_counts.is_empty() {
                lines.push("Files by category:".to_string());
                lines.extend(
                    self.category_counts
                        .iter()
                        .map(|(category, count)| format!("  {category}: {count} file(s)")),
                );
            }
            lines.push(ruler);
        }

        lines
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
