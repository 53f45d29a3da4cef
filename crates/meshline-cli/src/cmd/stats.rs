//! Stats subcommand - descriptor counts and tree category breakdown

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, CellAlignment, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use meshline_core::{SharedProgress, fmt_num};
use meshline_desc::{DescriptorRecord, ParseError, parse_mesh};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// MeSH descriptor XML file (plain or .gz)
    pub input: PathBuf,

    /// Maximum number of descriptors to read
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

/// Aggregate counts over a descriptor stream
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub descriptors: usize,
    pub concepts: usize,
    pub terms: usize,
    pub tree_numbers: usize,
    pub without_trees: usize,
    pub pharm_actions: usize,
    /// Deepest tree number, counted in segments
    pub max_depth: usize,
    /// Descriptors per top-level category letter (A = Anatomy, C = Diseases, ...)
    pub categories: BTreeMap<char, usize>,
}

impl Stats {
    pub fn add(&mut self, rec: &DescriptorRecord) {
        self.descriptors += 1;
        self.concepts += rec.concepts.len();
        self.terms += rec.term_count();
        self.tree_numbers += rec.tree_numbers.len();
        self.pharm_actions += rec.pharm_actions.len();
        if rec.tree_numbers.is_empty() {
            self.without_trees += 1;
        }

        let mut seen = Vec::new();
        for tree in &rec.tree_numbers {
            self.max_depth = self.max_depth.max(tree.split('.').count());
            if let Some(c) = tree.chars().next() {
                if !seen.contains(&c) {
                    seen.push(c);
                    *self.categories.entry(c).or_default() += 1;
                }
            }
        }
    }

    pub fn collect<I>(records: I) -> Result<Self, ParseError>
    where
        I: Iterator<Item = Result<DescriptorRecord, ParseError>>,
    {
        let mut stats = Self::default();
        for rec in records {
            stats.add(&rec?);
        }
        Ok(stats)
    }
}

pub fn run(args: StatsArgs, progress: &SharedProgress) -> Result<()> {
    let stream = parse_mesh(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let limit = args.limit.unwrap_or(usize::MAX);

    let pb = progress.stage_line("stats");
    pb.set_message("descriptors");
    let stats = Stats::collect(stream.take(limit).inspect(|_| pb.inc(1)))
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    pb.finish_and_clear();

    super::print_table(
        "Descriptors",
        &[
            ("Descriptors", fmt_num(stats.descriptors)),
            ("Concepts", fmt_num(stats.concepts)),
            ("Terms", fmt_num(stats.terms)),
            ("Tree numbers", fmt_num(stats.tree_numbers)),
            ("Without tree numbers", fmt_num(stats.without_trees)),
            ("Pharmacological actions", fmt_num(stats.pharm_actions)),
            ("Max tree depth", stats.max_depth.to_string()),
        ],
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Category").fg(Color::Cyan),
            Cell::new("Descriptors").fg(Color::Cyan),
        ]);
    for (category, count) in &stats.categories {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(fmt_num(*count)).set_alignment(CellAlignment::Right),
        ]);
    }
    eprintln!("\n{table}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(trees: &[&str]) -> DescriptorRecord {
        DescriptorRecord {
            tree_numbers: trees.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn counts_categories_once_per_descriptor() {
        let mut stats = Stats::default();
        stats.add(&rec(&["C04.588.443", "C06.301"]));
        stats.add(&rec(&["A01"]));
        stats.add(&rec(&[]));

        assert_eq!(stats.descriptors, 3);
        assert_eq!(stats.tree_numbers, 3);
        assert_eq!(stats.without_trees, 1);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.categories.get(&'C'), Some(&1));
        assert_eq!(stats.categories.get(&'A'), Some(&1));
    }

    #[test]
    fn collect_from_stream() {
        let doc = r#"<DescriptorRecordSet>
            <DescriptorRecord><DescriptorUI>D1</DescriptorUI>
              <TreeNumberList><TreeNumber>D03.633</TreeNumber></TreeNumberList>
              <ConceptList><Concept PreferredConceptYN="Y"><ConceptUI>M1</ConceptUI>
                <TermList><Term><TermUI>T1</TermUI></Term><Term><TermUI>T2</TermUI></Term></TermList>
              </Concept></ConceptList>
            </DescriptorRecord>
            </DescriptorRecordSet>"#;
        let stream = meshline_desc::DescriptorStream::from_reader(doc.as_bytes());
        let stats = Stats::collect(stream).unwrap();
        assert_eq!(stats.descriptors, 1);
        assert_eq!(stats.concepts, 1);
        assert_eq!(stats.terms, 2);
        assert_eq!(stats.max_depth, 2);
    }

    #[test]
    fn collect_propagates_errors() {
        let stream = meshline_desc::DescriptorStream::from_reader(
            "<DescriptorRecordSet><DescriptorRecord>".as_bytes(),
        );
        assert!(Stats::collect(stream).is_err());
    }
}
