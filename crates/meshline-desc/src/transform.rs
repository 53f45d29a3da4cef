//! Transform DescriptorRecord to Arrow RecordBatch

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};

use crate::record::{AncestorTreeNumber, Concept, DescriptorRecord};
use crate::schema;

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Accumulator for building RecordBatches from DescriptorRecords
pub struct DescriptorAccumulator {
    schema: &'static Schema,
    descriptor_ui: Vec<String>,
    name: Vec<String>,
    descriptor_class: Vec<Option<String>>,
    date_created: Vec<Option<i32>>,
    date_revised: Vec<Option<i32>>,
    date_established: Vec<Option<i32>>,
    tree_numbers: Vec<Option<Vec<Option<String>>>>,
    ancestor_trees: Vec<Option<Vec<Option<String>>>>,
    ancestors_json: Vec<Option<String>>,
    pharm_action_uis: Vec<Option<Vec<Option<String>>>>,
    preferred_term: Vec<Option<String>>,
    scope_note: Vec<Option<String>>,
    concept_count: Vec<i32>,
    term_count: Vec<i32>,
    concepts_json: Vec<Option<String>>,
}

impl DescriptorAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            schema: schema::descriptors(),
            descriptor_ui: Vec::with_capacity(capacity),
            name: Vec::with_capacity(capacity),
            descriptor_class: Vec::with_capacity(capacity),
            date_created: Vec::with_capacity(capacity),
            date_revised: Vec::with_capacity(capacity),
            date_established: Vec::with_capacity(capacity),
            tree_numbers: Vec::with_capacity(capacity),
            ancestor_trees: Vec::with_capacity(capacity),
            ancestors_json: Vec::with_capacity(capacity),
            pharm_action_uis: Vec::with_capacity(capacity),
            preferred_term: Vec::with_capacity(capacity),
            scope_note: Vec::with_capacity(capacity),
            concept_count: Vec::with_capacity(capacity),
            term_count: Vec::with_capacity(capacity),
            concepts_json: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, rec: DescriptorRecord) {
        let preferred = rec.preferred_concept();
        self.preferred_term.push(
            preferred
                .and_then(Concept::preferred_term)
                .map(|t| t.name.clone()),
        );
        self.scope_note
            .push(preferred.and_then(|c| non_empty(c.scope_note.clone())));
        self.concept_count.push(to_i32(rec.concepts.len()));
        self.term_count.push(to_i32(rec.term_count()));
        self.concepts_json.push(concepts_to_json(&rec.concepts));

        self.ancestor_trees
            .push(distinct_trees(&rec.ancestor_tree_numbers));
        self.ancestors_json
            .push(ancestors_to_json(&rec.ancestor_tree_numbers));
        self.pharm_action_uis.push(to_list(
            rec.pharm_actions.into_iter().map(|pa| pa.descriptor_ui),
        ));
        self.tree_numbers.push(to_list(rec.tree_numbers.into_iter()));

        self.date_created.push(rec.date_created.map(epoch_days));
        self.date_revised.push(rec.date_revised.map(epoch_days));
        self.date_established
            .push(rec.date_established.map(epoch_days));

        self.descriptor_class.push(non_empty(rec.descriptor_class));
        self.name.push(rec.name);
        self.descriptor_ui.push(rec.ui);
    }

    pub fn len(&self) -> usize {
        self.descriptor_ui.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptor_ui.is_empty()
    }

    pub fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.descriptor_ui))),
            Arc::new(StringArray::from(std::mem::take(&mut self.name))),
            Arc::new(StringArray::from(std::mem::take(
                &mut self.descriptor_class,
            ))),
            Arc::new(Date32Array::from(std::mem::take(&mut self.date_created))),
            Arc::new(Date32Array::from(std::mem::take(&mut self.date_revised))),
            Arc::new(Date32Array::from(std::mem::take(
                &mut self.date_established,
            ))),
            build_list_string_array(std::mem::take(&mut self.tree_numbers)),
            build_list_string_array(std::mem::take(&mut self.ancestor_trees)),
            Arc::new(StringArray::from(std::mem::take(&mut self.ancestors_json))),
            build_list_string_array(std::mem::take(&mut self.pharm_action_uis)),
            Arc::new(StringArray::from(std::mem::take(&mut self.preferred_term))),
            Arc::new(StringArray::from(std::mem::take(&mut self.scope_note))),
            Arc::new(Int32Array::from(std::mem::take(&mut self.concept_count))),
            Arc::new(Int32Array::from(std::mem::take(&mut self.term_count))),
            Arc::new(StringArray::from(std::mem::take(&mut self.concepts_json))),
        ];

        RecordBatch::try_new(Arc::new((*self.schema).clone()), arrays)
    }
}

impl Default for DescriptorAccumulator {
    fn default() -> Self {
        Self::new(0)
    }
}

fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn to_list(items: impl Iterator<Item = String>) -> Option<Vec<Option<String>>> {
    let list: Vec<Option<String>> = items.map(Some).collect();
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

/// Distinct ancestor trees (any distance), first-seen order
fn distinct_trees(ancestors: &[AncestorTreeNumber]) -> Option<Vec<Option<String>>> {
    let mut seen = rustc_hash::FxHashSet::default();
    to_list(
        ancestors
            .iter()
            .filter(|a| seen.insert(a.tree.as_str()))
            .map(|a| a.tree.clone()),
    )
}

fn ancestors_to_json(ancestors: &[AncestorTreeNumber]) -> Option<String> {
    if ancestors.is_empty() {
        return None;
    }
    Some(serde_json::to_string(ancestors).unwrap_or_default())
}

fn concepts_to_json(concepts: &[Concept]) -> Option<String> {
    if concepts.is_empty() {
        return None;
    }
    Some(serde_json::to_string(concepts).unwrap_or_default())
}

/// Build List<Utf8> array from Vec<Option<Vec<Option<String>>>>
fn build_list_string_array(data: Vec<Option<Vec<Option<String>>>>) -> ArrayRef {
    let mut builder = ListBuilder::new(StringBuilder::new());
    for row in &data {
        match row {
            Some(items) => {
                for item in items {
                    match item {
                        Some(s) => builder.values().append_value(s),
                        None => builder.values().append_null(),
                    }
                }
                builder.append(true);
            }
            None => builder.append(false),
        }
    }
    Arc::new(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PharmacologicalAction, Term};
    use crate::tree::ancestor_tree_numbers;

    fn sample() -> DescriptorRecord {
        let tree_numbers = vec!["D03.633.100".to_string(), "D03.633.200".to_string()];
        DescriptorRecord {
            ui: "D000001".to_string(),
            name: "Calcimycin".to_string(),
            descriptor_class: "1".to_string(),
            date_created: NaiveDate::from_ymd_opt(1974, 11, 19),
            ancestor_tree_numbers: ancestor_tree_numbers(&tree_numbers),
            tree_numbers,
            pharm_actions: vec![PharmacologicalAction {
                descriptor_ui: "D000900".to_string(),
                descriptor_name: String::new(),
            }],
            concepts: vec![Concept {
                ui: "M0000001".to_string(),
                is_preferred: true,
                scope_note: "An ionophore.".to_string(),
                terms: vec![Term {
                    name: "Calcimycin".to_string(),
                    is_concept_preferred: true,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn epoch_days_known_values() {
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1);
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()), -1);
        assert_eq!(
            epoch_days(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
            10_957
        );
    }

    #[test]
    fn accumulator_basic() {
        let mut acc = DescriptorAccumulator::new(8);
        assert!(acc.is_empty());

        acc.push(sample());
        assert_eq!(acc.len(), 1);

        let batch = acc.take_batch().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), schema::descriptors().fields().len());
        assert!(acc.is_empty());
    }

    #[test]
    fn accumulator_values() {
        let mut acc = DescriptorAccumulator::default();
        acc.push(sample());
        acc.push(DescriptorRecord {
            ui: "D000002".to_string(),
            ..Default::default()
        });
        let batch = acc.take_batch().unwrap();

        let uis = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(uis.value(0), "D000001");
        assert_eq!(uis.value(1), "D000002");

        let class = batch
            .column_by_name("descriptor_class")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(class.value(0), "1");
        assert!(class.is_null(1));

        let preferred = batch
            .column_by_name("preferred_term")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(preferred.value(0), "Calcimycin");
        assert!(preferred.is_null(1));

        let trees = batch.column_by_name("tree_numbers").unwrap();
        assert!(trees.is_valid(0));
        assert!(trees.is_null(1));

        let terms = batch
            .column_by_name("term_count")
            .unwrap()
            .as_any()
            .downcast_ref::<Int32Array>()
            .unwrap();
        assert_eq!(terms.value(0), 1);
        assert_eq!(terms.value(1), 0);
    }

    #[test]
    fn distinct_trees_collapses_distances() {
        let ancestors = ancestor_tree_numbers(&["A01.111", "A01.222.333"]);
        let trees = distinct_trees(&ancestors).unwrap();
        let a01 = trees
            .iter()
            .filter(|t| t.as_deref() == Some("A01"))
            .count();
        assert_eq!(a01, 1);
        assert_eq!(trees.len(), 4);
    }

    #[test]
    fn json_helpers_empty() {
        assert!(ancestors_to_json(&[]).is_none());
        assert!(concepts_to_json(&[]).is_none());
    }

    #[test]
    fn ancestors_json_has_distance() {
        let json = ancestors_to_json(&ancestor_tree_numbers(&["C04"])).unwrap();
        assert_eq!(json, r#"[{"distance":0,"tree":"C04"}]"#);
    }

    #[test]
    fn build_list_string_array_with_nulls() {
        let data: Vec<Option<Vec<Option<String>>>> = vec![
            None,
            Some(vec![Some("a".to_string()), None, Some("b".to_string())]),
            None,
        ];
        let arr = build_list_string_array(data);
        assert_eq!(arr.len(), 3);
    }
}
