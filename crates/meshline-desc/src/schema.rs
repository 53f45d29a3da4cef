//! Arrow schema for the MeSH descriptors table
//!
//! One row per descriptor. Nested structures that do not flatten well
//! (concepts with their terms, ancestor pairs) are carried as JSON.

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema};

pub static DESCRIPTORS: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        // === Identity ===
        Field::new("descriptor_ui", DataType::Utf8, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("descriptor_class", DataType::Utf8, true),
        // === Dates ===
        Field::new("date_created", DataType::Date32, true),
        Field::new("date_revised", DataType::Date32, true),
        Field::new("date_established", DataType::Date32, true),
        // === Hierarchy ===
        Field::new("tree_numbers", list_utf8(), true),
        Field::new("ancestor_trees", list_utf8(), true),
        Field::new("ancestors_json", DataType::Utf8, true),
        // === Cross references ===
        Field::new("pharm_action_uis", list_utf8(), true),
        // === Concepts ===
        Field::new("preferred_term", DataType::Utf8, true),
        Field::new("scope_note", DataType::Utf8, true),
        Field::new("concept_count", DataType::Int32, false),
        Field::new("term_count", DataType::Int32, false),
        Field::new("concepts_json", DataType::Utf8, true),
    ]))
});

/// Helper: create List<Utf8> type
fn list_utf8() -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
}

pub fn descriptors() -> &'static Schema {
    &DESCRIPTORS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_expected_fields() {
        let schema = descriptors();
        assert!(schema.field_with_name("descriptor_ui").is_ok());
        assert!(schema.field_with_name("tree_numbers").is_ok());
        assert!(schema.field_with_name("concepts_json").is_ok());
        assert_eq!(
            schema.field_with_name("date_created").unwrap().data_type(),
            &DataType::Date32
        );
    }
}
