//! MeSH descriptor record types
//!
//! Plain value records, one per XML element kind. Every field has an
//! explicit unset value: empty string, `None` for dates, `false` for
//! flags, empty list for collections.

use chrono::NaiveDate;
use serde::Serialize;

/// A MeSH Descriptor Record (`<DescriptorRecord>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DescriptorRecord {
    pub ui: String,
    pub name: String,
    /// `DescriptorClass` attribute ("1" topical, "2" publication type, ...)
    pub descriptor_class: String,
    pub date_created: Option<NaiveDate>,
    pub date_revised: Option<NaiveDate>,
    pub date_established: Option<NaiveDate>,
    pub annotation: String,
    pub history_note: String,
    pub public_mesh_note: String,
    pub allowable_qualifiers: Vec<AllowableQualifier>,
    pub pharm_actions: Vec<PharmacologicalAction>,
    pub tree_numbers: Vec<String>,
    /// Every prefix of every tree number, deduplicated
    pub ancestor_tree_numbers: Vec<AncestorTreeNumber>,
    pub concepts: Vec<Concept>,
}

impl DescriptorRecord {
    /// The concept flagged `PreferredConceptYN="Y"`, if any.
    pub fn preferred_concept(&self) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.is_preferred)
    }

    /// Total number of terms across all concepts.
    pub fn term_count(&self) -> usize {
        self.concepts.iter().map(|c| c.terms.len()).sum()
    }
}

/// A concept within a MeSH Descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Concept {
    pub ui: String,
    pub name: String,
    pub is_preferred: bool,
    pub umls_ui: String,
    pub casn1_name: String,
    pub registry_number: String,
    pub related_registry_numbers: Vec<String>,
    pub scope_note: String,
    pub semantic_types: Vec<SemanticType>,
    pub terms: Vec<Term>,
}

impl Concept {
    /// The term flagged `ConceptPreferredYN="Y"`, if any.
    pub fn preferred_term(&self) -> Option<&Term> {
        self.terms.iter().find(|t| t.is_concept_preferred)
    }
}

/// A term from within a MeSH concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Term {
    pub name: String,
    pub ui: String,
    pub string: String,
    pub is_concept_preferred: bool,
    pub is_record_preferred: bool,
    pub is_permuted: bool,
    pub lexical_tag: String,
    pub date_created: Option<NaiveDate>,
    pub abbreviation: String,
    pub sort_version: String,
    pub entry_version: String,
    pub term_note: String,
    pub thesaurus_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SemanticType {
    pub ui: String,
    pub name: String,
}

/// A pharmacological action, denoting the effects of a MeSH descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PharmacologicalAction {
    pub descriptor_ui: String,
    pub descriptor_name: String,
}

/// Qualifier (subheading) allowed in combination with a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllowableQualifier {
    pub ui: String,
    pub name: String,
    pub abbreviation: String,
}

/// Ancestor of a tree number; distance 0 is the tree number itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AncestorTreeNumber {
    pub distance: usize,
    pub tree: String,
}

impl AncestorTreeNumber {
    /// Number of dot-separated segments in `tree`.
    pub fn depth(&self) -> usize {
        self.tree.split('.').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unset() {
        let term = Term::default();
        assert!(term.name.is_empty());
        assert!(term.lexical_tag.is_empty());
        assert!(term.date_created.is_none());
        assert!(!term.is_concept_preferred);
        assert!(term.thesaurus_ids.is_empty());

        let rec = DescriptorRecord::default();
        assert!(rec.ui.is_empty());
        assert!(rec.date_revised.is_none());
        assert!(rec.ancestor_tree_numbers.is_empty());
    }

    #[test]
    fn preferred_concept_and_term() {
        let rec = DescriptorRecord {
            concepts: vec![
                Concept {
                    ui: "M0000002".to_string(),
                    ..Default::default()
                },
                Concept {
                    ui: "M0000001".to_string(),
                    is_preferred: true,
                    terms: vec![
                        Term {
                            ui: "T000002".to_string(),
                            ..Default::default()
                        },
                        Term {
                            ui: "T000001".to_string(),
                            is_concept_preferred: true,
                            ..Default::default()
                        },
                    ],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let concept = rec.preferred_concept().unwrap();
        assert_eq!(concept.ui, "M0000001");
        assert_eq!(concept.preferred_term().unwrap().ui, "T000001");
        assert_eq!(rec.term_count(), 2);
    }

    #[test]
    fn no_preferred_concept() {
        assert!(DescriptorRecord::default().preferred_concept().is_none());
        assert!(Concept::default().preferred_term().is_none());
    }

    #[test]
    fn ancestor_depth() {
        let a = AncestorTreeNumber {
            distance: 1,
            tree: "C04.588".to_string(),
        };
        assert_eq!(a.depth(), 2);
    }

    #[test]
    fn serializes_dates_as_iso() {
        let term = Term {
            ui: "T000001".to_string(),
            date_created: NaiveDate::from_ymd_opt(1999, 1, 1),
            ..Default::default()
        };
        let json = serde_json::to_string(&term).unwrap();
        assert!(json.contains("\"date_created\":\"1999-01-01\""));
        assert!(json.contains("\"ui\":\"T000001\""));
    }
}
