//! MeSH descriptor XML builders using quick-xml
//!
//! Each builder is called right after the reader has produced the
//! element's `Start` event and consumes events up to and including the
//! matching `End`. Children with unknown tags are skipped as whole
//! subtrees, so identically named tags nested in sections we do not map
//! (`SeeRelatedList`, `EntryCombinationList`, ...) never leak into a
//! record.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::date::{empty_date, read_date};
use crate::error::ParseError;
use crate::record::{
    AllowableQualifier, Concept, DescriptorRecord, PharmacologicalAction, SemanticType, Term,
};
use crate::tree::ancestor_tree_numbers;

/// Create a reader configured the way the builders expect.
pub fn new_reader<R: BufRead>(inner: R) -> Reader<R> {
    let mut reader = Reader::from_reader(inner);
    reader.config_mut().trim_text(true);
    reader
}

/// Build a [`DescriptorRecord`] from a `<DescriptorRecord>` element.
pub fn parse_descriptor<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<DescriptorRecord, ParseError> {
    let mut rec = descriptor_from_attributes(start);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"DescriptorUI" => rec.ui = read_text(reader, b"DescriptorUI")?,
                b"DescriptorName" => {
                    rec.name = read_child_text(reader, b"DescriptorName", b"String")?
                }
                b"DateCreated" => rec.date_created = Some(read_date(reader, b"DateCreated")?),
                b"DateRevised" => rec.date_revised = Some(read_date(reader, b"DateRevised")?),
                b"DateEstablished" => {
                    rec.date_established = Some(read_date(reader, b"DateEstablished")?)
                }
                b"Annotation" => rec.annotation = read_text(reader, b"Annotation")?,
                b"HistoryNote" => rec.history_note = read_text(reader, b"HistoryNote")?,
                b"PublicMeSHNote" => rec.public_mesh_note = read_text(reader, b"PublicMeSHNote")?,
                b"AllowableQualifiersList" => {
                    rec.allowable_qualifiers = parse_list(
                        reader,
                        b"AllowableQualifiersList",
                        b"AllowableQualifier",
                        parse_allowable_qualifier,
                        |_| AllowableQualifier::default(),
                    )?
                }
                b"TreeNumberList" => {
                    rec.tree_numbers = parse_text_list(reader, b"TreeNumberList", b"TreeNumber")?;
                    rec.ancestor_tree_numbers = ancestor_tree_numbers(&rec.tree_numbers);
                }
                b"ConceptList" => {
                    rec.concepts = parse_list(
                        reader,
                        b"ConceptList",
                        b"Concept",
                        parse_concept,
                        concept_from_attributes,
                    )?
                }
                b"PharmacologicalActionList" => {
                    rec.pharm_actions = parse_list(
                        reader,
                        b"PharmacologicalActionList",
                        b"PharmacologicalAction",
                        parse_pharm_action,
                        |_| PharmacologicalAction::default(),
                    )?
                }
                other => skip_element(reader, other)?,
            },
            Event::Empty(e)
                if matches!(
                    e.name().as_ref(),
                    b"DateCreated" | b"DateRevised" | b"DateEstablished"
                ) =>
            {
                return Err(empty_date(e.name().as_ref()));
            }
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(b"DescriptorRecord")),
            _ => {}
        }
        buf.clear();
    }

    Ok(rec)
}

/// Attribute-only part of a descriptor; also used for `<DescriptorRecord/>`.
pub(crate) fn descriptor_from_attributes(start: &BytesStart<'_>) -> DescriptorRecord {
    DescriptorRecord {
        descriptor_class: attr_value(start, b"DescriptorClass").unwrap_or_default(),
        ..Default::default()
    }
}

/// Build a [`Concept`] from a `<Concept>` element.
pub fn parse_concept<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<Concept, ParseError> {
    let mut concept = concept_from_attributes(start);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"ConceptUI" => concept.ui = read_text(reader, b"ConceptUI")?,
                b"ConceptName" => {
                    concept.name = read_child_text(reader, b"ConceptName", b"String")?
                }
                b"ConceptUMLSUI" => concept.umls_ui = read_text(reader, b"ConceptUMLSUI")?,
                b"CASN1Name" => concept.casn1_name = read_text(reader, b"CASN1Name")?,
                b"RegistryNumber" => {
                    concept.registry_number = read_text(reader, b"RegistryNumber")?
                }
                b"RelatedRegistryNumberList" => {
                    concept.related_registry_numbers = parse_text_list(
                        reader,
                        b"RelatedRegistryNumberList",
                        b"RelatedRegistryNumber",
                    )?
                }
                b"ScopeNote" => concept.scope_note = read_text(reader, b"ScopeNote")?,
                b"SemanticTypeList" => {
                    concept.semantic_types = parse_list(
                        reader,
                        b"SemanticTypeList",
                        b"SemanticType",
                        parse_semantic_type,
                        |_| SemanticType::default(),
                    )?
                }
                b"TermList" => {
                    concept.terms =
                        parse_list(reader, b"TermList", b"Term", parse_term, term_from_attributes)?
                }
                other => skip_element(reader, other)?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(b"Concept")),
            _ => {}
        }
        buf.clear();
    }

    Ok(concept)
}

fn concept_from_attributes(start: &BytesStart<'_>) -> Concept {
    Concept {
        is_preferred: is_yes(start, b"PreferredConceptYN"),
        ..Default::default()
    }
}

/// Build a [`Term`] from a `<Term>` element.
pub fn parse_term<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart<'_>,
) -> Result<Term, ParseError> {
    let mut term = term_from_attributes(start);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"TermUI" => term.ui = read_text(reader, b"TermUI")?,
                b"String" => {
                    term.name = read_text(reader, b"String")?;
                    term.string.clone_from(&term.name);
                }
                b"DateCreated" => term.date_created = Some(read_date(reader, b"DateCreated")?),
                b"Abbreviation" => term.abbreviation = read_text(reader, b"Abbreviation")?,
                b"SortVersion" => term.sort_version = read_text(reader, b"SortVersion")?,
                b"EntryVersion" => term.entry_version = read_text(reader, b"EntryVersion")?,
                b"TermNote" => term.term_note = read_text(reader, b"TermNote")?,
                b"ThesaurusIDlist" => {
                    term.thesaurus_ids =
                        parse_text_list(reader, b"ThesaurusIDlist", b"ThesaurusID")?
                }
                other => skip_element(reader, other)?,
            },
            Event::Empty(e) if e.name().as_ref() == b"DateCreated" => {
                return Err(empty_date(b"DateCreated"));
            }
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(b"Term")),
            _ => {}
        }
        buf.clear();
    }

    Ok(term)
}

fn term_from_attributes(start: &BytesStart<'_>) -> Term {
    Term {
        is_concept_preferred: is_yes(start, b"ConceptPreferredYN"),
        is_record_preferred: is_yes(start, b"RecordPreferredYN"),
        is_permuted: is_yes(start, b"IsPermutedTermYN"),
        lexical_tag: attr_value(start, b"LexicalTag").unwrap_or_default(),
        ..Default::default()
    }
}

/// Build a [`SemanticType`] from a `<SemanticType>` element.
pub fn parse_semantic_type<R: BufRead>(
    reader: &mut Reader<R>,
    _start: &BytesStart<'_>,
) -> Result<SemanticType, ParseError> {
    let mut sem_type = SemanticType::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"SemanticTypeUI" => sem_type.ui = read_text(reader, b"SemanticTypeUI")?,
                b"SemanticTypeName" => sem_type.name = read_text(reader, b"SemanticTypeName")?,
                other => skip_element(reader, other)?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(b"SemanticType")),
            _ => {}
        }
        buf.clear();
    }

    Ok(sem_type)
}

/// Build a [`PharmacologicalAction`] from a `<PharmacologicalAction>` element.
pub fn parse_pharm_action<R: BufRead>(
    reader: &mut Reader<R>,
    _start: &BytesStart<'_>,
) -> Result<PharmacologicalAction, ParseError> {
    let mut action = PharmacologicalAction::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"DescriptorReferredTo" => {
                    (action.descriptor_ui, action.descriptor_name) = read_reference(
                        reader,
                        b"DescriptorReferredTo",
                        b"DescriptorUI",
                        b"DescriptorName",
                    )?
                }
                other => skip_element(reader, other)?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(b"PharmacologicalAction")),
            _ => {}
        }
        buf.clear();
    }

    Ok(action)
}

fn parse_allowable_qualifier<R: BufRead>(
    reader: &mut Reader<R>,
    _start: &BytesStart<'_>,
) -> Result<AllowableQualifier, ParseError> {
    let mut qualifier = AllowableQualifier::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"QualifierReferredTo" => {
                    (qualifier.ui, qualifier.name) = read_reference(
                        reader,
                        b"QualifierReferredTo",
                        b"QualifierUI",
                        b"QualifierName",
                    )?
                }
                b"Abbreviation" => qualifier.abbreviation = read_text(reader, b"Abbreviation")?,
                other => skip_element(reader, other)?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(b"AllowableQualifier")),
            _ => {}
        }
        buf.clear();
    }

    Ok(qualifier)
}

/// Read `(UI, Name/String)` out of a `*ReferredTo` element.
fn read_reference<R: BufRead>(
    reader: &mut Reader<R>,
    element: &[u8],
    ui_tag: &[u8],
    name_tag: &[u8],
) -> Result<(String, String), ParseError> {
    let mut ui = String::new();
    let mut name = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = e.name();
                if tag.as_ref() == ui_tag {
                    ui = read_text(reader, ui_tag)?;
                } else if tag.as_ref() == name_tag {
                    name = read_child_text(reader, name_tag, b"String")?;
                } else {
                    skip_element(reader, tag.as_ref())?;
                }
            }
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(element)),
            _ => {}
        }
        buf.clear();
    }

    Ok((ui, name))
}

/// Collect every `item` child of a list element, in document order.
///
/// Self-closing items are built from their attributes alone.
fn parse_list<R: BufRead, T>(
    reader: &mut Reader<R>,
    list: &[u8],
    item: &[u8],
    parse_item: fn(&mut Reader<R>, &BytesStart<'_>) -> Result<T, ParseError>,
    from_empty: fn(&BytesStart<'_>) -> T,
) -> Result<Vec<T>, ParseError> {
    let mut items = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == item => items.push(parse_item(reader, &e)?),
            Event::Empty(e) if e.name().as_ref() == item => items.push(from_empty(&e)),
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(list)),
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

/// Collect the text of every `item` child of a list element, in document order.
fn parse_text_list<R: BufRead>(
    reader: &mut Reader<R>,
    list: &[u8],
    item: &[u8],
) -> Result<Vec<String>, ParseError> {
    let mut values = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == item => values.push(read_text(reader, item)?),
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(list)),
            _ => {}
        }
        buf.clear();
    }

    Ok(values)
}

/// Read the text of the first `child` element, e.g. `DescriptorName/String`.
fn read_child_text<R: BufRead>(
    reader: &mut Reader<R>,
    element: &[u8],
    child: &[u8],
) -> Result<String, ParseError> {
    let mut text = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == child && text.is_none() => {
                text = Some(read_text(reader, child)?);
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(element)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text.unwrap_or_default())
}

/// Read text content up to the end of the current element.
///
/// Text inside nested markup is concatenated.
pub(crate) fn read_text<R: BufRead>(
    reader: &mut Reader<R>,
    element: &[u8],
) -> Result<String, ParseError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(unexpected_eof(element)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Consume events up to the end of the current element.
pub(crate) fn skip_element<R: BufRead>(
    reader: &mut Reader<R>,
    element: &[u8],
) -> Result<(), ParseError> {
    log::trace!("skipping <{}>", String::from_utf8_lossy(element));
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(unexpected_eof(element)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

pub(crate) fn unexpected_eof(element: &[u8]) -> ParseError {
    ParseError::UnexpectedEof {
        element: String::from_utf8_lossy(element).into_owned(),
    }
}

fn attr_value(start: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

/// MeSH `*YN` flag: true only for the literal value `Y`.
fn is_yes(start: &BytesStart<'_>, key: &[u8]) -> bool {
    start
        .attributes()
        .flatten()
        .any(|attr| attr.key.as_ref() == key && &*attr.value == b"Y")
}

/// Position a reader just past the first start tag of `xml`.
#[cfg(test)]
pub(crate) fn open_element(xml: &str) -> (Reader<&[u8]>, BytesStart<'static>) {
    let mut reader = new_reader(xml.as_bytes());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Start(e) => return (reader, e.into_owned()),
            Event::Eof => panic!("no start tag in fixture"),
            _ => {}
        }
        buf.clear();
    }
}
