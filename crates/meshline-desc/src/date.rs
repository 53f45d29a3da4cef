//! `<Year>/<Month>/<Day>` date fragments

use std::io::BufRead;
use std::str::FromStr;

use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;
use crate::parser::{read_text, skip_element, unexpected_eof};

/// Read a MeSH date element (`DateCreated`, `DateRevised`, ...).
///
/// All three children are required. When a child repeats, the first one wins.
pub fn read_date<R: BufRead>(
    reader: &mut Reader<R>,
    element: &[u8],
) -> Result<NaiveDate, ParseError> {
    let mut year = None;
    let mut month = None;
    let mut day = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Year" => {
                    let text = read_text(reader, b"Year")?;
                    year.get_or_insert(text);
                }
                b"Month" => {
                    let text = read_text(reader, b"Month")?;
                    month.get_or_insert(text);
                }
                b"Day" => {
                    let text = read_text(reader, b"Day")?;
                    day.get_or_insert(text);
                }
                other => skip_element(reader, other)?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(element)),
            _ => {}
        }
        buf.clear();
    }

    let element = String::from_utf8_lossy(element);
    date_from_parts(
        parse_part(year, &element, "Year")?,
        parse_part(month, &element, "Month")?,
        parse_part(day, &element, "Day")?,
    )
}

/// Error for a self-closing date element such as `<DateCreated/>`.
pub fn empty_date(element: &[u8]) -> ParseError {
    ParseError::MissingField {
        element: String::from_utf8_lossy(element).into_owned(),
        field: "Year",
    }
}

/// Validate a Gregorian calendar date.
pub fn date_from_parts(year: i32, month: u32, day: u32) -> Result<NaiveDate, ParseError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseError::InvalidDate { year, month, day })
}

fn parse_part<T: FromStr>(
    text: Option<String>,
    element: &str,
    field: &'static str,
) -> Result<T, ParseError> {
    let text = text.ok_or_else(|| ParseError::MissingField {
        element: element.to_string(),
        field,
    })?;
    text.trim()
        .parse()
        .map_err(|_| ParseError::InvalidNumber { field, value: text })
}
