//! Error type for MeSH descriptor parsing

/// Error from reading or mapping a MeSH descriptor file.
///
/// I/O and XML errors come from the underlying reader; the remaining
/// variants are structural failures raised while building a record.
/// Unknown tags and attributes are never an error.
#[derive(Debug)]
pub enum ParseError {
    /// Input file could not be opened or read
    Io(std::io::Error),
    /// Ill-formed XML at the point the reader reached
    Xml(quick_xml::Error),
    /// Document ended inside an open element
    UnexpectedEof { element: String },
    /// Input ended without any element (empty file, plain text)
    NoRootElement,
    /// Required child element absent (dates only)
    MissingField {
        element: String,
        field: &'static str,
    },
    /// Child text is not an integer
    InvalidNumber { field: &'static str, value: String },
    /// Year/Month/Day do not form a calendar date
    InvalidDate { year: i32, month: u32, day: u32 },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::Xml(e) => write!(f, "XML: {e}"),
            Self::UnexpectedEof { element } => {
                write!(f, "unexpected end of document inside <{element}>")
            }
            Self::NoRootElement => write!(f, "no root element found"),
            Self::MissingField { element, field } => {
                write!(f, "<{element}> is missing <{field}>")
            }
            Self::InvalidNumber { field, value } => {
                write!(f, "<{field}> is not an integer: {value:?}")
            }
            Self::InvalidDate { year, month, day } => {
                write!(f, "invalid date {year:04}-{month:02}-{day:02}")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Xml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e)
    }
}

impl ParseError {
    /// Whether the error came from the XML layer rather than record mapping.
    pub fn is_malformed_xml(&self) -> bool {
        matches!(
            self,
            Self::Xml(_) | Self::UnexpectedEof { .. } | Self::NoRootElement
        )
    }
}
