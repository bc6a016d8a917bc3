use quick_xml::events::attributes::AttrError;

/// Structural failure while walking a multistatus document.
///
/// `Recoverable` is not an error per se: it tells the caller that the
/// element under the cursor is not the one it was looking for, and that
/// another reader may be tried.
#[derive(Debug)]
pub enum ParsingError {
    Recoverable,
    MissingChild,
    WrongToken,
    InvalidValue,
    Utf8Error(std::str::Utf8Error),
    QuickXml(quick_xml::Error),
    Eof,
}
impl std::fmt::Display for ParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::MissingChild => write!(f, "Missing child"),
            Self::WrongToken => write!(f, "Wrong token"),
            Self::InvalidValue => write!(f, "Invalid value"),
            Self::Utf8Error(_) => write!(f, "Utf8 Error"),
            Self::QuickXml(_) => write!(f, "Quick XML error"),
            Self::Eof => write!(f, "Found EOF while expecting data"),
        }
    }
}
impl std::error::Error for ParsingError {}
impl From<AttrError> for ParsingError {
    fn from(value: AttrError) -> Self {
        Self::QuickXml(value.into())
    }
}
impl From<quick_xml::Error> for ParsingError {
    fn from(value: quick_xml::Error) -> Self {
        Self::QuickXml(value)
    }
}
impl From<std::str::Utf8Error> for ParsingError {
    fn from(value: std::str::Utf8Error) -> Self {
        Self::Utf8Error(value)
    }
}

/// Failure to turn one property element into a typed value.
///
/// Never fatal for a multistatus: the property is left out of the decoded
/// set and the mapper falls back to the field default.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DecodeError {
    #[error("property {0} is not registered")]
    Unknown(String),
    #[error("property element is empty")]
    Empty,
    #[error("invalid integer: {0}")]
    Int(#[from] std::num::ParseIntError),
    #[error("invalid float: {0}")]
    Float(#[from] std::num::ParseFloatError),
    #[error("invalid date: {0}")]
    Date(#[from] chrono::format::ParseError),
    #[error("timestamp {0} is out of range")]
    Timestamp(i64),
    #[error("missing child element {0}")]
    MissingChild(&'static str),
}
