use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("invalid keyword in this line: {0}")]
    InvalidKeyword(String),

    #[error("invalid {field} value: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("missing required specification field: {0}")]
    MissingField(&'static str),

    #[error("data section keyword {found:?} does not match EDGE_WEIGHT_TYPE {expected_for}")]
    SectionMismatch { found: String, expected_for: &'static str },

    #[error("EDGE_WEIGHT_TYPE is EXPLICIT but EDGE_WEIGHT_FORMAT is missing")]
    MissingEdgeWeightFormat,

    #[error("tour has {found} nodes, expected {expected}")]
    WrongTourLength { found: usize, expected: usize },
}
