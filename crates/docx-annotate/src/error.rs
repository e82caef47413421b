use document_extract::ExtractError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Failed to read or write document package: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Document package is missing part: {0}")]
    MissingPart(String),

    #[error("Document part has no body element")]
    MissingBody,

    #[error("Not a word-processing package: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to finalize output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl From<quick_xml::events::attributes::AttrError> for AnnotateError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        AnnotateError::Xml(err.into())
    }
}

impl From<ExtractError> for AnnotateError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Archive(e) => AnnotateError::Archive(e),
            ExtractError::Xml(e) => AnnotateError::Xml(e),
            ExtractError::MissingPart(part) => AnnotateError::MissingPart(part),
            ExtractError::MissingBody => AnnotateError::MissingBody,
            ExtractError::Io(e) => AnnotateError::Io(e),
            other => AnnotateError::Unsupported(other.to_string()),
        }
    }
}
