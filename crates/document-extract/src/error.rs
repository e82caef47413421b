use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to open document package: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Document package is missing part: {0}")]
    MissingPart(String),

    #[error("Document part has no body element")]
    MissingBody,

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Password-protected PDF")]
    PasswordProtected,

    #[error("Unsupported file type: {0} (expected .docx or .pdf)")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::events::attributes::AttrError> for ExtractError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ExtractError::Xml(err.into())
    }
}
