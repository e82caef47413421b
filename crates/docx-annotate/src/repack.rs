//! Rewriting a package with a few parts replaced

use std::collections::HashMap;
use std::io::{Cursor, Write};

use document_extract::package::open_package;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::AnnotateError;

/// Copy `bytes` entry by entry, substituting the parts in `replaced`.
///
/// Untouched entries keep their compressed bytes and order; replaced entries
/// are deflated in place and `appended` parts go at the end.
pub fn repack(
    bytes: &[u8],
    replaced: &HashMap<String, String>,
    appended: &[(String, String)],
) -> Result<Vec<u8>, AnnotateError> {
    let mut archive = open_package(bytes)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(bytes.len())));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        let name = entry.name().to_string();
        match replaced.get(&name) {
            Some(content) => {
                drop(entry);
                writer.start_file(name, options)?;
                writer.write_all(content.as_bytes())?;
            }
            None => writer.raw_copy_file(entry)?,
        }
    }

    for (name, content) in appended {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(content.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}
