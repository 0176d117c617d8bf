// file: src/extractor/docx.rs
// description: text extraction from DOCX resumes via the WordprocessingML body
// reference: https://docs.rs/quick-xml, https://docs.rs/zip

use crate::error::{PipelineError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_docx_text(path: &Path) -> Result<String> {
    let start = Instant::now();
    let file_name = path.display().to_string();

    let file = File::open(path).map_err(|source| PipelineError::FileOperation {
        path: path.to_path_buf(),
        source,
    })?;

    let mut archive =
        ZipArchive::new(file).map_err(|e| PipelineError::extraction(&file_name, e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| PipelineError::extraction(&file_name, format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)?;

    let text = document_xml_to_text(&xml)
        .map_err(|e| PipelineError::extraction(&file_name, e))?;

    debug!(
        "DOCX extraction for {}: {:.3}s",
        file_name,
        start.elapsed().as_secs_f64()
    );

    Ok(text.trim().to_string())
}

/// Flatten a `word/document.xml` body into plain text.
///
/// Text runs (`w:t`) are copied verbatim, `w:tab` becomes a tab, `w:br`/`w:cr`
/// become newlines and every paragraph ends with a newline.
pub fn document_xml_to_text(xml: &str) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if in_run => text.push('\t'),
                b"br" | b"cr" if in_run => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
