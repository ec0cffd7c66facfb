use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::push_bounded;
use crate::error::{GatherError, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// Concatenates `w:t` runs, with a space after each `w:p` paragraph, until `budget` characters.
pub(super) fn extract_docx_text(path: &Path, budget: usize) -> Result<String> {
    let file = File::open(path).map_err(|error| GatherError::extraction(path, error))?;
    let mut archive = ZipArchive::new(file).map_err(|error| GatherError::extraction(path, error))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|error| GatherError::extraction(path, error))?;

    let mut reader = Reader::from_reader(BufReader::new(part));
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut chars = 0usize;
    let mut in_run_text = false;

    loop {
        let full = match reader
            .read_event_into(&mut buf)
            .map_err(|error| GatherError::extraction(path, error))?
        {
            Event::Start(start) => {
                if start.name().as_ref() == b"w:t" {
                    in_run_text = true;
                }
                false
            }
            Event::Empty(empty) => match empty.name().as_ref() {
                b"w:tab" | b"w:br" => push_bounded(&mut text, &mut chars, " ", budget),
                _ => false,
            },
            Event::Text(run) if in_run_text => {
                let value = run
                    .unescape()
                    .map_err(|error| GatherError::extraction(path, error))?;
                push_bounded(&mut text, &mut chars, &value, budget)
            }
            Event::End(end) => match end.name().as_ref() {
                b"w:t" => {
                    in_run_text = false;
                    false
                }
                b"w:p" => push_bounded(&mut text, &mut chars, " ", budget),
                _ => false,
            },
            Event::Eof => break,
            _ => false,
        };
        if full {
            break;
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_docx(path: &Path, paragraphs: &[&str]) {
        let mut body = String::new();
        for paragraph in paragraphs {
            body.push_str(&format!("<w:p><w:r><w:t>{paragraph}</w:t></w:r></w:p>"));
        }
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let file = fs::File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn paragraphs_are_joined_by_spaces() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("minutes.docx");
        write_docx(&path, &["Q3 Results", "Budget &amp; plan"]);

        let text = extract_docx_text(&path, 1000).unwrap();
        assert_eq!(text, "Q3 Results Budget & plan ");
    }

    #[test]
    fn extraction_stops_at_budget() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("long.docx");
        write_docx(&path, &["abcdefghij", "klmnopqrst"]);

        let text = extract_docx_text(&path, 12).unwrap();
        assert_eq!(text, "abcdefghij k");
    }

    #[test]
    fn non_zip_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fake.docx");
        fs::write(&path, "plain text pretending").unwrap();

        assert!(matches!(
            extract_docx_text(&path, 100),
            Err(GatherError::Extraction { .. })
        ));
    }
}
