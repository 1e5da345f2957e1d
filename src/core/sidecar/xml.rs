//! Metadata XML descriptor parsing
//!
//! Elements are matched by local name so any namespace prefix works.

use crate::domain::errors::SeqferryError;
use crate::domain::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Identifiers read from a metadata XML descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarMetadata {
    pub movie_name: String,
    pub run_name: String,
    pub well_label: String,
    pub plate_number: Option<u8>,
    pub barcode: Option<String>,
    pub single_cell: bool,
}

/// Parses a metadata XML document
///
/// # Errors
///
/// Returns a `Sidecar` error if the document is malformed, lacks the movie,
/// run or well, or declares more than one barcode group
pub fn parse_metadata_xml(xml: &str) -> Result<SidecarMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut movie_name: Option<String> = None;
    let mut run_name: Option<String> = None;
    let mut well_label: Option<String> = None;
    let mut plate_number: Option<u8> = None;
    let mut barcode: Option<String> = None;
    let mut barcode_groups = 0usize;
    let mut single_cell = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            SeqferryError::Sidecar(format!(
                "Malformed metadata XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = local_name(e);
                match name.as_str() {
                    "CollectionMetadata" if movie_name.is_none() => {
                        movie_name = attribute(e, "Context")?;
                    }
                    "DNABarcodes" => barcode_groups += 1,
                    "DNABarcode" if barcode.is_none() => {
                        barcode = attribute(e, "Name")?;
                    }
                    "ConsensusReadSet" | "SubreadSet" => {
                        if let Some(tags) = attribute(e, "Tags")? {
                            single_cell |= tags.to_ascii_lowercase().contains("singlecell");
                        }
                    }
                    _ => {}
                }
                if matches!(event, Event::Start(_)) {
                    stack.push(name);
                }
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map_err(|e| SeqferryError::Sidecar(format!("Bad text in metadata XML: {e}")))?;
                let text = text.trim();
                let current = stack.last().map(String::as_str);
                let parent = stack.len().checked_sub(2).map(|i| stack[i].as_str());

                match (parent, current) {
                    (Some("RunDetails"), Some("Name")) if run_name.is_none() => {
                        run_name = Some(text.to_string());
                    }
                    (Some("WellSample"), Some("WellName")) if well_label.is_none() => {
                        well_label = Some(text.to_string());
                    }
                    (Some("WellSample"), Some("PlateNumber")) if plate_number.is_none() => {
                        plate_number = Some(text.parse().map_err(|_| {
                            SeqferryError::Sidecar(format!("Invalid plate number '{text}'"))
                        })?);
                    }
                    (_, Some("SingleCell")) => {
                        single_cell |= text.eq_ignore_ascii_case("true");
                    }
                    _ => {}
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if barcode_groups > 1 {
        return Err(SeqferryError::Sidecar(format!(
            "Metadata XML declares {barcode_groups} barcode groups, expected at most one"
        )));
    }

    Ok(SidecarMetadata {
        movie_name: required(movie_name, "CollectionMetadata@Context")?,
        run_name: required(run_name, "RunDetails/Name")?,
        well_label: required(well_label, "WellSample/WellName")?,
        plate_number,
        barcode,
        single_cell,
    })
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SeqferryError::Sidecar(format!("Bad attribute: {err}")))?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| SeqferryError::Sidecar(format!("Bad attribute {name}: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SeqferryError::Sidecar(format!("Metadata XML has no {what}")))
}
