//! Place-Reference Extractor: pulls `placeName` references and the letter's
//! date out of a parsed document.

use crate::constants::{
    DATE_ATTR, DATE_TAG, DOCUMENT_DATE_INDEX, GETTY_PREFIX_LEN, PLACE_NAME_TAG, REFERENCE_ATTR,
};
use crate::document::{Document, XmlElement};
use crate::error::{PlacenameError, Result};
use crate::types::PlaceReference;
use tracing::{debug, warn};

/// All place references of `doc` in document order. Repeated places are kept.
pub fn place_references(doc: &Document) -> Result<Vec<PlaceReference>> {
    let references = doc
        .elements(PLACE_NAME_TAG)
        .into_iter()
        .map(|element| place_reference(doc, element))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        path = %doc.path().display(),
        "Found {} place references",
        references.len()
    );
    Ok(references)
}

fn place_reference(doc: &Document, element: &XmlElement) -> Result<PlaceReference> {
    let reference = element.attr(REFERENCE_ATTR).ok_or_else(|| {
        PlacenameError::Lookup(format!(
            "<{}> without @{} in {}",
            PLACE_NAME_TAG,
            REFERENCE_ATTR,
            doc.path().display()
        ))
    })?;
    let identifier = strip_reference_prefix(reference).ok_or_else(|| {
        PlacenameError::Lookup(format!(
            "@{}=\"{}\" in {} carries no identifier after its {}-character prefix",
            REFERENCE_ATTR,
            reference,
            doc.path().display(),
            GETTY_PREFIX_LEN
        ))
    })?;

    let name = collapse_whitespace(&element.text());
    if name.is_empty() {
        warn!(
            path = %doc.path().display(),
            identifier,
            "Place reference has no text, emitting an empty name"
        );
    }

    Ok(PlaceReference {
        name,
        reference: reference.to_string(),
        identifier: identifier.to_string(),
    })
}

/// Drops the fixed-length prefix (`tgn/`) from a reference attribute.
/// Returns `None` when nothing is left.
pub fn strip_reference_prefix(reference: &str) -> Option<&str> {
    let (offset, _) = reference.char_indices().nth(GETTY_PREFIX_LEN)?;
    Some(&reference[offset..])
}

/// The `when-iso` value of the date element at `DOCUMENT_DATE_INDEX`.
pub fn document_date(doc: &Document) -> Result<String> {
    let dates = doc.elements(DATE_TAG);
    let date = dates.get(DOCUMENT_DATE_INDEX).ok_or_else(|| {
        PlacenameError::Lookup(format!(
            "{} has {} <{}> element(s), need at least {}",
            doc.path().display(),
            dates.len(),
            DATE_TAG,
            DOCUMENT_DATE_INDEX + 1
        ))
    })?;
    date.attr(DATE_ATTR)
        .map(str::to_string)
        .ok_or_else(|| {
            PlacenameError::Lookup(format!(
                "<{}> #{} in {} has no @{}",
                DATE_TAG,
                DOCUMENT_DATE_INDEX + 1,
                doc.path().display(),
                DATE_ATTR
            ))
        })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(body: &str) -> Document {
        let xml = format!(
            r#"<TEI><teiHeader><date when-iso="1875-03-10"/><date when-iso="1875-03-02"/></teiHeader><text>{body}</text></TEI>"#
        );
        Document::parse("letter.xml", xml).unwrap()
    }

    #[test]
    fn strips_exactly_four_characters() {
        assert_eq!(strip_reference_prefix("tgn/7014135"), Some("7014135"));
        assert_eq!(strip_reference_prefix("TGN:7014135"), Some("7014135"));
        assert_eq!(strip_reference_prefix("tgn/"), None);
        assert_eq!(strip_reference_prefix("tg"), None);
    }

    #[test]
    fn prefix_is_counted_in_characters() {
        assert_eq!(strip_reference_prefix("tgné12"), Some("12"));
        assert_eq!(strip_reference_prefix("ééééx"), Some("x"));
    }

    #[test]
    fn keeps_document_order_and_duplicates() {
        let doc = letter(
            r#"<p><placeName ref="tgn/7000874">Rome</placeName>, <placeName ref="tgn/7008038">Paris</placeName>, <placeName ref="tgn/7000874">Rom</placeName></p>"#,
        );
        let refs = place_references(&doc).unwrap();
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        let ids: Vec<_> = refs.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(names, vec!["Rome", "Paris", "Rom"]);
        assert_eq!(ids, vec!["7000874", "7008038", "7000874"]);
        assert_eq!(refs[0].reference, "tgn/7000874");
    }

    #[test]
    fn nested_markup_and_whitespace_are_flattened() {
        let doc = letter("<placeName ref=\"tgn/7000874\">\n  <hi>New</hi>\n  York </placeName>");
        let refs = place_references(&doc).unwrap();
        assert_eq!(refs[0].name, "New York");
    }

    #[test]
    fn empty_place_name_is_kept() {
        let doc = letter(r#"<placeName ref="tgn/7000874"/>"#);
        let refs = place_references(&doc).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "");
    }

    #[test]
    fn missing_ref_is_lookup_error() {
        let doc = letter("<placeName>Rome</placeName>");
        let err = place_references(&doc).unwrap_err();
        assert!(matches!(err, PlacenameError::Lookup(_)), "{err}");
    }

    #[test]
    fn short_ref_is_lookup_error() {
        let doc = letter(r#"<placeName ref="tgn/">Rome</placeName>"#);
        assert!(matches!(
            place_references(&doc).unwrap_err(),
            PlacenameError::Lookup(_)
        ));
    }

    #[test]
    fn no_place_names_yields_nothing() {
        let doc = letter("<p>No places here.</p>");
        assert!(place_references(&doc).unwrap().is_empty());
    }

    #[test]
    fn date_is_taken_from_second_date_element() {
        let doc = letter("");
        assert_eq!(document_date(&doc).unwrap(), "1875-03-02");
    }

    #[test]
    fn later_dates_are_ignored() {
        let xml = r#"<TEI><date when-iso="1"/><date when-iso="2"/><p><date when-iso="3"/></p></TEI>"#;
        let doc = Document::parse("letter.xml", xml.to_string()).unwrap();
        assert_eq!(document_date(&doc).unwrap(), "2");
    }

    #[test]
    fn single_date_is_lookup_error() {
        let xml = r#"<TEI><date when-iso="1875-03-02"/></TEI>"#;
        let doc = Document::parse("letter.xml", xml.to_string()).unwrap();
        let err = document_date(&doc).unwrap_err();
        assert!(matches!(err, PlacenameError::Lookup(_)), "{err}");
    }

    #[test]
    fn second_date_without_when_iso_is_lookup_error() {
        let xml = r#"<TEI><date when-iso="1875-03-10"/><date>March</date></TEI>"#;
        let doc = Document::parse("letter.xml", xml.to_string()).unwrap();
        assert!(matches!(
            document_date(&doc).unwrap_err(),
            PlacenameError::Lookup(_)
        ));
    }

    #[test]
    fn partial_dates_pass_through() {
        let xml = r#"<TEI><date when-iso="1875"/><date when-iso="1875-03"/></TEI>"#;
        let doc = Document::parse("letter.xml", xml.to_string()).unwrap();
        assert_eq!(document_date(&doc).unwrap(), "1875-03");
    }
}
