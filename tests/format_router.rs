use tabimport::IngestError;
use tabimport::source::{Delimiter, SourceFormat, WorkbookKind};

#[test]
fn routes_delimited_kinds_by_prefix() {
    assert_eq!(
        SourceFormat::from_media_type("text/comma-separated-values").unwrap(),
        SourceFormat::Delimited(Delimiter::Comma)
    );
    assert_eq!(
        SourceFormat::from_media_type("text/tab-separated-values").unwrap(),
        SourceFormat::Delimited(Delimiter::Tab)
    );
    assert_eq!(
        SourceFormat::from_media_type("text/semicolon-separated-values").unwrap(),
        SourceFormat::Delimited(Delimiter::Semicolon)
    );
}

#[test]
fn tolerates_content_type_parameters() {
    assert_eq!(
        SourceFormat::from_media_type("text/comma-separated-values; charset=UTF-8").unwrap(),
        SourceFormat::Delimited(Delimiter::Comma)
    );
}

#[test]
fn routes_workbook_kinds() {
    assert_eq!(
        SourceFormat::from_media_type("application/xls").unwrap(),
        SourceFormat::Workbook(WorkbookKind::Xls)
    );
    assert_eq!(
        SourceFormat::from_media_type("application/xlsx").unwrap(),
        SourceFormat::Workbook(WorkbookKind::Xlsx)
    );
    assert_eq!(
        SourceFormat::from_media_type("application/ods").unwrap(),
        SourceFormat::Workbook(WorkbookKind::Ods)
    );
}

#[test]
fn unknown_media_type_fails_closed() {
    let err = SourceFormat::from_media_type("application/unknown").unwrap_err();
    match err {
        IngestError::FormatUnsupported { media_type } => {
            assert_eq!(media_type, "application/unknown");
        }
        other => panic!("expected FormatUnsupported, got {other:?}"),
    }
}

#[test]
fn empty_media_type_fails_closed() {
    assert!(matches!(
        SourceFormat::from_media_type(""),
        Err(IngestError::FormatUnsupported { .. })
    ));
}

#[test]
fn plain_text_is_not_routable() {
    // Only the whitelisted separated-values types route; bare text/plain does not.
    assert!(matches!(
        SourceFormat::from_media_type("text/plain"),
        Err(IngestError::FormatUnsupported { .. })
    ));
}
