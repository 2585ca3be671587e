use bytes::Bytes;
use tabimport::source::{Delimiter, RowSource, SourceFormat};

fn open(input: &str, delimiter: Delimiter) -> RowSource {
    RowSource::open(
        Bytes::copy_from_slice(input.as_bytes()),
        SourceFormat::Delimited(delimiter),
    )
    .unwrap()
}

fn collect_rows(source: RowSource) -> Vec<Vec<String>> {
    source.into_rows().collect::<Result<Vec<_>, _>>().unwrap()
}

#[test]
fn first_record_is_header_rest_are_rows() {
    let source = open("id,name,score\n1,Ada,98.5\n2,Grace,87.25\n", Delimiter::Comma);
    assert_eq!(source.headers(), ["id", "name", "score"]);

    let rows = collect_rows(source);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], ["1", "Ada", "98.5"]);
    assert_eq!(rows[1], ["2", "Grace", "87.25"]);
}

#[test]
fn tab_delimiter() {
    let source = open("id\tname\n1\tAda\n", Delimiter::Tab);
    assert_eq!(source.headers(), ["id", "name"]);
    assert_eq!(collect_rows(source), [["1", "Ada"]]);
}

#[test]
fn semicolon_delimiter() {
    let source = open("id;name\n1;Ada\n", Delimiter::Semicolon);
    assert_eq!(source.headers(), ["id", "name"]);
    assert_eq!(collect_rows(source), [["1", "Ada"]]);
}

#[test]
fn short_rows_pad_trailing_columns_as_missing() {
    let source = open("id,name,score\n1,Ada\n2\n", Delimiter::Comma);
    let rows = collect_rows(source);
    assert_eq!(rows[0], ["1", "Ada", ""]);
    assert_eq!(rows[1], ["2", "", ""]);
}

#[test]
fn long_rows_truncate_to_header_width() {
    let source = open("id,name\n1,Ada,extra,cells\n", Delimiter::Comma);
    assert_eq!(collect_rows(source), [["1", "Ada"]]);
}

#[test]
fn sample_stops_at_limit() {
    let mut input = String::from("id\n");
    for i in 0..10 {
        input.push_str(&format!("{i}\n"));
    }
    let source = open(&input, Delimiter::Comma);
    let (headers, sample) = source.sample(3).unwrap();
    assert_eq!(headers, ["id"]);
    assert_eq!(sample, [["0"], ["1"], ["2"]]);
}

#[test]
fn sample_reads_everything_under_limit() {
    let source = open("id\n1\n2\n", Delimiter::Comma);
    let (_, sample) = source.sample(500).unwrap();
    assert_eq!(sample.len(), 2);
}

#[test]
fn reopening_the_buffered_payload_yields_the_same_rows() {
    let payload = Bytes::from_static(b"id,name\n1,Ada\n2,Grace\n");
    let format = SourceFormat::Delimited(Delimiter::Comma);

    let first = collect_rows(RowSource::open(payload.clone(), format).unwrap());
    let second = collect_rows(RowSource::open(payload, format).unwrap());
    assert_eq!(first, second);
}
