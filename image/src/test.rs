use super::*;
use std::io::Cursor;

#[test]
fn round_trips_through_a_file() {
    let path = std::env::temp_dir().join("coder-image-test-round-trip.img");
    let cells = vec![0, 1, -1, 42, i32::MIN, i32::MAX];

    write_file(&path, &cells).unwrap();
    let read_back = read_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(read_back, cells);
}

#[test]
fn read_accepts_any_whitespace_as_a_separator() {
    let cells = read(Cursor::new("1  2\t3\n\n4\n")).unwrap();
    assert_eq!(cells, vec![1, 2, 3, 4]);
}

#[test]
fn read_stops_at_end_of_stream_without_padding() {
    let cells = read(Cursor::new("5 6 7")).unwrap();
    assert_eq!(cells, vec![5, 6, 7]);
}

#[test]
fn read_rejects_non_integer_tokens() {
    let err = read(Cursor::new("1 two 3")).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn write_emits_one_value_per_line() {
    let mut buf = Vec::new();
    write(&[10, -20, 30], &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "10\n-20\n30\n");
}

#[test]
fn extension_traits_match_the_free_functions() {
    let mut buf = Vec::new();
    buf.write_image(&[1, 2, 3]).unwrap();
    let cells = Cursor::new(buf).read_image().unwrap();
    assert_eq!(cells, vec![1, 2, 3]);
}
