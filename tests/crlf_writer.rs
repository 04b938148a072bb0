// tests/crlf_writer.rs

use std::io::Write;

use watchrun::report::CrlfWriter;

fn translate(chunks: &[&[u8]]) -> Vec<u8> {
    let mut writer = CrlfWriter::new(Vec::new());
    for chunk in chunks {
        writer.write_all(chunk).unwrap();
    }
    writer.into_inner()
}

#[test]
fn bare_newlines_gain_a_carriage_return() {
    assert_eq!(translate(&[b"one\ntwo\n"]), b"one\r\ntwo\r\n");
    assert_eq!(translate(&[b"\n\n"]), b"\r\n\r\n");
}

#[test]
fn existing_crlf_is_left_alone() {
    assert_eq!(translate(&[b"dos\r\nunix\n"]), b"dos\r\nunix\r\n");
}

#[test]
fn crlf_split_across_writes() {
    assert_eq!(translate(&[b"line\r", b"\nnext"]), b"line\r\nnext");
    assert_eq!(translate(&[b"line", b"\n"]), b"line\r\n");
}

#[test]
fn text_without_newlines_passes_through() {
    assert_eq!(translate(&[b"\x1b[35m\xe2\x80\xa2\x1b[0m"]), b"\x1b[35m\xe2\x80\xa2\x1b[0m");
    assert_eq!(translate(&[b""]), b"");
}
