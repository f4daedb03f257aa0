use runwatch::stream::{LineAssembler, StreamDecoder};

#[test]
fn emits_only_complete_lines_and_keeps_the_tail() {
    let mut asm = LineAssembler::new();

    assert_eq!(asm.feed("hel"), Vec::<String>::new());
    assert_eq!(asm.partial(), "hel");

    assert_eq!(asm.feed("lo\nwor"), vec!["hello"]);
    assert_eq!(asm.partial(), "wor");

    assert_eq!(asm.feed("ld\n\nnext"), vec!["world", ""]);
    assert_eq!(asm.partial(), "next");
}

#[test]
fn unterminated_final_fragment_is_dropped_at_end_of_stream() {
    let mut asm = LineAssembler::new();
    assert_eq!(asm.feed("done\npartial"), vec!["done"]);

    assert_eq!(asm.finish().as_deref(), Some("partial"));
    assert_eq!(asm.partial(), "");
    assert_eq!(asm.finish(), None);
}

#[test]
fn crlf_terminators_are_not_part_of_the_line() {
    let mut asm = LineAssembler::new();
    let mut lines = asm.feed("a\r");
    lines.extend(asm.feed("\nb\r\nc\n"));
    assert_eq!(lines, vec!["a", "b", "c"]);
}

#[test]
fn reset_clears_the_partial_line() {
    let mut asm = LineAssembler::new();
    asm.feed("stale");
    asm.reset();
    assert_eq!(asm.feed("fresh\n"), vec!["fresh"]);
}

#[test]
fn decoder_carries_split_multibyte_characters() {
    // "▶️" is E2 96 B6 EF B8 8F.
    let bytes = "▶️ go\n".as_bytes();
    let mut decoder = StreamDecoder::new();

    let first = decoder.decode(&bytes[..1]).unwrap();
    assert_eq!(first, "");
    assert_eq!(decoder.pending_len(), 1);

    let second = decoder.decode(&bytes[1..4]).unwrap();
    assert_eq!(second, "▶");
    assert_eq!(decoder.pending_len(), 1);

    let rest = decoder.decode(&bytes[4..]).unwrap();
    assert_eq!(format!("{first}{second}{rest}"), "▶️ go\n");
    assert_eq!(decoder.pending_len(), 0);
}

#[test]
fn decoder_reports_and_drops_malformed_bytes() {
    let mut decoder = StreamDecoder::new();
    decoder.decode(b"ok\n").unwrap();

    let err = decoder.decode(b"ab\xFFcd").unwrap_err();
    assert_eq!(err.decoded, "ab");
    assert_eq!(err.position, 5);
    assert_eq!(err.invalid_len, 1);

    // Bytes after the malformed sequence are still delivered.
    assert_eq!(decoder.decode(b"\n").unwrap(), "cd\n");
}

#[test]
fn decoder_finish_drops_incomplete_trailing_sequence() {
    let mut decoder = StreamDecoder::new();
    let euro = "€".as_bytes();
    assert_eq!(decoder.decode(&euro[..2]).unwrap(), "");
    assert_eq!(decoder.finish(), 2);
    assert_eq!(decoder.pending_len(), 0);
}
