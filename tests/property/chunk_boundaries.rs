use proptest::prelude::*;
use runwatch::engine::SessionCore;
use runwatch::protocol::RunPayload;
use runwatch::stream::{LineAssembler, SentinelClassifier, StreamDecoder};
use runwatch::types::RunPhase;

// Lines mixing ASCII with multi-byte characters so that random cuts land
// inside encodings.
fn line_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just("a".to_string()),
            Just("ö".to_string()),
            Just("€".to_string()),
            Just("▶️".to_string()),
            Just("🔩".to_string()),
            Just(" ".to_string()),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

// Split `bytes` at the given (unsorted, possibly repeated) cut points.
fn split_at_cuts(bytes: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut points: Vec<usize> = cuts
        .iter()
        .map(|c| if bytes.is_empty() { 0 } else { c % (bytes.len() + 1) })
        .collect();
    points.push(0);
    points.push(bytes.len());
    points.sort_unstable();
    points.dedup();

    points
        .windows(2)
        .map(|w| bytes[w[0]..w[1]].to_vec())
        .collect()
}

proptest! {
    #[test]
    fn test_decoder_and_assembler_ignore_chunk_boundaries(
        lines in proptest::collection::vec(line_strategy(), 0..8),
        tail in line_strategy(),
        cuts in proptest::collection::vec(any::<usize>(), 0..16),
    ) {
        let mut text = String::new();
        for line in &lines {
            text.push_str(line);
            text.push('\n');
        }
        text.push_str(&tail);

        let mut decoder = StreamDecoder::new();
        let mut assembler = LineAssembler::new();
        let mut seen = Vec::new();
        for chunk in split_at_cuts(text.as_bytes(), &cuts) {
            let decoded = decoder.decode(&chunk).unwrap();
            seen.extend(assembler.feed(&decoded));
        }

        prop_assert_eq!(decoder.pending_len(), 0);
        prop_assert_eq!(&seen, &lines);
        prop_assert_eq!(assembler.partial(), tail.as_str());
    }

    #[test]
    fn test_log_is_identical_for_any_split(
        lines in proptest::collection::vec(line_strategy(), 1..8),
        cuts in proptest::collection::vec(any::<usize>(), 0..16),
    ) {
        let mut text = String::new();
        for line in &lines {
            text.push_str(line);
            text.push('\n');
        }

        let mut core = SessionCore::new(SentinelClassifier::default());
        core.begin("http://fake.local", RunPayload::new("D")).unwrap();
        for chunk in split_at_cuts(text.as_bytes(), &cuts) {
            core.ingest(&chunk);
        }
        core.end_of_stream();

        prop_assert_eq!(core.phase(), RunPhase::Completed);
        prop_assert_eq!(core.log(), text.as_str());
    }

    #[test]
    fn test_sentinel_detected_for_any_split(
        before in line_strategy(),
        description in line_strategy(),
        cuts in proptest::collection::vec(any::<usize>(), 0..16),
    ) {
        let text = format!("{before}\n▶️ NEED_CONFIRM {description}\nafter\n");

        let mut core = SessionCore::new(SentinelClassifier::default());
        core.begin("http://fake.local", RunPayload::new("D")).unwrap();
        for chunk in split_at_cuts(text.as_bytes(), &cuts) {
            core.ingest(&chunk);
        }

        prop_assert_eq!(core.phase(), RunPhase::AwaitingConfirmation);
        prop_assert_eq!(
            core.pending_confirmation().map(|r| r.description.clone()),
            Some(description)
        );
        let expected_log = format!("{before}\n");
        prop_assert_eq!(core.log(), expected_log.as_str());
    }
}
