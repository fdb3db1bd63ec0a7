//! End-to-end tests of the conversion pipeline: CSV text in, BWF bytes out.

use markwav::bwf::{sample_position, BwfEncoder, TimeReferencePolicy, CUE_RECORD_LEN};
use markwav::{BextInfo, ConvertRequest, Error, Marker, WavInfo};

use crate::helpers::{le_u32, load_fixture};

const SAMPLE_RATE: u32 = 44_100;

fn song_markers() -> Vec<Marker> {
    ConvertRequest::new("time", vec!["name".to_string()])
        .with_frame_rate(30.0)
        .run(&load_fixture("song.csv"))
        .unwrap()
        .markers
}

/// `(id, payload_start, payload_len)` for every top-level chunk.
fn chunk_table(bytes: &[u8]) -> Vec<(String, usize, usize)> {
    let mut chunks = Vec::new();
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = String::from_utf8_lossy(&bytes[pos..pos + 4]).into_owned();
        let len = le_u32(bytes, pos + 4) as usize;
        chunks.push((id, pos + 8, len));
        pos += 8 + len + len % 2;
    }
    chunks
}

// ============================================================================
// Reference scenario
// ============================================================================

#[test]
fn song_log_produces_expected_layout() {
    let bytes = BwfEncoder::default().encode(&song_markers()).unwrap();

    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(le_u32(&bytes, 4), 18_875_644);
    assert_eq!(bytes.len(), 18_875_652);

    let chunks = chunk_table(&bytes);
    let ids: Vec<&str> = chunks.iter().map(|(id, _, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["fmt ", "bext", "data", "cue ", "LIST"]);
    assert_eq!(chunks[0], ("fmt ".to_string(), 20, 16));
    assert_eq!(chunks[1], ("bext".to_string(), 44, 602));
    assert_eq!(chunks[2], ("data".to_string(), 654, 18_874_800));
    assert_eq!(chunks[3].2, 100);
    assert_eq!(chunks[4].2, 82);
}

#[test]
fn song_log_cue_positions_and_labels() {
    let bytes = BwfEncoder::default().encode(&song_markers()).unwrap();
    let info = WavInfo::from_bytes(&bytes).unwrap();

    let positions: Vec<u32> = info.cues.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![0, 463_050, 3_969_000, 4_652_550]);

    let ids: Vec<u32> = info.cues.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    for cue in &info.cues {
        assert_eq!(cue.data_chunk_id, "data");
        assert_eq!(cue.chunk_start, 0);
        assert_eq!(cue.block_start, 0);
        assert_eq!(cue.sample_offset, cue.position);
    }

    assert_eq!(info.label_for(1), Some("Intro"));
    assert_eq!(info.label_for(2), Some("Verse 1"));
    assert_eq!(info.label_for(3), Some("Chorus"));
    assert_eq!(info.label_for(4), Some("Bridge"));
}

#[test]
fn data_chunk_is_silent() {
    let bytes = BwfEncoder::default()
        .encode(&[Marker::new(1.0, "a")])
        .unwrap();
    let (_, start, len) = chunk_table(&bytes)[2].clone();
    assert_eq!(len, 2 * 44_100 * 4);
    assert!(bytes[start..start + len].iter().all(|&b| b == 0));
}

// ============================================================================
// Empty input
// ============================================================================

#[test]
fn zero_markers_give_ten_seconds_and_empty_cue_list() {
    let conversion = ConvertRequest::new("time", vec!["name".to_string()])
        .allow_empty(true)
        .run(&load_fixture("header_only.csv"))
        .unwrap();
    assert!(conversion.markers.is_empty());

    let bytes = conversion.encode(&BwfEncoder::default()).unwrap();
    let chunks = chunk_table(&bytes);

    assert_eq!(chunks[2].2, 1_764_000);
    let (_, cue_start, cue_len) = chunks[3].clone();
    assert_eq!(cue_len, 4);
    assert_eq!(le_u32(&bytes, cue_start), 0);
    let (_, list_start, list_len) = chunks[4].clone();
    assert_eq!(list_len, 4);
    assert_eq!(&bytes[list_start..list_start + 4], b"adtl");
}

#[test]
fn rows_without_times_are_rejected_by_default() {
    let err = ConvertRequest::new("time", vec!["name".to_string()])
        .run(&load_fixture("bad_rows.csv"))
        .unwrap_err();
    assert!(matches!(err, Error::NoMarkers));
}

// ============================================================================
// Structural properties
// ============================================================================

#[test]
fn riff_size_is_file_length_minus_eight() {
    let markers = vec![
        Marker::new(3.0, "odd"),
        Marker::new(1.25, "even!"),
        Marker::new(0.0, ""),
    ];
    let bytes = BwfEncoder::default().encode(&markers).unwrap();
    assert_eq!(le_u32(&bytes, 4) as usize, bytes.len() - 8);
    assert_eq!(chunk_table(&bytes).len(), 5);
}

#[test]
fn labl_payloads_are_even_and_terminated() {
    let markers = vec![
        Marker::new(0.0, "a"),
        Marker::new(1.0, "ab"),
        Marker::new(2.0, "abc"),
        Marker::new(3.0, ""),
    ];
    let bytes = BwfEncoder::default().encode(&markers).unwrap();
    let (_, list_start, list_len) = chunk_table(&bytes)[4].clone();

    let mut pos = list_start + 4;
    let mut seen = 0;
    while pos < list_start + list_len {
        assert_eq!(&bytes[pos..pos + 4], b"labl");
        let size = le_u32(&bytes, pos + 4) as usize;
        assert_eq!(size % 2, 0);
        let text = &bytes[pos + 12..pos + 8 + size];
        assert_eq!(text.last(), Some(&0));
        pos += 8 + size;
        seen += 1;
    }
    assert_eq!(seen, 4);
    assert_eq!(pos, list_start + list_len);
}

#[test]
fn cue_chunk_size_matches_marker_count() {
    let markers: Vec<Marker> = (0..7).map(|i| Marker::new(f64::from(i), "m")).collect();
    let bytes = BwfEncoder::default().encode(&markers).unwrap();
    let (_, start, len) = chunk_table(&bytes)[3].clone();
    assert_eq!(len, 4 + 7 * CUE_RECORD_LEN as usize);
    assert_eq!(le_u32(&bytes, start), 7);
}

#[test]
fn encoding_is_deterministic_with_fixed_bext() {
    let markers = song_markers();
    let encoder = BwfEncoder::new(BextInfo::default());
    assert_eq!(
        encoder.encode(&markers).unwrap(),
        encoder.encode(&markers).unwrap()
    );
}

// ============================================================================
// Ordering and round trip
// ============================================================================

#[test]
fn unsorted_rows_are_sorted_and_ties_keep_row_order() {
    let csv = "time,name\n5,late\n1,first tie\n0:01,second tie\n0,start";
    let conversion = ConvertRequest::new("time", vec!["name".to_string()])
        .run(csv)
        .unwrap();
    let bytes = conversion.encode(&BwfEncoder::default()).unwrap();
    let info = WavInfo::from_bytes(&bytes).unwrap();

    let labels: Vec<&str> = info
        .cues
        .iter()
        .map(|c| info.label_for(c.id).unwrap())
        .collect();
    assert_eq!(labels, vec!["start", "first tie", "second tie", "late"]);
    assert!(info.cues.windows(2).all(|w| w[0].position <= w[1].position));
}

#[test]
fn positions_round_trip_within_one_sample() {
    let csv = "time,name\n0.1,a\n1:02.345,b\n00:00:20:12,c\n0:00:40,d";
    let conversion = ConvertRequest::new("time", vec!["name".to_string()])
        .with_frame_rate(24.0)
        .run(csv)
        .unwrap();
    let bytes = conversion.encode(&BwfEncoder::default()).unwrap();
    let decoded = WavInfo::from_bytes(&bytes).unwrap().markers();

    assert_eq!(decoded.len(), conversion.markers.len());
    for (original, read) in conversion.markers.iter().zip(&decoded) {
        let diff = original.offset_secs() - read.offset_secs();
        assert!(
            (0.0..1.0 / f64::from(SAMPLE_RATE)).contains(&diff),
            "{} vs {}",
            original.offset_secs(),
            read.offset_secs()
        );
        assert_eq!(original.label(), read.label());
    }
}

#[test]
fn non_ascii_labels_are_stored_as_utf8() {
    let conversion = ConvertRequest::new("time", vec!["name".to_string()])
        .run(&load_fixture("unicode.csv"))
        .unwrap();
    let bytes = conversion.encode(&BwfEncoder::default()).unwrap();
    let info = WavInfo::from_bytes(&bytes).unwrap();

    assert_eq!(info.label_for(1), Some("Café"));
    assert_eq!(info.label_for(2), Some("Å Ä Ö"));
    // 4 (cue id) + 8 UTF-8 bytes + NUL + pad
    assert_eq!(info.labels[1].size, 14);
}

// ============================================================================
// SMPTE logs and time reference
// ============================================================================

#[test]
fn smpte_log_skips_bad_rows_and_detects_session_start() {
    let conversion = ConvertRequest::new(
        "Timecode",
        vec!["Scene".to_string(), "Take".to_string(), "Note".to_string()],
    )
    .run(&load_fixture("smpte.csv"))
    .unwrap();

    assert_eq!(conversion.rows, 5);
    assert_eq!(conversion.frame_rate, 24.0);
    let labels: Vec<&str> = conversion.markers.iter().map(Marker::label).collect();
    assert_eq!(labels, vec!["12 - 1", "12 - 3 - good", "14 - 1 - wide"]);
    assert_eq!(conversion.markers[0].offset_secs(), 3600.5);

    let start = conversion.session_start.unwrap();
    assert_eq!(start.to_string(), "01:00:00:00");

    let layout = BwfEncoder::default().layout(&conversion.markers).unwrap();
    assert_eq!(layout.duration_secs, 3721);
    assert_eq!(layout.data_len, 3721 * 176_400);
}

#[test]
fn session_start_policy_fills_time_reference() {
    let conversion = ConvertRequest::new("Timecode", vec!["Scene".to_string()])
        .run(&load_fixture("smpte.csv"))
        .unwrap();
    let samples = TimeReferencePolicy::SessionStart.samples(conversion.session_start, SAMPLE_RATE);
    assert_eq!(samples, 158_760_000);

    let encoder = BwfEncoder::new(BextInfo::default().with_time_reference(samples));
    let mut bytes = Vec::new();
    encoder.write_to(&[Marker::new(0.5, "x")], &mut bytes).unwrap();

    let info = WavInfo::from_bytes(&bytes).unwrap();
    assert_eq!(info.bext.unwrap().time_reference, 158_760_000);
}

#[test]
fn sample_position_floors() {
    assert_eq!(sample_position(10.5, SAMPLE_RATE).unwrap(), 463_050);
    assert_eq!(sample_position(0.999_999_99, SAMPLE_RATE).unwrap(), 44_099);
}

#[test]
fn max_duration_is_enforced() {
    let encoder = BwfEncoder::default().with_max_duration(Some(60));
    assert!(encoder.encode(&[Marker::new(30.0, "ok")]).is_ok());
    assert!(matches!(
        encoder.encode(&[Marker::new(120.0, "too long")]),
        Err(Error::EncodingOverflow { .. })
    ));
}
