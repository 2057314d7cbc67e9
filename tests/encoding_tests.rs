use serde_omsi::formats::paths::Paths;
use serde_omsi::{
    from_reader_with_options, from_slice, to_vec, DecodeOptions, EncodeOptions, LineEnding,
};

const SOUNDS: &str = "[stepsoundpack]\r\n2\r\nsound\\Schritt_Stra\u{df}e.wav\r\nsound\\caf\u{e9}.wav\r\n";

fn utf16(text: &str, big_endian: bool, bom: bool) -> Vec<u8> {
    let mut bytes = Vec::new();
    if bom {
        bytes.extend_from_slice(if big_endian { &[0xFE, 0xFF] } else { &[0xFF, 0xFE] });
    }
    for unit in text.encode_utf16() {
        let pair = if big_endian { unit.to_be_bytes() } else { unit.to_le_bytes() };
        bytes.extend_from_slice(&pair);
    }
    bytes
}

fn utf32(text: &str, big_endian: bool) -> Vec<u8> {
    let mut bytes = if big_endian {
        vec![0x00, 0x00, 0xFE, 0xFF]
    } else {
        vec![0xFF, 0xFE, 0x00, 0x00]
    };
    for c in text.chars() {
        let code = u32::from(c);
        let quad = if big_endian { code.to_be_bytes() } else { code.to_le_bytes() };
        bytes.extend_from_slice(&quad);
    }
    bytes
}

fn sound_files(paths: &Paths) -> Vec<&str> {
    paths.step_sounds[0]
        .sound_files
        .iter()
        .map(String::as_str)
        .collect()
}

const EXPECTED: [&str; 2] = ["sound\\Schritt_Stra\u{df}e.wav", "sound\\caf\u{e9}.wav"];

#[test]
fn test_utf16_byte_order_marks() {
    for big_endian in [false, true] {
        let paths: Paths = from_slice(&utf16(SOUNDS, big_endian, true)).unwrap();
        assert_eq!(sound_files(&paths), EXPECTED);
    }
}

#[test]
fn test_utf32_byte_order_marks() {
    for big_endian in [false, true] {
        let paths: Paths = from_slice(&utf32(SOUNDS, big_endian)).unwrap();
        assert_eq!(sound_files(&paths), EXPECTED);
    }
}

#[test]
fn test_utf8_byte_order_mark() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(SOUNDS.as_bytes());
    let paths: Paths = from_slice(&bytes).unwrap();
    assert_eq!(sound_files(&paths), EXPECTED);
}

#[test]
fn test_fallback_encoding_without_bom() {
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(SOUNDS);
    assert!(!unmappable);

    let options = DecodeOptions::new().with_encoding(encoding_rs::WINDOWS_1252);
    let paths: Paths = from_reader_with_options(&bytes[..], &options).unwrap();
    assert_eq!(sound_files(&paths), EXPECTED);
}

#[test]
fn test_forced_encoding_without_bom() {
    let options = DecodeOptions::new().with_forced_encoding(encoding_rs::UTF_16BE);
    let bytes = utf16(SOUNDS, true, false);
    let paths: Paths = from_reader_with_options(&bytes[..], &options).unwrap();
    assert_eq!(sound_files(&paths), EXPECTED);
}

#[test]
fn test_written_encodings_decode_back() {
    let paths: Paths = from_slice(SOUNDS.as_bytes()).unwrap();

    let outputs = [
        EncodeOptions::new().with_encoding(encoding_rs::UTF_16LE).with_bom(true),
        EncodeOptions::new().with_encoding(encoding_rs::UTF_16BE).with_bom(true),
        EncodeOptions::new().with_bom(true),
        EncodeOptions::new().with_line_ending(LineEnding::Cr),
    ];
    for options in &outputs {
        let bytes = to_vec(&paths, options).unwrap();
        let back: Paths = from_slice(&bytes).unwrap();
        assert_eq!(back, paths);
    }

    let legacy = EncodeOptions::new().with_encoding(encoding_rs::WINDOWS_1252);
    let bytes = to_vec(&paths, &legacy).unwrap();
    assert!(bytes.contains(&0xE9));
    let options = DecodeOptions::new().with_encoding(encoding_rs::WINDOWS_1252);
    let back: Paths = from_reader_with_options(&bytes[..], &options).unwrap();
    assert_eq!(back, paths);
}

#[test]
fn test_utf16_split_across_chunks() {
    let mut text = String::from("[stepsoundpack]\r\n300\r\n");
    for i in 0..300 {
        text.push_str(&format!("sound\\\u{e9}tape_{}.wav\r\n", i));
    }
    let paths: Paths = from_slice(&utf16(&text, false, true)).unwrap();
    let files = &paths.step_sounds[0].sound_files;
    assert_eq!(files.len(), 300);
    assert_eq!(files[299], "sound\\\u{e9}tape_299.wav");
}
