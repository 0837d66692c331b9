/*!
 * Tests for document decoding and encoding
 */

use subrip::encoding::{decode_document, Encoding};
use subrip::errors::SubtitleError;
use subrip::subtitle_processor::{ParseOptions, SaveOptions, SubtitleCollection};

use crate::common;

#[test]
fn test_fromBytes_withEveryUnicodeBom_shouldDecodeSameEntries() {
    let expected = SubtitleCollection::parse(common::SAMPLE_SRT).unwrap();

    for encoding in [
        Encoding::Utf8,
        Encoding::Utf16Le,
        Encoding::Utf16Be,
        Encoding::Utf32Le,
        Encoding::Utf32Be,
    ] {
        let bytes = encoding.encode(common::SAMPLE_SRT, true).unwrap();
        let subs = SubtitleCollection::from_bytes(&bytes, &ParseOptions::default()).unwrap();

        assert_eq!(subs.encoding, encoding);
        assert!(subs.bom);
        assert_eq!(subs.entries(), expected.entries(), "{encoding}");
    }
}

#[test]
fn test_toBytes_withBomSource_shouldRoundTripByteIdentical() {
    let bytes = Encoding::Utf16Le.encode(common::SAMPLE_SRT, true).unwrap();
    let subs = SubtitleCollection::from_bytes(&bytes, &ParseOptions::default()).unwrap();
    assert_eq!(subs.to_bytes(&SaveOptions::default()).unwrap(), bytes);
}

#[test]
fn test_toBytes_withNewEncoding_shouldDropSourceBom() {
    let bytes = Encoding::Utf8.encode(common::SAMPLE_SRT, true).unwrap();
    let subs = SubtitleCollection::from_bytes(&bytes, &ParseOptions::default()).unwrap();

    let options = SaveOptions {
        encoding: Some(Encoding::Latin1),
        ..Default::default()
    };
    assert_eq!(subs.to_bytes(&options).unwrap(), common::SAMPLE_SRT.as_bytes());
}

#[test]
fn test_fromBytes_withWindows1252_shouldDecodeSmartQuotes() {
    let mut bytes = b"1\n00:00:01,000 --> 00:00:02,000\n".to_vec();
    bytes.extend_from_slice(&[0x93, b'H', b'i', 0x94, b' ', 0x80, b'5', b'\n', b'\n']);

    let options = ParseOptions::default().with_encoding(Encoding::Windows1252);
    let subs = SubtitleCollection::from_bytes(&bytes, &options).unwrap();
    assert_eq!(subs[0].text, "\u{201C}Hi\u{201D} \u{20AC}5");

    let again = subs.to_bytes(&SaveOptions::default()).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn test_fromBytes_withInvalidUtf8_shouldNotFallBack() {
    let bytes = b"1\n00:00:01,000 --> 00:00:02,000\ncaf\xe9\n";
    match SubtitleCollection::from_bytes(bytes, &ParseOptions::default()) {
        Err(SubtitleError::Decode { encoding, .. }) => assert_eq!(encoding, "utf-8"),
        other => panic!("expected a decode error, got {other:?}"),
    }

    let latin = ParseOptions::default().with_encoding(Encoding::Latin1);
    let subs = SubtitleCollection::from_bytes(bytes, &latin).unwrap();
    assert_eq!(subs[0].text, "café");
}

#[test]
fn test_decodeDocument_withBomAndExplicitEncoding_shouldPreferBom() {
    let bytes = Encoding::Utf16Be.encode("héllo", true).unwrap();
    let (text, encoding) = decode_document(&bytes, Some(Encoding::Latin1)).unwrap();
    assert_eq!(text, "héllo");
    assert_eq!(encoding, Encoding::Utf16Be);
}

#[test]
fn test_encode_toAscii_withAccent_shouldFail() {
    let subs = SubtitleCollection::parse("1\n00:00:01,000 --> 00:00:02,000\nnaïve\n").unwrap();
    let options = SaveOptions {
        encoding: Some(Encoding::Ascii),
        ..Default::default()
    };
    assert!(matches!(
        subs.to_bytes(&options),
        Err(SubtitleError::Encode { .. })
    ));
}

#[test]
fn test_encoding_serde_shouldUseCanonicalNames() {
    assert_eq!(serde_json::to_string(&Encoding::Utf16Le).unwrap(), "\"utf-16le\"");
    let parsed: Encoding = serde_json::from_str("\"cp1252\"").unwrap();
    assert_eq!(parsed, Encoding::Windows1252);
    assert!(matches!(
        "ebcdic".parse::<Encoding>(),
        Err(SubtitleError::UnknownEncoding(_))
    ));
}
