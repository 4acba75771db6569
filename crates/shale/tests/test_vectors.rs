//! Byte-level test vectors for each value kind.

use serde::Deserialize;
use shale::{TypedValue, Value};

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

#[derive(Deserialize)]
struct TestVectors {
    special: Vec<SpecialTest>,
    int: Vec<IntTest>,
    float: Vec<FloatTest>,
    string: Vec<StringTest>,
    binary: Vec<BinaryTest>,
    array: Vec<ArrayTest>,
    dict: Vec<DictTest>,
    root: Vec<RootTest>,
}

#[derive(Deserialize)]
struct SpecialTest {
    bytes: String,
    /// `None` means null.
    value: Option<bool>,
}

#[derive(Deserialize)]
struct IntTest {
    bytes: String,
    value: i64,
}

#[derive(Deserialize)]
struct FloatTest {
    bytes: String,
    value: f64,
}

#[derive(Deserialize)]
struct StringTest {
    bytes: String,
    value: String,
}

#[derive(Deserialize)]
struct BinaryTest {
    bytes: String,
    /// Hex-encoded payload.
    value: String,
}

#[derive(Deserialize)]
struct ArrayTest {
    bytes: String,
    #[serde(default)]
    pos: usize,
    values: Vec<i64>,
}

#[derive(Deserialize)]
struct DictTest {
    bytes: String,
    #[serde(default)]
    pos: usize,
    entries: Vec<(String, i64)>,
}

#[derive(Deserialize)]
struct RootTest {
    bytes: String,
    #[serde(default)]
    expect_null: bool,
    expect_int: Option<i64>,
    expect_str: Option<String>,
}

const VECTORS: &str = r#"{
    "special": [
        { "bytes": "3000", "value": null },
        { "bytes": "3400", "value": false },
        { "bytes": "3800", "value": true }
    ],
    "int": [
        { "bytes": "002a", "value": 42 },
        { "bytes": "0fff", "value": -1 },
        { "bytes": "07ff", "value": 2047 },
        { "bytes": "0800", "value": -2048 },
        { "bytes": "113412", "value": 4660 },
        { "bytes": "170010a5d4e8000000", "value": 1000000000000 },
        { "bytes": "19ffff", "value": 65535 }
    ],
    "float": [
        { "bytes": "2800000000000000f83f", "value": 1.5 },
        { "bytes": "200000002040", "value": 2.5 }
    ],
    "string": [
        { "bytes": "4178", "value": "x" },
        { "bytes": "4000", "value": "" },
        { "bytes": "4568656c6c6f", "value": "hello" },
        { "bytes": "4f106162636465666768696a6b6c6d6e6f70", "value": "abcdefghijklmnop" }
    ],
    "binary": [
        { "bytes": "53aabbcc", "value": "aabbcc" },
        { "bytes": "5000", "value": "" }
    ],
    "array": [
        { "bytes": "6000", "values": [] },
        { "bytes": "6003000100020003", "values": [1, 2, 3] },
        { "bytes": "6801002a0000", "values": [42] },
        { "bytes": "1134120060018003", "pos": 4, "values": [4660] }
    ],
    "dict": [
        { "bytes": "7000", "entries": [] },
        { "bytes": "70024161000141620002", "entries": [["a", 1], ["b", 2]] }
    ],
    "root": [
        { "bytes": "3000", "expect_null": true },
        { "bytes": "002a", "expect_int": 42 },
        { "bytes": "4568656c6c6f8003", "expect_str": "hello" }
    ]
}"#;

fn vectors() -> TestVectors {
    serde_json::from_str(VECTORS).unwrap()
}

#[test]
fn special_vectors() {
    for test in vectors().special {
        let data = hex_to_bytes(&test.bytes);
        let value = Value::new(&data, 0).unwrap();
        match (test.value, value.typed().unwrap()) {
            (None, TypedValue::Null) => {}
            (Some(expected), TypedValue::Bool(b)) => assert_eq!(b, expected),
            (expected, got) => panic!("{}: expected {expected:?}, got {got:?}", test.bytes),
        }
    }
}

#[test]
fn int_vectors() {
    for test in vectors().int {
        let data = hex_to_bytes(&test.bytes);
        let value = Value::new(&data, 0).unwrap();
        assert_eq!(value.as_int().unwrap(), test.value, "bytes {}", test.bytes);
    }
}

#[test]
fn float_vectors() {
    for test in vectors().float {
        let data = hex_to_bytes(&test.bytes);
        let value = Value::new(&data, 0).unwrap();
        let read = value.as_float().unwrap();
        assert_eq!(read.to_bits(), test.value.to_bits(), "bytes {}", test.bytes);
    }
}

#[test]
fn string_vectors() {
    for test in vectors().string {
        let data = hex_to_bytes(&test.bytes);
        let value = Value::new(&data, 0).unwrap();
        assert_eq!(value.as_str().unwrap(), test.value, "bytes {}", test.bytes);
    }
}

#[test]
fn binary_vectors() {
    for test in vectors().binary {
        let data = hex_to_bytes(&test.bytes);
        let value = Value::new(&data, 0).unwrap();
        let expected = hex_to_bytes(&test.value);
        assert_eq!(value.as_bytes().unwrap(), expected, "bytes {}", test.bytes);
    }
}

#[test]
fn array_vectors() {
    for test in vectors().array {
        let data = hex_to_bytes(&test.bytes);
        let array = Value::new(&data, test.pos).unwrap().as_array().unwrap();
        assert_eq!(array.len(), test.values.len(), "bytes {}", test.bytes);
        for (i, expected) in test.values.iter().enumerate() {
            let element = array.get(i).unwrap().unwrap();
            assert_eq!(element.as_int().unwrap(), *expected, "bytes {}", test.bytes);
        }
        assert!(array.get(test.values.len()).unwrap().is_none());
    }
}

#[test]
fn dict_vectors() {
    for test in vectors().dict {
        let data = hex_to_bytes(&test.bytes);
        let dict = Value::new(&data, test.pos).unwrap().as_dict().unwrap();
        assert_eq!(dict.len(), test.entries.len(), "bytes {}", test.bytes);
        for (key, expected) in &test.entries {
            let value = dict.get(key).unwrap().unwrap();
            assert_eq!(value.as_int().unwrap(), *expected, "bytes {}", test.bytes);
        }
        assert!(dict.get("no such key").unwrap().is_none());
    }
}

#[test]
fn root_vectors() {
    for test in vectors().root {
        let data = hex_to_bytes(&test.bytes);
        let root = Value::from_doc(&data).unwrap();
        if test.expect_null {
            assert!(root.is_null(), "bytes {}", test.bytes);
        }
        if let Some(expected) = test.expect_int {
            assert_eq!(root.as_int().unwrap(), expected, "bytes {}", test.bytes);
        }
        if let Some(expected) = &test.expect_str {
            assert_eq!(root.as_str().unwrap(), expected, "bytes {}", test.bytes);
        }
    }
}
