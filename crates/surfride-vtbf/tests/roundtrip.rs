use std::fs;

use proptest::prelude::*;
use surfride_common::{BinaryReader, BinaryWriter, TypeTag};
use surfride_vtbf::codec::{decode_value, encode_value, resolve_value};
use surfride_vtbf::{
    decode_chunk, decode_chunks, encode_chunk, encode_container, encode_tree, Dictionary, Document,
    Error, FlatNode, Layout, ListHints, Map, PropertyDescriptor, PropertyType, Tree, Value,
    VtbfContainer, VtbfHeader,
};
use tempfile::NamedTempFile;

fn dict() -> Dictionary {
    Dictionary::standard().unwrap()
}

fn tag(bytes: &[u8; 4]) -> TypeTag {
    TypeTag::new(*bytes)
}

fn chunk(tag: &[u8; 4], children: u16, properties: u16, body: &[u8]) -> Vec<u8> {
    let mut data = tag.to_vec();
    data.extend_from_slice(&children.to_le_bytes());
    data.extend_from_slice(&properties.to_le_bytes());
    data.extend_from_slice(body);
    data
}

fn file(chunks: &[Vec<u8>]) -> Vec<u8> {
    encode_container(tag(b"SRCK"), chunks).unwrap()
}

/// A small scene touching every value shape: strings, colours, float tuples,
/// repeated and pinned properties, a record list and an unknown kind.
const SCENE_JSON: &str = r#"{
  "Project": {
    "Name": "demo",
    "SceneCount": 1,
    "Scene": [
      {
        "Name": "main",
        "BackColor": [255, 0, 128, 64],
        "Camera": [
          { "Name": "cam", "PositionXYZ": [0.0, 1.5, -10.0], "FovY": 8192, "ZNear": 0.25, "ZFar": 1000.0 }
        ],
        "Layer": [
          {
            "Name": "front",
            "Flags": 3,
            "Cast": [
              { "Name": "sprite", "CropIndex": [0, 2], "CropRef": [1, 7], "VertexColorRGBA": [1, 2, 3, 4, 5, 6, 7, 8] }
            ],
            "Node": [
              { "Child": 1, "Sibling": -1 },
              { "Child": -1, "Sibling": -1 }
            ],
            "Transform2D": [
              { "TranslationXY": [0.0, 0.0], "RotationZ": 0, "Scale": [1.0, 1.0] }
            ]
          }
        ],
        "XTRA": [ { "Name": "unknown kind" } ]
      }
    ]
  }
}"#;

#[test]
fn test_project_name_chunk() {
    let dict = dict();
    let payload = chunk(b"PROJ", 0, 1, b"\x03\x02\x04demo");
    let doc = Document::parse(&file(&[payload.clone()]), &dict).unwrap();

    let json = serde_json::to_string(&doc.to_value(&dict)).unwrap();
    assert_eq!(json, r#"{"Project":{"Name":"demo"}}"#);

    let chunks = encode_tree(&doc.tree, &dict).unwrap();
    assert_eq!(chunks, vec![payload]);
}

#[test]
fn test_repeated_crop_index() {
    let dict = dict();
    let payload = chunk(b"CIMG", 0, 2, &[0x45, 0x05, 0x01, 0x00, 0x45, 0x05, 0x02, 0x00]);
    let doc = Document::parse(&file(&[payload]), &dict).unwrap();

    let root = doc.tree.root.as_map().unwrap();
    assert_eq!(
        root.get("CropIndex"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn test_missing_child_is_unbalanced() {
    let chunks = [
        chunk(b"PROJ", 2, 0, &[]),
        chunk(b"SCN ", 0, 0, &[]),
    ];
    let err = Document::parse(&file(&chunks), &dict()).unwrap_err();
    assert!(matches!(err, Error::UnbalancedChildCount { index: 0, .. }), "{}", err);
}

#[test]
fn test_record_count_not_divisible() {
    let mut body = vec![0xFC, 0x00];
    body.extend_from_slice(&[0x3B, 0x05, 0x01, 0x00]);
    body.extend_from_slice(&[0xFE, 0x00]);
    body.extend_from_slice(&[0x3B, 0x05, 0x02, 0x00]);
    body.extend_from_slice(&[0xFD, 0x00]);

    // 2 records of 1 entry declare 2 * 1 + 2 + 1 = 5
    let chunks = [chunk(b"LAYR", 1, 0, &[]), chunk(b"NODE", 0, 6, &body)];
    let err = Document::parse(&file(&chunks), &dict()).unwrap_err();

    assert!(matches!(err, Error::Chunk { index: 1, .. }));
    assert!(matches!(
        err.root_cause(),
        Error::InconsistentRecordCount {
            property_count: 6,
            record_count: 2,
            ..
        }
    ));
}

#[test]
fn test_altered_magic() {
    let original = file(&[chunk(b"PROJ", 0, 0, &[])]);
    for i in 0..VtbfHeader::MAGIC.len() {
        let mut data = original.clone();
        data[i] = data[i].wrapping_add(1);
        assert!(matches!(
            Document::parse(&data, &dict()),
            Err(Error::MalformedHeader { .. })
        ));
    }
}

#[test]
fn test_scene_json_roundtrip() {
    let dict = dict();
    let value: Value = serde_json::from_str(SCENE_JSON).unwrap();
    let doc = Document::from_value(value.clone(), VtbfHeader::DEFAULT_TAG, &dict).unwrap();

    let bytes = doc.to_bytes(&dict).unwrap();
    assert_eq!(&bytes[8..12], b"SRFF");

    let decoded = Document::parse(&bytes, &dict).unwrap();
    assert_eq!(decoded.to_value(&dict), value);
    assert_eq!(decoded.to_bytes(&dict).unwrap(), bytes);
}

#[test]
fn test_scene_chunk_layout() {
    let dict = dict();
    let value: Value = serde_json::from_str(SCENE_JSON).unwrap();
    let tree = Tree::from_value(value, &dict).unwrap();
    let chunks = encode_tree(&tree, &dict).unwrap();

    let tags: Vec<String> = chunks
        .iter()
        .map(|c| decode_chunk(c, &dict).unwrap().tag.to_string())
        .collect();
    assert_eq!(
        tags,
        ["PROJ", "SCN ", "CAM ", "LAYR", "CAST", "NODE", "TRS2", "XTRA"]
    );

    // Layer: Cast, Node list and Transform2D list are three children
    let layer = decode_chunk(&chunks[3], &dict).unwrap();
    assert_eq!(layer.child_count, 3);

    // Two records of two entries: 2 * 2 + 2 + 1
    let nodes = decode_chunk(&chunks[5], &dict).unwrap();
    assert_eq!(nodes.property_count, 7);
}

#[test]
fn test_write_and_open_file() {
    let dict = dict();
    let value: Value = serde_json::from_str(SCENE_JSON).unwrap();
    let doc = Document::from_value(value, tag(b"SRCK"), &dict).unwrap();

    let temp_file = NamedTempFile::new().unwrap();
    doc.write(temp_file.path(), &dict).unwrap();

    let reopened = Document::open(temp_file.path(), &dict).unwrap();
    assert_eq!(reopened, doc);
    assert_eq!(fs::read(temp_file.path()).unwrap(), doc.to_bytes(&dict).unwrap());
}

#[test]
fn test_unknown_property_name_on_encode() {
    let dict = dict();
    let value: Value = serde_json::from_str(r#"{"Project":{"Nmae":"typo"}}"#).unwrap();
    let doc = Document::from_value(value, VtbfHeader::DEFAULT_TAG, &dict).unwrap();

    let err = doc.to_bytes(&dict).unwrap_err();
    assert!(matches!(err.root_cause(), Error::UnknownPropertyName(name) if name == "Nmae"));
}

#[test]
fn test_unknown_tags_survive_json() {
    let dict = dict();
    let chunks = [
        chunk(b"PROJ", 3, 0, &[]),
        chunk(&[0x01, b'A', b'B', b'C'], 0, 0, &[]),
        chunk(b"Crop", 0, 1, b"\x03\x02\x01x"),
        chunk(b"Node", 0, 1, b"\x03\x02\x01y"),
    ];
    let bytes = file(&chunks);
    let doc = Document::parse(&bytes, &dict).unwrap();

    let json = serde_json::to_string(&doc.to_value(&dict)).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    let reread = Document::from_value(value, doc.type_tag, &dict).unwrap();

    assert_eq!(encode_tree(&reread.tree, &dict).unwrap(), chunks);
    assert_eq!(reread.to_bytes(&dict).unwrap(), bytes);
}

#[test]
fn test_truncated_property_names_its_chunk() {
    let chunks = [chunk(b"PROJ", 1, 0, &[]), chunk(b"SCN ", 0, 1, b"\x03\x02\x09short")];
    let err = Document::parse(&file(&chunks), &dict()).unwrap_err();

    assert!(matches!(err, Error::Chunk { index: 1, .. }), "{}", err);
    assert!(matches!(
        err.root_cause(),
        Error::TruncatedFile { needed: 9, available: 5, .. }
    ));
}

#[test]
fn test_zero_width_types_roundtrip() {
    for ty in [PropertyType::None, PropertyType::ArraySeparator] {
        let bytes = encode_scalar(ty, &Value::Null);
        assert_eq!(bytes, [0x7F, ty.code()]);
        assert_eq!(decode_scalar_entry(ty, &bytes), Value::Null);
    }
}

/// Encode `value` as a lone entry of type `ty`.
fn encode_scalar(ty: PropertyType, value: &Value) -> Vec<u8> {
    let desc = PropertyDescriptor {
        code: 0x7F,
        name: "Scratch",
        ty,
    };
    let resolved = resolve_value(&desc, value, &ListHints::standard()).unwrap();
    let mut writer = BinaryWriter::new();
    assert_eq!(encode_value(&mut writer, &desc, &resolved).unwrap(), 1);
    writer.into_inner()
}

/// Decode a lone entry, checking that it is exactly one scalar of type `ty`.
fn decode_scalar_entry(ty: PropertyType, bytes: &[u8]) -> Value {
    let mut reader = BinaryReader::new(bytes);
    assert_eq!(reader.read_u8().unwrap(), 0x7F);
    let layout = Layout::read(&mut reader, 0x7F).unwrap();
    assert_eq!(layout, Layout::scalar(ty));
    let value = decode_value(&mut reader, layout).unwrap().to_value();
    assert!(reader.is_empty());
    value
}

fn assert_scalar_roundtrip(ty: PropertyType, value: Value) -> Result<(), TestCaseError> {
    let bytes = encode_scalar(ty, &value);
    prop_assert_eq!(bytes.len(), 2 + ty.width().unwrap_or(0));
    prop_assert_eq!(decode_scalar_entry(ty, &bytes), value);
    Ok(())
}

#[derive(Debug, Clone)]
enum GenNode {
    Map {
        tag: [u8; 4],
        name: String,
        flags: u32,
        children: Vec<GenNode>,
    },
    Records {
        tag: [u8; 4],
        children: Vec<i16>,
    },
}

fn push_flat(node: &GenNode, out: &mut Vec<FlatNode>) {
    match node {
        GenNode::Map {
            tag,
            name,
            flags,
            children,
        } => {
            let mut map = Map::new();
            map.insert("Name", Value::from(name.as_str()));
            map.insert("Flags", Value::Int(*flags as i64));
            out.push(FlatNode::new(TypeTag::new(*tag), children.len() as u16, Value::Map(map)));
            for child in children {
                push_flat(child, out);
            }
        }
        GenNode::Records { tag, children } => {
            let records = children
                .iter()
                .map(|&child| {
                    let mut record = Map::new();
                    record.insert("Child", Value::Int(child as i64));
                    Value::Map(record)
                })
                .collect();
            out.push(FlatNode::new(TypeTag::new(*tag), 0, Value::List(records)));
        }
    }
}

fn arb_records() -> impl Strategy<Value = GenNode> {
    (
        prop::sample::select(vec![*b"NODE", *b"TRS2", *b"NCAT"]),
        prop::collection::vec(any::<i16>(), 1..4),
    )
        .prop_map(|(tag, children)| GenNode::Records { tag, children })
}

fn arb_map_tag() -> impl Strategy<Value = [u8; 4]> {
    prop::sample::select(vec![
        *b"SCN ",
        *b"LAYR",
        *b"CAST",
        *b"XTRA",
        // Unknown tags spelling a kind or property name, or not printable
        *b"Node",
        *b"Name",
        *b"A\\BC",
        [0x01, b'A', b'B', 0xFF],
    ])
}

fn arb_node() -> impl Strategy<Value = GenNode> {
    let leaf = prop_oneof![
        (arb_map_tag(), "[a-z]{0,8}", any::<u32>()).prop_map(|(tag, name, flags)| GenNode::Map {
            tag,
            name,
            flags,
            children: Vec::new(),
        }),
        arb_records(),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            arb_map_tag(),
            "[a-z]{0,8}",
            any::<u32>(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, name, flags, children)| GenNode::Map {
                tag,
                name,
                flags,
                children,
            })
    })
}

fn arb_flat_tree() -> impl Strategy<Value = Vec<FlatNode>> {
    ("[a-z]{0,8}", prop::collection::vec(arb_node(), 0..5)).prop_map(|(name, children)| {
        let root = GenNode::Map {
            tag: *b"PROJ",
            name,
            flags: 0,
            children,
        };
        let mut out = Vec::new();
        push_flat(&root, &mut out);
        out
    })
}

fn single_property(name: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(name, value);
    Value::Map(map)
}

fn assert_property_roundtrip(name: &str, value: Value) -> Result<(), TestCaseError> {
    let dict = dict();
    let node = single_property(name, value);
    let payload = encode_chunk(tag(b"PROJ"), 0, &node, &dict).unwrap();
    let decoded = decode_chunk(&payload, &dict).unwrap();
    prop_assert_eq!(decoded.body.to_value(), node);
    Ok(())
}

proptest! {
    #[test]
    fn prop_framing_roundtrip(
        type_tag in any::<[u8; 4]>(),
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..8),
    ) {
        let bytes = encode_container(TypeTag::new(type_tag), &chunks).unwrap();
        let container = VtbfContainer::parse(&bytes).unwrap();

        prop_assert_eq!(container.type_tag(), TypeTag::new(type_tag));
        let read: Vec<Vec<u8>> = container.chunks().iter().map(|c| c.to_vec()).collect();
        prop_assert_eq!(read, chunks);
    }

    #[test]
    fn prop_build_flatten_roundtrip(nodes in arb_flat_tree()) {
        let dict = dict();
        let tree = Tree::from_nodes(nodes, &dict).unwrap();
        let rebuilt = Tree::from_nodes(tree.to_nodes(&dict).unwrap(), &dict).unwrap();
        prop_assert_eq!(rebuilt, tree);
    }

    #[test]
    fn prop_tree_bytes_roundtrip(nodes in arb_flat_tree()) {
        let dict = dict();
        let tree = Tree::from_nodes(nodes, &dict).unwrap();
        let chunks = encode_tree(&tree, &dict).unwrap();
        prop_assert_eq!(decode_chunks(&chunks, &dict).unwrap(), tree);
    }

    #[test]
    fn prop_short_roundtrip(v in any::<i16>()) {
        assert_property_roundtrip("Child", Value::Int(v as i64))?;
    }

    #[test]
    fn prop_ushort_roundtrip(v in any::<u16>()) {
        assert_property_roundtrip("Width", Value::Int(v as i64))?;
    }

    #[test]
    fn prop_long_roundtrip(v in any::<i32>()) {
        assert_property_roundtrip("StartFrame", Value::Int(v as i64))?;
    }

    #[test]
    fn prop_ulong_and_angle_roundtrip(flags in any::<u32>(), angle in any::<u32>()) {
        assert_property_roundtrip("Flags", Value::Int(flags as i64))?;
        assert_property_roundtrip("FovY", Value::Int(angle as i64))?;
    }

    #[test]
    fn prop_char_roundtrip(v in any::<i8>()) {
        assert_scalar_roundtrip(PropertyType::Char, Value::Int(v as i64))?;
    }

    #[test]
    fn prop_uchar_roundtrip(v in any::<u8>()) {
        assert_scalar_roundtrip(PropertyType::UChar, Value::Int(v as i64))?;
    }

    #[test]
    fn prop_short_angle_roundtrip(v in any::<i16>()) {
        assert_scalar_roundtrip(PropertyType::ShortAngle, Value::Int(v as i64))?;
    }

    #[test]
    fn prop_double_roundtrip(v in prop::num::f64::NORMAL | prop::num::f64::ZERO | prop::num::f64::SUBNORMAL) {
        assert_scalar_roundtrip(PropertyType::Double, Value::Float(v))?;
    }

    #[test]
    fn prop_bool_roundtrip(v in any::<bool>()) {
        assert_property_roundtrip("Display", Value::Bool(v))?;
    }

    #[test]
    fn prop_float_roundtrip(v in -1.0e6f32..1.0e6f32) {
        assert_property_roundtrip("ZNear", Value::Float(f64::from(v)))?;
    }

    #[test]
    fn prop_string_roundtrip(s in "[ -~]{0,255}") {
        assert_property_roundtrip("Name", Value::String(s))?;
    }

    #[test]
    fn prop_color_roundtrip(c in any::<[u8; 4]>()) {
        let channels = c.iter().map(|&b| Value::Int(b as i64)).collect();
        assert_property_roundtrip("BackColor", Value::List(channels))?;
    }

    #[test]
    fn prop_float_tuple_roundtrip(v in prop::collection::vec(-1.0e6f32..1.0e6f32, 2..=257)) {
        let items: Vec<Value> = v.iter().map(|&f| Value::Float(f64::from(f))).collect();
        let len = items.len();

        let dict = dict();
        let node = single_property("PositionXYZ", Value::List(items));
        let payload = encode_chunk(tag(b"PROJ"), 0, &node, &dict).unwrap();

        // Header, code, type byte, then the dimension byte
        prop_assert_eq!(payload[9], 0x4A);
        prop_assert_eq!(payload[10] as usize, len - 2);
        prop_assert_eq!(decode_chunk(&payload, &dict).unwrap().body.to_value(), node);
    }
}
