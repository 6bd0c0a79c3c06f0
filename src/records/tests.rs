//! Tests for the records module

use std::sync::Arc;

use uuid::Uuid;

use super::*;
use crate::error::{error_kind, ErrorKind};
use crate::memory::{ArrayMemoryStore, MemoryStore};

#[derive(Debug, Default, Clone, PartialEq)]
struct Sample {
    a: i32,
    c: i32,
    d: bool,
}

fn sample_decl(decl: RecordDecl<Sample>) -> RecordDecl<Sample> {
    decl.field("a", 0, 25, |r| r.a, |r, v| r.a = v)
        .field("c", 1, 32, |r| r.c, |r, v| r.c = v)
        .field("d", 2, 1, |r| r.d, |r, v| r.d = v)
}

impl PackRecord for Sample {
    fn declare() -> RecordDecl<Self> {
        sample_decl(RecordDecl::byte_aligned())
    }
}

fn sample_pair(byte_aligned: bool) -> (Writer<Sample>, Reader<Sample>) {
    let decl = if byte_aligned {
        RecordDecl::byte_aligned()
    } else {
        RecordDecl::bit_packed()
    };
    let schema = Arc::new(Schema::compile(sample_decl(decl)).unwrap());
    (Writer::new(Arc::clone(&schema)), Reader::new(schema))
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Everything {
    flag: bool,
    tiny: i8,
    small: i16,
    medium: i32,
    large: i64,
    letter: u16,
    id: Uuid,
    name: String,
    votes: Vec<Option<bool>>,
    bits: Vec<bool>,
    ratio: f64,
    scale: f32,
}

fn everything_decl(decl: RecordDecl<Everything>) -> RecordDecl<Everything> {
    decl.field("flag", 0, 1, |r| r.flag, |r, v| r.flag = v)
        .field("tiny", 1, 5, |r| r.tiny, |r, v| r.tiny = v)
        .field("small", 2, 11, |r| r.small, |r, v| r.small = v)
        .field("medium", 3, 20, |r| r.medium, |r, v| r.medium = v)
        .field("large", 4, 46, |r| r.large, |r, v| r.large = v)
        .field("letter", 5, 16, |r| r.letter, |r, v| r.letter = v)
        .field("id", 6, 128, |r| r.id, |r, v| r.id = v)
        .string("name", 7, 6, 16, |r| r.name.clone(), |r, v| r.name = v)
        .array("votes", 8, 5, |r| r.votes.clone(), |r, v| r.votes = v)
        .array("bits", 9, 5, |r| r.bits.clone(), |r, v| r.bits = v)
        .field("ratio", 10, 64, |r| r.ratio, |r, v| r.ratio = v)
        .field("scale", 11, 32, |r| r.scale, |r, v| r.scale = v)
        .padding("tail", 12, 3)
}

fn everything() -> Everything {
    Everything {
        flag: true,
        tiny: -16,
        small: -1000,
        medium: -(1 << 19),
        large: -(1 << 45),
        letter: 0x03A9,
        id: Uuid::from_u128(0x0123_4567_89AB_CDEF_FEDC_BA98_7654_3210),
        name: "héllo".to_string(),
        votes: vec![Some(true), Some(false), Some(true), Some(true), Some(false)],
        bits: vec![false, true, false, true, true],
        ratio: -1.5e300,
        scale: 3.25,
    }
}

fn store() -> ArrayMemoryStore {
    ArrayMemoryStore::new(64).unwrap()
}

#[test]
fn byte_aligned_scenario_writes_field_by_field_big_endian() {
    let (writer, reader) = sample_pair(true);
    let mut store = store();
    let record = Sample { a: 1, c: -1, d: true };

    writer.put(&mut store, 0, &record).unwrap();

    assert_eq!(
        store.get_byte_array(0, 9).unwrap(),
        vec![0x00, 0x00, 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
    );
    assert_eq!(reader.get(&store, 0).unwrap(), record);
}

#[test]
fn bit_packed_scenario_is_dense_msb_first() {
    let (writer, reader) = sample_pair(false);
    let mut store = store();
    let record = Sample { a: 1, c: -1, d: true };

    assert_eq!(writer.schema().total_bits(), 58);
    assert_eq!(writer.schema().total_bytes(), 8);

    writer.put(&mut store, 0, &record).unwrap();

    assert_eq!(
        store.get_byte_array(0, 8).unwrap(),
        vec![0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xC0]
    );
    assert_eq!(reader.get(&store, 0).unwrap(), record);
}

#[test]
fn twenty_five_bit_extremes_survive_both_modes() {
    for byte_aligned in [true, false] {
        let (writer, reader) = sample_pair(byte_aligned);
        let mut store = store();
        let max = Sample {
            a: (1 << 24) - 1,
            c: i32::MIN,
            d: false,
        };
        let min = Sample {
            a: -(1 << 24),
            c: i32::MAX,
            d: true,
        };

        writer.put(&mut store, 0, &max).unwrap();
        writer.put(&mut store, 1, &min).unwrap();

        assert_eq!(reader.get(&store, 0).unwrap(), max, "byte_aligned={}", byte_aligned);
        assert_eq!(reader.get(&store, 1).unwrap(), min, "byte_aligned={}", byte_aligned);
    }
}

#[test]
fn every_wire_type_round_trips_in_both_modes() {
    for (decl, bytes) in [
        (RecordDecl::byte_aligned(), 70),
        (RecordDecl::bit_packed(), 58),
    ] {
        let schema = Arc::new(Schema::compile(everything_decl(decl)).unwrap());
        assert_eq!(schema.total_bytes(), bytes);

        let writer = Writer::new(Arc::clone(&schema));
        let reader = Reader::new(schema);
        let mut store = store();
        let record = everything();

        writer.put(&mut store, 2, &record).unwrap();

        assert_eq!(reader.get(&store, 2).unwrap(), record);
        assert_eq!(reader.get(&store, 1).unwrap().name, "");
    }
}

#[test]
fn byte_aligned_uuid_is_high_half_first() {
    let schema = Arc::new(Schema::compile(everything_decl(RecordDecl::byte_aligned())).unwrap());
    let writer = Writer::new(Arc::clone(&schema));
    let id = schema.field("id").unwrap();

    let bytes = writer.pack(&everything()).unwrap();
    let start = id.byte_offset();

    assert_eq!(
        &bytes[start..start + 16],
        &0x0123_4567_89AB_CDEF_FEDC_BA98_7654_3210u128.to_be_bytes()
    );
}

#[test]
fn byte_aligned_float_is_ieee_pattern() {
    let schema = Arc::new(Schema::compile(everything_decl(RecordDecl::byte_aligned())).unwrap());
    let writer = Writer::new(Arc::clone(&schema));
    let scale = schema.field("scale").unwrap();

    let bytes = writer.pack(&everything()).unwrap();
    let start = scale.byte_offset();

    assert_eq!(&bytes[start..start + 4], &3.25f32.to_bits().to_be_bytes());
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Narrow {
    value: i16,
}

#[test]
fn byte_aligned_narrow_integer_is_shrunk_then_extended() {
    let decl = RecordDecl::<Narrow>::byte_aligned().field("value", 0, 15, |r| r.value, |r, v| r.value = v);
    let schema = Arc::new(Schema::compile(decl).unwrap());
    let writer = Writer::new(Arc::clone(&schema));
    let reader = Reader::new(schema);

    let bytes = writer.pack(&Narrow { value: -1 }).unwrap();

    assert_eq!(bytes.as_slice(), &[0x7F, 0xFF]);
    assert_eq!(reader.unpack(&bytes).unwrap(), Narrow { value: -1 });
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Label {
    text: String,
}

fn label_schema(bits: usize) -> Arc<Schema<Label>> {
    let decl = RecordDecl::<Label>::byte_aligned().string(
        "text",
        0,
        4,
        bits,
        |r| r.text.clone(),
        |r, v| r.text = v,
    );
    Arc::new(Schema::compile(decl).unwrap())
}

#[test]
fn string_has_count_header_then_zero_padded_characters() {
    let narrow = Writer::new(label_schema(8));
    let wide = Writer::new(label_schema(16));
    let label = Label { text: "A".into() };

    assert_eq!(
        narrow.pack(&label).unwrap().as_slice(),
        &[0, 0, 0, 1, 0x41, 0, 0, 0]
    );
    assert_eq!(
        wide.pack(&label).unwrap().as_slice(),
        &[0, 0, 0, 1, 0, 0x41, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn string_over_capacity_is_rejected_before_write() {
    let schema = label_schema(16);
    let writer = Writer::new(Arc::clone(&schema));
    let reader = Reader::new(schema);
    let mut store = store();
    writer.put(&mut store, 0, &Label { text: "keep".into() }).unwrap();

    let err = writer
        .put(&mut store, 0, &Label { text: "toolong".into() })
        .unwrap_err();

    assert_eq!(error_kind(&err), Some(ErrorKind::InvalidArgument));
    assert_eq!(reader.get(&store, 0).unwrap().text, "keep");
}

#[test]
fn narrow_string_rejects_characters_wider_than_declared() {
    let schema = label_schema(8);
    let writer = Writer::new(Arc::clone(&schema));
    let reader = Reader::new(schema);
    let mut store = store();
    writer.put(&mut store, 0, &Label { text: "café".into() }).unwrap();

    let err = writer
        .put(&mut store, 0, &Label { text: "5€".into() })
        .unwrap_err();

    assert_eq!(error_kind(&err), Some(ErrorKind::InvalidArgument));
    assert_eq!(reader.get(&store, 0).unwrap().text, "café");
}

#[test]
fn array_length_must_match_declaration() {
    let schema = Arc::new(Schema::compile(everything_decl(RecordDecl::bit_packed())).unwrap());
    let writer = Writer::new(schema);
    let mut record = everything();
    record.bits.push(true);

    let err = writer.pack(&record).unwrap_err();

    assert_eq!(error_kind(&err), Some(ErrorKind::InvalidArgument));
}

#[test]
fn null_array_element_is_rejected() {
    let schema = Arc::new(Schema::compile(everything_decl(RecordDecl::byte_aligned())).unwrap());
    let writer = Writer::new(schema);
    let mut record = everything();
    record.votes[3] = None;

    let err = writer.pack(&record).unwrap_err();

    assert_eq!(error_kind(&err), Some(ErrorKind::InvalidArgument));
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Maybe {
    count: Option<i32>,
}

#[test]
fn nullable_field_rejects_none_and_accepts_some() {
    let decl = RecordDecl::<Maybe>::bit_packed().field("count", 0, 12, |r| r.count, |r, v| r.count = v);
    let schema = Arc::new(Schema::compile(decl).unwrap());
    let writer = Writer::new(Arc::clone(&schema));
    let reader = Reader::new(schema);
    let mut store = store();

    let err = writer.put(&mut store, 0, &Maybe { count: None }).unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::InvalidArgument));

    writer.put(&mut store, 0, &Maybe { count: Some(-2048) }).unwrap();
    assert_eq!(reader.get(&store, 0).unwrap().count, Some(-2048));
}

#[test]
fn slot_past_the_store_is_out_of_bounds() {
    let (writer, reader) = sample_pair(true);
    let mut store = ArrayMemoryStore::new(9).unwrap();
    let record = Sample::default();

    writer.put(&mut store, 3, &record).unwrap();
    let err = writer.put(&mut store, 4, &record).unwrap_err();

    assert_eq!(error_kind(&err), Some(ErrorKind::OutOfBounds));
    assert_eq!(
        err.downcast_ref::<crate::error::PackError>(),
        Some(&crate::error::PackError::OutOfBounds { index: 4, limit: 4 })
    );
    assert!(reader.get(&store, 4).is_err());
}

#[test]
fn put_any_checks_runtime_type() {
    let (writer, reader) = sample_pair(true);
    let mut store = store();

    let err = writer.put_any(&mut store, 0, &42i32).unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::TypeMismatch));

    let record = Sample { a: 3, c: 4, d: true };
    writer.put_any(&mut store, 0, &record).unwrap();
    assert_eq!(reader.get(&store, 0).unwrap(), record);
}

#[test]
fn fields_are_sorted_by_order_key_with_offsets() {
    let decl = RecordDecl::<Sample>::bit_packed()
        .field("d", 9, 1, |r| r.d, |r, v| r.d = v)
        .field("a", -3, 25, |r| r.a, |r, v| r.a = v)
        .field("c", 4, 32, |r| r.c, |r, v| r.c = v);
    let schema = Schema::compile(decl).unwrap();

    let names: Vec<_> = schema.fields().iter().map(|f| f.name).collect();
    let offsets: Vec<_> = schema.fields().iter().map(|f| f.bit_offset).collect();

    assert_eq!(names, ["a", "c", "d"]);
    assert_eq!(offsets, [0, 25, 57]);
    assert_eq!(schema.field("c").unwrap().order, 4);
}

#[test]
fn layout_is_deterministic() {
    let first = Schema::<Everything>::compile(everything_decl(RecordDecl::bit_packed())).unwrap();
    let second = Schema::<Everything>::compile(everything_decl(RecordDecl::bit_packed())).unwrap();

    assert_eq!(first.fields(), second.fields());
    assert_eq!(first.total_bits(), second.total_bits());
    assert_eq!(first.total_bytes(), second.total_bytes());
}

#[test]
fn widths_clamp_to_natural_maximum() {
    #[derive(Default)]
    struct Wide {
        tiny: i8,
        id: Uuid,
        scale: f32,
        ch: u16,
    }
    let decl = RecordDecl::<Wide>::byte_aligned()
        .field("tiny", 0, 20, |r| r.tiny, |r, v| r.tiny = v)
        .field("id", 1, 1, |r| r.id, |r, v| r.id = v)
        .field("scale", 2, 3, |r| r.scale, |r, v| r.scale = v)
        .field("ch", 3, 40, |r| r.ch, |r, v| r.ch = v);
    let schema = Schema::compile(decl).unwrap();

    let widths: Vec<_> = schema
        .fields()
        .iter()
        .map(|f| (f.bit_width, f.byte_width))
        .collect();
    assert_eq!(widths, [(8, 1), (128, 16), (32, 4), (16, 2)]);
    assert_eq!(schema.total_bytes(), 23);
}

#[test]
fn of_compiles_the_declared_layout() {
    let schema = Schema::<Sample>::of().unwrap();

    assert!(schema.is_byte_aligned());
    assert_eq!(schema.total_bits(), 72);
    assert_eq!(schema.total_bytes(), 9);
    assert_eq!(schema.field_count(), 3);
}

#[test]
fn binder_reads_fields_by_name() {
    let schema = Schema::<Sample>::of().unwrap();
    let mut record = Sample::default();

    schema
        .binder()
        .set_field(&mut record, "c", Some(FieldValue::Int(77)))
        .unwrap();

    assert_eq!(record.c, 77);
    assert_eq!(
        schema.binder().get_field(&record, "d").unwrap(),
        Some(FieldValue::Bit(false))
    );
}

fn compile_error<T: 'static>(decl: RecordDecl<T>) -> ErrorKind {
    let err = Schema::compile(decl).unwrap_err();
    error_kind(&err).unwrap()
}

#[derive(Debug, Default, Clone, Copy)]
struct Decimal(i64);

impl FieldType for Decimal {
    const VALUE_TYPE: ValueType = ValueType::Other("Decimal");

    fn into_value(self) -> Option<FieldValue> {
        Some(FieldValue::Long(self.0))
    }

    fn from_value(_value: Option<FieldValue>) -> eyre::Result<Self> {
        Ok(Decimal(0))
    }
}

#[derive(Default)]
struct Bad {
    n: i32,
    price: Decimal,
    flags: Vec<bool>,
    name: String,
}

#[test]
fn declaration_errors_are_configuration_errors() {
    let cases: Vec<(&str, RecordDecl<Bad>)> = vec![
        ("empty", RecordDecl::byte_aligned()),
        ("padding only", RecordDecl::byte_aligned().padding("pad", 0, 8)),
        (
            "unsupported type",
            RecordDecl::byte_aligned().field("price", 0, 64, |r: &Bad| r.price, |r: &mut Bad, v| r.price = v),
        ),
        (
            "non-void padding",
            RecordDecl::byte_aligned()
                .field("n", 0, 8, |r: &Bad| r.n, |r: &mut Bad, v| r.n = v)
                .declare(FieldDecl::padding_of("pad", 1, 8, ValueType::Int)),
        ),
        (
            "void payload",
            RecordDecl::byte_aligned()
                .field("n", 0, 8, |r: &Bad| r.n, |r: &mut Bad, v| r.n = v)
                .field("v", 1, 8, |_: &Bad| (), |_: &mut Bad, _: ()| {}),
        ),
        (
            "array without array declaration",
            RecordDecl::byte_aligned().field("flags", 0, 1, |r: &Bad| r.flags.clone(), |r: &mut Bad, v| r.flags = v),
        ),
        (
            "array declaration on scalar",
            RecordDecl::byte_aligned().array("n", 0, 4, |r: &Bad| r.n, |r: &mut Bad, v| r.n = v),
        ),
        (
            "string without string declaration",
            RecordDecl::byte_aligned().field("name", 0, 16, |r: &Bad| r.name.clone(), |r: &mut Bad, v| r.name = v),
        ),
        (
            "zero width",
            RecordDecl::byte_aligned().field("n", 0, 0, |r: &Bad| r.n, |r: &mut Bad, v| r.n = v),
        ),
        (
            "zero elements",
            RecordDecl::byte_aligned().array("flags", 0, 0, |r: &Bad| r.flags.clone(), |r: &mut Bad, v| r.flags = v),
        ),
        (
            "duplicate order",
            RecordDecl::byte_aligned()
                .field("n", 0, 8, |r: &Bad| r.n, |r: &mut Bad, v| r.n = v)
                .string("name", 0, 2, 8, |r: &Bad| r.name.clone(), |r: &mut Bad, v| r.name = v),
        ),
        (
            "duplicate name",
            RecordDecl::byte_aligned()
                .field("n", 0, 8, |r: &Bad| r.n, |r: &mut Bad, v| r.n = v)
                .field("n", 1, 8, |r: &Bad| r.n, |r: &mut Bad, v| r.n = v),
        ),
    ];

    for (label, decl) in cases {
        assert_eq!(compile_error(decl), ErrorKind::Configuration, "{}", label);
    }
}

#[test]
fn padding_consumes_width_but_is_never_written() {
    #[derive(Debug, Default, PartialEq)]
    struct Gapped {
        x: u16,
        y: u16,
    }
    let decl = RecordDecl::<Gapped>::byte_aligned()
        .field("x", 0, 16, |r| r.x, |r, v| r.x = v)
        .padding("gap", 1, 16)
        .field("y", 2, 16, |r| r.y, |r, v| r.y = v);
    let schema = Arc::new(Schema::compile(decl).unwrap());
    let writer = Writer::new(Arc::clone(&schema));
    let reader = Reader::new(schema);

    let bytes = writer.pack(&Gapped { x: 0x1234, y: 0xABCD }).unwrap();

    assert_eq!(bytes.as_slice(), &[0x12, 0x34, 0, 0, 0xAB, 0xCD]);
    assert_eq!(
        reader.unpack(&bytes).unwrap(),
        Gapped { x: 0x1234, y: 0xABCD }
    );
}

#[test]
fn unpack_rejects_short_buffer() {
    let (_, reader) = sample_pair(true);

    let err = reader.unpack(&[0u8; 8]).unwrap_err();

    assert_eq!(error_kind(&err), Some(ErrorKind::InvalidArgument));
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Glyph {
    code: u16,
    delta: i16,
}

impl PackRecord for Glyph {
    fn declare() -> RecordDecl<Self> {
        RecordDecl::<Self>::bit_packed()
            .field("code", 0, 16, |g| g.code, |g, v| g.code = v)
            .field("delta", 1, 16, |g| g.delta, |g, v| g.delta = v)
    }
}

#[test]
fn chars_stay_unsigned_while_integers_sign_extend() {
    let schema = Schema::<Glyph>::of().unwrap();
    let (writer, reader) = (Writer::new(Arc::clone(&schema)), Reader::new(schema));
    let glyph = Glyph {
        code: 0xFFFF,
        delta: -1,
    };

    let bytes = writer.pack(&glyph).unwrap();

    assert_eq!(bytes.as_slice(), &[0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(reader.unpack(&bytes).unwrap(), glyph);
}
