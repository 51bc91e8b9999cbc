//! Entities encode to their recorded bytes and decode back.

use docmap_testkit::prelude::*;

#[test]
fn widget_vectors_match() {
    let mapper = fixture_mapper();
    for vector in widget_vectors() {
        let bytes = mapper.to_cbor(&vector.entity).unwrap();
        assert_eq!(hex_encode(&bytes), hex_encode(&vector.cbor()), "{}", vector.name);
        assert_eq!(mapper.from_cbor::<Widget>(&bytes).unwrap(), vector.entity);
    }
}

#[test]
fn parent_vectors_match() {
    let mapper = fixture_mapper();
    for vector in parent_vectors() {
        let bytes = mapper.to_cbor(&vector.entity).unwrap();
        assert_eq!(hex_encode(&bytes), hex_encode(&vector.cbor()), "{}", vector.name);
        assert_eq!(mapper.from_cbor::<Parent>(&bytes).unwrap(), vector.entity);
    }
}
