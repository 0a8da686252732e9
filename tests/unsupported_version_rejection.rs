//! A chunk header carrying an unsupported format version must be rejected
//! outright, without silently materializing any later chunk in the file.

use vistle::codec::CompressionMode;
use vistle::core::grids::Rectilinear;
use vistle::core::object::Kind;
use vistle::core::{Array, Metadata, NameGenerator, Object};
use vistle::file::{read_rank, ChunkedFileWriter, FileFormatError, ReadOptions};

fn rectilinear(names: &NameGenerator) -> Object {
    let kind = Kind::Rectilinear(Rectilinear {
        x: Array::from_vec(vec![0.0, 1.0]),
        y: Array::from_vec(vec![0.0, 1.0]),
        z: Array::from_vec(vec![0.0, 1.0]),
    });
    Object::construct(names.next_name(), Metadata::default(), kind)
}

#[test]
fn a_tampered_version_is_rejected_before_any_later_chunk_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("run");
    let names = NameGenerator::new(1);

    let mut writer = ChunkedFileWriter::create(&prefix, 0, CompressionMode::None).unwrap();
    for t in 0..3 {
        let obj = rectilinear(&names);
        writer.write_port_object(0, t, -1, &obj).unwrap();
    }
    writer.finish().unwrap();

    let path = vistle::file::rank_file_path(&prefix, 0);
    let mut bytes = std::fs::read(&path).unwrap();
    // Header layout: 7-byte magic, 1-byte chunk type, 4-byte version (LE).
    bytes[7 + 1] = 2;
    std::fs::write(&path, &bytes).unwrap();

    let err = read_rank(&prefix, 0, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, FileFormatError::UnsupportedVersion(2)));
}
