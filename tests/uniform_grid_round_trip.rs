//! A 4x4x4 uniform grid carrying one per-cell scalar field, round-tripped
//! through a chunked file and read back.

use vistle::codec::CompressionMode;
use vistle::core::grids::{Axis, Uniform};
use vistle::core::object::{Kind, VecField};
use vistle::core::{Array, Mapping, Metadata, NameGenerator, Object};
use vistle::file::{read_rank, ChunkedFileWriter, ReadOptions};

fn axis() -> Axis {
    Axis { min: 0.0, max: 3.0, divisions: 4 }
}

#[test]
fn uniform_grid_with_scalar_field_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("uniform");
    let names = NameGenerator::new(1);

    let grid = Object::construct(
        names.next_name(),
        Metadata::default(),
        Kind::Uniform(Uniform { axes: [axis(), axis(), axis()] }),
    );

    let mut values = Vec::with_capacity(64);
    for k in 0..4i64 {
        for j in 0..4i64 {
            for i in 0..4i64 {
                values.push((i + j * 10 + k * 100) as f64);
            }
        }
    }
    let field = Object::construct(
        names.next_name(),
        Metadata::default(),
        Kind::Vec(VecField { components: smallvec::smallvec![Array::from_vec(values)], grid, mapping: Mapping::Element }),
    );

    let mut writer = ChunkedFileWriter::create(&prefix, 0, CompressionMode::None).unwrap();
    writer.write_port_object(0, 0, -1, &field).unwrap();
    writer.finish().unwrap();

    let records = read_rank(&prefix, 0, &ReadOptions::default()).unwrap();
    assert_eq!(records.len(), 1);

    let loaded = records[0].object.as_vec_field().unwrap();
    let loaded_values = loaded.components[0].as_slice();
    assert_eq!(loaded_values.len(), 64);

    // i fastest: element 0 is (i=0,j=0,k=0), element 1 is (i=1,j=0,k=0).
    assert_eq!(loaded_values[0], 0.0);
    assert_eq!(loaded_values[1], 1.0);
    assert_eq!(loaded_values[4], 10.0);
    assert_eq!(loaded_values[16], 100.0);
    assert_eq!(loaded_values[63], 333.0);

    let min = loaded_values.iter().cloned().fold(f64::MAX, f64::min);
    let max = loaded_values.iter().cloned().fold(f64::MIN, f64::max);
    assert_eq!((min, max), (0.0, 333.0));
}
