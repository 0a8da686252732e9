//! Reading with a timestep restraint plus renumbering reassigns the
//! surviving timesteps a consecutive sequence starting at zero.

use vistle::codec::CompressionMode;
use vistle::core::grids::Rectilinear;
use vistle::core::object::Kind;
use vistle::core::{Array, Metadata, NameGenerator, Object};
use vistle::file::{read_rank, ChunkedFileWriter, ReadOptions};
use vistle::util::Restraint;

fn rectilinear(names: &NameGenerator) -> Object {
    let kind = Kind::Rectilinear(Rectilinear {
        x: Array::from_vec(vec![0.0, 1.0]),
        y: Array::from_vec(vec![0.0, 1.0]),
        z: Array::from_vec(vec![0.0, 1.0]),
    });
    Object::construct(names.next_name(), Metadata::default(), kind)
}

#[test]
fn restraint_and_renumber_together_yield_a_consecutive_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("run");
    let names = NameGenerator::new(1);

    let mut writer = ChunkedFileWriter::create(&prefix, 0, CompressionMode::None).unwrap();
    for t in 0..10 {
        let obj = rectilinear(&names);
        writer.write_port_object(0, t, -1, &obj).unwrap();
    }
    writer.finish().unwrap();

    let options = ReadOptions { timesteps: Restraint::parse("2-8:2").unwrap(), renumber: true, ..ReadOptions::default() };
    let records = read_rank(&prefix, 0, &options).unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records.iter().map(|r| r.timestep).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    for record in &records {
        assert_eq!(record.object.metadata().num_timesteps, 4);
    }
}
