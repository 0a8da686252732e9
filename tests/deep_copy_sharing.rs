//! Two `Vec<float,3>` fields sharing one structured grid: after a save/load
//! round trip through the archive, both reloaded fields still reference the
//! same grid object rather than two independent copies.

use vistle::archive::load::{DeepArchiveLoader, Renaming};
use vistle::archive::save::DeepArchiveSaver;
use vistle::codec::CompressionMode;
use vistle::core::grids::Structured;
use vistle::core::object::{Kind, VecField};
use vistle::core::{Array, Mapping, Metadata, NameGenerator, Object};

fn structured_grid(names: &NameGenerator) -> Object {
    let coords: Vec<f64> = (0..8).map(|i| i as f64).collect();
    let kind = Kind::Structured(Structured {
        dims: [2, 2, 2],
        x: Array::from_vec(coords.clone()),
        y: Array::from_vec(coords.clone()),
        z: Array::from_vec(coords),
    });
    Object::construct(names.next_name(), Metadata::default(), kind)
}

fn vec3_field(names: &NameGenerator, grid: &Object, seed: f64) -> Object {
    let comp = |offset: f64| Array::from_vec((0..8).map(|i| i as f64 + offset + seed).collect());
    let kind = Kind::Vec(VecField {
        components: smallvec::smallvec![comp(0.0), comp(100.0), comp(200.0)],
        grid: grid.clone(),
        mapping: Mapping::Vertex,
    });
    Object::construct(names.next_name(), Metadata::default(), kind)
}

#[test]
fn two_fields_sharing_a_grid_keep_sharing_it_after_reload() {
    let names = NameGenerator::new(1);
    let grid = structured_grid(&names);
    let field_a = vec3_field(&names, &grid, 0.0);
    let field_b = vec3_field(&names, &grid, 1000.0);

    let mut saver = DeepArchiveSaver::new(CompressionMode::None);
    let record_a = saver.save(&field_a).unwrap();
    let record_b = saver.save(&field_b).unwrap();
    let directory = saver.into_directory();

    // The grid is a sub-object referenced twice but archived once.
    assert_eq!(directory.iter().filter(|e| !e.is_array).count(), 1);

    let mut loader = DeepArchiveLoader::new(directory, Renaming::Keep);
    let loaded_a = loader.load_record(field_a.name(), &record_a).unwrap();
    let loaded_b = loader.load_record(field_b.name(), &record_b).unwrap();

    let grid_a = loaded_a.as_vec_field().unwrap().grid;
    let grid_b = loaded_b.as_vec_field().unwrap().grid;
    assert_eq!(grid_a.name(), grid_b.name());
    assert_eq!(grid_a.name(), grid.name());

    let sx = match grid_a.kind().unwrap() {
        Kind::Structured(s) => s.x.name().clone(),
        _ => panic!("expected Structured"),
    };
    let sy = match grid_b.kind().unwrap() {
        Kind::Structured(s) => s.x.name().clone(),
        _ => panic!("expected Structured"),
    };
    assert_eq!(sx, sy);
}
