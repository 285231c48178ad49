use std::{env, fs, path::PathBuf, process, sync::Arc};

use cellrs::{
    catalogs::{self, CONDUCTOR, EMPTY, HEAD, TAIL},
    Error, FileStorage, Format, MemoryStorage, MemoryStore, Restored, Snapshot, Storage, World,
};

fn wires(width: usize, height: usize) -> Snapshot {
    let states = [EMPTY, CONDUCTOR, CONDUCTOR, HEAD, TAIL];
    let columns = (0..width)
        .map(|x| (0..height).map(|y| states[(x * 7 + y * 3) % states.len()]).collect())
        .collect();
    Snapshot::new(columns)
}

fn check_round_trip(storage: &mut dyn Storage) {
    let snapshot = wires(30, 20);
    storage.save(&snapshot).unwrap();
    let mut restored = storage.restore().unwrap().expect("a saved snapshot");
    assert_eq!(restored, snapshot);
    assert_eq!((restored.width(), restored.height()), (30, 20));

    let before = restored.columns()[1].clone();
    restored.columns_mut()[0][0] = HEAD;
    restored.columns_mut()[0][1] = TAIL;
    assert_eq!(restored.columns()[1], before);
    assert_eq!(storage.restore().unwrap(), Some(snapshot));

    storage.clear().unwrap();
    assert_eq!(storage.restore().unwrap(), None);
}

/// removed on drop, even when an assertion fails first.
struct TempFile(PathBuf);

impl TempFile {
    fn new(name: &str) -> Self {
        Self(env::temp_dir().join(format!("cellrs-it-{}-{name}", process::id())))
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

#[test]
fn memory_storage_round_trip() {
    check_round_trip(&mut MemoryStorage::new(MemoryStore::new(), "wires"));
}

#[test]
fn json_file_round_trip() {
    let file = TempFile::new("wires.json");
    check_round_trip(&mut FileStorage::new(&file.0, Format::Json));
}

#[test]
fn rle_file_round_trip() {
    let file = TempFile::new("wires.rle");
    check_round_trip(&mut FileStorage::new(&file.0, Format::Rle));
}

#[test]
fn world_survives_a_save_and_restore_through_a_file() {
    let file = TempFile::new("world.rle");
    let path = &file.0;
    let build = || {
        World::builder()
            .width(30)
            .height(20)
            .rules(Arc::new(catalogs::wireworld()))
            .initial_state(EMPTY)
            .storage(FileStorage::new(path, Format::Rle))
            .init()
            .unwrap()
    };

    let mut world = build();
    world.load(wires(30, 20)).unwrap();
    world.tick_n(3).unwrap();
    world.save().unwrap();

    let mut other = build();
    assert_eq!(other.restore().unwrap(), Restored::Applied);
    assert_eq!(other.snapshot(), world.snapshot());

    world.tick().unwrap();
    other.tick().unwrap();
    assert_eq!(other.snapshot(), world.snapshot());

    other.forget().unwrap();
    assert!(!path.exists());
}

#[test]
fn a_snapshot_of_another_shape_is_rejected() {
    let file = TempFile::new("small.json");
    let path = &file.0;
    fs::write(path, serde_json::to_string(&wires(4, 4)).unwrap()).unwrap();

    let mut world = World::builder()
        .width(5)
        .height(4)
        .rules(Arc::new(catalogs::wireworld()))
        .initial_state(EMPTY)
        .storage(FileStorage::new(path, Format::Json))
        .init()
        .unwrap();
    assert!(matches!(world.restore(), Err(Error::Restore(_))));
    assert_eq!(world.population(EMPTY), 20);
}
