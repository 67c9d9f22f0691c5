use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

pub mod stats;
pub mod trace;

pub use stats::{RunStats, StatsCallback};
pub use trace::TraceCallback;

/// Writes `value` as pretty JSON, creating missing parent directories.
pub fn dump_json<T>(path: impl AsRef<Path>, value: &T) -> anyhow::Result<()>
where
    T: ?Sized + Serialize,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[test]
fn test_dump_json_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs").join("a").join("summary.json");
    dump_json(&path, &vec![1, 2, 3]).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value, serde_json::json!([1, 2, 3]));
}
