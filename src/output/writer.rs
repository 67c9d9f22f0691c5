use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use super::Assignment;

impl Assignment {
    /// Writes one `<count> <ride>...` line per vehicle.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "{self}")?;
        writer.flush()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        self.write_to(BufWriter::new(File::create(path)?))
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for route in self.routes() {
            write!(f, "{}", route.len())?;
            for ride in route {
                write!(f, " {ride}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[test]
fn test_writes_one_line_per_vehicle() {
    use crate::model::ride::RideId;

    let assignment = Assignment::new(vec![vec![RideId(0)], vec![RideId(2), RideId(1)], vec![]]);
    let mut buf = Vec::new();
    assignment.write_to(&mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "1 0\n2 2 1\n0\n");
}

#[test]
fn test_save_creates_file() {
    use crate::model::ride::RideId;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.txt");
    Assignment::new(vec![vec![RideId(4), RideId(9)]])
        .save(&path)
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "2 4 9\n");
}
