use std::{fs::File, io::Read, path::Path, str::FromStr};

use csv::StringRecord;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    describe_csv_error,
    err::InstanceError,
    narrow_i64,
    record_line,
    ride::{Ride, RideId, RideRecord},
    space_separated_reader,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct InstanceHeader {
    #[serde(deserialize_with = "narrow_i64")]
    pub rows: i64,
    #[serde(deserialize_with = "narrow_i64")]
    pub columns: i64,
    pub vehicles: usize,
    // the ride rows that follow are authoritative
    pub declared_rides: usize,
    #[serde(deserialize_with = "narrow_i64")]
    pub bonus: i64,
    #[serde(deserialize_with = "narrow_i64")]
    pub max_steps: i64,
}

impl InstanceHeader {
    pub const FIELDS: usize = 6;
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub header: InstanceHeader,
    pub rides: Vec<Ride>,
}

impl Instance {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InstanceError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InstanceError> {
        let mut reader = space_separated_reader(reader);
        let mut records = reader.records();

        let header: InstanceHeader = match records.next() {
            Some(record) => leading_fields(&record?, InstanceHeader::FIELDS, "header")?,
            None => return Err(InstanceError::malformed(1, "missing header")),
        };

        let mut rides = Vec::with_capacity(header.declared_rides);
        for record in records {
            let record: RideRecord = leading_fields(&record?, RideRecord::FIELDS, "ride")?;
            rides.push(record.into_ride(RideId(rides.len())));
        }

        if rides.len() != header.declared_rides {
            warn!(
                declared = header.declared_rides,
                parsed = rides.len(),
                "header ride count does not match the ride rows"
            );
        }
        debug!(
            vehicles = header.vehicles,
            rides = rides.len(),
            max_steps = header.max_steps,
            "instance loaded"
        );

        Ok(Self { header, rides })
    }
}

impl FromStr for Instance {
    type Err = InstanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

fn leading_fields<T: DeserializeOwned>(
    record: &StringRecord,
    count: usize,
    what: &str,
) -> Result<T, InstanceError> {
    let line = record_line(record);
    if record.len() < count {
        return Err(InstanceError::malformed(
            line,
            format!("{what} has {} fields, expected {count}", record.len()),
        ));
    }
    let leading: StringRecord = record.iter().take(count).collect();
    leading.deserialize(None).map_err(|err| {
        InstanceError::malformed(line, format!("{what}: {}", describe_csv_error(&err)))
    })
}

#[cfg(test)]
const SINGLE_RIDE: &str = "2 2 1 1 1 2\n0 0 1 1 0 2\n";

#[test]
fn test_parse_header_and_rides() {
    let instance: Instance = "3 4 2 3 2 10\n0 0 1 3 2 9\n1 2 1 0 0 9\n2 0 2 2 2 9\n"
        .parse()
        .unwrap();
    assert_eq!(
        instance.header,
        InstanceHeader {
            rows: 3,
            columns: 4,
            vehicles: 2,
            declared_rides: 3,
            bonus: 2,
            max_steps: 10,
        }
    );
    assert_eq!(instance.rides.len(), 3);
    let ride = &instance.rides[1];
    assert_eq!(ride.id, RideId(1));
    assert_eq!(ride.origin, super::point::Point::new(1, 2));
    assert_eq!(ride.destination, super::point::Point::new(1, 0));
    assert_eq!(ride.length(), 2);
    assert_eq!(ride.latest_finish, 9);
}

#[test]
fn test_parse_is_repeatable() {
    let first: Instance = SINGLE_RIDE.parse().unwrap();
    let second: Instance = SINGLE_RIDE.parse().unwrap();
    assert_eq!(first.header, second.header);
    assert_eq!(first.rides, second.rides);
}

#[test]
fn test_parse_tolerates_crlf_blank_lines_and_extra_fields() {
    let instance: Instance = "2 2 1 2 1 2 99\r\n0 0 1 1 0 2 7\r\n\r\n1 1 0 0 0 2\r\n"
        .parse()
        .unwrap();
    assert_eq!(instance.rides.len(), 2);
    assert_eq!(instance.rides[1].id, RideId(1));
    assert_eq!(instance.rides[0].latest_finish, 2);
}

#[test]
fn test_missing_header_is_malformed() {
    let err = "".parse::<Instance>().unwrap_err();
    assert!(matches!(err, InstanceError::MalformedInstance { line: 1, .. }));
}

#[test]
fn test_short_header_is_malformed() {
    let err = "2 2 1\n0 0 1 1 0 2\n".parse::<Instance>().unwrap_err();
    match err {
        InstanceError::MalformedInstance { line, reason } => {
            assert_eq!(line, 1);
            assert!(reason.contains("header has 3 fields"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_short_ride_row_is_malformed() {
    let err = "2 2 1 2 1 2\n0 0 1 1 0 2\n0 0 1\n"
        .parse::<Instance>()
        .unwrap_err();
    match err {
        InstanceError::MalformedInstance { line, reason } => {
            assert_eq!(line, 3);
            assert!(reason.contains("ride has 3 fields"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_non_integer_field_is_malformed() {
    let err = "2 2 1 1 1 2\n0 0 x 1 0 2\n".parse::<Instance>().unwrap_err();
    assert!(matches!(err, InstanceError::MalformedInstance { line: 2, .. }));

    let err = "2 2 -1 1 1 2\n".parse::<Instance>().unwrap_err();
    assert!(matches!(err, InstanceError::MalformedInstance { line: 1, .. }));
}

#[test]
fn test_out_of_range_integers_are_malformed() {
    let err = "2 2 1 1 1 2\n-9223372036854775808 0 1 1 0 2\n"
        .parse::<Instance>()
        .unwrap_err();
    assert!(matches!(err, InstanceError::MalformedInstance { line: 2, .. }), "{err:?}");

    let err = "2 2 1 1 1 2\n0 0 1 1 0 3000000000\n"
        .parse::<Instance>()
        .unwrap_err();
    assert!(matches!(err, InstanceError::MalformedInstance { line: 2, .. }), "{err:?}");

    let err = "2 2 1 0 1 9223372036854775807\n".parse::<Instance>().unwrap_err();
    assert!(matches!(err, InstanceError::MalformedInstance { line: 1, .. }), "{err:?}");

    // the extremes of the accepted range still load and measure without overflow
    let input = "2 2 1 1 1 2\n-2147483648 -2147483648 2147483647 2147483647 0 2\n";
    let instance: Instance = input.parse().unwrap();
    assert_eq!(instance.rides[0].length(), 2 * (2 * i64::from(i32::MAX) + 1));
}

#[test]
fn test_load_from_file() {
    use std::io::Write as _;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SINGLE_RIDE.as_bytes()).unwrap();
    let instance = Instance::load(file.path()).unwrap();
    assert_eq!(instance.rides.len(), 1);
    assert_eq!(instance.header.vehicles, 1);

    let missing = Instance::load(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(InstanceError::Io(_))));
}
