use std::{collections::HashMap, fs::File, io::Read, path::Path};

use thiserror::Error;

use crate::model::{instance::Instance, record_line, ride::RideId, space_separated_reader};

use super::Assignment;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unable to read assignment: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to read assignment: {0}")]
    Csv(#[from] csv::Error),
    #[error("the assignment is empty")]
    EmptyOutput,
    #[error("malformed assignment at line {line}: {reason}")]
    MalformedOutput { line: u64, reason: String },
    #[error("line {line} declares {declared} rides but lists {listed}")]
    RideCountMismatch {
        line: u64,
        declared: usize,
        listed: usize,
    },
    #[error("ride {ride} on line {line} was already given to the vehicle on line {first_line}")]
    DuplicateRideAssignment {
        ride: RideId,
        first_line: u64,
        line: u64,
    },
    #[error("assignment has {lines} vehicle lines but the instance has {vehicles} vehicles")]
    FleetSizeMismatch { lines: usize, vehicles: usize },
    #[error("ride {ride} on line {line} does not exist, the instance has {rides} rides")]
    UnknownRide { ride: RideId, line: u64, rides: usize },
}

/// A structurally valid assignment as read back from its text form.
#[derive(Debug, Clone)]
pub struct ValidationSummary {
    assignment: Assignment,
    lines: Vec<u64>,
}

impl ValidationSummary {
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn vehicles(&self) -> usize {
        self.assignment.routes().len()
    }

    pub fn assigned_rides(&self) -> usize {
        self.assignment.assigned_rides()
    }

    /// Checks the assignment against the instance it was computed for: one line per vehicle
    /// and only rides that exist.
    pub fn check_against(&self, instance: &Instance) -> Result<(), ValidationError> {
        if self.vehicles() != instance.header.vehicles {
            return Err(ValidationError::FleetSizeMismatch {
                lines: self.vehicles(),
                vehicles: instance.header.vehicles,
            });
        }
        let rides = instance.rides.len();
        for (route, &line) in self.assignment.routes().iter().zip(&self.lines) {
            if let Some(&ride) = route.iter().find(|ride| ride.0 >= rides) {
                return Err(ValidationError::UnknownRide { ride, line, rides });
            }
        }
        Ok(())
    }
}

pub fn validate_file(path: impl AsRef<Path>) -> Result<ValidationSummary, ValidationError> {
    validate_reader(File::open(path)?)
}

/// Re-reads an assignment and checks that every line's count matches its rides and that no
/// ride is given to more than one vehicle.
pub fn validate_reader<R: Read>(reader: R) -> Result<ValidationSummary, ValidationError> {
    let mut reader = space_separated_reader(reader);
    let mut owners: HashMap<RideId, u64> = HashMap::new();
    let mut routes = Vec::new();
    let mut lines = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record_line(&record);
        // tolerate trailing separators
        let mut fields = record.iter().filter(|f| !f.is_empty());

        let declared = match fields.next() {
            Some(field) => parse_field(field, line)?,
            None => continue,
        };
        let route = fields
            .map(|field| parse_field(field, line).map(RideId))
            .collect::<Result<Vec<_>, _>>()?;
        if route.len() != declared {
            return Err(ValidationError::RideCountMismatch {
                line,
                declared,
                listed: route.len(),
            });
        }
        for &ride in &route {
            if let Some(&first_line) = owners.get(&ride) {
                return Err(ValidationError::DuplicateRideAssignment {
                    ride,
                    first_line,
                    line,
                });
            }
            owners.insert(ride, line);
        }

        routes.push(route);
        lines.push(line);
    }

    if routes.is_empty() {
        return Err(ValidationError::EmptyOutput);
    }
    Ok(ValidationSummary {
        assignment: Assignment::new(routes),
        lines,
    })
}

fn parse_field(field: &str, line: u64) -> Result<usize, ValidationError> {
    field
        .parse()
        .map_err(|err| ValidationError::MalformedOutput {
            line,
            reason: format!("{field:?}: {err}"),
        })
}

#[test]
fn test_accepts_valid_assignment() {
    let summary = validate_reader("1 0\n2 3 1\n0\n".as_bytes()).unwrap();
    assert_eq!(summary.vehicles(), 3);
    assert_eq!(summary.assigned_rides(), 3);
    assert_eq!(
        summary.assignment().routes()[1],
        vec![RideId(3), RideId(1)]
    );
}

#[test]
fn test_rejects_empty_output() {
    assert!(matches!(
        validate_reader("".as_bytes()),
        Err(ValidationError::EmptyOutput)
    ));
    assert!(matches!(
        validate_reader("\n\n".as_bytes()),
        Err(ValidationError::EmptyOutput)
    ));
}

#[test]
fn test_rejects_count_mismatch() {
    let err = validate_reader("1 0\n3 1 2\n".as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::RideCountMismatch {
            line: 2,
            declared: 3,
            listed: 2
        }
    ));
}

#[test]
fn test_rejects_duplicate_ride() {
    let err = validate_reader("2 0 4\n0\n1 4\n".as_bytes()).unwrap_err();
    match err {
        ValidationError::DuplicateRideAssignment {
            ride,
            first_line,
            line,
        } => {
            assert_eq!(ride, RideId(4));
            assert_eq!(first_line, 1);
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_rejects_non_integer_tokens() {
    let err = validate_reader("1 a\n".as_bytes()).unwrap_err();
    assert!(matches!(err, ValidationError::MalformedOutput { line: 1, .. }));
}

#[test]
fn test_tolerates_trailing_separator() {
    let summary = validate_reader("0 \n1 2 \n".as_bytes()).unwrap();
    assert_eq!(summary.vehicles(), 2);
    assert_eq!(summary.assigned_rides(), 1);
}

#[test]
fn test_check_against_instance() {
    let instance: Instance = "2 2 2 2 1 5\n0 0 1 1 0 5\n1 1 0 0 0 5\n".parse().unwrap();

    let ok = validate_reader("1 1\n1 0\n".as_bytes()).unwrap();
    assert!(ok.check_against(&instance).is_ok());

    let short = validate_reader("1 1\n".as_bytes()).unwrap();
    assert!(matches!(
        short.check_against(&instance),
        Err(ValidationError::FleetSizeMismatch {
            lines: 1,
            vehicles: 2
        })
    ));

    let unknown = validate_reader("1 1\n1 2\n".as_bytes()).unwrap();
    assert!(matches!(
        unknown.check_against(&instance),
        Err(ValidationError::UnknownRide { line: 2, rides: 2, .. })
    ));
}
