use std::error;
use std::fmt;

#[derive(Debug)]

/**
 * Error to represent recoverable failures: invalid partition tables offered
 * through the checked constructors, and metadata which could not be decoded
 * after being replicated between ranks. Violated preconditions are not
 * errors; they panic.
 */
pub enum Error {
    EmptyPartition,
    PartitionStartsAt(i64),
    DecreasingPartition { index: usize, prev: i64, next: i64 },
    Encode(String),
    Decode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            EmptyPartition => write!(fmt, "partition table has no entries"),
            PartitionStartsAt(r) => write!(fmt, "partition table must start at row 0, got {}", r),
            DecreasingPartition { index, prev, next } => write!(fmt,
                "partition table decreases at entry {}: {} -> {}", index, prev, next),
            Encode(msg) => write!(fmt, "failed to encode metadata: {}", msg),
            Decode(msg) => write!(fmt, "failed to decode metadata: {}", msg),
        }
    }
}

impl error::Error for Error {}
