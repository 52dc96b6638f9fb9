use std::cell::RefCell;

use candid::CandidType;
use ringbuffer::{AllocRingBuffer, NonPowerOfTwo, RingBuffer};

use crate::platform;

/// A trait for the object that consumes already formatted log line.
pub trait Writer: Send + Sync {
    fn print(&self, line: &str);
}

/// Writer that forwards every line to all of the inner writers.
#[derive(Default)]
pub struct MultiWriter {
    pub(crate) writers: Vec<Box<dyn Writer>>,
}

impl MultiWriter {
    pub fn add(&mut self, writer: Box<dyn Writer>) {
        self.writers.push(writer)
    }
}

impl Writer for MultiWriter {
    fn print(&self, line: &str) {
        for writer in &self.writers {
            writer.print(line);
        }
    }
}

/// Writer implementation that prints the given data to the console
pub struct ConsoleWriter {}

impl Writer for ConsoleWriter {
    fn print(&self, line: &str) {
        platform::print(line);
    }
}

const INIT_LOG_CAPACITY: usize = 128;

/// Records kept in memory along with the number of records written since the buffer was created.
struct LogRecords {
    written: usize,
    records: AllocRingBuffer<String, NonPowerOfTwo>,
}

thread_local! {
    static LOG_RECORDS: RefCell<LogRecords> = RefCell::new(LogRecords {
        written: 0,
        records: AllocRingBuffer::with_capacity_non_power_of_two(INIT_LOG_CAPACITY),
    });
}

/// Writer that stores the latest records in a thread-local circular buffer.
pub struct InMemoryWriter {
    max_record_length: usize,
}

#[derive(Debug, Default, PartialEq, Eq, CandidType)]
pub struct Logs {
    /// the list of logs
    pub logs: Vec<Log>,
    /// the count of logs written since the logger was initialized
    pub all_logs_count: usize,
}

#[derive(Debug, Default, PartialEq, Eq, CandidType)]
pub struct Log {
    /// the log text
    pub log: String,
    /// the offset of the log
    pub offset: usize,
}

impl InMemoryWriter {
    pub fn new(max_record_length: usize) -> Self {
        Self { max_record_length }
    }

    /// Replaces the buffer with an empty one of the given capacity.
    pub fn init_buffer(capacity: usize) {
        LOG_RECORDS.with(|records| {
            *records.borrow_mut() = LogRecords {
                written: 0,
                records: AllocRingBuffer::with_capacity_non_power_of_two(capacity.max(1)),
            };
        });
    }

    /// Returns up to `max_count` records starting at `from_offset`. Records that were already
    /// evicted from the buffer are skipped.
    pub fn take_records(max_count: usize, from_offset: usize) -> Logs {
        LOG_RECORDS.with(|records| {
            let records = records.borrow();
            let all_logs_count = records.written;
            let first_available = all_logs_count - records.records.len();
            let start = from_offset.max(first_available);

            let logs = records
                .records
                .iter()
                .skip(start - first_available)
                .take(max_count)
                .enumerate()
                .map(|(index, log)| Log {
                    log: log.clone(),
                    offset: start + index,
                })
                .collect();

            Logs {
                logs,
                all_logs_count,
            }
        })
    }
}

impl Writer for InMemoryWriter {
    fn print(&self, line: &str) {
        let mut line = line.to_string();
        if line.len() > self.max_record_length {
            let mut end = self.max_record_length;
            while !line.is_char_boundary(end) {
                end -= 1;
            }
            line.truncate(end);
        }

        LOG_RECORDS.with(|records| {
            let mut records = records.borrow_mut();
            records.written += 1;
            records.records.push(line);
        });
    }
}
