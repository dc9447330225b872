//! Recording transport for unit tests

#![allow(dead_code)]

use crate::bus::Transport;
use crate::error::{Error, Result, TransportFailure};
use std::collections::VecDeque;
use std::vec::Vec;

/// One completed (flushed) transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recorded {
    pub written: Vec<u8>,
    pub read_len: usize,
}

/// Transport that records every byte and answers reads from a queue
#[derive(Debug, Default)]
pub struct Recorder {
    pub transactions: Vec<Recorded>,
    pub current: Recorded,
    pub responses: VecDeque<u8>,
    pub write_calls: usize,
    pub read_calls: usize,
    pub flush_calls: usize,
    pub fail_writes_after: Option<usize>,
    pub elapsed_us: u64,
    pub clock_raises: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, bytes: &[u8]) -> Self {
        self.responses.extend(bytes.iter().copied());
        self
    }

    pub fn fail_writes_after(mut self, n: usize) -> Self {
        self.fail_writes_after = Some(n);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.write_calls + self.read_calls + self.flush_calls
    }
}

impl Transport for Recorder {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_calls += 1;
        if let Some(n) = self.fail_writes_after {
            if self.write_calls > n {
                return Err(Error::Transport(TransportFailure::Write));
            }
        }
        self.current.written.extend_from_slice(bytes);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.read_calls += 1;
        self.current.read_len += buf.len();
        let mut n = 0;
        for byte in buf.iter_mut() {
            match self.responses.pop_front() {
                Some(b) => {
                    *byte = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn irq_asserted(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_calls += 1;
        let done = core::mem::take(&mut self.current);
        self.transactions.push(done);
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += us as u64;
    }

    fn raise_clock(&mut self) -> Result<()> {
        self.clock_raises += 1;
        Ok(())
    }
}
