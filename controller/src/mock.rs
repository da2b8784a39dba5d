//! Transaction-logging mock of the blocking I2C traits for tests.

use embedded_hal::blocking::i2c;
use std::collections::VecDeque;

/// Unit bus error, stands in for whatever the real HAL returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Write {
        addr: u8,
        data: Vec<u8>,
    },
    WriteRead {
        addr: u8,
        data: Vec<u8>,
        read_len: usize,
    },
}

/// Records every transaction and serves pre-queued read payloads. A
/// `write_read` with no queued payload, or any transaction on a failing
/// bus, returns [`BusFault`].
pub struct MockBus {
    transactions: Vec<Transaction>,
    read_data: VecDeque<Vec<u8>>,
    fail: bool,
}

impl MockBus {
    pub fn new() -> Self {
        MockBus {
            transactions: Vec::new(),
            read_data: VecDeque::new(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        let mut bus = MockBus::new();
        bus.fail = true;
        bus
    }

    pub fn queue_read(&mut self, data: &[u8]) {
        self.read_data.push_back(data.to_vec());
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }
}

impl i2c::Write for MockBus {
    type Error = BusFault;

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusFault> {
        if self.fail {
            return Err(BusFault);
        }
        self.transactions.push(Transaction::Write {
            addr,
            data: bytes.to_vec(),
        });
        Ok(())
    }
}

impl i2c::WriteRead for MockBus {
    type Error = BusFault;

    fn write_read(
        &mut self,
        addr: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), BusFault> {
        if self.fail {
            return Err(BusFault);
        }
        self.transactions.push(Transaction::WriteRead {
            addr,
            data: bytes.to_vec(),
            read_len: buffer.len(),
        });
        let data = self.read_data.pop_front().ok_or(BusFault)?;
        buffer.copy_from_slice(&data);
        Ok(())
    }
}
