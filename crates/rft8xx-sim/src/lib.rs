//! rft8xx-sim - Simulated FT80x/FT81x chip for testing
//!
//! This crate provides a [`Transport`] that emulates the chip's side of the
//! bus in memory. It decodes transaction headers, keeps the full 22-bit
//! address space, records host commands and published FIFO write pointers,
//! and runs a small coprocessor that consumes the command FIFO whenever
//! the host polls the read pointer. It's useful for testing and
//! development without real hardware.

use std::collections::VecDeque;

use rft8xx_core::bus::{Header, Intent, Transport};
use rft8xx_core::chip::{ChipMap, FT800};
use rft8xx_core::cmd;
use rft8xx_core::error::{Error, Result, TransportFailure};
use rft8xx_core::fifo::{FIFO_FAULT, TEXT_HEADER_LEN};
use rft8xx_core::host::HostCommand;

/// Size of the emulated address space
pub const MEMORY_SIZE: usize = 1 << 22;

/// Configuration for the simulated chip
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Register and memory layout
    pub map: &'static ChipMap,
    /// Dummy bytes the chip expects between a read header and the data
    pub read_dummy_bytes: u8,
    /// Commands executed per read pointer poll (0 stalls the coprocessor)
    pub commands_per_poll: usize,
    /// Value `CMD_CALIBRATE` stores in its result slot
    pub calibration_result: u32,
    /// Initial touch transform registers A..F
    pub touch_transform: [u32; 6],
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map: &FT800,
            read_dummy_bytes: 1,
            commands_per_poll: 4,
            calibration_result: 1,
            touch_transform: [0x0001_0000, 0, 0, 0, 0x0001_0000, 0],
        }
    }
}

/// A command the simulated coprocessor consumed from the FIFO
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCommand {
    /// Plain display list word
    Word(u32),
    /// Coprocessor command with its fixed operands
    Command { opcode: u32, operands: Vec<u32> },
    /// `CMD_TEXT`
    Text {
        x: i16,
        y: i16,
        font: u16,
        options: u16,
        text: String,
    },
}

/// Simulated chip
pub struct SimChip {
    config: SimConfig,
    memory: Vec<u8>,
    pending: Vec<u8>,
    read_served: bool,
    host_commands: Vec<HostCommand>,
    published: Vec<u32>,
    swaps: Vec<u32>,
    executed: Vec<SimCommand>,
    script: VecDeque<u32>,
    read_pointer_polls: usize,
    operations: usize,
    fail_after: Option<usize>,
    elapsed_us: u64,
    irq: bool,
    clock_raised: bool,
}

impl SimChip {
    /// Create a new simulated chip with the given configuration
    pub fn new(config: SimConfig) -> Self {
        let mut chip = Self {
            memory: vec![0; MEMORY_SIZE],
            pending: Vec::new(),
            read_served: false,
            host_commands: Vec::new(),
            published: Vec::new(),
            swaps: Vec::new(),
            executed: Vec::new(),
            script: VecDeque::new(),
            read_pointer_polls: 0,
            operations: 0,
            fail_after: None,
            elapsed_us: 0,
            irq: false,
            clock_raised: false,
            config,
        };
        let map = chip.config.map;
        chip.poke(map.reg_id, &[map.chip_id]);
        for (index, value) in chip.config.touch_transform.into_iter().enumerate() {
            chip.poke(map.reg_touch_transform(index as u32), &value.to_le_bytes());
        }
        chip
    }

    /// Create a simulated FT800 with default configuration
    pub fn new_default() -> Self {
        Self::new(SimConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The whole address space
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Write bytes directly into chip memory, bypassing the bus
    pub fn poke(&mut self, address: u32, bytes: &[u8]) {
        let start = address as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Read a 16-bit value directly from chip memory
    pub fn peek16(&self, address: u32) -> u16 {
        let a = address as usize;
        u16::from_le_bytes([self.memory[a], self.memory[a + 1]])
    }

    /// Read a 32-bit value directly from chip memory
    pub fn peek32(&self, address: u32) -> u32 {
        let a = address as usize;
        u32::from_le_bytes([
            self.memory[a],
            self.memory[a + 1],
            self.memory[a + 2],
            self.memory[a + 3],
        ])
    }

    /// Host commands received so far
    pub fn host_commands(&self) -> &[HostCommand] {
        &self.host_commands
    }

    /// Every value written to the FIFO write pointer register
    pub fn published(&self) -> &[u32] {
        &self.published
    }

    /// Every value written to the display list swap register
    pub fn swaps(&self) -> &[u32] {
        &self.swaps
    }

    /// Commands the coprocessor has consumed
    pub fn executed(&self) -> &[SimCommand] {
        &self.executed
    }

    /// Number of host reads that covered the FIFO read pointer
    pub fn read_pointer_polls(&self) -> usize {
        self.read_pointer_polls
    }

    /// Number of transport calls (write, read, flush, irq) seen so far
    pub fn operations(&self) -> usize {
        self.operations
    }

    /// Whether the host switched to its fast bus clock
    pub fn clock_raised(&self) -> bool {
        self.clock_raised
    }

    /// Total time spent in `delay_us`
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    /// Current FIFO read pointer
    pub fn read_pointer(&self) -> u32 {
        self.peek16(self.config.map.reg_cmd_read) as u32
    }

    /// Current FIFO write pointer
    pub fn write_pointer(&self) -> u32 {
        self.peek16(self.config.map.reg_cmd_write) as u32
    }

    /// Set both FIFO pointers, as if the FIFO had drained at `offset`
    pub fn set_fifo_pointers(&mut self, offset: u32) {
        let map = self.config.map;
        let bytes = (offset as u16).to_le_bytes();
        self.poke(map.reg_cmd_read, &bytes);
        self.poke(map.reg_cmd_write, &bytes);
    }

    /// Replace the coprocessor with a fixed sequence of read pointer values
    ///
    /// Each poll of the read pointer takes the next value. Once the script
    /// runs out the coprocessor executes commands again.
    pub fn script_read_pointer(&mut self, values: &[u32]) {
        self.script.extend(values.iter().copied());
    }

    /// Change how many commands are consumed per poll
    pub fn set_commands_per_poll(&mut self, count: usize) {
        self.config.commands_per_poll = count;
    }

    /// Fail every transport call after `count` more successful ones
    pub fn fail_after(&mut self, count: usize) {
        self.fail_after = Some(self.operations + count);
    }

    /// Report a coprocessor fault through the read pointer
    pub fn inject_fault(&mut self) {
        let reg = self.config.map.reg_cmd_read;
        self.poke(reg, &(FIFO_FAULT as u16).to_le_bytes());
    }

    /// Drive the interrupt line
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq = asserted;
    }

    fn operation(&mut self, failure: TransportFailure) -> Result<()> {
        self.operations += 1;
        match self.fail_after {
            Some(limit) if self.operations > limit => Err(Error::Transport(failure)),
            _ => Ok(()),
        }
    }

    fn header(&self) -> Option<(u32, Intent)> {
        let bytes: [u8; 3] = self.pending.get(..3)?.try_into().ok()?;
        Header::decode(bytes)
    }

    fn handle_host_command(&mut self, code: u8) {
        match HostCommand::from_code(code) {
            Some(cmd) => {
                log::trace!("sim: host command {}", cmd);
                self.host_commands.push(cmd);
            }
            None => log::warn!("sim: unknown host command 0x{:02X}", code),
        }
    }

    fn handle_write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let start = address as usize;
        if start + data.len() > MEMORY_SIZE {
            log::warn!("sim: write past end of memory at 0x{:06X}", address);
            return Err(Error::Transport(TransportFailure::Write));
        }
        self.memory[start..start + data.len()].copy_from_slice(data);

        let map = self.config.map;
        if address == map.reg_cmd_write {
            let offset = self.write_pointer();
            log::trace!("sim: write pointer published at 0x{:03X}", offset);
            self.published.push(offset);
        } else if address == map.reg_dlswap {
            self.swaps.push(self.peek32(address));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Coprocessor
    // ------------------------------------------------------------------

    fn poll_read_pointer(&mut self) {
        self.read_pointer_polls += 1;
        if let Some(value) = self.script.pop_front() {
            let reg = self.config.map.reg_cmd_read;
            self.poke(reg, &(value as u16).to_le_bytes());
            return;
        }
        for _ in 0..self.config.commands_per_poll {
            if !self.step() {
                break;
            }
        }
    }

    fn fifo_mask(&self) -> u32 {
        self.config.map.cmd_fifo_size - 1
    }

    fn fifo_byte(&self, offset: u32) -> u8 {
        self.memory[(self.config.map.ram_cmd + (offset & self.fifo_mask())) as usize]
    }

    fn fifo_word(&self, offset: u32) -> u32 {
        u32::from_le_bytes([
            self.fifo_byte(offset),
            self.fifo_byte(offset + 1),
            self.fifo_byte(offset + 2),
            self.fifo_byte(offset + 3),
        ])
    }

    /// Execute one complete command; false if there is none
    fn step(&mut self) -> bool {
        let read = self.read_pointer();
        let write = self.write_pointer();
        if read == FIFO_FAULT || read == write {
            return false;
        }
        let available = write.wrapping_sub(read) & self.fifo_mask();
        let Some((command, len)) = self.decode(read, available) else {
            return false;
        };

        if let SimCommand::Command {
            opcode: cmd::CMD_CALIBRATE,
            ..
        } = command
        {
            let slot = self.config.map.ram_cmd + ((read + 4) & self.fifo_mask());
            let result = self.config.calibration_result;
            self.poke(slot, &result.to_le_bytes());
        }
        log::trace!("sim: executed {:?}", command);
        self.executed.push(command);

        let next = (read + len) & self.fifo_mask();
        let reg = self.config.map.reg_cmd_read;
        self.poke(reg, &(next as u16).to_le_bytes());
        true
    }

    fn decode(&self, read: u32, available: u32) -> Option<(SimCommand, u32)> {
        if available < 4 {
            return None;
        }
        let opcode = self.fifo_word(read);
        let Some(count) = cmd::operand_words(opcode) else {
            return Some((SimCommand::Word(opcode), 4));
        };
        let fixed = 4 + 4 * count as u32;
        if fixed > available {
            return None;
        }
        let operands: Vec<u32> = (0..count as u32)
            .map(|i| self.fifo_word(read + 4 + 4 * i))
            .collect();
        if opcode != cmd::CMD_TEXT {
            return Some((SimCommand::Command { opcode, operands }, fixed));
        }

        let start = read + TEXT_HEADER_LEN as u32;
        let mut bytes = Vec::new();
        loop {
            if fixed + bytes.len() as u32 >= available {
                return None;
            }
            match self.fifo_byte(start + bytes.len() as u32) {
                0 => break,
                b => bytes.push(b),
            }
        }
        let padded = (bytes.len() as u32 + 1 + 3) & !3;
        if fixed + padded > available {
            return None;
        }
        let command = SimCommand::Text {
            x: operands[0] as u16 as i16,
            y: (operands[0] >> 16) as u16 as i16,
            font: operands[1] as u16,
            options: (operands[1] >> 16) as u16,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        };
        Some((command, fixed + padded))
    }

    fn serve_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.operation(TransportFailure::Read)?;
        let Some((address, Intent::Read)) = self.header() else {
            log::warn!("sim: read without a read header");
            return Err(Error::Transport(TransportFailure::Read));
        };
        let expected = 3 + self.config.read_dummy_bytes as usize;
        if self.pending.len() != expected {
            log::warn!(
                "sim: read header with {} dummy byte(s), expected {}",
                self.pending.len().saturating_sub(3),
                self.config.read_dummy_bytes
            );
            return Err(Error::Transport(TransportFailure::Read));
        }

        let start = address as usize;
        let end = start + buf.len();
        if end > MEMORY_SIZE {
            return Err(Error::Transport(TransportFailure::Read));
        }
        let reg = self.config.map.reg_cmd_read;
        if address <= reg && (reg as usize) < end {
            self.poll_read_pointer();
        }
        buf.copy_from_slice(&self.memory[start..end]);
        self.read_served = true;
        Ok(buf.len())
    }
}

impl Transport for SimChip {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.operation(TransportFailure::Write)?;
        self.pending.extend_from_slice(bytes);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let result = self.serve_read(buf);
        if result.is_err() {
            // A rejected read ends the transaction
            self.pending.clear();
        }
        result
    }

    fn irq_asserted(&mut self) -> Result<bool> {
        self.operation(TransportFailure::Irq)?;
        Ok(self.irq)
    }

    fn flush(&mut self) -> Result<()> {
        self.operation(TransportFailure::Flush)?;
        let frame = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.read_served) || frame.is_empty() {
            return Ok(());
        }
        if frame.len() == 3 && (frame[0] >> 6 == 0b01 || frame == [0, 0, 0]) {
            self.handle_host_command(frame[0]);
            return Ok(());
        }
        let header = frame.get(..3).and_then(|h| Header::decode([h[0], h[1], h[2]]));
        match header {
            Some((address, Intent::Write)) => self.handle_write(address, &frame[3..]),
            // Zero-length read
            Some((_, Intent::Read)) => Ok(()),
            None => {
                log::warn!("sim: malformed frame {:02X?}", frame);
                Err(Error::Transport(TransportFailure::Write))
            }
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += us as u64;
    }

    fn raise_clock(&mut self) -> Result<()> {
        self.operation(TransportFailure::Io)?;
        self.clock_raised = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rft8xx_core::access::Accessor;
    use rft8xx_core::bringup::{self, ClockSource, PllFrequency};
    use rft8xx_core::bus::{Framing, MAX_ADDRESS};
    use rft8xx_core::chip::FT81X;
    use rft8xx_core::cmd::TextOptions;
    use rft8xx_core::fifo::{ring, CommandFifo, CommandStream};
    use rft8xx_core::sync::{DrainPolicy, DrainTarget};

    fn policy() -> DrainPolicy<'static> {
        DrainPolicy::with_timeout(100_000, 100)
    }

    #[test]
    fn test_dlstart_swap_drain() {
        let mut acc = Accessor::new(SimChip::new_default());
        let fifo = CommandFifo::new(&FT800).unwrap();

        let mut offset = 0;
        offset = fifo.append_word(&mut acc, offset, cmd::CMD_DLSTART);
        offset = fifo.append_word(&mut acc, offset, cmd::CMD_SWAP);
        assert_eq!(offset, 8);
        fifo.publish(&mut acc, offset);
        acc.checkpoint().unwrap();

        acc.transport_mut().script_read_pointer(&[0, 0, 4, 8]);
        fifo.wait_drained(&mut acc, DrainTarget::Offset(8), &policy())
            .unwrap();

        let sim = acc.into_transport();
        // Returned at the transition to 8, not at 0 or 4
        assert_eq!(sim.read_pointer_polls(), 4);
        assert_eq!(sim.published(), &[8]);
        assert_eq!(sim.peek32(FT800.ram_cmd), cmd::CMD_DLSTART);
        assert_eq!(sim.peek32(FT800.ram_cmd + 4), cmd::CMD_SWAP);
    }

    #[test]
    fn test_write16_lands_in_memory() {
        let config = SimConfig {
            map: &FT81X,
            ..SimConfig::default()
        };
        let mut acc = Accessor::new(SimChip::new(config));
        acc.write16(0x30_2070, 0x01C4);
        acc.checkpoint().unwrap();
        assert_eq!(acc.transport().peek16(0x30_2070), 0x01C4);
        assert_eq!(acc.read16(0x30_2070), 0x01C4);
    }

    #[test]
    fn test_chip_id() {
        let mut acc = Accessor::new(SimChip::new_default());
        assert_eq!(acc.read8(FT800.reg_id), 124);
        assert_eq!(acc.error(), None);
        assert_eq!(bringup::check_chip_id(&mut acc, &FT800), Ok(0x7C));
    }

    #[test]
    fn test_dummy_byte_mismatch() {
        let framing = Framing::with_read_dummy_bytes(2);
        let mut acc = Accessor::with_framing(SimChip::new_default(), framing);
        assert_eq!(acc.read8(FT800.reg_id), 0);
        assert_eq!(
            acc.checkpoint(),
            Err(Error::Transport(TransportFailure::Read))
        );
    }

    #[test]
    fn test_latched_failure_stops_traffic() {
        let mut sim = SimChip::new_default();
        sim.fail_after(2);
        let mut acc = Accessor::new(sim);

        acc.write8(FT800.reg_pclk, 0);
        acc.write8(FT800.reg_pwm_duty, 0);
        let err = acc.error();
        assert_eq!(err, Some(Error::Transport(TransportFailure::Write)));

        let seen = acc.transport().operations();
        for _ in 0..50 {
            acc.write16(FT800.reg_hsize, 480);
            acc.read32(FT800.reg_id);
        }
        assert_eq!(acc.transport().operations(), seen);
        assert_eq!(acc.error(), err);
    }

    #[test]
    fn test_write_after_failed_read_lands() {
        let mut acc = Accessor::new(SimChip::new_default());
        assert_eq!(acc.read32(MAX_ADDRESS - 1), 0);
        assert_eq!(
            acc.checkpoint(),
            Err(Error::Transport(TransportFailure::Read))
        );

        acc.clear_error();
        acc.write8(FT800.reg_pclk, 5);
        assert_eq!(acc.checkpoint(), Ok(()));
        assert_eq!(acc.transport().peek16(FT800.reg_pclk) & 0xFF, 5);
        assert_eq!(acc.read8(FT800.reg_pclk), 5);
    }

    #[test]
    fn test_irq_line() {
        let mut acc = Accessor::new(SimChip::new_default());
        assert!(!acc.irq_asserted());

        acc.transport_mut().set_irq(true);
        assert!(acc.irq_asserted());
        assert_eq!(acc.checkpoint(), Ok(()));

        acc.transport_mut().set_irq(false);
        assert!(!acc.irq_asserted());
    }

    #[test]
    fn test_word_wraps_at_end_of_window() {
        let mut acc = Accessor::new(SimChip::new_default());
        let capacity = FT800.cmd_fifo_size;
        ring::write_wrapped(
            &mut acc,
            FT800.ram_cmd,
            capacity,
            capacity - 2,
            &0xAABB_CCDDu32.to_le_bytes(),
        );
        acc.checkpoint().unwrap();

        let sim = acc.into_transport();
        let base = FT800.ram_cmd as usize;
        assert_eq!(&sim.memory()[base + capacity as usize - 2..base + capacity as usize], &[0xDD, 0xCC]);
        assert_eq!(&sim.memory()[base..base + 2], &[0xBB, 0xAA]);
        // Nothing written past the window
        assert_eq!(sim.memory()[base + capacity as usize], 0);
    }

    #[test]
    fn test_coprocessor_executes_stream() {
        let mut acc = Accessor::new(SimChip::new_default());
        let fifo = CommandFifo::new(&FT800).unwrap();

        let mut stream = CommandStream::new(&mut acc, &fifo, 0);
        stream.word(cmd::CMD_DLSTART);
        stream.text(240, 136, 31, TextOptions::CENTER, "hello").unwrap();
        stream.word(cmd::CMD_SWAP);
        stream.finish(&policy()).unwrap();
        assert_eq!(stream.offset(), 4 + 12 + 8 + 4);

        let sim = acc.into_transport();
        assert_eq!(
            sim.executed(),
            &[
                SimCommand::Command {
                    opcode: cmd::CMD_DLSTART,
                    operands: vec![]
                },
                SimCommand::Text {
                    x: 240,
                    y: 136,
                    font: 31,
                    options: TextOptions::CENTER.bits(),
                    text: "hello".into(),
                },
                SimCommand::Command {
                    opcode: cmd::CMD_SWAP,
                    operands: vec![]
                },
            ]
        );
        assert_eq!(sim.read_pointer(), 28);
    }

    #[test]
    fn test_text_across_wrap() {
        let mut sim = SimChip::new_default();
        sim.set_fifo_pointers(4088);
        let mut acc = Accessor::new(sim);
        let fifo = CommandFifo::new(&FT800).unwrap();

        let mut stream = CommandStream::resume(&mut acc, &fifo);
        assert_eq!(stream.offset(), 4088);
        stream
            .text(-5, 10, 26, TextOptions::empty(), "wrapped text")
            .unwrap();
        stream.finish(&policy()).unwrap();
        // 12 header bytes + 13 bytes padded to 16
        assert_eq!(stream.offset(), (4088 + 28) % 4096);

        let sim = acc.into_transport();
        assert_eq!(
            sim.executed(),
            &[SimCommand::Text {
                x: -5,
                y: 10,
                font: 26,
                options: 0,
                text: "wrapped text".into(),
            }]
        );
    }

    #[test]
    fn test_calibrate_result_and_transform() {
        let mut acc = Accessor::new(SimChip::new_default());
        let fifo = CommandFifo::new(&FT800).unwrap();

        let mut stream = CommandStream::new(&mut acc, &fifo, 0);
        stream.word(cmd::CMD_DLSTART);
        stream.command(cmd::CMD_CALIBRATE, &[0]);
        stream.finish(&policy()).unwrap();
        let end = stream.offset();

        assert_eq!(bringup::read_calibration_result(&mut acc, &fifo, end), Ok(1));
        let transform = bringup::read_touch_transform(&mut acc, &FT800).unwrap();
        assert_eq!(transform.0, SimConfig::default().touch_transform);
    }

    #[test]
    fn test_wake_records_host_commands() {
        let mut acc = Accessor::new(SimChip::new_default());
        bringup::wake(&mut acc, ClockSource::External, PllFrequency::Mhz48).unwrap();
        let sim = acc.into_transport();
        assert_eq!(
            sim.host_commands(),
            &[
                HostCommand::Active,
                HostCommand::ClockExternal,
                HostCommand::Clock48M
            ]
        );
        assert_eq!(sim.elapsed_us(), 15_000);
        assert!(sim.clock_raised());
    }

    #[test]
    fn test_initial_display_list_swaps() {
        let mut acc = Accessor::new(SimChip::new_default());
        bringup::write_initial_display_list(&mut acc, &FT800).unwrap();
        let sim = acc.into_transport();
        assert_eq!(sim.swaps(), &[2]);
        assert_eq!(sim.peek32(FT800.ram_dl + 4), 0x2600_0007);
    }

    #[test]
    fn test_fault_reported() {
        let mut acc = Accessor::new(SimChip::new_default());
        let fifo = CommandFifo::new(&FT800).unwrap();
        let offset = fifo.append_word(&mut acc, 0, cmd::CMD_COLDSTART);
        fifo.publish(&mut acc, offset);
        acc.transport_mut().set_commands_per_poll(0);
        acc.transport_mut().inject_fault();
        assert_eq!(
            fifo.wait_drained(&mut acc, DrainTarget::Empty, &policy()),
            Err(Error::CoprocessorFault)
        );
    }

    #[test]
    fn test_stalled_coprocessor_times_out() {
        let mut sim = SimChip::new_default();
        sim.set_commands_per_poll(0);
        let mut acc = Accessor::new(sim);
        let fifo = CommandFifo::new(&FT800).unwrap();
        let offset = fifo.append_word(&mut acc, 0, cmd::CMD_SWAP);
        fifo.publish(&mut acc, offset);

        let result = fifo.wait_drained(
            &mut acc,
            DrainTarget::Offset(offset),
            &DrainPolicy::with_timeout(5_000, 500),
        );
        assert_eq!(
            result,
            Err(Error::DrainTimeout {
                read: 0,
                target: 4
            })
        );
        assert_eq!(acc.transport().elapsed_us(), 5_000);
    }
}
