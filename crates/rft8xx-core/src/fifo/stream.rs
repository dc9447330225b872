//! Session helper tracking the host-side write offset

use super::CommandFifo;
use crate::access::Accessor;
use crate::bus::Transport;
use crate::cmd::TextOptions;
use crate::error::Result;
use crate::sync::{DrainPolicy, DrainTarget};

/// A command FIFO session: accessor, FIFO and the host-side write offset
///
/// Appends advance the offset locally. Nothing becomes visible to the
/// coprocessor until [`publish`](Self::publish) (or
/// [`finish`](Self::finish)) writes the offset to the write pointer.
///
/// ```ignore
/// let mut stream = CommandStream::resume(&mut acc, &fifo);
/// stream.word(cmd::CMD_DLSTART).word(dl::clear(ClearFlags::ALL));
/// stream.text(240, 136, 31, TextOptions::CENTER, "hello")?;
/// stream.word(dl::display()).word(cmd::CMD_SWAP);
/// stream.finish(&DrainPolicy::default())?;
/// ```
pub struct CommandStream<'a, T: Transport> {
    acc: &'a mut Accessor<T>,
    fifo: &'a CommandFifo,
    offset: u32,
    published: u32,
}

impl<'a, T: Transport> CommandStream<'a, T> {
    /// Start a stream at a known offset (e.g. 0 right after reset)
    pub fn new(acc: &'a mut Accessor<T>, fifo: &'a CommandFifo, offset: u32) -> Self {
        let offset = fifo.wrap(offset);
        Self {
            acc,
            fifo,
            offset,
            published: offset,
        }
    }

    /// Start a stream at the chip's current write pointer
    pub fn resume(acc: &'a mut Accessor<T>, fifo: &'a CommandFifo) -> Self {
        let offset = fifo.write_pointer(acc);
        Self::new(acc, fifo, offset)
    }

    /// Host-side write offset
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Bytes appended since the last publish
    pub fn unpublished(&self) -> u32 {
        self.fifo.pending(self.published, self.offset)
    }

    /// The underlying accessor
    pub fn accessor(&mut self) -> &mut Accessor<T> {
        self.acc
    }

    /// Append one word
    pub fn word(&mut self, word: u32) -> &mut Self {
        self.offset = self.fifo.append_word(self.acc, self.offset, word);
        self
    }

    /// Append an opcode and its operands
    pub fn command(&mut self, opcode: u32, operands: &[u32]) -> &mut Self {
        self.offset = self
            .fifo
            .append_command(self.acc, self.offset, opcode, operands);
        self
    }

    /// Append a `CMD_TEXT` command
    pub fn text(
        &mut self,
        x: i16,
        y: i16,
        font: u16,
        options: TextOptions,
        text: &str,
    ) -> Result<&mut Self> {
        self.offset = self
            .fifo
            .append_text(self.acc, self.offset, x, y, font, options, text)?;
        Ok(self)
    }

    /// Publish the current offset to the chip
    pub fn publish(&mut self) -> &mut Self {
        self.fifo.publish(self.acc, self.offset);
        self.published = self.offset;
        self
    }

    /// Wait until the coprocessor has consumed everything published
    pub fn wait_drained(&mut self, policy: &DrainPolicy<'_>) -> Result<()> {
        self.fifo
            .wait_drained(self.acc, DrainTarget::Offset(self.published), policy)
    }

    /// Publish, check the accessor and wait for the coprocessor
    pub fn finish(&mut self, policy: &DrainPolicy<'_>) -> Result<()> {
        self.publish();
        self.acc.checkpoint()?;
        self.wait_drained(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::FT800;
    use crate::cmd;
    use crate::testing::Recorder;

    #[test]
    fn test_stream_tracks_offset() {
        let fifo = CommandFifo::new(&FT800).unwrap();
        let mut acc = Accessor::new(Recorder::new());
        let mut stream = CommandStream::new(&mut acc, &fifo, 4084);
        stream.word(cmd::CMD_DLSTART).command(cmd::CMD_FGCOLOR, &[0xFF_FF33]);
        assert_eq!(stream.offset(), 0);
        assert_eq!(stream.unpublished(), 12);
        stream.text(0, 0, 26, TextOptions::empty(), "abc").unwrap();
        assert_eq!(stream.offset(), 16);
        stream.publish();
        assert_eq!(stream.unpublished(), 0);
    }

    #[test]
    fn test_resume_reads_write_pointer() {
        let fifo = CommandFifo::new(&FT800).unwrap();
        let mut acc = Accessor::new(Recorder::new().respond(&[0x40, 0x00]));
        let stream = CommandStream::resume(&mut acc, &fifo);
        assert_eq!(stream.offset(), 0x40);
    }
}
