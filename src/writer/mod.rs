use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;

/// Buffered writer for one seed document that counts the bytes it emits.
pub struct SeedFileWriter {
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl SeedFileWriter {
    /// Create (or truncate) `path`, creating missing parent directories.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;

        Ok(Self {
            writer: BufWriter::with_capacity(WRITER_BUFFER_SIZE, file),
            bytes_written: 0,
        })
    }

    /// Flush buffered output and return the total byte count.
    pub fn finish(mut self) -> io::Result<u64> {
        self.writer.flush()?;
        Ok(self.bytes_written)
    }
}

impl Write for SeedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
