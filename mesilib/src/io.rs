use std::fs::File;
use std::io::Read;
use std::ops::Deref;

/// A whole trace, either memory mapped from a file or read into memory
pub enum TraceSource {
    #[cfg(unix)]
    Mapped(memmap2::Mmap),
    Buffered(Vec<u8>),
}

impl Deref for TraceSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            #[cfg(unix)]
            TraceSource::Mapped(m) => &m[..],
            TraceSource::Buffered(b) => &b[..],
        }
    }
}

/// Opens a trace file
///
/// The simulator reads the trace strictly in order, so the mapping is advised as sequential
pub fn open_trace(path: &str) -> Result<TraceSource, String> {
    let file = File::open(path).map_err(|e| format!("Couldn't open the trace file at path {path}: {e}"))?;
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        read_trace(file)
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        // Mapping an empty file fails on some platforms
        if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
            return Ok(TraceSource::Buffered(Vec::new()));
        }
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the file: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(TraceSource::Mapped(m))
        }
    }
}

/// Reads a whole trace from any reader, usually standard input
pub fn read_trace(mut reader: impl Read) -> Result<TraceSource, String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(|e| format!("Couldn't read the trace: {e}"))?;
    Ok(TraceSource::Buffered(buf))
}
