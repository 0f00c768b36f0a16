//!
//! Line-oriented input of barcode lists and tab-separated output of barcode pairs.
//!
use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

const GZ_BUF_SIZE: usize = 1 << 20;

/// Open a (possibly gzipped) barcode list into a BufRead.
pub fn open_with_gz(path: &Path) -> Result<Box<dyn BufRead>> {
    let f = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::with_capacity(
            GZ_BUF_SIZE,
            MultiGzDecoder::new(f),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(32 * 1024, f)))
    }
}

/// Iterate over the lines of a barcode list as `(line_number, bytes)`, where the line
/// number is 1-based and the trailing `\n` (and a `\r` preceding it) has been stripped.
pub struct BarcodeLines<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> BarcodeLines<R> {
    pub fn new(reader: R) -> Self {
        BarcodeLines {
            reader,
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for BarcodeLines<R> {
    type Item = Result<(usize, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(Ok((self.line_number, buf)))
            }
            Err(err) => Some(
                Err(err).with_context(|| format!("error reading line {}", self.line_number + 1)),
            ),
        }
    }
}

/// Destination for `(left, right)` barcode pairs, e.g. collapse records or remappings.
pub trait PairSink {
    fn write_pair(&mut self, left: &[u8], right: &[u8]) -> Result<()>;
}

/// Writes each pair as a `left\tright` line.
pub struct TsvPairWriter<W: Write> {
    writer: W,
}

impl<W: Write> TsvPairWriter<W> {
    pub fn new(writer: W) -> Self {
        TsvPairWriter { writer }
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> PairSink for TsvPairWriter<W> {
    fn write_pair(&mut self, left: &[u8], right: &[u8]) -> Result<()> {
        self.writer.write_all(left)?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(right)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl PairSink for Vec<(String, String)> {
    fn write_pair(&mut self, left: &[u8], right: &[u8]) -> Result<()> {
        self.push((
            String::from_utf8_lossy(left).into_owned(),
            String::from_utf8_lossy(right).into_owned(),
        ));
        Ok(())
    }
}

impl<S: PairSink + ?Sized> PairSink for &mut S {
    fn write_pair(&mut self, left: &[u8], right: &[u8]) -> Result<()> {
        (**self).write_pair(left, right)
    }
}
