//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Output file, plain or gzip-compressed.
pub enum MaybeGzWriter {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl MaybeGzWriter {
    /// Flush all data, writing the gzip trailer if compressed.
    pub fn finish(self) -> Result<(), std::io::Error> {
        match self {
            MaybeGzWriter::Plain(mut writer) => writer.flush(),
            MaybeGzWriter::Gz(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for MaybeGzWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            MaybeGzWriter::Plain(writer) => writer.write(buf),
            MaybeGzWriter::Gz(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            MaybeGzWriter::Plain(writer) => writer.flush(),
            MaybeGzWriter::Gz(encoder) => encoder.flush(),
        }
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<MaybeGzWriter, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(MaybeGzWriter::Gz(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(MaybeGzWriter::Plain(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod test {
    use std::io::{BufRead, Write};

    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case("test.txt")]
    #[case("test.txt.gz")]
    fn write_then_read_maybe_gz(#[case] filename: &str) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();

        {
            let mut f = super::open_write_maybe_gz(tmp_dir.join(filename))?;
            writeln!(f, "ENST00000256078\tKRAS")?;
            writeln!(f, "ENST00000269305\tTP53")?;
            f.finish()?;
        }

        let lines = super::open_read_maybe_gz(tmp_dir.join(filename))?
            .lines()
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            lines,
            vec![
                String::from("ENST00000256078\tKRAS"),
                String::from("ENST00000269305\tTP53")
            ]
        );

        Ok(())
    }

    #[test]
    fn finish_writes_gzip_trailer() -> Result<(), anyhow::Error> {
        use std::io::Read;

        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("test.txt.gz");

        let mut f = super::open_write_maybe_gz(&path)?;
        assert!(matches!(f, super::MaybeGzWriter::Gz(_)));
        writeln!(f, "ENST00000256078\tKRAS")?;
        f.finish()?;

        // A single-member decoder fails on a missing trailer.
        let mut text = String::new();
        flate2::read::GzDecoder::new(std::fs::File::open(&path)?).read_to_string(&mut text)?;
        assert_eq!(text, "ENST00000256078\tKRAS\n");

        Ok(())
    }

    #[test]
    fn open_missing_file_fails() {
        assert!(super::open_read_maybe_gz("tests/does/not/exist.tsv").is_err());
    }
}
