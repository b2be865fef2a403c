use crate::memory::Memory;
use byteorder::{BigEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Loads a big-endian object image into `memory`. The first word read is
/// the origin; every subsequent word is placed at successive addresses
/// starting there. Loading stops at end-of-file or once the image would
/// cross 0xFFFF — any remaining words in the file are discarded rather than
/// wrapping back into low memory.
pub fn load_image(path: impl AsRef<Path>, memory: &mut Memory) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(path)?);

    let origin = reader.read_u16::<BigEndian>()?;
    let max_words = (u32::from(u16::max_value()) + 1 - u32::from(origin)) as usize;

    let mut address = origin;
    for _ in 0..max_words {
        match reader.read_u16::<BigEndian>() {
            Ok(word) => {
                memory.write(address, word);
                address = address.wrapping_add(1);
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::Terminal;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn image_bytes(origin: u16, words: &[u16]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&origin.to_be_bytes());
        for word in words {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    struct ScratchFile {
        path: PathBuf,
    }

    impl ScratchFile {
        fn new(bytes: &[u8]) -> Self {
            let path = std::env::temp_dir().join(format!(
                "lc3vm-loader-test-{}-{}.obj",
                std::process::id(),
                COUNTER.fetch_add(1, Ordering::SeqCst)
            ));
            File::create(&path).unwrap().write_all(bytes).unwrap();
            ScratchFile { path }
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    #[test]
    fn loads_words_at_origin() {
        let file = ScratchFile::new(&image_bytes(0x3000, &[0x1023, 0xf025]));

        let mut memory = Memory::new();
        load_image(&file.path, &mut memory).unwrap();

        let terminal = Terminal::new();
        assert_eq!(memory.read(0x3000, &terminal), 0x1023);
        assert_eq!(memory.read(0x3001, &terminal), 0xf025);
    }

    #[test]
    fn truncated_final_byte_is_ignored() {
        let mut bytes = image_bytes(0x3000, &[0x1023]);
        bytes.push(0x00); // dangling half-word
        let file = ScratchFile::new(&bytes);

        let mut memory = Memory::new();
        load_image(&file.path, &mut memory).unwrap();

        let terminal = Terminal::new();
        assert_eq!(memory.read(0x3000, &terminal), 0x1023);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut memory = Memory::new();
        assert!(load_image("/nonexistent/path/to/image.obj", &mut memory).is_err());
    }
}
