use std::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use super::*;

/// Largest size a file may grow to.
pub const FILE_SIZE_MAX: u64 = 1 << 32;

/// A regular file. Its contents live in a buffer that is always exactly as long as the file.
pub struct File {
    name: Name,
    data: Mutex<Vec<u8>>,
}

impl File {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            data: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.data.lock().len() as u64
    }

    /// Reads at most `buf.len()` bytes at `cursor` and advances it by the number of bytes read.
    /// Nothing is read at or past the end of the file.
    /// Bytes of `buf` past the returned count are left untouched.
    ///
    /// The cursor is loaded and stored under the file lock.
    pub fn read(&self, cursor: &AtomicU64, buf: &mut [u8]) -> usize {
        let data = self.data.lock();
        let offset = cursor.load(Ordering::Relaxed);

        let Ok(start) = usize::try_from(offset) else {
            return 0;
        };
        if start >= data.len() {
            return 0;
        }

        let count = buf.len().min(data.len() - start);
        buf[..count].copy_from_slice(&data[start..start + count]);
        cursor.store(offset + count as u64, Ordering::Relaxed);
        count
    }

    /// Writes the whole of `buf` at `cursor`, growing the file if needed, and advances the cursor.
    /// A gap between the old end and the cursor reads back as zeroes.
    ///
    /// Fails with [Error::FileTooLarge] without touching the file or the cursor if the write
    /// would end past [FILE_SIZE_MAX] or the buffer cannot be grown.
    pub fn write(&self, cursor: &AtomicU64, buf: &[u8]) -> Result<usize> {
        let mut data = self.data.lock();
        let offset = cursor.load(Ordering::Relaxed);

        let end = offset
            .checked_add(buf.len() as u64)
            .filter(|&end| end <= FILE_SIZE_MAX)
            .and_then(|end| usize::try_from(end).ok())
            .ok_or(Error::FileTooLarge)?;
        let start = end - buf.len();

        if end > data.len() {
            let extra = end - data.len();
            data.try_reserve_exact(extra)
                .map_err(|_| Error::FileTooLarge)?;
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        cursor.store(end as u64, Ordering::Relaxed);
        Ok(buf.len())
    }

    /// Truncates the file to zero bytes and releases its buffer.
    pub fn clear(&self) {
        *self.data.lock() = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> File {
        File::new(Name::try_from("doc.txt").unwrap())
    }

    fn write_at(file: &File, offset: u64, buf: &[u8]) -> Result<usize> {
        file.write(&AtomicU64::new(offset), buf)
    }

    fn read_at(file: &File, offset: u64, buf: &mut [u8]) -> usize {
        file.read(&AtomicU64::new(offset), buf)
    }

    #[test]
    fn write_and_read() {
        let file = file();
        assert_eq!(write_at(&file, 0, b"Hello, World!"), Ok(13));
        assert_eq!(file.size(), 13);

        let mut buf = [0u8; 100];
        assert_eq!(read_at(&file, 0, &mut buf), 13);
        assert_eq!(&buf[..13], b"Hello, World!");
    }

    #[test]
    fn cursor_advances() {
        let file = file();
        let cursor = AtomicU64::new(0);
        file.write(&cursor, b"abc").unwrap();
        file.write(&cursor, b"def").unwrap();
        assert_eq!(cursor.load(Ordering::Relaxed), 6);

        let cursor = AtomicU64::new(1);
        let mut buf = [0u8; 4];
        assert_eq!(file.read(&cursor, &mut buf), 4);
        assert_eq!(&buf, b"bcde");
        assert_eq!(file.read(&cursor, &mut buf), 1);
        assert_eq!(cursor.load(Ordering::Relaxed), 6);
        assert_eq!(file.read(&cursor, &mut buf), 0);
        assert_eq!(cursor.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn read_clamps_count() {
        let file = file();
        write_at(&file, 0, b"abcdef").unwrap();

        let mut buf = [0xFFu8; 8];
        assert_eq!(read_at(&file, 4, &mut buf), 2);
        assert_eq!(&buf[..2], b"ef");
        assert!(buf[2..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn read_past_end() {
        let file = file();
        write_at(&file, 0, b"abc").unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(read_at(&file, 3, &mut buf), 0);
        assert_eq!(read_at(&file, 100, &mut buf), 0);
        assert_eq!(read_at(&file, u64::MAX, &mut buf), 0);
    }

    #[test]
    fn overwrite_within() {
        let file = file();
        write_at(&file, 0, b"abcdef").unwrap();
        write_at(&file, 2, b"XY").unwrap();
        assert_eq!(file.size(), 6);

        let mut buf = [0u8; 6];
        read_at(&file, 0, &mut buf);
        assert_eq!(&buf, b"abXYef");
    }

    #[test]
    fn write_past_end_zero_fills() {
        let file = file();
        write_at(&file, 0, b"ab").unwrap();
        write_at(&file, 4, b"cd").unwrap();
        assert_eq!(file.size(), 6);

        let mut buf = [0xFFu8; 6];
        read_at(&file, 0, &mut buf);
        assert_eq!(&buf, b"ab\0\0cd");
    }

    #[test]
    fn write_too_large() {
        let file = file();
        write_at(&file, 0, b"abc").unwrap();

        for offset in [u64::MAX, u64::MAX - 1, 1 << 40, FILE_SIZE_MAX] {
            let cursor = AtomicU64::new(offset);
            assert_eq!(file.write(&cursor, b"x"), Err(Error::FileTooLarge), "{offset}");
            assert_eq!(cursor.load(Ordering::Relaxed), offset);
        }
        assert_eq!(file.size(), 3);
    }

    #[test]
    fn write_empty_at_limit() {
        let file = file();
        let cursor = AtomicU64::new(FILE_SIZE_MAX + 1);
        assert_eq!(file.write(&cursor, b""), Err(Error::FileTooLarge));
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn grow_exact() {
        let file = file();
        write_at(&file, 0, &[1; 10]).unwrap();
        let data = file.data.lock();
        assert_eq!(data.len(), 10);
        assert_eq!(data.capacity(), 10);
    }

    #[test]
    fn clear() {
        let file = file();
        write_at(&file, 0, b"abc").unwrap();
        file.clear();
        assert_eq!(file.size(), 0);
        assert_eq!(file.data.lock().capacity(), 0);
    }
}
