//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// A file-based append-only storage backend.
///
/// This backend provides persistent storage using OS file APIs.
/// Data survives process restarts.
///
/// # Durability
///
/// - `create()` calls `File::sync_all()` after writing the initial content
/// - `append()` calls `File::sync_data()` before returning
///
/// # Thread Safety
///
/// Appends from threads sharing one backend are serialized by an internal
/// mutex. Each write additionally holds an exclusive advisory lock on the
/// file until its data is synced, so separate handles (or processes)
/// appending to the same path cannot interleave either.
///
/// Reads open their own handle and never take the append mutex. They hold a
/// shared lock only while reading the file length, which therefore always
/// falls on an append boundary, then read up to that length unlocked. A
/// reader sees every append completed through any handle and never a
/// partial one.
///
/// # Example
///
/// ```no_run
/// use beaconlog_storage::{StorageBackend, FileBackend};
///
/// let backend = FileBackend::new("requests.csv");
/// backend.create(b"header\n").unwrap();
/// backend.append(b"row\n").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    writer: Mutex<AppendHandle>,
}

/// Append-side state guarded by the writer mutex.
#[derive(Debug, Default)]
struct AppendHandle {
    file: Option<File>,
    /// Length to cut the file back to before the next write. Set when a
    /// failed write could not be rolled back.
    torn_at: Option<u64>,
}

impl FileBackend {
    /// Creates a backend for the file at `path`.
    ///
    /// Nothing is touched on disk until [`StorageBackend::create`] or
    /// [`StorageBackend::append`] is called.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(AppendHandle::default()),
        }
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn not_found(&self) -> StorageError {
        StorageError::NotFound {
            location: self.location(),
        }
    }

    fn open_with(&self, options: &OpenOptions) -> StorageResult<File> {
        match options.open(&self.path) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(self.not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the append handle, opening it on first use.
    fn open_writer<'a>(&self, slot: &'a mut Option<File>) -> StorageResult<&'a mut File> {
        let file = match slot.take() {
            Some(file) => file,
            None => self.open_with(OpenOptions::new().append(true))?,
        };
        Ok(slot.insert(file))
    }

    /// Returns the length of the file as of the last completed append.
    fn stable_len(file: &File) -> StorageResult<u64> {
        FileExt::lock_shared(file)?;
        let len = file.metadata().map(|meta| meta.len());
        FileExt::unlock(file)?;
        Ok(len?)
    }

    /// Writes `data` at the current end of file while the advisory lock is held.
    ///
    /// A tail left by an earlier failed rollback is cut off first. On
    /// failure the file is cut back to its length before the write; if that
    /// fails too, `torn_at` records where the next write has to start.
    fn write_locked(
        file: &mut File,
        data: &[u8],
        torn_at: &mut Option<u64>,
    ) -> StorageResult<u64> {
        if let Some(len) = *torn_at {
            file.set_len(len)?;
            file.sync_data()?;
            *torn_at = None;
        }

        let offset = file.metadata()?.len();
        if let Err(e) = file.write_all(data).and_then(|()| file.sync_data()) {
            if file.set_len(offset).is_err() {
                *torn_at = Some(offset);
            }
            return Err(e.into());
        }
        Ok(offset)
    }
}

impl StorageBackend for FileBackend {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> StorageResult<bool> {
        Ok(self.path.try_exists()?)
    }

    fn create(&self, initial: &[u8]) -> StorageResult<bool> {
        let mut writer = self.writer.lock();

        let mut file = match OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            // Whether it is writable shows on the first append.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(initial).and_then(|()| file.sync_all()) {
            // A half-written header would be kept forever; let the next start retry.
            drop(file);
            let _ = std::fs::remove_file(&self.path);
            return Err(e.into());
        }

        writer.file = Some(file);
        Ok(true)
    }

    fn append(&self, data: &[u8]) -> StorageResult<u64> {
        let mut guard = self.writer.lock();
        let handle = &mut *guard;
        let file = self.open_writer(&mut handle.file)?;

        if data.is_empty() {
            return Self::stable_len(file);
        }

        FileExt::lock_exclusive(&*file)?;
        let written = Self::write_locked(file, data, &mut handle.torn_at);
        let unlocked = FileExt::unlock(&*file);

        if written.is_err() || unlocked.is_err() {
            // Reopen on the next append. Closing the descriptor releases the lock.
            handle.file = None;
        }
        written
    }

    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let file = self.open_with(OpenOptions::new().read(true))?;
        let len = Self::stable_len(&file)?;

        let mut buffer = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
        file.take(len).read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    fn size(&self) -> StorageResult<u64> {
        let file = self.open_with(OpenOptions::new().read(true))?;
        Self::stable_len(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let backend = FileBackend::new(&path);
        assert!(!backend.exists().unwrap());
        assert!(backend.create(b"a,b\n").unwrap());
        assert!(backend.exists().unwrap());
        assert_eq!(backend.size().unwrap(), 4);
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
    }

    #[test]
    fn file_create_existing_is_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, b"old header\nrow\n").unwrap();

        let backend = FileBackend::new(&path);
        assert!(!backend.create(b"new header\n").unwrap());
        assert_eq!(backend.read_all().unwrap(), b"old header\nrow\n");
    }

    #[test]
    fn file_create_missing_parent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("log.csv");

        let backend = FileBackend::new(&path);
        assert!(backend.create(b"h\n").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn file_append_and_read() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("log.csv"));
        backend.create(b"h\n").unwrap();

        let offset1 = backend.append(b"hello\n").unwrap();
        assert_eq!(offset1, 2);

        let offset2 = backend.append(b"world\n").unwrap();
        assert_eq!(offset2, 8);

        assert_eq!(backend.size().unwrap(), 14);
        assert_eq!(backend.read_all().unwrap(), b"h\nhello\nworld\n");
    }

    #[test]
    fn file_append_without_create_fails() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("log.csv"));

        let result = backend.append(b"row\n");
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn file_read_missing_fails() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("log.csv"));

        let result = backend.read_all();
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
        assert!(matches!(backend.size(), Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn file_empty_append() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("log.csv"));
        backend.create(b"x").unwrap();

        let offset = backend.append(b"").unwrap();
        assert_eq!(offset, 1);
        assert_eq!(backend.size().unwrap(), 1);
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");

        {
            let backend = FileBackend::new(&path);
            backend.create(b"h\n").unwrap();
            backend.append(b"persistent\n").unwrap();
        }

        {
            let backend = FileBackend::new(&path);
            assert_eq!(backend.size().unwrap(), 13);
            assert_eq!(backend.read_all().unwrap(), b"h\npersistent\n");
            backend.append(b"again\n").unwrap();
            assert_eq!(backend.read_all().unwrap(), b"h\npersistent\nagain\n");
        }
    }

    #[test]
    fn file_concurrent_appends_do_not_interleave() {
        let dir = tempdir().unwrap();
        let backend = Arc::new(FileBackend::new(dir.path().join("log.csv")));
        backend.create(b"h\n").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let backend = Arc::clone(&backend);
                thread::spawn(move || {
                    for i in 0..25 {
                        let line = format!("{}\n", format!("t{t}-i{i}-").repeat(40));
                        backend.append(line.as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = String::from_utf8(backend.read_all().unwrap()).unwrap();
        let lines: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(lines.len(), 200);
        for line in lines {
            let unit_len = line.len() / 40;
            assert_eq!(line, line[..unit_len].repeat(40));
        }
    }

    #[test]
    fn file_separate_handles_do_not_interleave() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        FileBackend::new(&path).create(b"h\n").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let path = path.clone();
                thread::spawn(move || {
                    let backend = FileBackend::new(path);
                    for i in 0..25 {
                        let line = format!("{}\n", format!("[{t}:{i}]").repeat(64));
                        backend.append(line.as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(lines.len(), 100);
        for line in lines {
            let unit_len = line.len() / 64;
            assert_eq!(line, line[..unit_len].repeat(64));
        }
    }

    #[test]
    fn file_reads_never_see_partial_appends() {
        let dir = tempdir().unwrap();
        let backend = Arc::new(FileBackend::new(dir.path().join("log.csv")));
        backend.create(b"h\n").unwrap();

        let writer = {
            let backend = Arc::clone(&backend);
            thread::spawn(move || {
                let line = format!("{}\n", "x".repeat(4096));
                for _ in 0..50 {
                    backend.append(line.as_bytes()).unwrap();
                }
            })
        };

        for _ in 0..50 {
            let content = backend.read_all().unwrap();
            assert_eq!(content.last(), Some(&b'\n'));
            assert_eq!((content.len() - 2) % 4097, 0);
        }

        writer.join().unwrap();
        assert_eq!(backend.size().unwrap(), 2 + 50 * 4097);
    }

    #[test]
    fn file_create_existing_read_only_defers_to_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, b"h\nrow\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&path, perms).unwrap();

        let backend = FileBackend::new(&path);
        assert!(!backend.create(b"h\n").unwrap());
        assert_eq!(backend.read_all().unwrap(), b"h\nrow\n");

        // Privileged users may write regardless of the mode bits.
        if OpenOptions::new().append(true).open(&path).is_err() {
            assert!(matches!(backend.append(b"more\n"), Err(StorageError::Io(_))));
            assert_eq!(backend.read_all().unwrap(), b"h\nrow\n");
        }
    }

    #[test]
    fn file_reads_see_appends_from_other_handles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let a = FileBackend::new(&path);
        a.create(b"h\n").unwrap();
        a.append(b"from-a\n").unwrap();

        let b = FileBackend::new(&path);
        b.append(b"from-b\n").unwrap();

        assert_eq!(a.read_all().unwrap(), b"h\nfrom-a\nfrom-b\n");
        assert_eq!(a.size().unwrap(), 16);
        assert_eq!(a.append(b"again\n").unwrap(), 16);
        assert_eq!(b.read_all().unwrap(), b"h\nfrom-a\nfrom-b\nagain\n");
    }

    #[test]
    fn file_failed_append_leaves_content_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let backend = FileBackend::new(&path);
        backend.create(b"h\n").unwrap();
        backend.append(b"one\n").unwrap();

        // A read-only descriptor makes the write fail.
        backend.writer.lock().file = Some(File::open(&path).unwrap());
        assert!(matches!(backend.append(b"two\n"), Err(StorageError::Io(_))));
        assert_eq!(backend.read_all().unwrap(), b"h\none\n");

        assert_eq!(backend.append(b"three\n").unwrap(), 6);
        assert_eq!(backend.read_all().unwrap(), b"h\none\nthree\n");
    }

    #[test]
    fn file_torn_tail_is_cut_before_next_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let backend = FileBackend::new(&path);
        backend.create(b"h\n").unwrap();
        backend.append(b"one\n").unwrap();

        // Bytes of a failed write that could not be rolled back.
        OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"tw")
            .unwrap();
        backend.writer.lock().torn_at = Some(6);

        assert_eq!(backend.append(b"three\n").unwrap(), 6);
        assert_eq!(backend.read_all().unwrap(), b"h\none\nthree\n");
        assert_eq!(backend.writer.lock().torn_at, None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn file_append_to_full_device_fails() {
        if !Path::new("/dev/full").exists() {
            return;
        }
        let backend = FileBackend::new("/dev/full");
        assert!(!backend.create(b"h\n").unwrap());
        assert!(matches!(backend.append(b"row\n"), Err(StorageError::Io(_))));
        assert!(matches!(backend.append(b"row\n"), Err(StorageError::Io(_))));
    }

    #[test]
    fn file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let backend = FileBackend::new(&path);
        assert_eq!(backend.path(), path);
        assert_eq!(backend.location(), path.display().to_string());
    }
}
