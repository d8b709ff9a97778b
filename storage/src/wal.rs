use crc32fast::Hasher;
use lessonforge_core::error::{ErrorCode, LessonForgeError};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufWriter};

const HEADER_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Data integrity error (CRC mismatch at LSN {0})")]
    CrcMismatch(u64),
    #[error("Corrupt entry")]
    CorruptEntry,
}

impl LessonForgeError for WalError {
    fn error_code(&self) -> ErrorCode {
        match self {
            WalError::Io(_) => ErrorCode::Unavailable,
            WalError::CrcMismatch(_) => ErrorCode::Internal,
            WalError::CorruptEntry => ErrorCode::Internal,
        }
    }
}

/// Append-only log of length-prefixed, checksummed records.
///
/// Record layout: `[LSN: u64][CRC: u32][LEN: u32][payload: LEN bytes]`, big
/// endian. The CRC covers the LSN, the length and the payload.
#[derive(Debug)]
pub struct Wal {
    file: BufWriter<File>,
    current_lsn: AtomicU64,
}

impl Wal {
    /// Opens (or creates) a WAL file and scans it to recover the last LSN.
    /// A torn record at the tail is truncated.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, WalError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
            .await?;

        let mut wal = Self {
            file: BufWriter::new(file),
            current_lsn: AtomicU64::new(0),
        };
        wal.replay(|_, _| Ok(())).await?;
        Ok(wal)
    }

    /// Appends a record and returns its LSN. Call [`Wal::flush`] for durability.
    pub async fn append(&mut self, payload: &[u8]) -> Result<u64, WalError> {
        let len = u32::try_from(payload.len()).map_err(|_| WalError::CorruptEntry)?;
        let lsn = self.current_lsn.fetch_add(1, Ordering::SeqCst) + 1;
        let crc = checksum(lsn, len, payload);

        self.file.write_u64(lsn).await?;
        self.file.write_u32(crc).await?;
        self.file.write_u32(len).await?;
        self.file.write_all(payload).await?;

        Ok(lsn)
    }

    pub async fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush().await?;
        self.file.get_ref().sync_all().await?;
        Ok(())
    }

    pub fn current_lsn(&self) -> u64 {
        self.current_lsn.load(Ordering::SeqCst)
    }

    /// Replays every record from the start of the file and returns the last
    /// valid LSN. An incomplete record at the end is truncated; a checksum
    /// mismatch on a complete record is an error.
    pub async fn replay<F>(&mut self, mut callback: F) -> Result<u64, WalError>
    where
        F: FnMut(u64, Vec<u8>) -> Result<(), WalError>,
    {
        self.file.flush().await?;
        let file = self.file.get_mut();
        file.seek(std::io::SeekFrom::Start(0)).await?;

        let mut last_lsn = 0;
        let mut valid_end_pos = 0;

        loop {
            let mut header = [0u8; HEADER_LEN];
            if !read_full(file, &mut header).await? {
                break;
            }
            let lsn = u64::from_be_bytes(header[0..8].try_into().map_err(|_| WalError::CorruptEntry)?);
            let crc = u32::from_be_bytes(header[8..12].try_into().map_err(|_| WalError::CorruptEntry)?);
            let len = u32::from_be_bytes(header[12..16].try_into().map_err(|_| WalError::CorruptEntry)?);

            let mut payload = vec![0u8; len as usize];
            if !read_full(file, &mut payload).await? {
                break;
            }

            if checksum(lsn, len, &payload) != crc {
                return Err(WalError::CrcMismatch(lsn));
            }

            callback(lsn, payload)?;
            last_lsn = lsn;
            valid_end_pos = file.stream_position().await?;
        }

        let file_len = file.metadata().await?.len();
        if valid_end_pos < file_len {
            tracing::warn!(
                truncated_bytes = file_len - valid_end_pos,
                "truncating torn WAL tail"
            );
            file.set_len(valid_end_pos).await?;
        }

        file.seek(std::io::SeekFrom::End(0)).await?;
        self.current_lsn.store(last_lsn, Ordering::SeqCst);

        Ok(last_lsn)
    }
}

fn checksum(lsn: u64, len: u32, payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&lsn.to_be_bytes());
    hasher.update(&len.to_be_bytes());
    hasher.update(payload);
    hasher.finalize()
}

/// Fills `buf` completely. Returns `false` when the file ends first.
async fn read_full(file: &mut File, buf: &mut [u8]) -> Result<bool, WalError> {
    match file.read_exact(buf).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(WalError::Io(e)),
    }
}
