//! Staged site bundle

use std::fmt;
use std::io;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::io::ReaderStream;

use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::utils::human_size;

/// Where the bundle bytes come from
#[derive(Clone)]
pub enum BundleSource {
    /// Bytes already held in memory (e.g. a dropped file)
    Memory(Bytes),

    /// A file on disk, read chunk by chunk while the upload runs
    Path(File),
}

impl BundleSource {
    /// Stream the bundle in chunks of at most `chunk_size` bytes
    ///
    /// In-memory bundles are sliced without copying; files are opened here
    /// and read as the stream is polled.
    pub async fn chunks(
        &self,
        chunk_size: usize,
    ) -> Result<BoxStream<'static, io::Result<Bytes>>, ConsoleError> {
        let chunk_size = chunk_size.max(1);
        match self {
            BundleSource::Memory(bytes) => {
                let bytes = bytes.clone();
                let len = bytes.len();
                let slices = (0..len).step_by(chunk_size).map(move |start| {
                    let end = (start + chunk_size).min(len);
                    Ok::<_, io::Error>(bytes.slice(start..end))
                });
                Ok(stream::iter(slices).boxed())
            }
            BundleSource::Path(file) => {
                let handle = file.open().await?;
                Ok(ReaderStream::with_capacity(handle, chunk_size).boxed())
            }
        }
    }
}

impl fmt::Debug for BundleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleSource::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
            BundleSource::Path(file) => write!(f, "Path({})", file.path().display()),
        }
    }
}

/// A bundle accepted by the file selector and waiting to be deployed
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub name: String,
    pub size_bytes: u64,
    pub source: BundleSource,
}

impl StagedFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            source: BundleSource::Memory(Bytes::from(bytes)),
        }
    }

    /// Size formatted for display
    pub fn size_human(&self) -> String {
        human_size(self.size_bytes)
    }
}
