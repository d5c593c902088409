use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufRead, AsyncRead, ReadBuf};

/// Compression formats of rotated access log files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
}

impl Compression {
    /// Detects the compression format from the file extension, returning
    /// `None` for uncompressed files.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "gz" => Some(Compression::Gzip),
            "zst" => Some(Compression::Zstd),
            _ => None,
        }
    }
}

/// Transparently decompresses a compressed log file.
pub enum Decompressor<T> {
    Gzip(GzipDecoder<T>),
    Zstd(ZstdDecoder<T>),
}

impl<T: AsyncBufRead> Decompressor<T> {
    pub fn new(inner: T, compression: Compression) -> Self {
        match compression {
            Compression::Gzip => Decompressor::Gzip(GzipDecoder::new(inner)),
            Compression::Zstd => Decompressor::Zstd(ZstdDecoder::new(inner)),
        }
    }
}

impl<T: AsyncBufRead + Unpin> AsyncRead for Decompressor<T> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match &mut *self {
            Decompressor::Gzip(inner) => Pin::new(inner).poll_read(cx, buf),
            Decompressor::Zstd(inner) => Pin::new(inner).poll_read(cx, buf),
        }
    }
}
