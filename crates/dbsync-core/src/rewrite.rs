use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::{SyncError, SyncResult};

const CHUNK_SIZE: usize = 64 * 1024;

/// Replace every occurrence of `old` with `new` inside the file at `path`.
///
/// The match is byte-literal, so serialized or non-UTF-8 dump content is left
/// intact apart from the replaced spans. Returns the number of replacements.
/// The file is streamed through a sibling temporary file, which only replaces
/// the original when something matched.
pub async fn rewrite(old: &str, new: &str, path: &Path) -> SyncResult<usize> {
    if old.is_empty() {
        return Err(SyncError::Config(
            "Cannot rewrite an empty value; check the environment 'url' settings".into(),
        ));
    }

    let io_fail = |source: std::io::Error| SyncError::Rewrite {
        path: path.to_path_buf(),
        source,
    };

    let mut input = tokio::fs::File::open(path).await.map_err(io_fail)?;

    if old == new {
        tracing::debug!(file = %path.display(), "Old and new values match, nothing to rewrite");
        return Ok(0);
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".rewrite");
    let tmp = PathBuf::from(tmp);

    let streamed = async {
        let mut output = BufWriter::new(tokio::fs::File::create(&tmp).await?);
        let count =
            stream_replace(&mut input, &mut output, old.as_bytes(), new.as_bytes(), CHUNK_SIZE)
                .await?;
        output.into_inner().sync_all().await?;
        Ok::<_, std::io::Error>(count)
    }
    .await;

    let count = match streamed {
        Ok(count) => count,
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_fail(e));
        }
    };

    if count == 0 {
        let _ = tokio::fs::remove_file(&tmp).await;
        tracing::warn!(file = %path.display(), old = %old, "No occurrences found to rewrite");
        return Ok(0);
    }

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_fail(e));
    }

    tracing::info!(
        file = %path.display(),
        old = %old,
        new = %new,
        replacements = count,
        "Rewrote references"
    );
    Ok(count)
}

/// Copy `reader` to `writer`, replacing non-overlapping occurrences of `needle`
/// left to right. Holds at most one chunk plus `needle.len() - 1` bytes.
async fn stream_replace<R, W>(
    reader: &mut R,
    writer: &mut W,
    needle: &[u8],
    replacement: &[u8],
    chunk_size: usize,
) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    // A match may start in this many trailing bytes and finish in the next chunk.
    let carry = needle.len() - 1;
    let mut chunk = vec![0u8; chunk_size];
    let mut pending = Vec::with_capacity(chunk_size + carry);
    let mut count = 0;

    loop {
        let n = reader.read(&mut chunk).await?;
        let eof = n == 0;
        pending.extend_from_slice(&chunk[..n]);

        let mut start = 0;
        while let Some(pos) = find(&pending[start..], needle) {
            writer.write_all(&pending[start..start + pos]).await?;
            writer.write_all(replacement).await?;
            start += pos + needle.len();
            count += 1;
        }

        let flush_to = if eof {
            pending.len()
        } else {
            pending.len().saturating_sub(carry).max(start)
        };
        writer.write_all(&pending[start..flush_to]).await?;
        pending.drain(..flush_to);

        if eof {
            break;
        }
    }

    writer.flush().await?;
    Ok(count)
}

/// First position of `needle`, skipping ahead on its first byte.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let (first, rest) = needle.split_first()?;
    let mut offset = 0;
    while let Some(i) = haystack[offset..].iter().position(|b| b == first) {
        let at = offset + i;
        if haystack[at + 1..].starts_with(rest) {
            return Some(at);
        }
        offset = at + 1;
    }
    None
}
