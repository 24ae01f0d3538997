//! Byte range replacement inside an existing file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{PatchError, Result};
use crate::interrupt::defer_interrupts;

/// Default copy buffer size (128 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// How the unaffected tail of the file is handled when the replacement
/// changes the file length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Shift the tail inside the original file. Fast, but a crash midway
    /// leaves a corrupt file.
    #[default]
    InPlace,
    /// Build the new contents in a temporary file next to the original and
    /// rename it over the original when complete.
    CopyViaTemp,
}

/// Options for [`replace_region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOptions {
    pub strategy: Strategy,
    /// Size of the buffer used when moving file contents.
    pub buffer_size: usize,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl PatchOptions {
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

/// Replace `length` bytes at `offset` in the file at `path` with `data`.
///
/// When `data.len() == length`, or when the region ends exactly at the end
/// of the file, the file is patched directly regardless of the configured
/// strategy since no unrelated bytes have to move. Otherwise the configured
/// [`Strategy`] decides.
///
/// Interrupts arriving during the operation are deferred until it
/// completes (see [`crate::defer_interrupts`]).
///
/// # Errors
///
/// Returns [`PatchError::RegionOutOfBounds`] if the region extends past the
/// end of the file, or an I/O error from the underlying file operations.
pub fn replace_region(
    path: &Path,
    offset: u64,
    length: u64,
    data: &[u8],
    options: &PatchOptions,
) -> Result<()> {
    tracing::debug!(
        path = %path.display(),
        offset,
        length,
        new_length = data.len(),
        strategy = ?options.strategy,
        "Replacing file region"
    );
    defer_interrupts(|| replace_region_inner(path, offset, length, data, options))?
}

/// Replace a region of an already opened file, shifting the tail in place.
pub fn replace_region_in_file(
    file: &mut File,
    offset: u64,
    length: u64,
    data: &[u8],
    buffer_size: usize,
) -> Result<()> {
    defer_interrupts(|| {
        let old_size = file.seek(SeekFrom::End(0))?;
        check_bounds(offset, length, old_size)?;
        if try_direct(file, offset, length, data, old_size)? {
            return Ok(());
        }
        shift_in_place(file, offset, length, data, old_size, buffer_size)
    })?
}

fn replace_region_inner(
    path: &Path,
    offset: u64,
    length: u64,
    data: &[u8],
    options: &PatchOptions,
) -> Result<()> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let old_size = file.seek(SeekFrom::End(0))?;
    check_bounds(offset, length, old_size)?;

    if try_direct(&mut file, offset, length, data, old_size)? {
        return Ok(());
    }

    match options.strategy {
        Strategy::InPlace => shift_in_place(
            &mut file,
            offset,
            length,
            data,
            old_size,
            options.buffer_size,
        ),
        Strategy::CopyViaTemp => {
            copy_via_temp(path, file, offset, length, data, old_size, options.buffer_size)
        }
    }
}

fn check_bounds(offset: u64, length: u64, file_size: u64) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(PatchError::RegionOutOfBounds {
            offset,
            length,
            file_size,
        }),
    }
}

/// Handle the cases that need no tail movement. Returns `true` if the
/// file has been patched.
fn try_direct(file: &mut File, offset: u64, length: u64, data: &[u8], old_size: u64) -> Result<bool> {
    if data.len() as u64 == length {
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        file.flush()?;
        tracing::debug!("Overwrote region of equal length");
        return Ok(true);
    }

    if offset + length == old_size {
        file.set_len(offset)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        file.flush()?;
        tracing::debug!("Truncated and appended trailing region");
        return Ok(true);
    }

    Ok(false)
}

fn shift_in_place(
    file: &mut File,
    offset: u64,
    length: u64,
    data: &[u8],
    old_size: u64,
    buffer_size: usize,
) -> Result<()> {
    let tail_start = offset + length;
    let tail_len = old_size - tail_start;
    let new_tail_start = offset + data.len() as u64;
    let new_size = new_tail_start + tail_len;
    let mut buf = vec![0u8; buffer_size.max(1)];

    if new_tail_start > tail_start {
        // Growing: extend first, then move the tail back to front so that
        // no chunk overwrites bytes that have not been moved yet.
        file.set_len(new_size)?;
        let mut remaining = tail_len;
        while remaining > 0 {
            let n = remaining.min(buf.len() as u64);
            let src = tail_start + remaining - n;
            move_chunk(file, src, src + (new_tail_start - tail_start), &mut buf[..n as usize])?;
            remaining -= n;
        }
    } else {
        let mut moved = 0;
        while moved < tail_len {
            let n = (tail_len - moved).min(buf.len() as u64);
            move_chunk(
                file,
                tail_start + moved,
                new_tail_start + moved,
                &mut buf[..n as usize],
            )?;
            moved += n;
        }
        file.set_len(new_size)?;
    }

    file.seek(SeekFrom::Start(offset))?;
    file.write_all(data)?;
    file.flush()?;
    tracing::debug!(old_size, new_size, "Shifted file tail in place");
    Ok(())
}

fn move_chunk(file: &mut File, from: u64, to: u64, buf: &mut [u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(from))?;
    file.read_exact(buf)?;
    file.seek(SeekFrom::Start(to))?;
    file.write_all(buf)
}

fn copy_via_temp(
    path: &Path,
    mut file: File,
    offset: u64,
    length: u64,
    data: &[u8],
    old_size: u64,
    buffer_size: usize,
) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = tempfile::Builder::new()
        .prefix(".tagline-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    {
        let out = temp.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        copy_exact(&mut file, out, offset, buffer_size)?;
        out.write_all(data)?;
        file.seek(SeekFrom::Start(offset + length))?;
        copy_exact(&mut file, out, old_size - offset - length, buffer_size)?;
        out.flush()?;
        out.sync_all()?;
    }
    drop(file);

    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path)?;
    tracing::debug!(path = %path.display(), "Replaced file with patched copy");
    Ok(())
}

/// Copy exactly `length` bytes from `src` to `dst`.
fn copy_exact(src: &mut impl Read, dst: &mut impl Write, length: u64, buffer_size: usize) -> io::Result<()> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut remaining = length;
    while remaining > 0 {
        let n = remaining.min(buf.len() as u64) as usize;
        src.read_exact(&mut buf[..n])?;
        dst.write_all(&buf[..n])?;
        remaining -= n as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 251) as u8).collect()
    }

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn expected(original: &[u8], offset: usize, length: usize, data: &[u8]) -> Vec<u8> {
        let mut out = original[..offset].to_vec();
        out.extend_from_slice(data);
        out.extend_from_slice(&original[offset + length..]);
        out
    }

    #[test]
    fn test_same_length_overwrite() {
        let dir = TempDir::new().unwrap();
        let original = pattern(100);
        let path = write_file(&dir, "a.bin", &original);

        replace_region(&path, 10, 5, b"ABCDE", &PatchOptions::default()).unwrap();

        assert_eq!(fs::read(&path).unwrap(), expected(&original, 10, 5, b"ABCDE"));
    }

    #[test]
    fn test_trailing_region_truncate_and_append() {
        let dir = TempDir::new().unwrap();
        let original = pattern(100);
        let path = write_file(&dir, "a.bin", &original);

        replace_region(&path, 90, 10, b"xyz", &PatchOptions::default()).unwrap();

        assert_eq!(fs::read(&path).unwrap(), expected(&original, 90, 10, b"xyz"));
    }

    #[test]
    fn test_grow_region_both_strategies() {
        let dir = TempDir::new().unwrap();
        let original = pattern(1000);
        let data = vec![0xAA; 200];
        let want = expected(&original, 300, 50, &data);

        for strategy in [Strategy::InPlace, Strategy::CopyViaTemp] {
            let path = write_file(&dir, "grow.bin", &original);
            let options = PatchOptions {
                strategy,
                buffer_size: 64,
            };
            replace_region(&path, 300, 50, &data, &options).unwrap();

            let got = fs::read(&path).unwrap();
            assert_eq!(got.len(), 1150);
            assert_eq!(got, want, "strategy {strategy:?}");
        }
    }

    #[test]
    fn test_shrink_region_both_strategies() {
        let dir = TempDir::new().unwrap();
        let original = pattern(1000);
        let want = expected(&original, 0, 400, b"short");

        for strategy in [Strategy::InPlace, Strategy::CopyViaTemp] {
            let path = write_file(&dir, "shrink.bin", &original);
            let options = PatchOptions {
                strategy,
                buffer_size: 37,
            };
            replace_region(&path, 0, 400, b"short", &options).unwrap();
            assert_eq!(fs::read(&path).unwrap(), want, "strategy {strategy:?}");
        }
    }

    #[test]
    fn test_delete_region() {
        let dir = TempDir::new().unwrap();
        let original = pattern(500);
        let path = write_file(&dir, "del.bin", &original);

        replace_region(&path, 0, 128, &[], &PatchOptions::default()).unwrap();

        assert_eq!(fs::read(&path).unwrap(), original[128..].to_vec());
    }

    #[test]
    fn test_region_out_of_bounds() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "small.bin", &pattern(10));

        let result = replace_region(&path, 5, 20, b"x", &PatchOptions::default());
        assert!(matches!(result, Err(PatchError::RegionOutOfBounds { .. })));
        assert_eq!(fs::read(&path).unwrap(), pattern(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_via_temp_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "perm.bin", &pattern(300));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let options = PatchOptions::with_strategy(Strategy::CopyViaTemp);
        replace_region(&path, 0, 10, &[1; 40], &options).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_replace_in_open_file() {
        let dir = TempDir::new().unwrap();
        let original = pattern(1000);
        let path = write_file(&dir, "open.bin", &original);

        let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
        replace_region_in_file(&mut file, 100, 10, &[9; 30], 16).unwrap();
        drop(file);

        assert_eq!(fs::read(&path).unwrap(), expected(&original, 100, 10, &[9; 30]));
    }
}
