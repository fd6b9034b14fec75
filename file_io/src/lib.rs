use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub fn create_file_buf_write<P: AsRef<Path>>(path: P) -> io::Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}

pub fn open_file_buf_read<P: AsRef<Path>>(path: P) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::new(file))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes a file so that readers either see the complete content or no file at all.
///
/// The content is produced into a sibling `.tmp` file, flushed and synced, and
/// only then renamed over `path`. If `write` fails the staging file is removed.
pub fn write_atomically<P, F>(path: P, write: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let path = path.as_ref();
    let staging = staging_path(path);
    let result = (|| {
        let mut file = create_file_buf_write(&staging)?;
        write(&mut file)?;
        file.flush()?;
        file.get_ref().sync_all()?;
        Ok(())
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    fs::rename(&staging, path)
}

/// Removes a file, treating an already missing file as success.
///
/// Returns whether a file was actually removed.
pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Lists the regular files in `dir` whose name satisfies `filter` together
/// with their modification time, newest first.
pub fn files_by_mtime_desc<P, F>(dir: P, filter: F) -> io::Result<Vec<(SystemTime, PathBuf)>>
where
    P: AsRef<Path>,
    F: Fn(&str) -> bool,
{
    let mut files: Vec<(SystemTime, PathBuf)> = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(&filter);
        if matches {
            files.push((metadata.modified()?, path));
        }
    }
    files.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn atomic_write_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.bin");
        write_atomically(&path, |file| file.write_all(b"payload")).unwrap();

        let mut content = String::new();
        open_file_buf_read(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "payload");
        assert!(!dir.path().join("record.bin.tmp").exists());
    }

    #[test]
    fn failed_atomic_write_publishes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.bin");
        let result = write_atomically(&path, |_| Err(io::Error::other("disk on fire")));
        assert!(result.is_err());
        assert!(!path.exists());
        assert!(!dir.path().join("record.bin.tmp").exists());
    }

    #[test]
    fn removing_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!remove_file_if_exists(dir.path().join("absent")).unwrap());
    }

    #[test]
    fn listing_filters_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("net_frame_1.ckpt"), b"a").unwrap();
        fs::write(dir.path().join("other.txt"), b"b").unwrap();
        fs::create_dir(dir.path().join("net_frame_dir.ckpt")).unwrap();
        let files = files_by_mtime_desc(dir.path(), |name| name.ends_with(".ckpt")).unwrap();
        let paths: Vec<_> = files.into_iter().map(|(_, path)| path).collect();
        assert_eq!(paths, vec![dir.path().join("net_frame_1.ckpt")]);
    }
}
