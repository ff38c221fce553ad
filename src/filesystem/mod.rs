//! 游戏文件系统
//!
//! 所有路径都相对于游戏目录解析。脚本习惯使用反斜杠分隔符，这里统一转换；
//! 试图逃出根目录的路径被拒绝。

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use crate::core::error::{NativeError, NativeResult};

#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
}

impl Filesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 把脚本路径解析为根目录下的路径
    pub fn resolve(&self, path: &str) -> NativeResult<PathBuf> {
        let normalized = path.replace('\\', "/");
        let mut resolved = PathBuf::new();
        for component in Path::new(normalized.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !resolved.pop() {
                        return Err(NativeError::physfs(format!(
                            "path escapes the game directory: {}",
                            path
                        )));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {}
            }
        }
        let joined = self.root.join(resolved);
        self.check_links(&joined, path)?;
        Ok(joined)
    }

    /// 符号链接解析后仍须位于根目录下；只检查已存在的最近祖先
    fn check_links(&self, joined: &Path, path: &str) -> NativeResult<()> {
        let Ok(root) = self.root.canonicalize() else {
            return Ok(());
        };
        let Some(existing) = joined.ancestors().find(|p| p.exists()) else {
            return Ok(());
        };
        let real = existing.canonicalize()?;
        if !real.starts_with(&root) {
            return Err(NativeError::physfs(format!(
                "path escapes the game directory: {}",
                path
            )));
        }
        Ok(())
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn is_directory(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_dir()).unwrap_or(false)
    }

    fn existing_file(&self, path: &str) -> NativeResult<PathBuf> {
        let resolved = self.resolve(path)?;
        if !resolved.is_file() {
            return Err(NativeError::no_file(path));
        }
        Ok(resolved)
    }

    /// 读取整个文件；超过 `max` 字节时报错
    pub fn read_file(&self, path: &str, max: usize) -> NativeResult<Vec<u8>> {
        let resolved = self.existing_file(path)?;
        let size = fs::metadata(&resolved)?.len();
        if size > max as u64 {
            return Err(NativeError::io(format!(
                "{} is too large ({} bytes, limit {})",
                path, size, max
            )));
        }
        tracing::debug!(target: "filesystem", path, size, "read file");
        Ok(fs::read(resolved)?)
    }

    /// 从 `offset` 开始读取；`len` 为 `None` 时读到文件末尾
    pub fn read_at(&self, path: &str, offset: u64, len: Option<usize>) -> NativeResult<Vec<u8>> {
        let resolved = self.existing_file(path)?;
        let mut file = fs::File::open(resolved)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::new();
        match len {
            Some(len) => {
                file.take(len as u64).read_to_end(&mut buf)?;
            }
            None => {
                file.read_to_end(&mut buf)?;
            }
        }
        Ok(buf)
    }

    /// 在 `offset` 处写入；`truncate` 为真时先清空文件
    pub fn write_at(&self, path: &str, offset: u64, data: &[u8], truncate: bool) -> NativeResult<()> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(truncate)
            .open(resolved)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        Ok(())
    }

    pub fn write_file(&self, path: &str, data: &[u8]) -> NativeResult<()> {
        self.write_at(path, 0, data, true)
    }

    pub fn file_size(&self, path: &str) -> NativeResult<u64> {
        let resolved = self.existing_file(path)?;
        Ok(fs::metadata(resolved)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Filesystem) {
        let dir = TempDir::new().unwrap();
        let fs = Filesystem::new(dir.path());
        (dir, fs)
    }

    #[test]
    fn test_backslash_paths_resolve_under_root() {
        let (dir, fs) = setup();
        let resolved = fs.resolve("Graphics\\Pictures\\title.png").unwrap();
        assert_eq!(resolved, dir.path().join("Graphics/Pictures/title.png"));
        assert_eq!(fs.resolve("/Data/./Map001.rvdata2").unwrap(), dir.path().join("Data/Map001.rvdata2"));
    }

    #[test]
    fn test_escaping_root_is_physfs_error() {
        let (_dir, fs) = setup();
        let err = fs.resolve("../secret.txt").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Physfs);
        assert!(fs.resolve("Data/../Audio").is_ok());
        assert!(!fs.exists("../../etc/passwd"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_is_rejected() {
        let (dir, fs) = setup();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("Link")).unwrap();

        let err = fs.resolve("Link/secret.txt").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Physfs);
        assert!(fs.read_file("Link/secret.txt", 16).is_err());
        assert!(fs.write_file("Link/new.txt", b"y").is_err());
        assert!(!outside.path().join("new.txt").exists());

        std::fs::create_dir(dir.path().join("Data")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("Data"), dir.path().join("Alias")).unwrap();
        assert!(fs.resolve("Alias/Map001.rvdata2").is_ok());
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, fs) = setup();
        fs.write_file("Save/Save01.rvdata2", b"hello world").unwrap();

        assert!(fs.is_file("Save/Save01.rvdata2"));
        assert!(fs.is_directory("Save"));
        assert_eq!(fs.file_size("Save/Save01.rvdata2").unwrap(), 11);
        assert_eq!(fs.read_file("Save/Save01.rvdata2", 1024).unwrap(), b"hello world");
        assert_eq!(fs.read_at("Save/Save01.rvdata2", 6, Some(3)).unwrap(), b"wor");
        assert_eq!(fs.read_at("Save/Save01.rvdata2", 6, None).unwrap(), b"world");
    }

    #[test]
    fn test_write_at_offset_keeps_prefix() {
        let (_dir, fs) = setup();
        fs.write_file("log.txt", b"abc").unwrap();
        fs.write_at("log.txt", 3, b"def", false).unwrap();
        assert_eq!(fs.read_file("log.txt", 16).unwrap(), b"abcdef");
    }

    #[test]
    fn test_missing_and_oversized_files() {
        let (_dir, fs) = setup();
        let err = fs.read_file("Data/Missing.rvdata2", 16).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoFile);
        assert_eq!(err.message, "No such file or directory - Data/Missing.rvdata2");

        fs.write_file("big.bin", &[0u8; 32]).unwrap();
        let err = fs.read_file("big.bin", 16).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
