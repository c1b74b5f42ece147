// File Operations for SS Encryption/Decryption
// Opens key files and the input/output streams, stdin/stdout when no path is given

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::SsResult;

/// Open the plaintext or ciphertext source
pub fn open_input(path: Option<&Path>) -> SsResult<Box<dyn BufRead>> {
    match path {
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Open the plaintext or ciphertext destination
pub fn open_output(path: Option<&Path>) -> SsResult<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Open a key file for reading
pub fn open_key_file(path: &Path) -> SsResult<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Create (or truncate) the public key file
pub fn create_public_key_file(path: &Path) -> SsResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Create (or truncate) the private key file, readable by the owner only on Unix
pub fn create_private_key_file(path: &Path) -> SsResult<BufWriter<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(Permissions::from_mode(0o600))?;
    }

    Ok(BufWriter::new(file))
}

/// Sibling path a key file is written to before it replaces `path`
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Move a fully written staging file over its final path
pub fn commit_staged(staged: &Path, path: &Path) -> SsResult<()> {
    fs::rename(staged, path)?;
    Ok(())
}

/// Remove a staging file left behind by a failed write
pub fn discard_staged(staged: &Path) {
    if staged.exists() {
        let _ = fs::remove_file(staged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ss_crypt_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_output_then_input() {
        let path = scratch_path("roundtrip.txt");
        {
            let mut out = open_output(Some(path.as_path())).unwrap();
            out.write_all(b"abc\n").unwrap();
            out.flush().unwrap();
        }

        let mut text = String::new();
        open_input(Some(path.as_path())).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "abc\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let path = scratch_path("does_not_exist.txt");
        assert!(matches!(
            open_input(Some(path.as_path())),
            Err(crate::error::SsError::Io(_))
        ));
        assert!(open_key_file(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_private_key_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let path = scratch_path("key.priv");
        {
            let mut file = create_private_key_file(&path).unwrap();
            file.write_all(b"4d\n1d\n").unwrap();
            file.flush().unwrap();
        }

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(staging_path(Path::new("ss.pub")), PathBuf::from("ss.pub.tmp"));
        assert_eq!(
            staging_path(Path::new("keys/ss.priv")),
            PathBuf::from("keys/ss.priv.tmp")
        );
    }

    #[test]
    fn test_commit_replaces_target() {
        let path = scratch_path("commit.pub");
        let staged = staging_path(&path);
        std::fs::write(&path, b"old\n").unwrap();
        std::fs::write(&staged, b"new\n").unwrap();

        commit_staged(&staged, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new\n");
        assert!(!staged.exists());

        discard_staged(&staged);
        std::fs::remove_file(&path).unwrap();
    }
}
