//! Whole-file replacement for the configuration editors.
//!
//! New content is written to a temp file next to the target, synced, given the target's
//! permissions and ownership and then renamed over it. Readers (and `dhcpd`) see either the old
//! or the new file, never a truncated one.
use crate::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replace the content of the existing file at `path` with `contents`.
///
/// The directory holding the file must be writable, not just the file. On unix the owner and
/// group of the file are restored on the replacement. If that isn't permitted the replacement
/// is owned by the service user and a warning is logged.
///
/// # Errors
///
/// Returns [`Error::Write`] if the target can't be resolved, or the temp file can't be created,
/// written or renamed into place.
///
/// Returns [`Error::BlockingTask`] if the blocking write task fails to complete.
pub async fn replace_file(path: &Path, contents: String) -> Result<(), Error> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_replacing(&path, contents.as_bytes())).await?
}

fn write_replacing(path: &Path, data: &[u8]) -> Result<(), Error> {
    // Follow symlinks so the link itself survives and its target gets the new content.
    let target = fs::canonicalize(path).map_err(|err| Error::write(path, err))?;
    let dir = parent_dir(&target);
    let metadata = fs::metadata(&target).map_err(|err| Error::write(&target, err))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".dhcpctl-")
        .tempfile_in(&dir)
        .map_err(|err| Error::write(&dir, err))?;
    tmp.write_all(data)
        .and_then(|()| tmp.as_file().sync_all())
        .and_then(|()| tmp.as_file().set_permissions(metadata.permissions()))
        .map_err(|err| Error::write(tmp.path(), err))?;
    #[cfg(unix)]
    copy_ownership(tmp.as_file(), &metadata, &target);
    tmp.persist(&target)
        .map_err(|err| Error::write(&target, err.error))?;
    Ok(())
}

#[cfg(unix)]
fn copy_ownership(file: &fs::File, original: &fs::Metadata, target: &Path) {
    use std::os::unix::fs::MetadataExt;

    let (uid, gid) = (original.uid(), original.gid());
    match file.metadata() {
        Ok(current) if current.uid() == uid && current.gid() == gid => {}
        _ => {
            if let Err(err) = std::os::unix::fs::fchown(file, Some(uid), Some(gid)) {
                tracing::warn!(
                    "can't keep owner {uid}:{gid} of {}: {err}",
                    target.display()
                );
            }
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn replaces_content_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dhcpd.conf");
        fs::write(&path, "old content\n").unwrap();

        replace_file(&path, "new content\n".to_string()).await.unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content\n");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn keeps_permissions_of_the_replaced_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("isc-dhcp-server");
        fs::write(&path, "INTERFACESv4=\"\"\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        replace_file(&path, "INTERFACESv4=\"eth0\"\n".to_string())
            .await
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn keeps_owner_and_group_of_the_replaced_file() {
        use std::os::unix::fs::MetadataExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dhcpd.conf");
        fs::write(&path, "old content\n").unwrap();
        // Only root can hand the file to someone else.
        if fs::metadata(&path).unwrap().uid() == 0 {
            std::os::unix::fs::chown(&path, Some(1), Some(1)).unwrap();
        }
        let before = fs::metadata(&path).unwrap();

        replace_file(&path, "new content\n".to_string()).await.unwrap();

        let after = fs::metadata(&path).unwrap();
        assert_eq!((after.uid(), after.gid()), (before.uid(), before.gid()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new content\n");
    }

    #[tokio::test]
    async fn fails_when_target_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.conf");

        let err = replace_file(&path, String::new()).await.unwrap_err();

        assert!(matches!(err, Error::Write { .. }));
        assert!(!path.exists());
    }
}
