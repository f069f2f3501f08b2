use crate::error::{Result, StoreError};
use std::fs;
use std::path::Path;

pub fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    if db_path.as_os_str().is_empty() || db_path.is_dir() {
        return Err(StoreError::InvalidDataPath(db_path.to_path_buf()));
    }
    let Some(dir) = db_path.parent() else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    restrict_dir_permissions(dir)?;
    Ok(())
}

#[cfg(unix)]
fn restrict_dir_permissions(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(0o700);
    fs::set_permissions(dir, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_dir: &Path) -> Result<()> {
    Ok(())
}
