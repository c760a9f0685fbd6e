pub mod groups_log;
pub mod json_store;
pub mod schema;

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Result;

/// Replace `path` with `bytes` via a synced `.tmp` sibling and a rename, so
/// readers see either the old content or the new, never a partial write.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(tmp_path, path)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = fs::remove_file(tmp_path);
    }
    result
}
