use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use vnacore::processing::CaptureBuffer;

/// Writes the populated capture rows as JSON, creating the parent directory.
pub fn write_captures<P: AsRef<Path>>(path: P, captures: &CaptureBuffer) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating export directory {}", parent.display()))?;
    }
    let file = File::create(path_ref)
        .with_context(|| format!("creating export file {}", path_ref.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &captures.to_export())
        .with_context(|| format!("serialising captures to {}", path_ref.display()))?;
    writer.flush()?;
    Ok(())
}
