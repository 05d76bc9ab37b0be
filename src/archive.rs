use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use bytes::Bytes;
use data_model::UploadedFile;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Display name for a stored archive: the first file's name truncated at
/// its first `.`, annotated with a count when more files follow.
pub fn archive_display_name(files: &[UploadedFile]) -> String {
    let base = files[0].name.split('.').next().unwrap_or_default();
    if files.len() == 1 {
        format!("{}.zip", base)
    } else {
        format!("{}_and_{}_more_files.zip", base, files.len() - 1)
    }
}

/// Write every file into one in-memory zip at maximum compression.
/// Entry names are the original file names, in upload order.
pub fn build_zip_archive(files: &[UploadedFile]) -> Result<Bytes> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    for file in files {
        writer
            .start_file(file.name.as_str(), options)
            .with_context(|| format!("failed to add {} to archive", file.name))?;
        writer
            .write_all(&file.data)
            .with_context(|| format!("failed to write {} into archive", file.name))?;
    }

    let cursor = writer.finish().context("failed to finalize archive")?;
    Ok(Bytes::from(cursor.into_inner()))
}
