use std::{
    collections::HashSet,
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use ksh_converter::ChartMetadata;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

#[derive(Debug, Default)]
pub struct PackageReport {
    pub added: Vec<String>,
    pub skipped: Vec<PathBuf>,
}

/// Media referenced by the chart header, relative to the chart directory:
/// audio (`m`), jacket, background and icon.
pub fn media_files(meta: &ChartMetadata) -> Vec<&str> {
    [
        meta.audio_file(),
        meta.non_empty("jacket"),
        meta.non_empty("bg"),
        meta.non_empty("icon"),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Writes the `.osz` archive: the beatmap document plus every referenced
/// media file that exists. Missing media is skipped with a warning.
pub fn build_osz(
    osz_path: &Path,
    osu_name: &str,
    osu_content: &str,
    meta: &ChartMetadata,
    chart_dir: &Path,
) -> anyhow::Result<PackageReport> {
    write_atomically(osz_path, |file| {
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6));

        zip.start_file(osu_name, options)?;
        zip.write_all(osu_content.as_bytes())?;

        let mut report = PackageReport::default();
        let mut names = HashSet::from([osu_name.to_string()]);
        for rel in media_files(meta) {
            let path = chart_dir.join(rel);
            let name = base_name(rel);
            if !names.insert(name.to_string()) {
                continue;
            }
            if !path.is_file() {
                log::warn!("Referenced file not found: {}", path.display());
                report.skipped.push(path);
                continue;
            }
            match fs::read(&path) {
                Ok(bytes) => {
                    zip.start_file(name, options)?;
                    zip.write_all(&bytes)?;
                    log::info!("Added {rel} to package");
                    report.added.push(name.to_string());
                }
                Err(e) => {
                    log::warn!("Could not add {rel}: {e}");
                    report.skipped.push(path);
                }
            }
        }

        zip.finish()?;
        Ok(report)
    })
}

/// Runs `write` against a sibling `.part` file and renames it over `path`
/// only if it succeeds.
pub fn write_atomically<T>(
    path: &Path,
    write: impl FnOnce(File) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let tmp = part_path(path);
    let file =
        File::create(&tmp).with_context(|| format!("failed to create {}", tmp.display()))?;

    let result = write(file).and_then(|value| {
        fs::rename(&tmp, path)
            .with_context(|| format!("failed to move {} into place", tmp.display()))?;
        Ok(value)
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
