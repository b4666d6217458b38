use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use pictura_storage::StorageArea;

/// Where the bytes of one archive entry come from
#[derive(Debug, Clone)]
pub enum ArchiveSource {
    Inline(Bytes),
    /// `data:<mime>;base64,<payload>`
    DataUrl(String),
    /// Name of an artifact in the converted area
    Stored(String),
}

#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub source: ArchiveSource,
}

impl ArchiveEntry {
    pub fn stored(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: ArchiveSource::Stored(name.clone()),
            name,
        }
    }

    pub fn data_url(name: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ArchiveSource::DataUrl(data_url.into()),
        }
    }

    pub fn inline(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            source: ArchiveSource::Inline(data.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("None of the requested files could be found")]
    NothingToArchive,

    #[error("Failed to write archive: {0}")]
    Io(String),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Io(err.to_string())
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Io(err.to_string())
    }
}

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// `cat.webp` -> `cat-1.webp`, `cat-2.webp`, ... until unused.
fn unique_entry_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }

    let path = Path::new(&name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&name)
        .to_string();
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_string);

    let mut counter = 1;
    loop {
        let candidate = match &extension {
            Some(ext) => format!("{}-{}.{}", stem, counter, ext),
            None => format!("{}-{}", stem, counter),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Decode a base64 data URL. Returns `None` when it is not one.
pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let rest = data_url.trim().strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

async fn resolve(source: ArchiveSource, area: Option<&StorageArea>) -> Option<Bytes> {
    match source {
        ArchiveSource::Inline(data) => Some(data),
        ArchiveSource::DataUrl(url) => match decode_data_url(&url) {
            Some(data) => Some(Bytes::from(data)),
            None => {
                tracing::warn!("Skipping archive entry with malformed data URL");
                None
            }
        },
        ArchiveSource::Stored(name) => {
            let Some(area) = area else {
                tracing::warn!(name = %name, "Stored archive entry requested without storage");
                return None;
            };
            match area.read_converted(&name).await {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Skipping unavailable archive entry");
                    None
                }
            }
        }
    }
}

fn write_zip(files: Vec<(String, Bytes)>) -> Result<Vec<u8>, ArchiveError> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let modified = zip::DateTime::try_from(time::OffsetDateTime::now_utc()).unwrap_or_default();

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9))
            .last_modified_time(modified)
            .unix_permissions(0o644);

        for (name, data) in files {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&data)?;
        }

        zip.finish()?;
    }

    Ok(buffer)
}

/// Build one finalized ZIP from the entries that can be resolved.
///
/// Unresolvable entries (missing stored artifact, invalid name, malformed
/// data URL) are skipped. Fails only when nothing resolves or the writer fails.
#[tracing::instrument(skip(entries, area), fields(requested = entries.len()))]
pub async fn build_archive(
    entries: Vec<ArchiveEntry>,
    area: Option<&StorageArea>,
) -> Result<Vec<u8>, ArchiveError> {
    let mut taken = HashSet::new();
    let mut files = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let Some(data) = resolve(entry.source, area).await else {
            continue;
        };
        let fallback = format!("file_{}.webp", index + 1);
        let name = unique_entry_name(sanitize_archive_filename(&entry.name, &fallback), &mut taken);
        files.push((name, data));
    }

    if files.is_empty() {
        return Err(ArchiveError::NothingToArchive);
    }

    let included = files.len();
    let archive = tokio::task::spawn_blocking(move || write_zip(files))
        .await
        .map_err(|e| ArchiveError::Io(format!("Archive task failed: {}", e)))??;

    tracing::info!(
        included,
        size_bytes = archive.len(),
        "Archive built"
    );

    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_sanitize_archive_filename() {
        assert_eq!(
            sanitize_archive_filename("../../etc/passwd", "fallback"),
            "passwd"
        );
        assert_eq!(
            sanitize_archive_filename("image.webp", "fallback"),
            "image.webp"
        );
        assert_eq!(sanitize_archive_filename("", "fallback"), "fallback");
        assert_eq!(sanitize_archive_filename("..", "fallback"), "fallback");
        assert_eq!(sanitize_archive_filename(".", "fallback"), "fallback");
    }

    #[test]
    fn test_unique_entry_name() {
        let mut taken = HashSet::new();
        assert_eq!(unique_entry_name("cat.webp".into(), &mut taken), "cat.webp");
        assert_eq!(unique_entry_name("cat.webp".into(), &mut taken), "cat-1.webp");
        assert_eq!(unique_entry_name("cat.webp".into(), &mut taken), "cat-2.webp");
        assert_eq!(unique_entry_name("README".into(), &mut taken), "README");
        assert_eq!(unique_entry_name("README".into(), &mut taken), "README-1");
    }

    #[test]
    fn test_decode_data_url() {
        assert_eq!(
            decode_data_url("data:image/webp;base64,YWJj").unwrap(),
            b"abc"
        );
        assert!(decode_data_url("data:image/webp,abc").is_none());
        assert!(decode_data_url("https://example.com/a.webp").is_none());
        assert!(decode_data_url("data:image/webp;base64,@@@").is_none());
    }

    #[tokio::test]
    async fn test_archive_contains_only_resolvable_entries() {
        let dir = tempdir().unwrap();
        let area = StorageArea::new(dir.path().join("incoming"), dir.path().join("converted"))
            .await
            .unwrap();
        area.store_converted("1_aaaaaa_one.webp", Bytes::from_static(b"one"))
            .await
            .unwrap();

        let entries = vec![
            ArchiveEntry::stored("1_aaaaaa_one.webp"),
            ArchiveEntry::stored("missing.webp"),
            ArchiveEntry::stored("../escape.webp"),
            ArchiveEntry::data_url("two.webp", "data:image/webp;base64,dHdv"),
            ArchiveEntry::data_url("bad.webp", "not a data url"),
            ArchiveEntry::inline("three.webp", Bytes::from_static(b"three")),
        ];

        let archive = build_archive(entries, Some(&area)).await.unwrap();
        assert_eq!(
            entry_names(&archive),
            vec!["1_aaaaaa_one.webp", "two.webp", "three.webp"]
        );

        let mut zip = ZipArchive::new(Cursor::new(&archive[..])).unwrap();
        let mut contents = String::new();
        zip.by_name("two.webp")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "two");
    }

    #[tokio::test]
    async fn test_duplicate_and_hostile_names_are_rewritten() {
        let entries = vec![
            ArchiveEntry::inline("../../cat.webp", Bytes::from_static(b"a")),
            ArchiveEntry::inline("cat.webp", Bytes::from_static(b"b")),
            ArchiveEntry::inline("..", Bytes::from_static(b"c")),
        ];

        let archive = build_archive(entries, None).await.unwrap();
        assert_eq!(
            entry_names(&archive),
            vec!["cat.webp", "cat-1.webp", "file_3.webp"]
        );
    }

    #[tokio::test]
    async fn test_nothing_to_archive() {
        let entries = vec![
            ArchiveEntry::stored("gone.webp"),
            ArchiveEntry::data_url("x.webp", "data:;base64,***"),
        ];
        let result = build_archive(entries, None).await;
        assert!(matches!(result, Err(ArchiveError::NothingToArchive)));

        let result = build_archive(Vec::new(), None).await;
        assert!(matches!(result, Err(ArchiveError::NothingToArchive)));
    }
}
