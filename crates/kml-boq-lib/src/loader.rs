//! Markup loading from `.kml` and `.kmz` sources
//!
//! A `.kml` file is read as UTF-8 text. A `.kmz` file is a zip archive; the first
//! entry (in archive order) whose name ends in `.kml` supplies the markup.

use crate::{ConvertError, Result};
use std::io::{Cursor, Read};
use std::path::Path;

/// Container format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Kml,
    Kmz,
}

impl SourceKind {
    /// Detect the container format from a file name (case-insensitive extension)
    pub fn from_file_name(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".kml") {
            Ok(SourceKind::Kml)
        } else if lower.ends_with(".kmz") {
            Ok(SourceKind::Kmz)
        } else {
            Err(ConvertError::UnsupportedInput(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Kml => "KML",
            SourceKind::Kmz => "KMZ",
        }
    }
}

/// Basic facts about a loaded input file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub name: String,
    pub size_bytes: u64,
    pub kind: SourceKind,
}

impl SourceInfo {
    /// Size in kilobytes with two decimals
    pub fn size_kb(&self) -> String {
        format!("{:.2} KB", self.size_bytes as f64 / 1024.0)
    }
}

/// Extract markup text from the raw bytes of a file called `file_name`
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn load_markup(file_name: &str, bytes: &[u8]) -> Result<(SourceInfo, String)> {
    let kind = SourceKind::from_file_name(file_name)?;
    let info = SourceInfo {
        name: file_name.to_string(),
        size_bytes: bytes.len() as u64,
        kind,
    };
    tracing::info!(
        "Loading {} ({}, {})",
        info.name,
        info.kind.as_str(),
        info.size_kb()
    );

    let markup = match kind {
        SourceKind::Kml => String::from_utf8(bytes.to_vec())?,
        SourceKind::Kmz => extract_kml_from_kmz(bytes)?,
    };
    Ok((info, markup))
}

/// Read a `.kml`/`.kmz` file from disk and extract its markup text
pub fn load_markup_from_path(path: &Path) -> Result<(SourceInfo, String)> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    // Reject unsupported files before touching the disk
    SourceKind::from_file_name(&file_name)?;

    let bytes = std::fs::read(path)?;
    load_markup(&file_name, &bytes)
}

/// Text of the first archive entry whose name ends in `.kml`
pub fn extract_kml_from_kmz(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() || !entry.name().to_ascii_lowercase().ends_with(".kml") {
            continue;
        }

        tracing::debug!("Using KMZ entry '{}'", entry.name());
        let mut raw = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut raw)?;
        return Ok(String::from_utf8(raw)?);
    }

    Err(ConvertError::NoMarkupInArchive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_kmz(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_source_kind_detection() {
        assert_eq!(SourceKind::from_file_name("site.kml").unwrap(), SourceKind::Kml);
        assert_eq!(SourceKind::from_file_name("SITE.KMZ").unwrap(), SourceKind::Kmz);
        assert!(matches!(
            SourceKind::from_file_name("site.geojson"),
            Err(ConvertError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn test_load_plain_kml() {
        let (info, markup) = load_markup("a.kml", b"<kml/>").unwrap();
        assert_eq!(info.kind, SourceKind::Kml);
        assert_eq!(info.size_bytes, 6);
        assert_eq!(markup, "<kml/>");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let result = load_markup("a.kml", &[0x3c, 0xff, 0xfe]);
        assert!(matches!(result, Err(ConvertError::Encoding(_))));
    }

    #[test]
    fn test_kmz_uses_first_kml_entry() {
        let kmz = build_kmz(&[
            ("files/icon.png", "not markup"),
            ("doc.kml", "<kml>first</kml>"),
            ("other.kml", "<kml>second</kml>"),
        ]);
        let (info, markup) = load_markup("bundle.kmz", &kmz).unwrap();
        assert_eq!(info.kind, SourceKind::Kmz);
        assert_eq!(markup, "<kml>first</kml>");
    }

    #[test]
    fn test_kmz_without_kml_entry() {
        let kmz = build_kmz(&[("readme.txt", "hello")]);
        assert!(matches!(
            extract_kml_from_kmz(&kmz),
            Err(ConvertError::NoMarkupInArchive)
        ));
    }

    #[test]
    fn test_corrupt_kmz() {
        assert!(matches!(
            extract_kml_from_kmz(b"definitely not a zip"),
            Err(ConvertError::Archive(_))
        ));
    }

    #[test]
    fn test_size_kb() {
        let info = SourceInfo {
            name: "a.kml".to_string(),
            size_bytes: 1536,
            kind: SourceKind::Kml,
        };
        assert_eq!(info.size_kb(), "1.50 KB");
    }

    #[test]
    fn test_path_with_wrong_extension_is_rejected_without_io() {
        let result = load_markup_from_path(Path::new("/nonexistent/plan.dwg"));
        assert!(matches!(result, Err(ConvertError::UnsupportedInput(_))));
    }
}
