//! ZIP packaging of exported files.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::result::ZipError;
use zip::write::{SimpleFileOptions, ZipWriter};

/// In-memory ZIP writer that keeps entry names unique.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    used: HashSet<String>,
    entries: Vec<String>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            used: HashSet::new(),
            entries: Vec::new(),
        }
    }

    /// Add a file at the archive root. A name that is already taken gets a
    /// `-2`, `-3`, ... suffix before the extension.
    ///
    /// Returns the entry name actually used.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<String, ZipError> {
        let name = unique_name(name, &self.used);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.writer.start_file(name.as_str(), options)?;
        self.writer.write_all(bytes).map_err(ZipError::Io)?;

        self.used.insert(name.clone());
        self.entries.push(name.clone());
        Ok(name)
    }

    /// Finish the archive, returning its bytes and the entry names in order.
    pub fn finish(self) -> Result<(Vec<u8>, Vec<String>), ZipError> {
        let cursor = self.writer.finish()?;
        Ok((cursor.into_inner(), self.entries))
    }
}

fn unique_name(name: &str, used: &HashSet<String>) -> String {
    if !used.contains(name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };
    (2..)
        .map(|n| format!("{stem}-{n}{ext}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_unique_name() {
        let mut used = HashSet::new();
        assert_eq!(unique_name("a.png", &used), "a.png");
        used.insert("a.png".to_string());
        assert_eq!(unique_name("a.png", &used), "a-2.png");
        used.insert("a-2.png".to_string());
        assert_eq!(unique_name("a.png", &used), "a-3.png");

        used.insert("noext".to_string());
        assert_eq!(unique_name("noext", &used), "noext-2");
    }

    #[test]
    fn test_archive_round_trip() {
        let mut builder = ArchiveBuilder::new();
        assert_eq!(builder.add("one.svg", b"<svg/>").unwrap(), "one.svg");
        assert_eq!(builder.add("one.svg", b"<svg></svg>").unwrap(), "one-2.svg");
        let (bytes, entries) = builder.finish().unwrap();
        assert_eq!(entries, vec!["one.svg", "one-2.svg"]);

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut content = String::new();
        archive
            .by_name("one-2.svg")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<svg></svg>");
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let (bytes, entries) = ArchiveBuilder::new().finish().unwrap();
        assert!(entries.is_empty());
        assert_eq!(ZipArchive::new(Cursor::new(bytes)).unwrap().len(), 0);
    }
}
