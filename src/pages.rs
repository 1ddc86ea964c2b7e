//! Page image discovery.
//!
//! A document is a directory of zero-padded page images (0001.svg,
//! 0002.png, ...). Discovery happens once at startup; the files themselves
//! are only probed for their dimensions, which drive the layout aspect
//! ratios.

use anyhow::{Result, bail};
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Height/width ratio assumed when an image header cannot be probed
/// (SVG pages, truncated files).
pub const DEFAULT_PAGE_ASPECT: f32 = 4.0 / 3.0;

#[derive(Debug, Clone)]
pub struct PageAsset {
    pub path: PathBuf,
    pub file_name: String,
    /// Height divided by width.
    pub aspect: f32,
}

/// Ordered collection of the document's page images.
#[derive(Debug, Clone)]
pub struct PageSet {
    assets: Vec<PageAsset>,
}

impl PageSet {
    /// Scans `dir` (non-recursively) for page images named `NNNN.<ext>`.
    /// Pages are ordered by file name and addressed by position, so gaps in
    /// the numbering do not matter.
    pub fn discover(dir: &Path) -> Result<PageSet> {
        let pattern =
            Regex::new(r"^\d{4}\.(svg|png|jpe?g|gif|webp)$").expect("valid page name pattern");

        let mut assets = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !pattern.is_match(&file_name.to_ascii_lowercase()) {
                continue;
            }
            let aspect = probe_aspect(entry.path());
            assets.push(PageAsset {
                path: entry.into_path(),
                file_name,
                aspect,
            });
        }

        if assets.is_empty() {
            bail!(
                "no page images matching NNNN.<svg|png|jpg|gif|webp> in {}",
                dir.display()
            );
        }

        assets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!("Discovered {} pages in {}", assets.len(), dir.display());

        Ok(PageSet { assets })
    }

    pub fn count(&self) -> usize {
        self.assets.len()
    }

    pub fn aspects(&self) -> Vec<f32> {
        self.assets.iter().map(|a| a.aspect).collect()
    }

    /// 1-based page lookup.
    pub fn asset(&self, page: usize) -> Option<&PageAsset> {
        page.checked_sub(1).and_then(|i| self.assets.get(i))
    }

    pub fn file_name(&self, page: usize) -> &str {
        self.asset(page).map(|a| a.file_name.as_str()).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageAsset> {
        self.assets.iter()
    }
}

fn probe_aspect(path: &Path) -> f32 {
    match imagesize::size(path) {
        Ok(dim) if dim.width > 0 => dim.height as f32 / dim.width as f32,
        Ok(_) => DEFAULT_PAGE_ASPECT,
        Err(e) => {
            debug!(
                "Could not read dimensions of {}, assuming {:.3}: {e}",
                path.display(),
                DEFAULT_PAGE_ASPECT
            );
            DEFAULT_PAGE_ASPECT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Minimal PNG header: signature plus an IHDR chunk carrying the
    /// dimensions. imagesize reads only this far.
    fn write_png(path: &Path, width: u32, height: u32) {
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn discovers_pages_in_name_order() {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("0002.png"), 100, 150);
        write_png(&dir.path().join("0001.png"), 100, 150);
        write_png(&dir.path().join("0010.png"), 100, 150);

        let pages = PageSet::discover(dir.path()).unwrap();
        assert_eq!(pages.count(), 3);
        assert_eq!(pages.file_name(1), "0001.png");
        assert_eq!(pages.file_name(2), "0002.png");
        assert_eq!(pages.file_name(3), "0010.png");
    }

    #[test]
    fn ignores_files_that_do_not_match_the_pattern() {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("0001.png"), 100, 150);
        write_png(&dir.path().join("12.png"), 100, 150);
        write_png(&dir.path().join("cover.png"), 100, 150);
        fs::write(dir.path().join("0002.txt"), "not an image").unwrap();

        let pages = PageSet::discover(dir.path()).unwrap();
        assert_eq!(pages.count(), 1);
        assert_eq!(pages.file_name(1), "0001.png");
    }

    #[test]
    fn probes_aspect_from_image_header() {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("0001.png"), 100, 150);

        let pages = PageSet::discover(dir.path()).unwrap();
        let aspect = pages.asset(1).unwrap().aspect;
        assert!((aspect - 1.5).abs() < 1e-6);
    }

    #[test]
    fn unprobeable_images_fall_back_to_default_aspect() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0001.svg"), "<svg></svg>").unwrap();

        let pages = PageSet::discover(dir.path()).unwrap();
        let aspect = pages.asset(1).unwrap().aspect;
        assert!((aspect - DEFAULT_PAGE_ASPECT).abs() < 1e-6);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(PageSet::discover(dir.path()).is_err());
    }

    #[test]
    fn gaps_in_numbering_are_addressed_by_position() {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("0001.png"), 100, 150);
        write_png(&dir.path().join("0005.png"), 100, 150);

        let pages = PageSet::discover(dir.path()).unwrap();
        assert_eq!(pages.count(), 2);
        // Page 2 is the second file by name, regardless of its number.
        assert_eq!(pages.file_name(2), "0005.png");
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("0001.png"), 100, 150);

        let pages = PageSet::discover(dir.path()).unwrap();
        assert!(pages.asset(0).is_none());
        assert!(pages.asset(2).is_none());
    }
}
