//! Capture-year extraction from media files
//!
//! The organizer buckets files by the year the photo or video was taken.
//! EXIF `DateTimeOriginal` is the authoritative source, with `DateTime` as a
//! secondary tag; files without usable EXIF data (videos, screenshots,
//! stripped images) fall back to the filesystem modified time. A file whose
//! metadata cannot be read at all yields `None` and ends up in the "Unknown"
//! bucket — extraction failure is never an error.

use chrono::{DateTime, Datelike, Utc};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Determine the capture year of a media file
pub fn capture_year(path: &Path) -> Option<i32> {
    if let Some(year) = exif_year(path) {
        return Some(year);
    }
    modified_year(path)
}

/// Read the capture year from embedded EXIF metadata
fn exif_year(path: &Path) -> Option<i32> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

    for tag in [exif::Tag::DateTimeOriginal, exif::Tag::DateTime] {
        if let Some(field) = exif.get_field(tag, exif::In::PRIMARY) {
            if let Some(year) = parse_exif_year(&field.display_value().to_string()) {
                return Some(year);
            }
        }
    }

    None
}

/// Parse the year out of an EXIF datetime string
///
/// EXIF datetimes come as "2023:06:15 14:30:00"; some writers use dashes
/// instead of colons in the date part.
fn parse_exif_year(value: &str) -> Option<i32> {
    let value = value.trim_matches('"');
    let date_part = value.split_whitespace().next()?;
    let year_part = date_part.split([':', '-']).next()?;

    let year: i32 = year_part.parse().ok()?;
    // EXIF dates before the photography era are corrupt metadata
    (1900..=9999).contains(&year).then_some(year)
}

/// Fall back to the filesystem modified timestamp
fn modified_year(path: &Path) -> Option<i32> {
    let metadata = fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    let datetime: DateTime<Utc> = modified.into();
    Some(datetime.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_exif_year_colon_format() {
        assert_eq!(parse_exif_year("2023:06:15 14:30:00"), Some(2023));
    }

    #[test]
    fn test_parse_exif_year_dash_format() {
        assert_eq!(parse_exif_year("2019-12-01 08:00:00"), Some(2019));
        assert_eq!(parse_exif_year("\"2019-12-01 08:00:00\""), Some(2019));
    }

    #[test]
    fn test_parse_exif_year_rejects_garbage() {
        assert_eq!(parse_exif_year(""), None);
        assert_eq!(parse_exif_year("not a date"), None);
        assert_eq!(parse_exif_year("0000:00:00 00:00:00"), None);
    }

    #[test]
    fn test_capture_year_falls_back_to_modified_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_exif.jpg");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"not really a jpeg").unwrap();
        drop(file);

        // The file was just created, so the fallback year is the current one
        let year = capture_year(&path);
        assert_eq!(year, Some(Utc::now().year()));
    }

    #[test]
    fn test_capture_year_missing_file_is_none() {
        assert_eq!(capture_year(Path::new("/nonexistent/photo.jpg")), None);
    }
}
