/// Media classification derived from a file name's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeClass {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

impl MimeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Other => "other",
        }
    }

    /// Returns true when the class selects the inline-image content part.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image)
    }

    /// Classifies a dot-prefixed, lower-cased extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            ".png" | ".jpg" | ".jpeg" | ".gif" | ".webp" | ".bmp" | ".svg" => Self::Image,
            ".mp4" | ".mov" | ".webm" | ".avi" | ".mkv" => Self::Video,
            ".mp3" | ".wav" | ".ogg" | ".flac" | ".m4a" => Self::Audio,
            ".pdf" | ".txt" | ".md" | ".doc" | ".docx" | ".csv" | ".json" => Self::Document,
            _ => Self::Other,
        }
    }

    /// Classifies a full file name; names without an extension are `Other`.
    pub fn from_file_name(file_name: &str) -> Self {
        file_extension(file_name)
            .map(|extension| Self::from_extension(&extension))
            .unwrap_or(Self::Other)
    }
}

/// Extracts the substring after the last `.`, lower-cased and dot-prefixed.
///
/// A name without a `.` has no extension and never matches an allow-list.
pub fn file_extension(file_name: &str) -> Option<String> {
    let dot_index = file_name.rfind('.')?;
    let suffix = &file_name[dot_index + 1..];
    Some(format!(".{}", suffix.to_lowercase()))
}

/// MIME string used by the inline data-URI encoder.
pub fn mime_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some(".png") => "image/png",
        Some(".jpg") | Some(".jpeg") => "image/jpeg",
        Some(".gif") => "image/gif",
        Some(".webp") => "image/webp",
        Some(".svg") => "image/svg+xml",
        Some(".mp4") => "video/mp4",
        Some(".webm") => "video/webm",
        Some(".mp3") => "audio/mpeg",
        Some(".wav") => "audio/wav",
        Some(".pdf") => "application/pdf",
        Some(".txt") => "text/plain",
        Some(".md") => "text/markdown",
        Some(".csv") => "text/csv",
        Some(".json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Allow-list parsed from the comma-separated configuration string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedExtensions {
    entries: Vec<String>,
}

impl AllowedExtensions {
    /// Splits on `,`, trims entries, and lower-cases them for case-insensitive matching.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(',')
            .map(|entry| entry.trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { entries }
    }

    /// Returns true when the file name carries an extension present in the allow-list.
    pub fn permits(&self, file_name: &str) -> bool {
        match file_extension(file_name) {
            Some(extension) => self.entries.iter().any(|entry| entry == &extension),
            None => false,
        }
    }

    /// User-facing enumeration of the allowed extensions.
    pub fn describe(&self) -> String {
        self.entries.join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lower_cased_and_dot_prefixed() {
        assert_eq!(file_extension("Report.PDF"), Some(".pdf".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some(".gz".to_string()));
        assert_eq!(file_extension(".bashrc"), Some(".bashrc".to_string()));
    }

    #[test]
    fn name_without_dot_has_no_extension() {
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(""), None);
    }

    #[test]
    fn allow_list_trims_entries_and_matches_case_insensitively() {
        let allowed = AllowedExtensions::parse(" .pdf , .PNG,.txt,, ");
        assert!(allowed.permits("notes.pdf"));
        assert!(allowed.permits("photo.PNG"));
        assert!(allowed.permits("todo.TXT"));
        assert!(!allowed.permits("binary.exe"));
        assert!(!allowed.permits("README"));
        assert_eq!(allowed.describe(), ".pdf, .png, .txt");
    }

    #[test]
    fn empty_allow_list_permits_nothing() {
        let allowed = AllowedExtensions::parse("");
        assert!(allowed.is_empty());
        assert!(!allowed.permits("anything.pdf"));
    }

    #[test]
    fn mime_class_covers_the_media_families() {
        assert_eq!(MimeClass::from_file_name("a.jpeg"), MimeClass::Image);
        assert_eq!(MimeClass::from_file_name("a.mov"), MimeClass::Video);
        assert_eq!(MimeClass::from_file_name("a.flac"), MimeClass::Audio);
        assert_eq!(MimeClass::from_file_name("a.pdf"), MimeClass::Document);
        assert_eq!(MimeClass::from_file_name("a.xyz"), MimeClass::Other);
        assert_eq!(MimeClass::from_file_name("no-extension"), MimeClass::Other);
        assert!(MimeClass::Image.is_image());
        assert!(!MimeClass::Document.is_image());
    }

    #[test]
    fn mime_type_falls_back_to_octet_stream() {
        assert_eq!(mime_type_for(Some(".png")), "image/png");
        assert_eq!(mime_type_for(Some(".xyz")), "application/octet-stream");
        assert_eq!(mime_type_for(None), "application/octet-stream");
    }
}
