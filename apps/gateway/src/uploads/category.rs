use crate::errors::AppError;

/// Everything the upload operation needs to know about one category.
#[derive(Debug, PartialEq, Eq)]
pub struct CategoryDescriptor {
    pub name: &'static str,
    /// Subdirectory of the upload root that receives this category's files.
    pub directory: &'static str,
    /// Lowercase, without the leading dot.
    pub allowed_extensions: &'static [&'static str],
    pub success_message: &'static str,
}

static RESUME: CategoryDescriptor = CategoryDescriptor {
    name: "resume",
    directory: "resumes",
    allowed_extensions: &["pdf", "doc", "docx"],
    success_message: "Resume uploaded successfully",
};

static VIDEO: CategoryDescriptor = CategoryDescriptor {
    name: "video",
    directory: "videos",
    allowed_extensions: &["mp4", "webm", "avi", "mov"],
    success_message: "Video uploaded successfully",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Resume,
    Video,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Resume, Category::Video];

    pub fn descriptor(self) -> &'static CategoryDescriptor {
        match self {
            Category::Resume => &RESUME,
            Category::Video => &VIDEO,
        }
    }
}

impl CategoryDescriptor {
    /// True when `filename` has a `.` and its lowercased final suffix is allowed.
    pub fn accepts(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_lowercase();
                self.allowed_extensions.contains(&ext.as_str())
            }
            None => false,
        }
    }
}

/// Runs the name checks in order: empty name first, then the extension.
pub fn validate_filename(descriptor: &CategoryDescriptor, filename: &str) -> Result<(), AppError> {
    if filename.is_empty() {
        return Err(AppError::NoFileSelected);
    }
    if !descriptor.accepts(filename) {
        return Err(AppError::InvalidFileType);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_accepts_documents_case_insensitively() {
        let resume = Category::Resume.descriptor();
        for name in ["cv.pdf", "CV.PDF", "letter.doc", "my.resume.Docx"] {
            assert!(resume.accepts(name), "{name} should be accepted");
        }
    }

    #[test]
    fn test_video_accepts_only_video_containers() {
        let video = Category::Video.descriptor();
        for name in ["clip.mp4", "clip.webm", "clip.AVI", "clip.mov"] {
            assert!(video.accepts(name), "{name} should be accepted");
        }
        assert!(!video.accepts("cv.pdf"));
        assert!(!video.accepts("clip.mkv"));
    }

    #[test]
    fn test_names_without_dot_are_rejected() {
        assert!(!Category::Resume.descriptor().accepts("pdf"));
        assert!(!Category::Video.descriptor().accepts("mp4"));
    }

    #[test]
    fn test_only_last_suffix_counts() {
        let resume = Category::Resume.descriptor();
        assert!(!resume.accepts("cv.pdf.exe"));
        assert!(!resume.accepts("cv.pdf."));
        assert!(resume.accepts("archive.exe.pdf"));
    }

    #[test]
    fn test_validate_filename_ordering() {
        let resume = Category::Resume.descriptor();
        assert!(matches!(
            validate_filename(resume, ""),
            Err(AppError::NoFileSelected)
        ));
        assert!(matches!(
            validate_filename(resume, "cv.exe"),
            Err(AppError::InvalidFileType)
        ));
        assert!(validate_filename(resume, "cv.pdf").is_ok());
    }

    #[test]
    fn test_categories_use_distinct_directories() {
        assert_eq!(Category::Resume.descriptor().directory, "resumes");
        assert_eq!(Category::Video.descriptor().directory, "videos");
    }
}
