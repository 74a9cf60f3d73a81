/// Content-type and extension classification of directory entries.
///
/// Type classification looks at the top-level part of a MIME type
/// (`image`, `video`, `text`, `audio`, `font`) and maps it to one of the
/// display folders below. Anything unknown lands in `Other`.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::{Category, FileMapper, classify_by_extension};
///
/// let mapper = FileMapper::default();
/// assert_eq!(mapper.categorize_name("photo.jpg"), Category::Images);
/// assert_eq!(mapper.categorize_name("README"), Category::Other);
/// assert_eq!(classify_by_extension("report.pdf", false), "pdf");
/// assert_eq!(classify_by_extension("drafts", true), "folders");
/// ```
use std::collections::HashMap;
use std::path::Path;

/// Folder name used for directories when sorting by extension.
pub const FOLDERS_DIR_NAME: &str = "folders";

/// Font formats that `mime_guess` files under `application/*`.
const FONT_MIME_OVERRIDES: &[(&str, &str)] = &[
    ("otf", "font/otf"),
    ("ttf", "font/ttf"),
    ("ttc", "font/collection"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
];

/// Guesses the MIME type of `name` from its extension.
fn mime_for_name(name: &str) -> Option<String> {
    if let Some((_, ext)) = name.rsplit_once('.') {
        let ext = ext.to_lowercase();
        if let Some((_, mime)) = FONT_MIME_OVERRIDES.iter().find(|(e, _)| *e == ext) {
            return Some((*mime).to_string());
        }
    }
    mime_guess::from_path(name)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Represents a broad content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `image/*`
    Images,
    /// `video/*`
    Video,
    /// `text/*`
    Text,
    /// `audio/*`
    Audio,
    /// `font/*`
    Fonts,
    /// Unknown or undetectable
    Other,
}

impl Category {
    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Fonts.dir_name(), "Fonts");
    /// assert_eq!(Category::Other.dir_name(), "Other");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Video => "Video",
            Category::Text => "Text",
            Category::Audio => "Audio",
            Category::Fonts => "Fonts",
            Category::Other => "Other",
        }
    }
}

/// Maps top-level MIME types to categories.
///
/// The table is filled once at construction and never changes afterwards.
/// Custom tables can be built with [`FileMapper::from_pairs`].
#[derive(Debug, Clone)]
pub struct FileMapper {
    top_level_map: HashMap<String, Category>,
}

impl FileMapper {
    /// Creates a new `FileMapper` with the standard five categories.
    pub fn new() -> Self {
        Self::from_pairs([
            ("image", Category::Images),
            ("video", Category::Video),
            ("text", Category::Text),
            ("audio", Category::Audio),
            ("font", Category::Fonts),
        ])
    }

    /// Creates a mapper from explicit `(top-level type, category)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Category)>,
    {
        let top_level_map = pairs
            .into_iter()
            .map(|(top, category)| (top.to_lowercase(), category))
            .collect();
        Self { top_level_map }
    }

    /// Maps a full MIME type (`"image/png"`) or a bare top-level type (`"image"`)
    /// to a category.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.mime_to_category("audio/mpeg"), Some(Category::Audio));
    /// assert_eq!(mapper.mime_to_category("application/pdf"), None);
    /// ```
    pub fn mime_to_category(&self, mime_type: &str) -> Option<Category> {
        let top_level = mime_type.split('/').next().unwrap_or_default();
        self.top_level_map.get(&top_level.to_lowercase()).copied()
    }

    /// Categorizes an entry by its name alone.
    ///
    /// Never fails: names without a recognizable extension are `Other`.
    pub fn categorize_name(&self, name: &str) -> Category {
        mime_for_name(name)
            .and_then(|mime| self.mime_to_category(&mime))
            .unwrap_or(Category::Other)
    }

    /// Categorizes a regular file by sniffing its leading bytes.
    ///
    /// Returns `None` for directories, unreadable files, and content `infer`
    /// does not recognize.
    pub fn categorize_content(&self, path: &Path) -> Option<Category> {
        if !path.is_file() {
            return None;
        }
        let kind = infer::get_from_path(path).ok()??;
        self.mime_to_category(kind.mime_type())
    }

    /// Categorizes an entry by name, falling back to content sniffing when
    /// `sniff_content` is set and the name gives no answer.
    pub fn categorize(&self, path: &Path, sniff_content: bool) -> Category {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if let Some(mime) = mime_for_name(&name) {
            return self.mime_to_category(&mime).unwrap_or(Category::Other);
        }

        if sniff_content && let Some(category) = self.categorize_content(path) {
            return category;
        }

        Category::Other
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the type folder name for `name` using the standard mapper.
pub fn classify_by_type(name: &str) -> &'static str {
    FileMapper::default().categorize_name(name).dir_name()
}

/// Returns the extension folder name for an entry.
///
/// Directories go to `"folders"`. Files use the text after the last `.`;
/// a name without a usable extension is used whole, so `Makefile` is sorted
/// into a folder called `Makefile`.
pub fn classify_by_extension(name: &str, is_directory: bool) -> String {
    if is_directory {
        return FOLDERS_DIR_NAME.to_string();
    }
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_string(),
        _ => name.to_string(),
    }
}
