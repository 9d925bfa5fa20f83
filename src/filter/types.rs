//! File classification
//!
//! Hooks may restrict themselves to files carrying certain type tags
//! (`file`, `python`, `executable`, ...). The tags are derived from file
//! metadata rather than the path text, so the evaluator asks a
//! [`FileClassifier`] for them.

use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered set of type tags
pub type TagSet = BTreeSet<String>;

pub const FILE: &str = "file";
pub const DIRECTORY: &str = "directory";
pub const SYMLINK: &str = "symlink";
pub const EXECUTABLE: &str = "executable";
pub const NON_EXECUTABLE: &str = "non-executable";
pub const TEXT: &str = "text";
pub const BINARY: &str = "binary";

/// Number of leading bytes inspected for text/binary detection
const SNIFF_LEN: usize = 1024;

lazy_static! {
    static ref EXTENSIONS: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("py", &["text", "python"]);
        m.insert("pyi", &["text", "pyi"]);
        m.insert("pyx", &["text", "cython"]);
        m.insert("ipynb", &["text", "json", "jupyter"]);
        m.insert("rs", &["text", "rust"]);
        m.insert("toml", &["text", "toml"]);
        m.insert("yaml", &["text", "yaml"]);
        m.insert("yml", &["text", "yaml"]);
        m.insert("json", &["text", "json"]);
        m.insert("md", &["text", "markdown"]);
        m.insert("rst", &["text", "rst"]);
        m.insert("txt", &["text", "plain-text"]);
        m.insert("cfg", &["text"]);
        m.insert("ini", &["text", "ini"]);
        m.insert("sh", &["text", "shell"]);
        m.insert("bash", &["text", "shell", "bash"]);
        m.insert("zsh", &["text", "shell", "zsh"]);
        m.insert("js", &["text", "javascript"]);
        m.insert("jsx", &["text", "jsx"]);
        m.insert("ts", &["text", "ts"]);
        m.insert("tsx", &["text", "tsx"]);
        m.insert("html", &["text", "html"]);
        m.insert("css", &["text", "css"]);
        m.insert("scss", &["text", "scss"]);
        m.insert("c", &["text", "c"]);
        m.insert("h", &["text", "header", "c"]);
        m.insert("cc", &["text", "c++"]);
        m.insert("cpp", &["text", "c++"]);
        m.insert("hpp", &["text", "header", "c++"]);
        m.insert("go", &["text", "go"]);
        m.insert("java", &["text", "java"]);
        m.insert("rb", &["text", "ruby"]);
        m.insert("pl", &["text", "perl"]);
        m.insert("lua", &["text", "lua"]);
        m.insert("sql", &["text", "sql"]);
        m.insert("xml", &["text", "xml"]);
        m.insert("proto", &["text", "proto"]);
        m.insert("png", &["binary", "image", "png"]);
        m.insert("jpg", &["binary", "image", "jpeg"]);
        m.insert("jpeg", &["binary", "image", "jpeg"]);
        m.insert("gif", &["binary", "image", "gif"]);
        m.insert("ico", &["binary", "icon"]);
        m.insert("pdf", &["binary", "pdf"]);
        m.insert("zip", &["binary", "zip"]);
        m.insert("gz", &["binary", "gzip"]);
        m.insert("tgz", &["binary", "gzip"]);
        m.insert("whl", &["binary", "wheel", "zip"]);
        m.insert("so", &["binary"]);
        m.insert("pyc", &["binary"]);
        m
    };

    static ref NAMES: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("Makefile", &["text", "makefile"]);
        m.insert("Dockerfile", &["text", "dockerfile"]);
        m.insert("Cargo.lock", &["text", "toml"]);
        m.insert("Pipfile", &["text", "toml"]);
        m.insert("LICENSE", &["text", "plain-text"]);
        m.insert("README", &["text", "plain-text"]);
        m.insert(".gitignore", &["text", "gitignore"]);
        m.insert(".gitattributes", &["text", "gitattributes"]);
        m.insert(".editorconfig", &["text", "editorconfig"]);
        m
    };

    static ref INTERPRETERS: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("python", &["python"]);
        m.insert("python2", &["python", "python2"]);
        m.insert("python3", &["python", "python3"]);
        m.insert("sh", &["shell", "sh"]);
        m.insert("bash", &["shell", "bash"]);
        m.insert("zsh", &["shell", "zsh"]);
        m.insert("node", &["javascript"]);
        m.insert("ruby", &["ruby"]);
        m.insert("perl", &["perl"]);
        m
    };

    static ref KNOWN_TAGS: BTreeSet<&'static str> = {
        let mut tags: BTreeSet<&'static str> = [
            FILE, DIRECTORY, SYMLINK, EXECUTABLE, NON_EXECUTABLE, TEXT, BINARY,
        ]
        .into_iter()
        .collect();
        for table in [&*EXTENSIONS, &*NAMES, &*INTERPRETERS] {
            for values in table.values() {
                tags.extend(values.iter().copied());
            }
        }
        tags
    };
}

/// True for tags a classifier in this crate can produce
pub fn is_known_tag(tag: &str) -> bool {
    KNOWN_TAGS.contains(tag)
}

/// Source of type tags for candidate paths
pub trait FileClassifier: Send + Sync {
    /// Tags for a repository-relative path. Paths that cannot be inspected
    /// carry no tags.
    fn classify(&self, path: &str) -> TagSet;
}

/// Tags derived from the file name alone: special names first, then the extension.
pub fn tags_from_filename(path: &str) -> TagSet {
    let name = path.rsplit('/').next().unwrap_or(path);

    if let Some(tags) = NAMES.get(name) {
        return to_set(tags);
    }

    match name.rsplit_once('.') {
        Some((_, ext)) => EXTENSIONS
            .get(ext.to_ascii_lowercase().as_str())
            .map(|tags| to_set(tags))
            .unwrap_or_default(),
        None => TagSet::new(),
    }
}

/// Tags for the interpreter named on a `#!` line, if any
pub fn tags_from_shebang(first_line: &str) -> TagSet {
    let Some(command) = first_line.strip_prefix("#!") else {
        return TagSet::new();
    };

    let mut words = command.split_whitespace();
    let Some(program) = words.next() else {
        return TagSet::new();
    };
    let mut interpreter = program.rsplit('/').next().unwrap_or(program);
    if interpreter == "env" {
        // Skip `env` flags such as `-S`
        match words.find(|w| !w.starts_with('-')) {
            Some(w) => interpreter = w,
            None => return TagSet::new(),
        }
    }

    INTERPRETERS
        .get(interpreter)
        .map(|tags| to_set(tags))
        .unwrap_or_default()
}

fn to_set(tags: &[&str]) -> TagSet {
    tags.iter().map(|t| t.to_string()).collect()
}

/// Classifies files by inspecting them on disk
#[derive(Debug, Clone)]
pub struct IdentifyClassifier {
    root: PathBuf,
}

impl IdentifyClassifier {
    /// Resolve relative paths against `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn sniff(path: &Path) -> Option<(bool, String)> {
        let mut file = File::open(path).ok()?;
        let mut buffer = vec![0; SNIFF_LEN];
        let bytes_read = file.read(&mut buffer).ok()?;
        buffer.truncate(bytes_read);

        let is_binary = content_inspector::inspect(&buffer).is_binary();
        let first_line = String::from_utf8_lossy(&buffer)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        Some((is_binary, first_line))
    }
}

impl FileClassifier for IdentifyClassifier {
    fn classify(&self, path: &str) -> TagSet {
        let full_path = self.root.join(path);
        let metadata = match fs::symlink_metadata(&full_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Cannot classify {}: {}", full_path.display(), e);
                return TagSet::new();
            }
        };

        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            return to_set(&[SYMLINK]);
        }
        if file_type.is_dir() {
            return to_set(&[DIRECTORY]);
        }

        let mut tags = to_set(&[FILE]);
        let executable = is_executable(&metadata);
        tags.insert(if executable { EXECUTABLE } else { NON_EXECUTABLE }.to_string());

        let name_tags = tags_from_filename(path);
        let needs_content = !(name_tags.contains(TEXT) || name_tags.contains(BINARY));
        tags.extend(name_tags.iter().cloned());

        if needs_content {
            if let Some((is_binary, first_line)) = Self::sniff(&full_path) {
                tags.insert(if is_binary { BINARY } else { TEXT }.to_string());
                if executable && name_tags.is_empty() && !is_binary {
                    tags.extend(tags_from_shebang(&first_line));
                }
            }
        }

        tags
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

/// Classifies by name only, assuming a regular, non-executable file.
///
/// Useful for paths that do not exist yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameClassifier;

impl FileClassifier for FilenameClassifier {
    fn classify(&self, path: &str) -> TagSet {
        let mut tags = to_set(&[FILE, NON_EXECUTABLE]);
        let name_tags = tags_from_filename(path);
        if !name_tags.contains(BINARY) {
            tags.insert(TEXT.to_string());
        }
        tags.extend(name_tags);
        tags
    }
}

/// Fixed path-to-tags table
#[derive(Debug, Clone, Default)]
pub struct StaticClassifier {
    tags: HashMap<String, TagSet>,
}

impl StaticClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, path: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .insert(path.to_string(), tags.into_iter().map(Into::into).collect());
        self
    }
}

impl FileClassifier for StaticClassifier {
    fn classify(&self, path: &str) -> TagSet {
        self.tags.get(path).cloned().unwrap_or_default()
    }
}
