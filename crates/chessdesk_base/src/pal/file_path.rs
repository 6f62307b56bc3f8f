use relative_path::{RelativePath, RelativePathBuf};
use std::path::{Path, PathBuf};

/* 📖 # Why wrap RelativePathBuf instead of passing PathBuf around?

Every path the console touches (today only its configuration file) is resolved
against the PAL's base directory. Keeping the type relative makes it impossible
to hand an absolute system path to the PAL by accident.
*/

/// Path relative to the PAL base directory.
///
/// ```
/// use chessdesk_base::FilePath;
///
/// let config = FilePath::from("chessdesk.toml");
/// assert_eq!(config.to_string(), "chessdesk.toml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    /// The relative path as a `std::path::Path`, not yet joined to any base.
    pub fn as_path(&self) -> &Path {
        Path::new(self.0.as_str())
    }

    /// Joins this path onto `base`.
    pub fn resolve_against(&self, base: &Path) -> PathBuf {
        self.0.to_path(base)
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<&RelativePath> for FilePath {
    fn from(p: &RelativePath) -> Self {
        Self(p.to_relative_path_buf())
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
