//! Token file persistence

use crate::customer::CustomerTier;
use crate::error::TokenError;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persist a token to `{dir}/{username}_{tier}_{YYYY-MM-DD_HH-MM-SS}.jwt`,
/// creating the directory if absent. Returns the written path.
pub fn save_token(
    token: &str,
    username: &str,
    tier: CustomerTier,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, TokenError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let filename = format!("{}_{}_{}.jwt", username, tier.as_str(), stamp);
    let path = dir.join(filename);

    std::fs::write(&path, token)?;
    debug!(path = %path.display(), "token saved");
    Ok(path)
}

/// Load all `*.jwt` files from a directory, trimming trailing whitespace
pub fn load_tokens(dir: impl AsRef<Path>) -> Result<Vec<String>, TokenError> {
    let mut tokens = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.extension().map(|e| e == "jwt").unwrap_or(false) {
            let token = std::fs::read_to_string(&path)?;
            tokens.push(token.trim().to_string());
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_token_filename_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_token("abc.def.ghi", "user1", CustomerTier::Premium, dir.path()).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("user1_premium_"));
        assert!(name.ends_with(".jwt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_save_token_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("tokens/out");
        let path = save_token("tok", "user2", CustomerTier::Free, &nested).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_tokens_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jwt"), "token-a\n").unwrap();
        std::fs::write(dir.path().join("b.jwt"), "token-b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a token").unwrap();

        let mut tokens = load_tokens(dir.path()).unwrap();
        tokens.sort();
        assert_eq!(tokens, vec!["token-a", "token-b"]);
    }
}
