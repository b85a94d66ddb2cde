use crate::batch::{Credential, SecretKey};
use crate::error::WalletError;
use crate::traits::AddressDeriver;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Credentials grouped by the file they came from.
#[derive(Debug)]
struct WalletFile {
    file_name: String,
    credentials: Vec<Credential>,
}

/// Loads private keys from `*.txt` files, one key per line.
#[derive(Debug, Default)]
pub struct WalletManager {
    files: Vec<WalletFile>,
}

impl WalletManager {
    pub const DEFAULT_DIR: &'static str = "wallets";

    /// Scans `dir` in file-name order. A missing directory is created and
    /// yields no wallets; bad lines are logged and skipped.
    pub fn load_dir(dir: &Path, deriver: &dyn AddressDeriver) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create wallet directory {:?}", dir))?;
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| WalletError::DirectoryUnreadable {
                path: dir.display().to_string(),
                msg: e.to_string(),
            })?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        entries.sort();

        if entries.is_empty() {
            warn!("No .txt files found in {:?}", dir);
        }

        let mut files = Vec::new();
        for path in entries {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown.txt")
                .to_string();

            let content = match fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Error reading wallet file {}: {}", file_name, e);
                    continue;
                }
            };

            let credentials = parse_wallet_lines(&file_name, &content, deriver);
            info!(
                "Loaded {} valid wallets from {}",
                credentials.len(),
                file_name
            );
            if !credentials.is_empty() {
                files.push(WalletFile {
                    file_name,
                    credentials,
                });
            }
        }

        let manager = Self { files };
        info!(
            "Total loaded: {} wallets from {} files",
            manager.count(),
            manager.files.len()
        );
        Ok(manager)
    }

    /// Returns the number of loaded wallets
    pub fn count(&self) -> usize {
        self.files.iter().map(|f| f.credentials.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Source files that contributed at least one wallet
    pub fn list_files(&self) -> Vec<String> {
        self.files.iter().map(|f| f.file_name.clone()).collect()
    }

    /// All credentials, file order then line order.
    pub fn into_credentials(self) -> Vec<Credential> {
        self.files
            .into_iter()
            .flat_map(|f| f.credentials.into_iter())
            .collect()
    }

    /// Writes template wallet files that do not exist yet.
    pub fn create_sample_files(dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create wallet directory {:?}", dir))?;

        let samples: [(&str, &[&str]); 2] = [
            (
                "main_wallets.txt",
                &[
                    "# Main wallet private keys - one per line",
                    "# Lines starting with # are ignored",
                    "your_private_key_1_here",
                    "your_private_key_2_here",
                ],
            ),
            (
                "backup_wallets.txt",
                &[
                    "# Backup wallet private keys",
                    "your_private_key_3_here",
                    "your_private_key_4_here",
                ],
            ),
        ];

        let mut written = Vec::new();
        for (name, lines) in samples {
            let path = dir.join(name);
            if path.exists() {
                continue;
            }
            fs::write(&path, lines.join("\n"))
                .with_context(|| format!("Failed to write sample file {:?}", path))?;
            info!("Created sample file: {}", name);
            written.push(path);
        }
        Ok(written)
    }
}

fn parse_wallet_lines(
    file_name: &str,
    content: &str,
    deriver: &dyn AddressDeriver,
) -> Vec<Credential> {
    let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
    let mut credentials = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let line_number = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parsed = normalize_private_key(trimmed)
            .map_err(anyhow::Error::from)
            .and_then(|key| {
                let address = deriver.derive_address(&key)?;
                Ok((key, address))
            });

        match parsed {
            Ok((key, address)) => credentials.push(Credential {
                id: format!("{}_{}", stem, line_number),
                address,
                secret: SecretKey::new(key),
                source_file: file_name.to_string(),
                line_number,
            }),
            Err(e) => warn!(
                "Invalid private key at line {} in {}: {}",
                line_number, file_name, e
            ),
        }
    }

    credentials
}

/// `0x`-prefixed, 64 hex digits, lowercase.
pub fn normalize_private_key(raw: &str) -> Result<String, WalletError> {
    let body = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    if body.len() != 64 {
        return Err(WalletError::InvalidKeyLength { length: body.len() });
    }
    hex::decode(body).map_err(|_| WalletError::InvalidKeyFormat)?;

    Ok(format!("0x{}", body.to_lowercase()))
}
