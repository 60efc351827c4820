//! DNS catalog loader.
//!
//! This module loads the candidate list from a JSON file of the form
//! `{"list": [{"id": 1, "ip": "1.1.1.1", "company": "Cloudflare"}, ...]}`
//! or from command-line arguments.
//!
//! A missing file or a malformed top level is fatal. A malformed entry
//! only costs that entry: it is skipped with a warning.

use crate::dns::types::{DnsCandidate, DnsCatalog};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

/// File name searched for when no catalog path is given.
pub const CATALOG_FILE_NAME: &str = "dnsList.json";

#[derive(Debug, Deserialize)]
struct RawCatalog {
    list: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    company: Option<String>,
}

/// DNS catalog loader.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Catalog` if the file cannot be read, is not valid
    /// JSON, lacks the `list` field, or holds no usable entry.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let catalog = CatalogLoader::load_from_file("dnsList.json")?;
    /// for candidate in &catalog.candidates {
    ///     println!("{}: {}", candidate.provider, candidate.address);
    /// }
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<DnsCatalog> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::catalog(format!("{} not found", path.display()))
            }
            _ => Error::catalog(format!("cannot read {}: {e}", path.display())),
        })?;

        Self::parse(&content)
            .map_err(|e| Error::catalog(format!("{} is not a valid catalog: {e}", path.display())))
    }

    /// Parse catalog JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or no entry is usable.
    pub fn parse(content: &str) -> Result<DnsCatalog> {
        let raw: RawCatalog = serde_json::from_str(content)?;

        let mut candidates = Vec::with_capacity(raw.list.len());
        for (idx, value) in raw.list.into_iter().enumerate() {
            match Self::candidate_from_value(idx + 1, value) {
                Ok(candidate) => candidates.push(candidate),
                Err(reason) => tracing::warn!("Skipping catalog entry #{}: {reason}", idx + 1),
            }
        }

        if candidates.is_empty() {
            return Err(Error::catalog("no usable DNS server entries"));
        }

        Ok(DnsCatalog::from_candidates(candidates))
    }

    /// Resolve the catalog path.
    ///
    /// An explicit path wins. Otherwise searches, in order:
    /// 1. `$CONFIG_DIR/dnsjumper/dnsList.json`
    /// 2. `dnsList.json` in the current directory
    /// 3. `dnsList.json` next to the executable
    ///
    /// # Errors
    ///
    /// Returns `Error::Catalog` if no default file exists.
    pub fn locate(explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path);
        }

        let mut search = vec![
            Self::config_dir().join(CATALOG_FILE_NAME),
            PathBuf::from(CATALOG_FILE_NAME),
        ];
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            search.push(dir.join(CATALOG_FILE_NAME));
        }

        search.into_iter().find(|p| p.is_file()).ok_or_else(|| {
            Error::catalog(format!(
                "{CATALOG_FILE_NAME} not found. Pass --file or place it in {}",
                Self::config_dir().display()
            ))
        })
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dnsjumper")
    }

    /// Create a catalog from command-line arguments.
    ///
    /// # Arguments
    ///
    /// * `dns_servers` - Strings in format "IP#Provider"
    ///
    /// # Errors
    ///
    /// Returns an error if any address is not an IPv4 literal.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let args = vec!["8.8.8.8#Google".to_string(), "1.1.1.1#Cloudflare".to_string()];
    /// let catalog = CatalogLoader::from_args(args)?;
    /// ```
    pub fn from_args(dns_servers: Vec<String>) -> Result<DnsCatalog> {
        let mut candidates = Vec::with_capacity(dns_servers.len());
        for (idx, s) in dns_servers.iter().enumerate() {
            let (ip, provider) = match s.split_once('#') {
                Some((ip, provider)) => (ip.trim(), provider.trim()),
                None => (s.trim(), s.trim()),
            };

            let address = parse_ipv4(ip).map_err(Error::parse)?;
            candidates.push(DnsCandidate::new((idx + 1).to_string(), address, provider));
        }
        Ok(DnsCatalog::from_candidates(candidates))
    }

    fn candidate_from_value(position: usize, value: Value) -> std::result::Result<DnsCandidate, String> {
        let entry: RawEntry =
            serde_json::from_value(value).map_err(|e| format!("malformed entry: {e}"))?;

        let ip = entry.ip.ok_or("missing ip address")?;
        let address = parse_ipv4(ip.trim())?;
        let provider = entry
            .company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| format!("missing provider for {address}"))?;

        let id = match entry.id {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => position.to_string(),
            Some(other) => other.to_string(),
        };

        Ok(DnsCandidate::new(id, address, provider))
    }
}

/// Parse an IPv4 literal, naming IPv6 addresses explicitly.
fn parse_ipv4(ip: &str) -> std::result::Result<Ipv4Addr, String> {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => Ok(v4),
        Ok(IpAddr::V6(_)) => Err(format!("IPv6 address not supported: {ip}")),
        Err(_) => Err(format!("Invalid IP address: {ip}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_catalog() {
        let json = r#"{"list": [
            {"id": 1, "ip": "1.1.1.1", "company": "Cloudflare"},
            {"id": "g1", "ip": "8.8.8.8", "company": "Google"}
        ]}"#;
        let catalog = CatalogLoader::parse(json).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.candidates[0].id, "1");
        assert_eq!(catalog.candidates[0].address, Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(catalog.candidates[0].provider, "Cloudflare");
        assert_eq!(catalog.candidates[1].id, "g1");
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let json = r#"{"list": [
            {"id": 1, "ip": "1.1.1.1", "company": "Cloudflare"},
            {"id": 2, "company": "No Address"},
            {"id": 3, "ip": "not-an-ip", "company": "Broken"},
            {"id": 4, "ip": "2606:4700:4700::1111", "company": "Cloudflare v6"},
            {"id": 5, "ip": "9.9.9.9"},
            {"id": 6, "ip": 42, "company": "Numeric"},
            "garbage",
            {"ip": "208.67.222.222", "company": "OpenDNS"}
        ]}"#;
        let catalog = CatalogLoader::parse(json).unwrap();

        let addresses: Vec<_> = catalog.candidates.iter().map(|c| c.address).collect();
        assert_eq!(
            addresses,
            vec![Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(208, 67, 222, 222)]
        );
        // missing id falls back to the 1-based position
        assert_eq!(catalog.candidates[1].id, "8");
    }

    #[test]
    fn test_duplicates_kept() {
        let json = r#"{"list": [
            {"id": 1, "ip": "1.1.1.1", "company": "A"},
            {"id": 2, "ip": "1.1.1.1", "company": "B"}
        ]}"#;
        assert_eq!(CatalogLoader::parse(json).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_top_level() {
        assert!(CatalogLoader::parse("not json").is_err());
        assert!(CatalogLoader::parse(r#"{"servers": []}"#).is_err());
        assert!(CatalogLoader::parse(r#"{"list": {}}"#).is_err());
        assert!(matches!(
            CatalogLoader::parse(r#"{"list": []}"#),
            Err(Error::Catalog(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"list": [{{"id": 1, "ip": "9.9.9.9", "company": "Quad9"}}]}}"#
        )
        .unwrap();

        let catalog = CatalogLoader::load_from_file(file.path()).unwrap();
        assert_eq!(catalog.candidates[0].provider, "Quad9");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CatalogLoader::load_from_file(dir.path().join("dnsList.json")).unwrap_err();
        assert!(matches!(err, Error::Catalog(msg) if msg.ends_with("not found")));
    }

    #[test]
    fn test_load_invalid_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"list\": [").unwrap();
        assert!(matches!(
            CatalogLoader::load_from_file(file.path()),
            Err(Error::Catalog(_))
        ));
    }

    #[test]
    fn test_locate_explicit() {
        let path = PathBuf::from("/tmp/custom.json");
        assert_eq!(CatalogLoader::locate(Some(path.clone())).unwrap(), path);
    }

    #[test]
    fn test_from_args() {
        let args = vec![
            "8.8.8.8#Google".to_string(),
            "1.1.1.1 # Cloudflare".to_string(),
            "9.9.9.9".to_string(),
        ];
        let catalog = CatalogLoader::from_args(args).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.candidates[0].provider, "Google");
        assert_eq!(catalog.candidates[1].provider, "Cloudflare");
        assert_eq!(catalog.candidates[2].provider, "9.9.9.9");
        assert_eq!(catalog.candidates[2].id, "3");
    }

    #[test]
    fn test_from_args_invalid_ip() {
        assert!(CatalogLoader::from_args(vec!["invalid_ip#Test".to_string()]).is_err());
        assert!(CatalogLoader::from_args(vec!["::1#Loopback".to_string()]).is_err());
    }
}
