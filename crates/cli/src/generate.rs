//! Precache manifest generation from a project tree.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use swcache_core::PrecacheManifest;
use walkdir::WalkDir;

pub const DEFAULT_MAX_SIZE: u64 = 1_000_000;

const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "build", "__pycache__"];
const EXCLUDED_EXTENSIONS: &[&str] = &["map", "psd", "zip", "exe", "dll", "pyc", "class", "so", "jar", "log"];

/// Files listed whenever they exist, even outside the scanned directories.
const EXTRA_FILES: &[&str] = &["index.html", "offline.html", "manifest.json", "web/index.html", "web/offline.html"];

/// Config key holding the embedded fallback list.
const PRECACHE_KEY: &str = "precache_urls";

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub root: PathBuf,
    /// Output path, relative to `root` unless absolute.
    pub out: PathBuf,
    pub max_size: u64,
    pub scan_paths: Vec<PathBuf>,
    /// Worker TOML config whose `precache_urls` is replaced with the
    /// generated list. Relative to `root` unless absolute.
    pub config: Option<PathBuf>,
}

/// What a generate run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub manifest: PathBuf,
    pub urls: usize,
    pub config: Option<PathBuf>,
    pub backup: Option<PathBuf>,
}

/// Scan the tree, write the manifest and, when asked, refresh the worker
/// config's embedded list.
pub fn run(options: &GenerateOptions) -> Result<GenerateReport> {
    let config = options.config.as_ref().map(|path| options.root.join(path));
    if let Some(config) = &config
        && !config.is_file()
    {
        bail!("worker config not found at {}", config.display());
    }

    tracing::info!(root = %options.root.display(), "scanning for precacheable files");

    let urls = gather_files(&options.root, &options.scan_paths, options.max_size);
    let count = urls.len();

    let manifest = options.root.join(&options.out);
    write_manifest(&manifest, urls.clone(), chrono::Utc::now().timestamp())?;
    tracing::info!(path = %manifest.display(), urls = count, "wrote precache manifest");

    let backup = match &config {
        Some(config) => {
            let stamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
            let backup = update_config(config, &urls, &stamp)?;
            tracing::info!(path = %config.display(), backup = %backup.display(), "updated embedded precache list");
            Some(backup)
        }
        None => None,
    };

    Ok(GenerateReport { manifest, urls: count, config, backup })
}

/// Replace `precache_urls` in the TOML config at `path`, keeping every other
/// key. The original file is first copied to `<path>.bak.<stamp>`; the backup
/// path is returned.
pub fn update_config(path: &Path, urls: &[String], stamp: &str) -> Result<PathBuf> {
    let original = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut table: toml::Table = original
        .parse()
        .with_context(|| format!("{} is not a valid TOML config", path.display()))?;

    let mut backup = path.as_os_str().to_owned();
    backup.push(format!(".bak.{stamp}"));
    let backup = PathBuf::from(backup);
    fs::copy(path, &backup).with_context(|| format!("backing up {}", path.display()))?;

    let list = urls.iter().cloned().map(toml::Value::String).collect();
    table.insert(PRECACHE_KEY.to_string(), toml::Value::Array(list));

    let updated = toml::to_string_pretty(&table)?;
    fs::write(path, updated).with_context(|| format!("writing {}", path.display()))?;

    Ok(backup)
}

/// Whether `path` (relative to `root`) should be left out of the manifest.
/// Unreadable files are excluded.
pub fn should_exclude(root: &Path, path: &Path, max_size: u64) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let in_excluded_dir = relative.components().any(|component| match component {
        Component::Normal(name) => name.to_str().is_some_and(|name| EXCLUDED_DIRS.contains(&name)),
        _ => false,
    });
    if in_excluded_dir {
        return true;
    }

    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    if extension.is_some_and(|e| EXCLUDED_EXTENSIONS.contains(&e.as_str())) {
        return true;
    }

    match fs::metadata(path) {
        Ok(metadata) => metadata.len() > max_size,
        Err(_) => true,
    }
}

/// Collect origin-relative URLs for every precacheable file. Always contains
/// `/`; sorted and deduplicated.
pub fn gather_files(root: &Path, scan_paths: &[PathBuf], max_size: u64) -> Vec<String> {
    let mut urls = BTreeSet::from(["/".to_string()]);

    for scan_path in scan_paths {
        let scan_dir = root.join(scan_path);
        if !scan_dir.exists() {
            tracing::debug!(path = %scan_dir.display(), "scan path missing, skipping");
            continue;
        }

        let walker = WalkDir::new(&scan_dir).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !entry.file_name().to_str().is_some_and(|name| EXCLUDED_DIRS.contains(&name))
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || should_exclude(root, entry.path(), max_size) {
                continue;
            }
            if let Some(url) = to_url(root, entry.path()) {
                urls.insert(url);
            }
        }
    }

    for extra in EXTRA_FILES {
        let path = root.join(extra);
        if path.is_file() && !should_exclude(root, &path, max_size) {
            urls.insert(format!("/{extra}"));
        }
    }

    urls.into_iter().collect()
}

fn to_url(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(format!("/{}", segments.join("/")))
}

/// Write `{"precache": [...], "generated_at": <epoch seconds>}` as pretty JSON.
pub fn write_manifest(out: &Path, urls: Vec<String>, generated_at: i64) -> Result<()> {
    let manifest = PrecacheManifest::stamped(urls, generated_at);
    let mut json = serde_json::to_string_pretty(&manifest)?;
    json.push('\n');

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(out, json).with_context(|| format!("writing {}", out.display()))
}
