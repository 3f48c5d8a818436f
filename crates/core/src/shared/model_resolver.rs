use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create model cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Resolve the frozen network asset by name.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled path (development / pre-packaged installs)
/// 3. Download from URL into the cache
///
/// Failure here is fatal to the recognition capability: callers propagate
/// it out of startup rather than retrying.
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("downloading network asset {name}");
    download(url, &cached_path)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Spotter").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Spotter").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url).map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    // Write to a temp file first, then rename, so a torn download never
    // masquerades as a valid cached model.
    let temp_path = dest.with_extension("part");
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |e: std::io::Error| ModelResolveError::Write { path, source: e }
    };

    let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
    file.write_all(&bytes).map_err(write_err(&temp_path))?;
    file.flush().map_err(write_err(&temp_path))?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(write_err(dest))?;
    Ok(())
}
