//! Team avatar storage
//!
//! Avatars are kept as plain files in a single directory and served back under a public URL prefix. Stored names have
//! the form `{unix_millis}-{random}.{ext}`, and every name coming in from a request is checked against that form
//! before the file system is touched.
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::Utc;
use log::*;
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{config::AvatarConfig, errors::ServerError};

static AVATAR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10,16}-[a-z0-9]{6,12}\.(png|jpg|gif|webp)$").expect("Invalid avatar regex"));

// Raster formats only. SVG uploads are refused.
const EXTENSIONS: [(&str, &str); 5] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAvatar {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct FileAvatarStore {
    root: PathBuf,
    public_url: String,
    max_bytes: usize,
}

impl FileAvatarStore {
    pub fn new(config: &AvatarConfig) -> Self {
        Self {
            root: config.path.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
            max_bytes: config.max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Creates the storage directory if it is missing.
    pub async fn prepare(&self) -> Result<(), ServerError> {
        tokio::fs::create_dir_all(&self.root).await?;
        debug!("🖼️ Avatar directory {} is ready", self.root.display());
        Ok(())
    }

    pub fn public_url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.public_url)
    }

    /// Stores an uploaded image and returns its name and public URL.
    pub async fn save(&self, content_type: &str, data: &[u8]) -> Result<StoredAvatar, ServerError> {
        let ext = extension_for(content_type)?;
        if data.is_empty() {
            return Err(ServerError::ValidationError("The uploaded image is empty".to_string()));
        }
        if data.len() > self.max_bytes {
            return Err(ServerError::PayloadTooLarge(self.max_bytes));
        }
        self.prepare().await?;
        let name = new_avatar_name(ext);
        tokio::fs::write(self.path_for(&name)?, data).await?;
        info!("🖼️ Stored avatar {name} ({} bytes)", data.len());
        let url = self.public_url_for(&name);
        Ok(StoredAvatar { name, url })
    }

    /// Reads a stored image. Returns `None` if there is no such avatar.
    pub async fn read(&self, name: &str) -> Result<Option<(Vec<u8>, &'static str)>, ServerError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some((data, content_type_for(name)))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes a stored image. Returns false if it did not exist.
    pub async fn delete(&self, name: &str) -> Result<bool, ServerError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("🖼️ Deleted avatar {name}");
                Ok(true)
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the image behind `url`, if `url` points into this store. Avatars hosted elsewhere are left alone.
    pub async fn delete_by_url(&self, url: &str) -> Result<bool, ServerError> {
        match self.name_from_url(url) {
            Some(name) => self.delete(name).await,
            None => {
                trace!("🖼️ {url} is not a stored avatar. Nothing to delete.");
                Ok(false)
            },
        }
    }

    pub fn name_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let name = url.strip_prefix(self.public_url.as_str())?.strip_prefix('/')?;
        is_valid_avatar_name(name).then_some(name)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ServerError> {
        if !is_valid_avatar_name(name) {
            debug!("🖼️ Rejected avatar name {name}");
            return Err(ServerError::InvalidRequestPath(format!("{name} is not a valid avatar name")));
        }
        Ok(Path::new(&self.root).join(name))
    }
}

pub fn is_valid_avatar_name(name: &str) -> bool {
    AVATAR_NAME.is_match(name)
}

fn extension_for(content_type: &str) -> Result<&'static str, ServerError> {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(ServerError::UnsupportedMediaType("Only images can be uploaded".to_string()));
    }
    EXTENSIONS
        .iter()
        .find(|(t, _)| *t == mime)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| ServerError::UnsupportedMediaType(format!("{mime} images are not supported")))
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn new_avatar_name(ext: &str) -> String {
    let suffix = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect::<String>();
    format!("{}-{suffix}.{ext}", Utc::now().timestamp_millis())
}
