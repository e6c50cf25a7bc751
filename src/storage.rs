// src/storage.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::common::error::AppError;

/// Armazenamento de objetos para as fotos de conclusão.
///
/// `upload` grava o conteúdo sob um nome único e `public_url` devolve a URL
/// permanente pela qual o arquivo é servido.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<(), AppError>;

    async fn read(&self, name: &str) -> Result<Vec<u8>, AppError>;

    fn public_url(&self, name: &str) -> String;
}

// Nomes planos, sem separadores de diretório nem arquivos ocultos
pub fn validate_object_name(name: &str) -> Result<(), AppError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidObjectName(name.to_string()))
    }
}

pub fn content_type_for(name: &str) -> &'static str {
    match Path::new(name).extension().and_then(|ext| ext.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

// Implementação em disco local; as URLs apontam para a rota /files/{name}
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStorage {
    pub async fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ObjectStorage for LocalDiskStorage {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        validate_object_name(name)?;

        // Grava num temporário e renomeia, para nunca servir arquivo pela metade
        let target = self.root.join(name);
        let partial = self.root.join(format!("{name}.part"));
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, &target).await?;

        tracing::debug!("📦 Objeto gravado: {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, AppError> {
        validate_object_name(name)?;

        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::ObjectNotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/files/{}", self.public_base_url, name)
    }
}
