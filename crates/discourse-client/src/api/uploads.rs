//! Uploads API.

use std::path::Path;

use reqwest::Method;

use crate::client::DiscourseClient;
use crate::error::Result;
use crate::form::MultipartForm;
use crate::request::{Payload, RequestOptions};
use crate::types::{Upload, UploadType};

/// Options for creating an upload.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub upload_type: UploadType,
    /// Required for avatar and profile uploads.
    pub user_id: Option<u64>,
    pub synchronous: bool,
    /// Filename reported to the server. Defaults to the file name of the
    /// path for path uploads.
    pub filename: Option<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            upload_type: UploadType::Composer,
            user_id: None,
            synchronous: true,
            filename: None,
        }
    }
}

impl UploadOptions {
    fn into_form(self, bytes: Vec<u8>) -> MultipartForm {
        let mut form = MultipartForm::new()
            .file("file", bytes, self.filename)
            .text("type", self.upload_type.as_str());
        if let Some(user_id) = self.user_id {
            form = form.text("user_id", user_id.to_string());
        }
        form.text("synchronous", self.synchronous.to_string())
    }
}

/// Uploads API client.
pub struct UploadsApi {
    client: DiscourseClient,
}

impl UploadsApi {
    pub(crate) fn new(client: DiscourseClient) -> Self {
        Self { client }
    }

    /// Upload in-memory file contents.
    pub async fn create(&self, bytes: impl Into<Vec<u8>>, options: UploadOptions) -> Result<Upload> {
        self.send(options.into_form(bytes.into())).await
    }

    /// Upload a file from disk.
    pub async fn create_from_path(
        &self,
        path: impl AsRef<Path>,
        mut options: UploadOptions,
    ) -> Result<Upload> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        if options.filename.is_none() {
            options.filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
        self.send(options.into_form(bytes)).await
    }

    /// Send a prepared multipart form.
    pub async fn create_with_form(&self, form: MultipartForm) -> Result<Upload> {
        self.send(form).await
    }

    async fn send(&self, form: MultipartForm) -> Result<Upload> {
        self.client
            .request(
                "/uploads",
                Method::POST,
                Some(Payload::Form(form)),
                RequestOptions::default(),
            )
            .await
    }
}
