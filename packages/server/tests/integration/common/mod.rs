use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use common::config::StorageConfig;
use common::storage::{FILES_FOLDER, IMAGES_FOLDER, filesystem::FilesystemMediaStore};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use server::config::{AppConfig, CorsConfig, DatabaseConfig, JanitorConfig, ServerConfig};
use server::state::AppState;
use server::views::ViewCache;

pub mod routes {
    pub const ADMIN_PRODUCTS: &str = "/api/v1/admin/products";
    pub const PENDING_ASSETS: &str = "/api/v1/admin/assets/pending";
    pub const SWEEP_ASSETS: &str = "/api/v1/admin/assets/sweep";
    pub const STOREFRONT_HOME: &str = "/api/v1/storefront";
    pub const STOREFRONT_PRODUCTS: &str = "/api/v1/storefront/products";

    pub fn product(id: &str) -> String {
        format!("/api/v1/admin/products/{id}")
    }

    pub fn availability(id: &str) -> String {
        format!("/api/v1/admin/products/{id}/availability")
    }

    pub fn download(id: &str) -> String {
        format!("/api/v1/admin/products/{id}/download")
    }
}

/// A running test server backed by a SQLite file and a filesystem media store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub media_root: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// `Location` header, if any.
    pub location: Option<String>,
    pub headers: reqwest::header::HeaderMap,
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let location = headers
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = res.bytes().await.expect("Failed to read body").to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            location,
            headers,
            bytes,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// One part of a product form submission.
pub enum FormPart {
    Text(&'static str, String),
    File {
        field: &'static str,
        file_name: String,
        mime: &'static str,
        bytes: Vec<u8>,
    },
}

pub fn text(field: &'static str, value: impl Into<String>) -> FormPart {
    FormPart::Text(field, value.into())
}

pub fn file(field: &'static str, file_name: &str, mime: &'static str, bytes: &[u8]) -> FormPart {
    FormPart::File {
        field,
        file_name: file_name.to_string(),
        mime,
        bytes: bytes.to_vec(),
    }
}

/// A complete, valid create submission.
pub fn valid_product_form(name: &str) -> Vec<FormPart> {
    vec![
        text("name", name),
        text("description", "A practical guide"),
        text("price_in_cents", "2999"),
        file("file", "handbook.pdf", "application/pdf", b"%PDF-1.7 handbook"),
        file("image", "cover.png", "image/png", b"\x89PNG cover"),
    ]
}

/// Edit submission with text fields only.
pub fn edit_form(name: &str) -> Vec<FormPart> {
    vec![
        text("name", name),
        text("description", "Revised edition"),
        text("price_in_cents", "3999"),
    ]
}

fn build_form(parts: Vec<FormPart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| match part {
        FormPart::Text(field, value) => form.text(field, value),
        FormPart::File {
            field,
            file_name,
            mime,
            bytes,
        } => form.part(
            field,
            Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(mime)
                .expect("Failed to set MIME type"),
        ),
    })
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        let media_root = dir.path().join("media");
        let storage = StorageConfig {
            root: media_root.clone(),
            public_base_url: format!("http://{addr}/media"),
            ..Default::default()
        };
        let media = FilesystemMediaStore::new(
            storage.root.clone(),
            storage.public_base_url.clone(),
            storage.max_upload_size,
        )
        .await
        .expect("Failed to open media store");

        let database = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.path().join("shop.db").display()),
            max_connections: 1,
            min_connections: 1,
        };
        let db = server::database::init_db(&database)
            .await
            .expect("Failed to initialize database");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: addr.port(),
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database,
            storage,
            janitor: JanitorConfig {
                enabled: false,
                ..Default::default()
            },
        };

        let state = AppState {
            db: db.clone(),
            media: Arc::new(media),
            views: Arc::new(ViewCache::new()),
            config: app_config,
        };

        let app = server::build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            client,
            db,
            media_root,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// GET an absolute URL, such as a stored asset URL.
    pub async fn get_absolute(&self, url: &str) -> TestResponse {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, path: &str, parts: Vec<FormPart>) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(build_form(parts))
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn patch_form(&self, path: &str, parts: Vec<FormPart>) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .multipart(build_form(parts))
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Create a product through the form endpoint and return its JSON.
    pub async fn create_product(&self, name: &str) -> Value {
        let res = self
            .post_form(routes::ADMIN_PRODUCTS, valid_product_form(name))
            .await;
        assert_eq!(res.status, 303, "create failed: {:?}", res.body);

        let list = self.get(routes::ADMIN_PRODUCTS).await;
        list.body["data"]
            .as_array()
            .expect("product list")
            .iter()
            .find(|p| p["name"] == name)
            .cloned()
            .expect("created product is listed")
    }

    /// Number of files stored under a media folder.
    pub fn stored_files(&self, folder: &str) -> usize {
        std::fs::read_dir(self.media_root.join(folder))
            .map(|entries| entries.filter_map(Result::ok).count())
            .unwrap_or(0)
    }

    pub fn stored_product_files(&self) -> usize {
        self.stored_files(FILES_FOLDER)
    }

    pub fn stored_product_images(&self) -> usize {
        self.stored_files(IMAGES_FOLDER)
    }
}
