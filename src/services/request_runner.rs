//! Background request runner
//!
//! Each backend call runs on its own worker thread and reports back through a
//! channel that the UI drains on every tick. Requests are never cancelled.

use crate::error::ApiError;
use crate::services::api::{
    ApiResponse, ConnectionInfo, GenerateRequest, GeneratorApi, TablesRequest,
};
use crate::services::content_disposition::filename_from_disposition;
use crate::services::download::{save_download, SavedDownload};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Result of a finished request
#[derive(Debug)]
pub enum ApiEvent {
    Databases(Result<ApiResponse<Vec<String>>, ApiError>),
    Tables {
        /// Token handed out when the request was issued
        generation: u64,
        database: String,
        result: Result<ApiResponse<Vec<String>>, ApiError>,
    },
    Downloaded(Result<SavedDownload, ApiError>),
    Generated(Result<ApiResponse<Value>, ApiError>),
}

pub struct RequestRunner {
    api: Arc<dyn GeneratorApi>,
    download_dir: PathBuf,
    sender: Sender<ApiEvent>,
    receiver: Receiver<ApiEvent>,
}

impl RequestRunner {
    pub fn new(api: Arc<dyn GeneratorApi>, download_dir: PathBuf) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            api,
            download_dir,
            sender,
            receiver,
        }
    }

    pub fn list_databases(&self, connection: ConnectionInfo) {
        log::info!(
            "Listing databases at {} as {}",
            connection.db_url,
            connection.db_username
        );
        self.spawn(move |api| ApiEvent::Databases(api.list_databases(&connection)));
    }

    pub fn list_tables(&self, generation: u64, request: TablesRequest) {
        log::info!(
            "Listing tables of {} (request #{})",
            request.database_name,
            generation
        );
        self.spawn(move |api| ApiEvent::Tables {
            generation,
            database: request.database_name.clone(),
            result: api.list_tables(&request),
        });
    }

    pub fn generate_download(&self, request: GenerateRequest) {
        log::info!(
            "Generating {}.{} as {} for download",
            request.database_name,
            request.table_name,
            request.package_name
        );
        let dir = self.download_dir.clone();
        self.spawn(move |api| {
            let result = api.generate_download(&request).and_then(|payload| {
                let filename = filename_from_disposition(payload.content_disposition.as_deref());
                save_download(&dir, &filename, &payload.bytes).map_err(ApiError::from)
            });
            ApiEvent::Downloaded(result)
        });
    }

    pub fn generate(&self, request: GenerateRequest) {
        log::info!(
            "Generating {}.{} as {} on the server",
            request.database_name,
            request.table_name,
            request.package_name
        );
        self.spawn(move |api| ApiEvent::Generated(api.generate(&request)));
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&dyn GeneratorApi) -> ApiEvent + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let event = job(api.as_ref());
            // The receiver only disappears when the app is shutting down
            let _ = sender.send(event);
        });
    }

    /// Drain every finished request
    pub fn poll(&self) -> Vec<ApiEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::DownloadPayload;
    use std::time::{Duration, Instant};

    struct StaticApi;

    impl GeneratorApi for StaticApi {
        fn list_databases(
            &self,
            _connection: &ConnectionInfo,
        ) -> Result<ApiResponse<Vec<String>>, ApiError> {
            Ok(ApiResponse {
                success: true,
                message: None,
                data: Some(vec!["crm".to_string()]),
            })
        }

        fn list_tables(
            &self,
            request: &TablesRequest,
        ) -> Result<ApiResponse<Vec<String>>, ApiError> {
            Ok(ApiResponse {
                success: true,
                message: None,
                data: Some(vec![format!("{}_table", request.database_name)]),
            })
        }

        fn generate(&self, _request: &GenerateRequest) -> Result<ApiResponse<Value>, ApiError> {
            Err(ApiError::Decode("not json".to_string()))
        }

        fn generate_download(
            &self,
            _request: &GenerateRequest,
        ) -> Result<DownloadPayload, ApiError> {
            Ok(DownloadPayload {
                content_disposition: Some(r#"attachment; filename="crm.zip""#.to_string()),
                bytes: b"zip".to_vec(),
            })
        }
    }

    fn wait_for_events(runner: &RequestRunner, count: usize) -> Vec<ApiEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while events.len() < count && Instant::now() < deadline {
            events.extend(runner.poll());
            thread::sleep(Duration::from_millis(5));
        }
        events
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            connection: ConnectionInfo::default(),
            database_name: "crm".to_string(),
            table_name: "sys_user".to_string(),
            package_name: "com.example.sys.user".to_string(),
            output_dir: String::new(),
        }
    }

    #[test]
    fn test_poll_is_empty_when_idle() {
        let runner = RequestRunner::new(Arc::new(StaticApi), PathBuf::from("."));
        assert!(runner.poll().is_empty());
    }

    #[test]
    fn test_tables_event_carries_generation() {
        let runner = RequestRunner::new(Arc::new(StaticApi), PathBuf::from("."));
        runner.list_tables(
            7,
            TablesRequest {
                connection: ConnectionInfo::default(),
                database_name: "crm".to_string(),
            },
        );

        let events = wait_for_events(&runner, 1);
        match events.as_slice() {
            [ApiEvent::Tables {
                generation,
                database,
                result: Ok(response),
            }] => {
                assert_eq!(*generation, 7);
                assert_eq!(database, "crm");
                assert_eq!(response.data, Some(vec!["crm_table".to_string()]));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_download_is_saved_under_header_filename() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RequestRunner::new(Arc::new(StaticApi), dir.path().to_path_buf());
        runner.generate_download(request());

        let events = wait_for_events(&runner, 1);
        match events.as_slice() {
            [ApiEvent::Downloaded(Ok(saved))] => {
                assert_eq!(saved.filename, "crm.zip");
                assert_eq!(std::fs::read(&saved.path).unwrap(), b"zip");
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_requests_all_report() {
        let runner = RequestRunner::new(Arc::new(StaticApi), PathBuf::from("."));
        runner.list_databases(ConnectionInfo::default());
        runner.generate(request());

        let events = wait_for_events(&runner, 2);
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| matches!(e, ApiEvent::Databases(Ok(_)))));
        assert!(events
            .iter()
            .any(|e| matches!(e, ApiEvent::Generated(Err(ApiError::Decode(_))))));
    }
}
