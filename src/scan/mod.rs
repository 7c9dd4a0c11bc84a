// Bill scan workflow
// Coordinates file selection, preview, submission to the extraction
// service, and the post-success collection refresh.

pub mod preview;

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::WarrantyService;
use crate::collection::CollectionStore;
use crate::error::WalletError;
use crate::models::WarrantyRecord;

/// How long the success state stays visible before the session is
/// dismissed and the collection refreshed.
pub const SUCCESS_DISMISS_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    FileSelected,
    Previewing,
    Submitting,
    Succeeded,
    Failed,
}

/// File captured from browse or drag-and-drop. Both triggers land in
/// [`ScanWorkflow::select_file`] and get identical validation.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

struct ScanSession {
    id: String,
    file: SelectedFile,
    preview: Option<String>,
}

struct Inner {
    state: ScanState,
    session: Option<ScanSession>,
    error: Option<String>,
    result: Option<WarrantyRecord>,
}

/// Single-session upload state machine:
/// `Idle -> FileSelected -> Previewing -> Submitting -> Succeeded | Failed`.
///
/// `close` is the one forced transition and is safe from every state; a
/// generation counter keeps work that was in flight when the session
/// closed from touching the next one.
pub struct ScanWorkflow<S: WarrantyService> {
    service: Arc<S>,
    store: Arc<CollectionStore<S>>,
    inner: Mutex<Inner>,
    generation: AtomicU64,
}

impl<S: WarrantyService> ScanWorkflow<S> {
    pub fn new(service: Arc<S>, store: Arc<CollectionStore<S>>) -> Self {
        Self {
            service,
            store,
            inner: Mutex::new(Inner {
                state: ScanState::Idle,
                session: None,
                error: None,
                result: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ScanState {
        self.inner.lock().state
    }

    /// Display message for the most recent local or remote failure.
    pub fn error_message(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    pub fn preview(&self) -> Option<String> {
        self.inner
            .lock()
            .session
            .as_ref()
            .and_then(|s| s.preview.clone())
    }

    /// The extraction result, available while the success state shows.
    pub fn extracted_record(&self) -> Option<WarrantyRecord> {
        self.inner.lock().result.clone()
    }

    /// Accept a file from the picker or a drop event.
    ///
    /// Non-image selections are rejected locally and leave the current
    /// state untouched. A valid image replaces any earlier selection and
    /// lands in `Previewing` with a data-URL preview.
    pub fn select_file(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<(), WalletError> {
        let mut inner = self.inner.lock();

        if matches!(inner.state, ScanState::Submitting | ScanState::Succeeded) {
            return Err(WalletError::Validation(
                "A scan is already in progress".to_string(),
            ));
        }

        let resolved = content_type
            .map(str::to_string)
            .or_else(|| preview::content_type_for_name(file_name).map(String::from));

        let content_type = match resolved {
            Some(ct) if preview::is_image_content_type(&ct) => ct,
            _ => {
                let message = "Please select an image file".to_string();
                inner.error = Some(message.clone());
                return Err(WalletError::Validation(message));
            }
        };

        let session_id = uuid::Uuid::new_v4().to_string();
        debug!("Scan session {} selected {}", session_id, file_name);

        let preview = preview::build_preview(&content_type, &bytes);
        let mut session = ScanSession {
            id: session_id,
            file: SelectedFile {
                name: file_name.to_string(),
                content_type,
                bytes,
            },
            preview: None,
        };

        inner.error = None;
        inner.result = None;
        match preview {
            Ok(data_url) => {
                session.preview = Some(data_url);
                inner.session = Some(session);
                inner.state = ScanState::Previewing;
                Ok(())
            }
            Err(e) => {
                // Local decode failure: keep the selection, surface the
                // message, wait for the user to pick another file.
                inner.error = Some(e.scan_display_message());
                inner.session = Some(session);
                inner.state = ScanState::FileSelected;
                Err(e)
            }
        }
    }

    /// Send the selected bill to the extraction service.
    ///
    /// Only valid from `Previewing` (or `Failed`, which retries with the
    /// retained file); a second call while one is in flight is rejected.
    /// On success the state shows `Succeeded` for
    /// [`SUCCESS_DISMISS_DELAY`], then the collection is refreshed, the
    /// session destroyed, and the extracted record returned.
    pub async fn submit(&self) -> Result<WarrantyRecord, WalletError> {
        let (file, session_id, generation) = {
            let mut inner = self.inner.lock();
            match inner.state {
                ScanState::Previewing | ScanState::Failed => {}
                ScanState::Submitting => {
                    return Err(WalletError::Validation(
                        "A scan is already in progress".to_string(),
                    ))
                }
                _ => {
                    return Err(WalletError::Validation(
                        "Please select a file".to_string(),
                    ))
                }
            }

            let (file, id) = match inner.session.as_ref() {
                Some(session) => (session.file.clone(), session.id.clone()),
                None => {
                    return Err(WalletError::Validation(
                        "Please select a file".to_string(),
                    ))
                }
            };

            inner.state = ScanState::Submitting;
            inner.error = None;
            (file, id, self.generation.load(Ordering::SeqCst))
        };

        info!("Scan session {} submitting {}", session_id, file.name);
        let outcome = self
            .service
            .scan_bill(file.name, file.content_type, file.bytes)
            .await;

        {
            let mut inner = self.inner.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("Scan session {} closed during submission", session_id);
                return Err(WalletError::Validation("Scan cancelled".to_string()));
            }

            match &outcome {
                Ok(record) => {
                    inner.state = ScanState::Succeeded;
                    inner.result = Some(record.clone());
                }
                Err(e) => {
                    // Keep file and preview so the user can retry.
                    let message = e.scan_display_message();
                    warn!("Scan session {} failed: {}", session_id, message);
                    inner.state = ScanState::Failed;
                    inner.error = Some(message);
                }
            }
        }

        let record = outcome?;

        // Let the success state show before dismissing the session.
        tokio::time::sleep(SUCCESS_DISMISS_DELAY).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Scan session {} closed during success delay", session_id);
            return Ok(record);
        }

        // A failed refresh is logged by the store; the record exists
        // server-side and will appear on the next successful refresh.
        let _ = self.store.refresh().await;

        let mut inner = self.inner.lock();
        if self.generation.load(Ordering::SeqCst) == generation {
            inner.state = ScanState::Idle;
            inner.session = None;
            inner.result = None;
        }

        Ok(record)
    }

    /// Tear down the session. Safe from every state: clears the file,
    /// preview buffer, error, and result, and invalidates any work still
    /// in flight.
    pub fn close(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock();
        if let Some(session) = inner.session.take() {
            debug!("Scan session {} closed", session.id);
        }
        inner.state = ScanState::Idle;
        inner.error = None;
        inner.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex as PlMutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Copy)]
    enum ScanBehavior {
        Succeed,
        FailWith(&'static str),
        Hang,
    }

    struct FakeService {
        behavior: PlMutex<ScanBehavior>,
        fetch_count: AtomicUsize,
    }

    impl FakeService {
        fn new(behavior: ScanBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior: PlMutex::new(behavior),
                fetch_count: AtomicUsize::new(0),
            })
        }

        fn extracted() -> WarrantyRecord {
            WarrantyRecord {
                id: "scanned-1".to_string(),
                product_name: Some("Washing Machine".to_string()),
                merchant_name: Some("Acme Appliances".to_string()),
                serial_number: None,
                model_number: None,
                invoice_number: None,
                payment_method: None,
                invoice_date: Some(Utc::now()),
                expiry_date: Some(Utc::now() + chrono::Duration::days(365)),
                asset_price: Some(499.0),
            }
        }
    }

    #[async_trait]
    impl WarrantyService for FakeService {
        async fn fetch_all(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Self::extracted()])
        }

        async fn fetch_active(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
            self.fetch_all().await
        }

        async fn fetch_expired(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
            self.fetch_all().await
        }

        async fn scan_bill(
            &self,
            _file_name: String,
            _content_type: String,
            _bytes: Vec<u8>,
        ) -> Result<WarrantyRecord, WalletError> {
            let behavior = *self.behavior.lock();
            match behavior {
                ScanBehavior::Succeed => Ok(Self::extracted()),
                ScanBehavior::FailWith(message) => {
                    Err(WalletError::Service(message.to_string()))
                }
                ScanBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(WalletError::Validation("unreachable".to_string()))
                }
            }
        }

        async fn delete(&self, _id: &str) -> Result<(), WalletError> {
            Ok(())
        }
    }

    fn workflow(service: Arc<FakeService>) -> ScanWorkflow<FakeService> {
        let store = Arc::new(CollectionStore::new(service.clone()));
        ScanWorkflow::new(service, store)
    }

    #[test]
    fn non_image_selection_is_rejected_in_place() {
        let wf = workflow(FakeService::new(ScanBehavior::Succeed));

        let result = wf.select_file("report.pdf", Some("application/pdf"), vec![1, 2, 3]);
        assert!(matches!(result, Err(WalletError::Validation(_))));
        assert_eq!(wf.state(), ScanState::Idle);
        assert_eq!(
            wf.error_message().as_deref(),
            Some("Please select an image file")
        );
    }

    #[test]
    fn valid_image_lands_in_previewing() {
        let wf = workflow(FakeService::new(ScanBehavior::Succeed));

        wf.select_file("bill.png", Some("image/png"), vec![137, 80, 78, 71])
            .unwrap();
        assert_eq!(wf.state(), ScanState::Previewing);
        let preview = wf.preview().expect("preview present");
        assert!(preview.starts_with("data:image/png;base64,"));
        assert!(wf.error_message().is_none());
    }

    #[test]
    fn dropped_file_without_content_type_uses_the_extension() {
        let wf = workflow(FakeService::new(ScanBehavior::Succeed));

        wf.select_file("bill.jpeg", None, vec![0xFF, 0xD8]).unwrap();
        assert_eq!(wf.state(), ScanState::Previewing);
        assert!(wf
            .preview()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn empty_payload_is_a_local_preview_failure() {
        let wf = workflow(FakeService::new(ScanBehavior::Succeed));

        let result = wf.select_file("bill.png", Some("image/png"), vec![]);
        assert!(result.is_err());
        assert_eq!(wf.state(), ScanState::FileSelected);
        assert!(wf.preview().is_none());
        assert!(wf.error_message().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn successful_submit_refreshes_and_resets() {
        let service = FakeService::new(ScanBehavior::Succeed);
        let wf = workflow(service.clone());

        wf.select_file("bill.png", Some("image/png"), vec![1, 2, 3])
            .unwrap();
        let record = wf.submit().await.unwrap();

        assert_eq!(record.id, "scanned-1");
        assert_eq!(service.fetch_count.load(Ordering::SeqCst), 1);
        assert_eq!(wf.state(), ScanState::Idle);
        assert!(wf.preview().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submit_keeps_the_preview_for_retry() {
        let service = FakeService::new(ScanBehavior::FailWith("unreadable image"));
        let wf = workflow(service.clone());

        wf.select_file("bill.png", Some("image/png"), vec![1, 2, 3])
            .unwrap();
        let error = wf.submit().await.unwrap_err();

        assert_eq!(error.scan_display_message(), "unreadable image");
        assert_eq!(wf.state(), ScanState::Failed);
        assert_eq!(wf.error_message().as_deref(), Some("unreadable image"));
        assert!(wf.preview().is_some(), "preview retained for retry");
        assert_eq!(service.fetch_count.load(Ordering::SeqCst), 0);

        // Retry with the same file once the service recovers.
        *service.behavior.lock() = ScanBehavior::Succeed;
        let record = wf.submit().await.unwrap();
        assert_eq!(record.id, "scanned-1");
        assert_eq!(wf.state(), ScanState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_without_server_text_uses_the_generic_message() {
        struct UnauthorizedService;
        #[async_trait]
        impl WarrantyService for UnauthorizedService {
            async fn fetch_all(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
                Ok(Vec::new())
            }
            async fn fetch_active(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
                Ok(Vec::new())
            }
            async fn fetch_expired(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
                Ok(Vec::new())
            }
            async fn scan_bill(
                &self,
                _file_name: String,
                _content_type: String,
                _bytes: Vec<u8>,
            ) -> Result<WarrantyRecord, WalletError> {
                Err(WalletError::Unauthorized)
            }
            async fn delete(&self, _id: &str) -> Result<(), WalletError> {
                Ok(())
            }
        }

        let service = Arc::new(UnauthorizedService);
        let store = Arc::new(CollectionStore::new(service.clone()));
        let wf = ScanWorkflow::new(service, store);

        wf.select_file("bill.png", Some("image/png"), vec![1])
            .unwrap();
        wf.submit().await.unwrap_err();
        assert_eq!(
            wf.error_message().as_deref(),
            Some("Failed to scan bill. Please try again.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reentrant_submit_is_rejected() {
        let service = FakeService::new(ScanBehavior::Hang);
        let wf = Arc::new(workflow(service));

        wf.select_file("bill.png", Some("image/png"), vec![1])
            .unwrap();

        let first = {
            let wf = wf.clone();
            tokio::spawn(async move { wf.submit().await })
        };
        // Let the first submission reach the service call.
        tokio::task::yield_now().await;
        assert_eq!(wf.state(), ScanState::Submitting);

        let second = wf.submit().await;
        assert!(matches!(second, Err(WalletError::Validation(_))));

        first.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn close_during_success_delay_cancels_the_refresh() {
        let service = FakeService::new(ScanBehavior::Succeed);
        let wf = Arc::new(workflow(service.clone()));

        wf.select_file("bill.png", Some("image/png"), vec![1])
            .unwrap();

        let submit = {
            let wf = wf.clone();
            tokio::spawn(async move { wf.submit().await })
        };
        // Reach the post-success delay, then close before it elapses.
        tokio::task::yield_now().await;
        wf.close();
        assert_eq!(wf.state(), ScanState::Idle);

        let outcome = submit.await.unwrap();
        assert!(outcome.is_ok(), "the record itself was still created");
        assert_eq!(
            service.fetch_count.load(Ordering::SeqCst),
            0,
            "late callback must not act on the torn-down session"
        );
        assert_eq!(wf.state(), ScanState::Idle);
    }

    #[test]
    fn close_is_safe_from_every_state() {
        let wf = workflow(FakeService::new(ScanBehavior::Succeed));

        wf.close();
        assert_eq!(wf.state(), ScanState::Idle);

        wf.select_file("bill.png", Some("image/png"), vec![1])
            .unwrap();
        wf.close();
        assert_eq!(wf.state(), ScanState::Idle);
        assert!(wf.preview().is_none());
        assert!(wf.error_message().is_none());
    }
}
