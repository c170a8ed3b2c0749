//! Recording transport shared by the request-shape tests.

use std::sync::Mutex;

use knack_core::{ApiError, HttpRequest, HttpResponse, Transport};

/// Captures every request and answers with a fixed JSON body.
pub struct RecordingTransport {
    body: String,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn replying(body: &str) -> Self {
        Self {
            body: body.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The only request sent so far; panics unless exactly one was sent.
    pub fn single(&self) -> HttpRequest {
        let requests = self.requests.lock().unwrap();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests[0].clone()
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: self.body.clone(),
        })
    }
}
