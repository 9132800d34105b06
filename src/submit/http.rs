use crate::submit::{Delivery, Transport, TransportError};
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// reqwest-backed transport. The body of the response is never read.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &Url, body: &Value) -> Result<Delivery, TransportError> {
        let timeout = self.timeout;
        let url = url.clone();
        let body = body.clone();

        std::thread::spawn(move || post_json_blocking(timeout, url, &body))
            .join()
            .map_err(|_| TransportError("submission worker thread panicked".to_string()))?
    }
}

fn post_json_blocking(
    timeout: Option<Duration>,
    url: Url,
    body: &Value,
) -> Result<Delivery, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut builder = Client::builder().default_headers(headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    let client = builder
        .build()
        .map_err(|error| TransportError(format!("Failed to create HTTP client: {error}")))?;

    let response = client
        .post(url)
        .json(body)
        .send()
        .map_err(|error| TransportError(format!("Webhook request failed: {error}")))?;

    Ok(Delivery {
        status: Some(response.status().as_u16()),
    })
}

#[cfg(test)]
mod tests {
    use super::HttpTransport;
    use crate::submit::tests::identified_report;
    use crate::submit::{Delivery, SubmitError, Submitter, Transport, build_payload};
    use serde_json::Value;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use url::Url;

    /// Accepts one connection, answers with `response` and hands back the raw
    /// request text.
    fn answer_once(response: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let addr = listener.local_addr().expect("local addr");
        let url = Url::parse(&format!("http://{addr}/exec")).expect("valid url");

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept request");
            let mut request = Vec::new();
            let mut chunk = [0_u8; 1024];

            loop {
                let read = stream.read(&mut chunk).expect("read request");
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..read]);

                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            stream
                .write_all(response.as_bytes())
                .expect("write response");
            String::from_utf8_lossy(&request).to_string()
        });

        (url, handle)
    }

    #[test]
    fn posts_json_and_reports_status() {
        let (url, server) = answer_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        );
        let body = build_payload(&identified_report(), "3/9/2026, 8:05:00 AM");

        let delivery = HttpTransport::new(Some(Duration::from_secs(5)))
            .post_json(&url, &body)
            .expect("request dispatched");
        let request = server.join().expect("server thread");

        assert_eq!(delivery, Delivery { status: Some(500) });
        assert!(request.starts_with("POST /exec HTTP/1.1\r\n"), "{request}");
        assert!(
            request
                .lines()
                .any(|line| line.eq_ignore_ascii_case("content-type: application/json")),
            "{request}"
        );

        let (_, raw_body) = request.split_once("\r\n\r\n").expect("request body");
        let sent: Value = serde_json::from_str(raw_body).expect("json body");
        assert_eq!(sent["teacherName"], "Ms. Achieng");
        assert_eq!(sent["classGrade"], "7A");
        assert_eq!(sent["hasAccident"], "No");
        assert_eq!(sent["timestamp"], "3/9/2026, 8:05:00 AM");
    }

    #[test]
    fn closed_port_is_a_network_error() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .expect("free local port");
        let url = format!("http://{addr}/exec");
        let transport = HttpTransport::new(Some(Duration::from_secs(5)));

        let parsed = Url::parse(&url).expect("valid url");
        assert!(transport.post_json(&parsed, &Value::Null).is_err());

        let submitter = Submitter::new(Some(url), transport);
        assert!(matches!(
            submitter.submit(&identified_report()),
            Err(SubmitError::Network(_))
        ));
    }
}
