//! Signed HTTP transport for Query-protocol services.
//!
//! One request, one attempt: failures are returned to the caller as
//! [`AwsError`] without any retry or backoff.

use crate::config::{AwsCredentials, AwsRegion, ProviderConfig};
use crate::error::{AwsError, AwsResult};
use crate::signing::{self, SigV4Signer};
use chrono::Utc;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AwsClient {
    http: Client,
    signer: SigV4Signer,
    region: AwsRegion,
    endpoint_override: Option<String>,
    user_agent: String,
}

/// Raw response of a successful (2xx) call.
#[derive(Debug, Clone)]
pub struct AwsResponse {
    pub status: u16,
    pub body: String,
    pub request_id: Option<String>,
}

impl AwsClient {
    /// Build a client for `service` (the SigV4 signing name) in `region`.
    pub fn new(
        credentials: AwsCredentials,
        region: AwsRegion,
        service: &str,
        config: &ProviderConfig,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            signer: SigV4Signer::new(credentials, &region.name, service),
            region,
            endpoint_override: config.endpoint_url.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn endpoint(&self, service: &str) -> String {
        match self.endpoint_override {
            Some(ref url) => url.clone(),
            None => self.region.endpoint(service),
        }
    }

    pub fn region_name(&self) -> &str {
        &self.region.name
    }

    /// POST a form-encoded Query API request and return the XML body.
    ///
    /// Non-2xx responses are turned into [`AwsError`] from the error document.
    pub async fn query_request(
        &self,
        service: &str,
        params: &BTreeMap<String, String>,
    ) -> AwsResult<AwsResponse> {
        let action = params.get("Action").cloned().unwrap_or_default();
        self.signer
            .credentials()
            .validate()
            .map_err(|e| e.with_action(&action))?;
        let endpoint = self.endpoint(service);
        let body = signing::form_encode(params);

        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), host_header(&endpoint));
        headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded; charset=utf-8".to_string(),
        );
        let signed = self
            .signer
            .sign("POST", &endpoint, headers, body.as_bytes(), Utc::now());

        let mut req = self.http.post(&endpoint).header("user-agent", &self.user_agent);
        for (key, value) in &signed {
            // reqwest derives Host from the URL
            if key != "host" {
                req = req.header(key.as_str(), value.as_str());
            }
        }

        log::debug!("{} {} -> {}", service, action, endpoint);
        let resp = req
            .body(body)
            .send()
            .await
            .map_err(|e| AwsError::from(e).with_action(&action))?;

        let status = resp.status().as_u16();
        let header_request_id = resp
            .headers()
            .get("x-amzn-requestid")
            .or_else(|| resp.headers().get("x-amz-request-id"))
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let text = resp
            .text()
            .await
            .map_err(|e| AwsError::from(e).with_action(&action))?;

        if !(200..300).contains(&status) {
            let mut err = AwsError::parse_xml_error(service, status, &text).with_action(&action);
            if err.request_id.is_none() {
                err.request_id = header_request_id;
            }
            log::warn!("{} {} failed: {}", service, action, err);
            return Err(err);
        }

        let request_id = xml_text(&text, "RequestId").or(header_request_id);
        Ok(AwsResponse {
            status,
            body: text,
            request_id,
        })
    }
}

/// Host (with non-default port) of an endpoint URL, as it must be signed.
fn host_header(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(u) => match (u.host_str(), u.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            _ => "amazonaws.com".to_string(),
        },
        Err(_) => "amazonaws.com".to_string(),
    }
}

/// Query parameters every call carries.
pub fn build_query_params(action: &str, version: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("Action".to_string(), action.to_string());
    params.insert("Version".to_string(), version.to_string());
    params
}

/// Add a Query-protocol list (`<prefix>.member.1`, `.member.2`, ...).
pub fn add_member_list(params: &mut BTreeMap<String, String>, prefix: &str, values: &[String]) {
    for (i, value) in values.iter().enumerate() {
        params.insert(format!("{}.member.{}", prefix, i + 1), value.clone());
    }
}

/// Text of the first `<tag>...</tag>`, entity-decoded.
pub fn xml_text(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)?;
    Some(xml_unescape(&xml[start..start + end]))
}

fn xml_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_header_default_port() {
        assert_eq!(
            host_header("https://email.ap-south-1.amazonaws.com"),
            "email.ap-south-1.amazonaws.com"
        );
    }

    #[test]
    fn host_header_keeps_custom_port() {
        assert_eq!(host_header("http://localhost:4566"), "localhost:4566");
    }

    #[test]
    fn endpoint_override_wins() {
        let cfg = ProviderConfig {
            endpoint_url: Some("http://localhost:4566".to_string()),
            ..ProviderConfig::default()
        };
        let client = AwsClient::new(
            AwsCredentials::new("AKIA", "secret"),
            AwsRegion::new("ap-south-1"),
            "ses",
            &cfg,
        );
        assert_eq!(client.endpoint("ses"), "http://localhost:4566");
        assert_eq!(client.region_name(), "ap-south-1");
    }

    #[tokio::test]
    async fn empty_secret_fails_before_sending() {
        let client = AwsClient::new(
            AwsCredentials::new("AKIA", ""),
            AwsRegion::new("ap-south-1"),
            "ses",
            &ProviderConfig::default(),
        );
        let params = build_query_params("SendEmail", "2010-12-01");
        let err = client.query_request("ses", &params).await.unwrap_err();
        assert_eq!(err.code, "CredentialError");
        assert_eq!(err.action.as_deref(), Some("SendEmail"));
    }

    /// Serves one HTTP exchange on a loopback port and hands back the raw
    /// request it received.
    async fn one_shot_server(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .to_ascii_lowercase()
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:").map(|v| v.trim().to_string()))
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nx-amzn-RequestId: hdr-1\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    fn loopback_client(endpoint: String) -> AwsClient {
        let cfg = ProviderConfig {
            endpoint_url: Some(endpoint),
            ..ProviderConfig::default()
        };
        AwsClient::new(
            AwsCredentials::new("AKIAEXAMPLE", "secret"),
            AwsRegion::new("ap-south-1"),
            "ses",
            &cfg,
        )
    }

    #[tokio::test]
    async fn signed_post_reads_request_id_from_body() {
        let (endpoint, server) = one_shot_server(
            "200 OK",
            "<SendEmailResponse><SendEmailResult><MessageId>m-1</MessageId></SendEmailResult>\
             <ResponseMetadata><RequestId>body-1</RequestId></ResponseMetadata></SendEmailResponse>",
        )
        .await;
        let client = loopback_client(endpoint);
        let mut params = build_query_params("SendEmail", "2010-12-01");
        params.insert("Source".to_string(), "a@x.com".to_string());

        let resp = client.query_request("ses", &params).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.request_id.as_deref(), Some("body-1"));
        assert_eq!(xml_text(&resp.body, "MessageId").as_deref(), Some("m-1"));

        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST / HTTP/1.1\r\n"));
        assert!(lower.contains("authorization: aws4-hmac-sha256 credential=akiaexample/"));
        assert!(lower.contains("/ap-south-1/ses/aws4_request"));
        assert!(lower.contains("x-amz-date: "));
        assert!(lower.contains("content-type: application/x-www-form-urlencoded"));
        assert!(request.contains("Action=SendEmail"));
        assert!(request.contains("Source=a%40x.com"));
    }

    #[tokio::test]
    async fn error_document_becomes_aws_error() {
        let (endpoint, server) = one_shot_server(
            "400 Bad Request",
            "<ErrorResponse><Error><Type>Sender</Type><Code>MessageRejected</Code>\
             <Message>Email address is not verified.</Message></Error>\
             <RequestId>body-err</RequestId></ErrorResponse>",
        )
        .await;
        let client = loopback_client(endpoint);
        let params = build_query_params("SendEmail", "2010-12-01");

        let err = client.query_request("ses", &params).await.unwrap_err();
        assert_eq!(err.code, "MessageRejected");
        assert_eq!(err.message, "Email address is not verified.");
        assert_eq!(err.status_code, 400);
        assert_eq!(err.request_id.as_deref(), Some("body-err"));
        assert_eq!(err.action.as_deref(), Some("SendEmail"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn non_xml_error_falls_back_to_header_request_id() {
        let (endpoint, server) = one_shot_server("503 Service Unavailable", "upstream down").await;
        let client = loopback_client(endpoint);
        let params = build_query_params("SendRawEmail", "2010-12-01");

        let err = client.query_request("ses", &params).await.unwrap_err();
        assert_eq!(err.code, "UnknownError");
        assert_eq!(err.status_code, 503);
        assert_eq!(err.request_id.as_deref(), Some("hdr-1"));
        assert_eq!(err.action.as_deref(), Some("SendRawEmail"));
        server.await.unwrap();
    }

    #[test]
    fn build_query_params_basic() {
        let params = build_query_params("SendEmail", "2010-12-01");
        assert_eq!(params["Action"], "SendEmail");
        assert_eq!(params["Version"], "2010-12-01");
    }

    #[test]
    fn member_list_is_one_based() {
        let mut params = BTreeMap::new();
        add_member_list(
            &mut params,
            "Destination.ToAddresses",
            &["b@x.com".to_string(), "c@x.com".to_string()],
        );
        assert_eq!(params["Destination.ToAddresses.member.1"], "b@x.com");
        assert_eq!(params["Destination.ToAddresses.member.2"], "c@x.com");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn xml_text_extracts_and_unescapes() {
        let xml = "<Error><Message>Illegal address &lt;a@&gt; &amp; more</Message></Error>";
        assert_eq!(
            xml_text(xml, "Message").as_deref(),
            Some("Illegal address <a@> & more")
        );
        assert_eq!(xml_text(xml, "Code"), None);
    }
}
