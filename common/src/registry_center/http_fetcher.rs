use std::time::Duration;

use reqwest::blocking::{Client, Request};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tracing::{debug, error, warn};

use crate::registry_center::typos::{FetchRequest, RegistryResponse};
use crate::registry_center::RegistryFetcher;
use crate::Error;

/// 单次请求的超时时间
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// 注册中心文档类型
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// 基于 HTTP 的注册中心客户端
///
/// 每次请求创建独立的客户端：不校验 TLS 证书（内部注册中心多为自签名证书），
/// 超时固定，不重试。
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn client(&self) -> Result<Client, Error> {
        Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                error!("创建HTTP客户端失败: {}", e);
                Error::FetchRequest(e.to_string())
            })
    }

    /// 构造请求
    ///
    /// Basic 认证先设置，Authorization 请求头后设置并覆盖，两者同时配置时后者生效。
    fn build_request(&self, client: &Client, request: &FetchRequest) -> Result<Request, Error> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            error!("请求初始化失败, method: {}, error: {}", request.method, e);
            Error::FetchRequest(format!("无效的HTTP方法 {}: {}", request.method, e))
        })?;

        let mut builder = client
            .request(method, request.url.as_str())
            .header(CONTENT_TYPE, CONTENT_TYPE_XML)
            .body(request.body.clone());

        if request.has_basic_auth() {
            builder = builder.basic_auth(&request.user, Some(&request.password));
        }

        let mut http_request = builder.build().map_err(|e| {
            error!("请求初始化失败, url: {}, data: {}, error: {}", request.url, request.body, e);
            Error::FetchRequest(e.to_string())
        })?;

        if !request.auth.is_empty() {
            let value = HeaderValue::from_str(&request.auth).map_err(|e| {
                error!("请求初始化失败, 无效的Authorization请求头: {}", e);
                Error::FetchRequest(format!("无效的Authorization请求头: {}", e))
            })?;
            http_request.headers_mut().insert(AUTHORIZATION, value);
        }

        Ok(http_request)
    }
}

impl RegistryFetcher for HttpFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<RegistryResponse, Error> {
        let client = self.client()?;
        let http_request = self.build_request(&client, request)?;

        debug!("请求注册中心: {} {}", request.method, request.url);

        let response = client.execute(http_request).map_err(|e| {
            error!("请求注册中心失败, url: {}, error: {}", request.url, e);
            Error::FetchTransport(e.to_string())
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        if !status.is_success() {
            warn!("注册中心返回非成功状态码: {}, url: {}", status, request.url);
        }

        let body = response.bytes().map_err(|e| {
            error!("读取注册中心响应失败, url: {}, error: {}", request.url, e);
            Error::FetchTransport(e.to_string())
        })?;

        Ok(RegistryResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Instant;

    use rustls::pki_types::PrivatePkcs8KeyDer;
    use rustls::{ServerConfig, ServerConnection, StreamOwned};

    const DOCUMENT: &str = "<applications><application><name>DEMO-APP</name></application></applications>";

    // 读取一个完整的请求头，返回请求行和头部（小写）
    fn read_request_head(stream: &mut TcpStream) -> Vec<String> {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut lines = Vec::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 {
                break;
            }
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            let lower = line.to_lowercase();
            if let Some(len) = lower.strip_prefix("content-length:") {
                content_length = len.trim().parse().unwrap_or(0);
            }
            lines.push(line);
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();
        lines
    }

    // 启动只处理一个请求的注册中心，返回地址和收到的请求头
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let head = read_request_head(&mut stream);
            tx.send(head).unwrap();
            let response = format!(
                "{}\r\nContent-Type: application/xml\r\nX-Registry: eureka\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        (format!("http://{}/eureka/apps", addr), rx)
    }

    fn header<'a>(head: &'a [String], name: &str) -> Vec<&'a str> {
        let prefix = format!("{}:", name.to_lowercase());
        head.iter()
            .filter(|line| line.to_lowercase().starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim())
            .collect()
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(HttpFetcher::new().timeout, Duration::from_secs(3));
        assert_eq!(HttpFetcher::default().timeout, REQUEST_TIMEOUT);
    }

    #[test]
    fn test_fetch_returns_body_and_headers() {
        let (url, rx) = serve_once("HTTP/1.1 200 OK", DOCUMENT);

        let response = HttpFetcher::new().fetch(&FetchRequest::get(url)).expect("请求失败");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, DOCUMENT.as_bytes());
        assert_eq!(response.headers.get("x-registry").unwrap(), "eureka");

        let head = rx.recv().unwrap();
        assert!(head[0].starts_with("GET /eureka/apps"));
        assert_eq!(header(&head, "content-type"), vec![CONTENT_TYPE_XML]);
        assert!(header(&head, "authorization").is_empty());
    }

    #[test]
    fn test_fetch_with_basic_auth() {
        let (url, rx) = serve_once("HTTP/1.1 200 OK", DOCUMENT);
        let request = FetchRequest {
            user: "admin".to_string(),
            password: "secret".to_string(),
            ..FetchRequest::get(url)
        };

        HttpFetcher::new().fetch(&request).expect("请求失败");

        let head = rx.recv().unwrap();
        // admin:secret
        assert_eq!(header(&head, "authorization"), vec!["Basic YWRtaW46c2VjcmV0"]);
    }

    #[test]
    fn test_basic_auth_requires_user_and_password() {
        let (url, rx) = serve_once("HTTP/1.1 200 OK", DOCUMENT);
        let request = FetchRequest {
            user: "admin".to_string(),
            ..FetchRequest::get(url)
        };

        HttpFetcher::new().fetch(&request).expect("请求失败");

        let head = rx.recv().unwrap();
        assert!(header(&head, "authorization").is_empty());
    }

    #[test]
    fn test_auth_header_overrides_basic_auth() {
        let (url, rx) = serve_once("HTTP/1.1 200 OK", DOCUMENT);
        let request = FetchRequest {
            user: "admin".to_string(),
            password: "secret".to_string(),
            auth: "Bearer abc".to_string(),
            ..FetchRequest::get(url)
        };

        HttpFetcher::new().fetch(&request).expect("请求失败");

        let head = rx.recv().unwrap();
        assert_eq!(header(&head, "authorization"), vec!["Bearer abc"]);
    }

    #[test]
    fn test_non_success_status_still_returns_body() {
        let (url, _rx) = serve_once("HTTP/1.1 503 Service Unavailable", "unavailable");

        let response = HttpFetcher::new().fetch(&FetchRequest::get(url)).expect("请求失败");
        assert_eq!(response.status.as_u16(), 503);
        assert_eq!(response.body, b"unavailable");
    }

    #[test]
    fn test_invalid_method_is_request_error() {
        let request = FetchRequest {
            method: "GE T".to_string(),
            ..FetchRequest::get("http://127.0.0.1:1/eureka/apps")
        };
        let result = HttpFetcher::new().fetch(&request);
        assert!(matches!(result, Err(Error::FetchRequest(_))));
    }

    #[test]
    fn test_invalid_url_is_request_error() {
        let result = HttpFetcher::new().fetch(&FetchRequest::get("not a url"));
        assert!(matches!(result, Err(Error::FetchRequest(_))));
    }

    #[test]
    fn test_invalid_auth_header_is_request_error() {
        let request = FetchRequest {
            auth: "Bearer\nabc".to_string(),
            ..FetchRequest::get("http://127.0.0.1:1/eureka/apps")
        };
        let result = HttpFetcher::new().fetch(&request);
        assert!(matches!(result, Err(Error::FetchRequest(_))));
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        // 绑定后立即释放端口，保证没有服务监听
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let result = HttpFetcher::new().fetch(&FetchRequest::get(format!("http://{}/eureka/apps", addr)));
        assert!(matches!(result, Err(Error::FetchTransport(_))));
    }

    #[test]
    fn test_slow_registry_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            // 接受连接但不响应
            let (_stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(10));
        });

        let fetcher = HttpFetcher::with_timeout(Duration::from_millis(300));
        let started = Instant::now();
        let result = fetcher.fetch(&FetchRequest::get(format!("http://{}/eureka/apps", addr)));

        assert!(matches!(result, Err(Error::FetchTransport(_))));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    // 自签名证书的 TLS 服务端配置
    fn self_signed_tls_config() -> Arc<ServerConfig> {
        let certified = rcgen::generate_simple_self_signed(vec![
            "localhost".to_string(),
            "127.0.0.1".to_string(),
        ])
        .unwrap();
        let cert = certified.cert.der().clone();
        let key = PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der());

        let config = ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![cert], key.into())
            .unwrap();
        Arc::new(config)
    }

    fn respond_tls(tls: &mut StreamOwned<ServerConnection, TcpStream>, body: &str) -> std::io::Result<()> {
        {
            let mut reader = BufReader::new(&mut *tls);
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line)? == 0 || line.trim_end().is_empty() {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        tls.write_all(response.as_bytes())?;
        tls.conn.send_close_notify();
        tls.flush()
    }

    // 启动只处理一个连接的 HTTPS 注册中心
    fn serve_tls_once(body: &'static str) -> String {
        let tls_config = self_signed_tls_config();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let conn = ServerConnection::new(tls_config).unwrap();
            let mut tls = StreamOwned::new(conn, stream);
            // 客户端拒绝证书时握手失败，忽略
            let _ = respond_tls(&mut tls, body);
        });

        format!("https://{}/eureka/apps", addr)
    }

    #[test]
    fn test_fetch_accepts_self_signed_certificate() {
        let url = serve_tls_once(DOCUMENT);

        let response = HttpFetcher::new().fetch(&FetchRequest::get(url)).expect("请求失败");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, DOCUMENT.as_bytes());
    }

    #[test]
    fn test_self_signed_certificate_rejected_by_verifying_client() {
        let url = serve_tls_once(DOCUMENT);

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap();
        assert!(client.get(url.as_str()).send().is_err());
    }
}
