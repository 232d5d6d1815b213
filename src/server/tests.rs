//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor};
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};

    use tokio::fs::File;
    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    use crate::server::{
        handle_connection, Body, Error, Handler, HandlerFuture, Outcome, Response, ServerConfig,
        Socket, StaticFiles, StatusCode, BAD_REQUEST, CONTINUE, METHOD_NOT_ALLOWED, NOT_FOUND,
    };

    // Mock TcpStream for testing
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
        fail_writes: bool,
    }

    impl MockTcpStream {
        fn new(read_data: &[u8]) -> Self {
            Self {
                read_data: Cursor::new(read_data.to_vec()),
                write_data: Vec::new(),
                fail_writes: false,
            }
        }

        fn broken(read_data: &[u8]) -> Self {
            Self {
                fail_writes: true,
                ..Self::new(read_data)
            }
        }

        fn written_data(&self) -> &[u8] {
            &self.write_data
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            if this.fail_writes {
                return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
            }
            this.write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Records the paths it is asked for and answers with a short body.
    #[derive(Default)]
    struct RecordingHandler {
        paths: Mutex<Vec<String>>,
    }

    impl Handler for RecordingHandler {
        fn serve<'a>(&'a self, path: &'a str, socket: &'a mut Socket<'a>) -> HandlerFuture<'a> {
            Box::pin(async move {
                self.paths.lock().unwrap().push(path.to_string());
                Response::new(StatusCode::Ok).with_content("ok").send(socket).await
            })
        }
    }

    struct FailingHandler;

    impl Handler for FailingHandler {
        fn serve<'a>(&'a self, _path: &'a str, _socket: &'a mut Socket<'a>) -> HandlerFuture<'a> {
            Box::pin(async {
                Err::<(), _>(Error::IoError(io::Error::new(io::ErrorKind::Other, "disk on fire")))
            })
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("microserve-unit-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    async fn run(request: &[u8], handler: &dyn Handler) -> (Outcome, Vec<u8>) {
        let mut stream = MockTcpStream::new(request);
        let outcome = handle_connection(&mut stream, handler, 8192).await;
        (outcome, stream.written_data().to_vec())
    }

    #[tokio::test]
    async fn test_response_serialization() {
        let bytes = Response::new("200 OK")
            .with_header("content-type", "text/plain")
            .with_content("hi")
            .to_bytes()
            .await
            .unwrap();
        assert_eq!(
            bytes,
            b"HTTP/1.1 200 OK\r\nContent-type: text/plain\r\nContent-Length: 2\r\n\r\nhi"
        );
    }

    #[tokio::test]
    async fn test_response_with_status_code_and_empty_body() {
        let bytes = Response::new(StatusCode::NotFound).to_bytes().await.unwrap();
        assert_eq!(bytes, b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    }

    #[tokio::test]
    async fn test_explicit_content_length_is_kept() {
        let bytes = Response::new("200 OK")
            .with_header("content-length", "2")
            .with_content("hi")
            .to_bytes()
            .await
            .unwrap();
        assert_eq!(bytes, b"HTTP/1.1 200 OK\r\nContent-length: 2\r\n\r\nhi");
    }

    #[tokio::test]
    async fn test_multi_value_headers_are_separate_lines() {
        let bytes = Response::new("200 OK")
            .with_header("Set-Cookie", "a=1")
            .with_header("set-cookie", "b=2")
            .to_bytes()
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "HTTP/1.1 200 OK\r\nSet-cookie: a=1\r\nSet-cookie: b=2\r\nContent-Length: 0\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn test_file_body_uses_file_size() {
        let dir = scratch_dir("file-body");
        let path = dir.join("data.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let file = File::open(&path).await.unwrap();
        let bytes = Response::new(StatusCode::Ok).with_file(file).to_bytes().await.unwrap();
        assert_eq!(bytes, b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n0123456789");
    }

    #[tokio::test]
    async fn test_content_takes_precedence_over_file() {
        let dir = scratch_dir("precedence");
        let path = dir.join("ignored.txt");
        std::fs::write(&path, b"from the file").unwrap();

        let file = File::open(&path).await.unwrap();
        let response = Response::new("200 OK").with_content("inline").with_file(file);
        assert!(matches!(response.body(), Body::Content(_)));
        let bytes = response.to_bytes().await.unwrap();
        assert!(bytes.ends_with(b"Content-Length: 6\r\n\r\ninline"));
    }

    #[tokio::test]
    async fn test_send_to_broken_socket_fails() {
        let mut stream = MockTcpStream::broken(b"");
        let result = Response::new("200 OK").with_content("hi").send(&mut stream).await;
        let err = result.unwrap_err();
        assert!(err.is_disconnect());
    }

    #[tokio::test]
    async fn test_get_is_delegated_to_handler() {
        let handler = RecordingHandler::default();
        let (outcome, written) = run(b"GET /docs/page.html HTTP/1.1\r\nHost: localhost\r\n\r\n", &handler).await;

        assert_eq!(outcome, Outcome::Served);
        assert_eq!(*handler.paths.lock().unwrap(), ["/docs/page.html"]);
        assert_eq!(written, b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok");
    }

    #[tokio::test]
    async fn test_post_gets_method_not_allowed() {
        let handler = RecordingHandler::default();
        let (outcome, written) = run(b"POST /test HTTP/1.1\r\nHost: localhost\r\n\r\n", &handler).await;

        assert_eq!(outcome, Outcome::MethodNotAllowed);
        assert_eq!(
            written,
            b"HTTP/1.1 405 Method Not Allowed\r\nContent-type: text/plain\r\nContent-length: 18\r\n\r\nMethod Not Allowed"
        );
        assert!(handler.paths.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extension_method_gets_method_not_allowed() {
        let handler = RecordingHandler::default();
        let (outcome, written) = run(b"get / HTTP/1.1\r\n\r\n", &handler).await;
        assert_eq!(outcome, Outcome::MethodNotAllowed);
        assert_eq!(written, METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_fixed_responses_match_status_codes() {
        let status_line = |status: StatusCode| format!("HTTP/1.1 {status}\r\n");
        assert!(BAD_REQUEST.starts_with(status_line(StatusCode::BadRequest).as_bytes()));
        assert!(NOT_FOUND.starts_with(status_line(StatusCode::NotFound).as_bytes()));
        assert!(METHOD_NOT_ALLOWED.starts_with(status_line(StatusCode::MethodNotAllowed).as_bytes()));
        assert_eq!(CONTINUE, format!("{}\r\n", status_line(StatusCode::Continue)).as_bytes());
    }

    #[tokio::test]
    async fn test_method_not_allowed_length_matches_body() {
        let text = std::str::from_utf8(METHOD_NOT_ALLOWED).unwrap();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        assert!(head.contains(&format!("Content-length: {}", body.len())));
    }

    #[tokio::test]
    async fn test_malformed_request_gets_bad_request() {
        let handler = RecordingHandler::default();
        let (outcome, written) = run(b"INVALID\r\n\r\n", &handler).await;

        assert_eq!(outcome, Outcome::BadRequest);
        assert_eq!(written, BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_header_gets_bad_request() {
        let handler = RecordingHandler::default();
        let (outcome, written) = run(b"GET / HTTP/1.1\r\nNoDelimiter\r\n\r\n", &handler).await;

        assert_eq!(outcome, Outcome::BadRequest);
        assert_eq!(written, BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_truncated_request_gets_bad_request() {
        let handler = RecordingHandler::default();
        let (outcome, written) = run(b"GET / HTTP/1.1\r\nHost: local", &handler).await;

        assert_eq!(outcome, Outcome::BadRequest);
        assert_eq!(written, BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_head_gets_bad_request() {
        let handler = RecordingHandler::default();
        let mut request = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
        request.extend(std::iter::repeat(b'a').take(200));
        request.extend_from_slice(b"\r\n\r\n");

        let mut stream = MockTcpStream::new(&request);
        let outcome = handle_connection(&mut stream, &handler, 64).await;
        assert_eq!(outcome, Outcome::BadRequest);
        assert_eq!(stream.written_data(), BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_handler_error_gets_bad_request() {
        let (outcome, written) = run(b"GET / HTTP/1.1\r\n\r\n", &FailingHandler).await;
        assert_eq!(outcome, Outcome::BadRequest);
        assert_eq!(written, BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_broken_socket_is_dropped() {
        let handler = RecordingHandler::default();
        let mut stream = MockTcpStream::broken(b"POST / HTTP/1.1\r\n\r\n");
        let outcome = handle_connection(&mut stream, &handler, 8192).await;

        assert_eq!(outcome, Outcome::Dropped);
        assert!(stream.written_data().is_empty());
    }

    #[tokio::test]
    async fn test_expect_continue_is_answered_first() {
        let handler = RecordingHandler::default();
        let (outcome, written) = run(
            b"POST /upload HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 5\r\n\r\nhello",
            &handler,
        )
        .await;

        assert_eq!(outcome, Outcome::MethodNotAllowed);
        let mut expected = CONTINUE.to_vec();
        expected.extend_from_slice(METHOD_NOT_ALLOWED);
        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn test_body_is_drained_before_dispatch() {
        let handler = RecordingHandler::default();
        let (outcome, written) = run(
            b"GET /with-body HTTP/1.1\r\nContent-Length: 4\r\n\r\nbody",
            &handler,
        )
        .await;
        assert_eq!(outcome, Outcome::Served);
        assert!(written.starts_with(b"HTTP/1.1 200 OK\r\n"));

        // A short body followed by EOF is accepted.
        let (outcome, _) = run(b"GET / HTTP/1.1\r\nContent-Length: 100\r\n\r\nabc", &handler).await;
        assert_eq!(outcome, Outcome::Served);

        // An unparseable length counts as no body.
        let (outcome, _) = run(b"GET / HTTP/1.1\r\nContent-Length: lots\r\n\r\n", &handler).await;
        assert_eq!(outcome, Outcome::Served);
    }

    #[test]
    fn test_resolve_paths() {
        let files = StaticFiles::new("/srv/www", "index.html");
        assert_eq!(files.resolve("/"), Some(PathBuf::from("/srv/www/index.html")));
        assert_eq!(files.resolve("/a/b.css"), Some(PathBuf::from("/srv/www/a/b.css")));
        assert_eq!(files.resolve("/docs/"), Some(PathBuf::from("/srv/www/docs/index.html")));
        assert_eq!(files.resolve("/a/./b/../c.txt"), Some(PathBuf::from("/srv/www/a/c.txt")));
        assert_eq!(files.resolve("/page.html?x=1#top"), Some(PathBuf::from("/srv/www/page.html")));
        assert_eq!(files.resolve("//double//slash"), Some(PathBuf::from("/srv/www/double/slash")));
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let files = StaticFiles::new("/srv/www", "index.html");
        assert_eq!(files.resolve("/../../etc/passwd"), None);
        assert_eq!(files.resolve("/a/../../secret"), None);
        assert_eq!(files.resolve("/.."), None);
        // Climbing above the root is rejected even when the path comes back in.
        assert_eq!(files.resolve("/../www/index.html"), None);
    }

    #[tokio::test]
    async fn test_static_files_serves_existing_file() {
        let dir = scratch_dir("serve");
        std::fs::write(dir.join("index.html"), b"<h1>Hello!</h1>").unwrap();
        let files = StaticFiles::new(&dir, "index.html");

        let (outcome, written) = run(b"GET / HTTP/1.1\r\n\r\n", &files).await;
        assert_eq!(outcome, Outcome::Served);
        assert_eq!(
            written,
            b"HTTP/1.1 200 OK\r\nContent-type: text/html\r\nContent-Length: 15\r\n\r\n<h1>Hello!</h1>"
        );
    }

    #[tokio::test]
    async fn test_static_files_unknown_extension() {
        let dir = scratch_dir("octet");
        std::fs::write(dir.join("blob.qqq"), b"\x00\x01").unwrap();
        let files = StaticFiles::new(&dir, "index.html");

        let (_, written) = run(b"GET /blob.qqq HTTP/1.1\r\n\r\n", &files).await;
        assert!(written.starts_with(
            b"HTTP/1.1 200 OK\r\nContent-type: application/octet-stream\r\nContent-Length: 2\r\n\r\n"
        ));
    }

    #[tokio::test]
    async fn test_static_files_missing_file_and_directory() {
        let dir = scratch_dir("missing");
        std::fs::create_dir_all(dir.join("sub")).unwrap();
        let files = StaticFiles::new(&dir, "index.html");

        let (outcome, written) = run(b"GET /nope.txt HTTP/1.1\r\n\r\n", &files).await;
        assert_eq!(outcome, Outcome::Served);
        assert_eq!(written, NOT_FOUND);

        let (_, written) = run(b"GET /sub HTTP/1.1\r\n\r\n", &files).await;
        assert_eq!(written, NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_files_rejects_traversal() {
        let dir = scratch_dir("traversal");
        let files = StaticFiles::new(dir.join("root"), "index.html");
        std::fs::create_dir_all(files.root()).unwrap();
        std::fs::write(dir.join("secret.txt"), b"secret").unwrap();

        let (_, written) = run(b"GET /../secret.txt HTTP/1.1\r\n\r\n", &files).await;
        assert_eq!(written, NOT_FOUND);
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.root, PathBuf::from("www"));
        assert_eq!(config.index, "index.html");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = ServerConfig::from_json(r#"{"addr": "0.0.0.0:8080", "max_connections": 1}"#).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.index, "index.html");
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_json(r#"{"port": 80}"#),
            Err(Error::JsonError(_))
        ));
        assert!(matches!(
            ServerConfig::from_json(r#"{"max_connections": 0}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            ServerConfig::from_json(r#"{"index": "../index.html"}"#),
            Err(Error::ConfigError(_))
        ));
    }
}
