//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor, Read, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Condvar, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::server::{
        Dispatcher, Error, HttpServer, ServerConfig, ServerState, SimpleHost, StatusCode,
        INTERNAL_ERROR_BODY, NOT_FOUND_BODY, handle_connection, host_file,
    };

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // Mock TcpStream for testing
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
    }

    impl MockTcpStream {
        fn new(read_data: &[u8]) -> Self {
            Self {
                read_data: Cursor::new(read_data.to_vec()),
                write_data: Vec::new(),
            }
        }

        fn written(&self) -> String {
            String::from_utf8_lossy(&self.write_data).into_owned()
        }
    }

    impl Read for MockTcpStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.read_data.read(buf)
        }
    }

    impl Write for MockTcpStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.write_data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn hello_dispatcher() -> Dispatcher {
        let mut dispatcher = Dispatcher::default();
        dispatcher.routes.add_route("/", |_req, res| {
            res.set_body("<h1>Hello, World!</h1>");
            Ok(())
        });
        dispatcher
    }

    fn run_mock(dispatcher: &Dispatcher, request: &[u8], buffer_size: usize) -> String {
        let mut stream = MockTcpStream::new(request);
        handle_connection(&mut stream, dispatcher, buffer_size).unwrap();
        stream.written()
    }

    #[test]
    fn test_handle_connection_with_valid_request() {
        let response = run_mock(&hello_dispatcher(), b"GET / HTTP/1.1\r\nHost: x\r\n\r\n", 4096);
        assert_eq!(
            response,
            "HTTP/1.1 200 OK\r\nContent-Length: 22\r\nContent-Type: text/html\r\n\r\n<h1>Hello, World!</h1>"
        );
    }

    #[test]
    fn test_handle_connection_with_not_found() {
        let response = run_mock(&hello_dispatcher(), b"GET /nope HTTP/1.1\r\n\r\n", 4096);
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.ends_with(NOT_FOUND_BODY));
    }

    #[test]
    fn test_malformed_request_falls_through_to_404() {
        let response = run_mock(&hello_dispatcher(), b"\x00\x01garbage", 4096);
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn test_empty_read_sends_nothing() {
        let response = run_mock(&hello_dispatcher(), b"", 4096);
        assert!(response.is_empty());
    }

    #[test]
    fn test_read_is_capped_below_buffer_size() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.routes.add_route("/echo", |req, res| {
            res.set_body(req.body.clone());
            Ok(())
        });

        // 23 bytes of head; a 30-byte buffer reads 29 bytes, leaving 6 for the body.
        let request = b"POST /echo HTTP/1.1\r\n\r\n0123456789";
        let response = run_mock(&dispatcher, request, 30);
        assert!(response.ends_with("\r\n\r\n012345"));
    }

    #[test]
    fn test_middleware_short_circuit_skips_handler() {
        let handled = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::default();
        dispatcher.middleware.push(|_req, res| {
            res.set_header("X-Seen", "yes");
            Ok(false)
        });
        let counter = Arc::clone(&handled);
        dispatcher.routes.add_route("/", move |_req, _res| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let response = run_mock(&dispatcher, b"GET / HTTP/1.1\r\n\r\n", 4096);
        assert_eq!(handled.load(Ordering::SeqCst), 0);
        // Default response plus the middleware's own mutation, nothing else
        assert_eq!(
            response,
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nContent-Type: text/html\r\nX-Seen: yes\r\n\r\n"
        );
    }

    #[test]
    fn test_middleware_can_set_its_own_status() {
        let mut dispatcher = hello_dispatcher();
        dispatcher.middleware.push(|req, res| {
            if req.get_header("Authorization").is_none() {
                res.set_status(StatusCode::Unauthorized);
                res.set_body("login first");
                return Ok(false);
            }
            Ok(true)
        });

        let denied = run_mock(&dispatcher, b"GET / HTTP/1.1\r\n\r\n", 4096);
        assert!(denied.starts_with("HTTP/1.1 401 Unauthorized\r\n"));
        assert!(denied.ends_with("login first"));

        let allowed = run_mock(&dispatcher, b"GET / HTTP/1.1\r\nAuthorization: token\r\n\r\n", 4096);
        assert!(allowed.starts_with("HTTP/1.1 200 OK\r\n"));
    }

    #[test]
    fn test_request_headers_reach_handler_intact() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.routes.add_route("/echo", |req, res| {
            let host = req.header_or("Host", "missing").to_string();
            let agent = req.header_or("User-Agent", "missing").to_string();
            res.set_body(format!("{host}|{agent}"));
            Ok(())
        });

        let response = run_mock(
            &dispatcher,
            b"GET /echo HTTP/1.1\r\nHost: example.com\r\nUser-Agent: curl/8.0\r\n\r\n",
            4096,
        );
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("\r\n\r\nexample.com|curl/8.0"));
    }

    #[test]
    fn test_handler_error_becomes_500() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.routes.add_route("/fail", |_req, res| {
            res.set_body("partial");
            Err(Error::InternalError("database unavailable".to_string()))
        });

        let response = run_mock(&dispatcher, b"GET /fail HTTP/1.1\r\n\r\n", 4096);
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.ends_with(INTERNAL_ERROR_BODY));
        assert!(!response.contains("partial"));
    }

    #[test]
    fn test_handler_panic_becomes_500() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.routes.add_route("/boom", |_req, _res| panic!("handler bug"));

        let response = run_mock(&dispatcher, b"GET /boom HTTP/1.1\r\n\r\n", 4096);
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn test_middleware_error_becomes_500() {
        let mut dispatcher = hello_dispatcher();
        dispatcher.middleware.push(|_req, _res| {
            Err(Error::InternalError("rate limiter offline".to_string()))
        });

        let response = run_mock(&dispatcher, b"GET / HTTP/1.1\r\n\r\n", 4096);
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn test_query_params_reach_handler() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.routes.add_route("/greet", |req, res| {
            let name = req.get_query_param("name").unwrap_or("stranger");
            res.set_body(format!("hi {name}"));
            Ok(())
        });

        let response = run_mock(&dispatcher, b"GET /greet?name=ada HTTP/1.1\r\n\r\n", 4096);
        assert!(response.ends_with("hi ada"));
    }

    // Live socket tests

    fn local_config(workers: usize) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            thread_pool_size: workers,
            ..ServerConfig::default()
        }
    }

    fn send(addr: SocketAddr, raw: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        stream.write_all(raw).unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new(ServerConfig::default());
        assert_eq!(server.state(), ServerState::Stopped);
        assert_eq!(server.config.port, 8080);
        assert_eq!(server.config.thread_pool_size, 4);
        assert!(server.local_addr().is_none());
    }

    #[test]
    fn test_hello_world_over_tcp() {
        init_logger();
        let mut server = HttpServer::new(ServerConfig {
            buffer_size: 4096,
            ..local_config(2)
        });
        server.route("/", |_req, res| {
            res.set_body("<h1>Hello, World!</h1>");
            Ok(())
        });
        server.start().unwrap();
        assert_eq!(server.state(), ServerState::Running);

        let response = send(server.local_addr().unwrap(), b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(
            response,
            "HTTP/1.1 200 OK\r\nContent-Length: 22\r\nContent-Type: text/html\r\n\r\n<h1>Hello, World!</h1>"
        );

        server.stop();
        assert_eq!(server.state(), ServerState::Stopped);
    }

    #[test]
    fn test_concurrent_clients_are_served_in_parallel() {
        init_logger();
        let arrivals = Arc::new((Mutex::new(0usize), Condvar::new()));

        let mut server = HttpServer::new(local_config(2));
        let gate = Arc::clone(&arrivals);
        server.route("/slow", move |_req, res| {
            let (count, cvar) = &*gate;
            let mut count = count.lock().unwrap();
            *count += 1;
            cvar.notify_all();
            let (count, _) = cvar
                .wait_timeout_while(count, Duration::from_secs(3), |n| *n < 2)
                .unwrap();
            res.set_body(if *count >= 2 { "together" } else { "alone" });
            Ok(())
        });
        server.start().unwrap();
        let addr = server.local_addr().unwrap();

        let clients: Vec<_> = (0..2)
            .map(|_| thread::spawn(move || send(addr, b"GET /slow HTTP/1.1\r\n\r\n")))
            .collect();
        for client in clients {
            let response = client.join().unwrap();
            assert!(response.ends_with("together"), "got: {response}");
        }

        server.stop();
    }

    #[test]
    fn test_stop_is_prompt_and_port_is_reusable() {
        init_logger();
        let mut server = HttpServer::new(local_config(3));
        server.start().unwrap();
        let addr = server.local_addr().unwrap();

        let started = Instant::now();
        server.stop();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(server.local_addr().is_none());

        // Stopping again is a no-op
        server.stop();
        assert_eq!(server.state(), ServerState::Stopped);

        let mut again = HttpServer::new(ServerConfig {
            port: addr.port(),
            ..local_config(1)
        });
        again.start().unwrap();
        assert_eq!(again.local_addr().unwrap().port(), addr.port());
        again.stop();
    }

    #[test]
    fn test_restart_same_server() {
        let mut server = HttpServer::new(local_config(1));
        server.route("/", |_req, res| {
            res.set_body("up");
            Ok(())
        });

        server.start().unwrap();
        server.stop();
        server.start().unwrap();
        let response = send(server.local_addr().unwrap(), b"GET / HTTP/1.1\r\n\r\n");
        assert!(response.ends_with("up"));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut server = HttpServer::new(local_config(1));
        server.start().unwrap();
        assert!(matches!(server.start(), Err(Error::AlreadyRunning)));
        assert_eq!(server.state(), ServerState::Running);
    }

    #[test]
    fn test_start_fails_when_port_taken() {
        let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let mut server = HttpServer::new(ServerConfig {
            port,
            ..local_config(1)
        });
        assert!(matches!(server.start(), Err(Error::IoError(_))));
        assert_eq!(server.state(), ServerState::Stopped);
        assert!(server.local_addr().is_none());
    }

    #[test]
    fn test_start_rejects_empty_pool() {
        let mut server = HttpServer::new(local_config(0));
        assert!(matches!(server.start(), Err(Error::InvalidConfig(_))));
        assert_eq!(server.state(), ServerState::Stopped);
    }

    #[test]
    fn test_registration_after_start_is_ignored() {
        let mut server = HttpServer::new(local_config(1));
        server.start().unwrap();
        server.route("/late", |_req, res| {
            res.set_body("late");
            Ok(())
        });
        assert_eq!(server.routes().count(), 0);

        let response = send(server.local_addr().unwrap(), b"GET /late HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn test_worker_survives_panics_and_silent_clients() {
        init_logger();
        let mut server = HttpServer::new(local_config(1));
        server
            .route("/boom", |_req, _res| panic!("handler bug"))
            .route("/ok", |_req, res| {
                res.set_body("still alive");
                Ok(())
            });
        server.start().unwrap();
        let addr = server.local_addr().unwrap();

        drop(TcpStream::connect(addr).unwrap());
        let failed = send(addr, b"GET /boom HTTP/1.1\r\n\r\n");
        assert!(failed.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));

        let ok = send(addr, b"GET /ok HTTP/1.1\r\n\r\n");
        assert!(ok.ends_with("still alive"));
    }

    #[test]
    fn test_static_files_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>from disk</p>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();

        let mut server = HttpServer::new(local_config(2));
        server.static_files("/static", dir.path().to_str().unwrap());
        server.start().unwrap();
        let addr = server.local_addr().unwrap();

        let page = send(addr, b"GET /static/index.html HTTP/1.1\r\n\r\n");
        assert!(page.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(page.contains("Content-Type: text/html\r\n"));
        assert!(page.contains("Content-Length: 16\r\n"));
        assert!(page.ends_with("\r\n\r\n<p>from disk</p>"));

        let script = send(addr, b"GET /static/app.js HTTP/1.1\r\n\r\n");
        assert!(script.contains("Content-Type: application/javascript\r\n"));

        let missing = send(addr, b"GET /static/missing.html HTTP/1.1\r\n\r\n");
        assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(missing.ends_with("\r\n\r\nFile not found"));
    }

    #[test]
    fn test_simple_host_serves_fixed_page() {
        let host = SimpleHost::bind("127.0.0.1:0".parse().unwrap(), "<h1>only page</h1>").unwrap();
        let addr = host.local_addr().unwrap();
        thread::spawn(move || host.serve());

        for _ in 0..2 {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            let mut buf = String::new();
            stream.read_to_string(&mut buf).unwrap();
            assert_eq!(
                buf,
                "HTTP/1.1 200 OK\r\nContent-Length: 18\r\nContent-Type: text/html\r\n\r\n<h1>only page</h1>"
            );
        }
    }

    #[test]
    fn test_host_file_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.html");
        let result = host_file(missing.to_str().unwrap(), 0);
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
