//! Exercises `HttpTransport` and the fetch pipeline against a local stub server.

use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use weather_core::{
    FetchErrorKind, FetchSettings, HttpTransport, RetryPolicy, Transport, TransportError,
    WeatherFetcher,
};

#[derive(Clone, Copy)]
enum Behaviour {
    Respond,
    Hang,
}

struct StubServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    async fn start(response: String, behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (hits_c, requests_c) = (hits.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let (hits, requests, response) = (hits_c.clone(), requests_c.clone(), response.clone());
                tokio::spawn(async move {
                    handle(socket, &response, behaviour, &hits, &requests).await;
                });
            }
        });

        Self { addr, hits, requests }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn handle(
    mut socket: TcpStream,
    response: &str,
    behaviour: Behaviour,
    hits: &AtomicUsize,
    requests: &Mutex<Vec<String>>,
) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    requests.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());
    hits.fetch_add(1, Ordering::SeqCst);

    match behaviour {
        Behaviour::Respond => {
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Behaviour::Hang => tokio::time::sleep(Duration::from_secs(30)).await,
    }
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn quick_policy() -> RetryPolicy {
    RetryPolicy { backoff_factor: Duration::from_millis(10), ..RetryPolicy::default() }
}

#[tokio::test]
async fn repeated_server_error_is_tried_three_times() {
    let server = StubServer::start(http_response("500 Internal Server Error", "{}"), Behaviour::Respond).await;
    let transport = HttpTransport::new(quick_policy()).unwrap();

    let resp = transport
        .send(&server.url("/v1/current.json"), &[], Duration::from_secs(5))
        .await
        .expect("last response is returned once retries are spent");

    assert_eq!(resp.status, 500);
    assert_eq!(server.hits(), 3);
}

#[tokio::test]
async fn success_returns_body_and_query() {
    let body = r#"{"current":{"temp_c":1.0}}"#;
    let server = StubServer::start(http_response("200 OK", body), Behaviour::Respond).await;
    let transport = HttpTransport::new(quick_policy()).unwrap();

    let resp = transport
        .send(
            &server.url("/v1/current.json"),
            &[("key", "k"), ("q", "Vitória"), ("lang", "pt")],
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, body.as_bytes());
    assert_eq!(resp.content_type(), Some("application/json"));
    assert_eq!(server.hits(), 1);

    let request = server.requests.lock().unwrap()[0].clone();
    assert!(request.starts_with("GET /v1/current.json?"), "{request}");
    assert!(request.contains("key=k"));
    assert!(request.contains("lang=pt"));
}

#[tokio::test]
async fn hanging_server_times_out_after_retries() {
    let server = StubServer::start(String::new(), Behaviour::Hang).await;
    let transport = HttpTransport::new(quick_policy()).unwrap();
    let timeout = Duration::from_millis(200);

    let err = transport.send(&server.url("/slow"), &[], timeout).await.unwrap_err();

    assert_eq!(err, TransportError::Timeout(timeout));
    assert_eq!(server.hits(), 3);
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let transport = HttpTransport::new(quick_policy()).unwrap();

    let err = transport
        .send(&format!("http://{addr}/"), &[], Duration::from_secs(2))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Connection(_)), "{err:?}");
}

#[tokio::test]
async fn connection_errors_do_not_carry_the_api_key() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let transport = HttpTransport::new(quick_policy()).unwrap();

    let err = transport
        .send(
            &format!("http://{addr}/v1/current.json"),
            &[("key", "SECRET123"), ("q", "Rio")],
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Connection(_)), "{err:?}");
    assert!(!err.to_string().contains("SECRET123"), "{err}");
    assert!(!format!("{err:?}").contains("SECRET123"), "{err:?}");
}

fn fetcher_for(server: &StubServer) -> WeatherFetcher {
    let settings = FetchSettings {
        base_url: server.url("/v1"),
        fetch_icon: false,
        ..FetchSettings::new("test-key")
    };
    WeatherFetcher::new(Arc::new(HttpTransport::new(quick_policy()).unwrap()), settings)
}

#[tokio::test]
async fn fetch_weather_over_http() {
    let body = r#"{"current":{"temp_c":25.4,"condition":{"text":"sol","icon":"//x/y.png"},"humidity":60},"location":{"name":"São Mateus","region":"Espírito Santo","country":"Brazil","lat":-18.7,"lon":-39.8}}"#;
    let server = StubServer::start(http_response("200 OK", body), Behaviour::Respond).await;

    let result = fetcher_for(&server).fetch_weather("São Mateus, Espirito Santo").await.unwrap();

    assert_eq!(result.temperature_c, 25);
    assert_eq!(result.condition, "Sol");
    assert_eq!(result.location.to_string(), "São Mateus, Espírito Santo, Brazil (Lat: -18.7, Lon: -39.8)");
}

#[tokio::test]
async fn fetch_weather_surfaces_exhausted_server_error() {
    let server = StubServer::start(http_response("502 Bad Gateway", "<html>"), Behaviour::Respond).await;

    let err = fetcher_for(&server).fetch_weather("Vitória").await.unwrap_err();

    assert_eq!(err.kind, FetchErrorKind::ServerError);
    assert_eq!(err.message, "Erro no servidor: 502");
    assert_eq!(server.hits(), 3);
}

#[tokio::test]
async fn fetch_weather_translates_provider_error_status() {
    let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
    let server = StubServer::start(http_response("400 Bad Request", body), Behaviour::Respond).await;

    let err = fetcher_for(&server).fetch_weather("Atlantis").await.unwrap_err();

    assert_eq!(err.kind, FetchErrorKind::ApiError);
    assert_eq!(err.message, "Cidade não encontrada.");
    assert_eq!(server.hits(), 1);
}
