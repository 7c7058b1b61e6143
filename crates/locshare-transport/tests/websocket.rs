//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on a random port and talk to it with a
//! `tokio-tungstenite` client and a `reqwest` HTTP client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use locshare_transport::{
        Connection, Transport, TransportConfig, TransportError,
        WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn bind() -> WebSocketTransport {
        WebSocketTransport::bind("127.0.0.1:0", TransportConfig::default())
            .await
            .expect("should bind")
    }

    async fn connect_client(transport: &WebSocketTransport) -> ClientWs {
        let url = format!("ws://{}/ws", transport.local_addr());
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let mut transport = bind().await;
        let mut client_ws = connect_client(&transport).await;
        let server_conn = transport.accept().await.expect("should accept");

        assert!(server_conn.id().into_inner() > 0);

        // Server sends, client receives.
        server_conn
            .send(r#"{"event":"hello"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.to_text().unwrap(), r#"{"event":"hello"}"#);

        // Client sends, server receives.
        client_ws
            .send(Message::Text("from client".into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, "from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_binary_utf8_frame_is_accepted_as_text() {
        let mut transport = bind().await;
        let mut client_ws = connect_client(&transport).await;
        let server_conn = transport.accept().await.unwrap();

        client_ws
            .send(Message::Binary(b"{\"a\":1}".to_vec().into()))
            .await
            .unwrap();

        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_websocket_binary_non_utf8_frame_is_invalid() {
        let mut transport = bind().await;
        let mut client_ws = connect_client(&transport).await;
        let server_conn = transport.accept().await.unwrap();

        client_ws
            .send(Message::Binary(vec![0xff, 0xfe, 0xfd].into()))
            .await
            .unwrap();

        let result = server_conn.recv().await;
        assert!(matches!(result, Err(TransportError::InvalidFrame(_))));
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let mut transport = bind().await;
        let mut client_ws = connect_client(&transport).await;
        let server_conn = transport.accept().await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_connections_get_distinct_ids() {
        let mut transport = bind().await;
        let _a = connect_client(&transport).await;
        let first = transport.accept().await.unwrap();
        let _b = connect_client(&transport).await;
        let second = transport.accept().await.unwrap();

        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_liveness_route_returns_greeting() {
        let transport = bind().await;
        let url = format!("http://{}/", transport.local_addr());

        let body = reqwest::get(&url)
            .await
            .expect("request should succeed")
            .text()
            .await
            .expect("body should be text");

        assert_eq!(body, "Welcome to LocShare");
    }

    #[tokio::test]
    async fn test_liveness_route_allows_any_origin() {
        let transport = bind().await;
        let url = format!("http://{}/", transport.local_addr());

        let resp = reqwest::Client::new()
            .get(&url)
            .header("Origin", "https://example.com")
            .send()
            .await
            .expect("request should succeed");

        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_custom_greeting_and_path() {
        let mut transport = WebSocketTransport::bind(
            "127.0.0.1:0",
            TransportConfig {
                ws_path: "/live".into(),
                greeting: "hi".into(),
                ..TransportConfig::default()
            },
        )
        .await
        .unwrap();

        let body = reqwest::get(format!("http://{}/", transport.local_addr()))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "hi");

        let url = format!("ws://{}/live", transport.local_addr());
        let (_ws, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
        assert!(transport.accept().await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_ends_accept() {
        let mut transport = bind().await;
        transport.shutdown().await.unwrap();

        let result =
            tokio::time::timeout(Duration::from_secs(5), transport.accept())
                .await
                .expect("accept should resolve after shutdown");
        assert!(matches!(result, Err(TransportError::Shutdown)));
    }

    #[tokio::test]
    async fn test_bind_rejects_root_ws_path() {
        let result = WebSocketTransport::bind(
            "127.0.0.1:0",
            TransportConfig {
                ws_path: "/".into(),
                ..TransportConfig::default()
            },
        )
        .await;
        assert!(matches!(result, Err(TransportError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_bind_rejects_relative_ws_path() {
        let result = WebSocketTransport::bind(
            "127.0.0.1:0",
            TransportConfig {
                ws_path: "ws".into(),
                ..TransportConfig::default()
            },
        )
        .await;
        assert!(matches!(result, Err(TransportError::InvalidConfig(_))));
    }
}
