//! Test utilities

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use ingester::error::IngesterError;
use ingester::error::Result;
use ingester::processors::identity::Identity;
use ingester::sources;
use ingester::Destination;
use ingester::Executor;
use ingester::Payload;
use ingester::Processor;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;

pub struct Recorder {
    tx: UnboundedSender<Payload>,
}

impl Recorder {
    pub fn new() -> (Self, UnboundedReceiver<Payload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Destination for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    async fn send(&self, payload: &Payload) -> Result<()> {
        let _ = self.tx.send(payload.clone());
        Ok(())
    }
}

/// Records the payload, then fails like a rejecting API would.
pub struct Failing {
    tx: UnboundedSender<Payload>,
}

impl Failing {
    pub fn new() -> (Self, UnboundedReceiver<Payload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Destination for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, payload: &Payload) -> Result<()> {
        let _ = self.tx.send(payload.clone());
        Err(IngesterError::Status {
            destination: "failing",
            status: 400,
            body: r#"{"error":{"message":"Invalid parameter"}}"#.to_string(),
        })
    }
}

pub async fn serve(router: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    });

    Ok(format!("http://{addr}"))
}

pub async fn run_http_service(
    processors: Vec<Arc<dyn Processor>>,
    destination: Arc<dyn Destination>,
    trust_proxy: bool,
) -> anyhow::Result<String> {
    let mut all = vec![Arc::new(Identity::new()) as Arc<dyn Processor>];
    all.extend(processors);
    let exec = Arc::new(Executor::new(all, vec![destination]));
    let router = sources::http::attach_routes(Router::new(), exec, trust_proxy);

    serve(router).await
}

pub async fn next_payload(rx: &mut UnboundedReceiver<Payload>) -> Payload {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("payload must be delivered in time")
        .expect("destination channel must be open")
}
