use dataforge::adapters::delivery::DeliveryFanout;
use dataforge::adapters::orchestrator::GenerationOrchestrator;
use dataforge::config::{GeneratorMode, GeneratorSettings, Settings};
use std::net::SocketAddr;
use std::sync::Arc;

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
}

impl TestServer {
    /// Server with the in-process generator.
    pub async fn new() -> Self {
        Self::with_generator(GeneratorSettings {
            mode: GeneratorMode::Builtin,
            ..GeneratorSettings::default()
        })
        .await
    }

    pub async fn with_generator(generator: GeneratorSettings) -> Self {
        let settings = Settings {
            server: dataforge::config::ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            generator,
            ..Settings::default()
        };

        let orchestrator = Arc::new(GenerationOrchestrator::from_settings(&settings.generator));
        let delivery = DeliveryFanout::from_settings(&settings.delivery).unwrap();
        let app = dataforge::create_app(Arc::new(settings), orchestrator, delivery);

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { addr, base_url }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
