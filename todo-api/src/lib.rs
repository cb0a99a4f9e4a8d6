pub mod config {
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Deserialize, Debug)]
    pub struct Config {
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default = "default_db_max_connections")]
        pub db_max_connections: u32,
        #[serde(default = "default_db_connect_timeout_secs")]
        pub db_connect_timeout_secs: u64,
        #[serde(default = "default_db_acquire_timeout_secs")]
        pub db_acquire_timeout_secs: u64,
        #[serde(default = "default_request_timeout_secs")]
        pub request_timeout_secs: u64,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_builder(
                config::Config::builder().add_source(config::Environment::default()),
            )
        }

        fn from_builder(
            builder: config::ConfigBuilder<config::builder::DefaultState>,
        ) -> anyhow::Result<Self> {
            let settings = builder.build()?;
            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        pub fn db_connect_timeout(&self) -> Duration {
            Duration::from_secs(self.db_connect_timeout_secs)
        }

        pub fn db_acquire_timeout(&self) -> Duration {
            Duration::from_secs(self.db_acquire_timeout_secs)
        }

        /// Upper bound on the time spent handling a single HTTP request.
        pub fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.request_timeout_secs)
        }
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_db_max_connections() -> u32 {
        10
    }

    fn default_db_connect_timeout_secs() -> u64 {
        5
    }

    fn default_db_acquire_timeout_secs() -> u64 {
        5
    }

    fn default_request_timeout_secs() -> u64 {
        30
    }

}
pub mod entities;
pub mod task;
pub mod web;
