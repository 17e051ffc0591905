use std::ffi::OsStr;
use std::fs::File;

use anyhow::anyhow;
use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::config_processors::Unquote;
use crate::stores::events::DEFAULT_MAX_EVENTS_PER_USER;

// Set some default values
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: usize = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SIMILAR_ITEMS_PATH: &str = "./models/similar.csv";
const DEFAULT_PERSONAL_RECS_PATH: &str = "./models/recommendations.csv";
const DEFAULT_TOP_POPULAR_PATH: &str = "./models/top_popular.csv";
const DEFAULT_NUM_ITEMS_TO_RECOMMEND: usize = 100;
const DEFAULT_NUM_SIMILAR_ITEMS: usize = 10;
const DEFAULT_NUM_HISTORY_EVENTS: usize = 10;

pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
}

pub struct ServerConfig {
    pub host: String,
    pub port: usize,
    pub num_workers: usize,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub similar_items_path: String,
    pub personal_recs_path: String,
    pub top_popular_path: String,
}

pub struct ModelConfig {
    pub max_events_per_user: usize,
    pub num_items_to_recommend: usize,
    pub num_similar_items: usize,
    pub num_history_events: usize,
}

impl AppConfig {
    /// Reads `config_path` if it exists, then applies environment overrides.
    /// Keys that are set nowhere take their defaults.
    pub fn new(config_path: &str) -> anyhow::Result<AppConfig> {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(config_path) {
            let config_text = ConfigText::new(config_file, config_path).map_err(|err| {
                anyhow!("loading configuration file {} failed: {}", config_path, err)
            })?;
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "similar_items_path"]),
                OsStr::new("SIMILAR_ITEMS_DATA"),
            ),
            (
                ConfPath::from(&["data", "personal_recs_path"]),
                OsStr::new("PERSONAL_RECS_DATA"),
            ),
            (
                ConfPath::from(&["data", "top_popular_path"]),
                OsStr::new("TOP_POPULAR_DATA"),
            ),
            (
                ConfPath::from(&["server", "num_workers"]),
                OsStr::new("NUM_WORKERS"),
            ),
            (ConfPath::from(&["log", "level"]), OsStr::new("LOG_LEVEL")),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        Ok(AppConfig::parse(conf))
    }

    fn parse(conf: justconfig::Config) -> AppConfig {
        AppConfig {
            server: ServerConfig::parse(&conf, ConfPath::from(&["server"])),
            log: LogConfig::parse(&conf, ConfPath::from(&["log"])),
            data: DataConfig::parse(&conf, ConfPath::from(&["data"])),
            model: ModelConfig::parse(&conf, ConfPath::from(&["model"])),
        }
    }
}

impl ServerConfig {
    fn parse(conf: &Config, path: ConfPath) -> ServerConfig {
        ServerConfig {
            host: conf
                .get(path.push("host"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_HOST)),
            port: conf
                .get(path.push("port"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_PORT),
            num_workers: conf
                .get(path.push("num_workers"))
                .trim()
                .value()
                // Detect number of CPUs
                .unwrap_or_else(|_| sys_info::cpu_num().map(|qty| qty as usize).unwrap_or(1)),
        }
    }
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> LogConfig {
        LogConfig {
            level: conf
                .get(path.push("level"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_LOG_LEVEL)),
        }
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> DataConfig {
        DataConfig {
            similar_items_path: conf
                .get(path.push("similar_items_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_SIMILAR_ITEMS_PATH)),
            personal_recs_path: conf
                .get(path.push("personal_recs_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_PERSONAL_RECS_PATH)),
            top_popular_path: conf
                .get(path.push("top_popular_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_TOP_POPULAR_PATH)),
        }
    }
}

impl ModelConfig {
    fn parse(conf: &Config, path: ConfPath) -> ModelConfig {
        ModelConfig {
            max_events_per_user: conf
                .get(path.push("max_events_per_user"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_MAX_EVENTS_PER_USER),
            num_items_to_recommend: conf
                .get(path.push("num_items_to_recommend"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NUM_ITEMS_TO_RECOMMEND),
            num_similar_items: conf
                .get(path.push("num_similar_items"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NUM_SIMILAR_ITEMS),
            num_history_events: conf
                .get(path.push("num_history_events"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NUM_HISTORY_EVENTS),
        }
    }
}
