use std::env;
use std::path::PathBuf;

use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub output_dir: PathBuf,
    pub enable_text_model: bool,
    pub text_api_base_url: String,
    pub text_api_key: String,
    pub text_model: String,
    pub text_temperature: f32,
    pub text_max_tokens: u32,
    pub diffusion_base_url: String,
    pub diffusion_api_key: String,
    pub render_steps: u32,
    pub render_guidance: f32,
    pub server_host: String,
    pub server_port: u16,
    pub http_timeout_seconds: u64,
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::load);

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn load() -> Self {
        Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            catalog_path: PathBuf::from(env_string(
                "CATALOG_PATH",
                "data/materials_catalog.json",
            )),
            output_dir: PathBuf::from(env_string("OUTPUT_DIR", "outputs")),
            enable_text_model: env_bool("ENABLE_TEXT_MODEL", true),
            text_api_base_url: env_string("TEXT_API_BASE_URL", "https://openrouter.ai/api/v1"),
            text_api_key: env_string("TEXT_API_KEY", ""),
            text_model: env_string("TEXT_MODEL", "google/flan-t5-base"),
            text_temperature: env_f32("TEXT_TEMPERATURE", 0.7),
            text_max_tokens: env_u32("TEXT_MAX_TOKENS", 300),
            diffusion_base_url: env_string("DIFFUSION_BASE_URL", "http://127.0.0.1:7860"),
            diffusion_api_key: env_string("DIFFUSION_API_KEY", ""),
            render_steps: env_u32("RENDER_STEPS", 50),
            render_guidance: env_f32("RENDER_GUIDANCE", 7.5),
            server_host: env_string("SERVER_HOST", "0.0.0.0"),
            server_port: env_u16("SERVER_PORT", 8000),
            http_timeout_seconds: env_u64("HTTP_TIMEOUT_SECONDS", 120),
        }
    }
}

pub const FINISHES_SYSTEM_PROMPT: &str = "You are an expert in architectural finishes. Answer questions professionally and technically.\nFocus on: tiles, paints, bathrooms, flooring, and architectural finishes.\nProvide helpful, concise answers with specific recommendations.";

pub const PHILOSOPHY_SYSTEM_PROMPT: &str = "You are a professional architect writing design documentation. Keep answers technical, concise, and free of marketing language.";
