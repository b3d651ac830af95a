// Config loading from TOML files

use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

use roundtable::config::{load_config, load_config_from_path, DebateConfig};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_file_fills_defaults() {
    let file = write_config(
        r#"
[debate_params]
num_debate_rounds = 4
enable_continuous_mode = true

[llm_params]
model_name = "gemini-pro"
"#,
    );

    let config = load_config_from_path(file.path()).unwrap();
    assert_eq!(config.debate_params.num_debate_rounds, 4);
    assert!(config.debate_params.enable_continuous_mode);
    assert_eq!(config.llm_params.model_name, "gemini-pro");
    // Untouched fields keep their defaults
    let defaults = DebateConfig::default();
    assert_eq!(config.llm_params.temperature, defaults.llm_params.temperature);
    assert_eq!(config.prompts, defaults.prompts);
    assert_eq!(config.debate_params.transcript_word_limit, 2500);
}

#[test]
fn test_custom_prompts_are_loaded() {
    let file = write_config(
        r#"
[prompts]
debate_start = "Open on [TOPIC] as [NAME]. [LIMITER]"
response_length = "Use at most [RESPONSE_LENGTH]."

[debate_params]
response_length = "two sentences"
"#,
    );

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.prompts.debate_start, "Open on [TOPIC] as [NAME]. [LIMITER]");
    assert_eq!(config.limiter_clause(), "Use at most two sentences.");
}

#[test]
fn test_explicit_missing_path_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = load_config(Some(missing.as_path())).unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}

#[test]
fn test_invalid_temperature_rejected_on_load() {
    let file = write_config(
        r#"
[llm_params]
temperature = 3.5
"#,
    );
    let err = load_config(Some(file.path())).unwrap_err();
    assert!(format!("{:#}", err).contains("temperature"), "{err:#}");
}

#[test]
fn test_malformed_toml_is_error() {
    let file = write_config("[debate_params\nnum_debate_rounds = ");
    assert!(load_config_from_path(file.path()).is_err());
}

#[test]
fn test_api_keys_from_file() {
    let file = write_config(
        r#"
[api_keys]
openai = "sk-from-file"
"#,
    );
    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.api_keys.openai.as_deref(), Some("sk-from-file"));
}

#[test]
fn test_config_roundtrips_through_toml() {
    let mut config = DebateConfig::default();
    config.debate_params.num_personas = 5;
    let text = toml::to_string(&config).unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, text).unwrap();
    let loaded = load_config_from_path(&path).unwrap();
    assert_eq!(loaded.debate_params.num_personas, 5);
}
