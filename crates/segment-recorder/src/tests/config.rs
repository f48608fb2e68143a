use crate::{
    AppError,
    config::{Config, MergeStrategy},
};

use std::fs;

/// WHAT: Defaults survive an atomic save and reload
/// WHY: The first run writes a config the next run must read back
#[test]
#[allow(clippy::unwrap_used)]
fn given_default_config_when_saved_and_loaded_then_equivalent() {
    // Given: Default config rooted in a temp data dir
    let dir = tempfile::tempdir().unwrap();
    let config = Config::defaults_for(dir.path());
    let path = dir.path().join("nested").join("config.toml");

    // When: Saving and loading back
    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();

    // Then: Same values, no temp file left behind
    assert_eq!(loaded.recording.target_path, config.recording.target_path);
    assert_eq!(loaded.capture.bit_rate, 64 * 1024);
    assert_eq!((loaded.capture.width, loaded.capture.height), (320, 240));
    assert_eq!(loaded.driver.program, "ffmpeg");
    assert_eq!(loaded.merge.strategy, MergeStrategy::Concat);
    assert!(!path.with_extension("toml.tmp").exists());
    loaded.validate().unwrap();
}

/// WHAT: Only the recording section is required
/// WHY: Hand-written configs should not need every section spelled out
#[test]
#[allow(clippy::unwrap_used)]
fn given_minimal_toml_when_loading_then_sections_defaulted() {
    // Given: A config with only a target path and a capture override
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[recording]
target_path = "/videos/out.ts"
session_id = "67e55044-10b1-426f-9247-bb680e5fe0c8"

[capture]
bit_rate = 1000000
video_encoder = "h264"
"#,
    )
    .unwrap();

    // When: Loading
    let config = Config::load_from(&path).unwrap();

    // Then: Overrides applied, everything else defaulted
    assert_eq!(config.capture.bit_rate, 1_000_000);
    assert_eq!(config.capture.width, 320);
    assert_eq!(
        config.capture.video_encoder,
        segment_recorder_core::VideoEncoder::H264
    );
    assert!(config.recording.session_id.is_some());
    assert!(!config.logging.json);
    assert_eq!(config.driver.stop_timeout_ms, 5_000);
}

/// WHAT: Malformed TOML is a config error
/// WHY: A broken file must not be silently replaced with defaults
#[test]
#[allow(clippy::unwrap_used)]
fn given_malformed_toml_when_loading_then_config_error() {
    // Given: An unparsable file
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[recording\ntarget_path = ").unwrap();

    // When: Loading
    let result = Config::load_from(&path);

    // Then: Config error and the file is untouched
    assert!(matches!(result, Err(AppError::ConfigError { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[recording\ntarget_path = ");
}

/// WHAT: Zero bit rate fails validation
/// WHY: Bit rate must be positive before any capture starts
#[test]
fn given_zero_bit_rate_when_validating_then_config_error() {
    // Given: Defaults with a zero bit rate
    let mut config = Config::defaults_for(std::path::Path::new("/data"));
    config.capture.bit_rate = 0;

    // When: Validating
    let result = config.validate();

    // Then: Config error
    assert!(matches!(result, Err(AppError::ConfigError { .. })));
}

/// WHAT: Command merge strategy requires a program
/// WHY: Pausing would otherwise fail on every segment
#[test]
fn given_command_strategy_without_program_when_validating_then_config_error() {
    // Given: Command strategy with no program
    let mut config = Config::defaults_for(std::path::Path::new("/data"));
    config.merge.strategy = MergeStrategy::Command;

    // When: Validating
    let result = config.validate();

    // Then: Config error
    assert!(matches!(result, Err(AppError::ConfigError { .. })));
}

/// WHAT: Empty driver program fails validation
/// WHY: No capture can start without an encoder
#[test]
fn given_empty_driver_program_when_validating_then_config_error() {
    // Given: A blank program
    let mut config = Config::defaults_for(std::path::Path::new("/data"));
    config.driver.program = "  ".to_string();

    // When: Validating
    let result = config.validate();

    // Then: Config error
    assert!(matches!(result, Err(AppError::ConfigError { .. })));
}

/// WHAT: Explicit scratch dir wins over the platform cache dir
/// WHY: Deployments may need segments on a specific volume
#[test]
#[allow(clippy::unwrap_used)]
fn given_explicit_scratch_dir_when_resolving_then_used_verbatim() {
    // Given: A configured scratch dir
    let mut config = Config::defaults_for(std::path::Path::new("/data"));
    config.recording.scratch_dir = Some("/fast/scratch".into());

    // When / Then
    assert_eq!(
        config.scratch_dir().unwrap(),
        std::path::PathBuf::from("/fast/scratch")
    );
}
