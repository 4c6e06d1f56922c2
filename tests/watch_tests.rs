use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

use tempfile::TempDir;

use gpio_watchd::{
    AppError, Direction, EdgeDetect, PinConfig, PinWatcher, ScriptDispatcher, ScriptOutcome,
    SysfsGpio, WatchConfig,
};

fn fake_sysfs() -> TempDir {
    let dir = TempDir::new().expect("create sysfs dir");
    fs::write(dir.path().join("export"), "").expect("create export file");
    dir
}

fn export_pin(sysfs: &TempDir, pin: u32) {
    let pin_dir = sysfs.path().join(format!("gpio{pin}"));
    fs::create_dir(&pin_dir).expect("create pin dir");
    fs::write(pin_dir.join("direction"), "").expect("create direction file");
    fs::write(pin_dir.join("edge"), "").expect("create edge file");
    fs::write(pin_dir.join("value"), "0\n").expect("create value file");
}

fn install_script(dir: &TempDir, pin: u32, body: &str) {
    let path = dir.path().join(pin.to_string());
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("mark script executable");
}

#[test]
fn export_skips_already_exported_pin() {
    let sysfs = fake_sysfs();
    export_pin(&sysfs, 17);

    let gpio = SysfsGpio::new(sysfs.path());
    gpio.export(17).expect("export");

    let written = fs::read_to_string(sysfs.path().join("export")).unwrap();
    assert_eq!(written, "");
}

#[test]
fn export_writes_pin_number() {
    let sysfs = fake_sysfs();
    let gpio = SysfsGpio::new(sysfs.path());

    gpio.export(23).expect("export");

    let written = fs::read_to_string(sysfs.path().join("export")).unwrap();
    assert_eq!(written, "23\n");
}

#[test]
fn configuring_unexported_pin_fails() {
    let sysfs = fake_sysfs();
    let gpio = SysfsGpio::new(sysfs.path());

    assert!(matches!(
        gpio.set_direction(5, Direction::In),
        Err(AppError::NotExported(5))
    ));
    assert!(matches!(
        gpio.set_edge(5, EdgeDetect::Both),
        Err(AppError::NotExported(5))
    ));
}

#[test]
fn configure_writes_sysfs_spellings() {
    let sysfs = fake_sysfs();
    export_pin(&sysfs, 17);
    let gpio = SysfsGpio::new(sysfs.path());

    gpio.set_direction(17, Direction::In).expect("direction");
    gpio.set_edge(17, EdgeDetect::Rising).expect("edge");

    let pin_dir = sysfs.path().join("gpio17");
    assert_eq!(
        fs::read_to_string(pin_dir.join("direction")).unwrap(),
        "in\n"
    );
    assert_eq!(fs::read_to_string(pin_dir.join("edge")).unwrap(), "rising\n");
}

#[test]
fn pin_specs_build_ordered_pin_set() {
    let scripts = TempDir::new().unwrap();
    let config = WatchConfig::from_specs(
        "/sys/class/gpio".into(),
        scripts.path().to_path_buf(),
        &["17:rising:1000000".to_string(), "27".to_string()],
        EdgeDetect::Both,
    )
    .expect("config");

    assert_eq!(
        config.pins,
        vec![
            PinConfig {
                number: 17,
                edge: EdgeDetect::Rising,
                debounce: Duration::from_nanos(1_000_000),
            },
            PinConfig {
                number: 27,
                edge: EdgeDetect::Both,
                debounce: Duration::ZERO,
            },
        ]
    );
}

#[test]
fn bad_script_dir_is_a_config_error() {
    let scripts = TempDir::new().unwrap();
    let missing = scripts.path().join("nope");

    let err = WatchConfig::from_specs(
        "/sys/class/gpio".into(),
        missing,
        &["4".to_string()],
        EdgeDetect::Both,
    )
    .unwrap_err();

    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn bad_pin_spec_is_rejected() {
    let scripts = TempDir::new().unwrap();

    let err = WatchConfig::from_specs(
        "/sys/class/gpio".into(),
        scripts.path().to_path_buf(),
        &["17:sideways".to_string()],
        EdgeDetect::Both,
    )
    .unwrap_err();

    assert!(matches!(err, AppError::PinSpec(_)));
}

#[test]
fn watcher_opens_every_configured_pin() {
    let sysfs = fake_sysfs();
    export_pin(&sysfs, 17);
    export_pin(&sysfs, 27);
    let scripts = TempDir::new().unwrap();

    let config = WatchConfig::from_specs(
        sysfs.path().to_path_buf(),
        scripts.path().to_path_buf(),
        &["17".to_string(), "27".to_string()],
        EdgeDetect::Both,
    )
    .expect("config");

    let gpio = SysfsGpio::new(&config.gpio_base);
    assert!(PinWatcher::new(&config, &gpio).is_ok());
}

#[test]
fn watcher_fails_on_missing_value_file() {
    let sysfs = fake_sysfs();
    let scripts = TempDir::new().unwrap();

    let config = WatchConfig::from_specs(
        sysfs.path().to_path_buf(),
        scripts.path().to_path_buf(),
        &["17".to_string()],
        EdgeDetect::Both,
    )
    .expect("config");

    let gpio = SysfsGpio::new(&config.gpio_base);
    assert!(matches!(
        PinWatcher::new(&config, &gpio),
        Err(AppError::Sysfs(_))
    ));
}

#[test]
fn missing_script_is_not_an_error() {
    let scripts = TempDir::new().unwrap();
    let dispatcher = ScriptDispatcher::new(scripts.path());

    assert_eq!(dispatcher.run(9, 1), ScriptOutcome::Missing);
}

#[test]
fn script_nonzero_exit_is_reported() {
    let scripts = TempDir::new().unwrap();
    install_script(&scripts, 17, "exit 3");
    let dispatcher = ScriptDispatcher::new(scripts.path());

    assert_eq!(dispatcher.run(17, 1), ScriptOutcome::Exited(3));
}

#[test]
fn script_clean_exit_is_status_zero() {
    let scripts = TempDir::new().unwrap();
    install_script(&scripts, 17, "exit 0");
    let dispatcher = ScriptDispatcher::new(scripts.path());

    assert_eq!(dispatcher.run(17, 0), ScriptOutcome::Exited(0));
}

#[test]
fn script_receives_pin_and_value_arguments() {
    let scripts = TempDir::new().unwrap();
    let seen = scripts.path().join("seen");
    install_script(&scripts, 4, &format!("echo \"$1 $2\" > '{}'", seen.display()));
    let dispatcher = ScriptDispatcher::new(scripts.path());

    assert_eq!(dispatcher.run(4, 0), ScriptOutcome::Exited(0));
    assert_eq!(fs::read_to_string(&seen).unwrap().trim(), "4 0");
}
