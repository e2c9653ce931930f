//! Configuration files driving a factory

use std::fs;

use saturate_config::{ConfigError, SaturationConfig};
use saturate_engine::{ConcurrentSaturation, SaturationFactory, SaturationJob};
use tempfile::tempdir;

use crate::common::{new_state, submit_all, told_chain};

#[test]
fn loaded_config_sets_threshold_and_timings() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "workers = 3\n\n[threshold]\nbase = 10\nper_worker = 2\n\n[statistics]\nrule_timings = true\n",
    )?;
    let config = SaturationConfig::load_from(&path)?;
    assert!(config.statistics.rule_timings);

    let (graph, roots) = told_chain();
    let factory = SaturationFactory::new(new_state(graph), &config, |_: &SaturationJob<usize>| {});
    assert_eq!(factory.threshold(), 10 + 2 * config.workers);
    submit_all(&factory, &roots);
    assert!(!ConcurrentSaturation::run(&factory, config.workers));
    factory.finish();
    factory.print_statistics();

    let rules = factory.rule_statistics();
    assert!(rules.total_processed() > 0);
    assert_eq!(rules.total_produced(), rules.total_processed());
    Ok(())
}

#[test]
fn malformed_config_is_reported() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = \"many\"\n")?;
    let err = SaturationConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));

    let missing = SaturationConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Read { .. }));
    Ok(())
}
