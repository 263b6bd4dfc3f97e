//! Integration tests for the plugin and software collectors

use pluginsfetcher_core::{
    ErrorKind, PluginCounts, PluginFilter, PluginRegistry, SnapshotRegistry, get_plugin_stats,
    get_software_stats,
};
use pluginsfetcher_test_utils::{BrokenRegistry, TestSite, sample_host, sample_registry};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn expected_plugin_count(registry: &dyn PluginRegistry) -> usize {
    registry
        .plugins_by_type()
        .unwrap()
        .iter()
        .map(|g| g.plugins.len())
        .sum()
}

#[test]
fn test_get_plugin_stats_reports_every_plugin_once() {
    let registry = sample_registry();
    let report = get_plugin_stats(&registry, &PluginFilter::all()).unwrap();

    let expected = expected_plugin_count(&registry);
    assert_eq!(report.stats.total as usize, expected);
    assert_eq!(report.plugins.len(), expected);
    assert_eq!(
        report.stats,
        PluginCounts {
            total: 10,
            standard: 6,
            contrib: 4
        }
    );

    let mut components: Vec<&str> = report.plugins.iter().map(|p| p.component.as_str()).collect();
    components.sort();
    components.dedup();
    assert_eq!(components.len(), expected, "component ids must be unique");
}

#[test]
fn test_get_plugin_stats_entries_carry_every_field() {
    let report = get_plugin_stats(&sample_registry(), &PluginFilter::all()).unwrap();
    let entry = serde_json::to_value(&report.plugins[0]).unwrap();

    for key in [
        "type",
        "name",
        "displayname",
        "version",
        "release",
        "requires",
        "supported",
        "isstandard",
        "status",
    ] {
        assert!(entry.get(key).is_some(), "Key '{key}' is missing in the plugin info.");
    }
}

#[test]
fn test_get_plugin_stats_contrib_only() {
    let report = get_plugin_stats(&sample_registry(), &PluginFilter::all().contrib_only()).unwrap();

    assert!(!report.is_empty());
    for plugin in &report.plugins {
        assert!(!plugin.isstandard, "Found a standard plugin in contrib-only results.");
    }
    assert_eq!(report.stats.standard, 0);
    assert_eq!(report.stats.contrib, report.stats.total);
}

#[rstest]
#[case("mod", 3)]
#[case("block", 3)]
#[case("local", 2)]
#[case("auth", 2)]
#[case("nonexistingtype", 0)]
fn test_get_plugin_stats_by_type(#[case] plugin_type: &str, #[case] expected: u64) {
    let report = get_plugin_stats(&sample_registry(), &PluginFilter::of_type(plugin_type)).unwrap();

    for plugin in &report.plugins {
        assert_eq!(plugin.plugin_type, plugin_type);
    }
    assert_eq!(report.stats.total, expected);
    assert_eq!(report.stats.total, report.stats.standard + report.stats.contrib);
}

#[test]
fn test_get_plugin_stats_is_repeatable() {
    let registry = sample_registry();
    let filter = PluginFilter::of_type("block").contrib_only();

    let first = get_plugin_stats(&registry, &filter).unwrap();
    let second = get_plugin_stats(&registry, &filter).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_get_plugin_stats_propagates_registry_failure() {
    let err = get_plugin_stats(&BrokenRegistry, &PluginFilter::all()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataAccess);
}

#[test]
fn test_get_plugin_stats_from_snapshot_matches_in_memory() {
    let site = TestSite::new().write();
    let snapshot = SnapshotRegistry::new(site.snapshot_path());

    let from_disk = get_plugin_stats(&snapshot, &PluginFilter::all()).unwrap();
    let in_memory = get_plugin_stats(&sample_registry(), &PluginFilter::all()).unwrap();
    assert_eq!(from_disk, in_memory);
}

#[test]
fn test_get_software_stats() {
    let host = sample_host();
    let stats = get_software_stats(&host);

    assert_eq!(stats.moodle.version, 2024100700);
    assert_eq!(stats.moodle.release, "4.5 (Build: 20241007)");
    assert_eq!(stats.moodle.branch, 405);
    assert_eq!(stats.php.version, "8.3.6");
    assert_eq!(stats.php.versionid, "80306");
    assert_eq!(stats.db.db_type, "pgsql");
    assert_eq!(stats.os.name, "Linux");
    assert_eq!(stats.os.family, "Linux");

    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["db"]["type"], "pgsql");
    assert_eq!(value["php"]["versionid"], "80306");
}
