//! Test fixtures and sample data

use restic_ez::utils::restic::Snapshot;

/// Snapshot with a given id, time and tags
pub fn snapshot(id: &str, time: &str, tags: &[&str]) -> Snapshot {
    Snapshot {
        id: id.to_string(),
        short_id: id.chars().take(8).collect(),
        time: time.to_string(),
        hostname: "test-host".to_string(),
        paths: vec!["/srv/data".to_string()],
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// `count` regular archives, one per day of December 2025 in ascending order
pub fn sample_snapshots(count: usize) -> Vec<Snapshot> {
    (0..count)
        .map(|i| {
            snapshot(
                &format!("snapshot{:032}", i),
                &format!("2025-12-{:02}T10:30:00Z", (i % 28) + 1),
                &["backup"],
            )
        })
        .collect()
}

/// Output of `restic snapshots --json` for `snapshots`
pub fn snapshots_json(snapshots: &[Snapshot]) -> String {
    serde_json::to_string(snapshots).expect("Failed to serialize snapshots")
}

/// A regular archive followed by a newer pre-restore snapshot archive
pub fn archives_with_safety_snapshot() -> Vec<Snapshot> {
    vec![
        snapshot("regular1", "2025-12-01T08:00:00Z", &["backup"]),
        snapshot("regular2", "2025-12-02T08:00:00Z", &["backup"]),
        snapshot("safety01", "2025-12-03T08:00:00Z", &["snapshot"]),
    ]
}
