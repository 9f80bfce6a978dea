//! Show sync status.

use anyhow::Result;
use chrono::{DateTime, Utc};
use scratch_sync_client::{StatusAggregator, StatusSnapshot};
use scratch_sync_core::humanize;
use scratch_sync_types::LinkState;
use std::fmt::Write;

use crate::config::Config;

/// Run the status command.
pub async fn run(config: &Config) -> Result<()> {
    let daemon = super::syncthing(config)?;
    let control = super::rest_control(config, &daemon).await?;
    let snapshot = StatusAggregator::new(control, &config.folders.prefix)
        .snapshot()
        .await;
    print!("{}", render(&snapshot, Utc::now()));
    Ok(())
}

fn link_label(link: LinkState) -> &'static str {
    match link {
        LinkState::Connected => "connected",
        LinkState::Disconnected => "disconnected",
        LinkState::Unknown => "unknown",
    }
}

/// Render a snapshot as plain text.
pub fn render(snapshot: &StatusSnapshot, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = render_into(&mut out, snapshot, now);
    out
}

fn render_into(out: &mut String, snap: &StatusSnapshot, now: DateTime<Utc>) -> std::fmt::Result {
    match &snap.system {
        Some(system) => {
            writeln!(out, "Device ID: {}", system.device_id)?;
            writeln!(out, "Uptime:    {}", humanize::uptime(system.uptime_secs))?;
        }
        None => writeln!(out, "Device ID: unknown")?,
    }

    writeln!(out)?;
    writeln!(out, "Scratch folders: {}", snap.folders.len())?;
    for folder in &snap.folders {
        writeln!(
            out,
            "  - {}: {} ({}, shared with {} device(s))",
            folder.folder_id,
            folder.sync_state,
            folder.path,
            folder.shared_with.len()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Devices: {}", snap.devices.len())?;
    for device in &snap.devices {
        let mut line = format!(
            "  - {} ({}) {}",
            device.label(),
            device.device_id.get(..7).unwrap_or(&device.device_id),
            link_label(device.link)
        );
        if device.paused {
            line.push_str(" [paused]");
        }
        if let Some(address) = &device.address {
            let _ = write!(line, " at {}", address);
        }
        writeln!(out, "{}", line)?;
        writeln!(
            out,
            "      last seen {}, in {}, out {}",
            humanize::last_seen(device.last_seen, now),
            humanize::bytes(device.bytes_in),
            humanize::bytes(device.bytes_out)
        )?;
    }

    if !snap.pending.is_empty() {
        writeln!(out)?;
        writeln!(out, "Pending devices: {}", snap.pending.len())?;
        for (device_id, name) in &snap.pending {
            if name.is_empty() {
                writeln!(out, "  - {}", device_id)?;
            } else {
                writeln!(out, "  - {} ({})", device_id, name)?;
            }
        }
    }

    if !snap.degraded.is_empty() {
        let names: Vec<&str> = snap.degraded.iter().map(|s| s.as_str()).collect();
        writeln!(out)?;
        writeln!(out, "Unavailable: {}", names.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scratch_sync_client::{Source, SystemSummary};
    use scratch_sync_types::{ManagedDevice, ManagedFolder, SyncState};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn renders_full_snapshot() {
        let mut device = ManagedDevice::configured("ABCDEFGHIJK", Some("laptop".into()));
        device.link = LinkState::Connected;
        device.connected = true;
        device.address = Some("100.64.0.2:22000".into());
        device.last_seen = Some(now() - chrono::Duration::minutes(5));
        device.bytes_in = 2048;

        let snapshot = StatusSnapshot {
            system: Some(SystemSummary {
                device_id: "LOCAL-ID".into(),
                uptime_secs: 3700,
            }),
            devices: vec![device],
            folders: vec![ManagedFolder {
                folder_id: "scratch-repo".into(),
                path: "/r/scratch".into(),
                shared_with: vec!["LOCAL-ID".into(), "ABCDEFGHIJK".into()],
                sync_state: SyncState::Idle,
            }],
            pending: BTreeMap::from([("NEWDEV".to_string(), "tablet".to_string())]),
            degraded: vec![],
        };

        let text = render(&snapshot, now());
        assert!(text.contains("Device ID: LOCAL-ID"));
        assert!(text.contains("Scratch folders: 1"));
        assert!(text.contains("scratch-repo: idle"));
        assert!(text.contains("laptop (ABCDEFG) connected at 100.64.0.2:22000"));
        assert!(text.contains("last seen 5 minutes ago"));
        assert!(text.contains("NEWDEV (tablet)"));
        assert!(!text.contains("Unavailable"));
    }

    #[test]
    fn renders_degraded_snapshot() {
        let mut device = ManagedDevice::configured("PEER", None);
        device.last_seen = Some(Utc.timestamp_opt(0, 0).unwrap());
        let snapshot = StatusSnapshot {
            system: None,
            devices: vec![device],
            folders: vec![],
            pending: BTreeMap::new(),
            degraded: vec![Source::System, Source::Connections],
        };

        let text = render(&snapshot, now());
        assert!(text.contains("Device ID: unknown"));
        assert!(text.contains("PEER (PEER) unknown"));
        assert!(text.contains("last seen never"));
        assert!(text.contains("Unavailable: system status, connections"));
    }
}
