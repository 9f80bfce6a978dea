//! Discover and pair with other devices on the overlay network.

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};
use scratch_sync_client::{
    CoordinatorConfig, DiscoveryReport, HttpProbe, LinkFailure, MembershipSource,
    PairingCoordinator, PairingReport, SyncthingCli, TailscaleCli,
};
use scratch_sync_core::{select, Selection};
use scratch_sync_listener::{spawn, DaemonIdentity, ListenerHandle};
use scratch_sync_types::PeerIdentity;
use std::fmt::{self, Write};
use std::time::Duration;

use crate::config::Config;

/// Run the pair command.
pub async fn run(config: &Config, timeout: Duration, yes: bool, only: Vec<String>) -> Result<()> {
    let toolchain = config.prerequisites().check().await?;
    let membership = TailscaleCli::new(toolchain.tailscale);
    let daemon = SyncthingCli::new(toolchain.syncthing);

    let listener = if config.listener.enabled_during_pair {
        start_listener(config, &daemon, &membership).await
    } else {
        None
    };

    let result = pair_with_peers(config, &membership, daemon, timeout, yes, only).await;

    if let Some(handle) = listener {
        if let Err(e) = handle.shutdown().await {
            tracing::warn!("discovery listener: {}", e);
        }
    }
    result
}

async fn start_listener(
    config: &Config,
    daemon: &SyncthingCli,
    membership: &TailscaleCli,
) -> Option<ListenerHandle> {
    let identity = DaemonIdentity::new(daemon.clone(), Some(membership.clone()));
    match spawn(&config.listener, identity).await {
        Ok(handle) => {
            println!("Started discovery server on {}", handle.local_addr());
            Some(handle)
        }
        Err(e) => {
            eprintln!("Warning: Could not start discovery server: {}", e);
            None
        }
    }
}

async fn pair_with_peers(
    config: &Config,
    membership: &TailscaleCli,
    daemon: SyncthingCli,
    timeout: Duration,
    yes: bool,
    only: Vec<String>,
) -> Result<()> {
    let peers = membership.list_online_peers().await;
    if peers.is_empty() {
        println!("No online peers found on Tailscale network");
        return Ok(());
    }
    println!("Probing {} online peer(s)...", peers.len());

    let coordinator = PairingCoordinator::new(
        HttpProbe::new()?,
        daemon,
        CoordinatorConfig {
            probe_port: config.probe.port,
            concurrency: config.probe.concurrency,
            folder_prefix: config.folders.prefix.clone(),
        },
    );
    let discovery = coordinator.discover(&peers, timeout).await;
    print!("{}", render_discovery(&discovery));

    if discovery.discovered.is_empty() {
        println!("No peers with a reachable Syncthing found.");
        return Ok(());
    }

    let selection = if only.is_empty() {
        Selection::All
    } else {
        Selection::Only(only)
    };
    let narrowed = select(&discovery.discovered, &selection);
    for filter in &narrowed.unmatched {
        eprintln!("Warning: '{}' matched no discovered peer", filter);
    }

    let selected = if yes {
        narrowed.selected
    } else {
        match choose(&narrowed.selected)? {
            Some(chosen) => chosen,
            None => {
                println!("Aborted; nothing paired.");
                return Ok(());
            }
        }
    };
    if selected.is_empty() {
        println!("No peers selected.");
        return Ok(());
    }

    let report = coordinator.run(&selected).await;
    print!("{}", render_pairing(&report));
    Ok(())
}

fn peer_label(identity: &PeerIdentity) -> String {
    format!(
        "{} ({}) {}",
        identity.hostname.as_deref().unwrap_or("unknown"),
        identity.overlay_ip,
        identity.short_id()
    )
}

/// Let the operator pick peers. `None` when they back out.
fn choose(candidates: &[PeerIdentity]) -> Result<Option<Vec<PeerIdentity>>> {
    if candidates.is_empty() {
        return Ok(Some(Vec::new()));
    }
    let theme = ColorfulTheme::default();
    let labels: Vec<String> = candidates.iter().map(peer_label).collect();
    let defaults = vec![true; candidates.len()];

    let picked = MultiSelect::with_theme(&theme)
        .with_prompt("Select peers to pair with")
        .items(&labels)
        .defaults(&defaults)
        .interact_opt()
        .context("Interactive selection failed (use --yes to pair without prompting)")?;
    let Some(picked) = picked else {
        return Ok(None);
    };
    if picked.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let confirmed = Confirm::with_theme(&theme)
        .with_prompt(format!("Pair with {} device(s)?", picked.len()))
        .default(true)
        .interact_opt()
        .context("Interactive confirmation failed")?;
    if confirmed != Some(true) {
        return Ok(None);
    }
    Ok(Some(picked.into_iter().map(|i| candidates[i].clone()).collect()))
}

/// Discovered peers, then failures grouped with remediation steps.
pub fn render_discovery(report: &DiscoveryReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = discovery_into(&mut out, report);
    out
}

fn discovery_into(out: &mut String, report: &DiscoveryReport) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "Discovered {} peer(s):", report.discovered.len())?;
    for identity in &report.discovered {
        writeln!(
            out,
            "  - {} ({}) Syncthing {}",
            identity.hostname.as_deref().unwrap_or("unknown"),
            identity.overlay_ip,
            identity.version
        )?;
        let device_id = identity.device_id.get(..20).unwrap_or(&identity.device_id);
        writeln!(out, "    Device ID: {}...", device_id)?;
    }

    for group in report.failure_groups() {
        writeln!(out)?;
        writeln!(out, "{} ({}):", group.category.title(), group.failures.len())?;
        for (peer, outcome) in &group.failures {
            writeln!(
                out,
                "  - {} ({}): {}",
                peer.hostname,
                peer.overlay_ip,
                outcome.error_message().unwrap_or(outcome.status().as_str())
            )?;
        }
        for hint in group.category.guidance() {
            writeln!(out, "    {}", hint)?;
        }
    }
    writeln!(out)
}

/// Per-peer pairing results and the folder link count.
pub fn render_pairing(report: &PairingReport) -> String {
    let mut out = String::new();
    let _ = pairing_into(&mut out, report);
    out
}

fn pairing_into(out: &mut String, report: &PairingReport) -> fmt::Result {
    for identity in &report.paired {
        writeln!(out, "  Paired with {}", peer_label(identity))?;
    }
    for identity in &report.failed {
        writeln!(out, "  Failed to pair with {}", peer_label(identity))?;
    }
    if let Some(link) = &report.link {
        writeln!(
            out,
            "Linked {} folder(s) ({} new share(s))",
            link.folders_linked.len(),
            link.memberships_added
        )?;
        for failure in &link.failures {
            link_failure_into(out, failure)?;
        }
    }
    writeln!(out)?;
    if report.paired.is_empty() {
        writeln!(out, "No devices were paired.")
    } else {
        writeln!(out, "Done! Devices are now paired.")?;
        writeln!(
            out,
            "Folders sync automatically once both devices have the same folder ID."
        )
    }
}

fn link_failure_into(out: &mut String, failure: &LinkFailure) -> fmt::Result {
    let error = &failure.error;
    match (&failure.folder_id, &failure.device_id) {
        (Some(folder), Some(device)) => {
            writeln!(out, "  Could not share {} with {}: {}", folder, device, error)
        }
        (Some(folder), None) => writeln!(out, "  Could not update {}: {}", folder, error),
        (None, _) => writeln!(out, "  Could not list folders: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scratch_sync_client::LinkReport;
    use scratch_sync_types::{Peer, ProbeFailure, ProbeOutcome, DATA_PORT};

    fn identity(host: &str, ip: &str, id: &str) -> PeerIdentity {
        PeerIdentity {
            hostname: Some(host.into()),
            overlay_ip: ip.into(),
            device_id: id.into(),
            version: "v1.27.0".into(),
            data_port: DATA_PORT,
        }
    }

    #[test]
    fn discovery_groups_failures_with_guidance() {
        let report = DiscoveryReport {
            discovered: vec![identity("laptop", "100.64.0.2", "AAAAAAAAAAAAAAAAAAAAAAAA")],
            failures: vec![
                (
                    Peer::online("desktop", "100.64.0.3"),
                    ProbeOutcome::failure(ProbeFailure::ConnectionRefused, "connection refused"),
                ),
                (
                    Peer::online("nas", "100.64.0.4"),
                    ProbeOutcome::failure(ProbeFailure::Timeout, "timed out after 3s"),
                ),
            ],
            skipped: vec![],
        };

        let text = render_discovery(&report);
        assert!(text.contains("Discovered 1 peer(s):"));
        assert!(text.contains("laptop (100.64.0.2) Syncthing v1.27.0"));
        assert!(text.contains("desktop (100.64.0.3): connection refused"));
        assert!(text.contains("nas (100.64.0.4): timed out after 3s"));
        // Refused is listed before timed out.
        assert!(text.find("desktop").unwrap() < text.find("nas").unwrap());
    }

    #[test]
    fn pairing_report_counts_linked_folders() {
        let report = PairingReport {
            paired: vec![identity("laptop", "100.64.0.2", "AAAAAAAAAA")],
            failed: vec![identity("desktop", "100.64.0.3", "BBBBBBBBBB")],
            link: Some(LinkReport {
                folders_linked: vec!["scratch-a".into(), "scratch-b".into()],
                memberships_added: 2,
                failures: vec![],
            }),
        };
        let text = render_pairing(&report);
        assert!(text.contains("Paired with laptop (100.64.0.2) AAAAAAA"));
        assert!(text.contains("Failed to pair with desktop"));
        assert!(text.contains("Linked 2 folder(s)"));
        assert!(text.contains("Done!"));
    }

    #[test]
    fn link_failures_name_folder_and_device() {
        let report = PairingReport {
            paired: vec![identity("laptop", "100.64.0.2", "AAAAAAAAAA")],
            failed: vec![],
            link: Some(LinkReport {
                folders_linked: vec![],
                memberships_added: 0,
                failures: vec![
                    LinkFailure {
                        folder_id: Some("scratch-a".into()),
                        device_id: Some("AAAAAAAAAA".into()),
                        error: "rejected".into(),
                    },
                    LinkFailure {
                        folder_id: Some("scratch-b".into()),
                        device_id: None,
                        error: "no such folder".into(),
                    },
                    LinkFailure {
                        folder_id: None,
                        device_id: None,
                        error: "daemon down".into(),
                    },
                ],
            }),
        };
        let text = render_pairing(&report);
        assert!(text.contains("Could not share scratch-a with AAAAAAAAAA: rejected"));
        assert!(text.contains("Could not update scratch-b: no such folder"));
        assert!(text.contains("Could not list folders: daemon down"));
    }

    #[test]
    fn nothing_paired_is_reported_plainly() {
        let text = render_pairing(&PairingReport::default());
        assert!(text.contains("No devices were paired."));
    }
}
