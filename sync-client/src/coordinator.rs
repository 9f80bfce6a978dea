//! Discovery and pairing.
//!
//! One pairing run is:
//!
//! 1. [`PairingCoordinator::discover`] probes every online peer and splits the
//!    outcomes into discovered identities and failures.
//! 2. The caller selects which identities to pair (all, a filter, or an
//!    interactive pick).
//! 3. [`PairingCoordinator::run`] pairs each selected identity and links the
//!    ones that paired into every managed folder.
//!
//! Every step is safe to rerun. Per-peer failures are reported, never
//! raised.

use crate::daemon::DaemonConfig;
use crate::probe::Prober;
use futures_util::stream::{self, StreamExt};
use scratch_sync_core::{group_failures, is_managed, plan_links, FailureGroup};
use scratch_sync_types::{Peer, PeerIdentity, ProbeOutcome, GUI_PORT, MANAGED_FOLDER_PREFIX};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of probes in flight.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Tunables for a [`PairingCoordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Port the peers' daemon answers health checks on.
    pub probe_port: u16,
    /// Maximum probes in flight.
    pub concurrency: usize,
    /// Prefix identifying managed folders.
    pub folder_prefix: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            probe_port: GUI_PORT,
            concurrency: DEFAULT_CONCURRENCY,
            folder_prefix: MANAGED_FOLDER_PREFIX.to_string(),
        }
    }
}

/// Result of probing the overlay.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// Peers running a reachable daemon, in probe order.
    pub discovered: Vec<PeerIdentity>,
    /// Peers whose probe failed, with the outcome.
    pub failures: Vec<(Peer, ProbeOutcome)>,
    /// Peers that were not probed (offline or without an overlay address).
    pub skipped: Vec<Peer>,
}

impl DiscoveryReport {
    /// Failures grouped by remediation category.
    pub fn failure_groups(&self) -> Vec<FailureGroup<'_>> {
        group_failures(&self.failures)
    }
}

/// Result of linking devices into managed folders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Folders that gained at least one device.
    pub folders_linked: Vec<String>,
    /// Share-list entries added across all folders.
    pub memberships_added: usize,
    /// Every failed step.
    pub failures: Vec<LinkFailure>,
}

/// A linking step that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    /// Folder involved; `None` when the folder list itself was unreadable.
    pub folder_id: Option<String>,
    /// Device being added; `None` for folder-level failures.
    pub device_id: Option<String>,
    /// Error reported by the daemon.
    pub error: String,
}

/// Result of [`PairingCoordinator::run`].
#[derive(Debug, Clone, Default)]
pub struct PairingReport {
    /// Identities now configured in the daemon.
    pub paired: Vec<PeerIdentity>,
    /// Identities whose configuration write failed.
    pub failed: Vec<PeerIdentity>,
    /// Folder linking, if anything paired.
    pub link: Option<LinkReport>,
}

/// Drives discovery and pairing against a prober and the local daemon.
#[derive(Debug, Clone)]
pub struct PairingCoordinator<P: Prober, D: DaemonConfig> {
    prober: P,
    daemon: D,
    config: CoordinatorConfig,
}

impl<P: Prober, D: DaemonConfig> PairingCoordinator<P, D> {
    /// Create a coordinator.
    pub fn new(prober: P, daemon: D, config: CoordinatorConfig) -> Self {
        Self {
            prober,
            daemon,
            config,
        }
    }

    /// The daemon this coordinator writes to.
    pub fn daemon(&self) -> &D {
        &self.daemon
    }

    /// Probe every online peer with an overlay address.
    ///
    /// Up to `concurrency` probes run at once; results keep the order of
    /// `peers`. Each probe is bounded by `timeout`.
    pub async fn discover(&self, peers: &[Peer], timeout: Duration) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        let mut candidates = Vec::new();
        for peer in peers {
            if peer.online && !peer.overlay_ip.is_empty() {
                candidates.push(peer.clone());
            } else {
                debug!("skipping {} (offline or no address)", peer.hostname);
                report.skipped.push(peer.clone());
            }
        }

        let port = self.config.probe_port;
        let outcomes: Vec<(Peer, ProbeOutcome)> = stream::iter(candidates)
            .map(|peer| async move {
                let outcome = self.prober.probe(&peer.overlay_ip, port, timeout).await;
                debug!("{} ({}): {}", peer.hostname, peer.overlay_ip, outcome.status());
                (peer, outcome)
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        for (peer, outcome) in outcomes {
            if !outcome.is_success() {
                report.failures.push((peer, outcome));
                continue;
            }
            if let Some(mut identity) = outcome.into_identity() {
                if identity.hostname.is_none() {
                    identity.hostname = Some(peer.hostname.clone());
                }
                report.discovered.push(identity);
            }
        }

        info!(
            "discovered {} peer(s), {} failure(s)",
            report.discovered.len(),
            report.failures.len()
        );
        report
    }

    /// Configure `identity` in the local daemon.
    ///
    /// A device already present only gets its address updated. Returns
    /// `false` on an incomplete identity or a failed write.
    pub async fn pair(&self, identity: &PeerIdentity) -> bool {
        let device_id = identity.device_id.trim();
        if device_id.is_empty() || identity.overlay_ip.trim().is_empty() {
            warn!("refusing to pair incomplete identity {:?}", identity);
            return false;
        }
        let address = identity.tcp_address();

        let known = match self.daemon.list_devices().await {
            Ok(devices) => devices.iter().any(|d| d == device_id),
            Err(e) => {
                warn!("cannot list devices: {}", e);
                return false;
            }
        };

        if !known {
            if let Err(e) = self
                .daemon
                .add_device(device_id, identity.hostname.as_deref())
                .await
            {
                warn!("failed to add {}: {}", identity.short_id(), e);
                return false;
            }
        }

        match self.daemon.set_device_address(device_id, &address).await {
            Ok(()) => {
                if known {
                    info!("updated {} -> {}", identity.short_id(), address);
                } else {
                    info!("paired {} at {}", identity.short_id(), address);
                }
                true
            }
            Err(e) => {
                warn!("failed to set address for {}: {}", identity.short_id(), e);
                false
            }
        }
    }

    /// Share every managed folder with each of `device_ids`.
    ///
    /// Devices already on a folder's share list are left alone.
    pub async fn link_to_managed_folders(&self, device_ids: &[String]) -> LinkReport {
        let mut report = LinkReport::default();
        let folders = match self.daemon.list_folders().await {
            Ok(folders) => folders,
            Err(e) => {
                warn!("cannot list folders: {}", e);
                report.failures.push(LinkFailure {
                    folder_id: None,
                    device_id: None,
                    error: e.to_string(),
                });
                return report;
            }
        };

        let mut current = Vec::new();
        for folder_id in folders
            .into_iter()
            .filter(|f| is_managed(f, &self.config.folder_prefix))
        {
            match self.daemon.folder_devices(&folder_id).await {
                Ok(devices) => current.push((folder_id, devices)),
                Err(e) => {
                    warn!("cannot read share list of {}: {}", folder_id, e);
                    report.failures.push(LinkFailure {
                        folder_id: Some(folder_id),
                        device_id: None,
                        error: e.to_string(),
                    });
                }
            }
        }

        for task in plan_links(&current, device_ids, &self.config.folder_prefix) {
            let mut added = 0;
            for device_id in &task.devices {
                match self
                    .daemon
                    .add_device_to_folder(&task.folder_id, device_id)
                    .await
                {
                    Ok(()) => added += 1,
                    Err(e) => {
                        warn!("failed to share {} with {}: {}", task.folder_id, device_id, e);
                        report.failures.push(LinkFailure {
                            folder_id: Some(task.folder_id.clone()),
                            device_id: Some(device_id.clone()),
                            error: e.to_string(),
                        });
                    }
                }
            }
            if added > 0 {
                info!("shared {} with {} device(s)", task.folder_id, added);
                report.memberships_added += added;
                report.folders_linked.push(task.folder_id);
            }
        }
        report
    }

    /// Pair every selected identity, then link the ones that paired.
    pub async fn run(&self, selected: &[PeerIdentity]) -> PairingReport {
        let mut report = PairingReport::default();
        for identity in selected {
            if self.pair(identity).await {
                report.paired.push(identity.clone());
            } else {
                report.failed.push(identity.clone());
            }
        }

        if !report.paired.is_empty() {
            let ids: Vec<String> = report.paired.iter().map(|i| i.device_id.clone()).collect();
            report.link = Some(self.link_to_managed_folders(&ids).await);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::MockDaemon;
    use crate::probe::ScriptedProbe;
    use scratch_sync_types::{ProbeFailure, ProbeStatus, DATA_PORT};

    fn identity(ip: &str, device_id: &str, hostname: Option<&str>) -> PeerIdentity {
        PeerIdentity {
            hostname: hostname.map(str::to_string),
            overlay_ip: ip.to_string(),
            device_id: device_id.to_string(),
            version: "v1.27.0".to_string(),
            data_port: DATA_PORT,
        }
    }

    fn coordinator(
        probe: ScriptedProbe,
        daemon: MockDaemon,
    ) -> PairingCoordinator<ScriptedProbe, MockDaemon> {
        PairingCoordinator::new(probe, daemon, CoordinatorConfig::default())
    }

    fn daemon_with_folders() -> MockDaemon {
        MockDaemon::new("LOCAL")
            .with_folder("scratch-alpha", "/src/alpha/scratch")
            .with_folder("scratch-beta", "/src/beta/scratch")
            .with_folder("photos", "/home/me/photos")
    }

    #[tokio::test]
    async fn discover_partitions_outcomes_in_order() {
        let probe = ScriptedProbe::new();
        probe.respond_ok("100.64.0.1", "AAAA");
        probe.respond(
            "100.64.0.2",
            ProbeOutcome::failure(ProbeFailure::Timeout, "timed out"),
        );
        probe.respond_ok("100.64.0.3", "CCCC");

        let peers = vec![
            Peer::online("one", "100.64.0.1"),
            Peer::online("two", "100.64.0.2"),
            Peer::online("three", "100.64.0.3"),
        ];
        let c = coordinator(probe, MockDaemon::new("LOCAL"));
        let report = c.discover(&peers, Duration::from_secs(1)).await;

        let ids: Vec<_> = report.discovered.iter().map(|i| i.device_id.as_str()).collect();
        assert_eq!(ids, vec!["AAAA", "CCCC"]);
        assert_eq!(report.discovered[0].hostname.as_deref(), Some("one"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0.hostname, "two");
        assert_eq!(report.failures[0].1.status(), ProbeStatus::Timeout);
    }

    #[tokio::test]
    async fn discover_skips_offline_and_addressless_peers() {
        let probe = ScriptedProbe::new();
        probe.respond_ok("100.64.0.1", "AAAA");

        let mut offline = Peer::online("sleepy", "100.64.0.9");
        offline.online = false;
        let no_ip = Peer::online("ghost", "");
        let peers = vec![Peer::online("one", "100.64.0.1"), offline, no_ip];

        let c = coordinator(probe.clone(), MockDaemon::new("LOCAL"));
        let report = c.discover(&peers, Duration::from_secs(1)).await;

        assert_eq!(probe.probed(), vec!["100.64.0.1"]);
        assert_eq!(report.discovered.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn discover_with_concurrency_one_still_probes_everyone() {
        let probe = ScriptedProbe::new();
        let peers: Vec<Peer> = (1..=5)
            .map(|n| Peer::online(&format!("p{}", n), &format!("100.64.0.{}", n)))
            .collect();
        for peer in &peers {
            probe.respond_ok(&peer.overlay_ip, &format!("ID-{}", peer.hostname));
        }
        let c = PairingCoordinator::new(
            probe,
            MockDaemon::new("LOCAL"),
            CoordinatorConfig {
                concurrency: 1,
                ..CoordinatorConfig::default()
            },
        );
        let report = c.discover(&peers, Duration::from_secs(1)).await;
        let ids: Vec<_> = report.discovered.iter().map(|i| i.device_id.as_str()).collect();
        assert_eq!(ids, vec!["ID-p1", "ID-p2", "ID-p3", "ID-p4", "ID-p5"]);
    }

    #[tokio::test]
    async fn pair_adds_named_device_with_address() {
        let daemon = MockDaemon::new("LOCAL");
        let c = coordinator(ScriptedProbe::new(), daemon.clone());

        assert!(c.pair(&identity("100.64.0.5", "DEV-5", Some("laptop"))).await);

        let device = daemon.device("DEV-5").unwrap();
        assert_eq!(device.name, "laptop");
        assert_eq!(device.addresses, vec!["tcp://100.64.0.5:22000"]);
    }

    #[tokio::test]
    async fn pair_twice_keeps_one_record_and_latest_address() {
        let daemon = MockDaemon::new("LOCAL");
        let c = coordinator(ScriptedProbe::new(), daemon.clone());

        assert!(c.pair(&identity("100.64.0.5", "DEV-5", Some("laptop"))).await);
        assert!(c.pair(&identity("100.64.0.6", "DEV-5", Some("laptop"))).await);

        let matching = daemon
            .devices()
            .into_iter()
            .filter(|d| d.device_id == "DEV-5")
            .count();
        assert_eq!(matching, 1);
        assert_eq!(
            daemon.device("DEV-5").unwrap().addresses,
            vec!["tcp://100.64.0.6:22000"]
        );
    }

    #[tokio::test]
    async fn pair_rejects_incomplete_identity() {
        let daemon = MockDaemon::new("LOCAL");
        let c = coordinator(ScriptedProbe::new(), daemon.clone());

        assert!(!c.pair(&identity("100.64.0.5", "", None)).await);
        assert!(!c.pair(&identity("", "DEV-5", None)).await);
        assert_eq!(daemon.devices().len(), 1);
    }

    #[tokio::test]
    async fn pair_reports_failed_write() {
        let daemon = MockDaemon::new("LOCAL");
        daemon.fail_writes_for("DEV-5");
        let c = coordinator(ScriptedProbe::new(), daemon.clone());

        assert!(!c.pair(&identity("100.64.0.5", "DEV-5", None)).await);
        assert!(daemon.device("DEV-5").is_none());
    }

    #[tokio::test]
    async fn link_twice_adds_no_duplicates() {
        let daemon = daemon_with_folders();
        let c = coordinator(ScriptedProbe::new(), daemon.clone());
        let ids = vec!["DEV-1".to_string(), "DEV-2".to_string()];

        let first = c.link_to_managed_folders(&ids).await;
        assert_eq!(first.folders_linked, vec!["scratch-alpha", "scratch-beta"]);
        assert_eq!(first.memberships_added, 4);
        assert!(first.failures.is_empty());

        let second = c.link_to_managed_folders(&ids).await;
        assert_eq!(second, LinkReport::default());

        assert_eq!(
            daemon.shared_with("scratch-alpha"),
            vec!["LOCAL", "DEV-1", "DEV-2"]
        );
        assert_eq!(daemon.shared_with("photos"), vec!["LOCAL"]);
    }

    #[tokio::test]
    async fn link_reports_each_failed_share() {
        let daemon = daemon_with_folders();
        daemon.fail_writes_for("DEV-2");
        let c = coordinator(ScriptedProbe::new(), daemon.clone());
        let ids = vec!["DEV-1".to_string(), "DEV-2".to_string()];

        let report = c.link_to_managed_folders(&ids).await;
        assert_eq!(report.memberships_added, 2);
        let failed: Vec<_> = report
            .failures
            .iter()
            .map(|f| (f.folder_id.as_deref(), f.device_id.as_deref()))
            .collect();
        assert_eq!(
            failed,
            vec![
                (Some("scratch-alpha"), Some("DEV-2")),
                (Some("scratch-beta"), Some("DEV-2")),
            ]
        );
        assert!(report.failures.iter().all(|f| !f.error.is_empty()));
    }

    #[tokio::test]
    async fn run_without_successful_pairs_does_not_link() {
        let daemon = daemon_with_folders();
        daemon.fail_writes_for("DEV-1");
        let c = coordinator(ScriptedProbe::new(), daemon.clone());

        let report = c.run(&[identity("100.64.0.1", "DEV-1", None)]).await;
        assert!(report.paired.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(report.link.is_none());
        assert_eq!(daemon.shared_with("scratch-alpha"), vec!["LOCAL"]);
    }

    #[tokio::test]
    async fn run_excludes_failed_pair_from_linking() {
        let daemon = daemon_with_folders();
        daemon.fail_writes_for("DEV-2");
        let c = coordinator(ScriptedProbe::new(), daemon.clone());

        let report = c
            .run(&[
                identity("100.64.0.1", "DEV-1", Some("one")),
                identity("100.64.0.2", "DEV-2", Some("two")),
            ])
            .await;

        assert_eq!(report.paired.len(), 1);
        assert_eq!(report.failed[0].device_id, "DEV-2");
        let link = report.link.unwrap();
        assert_eq!(link.memberships_added, 2);
        assert_eq!(daemon.shared_with("scratch-beta"), vec!["LOCAL", "DEV-1"]);
    }

    #[tokio::test]
    async fn end_to_end_three_peers_one_refusing() {
        let probe = ScriptedProbe::new();
        probe.respond_ok("100.64.0.1", "DEVICE-ONE");
        probe.respond_ok("100.64.0.2", "DEVICE-TWO");
        // 100.64.0.3 is unscripted and refuses.
        let peers = vec![
            Peer::online("one", "100.64.0.1"),
            Peer::online("two", "100.64.0.2"),
            Peer::online("three", "100.64.0.3"),
        ];
        let daemon = daemon_with_folders();
        let c = coordinator(probe, daemon.clone());

        let discovery = c.discover(&peers, Duration::from_secs(3)).await;
        assert_eq!(discovery.discovered.len(), 2);
        assert_eq!(discovery.failures.len(), 1);
        assert_eq!(
            discovery.failures[0].1.status(),
            ProbeStatus::ConnectionRefused
        );
        let groups = discovery.failure_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].failures[0].0.hostname, "three");

        let report = c.run(&discovery.discovered).await;
        assert_eq!(report.paired.len(), 2);

        for folder in ["scratch-alpha", "scratch-beta"] {
            let shared = daemon.shared_with(folder);
            assert!(shared.contains(&"DEVICE-ONE".to_string()));
            assert!(shared.contains(&"DEVICE-TWO".to_string()));
            assert_eq!(shared.len(), 3);
        }
        assert_eq!(daemon.shared_with("photos"), vec!["LOCAL"]);
        assert_eq!(daemon.device("DEVICE-ONE").unwrap().name, "one");
    }
}
