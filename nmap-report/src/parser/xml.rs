//! Strict nmap XML parser
//!
//! Deserializes a complete `<nmaprun>` document with quick-xml + serde and
//! converts the raw element structs into the library's object model.

use crate::parser::{derive_host_totals, primary_address, ReportParser};
use crate::types::{
    DetectionInfo, Host, HostStatus, OsClass, OsMatch, ReportError, Result, ScanReport, Service,
};
use serde::Deserialize;

/// Parser for complete, well-formed reports
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictParser;

impl ReportParser for StrictParser {
    fn parse(&self, xml: &str) -> Result<ScanReport> {
        let run: NmapRun =
            quick_xml::de::from_str(xml).map_err(|e| ReportError::XmlParseError(e.to_string()))?;
        Ok(run.into_report())
    }
}

/// Root element: `<nmaprun>`
#[derive(Debug, Deserialize)]
#[serde(rename = "nmaprun")]
struct NmapRun {
    #[serde(rename = "@scanner", default)]
    scanner: String,
    #[serde(rename = "@args", default)]
    args: String,
    #[serde(rename = "@start")]
    start: Option<i64>,
    #[serde(rename = "@version", default)]
    version: String,
    #[serde(rename = "scaninfo", default)]
    scaninfo: Vec<ScanInfo>,
    #[serde(rename = "host", default)]
    hosts: Vec<RawHost>,
    runstats: Option<RunStats>,
}

#[derive(Debug, Deserialize)]
struct ScanInfo {
    #[serde(rename = "@type", default)]
    scan_type: String,
}

#[derive(Debug, Deserialize)]
struct RawHost {
    status: Option<RawStatus>,
    #[serde(rename = "address", default)]
    addresses: Vec<RawAddress>,
    hostnames: Option<RawHostnames>,
    ports: Option<RawPorts>,
    os: Option<RawOs>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    #[serde(rename = "@state", default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    #[serde(rename = "@addr")]
    addr: String,
    #[serde(rename = "@addrtype", default)]
    addr_type: String,
}

#[derive(Debug, Deserialize)]
struct RawHostnames {
    #[serde(rename = "hostname", default)]
    hostnames: Vec<RawHostname>,
}

#[derive(Debug, Deserialize)]
struct RawHostname {
    #[serde(rename = "@name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawPorts {
    #[serde(rename = "port", default)]
    ports: Vec<RawPort>,
}

#[derive(Debug, Deserialize)]
struct RawPort {
    #[serde(rename = "@protocol", default)]
    protocol: String,
    #[serde(rename = "@portid")]
    port_id: u16,
    state: Option<RawPortState>,
    service: Option<RawService>,
}

#[derive(Debug, Deserialize)]
struct RawPortState {
    #[serde(rename = "@state", default)]
    state: String,
    #[serde(rename = "@reason", default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct RawService {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@tunnel", default)]
    tunnel: String,
    #[serde(rename = "@method")]
    method: Option<String>,
    #[serde(rename = "@conf")]
    conf: Option<String>,
    #[serde(rename = "@product")]
    product: Option<String>,
    #[serde(rename = "@version")]
    version: Option<String>,
    #[serde(rename = "@extrainfo")]
    extra_info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOs {
    #[serde(rename = "osmatch", default)]
    matches: Vec<RawOsMatch>,
    /// Pre-5.x reports put `<osclass>` directly under `<os>`
    #[serde(rename = "osclass", default)]
    classes: Vec<RawOsClass>,
}

#[derive(Debug, Deserialize)]
struct RawOsMatch {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@accuracy")]
    accuracy: Option<u8>,
    #[serde(rename = "osclass", default)]
    classes: Vec<RawOsClass>,
}

#[derive(Debug, Deserialize)]
struct RawOsClass {
    #[serde(rename = "@vendor", default)]
    vendor: String,
    #[serde(rename = "@osfamily", default)]
    osfamily: String,
    #[serde(rename = "@osgen", default)]
    osgen: String,
    #[serde(rename = "@type", default)]
    os_type: String,
    #[serde(rename = "@accuracy")]
    accuracy: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct RunStats {
    finished: Option<Finished>,
    hosts: Option<RunStatsHosts>,
}

#[derive(Debug, Deserialize)]
struct Finished {
    #[serde(rename = "@time")]
    time: Option<i64>,
    #[serde(rename = "@elapsed")]
    elapsed: Option<f64>,
    #[serde(rename = "@summary")]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunStatsHosts {
    #[serde(rename = "@up")]
    up: Option<u32>,
    #[serde(rename = "@down")]
    down: Option<u32>,
    #[serde(rename = "@total")]
    total: Option<u32>,
}

impl NmapRun {
    fn into_report(self) -> ScanReport {
        let scan_type = self
            .scaninfo
            .into_iter()
            .next()
            .map(|info| info.scan_type)
            .unwrap_or_default();

        let mut report = ScanReport {
            scanner: self.scanner,
            commandline: self.args,
            version: self.version,
            scan_type,
            started: self.start.unwrap_or(0),
            hosts: self.hosts.into_iter().map(RawHost::into_host).collect(),
            ..Default::default()
        };

        let (finished, host_stats) = match self.runstats {
            Some(stats) => (stats.finished, stats.hosts),
            None => (None, None),
        };

        if let Some(finished) = finished {
            report.endtime = finished.time.unwrap_or(0);
            report.elapsed = finished.elapsed;
            report.summary = finished.summary;
        }

        match host_stats {
            Some(stats) => {
                report.hosts_up = stats.up.unwrap_or(0);
                report.hosts_down = stats.down.unwrap_or(0);
                report.hosts_total = stats.total.unwrap_or(report.hosts_up + report.hosts_down);
            }
            None => derive_host_totals(&mut report),
        }

        report
    }
}

impl RawHost {
    fn into_host(self) -> Host {
        let addresses: Vec<(String, String)> = self
            .addresses
            .into_iter()
            .map(|a| (a.addr_type, a.addr))
            .collect();

        let mut os_matches: Vec<OsMatch> = Vec::new();
        if let Some(os) = self.os {
            os_matches.extend(os.matches.into_iter().map(|m| OsMatch {
                name: m.name,
                accuracy: m.accuracy.unwrap_or(0),
                classes: m.classes.into_iter().map(RawOsClass::into_class).collect(),
            }));
            if !os.classes.is_empty() {
                os_matches.push(OsMatch {
                    classes: os.classes.into_iter().map(RawOsClass::into_class).collect(),
                    ..Default::default()
                });
            }
        }

        Host {
            address: primary_address(&addresses),
            status: self
                .status
                .map(|s| HostStatus::from_state(&s.state))
                .unwrap_or_default(),
            hostnames: self
                .hostnames
                .map(|h| h.hostnames.into_iter().map(|n| n.name).collect())
                .unwrap_or_default(),
            services: self
                .ports
                .map(|p| p.ports.into_iter().map(RawPort::into_service).collect())
                .unwrap_or_default(),
            os_matches,
        }
    }
}

impl RawPort {
    fn into_service(self) -> Service {
        let (state, reason) = self
            .state
            .map(|s| (s.state, s.reason))
            .unwrap_or_default();

        let mut service = Service {
            port: self.port_id,
            protocol: self.protocol,
            state,
            reason,
            ..Default::default()
        };

        if let Some(raw) = self.service {
            service.service = raw.name;
            service.tunnel = raw.tunnel;
            service.detection = DetectionInfo {
                method: raw.method,
                conf: raw.conf,
                product: raw.product,
                version: raw.version,
                extrainfo: raw.extra_info,
            };
        }

        service
    }
}

impl RawOsClass {
    fn into_class(self) -> OsClass {
        OsClass {
            vendor: self.vendor,
            osfamily: self.osfamily,
            osgen: self.osgen,
            os_type: self.os_type,
            accuracy: self.accuracy.unwrap_or(0),
        }
    }
}
