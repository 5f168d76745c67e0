//! Lenient parser for interrupted or truncated reports
//!
//! nmap writes its XML progressively, so a scan that was killed leaves a file
//! without closing tags (or cut off mid-element). This parser streams the
//! document with the quick-xml event reader and keeps every `<host>` whose end
//! tag was reached. Reading stops quietly at EOF or at the first syntax error.

use crate::parser::{derive_host_totals, primary_address, ReportParser};
use crate::types::{
    DetectionInfo, Host, HostStatus, OsClass, OsMatch, ReportError, Result, ScanReport, Service,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parser that recovers whatever complete hosts a damaged report contains
#[derive(Debug, Clone, Copy, Default)]
pub struct IncompleteParser;

impl ReportParser for IncompleteParser {
    fn parse(&self, xml: &str) -> Result<ScanReport> {
        let mut reader = Reader::from_str(xml);
        let mut builder = ReportBuilder::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(element)) => builder.open(&element),
                Ok(Event::Empty(element)) => {
                    builder.open(&element);
                    builder.close(element.name().as_ref());
                }
                Ok(Event::End(element)) => builder.close(element.name().as_ref()),
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!(
                        "Stopped reading incomplete report at byte {}: {}",
                        reader.buffer_position(),
                        e
                    );
                    break;
                }
                Ok(_) => {}
            }
        }

        builder.finish()
    }
}

/// Accumulates the report while events stream past
#[derive(Default)]
struct ReportBuilder {
    report: ScanReport,
    seen_root: bool,
    seen_host_stats: bool,
    host: Option<Host>,
    addresses: Vec<(String, String)>,
    service: Option<Service>,
    os_match: Option<OsMatch>,
    /// `<osclass>` found directly under `<os>`, grouped into one match at `</host>`
    legacy_classes: Vec<OsClass>,
    in_runstats: bool,
}

impl ReportBuilder {
    fn open(&mut self, element: &BytesStart) {
        match element.name().as_ref() {
            b"nmaprun" => {
                self.seen_root = true;
                self.report.scanner = attr(element, "scanner").unwrap_or_default();
                self.report.commandline = attr(element, "args").unwrap_or_default();
                self.report.version = attr(element, "version").unwrap_or_default();
                self.report.started = parsed_attr(element, "start").unwrap_or(0);
            }
            b"scaninfo" if self.report.scan_type.is_empty() => {
                self.report.scan_type = attr(element, "type").unwrap_or_default();
            }
            b"host" if !self.in_runstats => {
                self.host = Some(Host::default());
                self.addresses.clear();
                self.legacy_classes.clear();
            }
            b"status" => {
                if let Some(host) = self.host.as_mut() {
                    let state = attr(element, "state").unwrap_or_default();
                    host.status = HostStatus::from_state(&state);
                }
            }
            b"address" => {
                if self.host.is_some() {
                    self.addresses.push((
                        attr(element, "addrtype").unwrap_or_default(),
                        attr(element, "addr").unwrap_or_default(),
                    ));
                }
            }
            b"hostname" => {
                if let (Some(host), Some(name)) = (self.host.as_mut(), attr(element, "name")) {
                    host.hostnames.push(name);
                }
            }
            b"port" if self.host.is_some() => {
                self.service = Some(Service {
                    port: parsed_attr(element, "portid").unwrap_or(0),
                    protocol: attr(element, "protocol").unwrap_or_default(),
                    ..Default::default()
                });
            }
            b"state" => {
                if let Some(service) = self.service.as_mut() {
                    service.state = attr(element, "state").unwrap_or_default();
                    service.reason = attr(element, "reason").unwrap_or_default();
                }
            }
            b"service" => {
                if let Some(service) = self.service.as_mut() {
                    service.service = attr(element, "name").unwrap_or_default();
                    service.tunnel = attr(element, "tunnel").unwrap_or_default();
                    service.detection = DetectionInfo {
                        method: attr(element, "method"),
                        conf: attr(element, "conf"),
                        product: attr(element, "product"),
                        version: attr(element, "version"),
                        extrainfo: attr(element, "extrainfo"),
                    };
                }
            }
            b"osmatch" if self.host.is_some() => {
                self.os_match = Some(OsMatch {
                    name: attr(element, "name").unwrap_or_default(),
                    accuracy: parsed_attr(element, "accuracy").unwrap_or(0),
                    classes: Vec::new(),
                });
            }
            b"osclass" => self.push_os_class(element),
            b"runstats" => self.in_runstats = true,
            b"finished" if self.in_runstats => {
                self.report.endtime = parsed_attr(element, "time").unwrap_or(0);
                self.report.elapsed = parsed_attr(element, "elapsed");
                self.report.summary = attr(element, "summary");
            }
            b"hosts" if self.in_runstats => {
                self.seen_host_stats = true;
                self.report.hosts_up = parsed_attr(element, "up").unwrap_or(0);
                self.report.hosts_down = parsed_attr(element, "down").unwrap_or(0);
                self.report.hosts_total = parsed_attr(element, "total")
                    .unwrap_or(self.report.hosts_up + self.report.hosts_down);
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"port" => {
                if let (Some(host), Some(service)) = (self.host.as_mut(), self.service.take()) {
                    host.services.push(service);
                }
            }
            b"osmatch" => {
                if let (Some(host), Some(os_match)) = (self.host.as_mut(), self.os_match.take()) {
                    host.os_matches.push(os_match);
                }
            }
            b"host" => {
                if let Some(mut host) = self.host.take() {
                    host.address = primary_address(&self.addresses);
                    if !self.legacy_classes.is_empty() {
                        host.os_matches.push(OsMatch {
                            classes: std::mem::take(&mut self.legacy_classes),
                            ..Default::default()
                        });
                    }
                    log::debug!("Recovered host {}", host);
                    self.report.hosts.push(host);
                }
            }
            b"runstats" => self.in_runstats = false,
            _ => {}
        }
    }

    /// `<osclass>` lives under `<osmatch>`, or directly under `<os>` in old reports
    fn push_os_class(&mut self, element: &BytesStart) {
        let class = OsClass {
            vendor: attr(element, "vendor").unwrap_or_default(),
            osfamily: attr(element, "osfamily").unwrap_or_default(),
            osgen: attr(element, "osgen").unwrap_or_default(),
            os_type: attr(element, "type").unwrap_or_default(),
            accuracy: parsed_attr(element, "accuracy").unwrap_or(0),
        };

        if let Some(os_match) = self.os_match.as_mut() {
            os_match.classes.push(class);
        } else if self.host.is_some() {
            self.legacy_classes.push(class);
        }
    }

    fn finish(mut self) -> Result<ScanReport> {
        if !self.seen_root {
            return Err(ReportError::IncompleteParseError(
                "no <nmaprun> element found".to_string(),
            ));
        }

        if self.host.is_some() {
            log::warn!("Dropping host whose record was cut off");
        }

        if !self.seen_host_stats {
            derive_host_totals(&mut self.report);
        }

        self.report.incomplete = true;
        Ok(self.report)
    }
}

/// Unescaped attribute value, if present
fn attr(element: &BytesStart, key: &str) -> Option<String> {
    element
        .try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn parsed_attr<T: std::str::FromStr>(element: &BytesStart, key: &str) -> Option<T> {
    attr(element, key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{StrictParser, SAMPLE_REPORT};

    #[test]
    fn test_complete_document_matches_strict_parse() {
        let strict = StrictParser.parse(SAMPLE_REPORT).unwrap();
        let lenient = IncompleteParser.parse(SAMPLE_REPORT).unwrap();

        assert!(lenient.incomplete);
        assert_eq!(lenient.hosts, strict.hosts);
        assert_eq!(lenient.commandline, strict.commandline);
        assert_eq!(lenient.scan_type, strict.scan_type);
        assert_eq!(lenient.endtime, strict.endtime);
        assert_eq!(lenient.hosts_total, strict.hosts_total);
    }

    #[test]
    fn test_missing_closing_tags() {
        // Interrupted scan: the second host is cut off mid-port
        let cut = SAMPLE_REPORT
            .find(r#"<port protocol="udp""#)
            .map(|idx| &SAMPLE_REPORT[..idx])
            .unwrap();

        let report = IncompleteParser.parse(cut).unwrap();
        assert_eq!(report.hosts.len(), 1);
        assert_eq!(report.hosts[0].address, "10.0.0.1");
        assert_eq!(report.hosts[0].services.len(), 2);
        assert_eq!(report.endtime, 0);
        assert_eq!(report.hosts_total, 1);
        assert_eq!(report.hosts_up, 1);
    }

    #[test]
    fn test_cut_inside_a_tag() {
        let cut = SAMPLE_REPORT
            .find(r#"portid="161""#)
            .map(|idx| &SAMPLE_REPORT[..idx + 4])
            .unwrap();

        let report = IncompleteParser.parse(cut).unwrap();
        assert_eq!(report.hosts.len(), 1);
        assert_eq!(report.service_count(), 2);
    }

    #[test]
    fn test_legacy_osclass_without_osmatch() {
        let xml = r#"<nmaprun scanner="nmap" args="nmap -O 10.0.0.9">
  <host>
    <status state="up"/>
    <address addr="10.0.0.9" addrtype="ipv4"/>
    <os><osclass vendor="Microsoft" osfamily="Windows" osgen="XP" accuracy="100"/></os>
  </host>"#;

        let report = IncompleteParser.parse(xml).unwrap();
        let classes: Vec<String> = report.hosts[0]
            .os_class_probabilities()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(classes, vec!["Microsoft, Windows(XP)"]);
    }

    #[test]
    fn test_legacy_osclasses_group_like_strict_parse() {
        let xml = r#"<nmaprun scanner="nmap" args="nmap -O 10.0.0.9" start="1100000000">
  <host>
    <status state="up"/>
    <address addr="10.0.0.9" addrtype="ipv4"/>
    <os>
      <osclass type="general purpose" vendor="Microsoft" osfamily="Windows" osgen="XP" accuracy="100"/>
      <osclass type="general purpose" vendor="Microsoft" osfamily="Windows" osgen="2000" accuracy="90"/>
      <osmatch name="Microsoft Windows XP SP2" accuracy="100" line="1"/>
    </os>
  </host>
  <runstats><finished time="1100000010"/><hosts up="1" down="0" total="1"/></runstats>
</nmaprun>"#;

        let strict = StrictParser.parse(xml).unwrap();
        let lenient = IncompleteParser.parse(xml).unwrap();

        assert_eq!(lenient.hosts, strict.hosts);
        let host = &lenient.hosts[0];
        assert_eq!(host.os_matches.len(), 2);
        assert_eq!(host.os_matches[0].name, "Microsoft Windows XP SP2");
        assert_eq!(host.os_matches[1].classes.len(), 2);
    }

    #[test]
    fn test_not_a_report() {
        let result = IncompleteParser.parse("just some text, no xml here");
        assert!(matches!(result, Err(ReportError::IncompleteParseError(_))));
    }
}
